//! Syncs MSWX near-real-time daily files from the shared folder tree:
//! root → one folder per variable → `Daily` → `YYYYjjj*.nc`.

use std::path::Path;

use indicatif::ProgressBar;
use tracing::{info, warn};

use super::{RemoteItem, RemoteStore};
use crate::{
    dates::{parse_julian_stamp, DateRange},
    error::PipelineResult,
    raster::Variable,
};

/// Shared Drive folder holding one sub-folder per MSWX variable.
pub const MSWX_ROOT_FOLDER: &str = "14no0Wkoat3guyvVnv-LccXOEoxQqDRy7";

pub const DAILY_FOLDER: &str = "Daily";

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SyncReport {
    pub downloaded: usize,
    pub failed: usize,
}

/// Downloads every daily file in `range` for each variable folder under `root`, saving
/// them as `<dest>/<Folder>/<name>`. Failed downloads are logged and counted.
pub async fn sync_mswx(
    store: &dyn RemoteStore,
    root: &str,
    range: &DateRange,
    dest: &Path,
    progress: &ProgressBar,
) -> PipelineResult<SyncReport> {
    let mut report = SyncReport::default();

    let folders: Vec<(Variable, RemoteItem)> = store
        .list(root)
        .await?
        .into_iter()
        .filter(|item| item.is_folder)
        .filter_map(|item| Variable::from_folder(&item.name).map(|v| (v, item)))
        .collect();

    for (variable, folder) in folders {
        let daily: Vec<RemoteItem> = store
            .list(&folder.id)
            .await?
            .into_iter()
            .filter(|item| item.name == DAILY_FOLDER)
            .collect();

        let [daily] = daily.as_slice() else {
            warn!(folder = %folder.name, found = daily.len(), "expected exactly one `Daily` folder, skipping");
            continue;
        };

        let files: Vec<RemoteItem> = store
            .list(&daily.id)
            .await?
            .into_iter()
            .filter(|item| !item.is_folder && is_daily_file_in(&item.name, range))
            .collect();

        progress.set_length(progress.length().unwrap_or(0) + files.len() as u64);
        progress.set_message(format!("MSWX {}", variable.folder()));

        let variable_dir = dest.join(variable.folder());
        for file in files {
            match store.fetch(&file, &variable_dir.join(&file.name)).await {
                Ok(()) => report.downloaded += 1,
                Err(e) if e.is_recoverable() => {
                    warn!(file = %file.name, folder = %folder.name, "download failed: {}", e);
                    report.failed += 1;
                }
                Err(e) => return Err(e),
            }
            progress.inc(1);
        }
    }

    info!(downloaded = report.downloaded, failed = report.failed, "MSWX sync finished");

    Ok(report)
}

/// `YYYYjjj*.nc` with the date inside `range`.
fn is_daily_file_in(name: &str, range: &DateRange) -> bool {
    if !name.ends_with(".nc") {
        return false;
    }

    name.get(..7)
        .and_then(|stamp| parse_julian_stamp(stamp).ok())
        .map(|date| range.contains(date))
        .unwrap_or(false)
}

// -- Tests -------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use tempfile::TempDir;

    use super::*;
    use crate::download::memory::MemoryStore;

    fn range() -> DateRange {
        DateRange::half_open(
            NaiveDate::from_ymd_opt(2024, 7, 5).unwrap(),
            NaiveDate::from_ymd_opt(2024, 7, 8).unwrap(),
        )
        .unwrap()
    }

    fn store() -> MemoryStore {
        let mut store = MemoryStore::default();
        store.folder("root", "tmax", "Tmax");
        store.folder("root", "wind", "Wind");
        store.folder("root", "other", "Precip");
        store.file("root", "readme", "README.txt");

        store.folder("tmax", "tmax-daily", "Daily");
        store.folder("tmax", "tmax-monthly", "Monthly");
        store.file("tmax-daily", "a", "2024186.nc");
        store.file("tmax-daily", "b", "2024187.nc");
        store.file("tmax-daily", "c", "2024189.nc");
        store.file("tmax-daily", "d", "2024190.nc");
        store.file("tmax-daily", "e", "2024187.nc.md5");

        store.folder("wind", "wind-daily", "Daily");
        store.file("wind-daily", "f", "2024188.nc");

        store.folder("other", "other-daily", "Daily");
        store.file("other-daily", "g", "2024187.nc");

        store
    }

    #[test]
    fn should_select_daily_files_in_range() {
        let range = range();

        assert!(is_daily_file_in("2024187.nc", &range));
        assert!(is_daily_file_in("2024189.nc", &range));
        assert!(!is_daily_file_in("2024186.nc", &range));
        assert!(!is_daily_file_in("2024190.nc", &range));
        assert!(!is_daily_file_in("2024187.nc.md5", &range));
        assert!(!is_daily_file_in("abc.nc", &range));
        assert!(!is_daily_file_in("é.nc", &range));
    }

    #[tokio::test]
    async fn should_download_variable_folders_only() {
        let store = store();
        let dir = TempDir::new().unwrap();

        let report = sync_mswx(&store, "root", &range(), dir.path(), &ProgressBar::hidden())
            .await
            .unwrap();

        assert_eq!(report, SyncReport { downloaded: 3, failed: 0 });
        assert!(dir.path().join("Tmax").join("2024187.nc").exists());
        assert!(dir.path().join("Tmax").join("2024189.nc").exists());
        assert!(dir.path().join("Wind").join("2024188.nc").exists());
        assert!(!dir.path().join("Precip").exists());
        assert!(!dir.path().join("Tmax").join("2024186.nc").exists());
    }

    #[tokio::test]
    async fn should_count_failed_downloads_and_continue() {
        let mut store = store();
        store.broken_file("wind-daily", "h", "2024189.nc");
        let dir = TempDir::new().unwrap();

        let report = sync_mswx(&store, "root", &range(), dir.path(), &ProgressBar::hidden())
            .await
            .unwrap();

        assert_eq!(report, SyncReport { downloaded: 3, failed: 1 });
    }

    #[tokio::test]
    async fn should_skip_folder_without_daily() {
        let mut store = MemoryStore::default();
        store.folder("root", "swd", "SWd");
        store.folder("swd", "x", "Monthly");
        let dir = TempDir::new().unwrap();

        let report = sync_mswx(&store, "root", &range(), dir.path(), &ProgressBar::hidden())
            .await
            .unwrap();

        assert_eq!(report, SyncReport::default());
    }
}
