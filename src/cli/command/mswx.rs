//! Download the MSWX daily inputs from the shared Drive folders.

use anyhow::Result;
use tracing::warn;

use super::display;
use crate::{
    cli::{create_progress_bar, DriveArgs},
    config::RunConfig,
    dates::DateRange,
    download::{sync_mswx, DriveStore, RemoteStore},
};

pub async fn mswx(config: &RunConfig, range: &DateRange, drive: &DriveArgs) -> Result<String> {
    let store = DriveStore::new(drive.token.as_str());

    sync_into(&store, &drive.root_folder, config, range).await
}

async fn sync_into(store: &dyn RemoteStore, root: &str, config: &RunConfig, range: &DateRange) -> Result<String> {
    let dest = config.mswx_input_dir();

    let bar = create_progress_bar(0, "Downloading MSWX".to_string());
    let report = sync_mswx(store, root, range, &dest, &bar).await?;
    bar.finish_with_message(format!("{} MSWX files downloaded", report.downloaded));

    if report.downloaded == 0 {
        warn!(first = %range.first, last = %range.last, "no MSWX files found for the requested dates");
    }

    Ok(display(&dest))
}

// -- Tests -------------------------------------------------------------------
