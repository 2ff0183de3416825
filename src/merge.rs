//! Concatenating daily raster files into one time series.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use indicatif::ProgressBar;
use tracing::warn;

use crate::{
    dates::{compact_stamp, iso_stamp, julian_stamp, DateRange},
    error::{PipelineError, PipelineResult},
    raster::{
        reader::{read_axis, read_raster},
        Grid,
    },
    series::{GriddedSeries, SeriesBuilder},
};

#[derive(Debug, Clone, PartialEq)]
/// How daily files are named on disk.
pub enum DailyFiles {
    /// `<prefix>YYYY-MM-DD.nc`, as delivered for forecasts.
    Iso { prefix: String },
    /// `<dir>/YYYYjjj.nc`, as delivered by MSWX.
    Julian { dir: PathBuf },
    /// `<dir>/IMERG_LATEYYYYMMDD.nc`.
    Imerg { dir: PathBuf },
}

impl DailyFiles {
    pub fn path_for(&self, date: NaiveDate) -> PathBuf {
        match self {
            DailyFiles::Iso { prefix } => PathBuf::from(format!("{}{}.nc", prefix, iso_stamp(date))),
            DailyFiles::Julian { dir } => dir.join(format!("{}.nc", julian_stamp(date))),
            DailyFiles::Imerg { dir } => imerg_file(dir, date),
        }
    }
}

pub fn imerg_file(dir: &Path, date: NaiveDate) -> PathBuf {
    dir.join(format!("IMERG_LATE{}.nc", compact_stamp(date)))
}

/// Reads the `lat`/`lon` axes of a file.
pub fn read_grid(path: &Path) -> PipelineResult<Grid> {
    let file = netcdf::open(path).map_err(|e| PipelineError::malformed(path, e.to_string()))?;

    Ok(Grid::new(
        read_axis(&file, path, "lat")?,
        read_axis(&file, path, "lon")?,
    ))
}

/// Stacks `variable` from every daily file in `range`.
///
/// The grid comes from the first readable file; later files on another grid, missing files
/// and unreadable files are logged and left out.
pub fn merge_daily_files(
    range: &DateRange,
    files: &DailyFiles,
    variable: &str,
    progress: &ProgressBar,
) -> PipelineResult<GriddedSeries> {
    let mut builder: Option<SeriesBuilder> = None;

    for date in range.iter() {
        let path = files.path_for(date);
        progress.set_message(format!("{}", path.display()));

        match merge_day(&mut builder, &path, date, variable) {
            Ok(()) => {}
            Err(e) if e.is_recoverable() => {
                warn!(path = %path.display(), date = %date, "skipping file: {}", e);
            }
            Err(e) => return Err(e),
        }

        progress.inc(1);
    }

    match builder {
        Some(builder) => builder.finalize(),
        None => Err(PipelineError::Config(format!(
            "no `{}` files found between {} and {}",
            variable, range.first, range.last
        ))),
    }
}

/// The first file read also fixes the grid of the series.
fn merge_day(
    builder: &mut Option<SeriesBuilder>,
    path: &Path,
    date: NaiveDate,
    variable: &str,
) -> PipelineResult<()> {
    if !path.exists() {
        return Err(PipelineError::MissingInput {
            path: path.to_path_buf(),
            date,
        });
    }

    let raster = read_raster(path, variable)?;
    let target = match builder.take() {
        Some(target) => target,
        None => SeriesBuilder::new(read_grid(path)?),
    };

    builder.insert(target).append(date, raster)
}

// -- Tests -------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    fn ymd(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 7, d).unwrap()
    }

    fn write_daily(path: &Path, lat: &[f32], lon: &[f32], value: f32) {
        let mut file = netcdf::create(path).unwrap();
        file.add_dimension("lat", lat.len()).unwrap();
        file.add_dimension("lon", lon.len()).unwrap();
        let mut var = file.add_variable::<f32>("lat", &["lat"]).unwrap();
        var.put_values(lat, ..).unwrap();
        let mut var = file.add_variable::<f32>("lon", &["lon"]).unwrap();
        var.put_values(lon, ..).unwrap();
        let mut var = file.add_variable::<f32>("precipitation", &["lat", "lon"]).unwrap();
        var.put_values(&vec![value; lat.len() * lon.len()], ..).unwrap();
    }

    #[test]
    fn should_name_daily_files() {
        let date = ymd(5);

        let iso = DailyFiles::Iso {
            prefix: "/in/RAIN/RAIN_".to_string(),
        };
        let julian = DailyFiles::Julian {
            dir: PathBuf::from("/in/MSWX/Temp"),
        };
        let imerg = DailyFiles::Imerg {
            dir: PathBuf::from("/in/IMERG"),
        };

        assert_eq!(iso.path_for(date), PathBuf::from("/in/RAIN/RAIN_2024-07-05.nc"));
        assert_eq!(julian.path_for(date), PathBuf::from("/in/MSWX/Temp/2024187.nc"));
        assert_eq!(imerg.path_for(date), PathBuf::from("/in/IMERG/IMERG_LATE20240705.nc"));
    }

    #[test]
    fn should_merge_available_days_in_order() {
        let dir = TempDir::new().unwrap();
        let prefix = format!("{}/RAIN_", dir.path().display());
        for d in [5, 6, 8] {
            let path = PathBuf::from(format!("{}2024-07-{:02}.nc", prefix, d));
            write_daily(&path, &[13.0, 14.0], &[-87.0, -86.0, -85.0], d as f32);
        }

        let range = DateRange::half_open(ymd(5), ymd(10)).unwrap();
        let series = merge_daily_files(
            &range,
            &DailyFiles::Iso { prefix },
            "precipitation",
            &ProgressBar::hidden(),
        )
        .unwrap();

        assert_eq!(series.dates, vec![ymd(5), ymd(6), ymd(8)]);
        assert_eq!(series.grid.lon, vec![-87.0, -86.0, -85.0]);
        assert_eq!(series.values[[2, 1, 2]], 8.0);
    }

    #[test]
    fn should_skip_file_on_other_grid() {
        let dir = TempDir::new().unwrap();
        let files = DailyFiles::Julian {
            dir: dir.path().to_path_buf(),
        };
        write_daily(&files.path_for(ymd(5)), &[13.0, 14.0], &[-87.0], 1.0);
        write_daily(&files.path_for(ymd(6)), &[13.0], &[-87.0], 2.0);

        let range = DateRange::half_open(ymd(5), ymd(7)).unwrap();
        let series = merge_daily_files(&range, &files, "precipitation", &ProgressBar::hidden()).unwrap();

        assert_eq!(series.dates, vec![ymd(5)]);
    }

    #[test]
    fn should_fail_when_nothing_found() {
        let dir = TempDir::new().unwrap();
        let files = DailyFiles::Imerg {
            dir: dir.path().to_path_buf(),
        };
        let range = DateRange::half_open(ymd(5), ymd(7)).unwrap();

        let err = merge_daily_files(&range, &files, "precipitationCal", &ProgressBar::hidden()).unwrap_err();

        assert!(!err.is_recoverable());
    }
}
