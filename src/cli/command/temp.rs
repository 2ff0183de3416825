//! Merge the observed MSWX mean temperature and crop it to the country.

use anyhow::Result;

use super::display;
use crate::{
    cli::create_progress_bar,
    config::RunConfig,
    dates::DateRange,
    merge::{merge_daily_files, DailyFiles},
    output::{write_series, Provenance},
    raster::{crop_to_mask, open_mask, Variable},
};

pub const TEMPERATURE_UNITS: &str = "degrees Celsius";

pub async fn temp(config: &RunConfig, range: &DateRange) -> Result<String> {
    let files = DailyFiles::Julian {
        dir: config.mswx_input_dir().join(Variable::Temp.folder()),
    };
    let variable = Variable::Temp.nc_name();

    let bar = create_progress_bar(range.len() as u64, "Merging MSWX Temp".to_string());
    let merged = merge_daily_files(range, &files, variable, &bar)?;
    bar.finish_with_message(format!("{} Temp days merged", merged.len()));

    let (mask_grid, mask) = open_mask(&config.mask_file)?;
    let cropped = crop_to_mask(&merged, &mask_grid, &mask)?;

    let path = config.temp_output_file();
    write_series(&path, &cropped, variable, TEMPERATURE_UNITS, &Provenance::mswx())?;

    Ok(display(&path))
}

// -- Tests -------------------------------------------------------------------
