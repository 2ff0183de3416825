//! Download IMERG Late daily precipitation, merge the days and crop them to the country.

use anyhow::Result;

use super::display;
use crate::{
    cli::{create_progress_bar, EarthdataArgs},
    config::{Credentials, RunConfig},
    dates::DateRange,
    download::{imerg::PRECIPITATION, ImergClient},
    merge::{merge_daily_files, DailyFiles},
    output::{write_series, Provenance},
    raster::{crop_to_mask, open_mask},
};

pub const PRECIPITATION_UNITS: &str = "mm/day";

pub async fn imerg(config: &RunConfig, range: &DateRange, earthdata: &EarthdataArgs) -> Result<String> {
    let credentials = Credentials::resolve(
        earthdata.username.clone(),
        earthdata.password.clone(),
        earthdata.credentials.as_deref(),
    )?;
    let client = ImergClient::new(credentials)?;

    let bar = create_progress_bar(range.len() as u64, "Downloading IMERG".to_string());
    client.fetch_range(range, &config.imerg_input_dir(), &bar).await?;
    bar.finish_with_message("IMERG downloaded");

    crop_downloaded(config, range)
}

/// Merges the daily files already on disk and writes the country crop.
fn crop_downloaded(config: &RunConfig, range: &DateRange) -> Result<String> {
    let files = DailyFiles::Imerg {
        dir: config.imerg_input_dir(),
    };

    let bar = create_progress_bar(range.len() as u64, "Merging IMERG".to_string());
    let merged = merge_daily_files(range, &files, PRECIPITATION, &bar)?;
    bar.finish_with_message(format!("{} IMERG days merged", merged.len()));

    let (mask_grid, mask) = open_mask(&config.mask_file)?;
    let cropped = crop_to_mask(&merged, &mask_grid, &mask)?;

    let path = config.imerg_output_file();
    write_series(
        &path,
        &cropped,
        PRECIPITATION,
        PRECIPITATION_UNITS,
        &Provenance::new("IMERG Late Run V06"),
    )?;

    Ok(display(&path))
}

// -- Tests -------------------------------------------------------------------
