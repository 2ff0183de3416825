//! The daily job: MSWX download, ET0 and observed temperature, then IMERG.

use anyhow::Result;
use tracing::info;

use crate::{
    cli::{DriveArgs, EarthdataArgs},
    config::RunConfig,
    dates::DateRange,
};

/// Returns the files written, in order.
pub async fn run(
    config: &RunConfig,
    range: &DateRange,
    drive: &DriveArgs,
    earthdata: &EarthdataArgs,
    pressure: f64,
) -> Result<Vec<String>> {
    info!(stamp = %config.stamp, first = %range.first, last = %range.last, "starting daily run");

    let mswx_dir = super::mswx(config, range, drive).await?;
    info!(dir = %mswx_dir, "MSWX inputs ready");

    let et0_file = super::et0(config, range, pressure).await?;
    let temp_file = super::temp(config, range).await?;
    let imerg_file = super::imerg(config, range, earthdata).await?;

    Ok(vec![et0_file, temp_file, imerg_file])
}
