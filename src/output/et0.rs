//! Save the ET0 series and its time sum to a NetCDF file.

use std::path::Path;

use tracing::info;

use super::{add_data_variable, array_to_f32, create_with_axes, Provenance};
use crate::{error::PipelineResult, series::GriddedSeries};

pub const ET0_UNITS: &str = "mm/day";

pub fn write_et0(path: &Path, series: &GriddedSeries, provenance: &Provenance) -> PipelineResult<()> {
    let mut file = create_with_axes(path, &series.grid, &series.dates)?;
    provenance.write(&mut file)?;

    add_data_variable(
        &mut file,
        "ET0",
        &["time", "lat", "lon"],
        ET0_UNITS,
        "FAO-56 Penman-Monteith reference evapotranspiration",
        &array_to_f32(series.values.iter()),
    )?;

    let sum = series.sum_over_time();
    add_data_variable(
        &mut file,
        "ET0_sum",
        &["lat", "lon"],
        ET0_UNITS,
        "Sum of FAO-56 Penman-Monteith reference evapotranspiration over time",
        &array_to_f32(sum.iter()),
    )?;

    info!(path = %path.display(), dates = series.len(), "ET0 file written");

    Ok(())
}

// -- Tests -------------------------------------------------------------------
