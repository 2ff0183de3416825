//! Crop an existing `(time, lat, lon)` series to the country mask.

use std::path::Path;

use anyhow::Result;

use super::display;
use crate::{
    cli::create_spinner,
    config::RunConfig,
    output::{write_series, Provenance},
    raster::{crop_to_mask, open_mask, reader::read_series},
};

pub async fn crop(config: &RunConfig, input: &Path, variable: &str, output: &Path) -> Result<String> {
    let bar = create_spinner(format!("Cropping `{}`", input.display()));

    let series = read_series(input, variable)?;
    let (mask_grid, mask) = open_mask(&config.mask_file)?;
    let cropped = crop_to_mask(&series, &mask_grid, &mask)?;

    let units = variable_units(input, variable).unwrap_or_default();
    let source = input
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_default();
    write_series(output, &cropped, variable, &units, &Provenance::new(&source))?;

    bar.finish_with_message(format!("Cropped to {:?}", cropped.grid.shape()));

    Ok(display(output))
}

fn variable_units(path: &Path, variable: &str) -> Option<String> {
    let file = netcdf::open(path).ok()?;
    match file.variable(variable)?.attribute_value("units")? {
        Ok(netcdf::AttributeValue::Str(units)) => Some(units),
        _ => None,
    }
}

// -- Tests -------------------------------------------------------------------
