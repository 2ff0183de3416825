//! Compute daily ET0 over Honduras from the downloaded MSWX inputs.

use anyhow::{anyhow, Result};
use tracing::info;

use super::display;
use crate::{
    cli::{create_progress_bar, create_spinner},
    config::RunConfig,
    dates::DateRange,
    et0::pipeline::{self, Et0Options},
    output::{write_et0, Provenance},
    raster::{open_mask, NetCdfSource},
};

pub async fn et0(config: &RunConfig, range: &DateRange, pressure: f64) -> Result<String> {
    let bar = create_spinner(format!("Loading mask `{}`", config.mask_file.display()));
    let (grid, mask) = open_mask(&config.mask_file)?;
    bar.finish_with_message(format!("Mask loaded: {} cells inside", mask.count_inside()));

    let source = NetCdfSource::new(config.mswx_input_dir(), grid.clone());
    let options = Et0Options {
        pressure,
        ..Et0Options::default()
    };

    let bar = create_progress_bar(range.len() as u64, "Computing ET0".to_string());
    let outcome = pipeline::run(&source, &grid, &mask, range, &options, &bar)?;
    bar.finish_with_message(format!("ET0 computed for {} dates", outcome.series.len()));

    if outcome.series.is_empty() {
        return Err(anyhow!(
            "no date between {} and {} had all five MSWX inputs under `{}`",
            range.first,
            range.last,
            config.mswx_input_dir().display()
        ));
    }
    if !outcome.skipped.is_empty() {
        info!(skipped = outcome.skipped.len(), "some dates were left out of the ET0 series");
    }

    let path = config.et0_output_file();
    write_et0(&path, &outcome.series, &Provenance::mswx())?;

    Ok(display(&path))
}

// -- Tests -------------------------------------------------------------------
