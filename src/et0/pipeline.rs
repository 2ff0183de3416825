//! Drives the ET0 computation over a date range.

use chrono::{Datelike, NaiveDate};
use indicatif::ProgressBar;
use tracing::{info, warn};

use super::{
    grid::{compute_day, DailyInputs},
    STANDARD_PRESSURE,
};
use crate::{
    dates::{julian_stamp, DateRange},
    error::{PipelineError, PipelineResult},
    raster::{BoundingBox, Grid, Mask, RasterSource, Variable, HONDURAS},
    series::{GriddedSeries, SeriesBuilder},
};

#[derive(Debug, Clone, Copy)]
pub struct Et0Options {
    /// Atmospheric pressure (kPa).
    pub pressure: f64,
    pub bbox: BoundingBox,
}

impl Default for Et0Options {
    fn default() -> Self {
        Et0Options {
            pressure: STANDARD_PRESSURE,
            bbox: HONDURAS,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkippedDate {
    pub date: NaiveDate,
    pub reason: String,
}

#[derive(Debug)]
pub struct Et0Outcome {
    /// One entry per date that had all five inputs.
    pub series: GriddedSeries,
    pub skipped: Vec<SkippedDate>,
}

/// Computes ET0 for every date in `range`, cropped to `options.bbox`.
///
/// A date with a missing or unreadable input is logged and left out, so the resulting time
/// axis can be shorter than the range.
pub fn run(
    source: &dyn RasterSource,
    grid: &Grid,
    mask: &Mask,
    range: &DateRange,
    options: &Et0Options,
    progress: &ProgressBar,
) -> PipelineResult<Et0Outcome> {
    if mask.dim() != grid.shape() {
        return Err(PipelineError::Config(format!(
            "mask is {:?} but the grid is {:?}",
            mask.dim(),
            grid.shape()
        )));
    }

    let window = options.bbox.window(grid);
    if window.is_empty() {
        return Err(PipelineError::Config(
            "bounding box does not intersect the mask grid".to_string(),
        ));
    }

    let mut builder = SeriesBuilder::new(window.grid.clone());
    let mut skipped = Vec::new();

    for date in range.iter() {
        progress.set_message(format!("ET0 {}", julian_stamp(date)));

        let day = load_inputs(source, grid, date)
            .and_then(|inputs| compute_day(&inputs, grid, mask, date.ordinal(), options.pressure));

        match day {
            Ok(et0) => builder.append(date, window.extract(&et0))?,
            Err(e) if e.is_recoverable() => {
                warn!(
                    date = %date,
                    stamp = %julian_stamp(date),
                    "skipping date: {}; see https://www.gloh2o.org/mswx/ to check data availability",
                    e
                );
                skipped.push(SkippedDate {
                    date,
                    reason: e.to_string(),
                });
            }
            Err(e) => return Err(e),
        }

        progress.inc(1);
    }

    info!(
        processed = builder.len(),
        skipped = skipped.len(),
        "ET0 computed for {} of {} dates",
        builder.len(),
        range.len()
    );

    Ok(Et0Outcome {
        series: builder.finalize()?,
        skipped,
    })
}

/// Loads the five inputs of `date`. A raster off `grid` fails the date like a missing file.
fn load_inputs(source: &dyn RasterSource, grid: &Grid, date: NaiveDate) -> PipelineResult<DailyInputs> {
    let [tmax, tmin, humidity, wind, shortwave] = Variable::ET0_INPUTS;

    let inputs = DailyInputs {
        tmax: source.load(tmax, date)?,
        tmin: source.load(tmin, date)?,
        humidity: source.load(humidity, date)?,
        wind: source.load(wind, date)?,
        shortwave: source.load(shortwave, date)?,
    };
    inputs.check(grid)?;

    Ok(inputs)
}

// -- Tests -------------------------------------------------------------------
