//! One day of ET0 over the whole grid.

use ndarray::{Array2, Zip};

use super::{penman_monteith_with, CellInputs, SolarGeometry};
use crate::{
    error::{PipelineError, PipelineResult},
    raster::{Grid, Mask},
};

#[derive(Debug, Clone)]
/// The five rasters for one date, all on the run's grid.
pub struct DailyInputs {
    pub tmax: Array2<f64>,
    pub tmin: Array2<f64>,
    pub humidity: Array2<f64>,
    pub wind: Array2<f64>,
    pub shortwave: Array2<f64>,
}

impl DailyInputs {
    pub fn check(&self, grid: &Grid) -> PipelineResult<()> {
        for raster in [&self.tmax, &self.tmin, &self.humidity, &self.wind, &self.shortwave] {
            grid.check(raster)?;
        }

        Ok(())
    }

    fn cell(&self, row: usize, col: usize) -> CellInputs {
        CellInputs::from_extremes(
            self.tmax[[row, col]],
            self.tmin[[row, col]],
            self.humidity[[row, col]],
            self.wind[[row, col]],
            self.shortwave[[row, col]],
        )
    }
}

/// Evaluates every inside cell in parallel; outside cells are NaN.
///
/// Solar geometry depends only on latitude, so it is computed once per row.
pub fn compute_day(
    inputs: &DailyInputs,
    grid: &Grid,
    mask: &Mask,
    doy: u32,
    pressure: f64,
) -> PipelineResult<Array2<f64>> {
    inputs.check(grid)?;
    if mask.dim() != grid.shape() {
        return Err(PipelineError::GridMismatch {
            expected: grid.shape(),
            found: mask.dim(),
        });
    }

    let solar: Vec<SolarGeometry> = grid
        .lat
        .iter()
        .map(|lat| SolarGeometry::new(*lat, doy))
        .collect();

    let mut et0 = Array2::from_elem(grid.shape(), f64::NAN);
    Zip::indexed(&mut et0).par_for_each(|(i, j), out| {
        if mask.is_inside(i, j) {
            *out = penman_monteith_with(&inputs.cell(i, j), &solar[i], pressure);
        }
    });

    Ok(et0)
}

// -- Tests -------------------------------------------------------------------
