//! Restricting rasters and series to the cells inside the country mask.

use ndarray::{Array2, Axis, Zip};

use super::{Grid, Mask, Window};
use crate::{
    error::{PipelineError, PipelineResult},
    series::GriddedSeries,
};

/// Coordinates closer than this are treated as the same grid point.
const COORD_TOLERANCE: f64 = 1e-4;

/// Sets every cell outside the mask to NaN. Inside cells keep their value.
pub fn apply_mask(data: &Array2<f64>, mask: &Mask) -> PipelineResult<Array2<f64>> {
    if data.dim() != mask.dim() {
        return Err(PipelineError::GridMismatch {
            expected: mask.dim(),
            found: data.dim(),
        });
    }

    let mut out = data.clone();
    Zip::from(&mut out).and(mask.cells()).for_each(|v, &inside| {
        if !inside {
            *v = f64::NAN;
        }
    });

    Ok(out)
}

/// Re-expresses `mask` (defined on `mask_grid`) on `target` by matching coordinates.
/// Target cells with no counterpart on the mask grid count as outside.
pub fn align_mask(mask: &Mask, mask_grid: &Grid, target: &Grid) -> Mask {
    let rows: Vec<Option<usize>> = target.lat.iter().map(|v| find_coord(&mask_grid.lat, *v)).collect();
    let cols: Vec<Option<usize>> = target.lon.iter().map(|v| find_coord(&mask_grid.lon, *v)).collect();

    let cells = Array2::from_shape_fn(target.shape(), |(i, j)| match (rows[i], cols[j]) {
        (Some(r), Some(c)) => mask.is_inside(r, c),
        _ => false,
    });

    Mask::new(cells)
}

fn find_coord(axis: &[f64], value: f64) -> Option<usize> {
    axis.iter().position(|v| (v - value).abs() < COORD_TOLERANCE)
}

/// The smallest window holding every inside cell.
pub fn mask_window(grid: &Grid, mask: &Mask) -> Window {
    let cells = mask.cells();
    let rows = cells
        .axis_iter(Axis(0))
        .enumerate()
        .filter(|(_, row)| row.iter().any(|inside| *inside))
        .map(|(i, _)| i)
        .collect();
    let cols = cells
        .axis_iter(Axis(1))
        .enumerate()
        .filter(|(_, col)| col.iter().any(|inside| *inside))
        .map(|(j, _)| j)
        .collect();

    Window::new(grid, rows, cols)
}

/// Masks every date of `series` and drops the rows and columns with no inside cell.
pub fn crop_to_mask(series: &GriddedSeries, mask_grid: &Grid, mask: &Mask) -> PipelineResult<GriddedSeries> {
    let mask = align_mask(mask, mask_grid, &series.grid);
    let window = mask_window(&series.grid, &mask);
    if window.is_empty() {
        return Err(PipelineError::Config(
            "no cell of the series grid lies inside the mask".to_string(),
        ));
    }
    let window_mask = Mask::new(
        mask.cells()
            .select(Axis(0), &window.lat_indices)
            .select(Axis(1), &window.lon_indices),
    );

    let days = (0..series.len())
        .map(|t| apply_mask(&window.extract(&series.day(t)), &window_mask))
        .collect::<PipelineResult<Vec<_>>>()?;

    let (nlat, nlon) = window.grid.shape();
    let views: Vec<_> = days.iter().map(|d| d.view()).collect();
    let values = if views.is_empty() {
        ndarray::Array3::zeros((0, nlat, nlon))
    } else {
        ndarray::stack(Axis(0), &views)
            .map_err(|e| PipelineError::Config(format!("cannot stack rasters: {}", e)))?
    };

    Ok(GriddedSeries {
        grid: window.grid,
        dates: series.dates.clone(),
        values,
    })
}

// -- Tests -------------------------------------------------------------------
