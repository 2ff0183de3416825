//! Dated stacks of 2-D rasters.

use chrono::NaiveDate;
use ndarray::{Array2, Array3, Axis};

use crate::{
    error::{PipelineError, PipelineResult},
    raster::Grid,
};

#[derive(Debug, Clone, PartialEq)]
/// A `(time, lat, lon)` array with its axes.
pub struct GriddedSeries {
    pub grid: Grid,
    pub dates: Vec<NaiveDate>,
    pub values: Array3<f64>,
}

impl GriddedSeries {
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Element-wise sum over time. NaN entries are skipped, but a cell that is NaN on every
    /// date stays NaN so masked-out cells remain undefined.
    pub fn sum_over_time(&self) -> Array2<f64> {
        let (_, nlat, nlon) = self.values.dim();
        let mut sum = Array2::from_elem((nlat, nlon), f64::NAN);

        for day in self.values.axis_iter(Axis(0)) {
            ndarray::Zip::from(&mut sum).and(&day).for_each(|acc, &v| {
                if v.is_nan() {
                    return;
                }
                *acc = if acc.is_nan() { v } else { *acc + v };
            });
        }

        sum
    }

    pub fn day(&self, index: usize) -> Array2<f64> {
        self.values.index_axis(Axis(0), index).to_owned()
    }
}

/// Collects one raster per processed date, in the order the caller appends them.
///
/// No sorting or gap filling happens here: a skipped date just leaves the series one entry
/// shorter.
#[derive(Debug)]
pub struct SeriesBuilder {
    grid: Grid,
    dates: Vec<NaiveDate>,
    rasters: Vec<Array2<f64>>,
}

impl SeriesBuilder {
    pub fn new(grid: Grid) -> Self {
        SeriesBuilder {
            grid,
            dates: Vec::new(),
            rasters: Vec::new(),
        }
    }

    pub fn append(&mut self, date: NaiveDate, raster: Array2<f64>) -> PipelineResult<()> {
        self.grid.check(&raster)?;
        self.dates.push(date);
        self.rasters.push(raster);

        Ok(())
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn finalize(self) -> PipelineResult<GriddedSeries> {
        let (nlat, nlon) = self.grid.shape();
        let views: Vec<_> = self.rasters.iter().map(|r| r.view()).collect();

        let values = if views.is_empty() {
            Array3::zeros((0, nlat, nlon))
        } else {
            ndarray::stack(Axis(0), &views).map_err(|e| {
                PipelineError::Config(format!("cannot stack rasters: {}", e))
            })?
        };

        Ok(GriddedSeries {
            grid: self.grid,
            dates: self.dates,
            values,
        })
    }
}

// -- Tests -------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use ndarray::array;

    use super::*;

    fn ymd(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 7, d).unwrap()
    }

    fn grid() -> Grid {
        Grid::new(vec![14.0, 15.0], vec![-87.0, -86.0])
    }

    #[test]
    fn should_stack_in_append_order() {
        let mut builder = SeriesBuilder::new(grid());
        builder.append(ymd(5), array![[1.0, 2.0], [3.0, 4.0]]).unwrap();
        builder.append(ymd(7), array![[5.0, 6.0], [7.0, 8.0]]).unwrap();

        let series = builder.finalize().unwrap();

        assert_eq!(series.dates, vec![ymd(5), ymd(7)]);
        assert_eq!(series.values.dim(), (2, 2, 2));
        assert_eq!(series.day(1), array![[5.0, 6.0], [7.0, 8.0]]);
    }

    #[test]
    fn should_sum_over_time_per_cell() {
        let mut builder = SeriesBuilder::new(grid());
        builder.append(ymd(5), array![[1.0, 2.0], [3.0, 4.0]]).unwrap();
        builder.append(ymd(6), array![[0.5, 0.5], [0.5, 0.5]]).unwrap();
        builder.append(ymd(7), array![[1.0, 1.0], [1.0, 1.0]]).unwrap();

        let series = builder.finalize().unwrap();
        let sum = series.sum_over_time();

        for ((i, j), value) in sum.indexed_iter() {
            let expected: f64 = (0..series.len()).map(|t| series.values[[t, i, j]]).sum();
            assert_eq!(*value, expected);
        }
    }

    #[test]
    fn should_keep_all_nan_cells_undefined_in_sum() {
        let mut builder = SeriesBuilder::new(grid());
        builder.append(ymd(5), array![[f64::NAN, 2.0], [f64::NAN, 4.0]]).unwrap();
        builder.append(ymd(6), array![[f64::NAN, 1.0], [3.0, f64::NAN]]).unwrap();

        let sum = builder.finalize().unwrap().sum_over_time();

        assert!(sum[[0, 0]].is_nan());
        assert_eq!(sum[[0, 1]], 3.0);
        assert_eq!(sum[[1, 0]], 3.0);
        assert_eq!(sum[[1, 1]], 4.0);
    }

    #[test]
    fn should_reject_raster_off_grid() {
        let mut builder = SeriesBuilder::new(grid());

        assert!(builder.append(ymd(5), Array2::zeros((3, 2))).is_err());
        assert!(builder.is_empty());
    }

    #[test]
    fn should_finalize_empty_series() {
        let series = SeriesBuilder::new(grid()).finalize().unwrap();

        assert!(series.is_empty());
        assert_eq!(series.values.dim(), (0, 2, 2));
        assert!(series.sum_over_time().iter().all(|v| v.is_nan()));
    }
}
