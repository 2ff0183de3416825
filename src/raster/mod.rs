//! Gridded inputs: the shared lat/lon grid, the country mask and the daily variable rasters.

pub mod bbox;
pub mod crop;
pub mod reader;

use chrono::NaiveDate;
use ndarray::Array2;

use crate::error::{PipelineError, PipelineResult};

pub use bbox::{BoundingBox, Window, HONDURAS};
pub use crop::{apply_mask, crop_to_mask};
pub use reader::{open_mask, NetCdfSource};

#[derive(Debug, Clone, PartialEq)]
/// Ordered latitude and longitude axes. Every raster in a run shares one grid.
pub struct Grid {
    pub lat: Vec<f64>,
    pub lon: Vec<f64>,
}

impl Grid {
    pub fn new(lat: Vec<f64>, lon: Vec<f64>) -> Self {
        Grid { lat, lon }
    }

    /// `(lat, lon)` lengths, matching the row/column layout of every raster.
    pub fn shape(&self) -> (usize, usize) {
        (self.lat.len(), self.lon.len())
    }

    pub fn check(&self, raster: &Array2<f64>) -> PipelineResult<()> {
        if raster.dim() != self.shape() {
            return Err(PipelineError::GridMismatch {
                expected: self.shape(),
                found: raster.dim(),
            });
        }

        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
/// Cells inside the area of interest are `true`.
pub struct Mask {
    cells: Array2<bool>,
}

impl Mask {
    pub fn new(cells: Array2<bool>) -> Self {
        Mask { cells }
    }

    /// A cell is inside when its stored value is exactly 1.
    pub fn from_values(values: &Array2<f64>) -> Self {
        Mask {
            cells: values.mapv(|v| v == 1.0),
        }
    }

    pub fn cells(&self) -> &Array2<bool> {
        &self.cells
    }

    pub fn dim(&self) -> (usize, usize) {
        self.cells.dim()
    }

    pub fn is_inside(&self, row: usize, col: usize) -> bool {
        self.cells[[row, col]]
    }

    pub fn count_inside(&self) -> usize {
        self.cells.iter().filter(|inside| **inside).count()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// MSWX variables, one folder of daily files each.
pub enum Variable {
    Tmax,
    Tmin,
    RelHum,
    Wind,
    SWd,
    Temp,
}

impl Variable {
    /// The five rasters one day of ET0 needs.
    pub const ET0_INPUTS: [Variable; 5] = [
        Variable::Tmax,
        Variable::Tmin,
        Variable::RelHum,
        Variable::Wind,
        Variable::SWd,
    ];

    pub const ALL: [Variable; 6] = [
        Variable::Tmax,
        Variable::Tmin,
        Variable::RelHum,
        Variable::Wind,
        Variable::SWd,
        Variable::Temp,
    ];

    pub fn folder(&self) -> &'static str {
        match self {
            Variable::Tmax => "Tmax",
            Variable::Tmin => "Tmin",
            Variable::RelHum => "RelHum",
            Variable::Wind => "Wind",
            Variable::SWd => "SWd",
            Variable::Temp => "Temp",
        }
    }

    /// Name of the data variable inside the NetCDF file.
    pub fn nc_name(&self) -> &'static str {
        match self {
            Variable::Tmax | Variable::Tmin | Variable::Temp => "air_temperature",
            Variable::RelHum => "relative_humidity",
            Variable::Wind => "wind_speed",
            Variable::SWd => "downward_shortwave_radiation",
        }
    }

    pub fn from_folder(folder: &str) -> Option<Self> {
        Variable::ALL.into_iter().find(|v| v.folder() == folder)
    }
}

/// Opens one day's raster of one variable.
pub trait RasterSource {
    fn load(&self, variable: Variable, date: NaiveDate) -> PipelineResult<Array2<f64>>;
}

// -- Tests -------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use ndarray::array;

    use super::*;

    #[test]
    fn should_build_mask_from_values() {
        let mask = Mask::from_values(&array![[1.0, 0.0], [f64::NAN, 1.0]]);

        assert!(mask.is_inside(0, 0));
        assert!(!mask.is_inside(0, 1));
        assert!(!mask.is_inside(1, 0));
        assert!(mask.is_inside(1, 1));
        assert_eq!(mask.count_inside(), 2);
    }

    #[test]
    fn should_reject_raster_of_other_shape() {
        let grid = Grid::new(vec![13.0, 14.0], vec![-88.0, -87.0, -86.0]);

        assert!(grid.check(&Array2::zeros((2, 3))).is_ok());
        assert!(matches!(
            grid.check(&Array2::zeros((3, 2))),
            Err(PipelineError::GridMismatch {
                expected: (2, 3),
                found: (3, 2)
            })
        ));
    }

    #[test]
    fn should_map_folders_to_variables() {
        assert_eq!(Variable::from_folder("SWd"), Some(Variable::SWd));
        assert_eq!(Variable::from_folder("Precip"), None);
        assert_eq!(Variable::Tmin.nc_name(), "air_temperature");
        assert_eq!(Variable::Wind.nc_name(), "wind_speed");
    }
}
