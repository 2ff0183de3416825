//! Index-exact subsetting of a grid to a lat/lon rectangle.

use ndarray::{Array2, Axis};

use super::Grid;

#[derive(Debug, Clone, Copy, PartialEq)]
/// Inclusive lat/lon rectangle in degrees.
pub struct BoundingBox {
    pub lat_min: f64,
    pub lat_max: f64,
    pub lon_min: f64,
    pub lon_max: f64,
}

pub const HONDURAS: BoundingBox = BoundingBox {
    lat_min: 12.5,
    lat_max: 16.5,
    lon_min: -90.0,
    lon_max: -83.0,
};

impl BoundingBox {
    pub fn lat_indices(&self, lat: &[f64]) -> Vec<usize> {
        indices_within(lat, self.lat_min, self.lat_max)
    }

    pub fn lon_indices(&self, lon: &[f64]) -> Vec<usize> {
        indices_within(lon, self.lon_min, self.lon_max)
    }

    pub fn window(&self, grid: &Grid) -> Window {
        Window::new(grid, self.lat_indices(&grid.lat), self.lon_indices(&grid.lon))
    }
}

fn indices_within(axis: &[f64], min: f64, max: f64) -> Vec<usize> {
    axis.iter()
        .enumerate()
        .filter(|(_, v)| **v >= min && **v <= max)
        .map(|(i, _)| i)
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
/// Row and column indices into a parent grid, plus the sub-grid they select.
pub struct Window {
    pub lat_indices: Vec<usize>,
    pub lon_indices: Vec<usize>,
    pub grid: Grid,
}

impl Window {
    pub fn new(parent: &Grid, lat_indices: Vec<usize>, lon_indices: Vec<usize>) -> Self {
        let grid = Grid::new(
            lat_indices.iter().map(|&i| parent.lat[i]).collect(),
            lon_indices.iter().map(|&j| parent.lon[j]).collect(),
        );

        Window {
            lat_indices,
            lon_indices,
            grid,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.lat_indices.is_empty() || self.lon_indices.is_empty()
    }

    pub fn extract(&self, data: &Array2<f64>) -> Array2<f64> {
        data.select(Axis(0), &self.lat_indices)
            .select(Axis(1), &self.lon_indices)
    }
}

// -- Tests -------------------------------------------------------------------
