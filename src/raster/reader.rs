//! Reading rasters from NetCDF files.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use ndarray::{Array2, Array3};
use tracing::debug;

use super::{Grid, Mask, RasterSource, Variable};
use crate::{
    dates::{decode_time, julian_stamp, TIME_UNITS},
    error::{PipelineError, PipelineResult},
    series::GriddedSeries,
};

/// Daily MSWX files laid out as `<root>/<Folder>/<YYYYjjj>.nc`.
#[derive(Debug, Clone)]
pub struct NetCdfSource {
    root: PathBuf,
    grid: Grid,
}

impl NetCdfSource {
    pub fn new(root: impl Into<PathBuf>, grid: Grid) -> Self {
        NetCdfSource {
            root: root.into(),
            grid,
        }
    }

    pub fn path_for(&self, variable: Variable, date: NaiveDate) -> PathBuf {
        self.root
            .join(variable.folder())
            .join(format!("{}.nc", julian_stamp(date)))
    }
}

impl RasterSource for NetCdfSource {
    fn load(&self, variable: Variable, date: NaiveDate) -> PipelineResult<Array2<f64>> {
        let path = self.path_for(variable, date);
        if !path.exists() {
            return Err(PipelineError::MissingInput { path, date });
        }

        debug!(path = %path.display(), variable = variable.nc_name(), "reading raster");
        let raster = read_raster(&path, variable.nc_name())?;
        self.grid.check(&raster)?;

        Ok(raster)
    }
}

/// Reads the grid axes and the inside/outside mask from the mask file.
pub fn open_mask(path: &Path) -> PipelineResult<(Grid, Mask)> {
    let file = netcdf::open(path)?;

    let lat = read_axis(&file, path, "lat")?;
    let lon = read_axis(&file, path, "lon")?;
    let grid = Grid::new(lat, lon);

    let values = read_raster(path, "mask")?;
    grid.check(&values)?;

    Ok((grid, Mask::from_values(&values)))
}

/// Reads a 1-D coordinate variable.
pub fn read_axis(file: &netcdf::File, path: &Path, name: &str) -> PipelineResult<Vec<f64>> {
    let var = file
        .variable(name)
        .ok_or_else(|| PipelineError::malformed(path, format!("no `{}` variable", name)))?;

    read_values(&var).map_err(|e| PipelineError::malformed(path, format!("cannot read `{}`: {}", name, e)))
}

/// Reads `name` as a `(lat, lon)` raster.
///
/// A leading time axis is collapsed by taking its first slice, and a `(lon, lat)` layout is
/// transposed.
pub fn read_raster(path: &Path, name: &str) -> PipelineResult<Array2<f64>> {
    let file = netcdf::open(path).map_err(|e| PipelineError::malformed(path, e.to_string()))?;

    let var = file
        .variable(name)
        .ok_or_else(|| PipelineError::malformed(path, format!("no `{}` variable", name)))?;

    let dims: Vec<(String, usize)> = var
        .dimensions()
        .iter()
        .map(|d| (d.name(), d.len()))
        .collect();
    if dims.len() < 2 {
        return Err(PipelineError::malformed(
            path,
            format!("`{}` has {} dimensions, expected at least 2", name, dims.len()),
        ));
    }

    let (first, second) = (&dims[dims.len() - 2], &dims[dims.len() - 1]);
    let transposed = match (first.0.as_str(), second.0.as_str()) {
        ("lat", "lon") => false,
        ("lon", "lat") => true,
        _ => {
            return Err(PipelineError::malformed(
                path,
                format!("`{}` is not laid out on lat/lon ({}, {})", name, first.0, second.0),
            ))
        }
    };

    let values = read_values(&var).map_err(|e| PipelineError::malformed(path, e.to_string()))?;
    let packing = Packing::of(&var);

    let slice_len = first.1 * second.1;
    if values.len() < slice_len {
        return Err(PipelineError::malformed(path, format!("`{}` holds no data", name)));
    }

    let slice: Vec<f64> = values[..slice_len]
        .iter()
        .map(|v| packing.unpack(*v))
        .collect();

    let raster = Array2::from_shape_vec((first.1, second.1), slice)
        .map_err(|e| PipelineError::malformed(path, e.to_string()))?;

    Ok(if transposed {
        raster.reversed_axes().as_standard_layout().to_owned()
    } else {
        raster
    })
}

/// Reads a whole `(time, lat, lon)` variable together with its axes.
pub fn read_series(path: &Path, name: &str) -> PipelineResult<GriddedSeries> {
    let file = netcdf::open(path).map_err(|e| PipelineError::malformed(path, e.to_string()))?;

    let grid = Grid::new(read_axis(&file, path, "lat")?, read_axis(&file, path, "lon")?);
    let dates = read_dates(&file, path)?;

    let var = file
        .variable(name)
        .ok_or_else(|| PipelineError::malformed(path, format!("no `{}` variable", name)))?;
    let dims: Vec<String> = var.dimensions().iter().map(|d| d.name()).collect();
    if dims != ["time", "lat", "lon"] {
        return Err(PipelineError::malformed(
            path,
            format!("`{}` is laid out as {:?}, expected (time, lat, lon)", name, dims),
        ));
    }

    let packing = Packing::of(&var);
    let values: Vec<f64> = read_values(&var)
        .map_err(|e| PipelineError::malformed(path, e.to_string()))?
        .into_iter()
        .map(|v| packing.unpack(v))
        .collect();

    let (nlat, nlon) = grid.shape();
    let values = Array3::from_shape_vec((dates.len(), nlat, nlon), values)
        .map_err(|e| PipelineError::malformed(path, e.to_string()))?;

    Ok(GriddedSeries { grid, dates, values })
}

fn read_dates(file: &netcdf::File, path: &Path) -> PipelineResult<Vec<NaiveDate>> {
    let var = file
        .variable("time")
        .ok_or_else(|| PipelineError::malformed(path, "no `time` variable"))?;
    let units = match var.attribute_value("units") {
        Some(Ok(netcdf::AttributeValue::Str(units))) => units,
        _ => TIME_UNITS.to_string(),
    };

    read_values(&var)
        .map_err(|e| PipelineError::malformed(path, e.to_string()))?
        .into_iter()
        .map(|v| decode_time(&units, v).map_err(|e| PipelineError::malformed(path, e.to_string())))
        .collect()
}

/// Reads every value of `var` as `f64`, whatever type it is stored as.
pub fn read_values(var: &netcdf::Variable) -> Result<Vec<f64>, netcdf::Error> {
    if let Ok(values) = var.get_values::<f64, _>(..) {
        return Ok(values);
    }
    if let Ok(values) = var.get_values::<f32, _>(..) {
        return Ok(values.into_iter().map(f64::from).collect());
    }
    if let Ok(values) = var.get_values::<i32, _>(..) {
        return Ok(values.into_iter().map(f64::from).collect());
    }
    if let Ok(values) = var.get_values::<i16, _>(..) {
        return Ok(values.into_iter().map(f64::from).collect());
    }
    if let Ok(values) = var.get_values::<u8, _>(..) {
        return Ok(values.into_iter().map(f64::from).collect());
    }

    var.get_values::<i8, _>(..)
        .map(|values| values.into_iter().map(f64::from).collect())
}

/// CF packing of a variable: stored fill values and the `scale_factor`/`add_offset` pair.
#[derive(Debug, Clone, PartialEq)]
struct Packing {
    fill: Vec<f64>,
    scale: f64,
    offset: f64,
}

impl Packing {
    fn of(var: &netcdf::Variable) -> Self {
        let fill = ["_FillValue", "missing_value"]
            .iter()
            .filter_map(|name| numeric_attribute(var, name))
            .collect();

        Packing {
            fill,
            scale: numeric_attribute(var, "scale_factor").unwrap_or(1.0),
            offset: numeric_attribute(var, "add_offset").unwrap_or(0.0),
        }
    }

    /// Fill values are compared before unpacking, as stored.
    fn unpack(&self, stored: f64) -> f64 {
        if self.fill.contains(&stored) {
            f64::NAN
        } else {
            stored * self.scale + self.offset
        }
    }
}

fn numeric_attribute(var: &netcdf::Variable, name: &str) -> Option<f64> {
    if !var.attributes().any(|attr| attr.name() == name) {
        return None;
    }

    var.attribute_value(name)?
        .ok()
        .and_then(|value| f64::try_from(value).ok())
}

// -- Tests -------------------------------------------------------------------
