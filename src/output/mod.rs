//! Handles writing gridded results to disk in the _NetCDF_ format.

pub mod et0;
pub mod series;

use std::{fs, path::Path};

use chrono::{Local, NaiveDate};

use crate::{
    dates::{days_since_epoch, TIME_UNITS},
    error::PipelineResult,
    raster::Grid,
};

pub use et0::write_et0;
pub use series::write_series;

#[derive(Debug, Clone, PartialEq)]
/// Global attributes stamped on every output file.
pub struct Provenance {
    pub author: String,
    pub originaldata: String,
    pub created: NaiveDate,
}

impl Provenance {
    pub fn new(originaldata: &str) -> Self {
        Provenance {
            author: "CGIAR-AgriLAC, CENAOS-COPECO".to_string(),
            originaldata: originaldata.to_string(),
            created: Local::now().date_naive(),
        }
    }

    pub fn mswx() -> Self {
        Self::new("MSWX Near Real Time")
    }

    fn write(&self, file: &mut netcdf::FileMut) -> PipelineResult<()> {
        file.add_attribute("author", self.author.as_str())?;
        file.add_attribute("originaldata", self.originaldata.as_str())?;
        file.add_attribute("created", self.created.format("%Y-%m-%d").to_string().as_str())?;

        Ok(())
    }
}

/// Creates the file (and its folder) with `lon`, `lat` and `time` dimensions and their
/// coordinate variables filled in.
fn create_with_axes(path: &Path, grid: &Grid, dates: &[NaiveDate]) -> PipelineResult<netcdf::FileMut> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut file = netcdf::create(path)?;
    file.add_dimension("lon", grid.lon.len())?;
    file.add_dimension("lat", grid.lat.len())?;
    file.add_dimension("time", dates.len())?;

    {
        let mut lon = file.add_variable::<f32>("lon", &["lon"])?;
        lon.put_attribute("units", "degrees_east")?;
        lon.put_attribute("long_name", "Geographic longitude")?;
        lon.put_values(&to_f32(&grid.lon), ..)?;
    }
    {
        let mut lat = file.add_variable::<f32>("lat", &["lat"])?;
        lat.put_attribute("units", "degrees_north")?;
        lat.put_attribute("long_name", "Geographic latitude")?;
        lat.put_values(&to_f32(&grid.lat), ..)?;
    }
    {
        let mut time = file.add_variable::<f64>("time", &["time"])?;
        time.put_attribute("units", TIME_UNITS)?;
        time.put_attribute("long_name", "Time")?;
        time.put_attribute("calendar", "standard")?;
        let days: Vec<f64> = dates.iter().map(|d| days_since_epoch(*d)).collect();
        if !days.is_empty() {
            time.put_values(&days, ..)?;
        }
    }

    Ok(file)
}

/// Adds a float data variable with units, long name and a NaN fill value.
fn add_data_variable(
    file: &mut netcdf::FileMut,
    name: &str,
    dims: &[&str],
    units: &str,
    long_name: &str,
    values: &[f32],
) -> PipelineResult<()> {
    let mut var = file.add_variable::<f32>(name, dims)?;
    var.put_attribute("_FillValue", f32::NAN)?;
    var.put_attribute("units", units)?;
    var.put_attribute("long_name", long_name)?;
    if !values.is_empty() {
        var.put_values(values, ..)?;
    }

    Ok(())
}

fn to_f32(values: &[f64]) -> Vec<f32> {
    values.iter().map(|v| *v as f32).collect()
}

fn array_to_f32<'a>(values: impl IntoIterator<Item = &'a f64>) -> Vec<f32> {
    values.into_iter().map(|v| *v as f32).collect()
}
