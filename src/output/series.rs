//! Save a merged or cropped series of daily rasters.

use std::path::Path;

use tracing::info;

use super::{add_data_variable, array_to_f32, create_with_axes, Provenance};
use crate::{error::PipelineResult, series::GriddedSeries};

pub fn write_series(
    path: &Path,
    series: &GriddedSeries,
    variable: &str,
    units: &str,
    provenance: &Provenance,
) -> PipelineResult<()> {
    let mut file = create_with_axes(path, &series.grid, &series.dates)?;
    provenance.write(&mut file)?;
    file.add_attribute("units", units)?;

    add_data_variable(
        &mut file,
        variable,
        &["time", "lat", "lon"],
        units,
        variable,
        &array_to_f32(series.values.iter()),
    )?;

    info!(path = %path.display(), variable, dates = series.len(), "series written");

    Ok(())
}

// -- Tests -------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use ndarray::Array3;
    use tempfile::TempDir;

    use super::*;
    use crate::raster::{
        reader::{read_raster, read_series},
        Grid,
    };

    #[test]
    fn should_be_readable_as_a_raster() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("forecast").join("RAIN_forecast_Honduras.nc");
        let series = GriddedSeries {
            grid: Grid::new(vec![13.0, 14.0], vec![-88.0, -87.0, -86.0]),
            dates: vec![
                NaiveDate::from_ymd_opt(2024, 7, 5).unwrap(),
                NaiveDate::from_ymd_opt(2024, 7, 6).unwrap(),
            ],
            values: Array3::from_shape_fn((2, 2, 3), |(t, i, j)| (t * 6 + i * 3 + j) as f64),
        };

        write_series(&path, &series, "precipitation", "mm/day", &Provenance::new("forecast")).unwrap();

        // the leading slice is the first date
        let first = read_raster(&path, "precipitation").unwrap();
        assert_eq!(first, series.day(0));

        // so is the whole series, dates included
        let reread = read_series(&path, "precipitation").unwrap();
        assert_eq!(reread, series);

        let file = netcdf::open(&path).unwrap();
        let var = file.variable("precipitation").unwrap();
        match var.attribute("units").unwrap().value().unwrap() {
            netcdf::AttributeValue::Str(s) => assert_eq!(s, "mm/day"),
            other => panic!("unexpected units attribute: {:?}", other),
        }
    }
}
