pub mod crop;
pub mod et0;
pub mod imerg;
pub mod merge;
pub mod mswx;
pub mod run;
pub mod temp;

use std::path::Path;

pub use crop::crop;
pub use et0::et0;
pub use imerg::imerg;
pub use merge::merge;
pub use mswx::mswx;
pub use run::run;
pub use temp::temp;

pub(crate) fn display(path: &Path) -> String {
    path.to_string_lossy().to_string()
}

/// Small NetCDF files laid out the way the data portals deliver them.
#[cfg(test)]
pub(crate) mod fixtures {
    use std::path::Path;

    /// Writes `name` on a `(lat, lon)` grid, with a leading `time` axis when `with_time`.
    pub fn write_grid_file(path: &Path, lat: &[f32], lon: &[f32], name: &str, values: &[f32], with_time: bool) {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }

        let mut file = netcdf::create(path).unwrap();
        if with_time {
            file.add_dimension("time", 1).unwrap();
        }
        file.add_dimension("lat", lat.len()).unwrap();
        file.add_dimension("lon", lon.len()).unwrap();

        let mut var = file.add_variable::<f32>("lat", &["lat"]).unwrap();
        var.put_values(lat, ..).unwrap();
        let mut var = file.add_variable::<f32>("lon", &["lon"]).unwrap();
        var.put_values(lon, ..).unwrap();

        let dims: &[&str] = if with_time {
            &["time", "lat", "lon"]
        } else {
            &["lat", "lon"]
        };
        let mut var = file.add_variable::<f32>(name, dims).unwrap();
        var.put_attribute("units", "mm/day").unwrap();
        var.put_values(values, ..).unwrap();
    }

    pub fn write_mask(path: &Path, lat: &[f32], lon: &[f32], cells: &[f32]) {
        write_grid_file(path, lat, lon, "mask", cells, false);
    }
}
