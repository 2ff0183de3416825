//! FAO-56 Penman-Monteith reference evapotranspiration.
//!
//! [`penman_monteith`] evaluates one cell; [`grid::compute_day`] applies it to every inside
//! cell of a day's rasters and [`pipeline::run`] drives it over a date range.

pub mod grid;
pub mod pipeline;

use std::f64::consts::PI;

/// Standard sea-level pressure (kPa), used when no pressure is given.
pub const STANDARD_PRESSURE: f64 = 101.325;

/// W/m² to MJ/m²/day.
pub const W_M2_TO_MJ_M2_DAY: f64 = 0.0864;

#[derive(Debug, Clone, Copy, PartialEq)]
/// Co-located daily values for one grid cell.
pub struct CellInputs {
    /// Mean air temperature (°C), the average of the daily max and min.
    pub temperature: f64,
    /// Relative humidity (%).
    pub humidity: f64,
    /// Wind speed (m/s).
    pub wind: f64,
    /// Incoming shortwave radiation (W/m²).
    pub shortwave: f64,
}

impl CellInputs {
    pub fn from_extremes(tmax: f64, tmin: f64, humidity: f64, wind: f64, shortwave: f64) -> Self {
        CellInputs {
            temperature: (tmax + tmin) / 2.0,
            humidity,
            wind,
            shortwave,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
/// Solar geometry for one latitude and day of year.
pub struct SolarGeometry {
    /// Inverse relative Earth-Sun distance.
    pub dr: f64,
    /// Solar declination (rad).
    pub declination: f64,
    /// Sunset hour angle (rad).
    pub sunset_angle: f64,
    /// Extraterrestrial radiation (MJ/m²/day).
    pub ra: f64,
}

impl SolarGeometry {
    /// The `acos` argument is clamped to [-1, 1], so polar night gives a zero sunset angle
    /// and polar day gives π instead of a domain error.
    pub fn new(latitude: f64, doy: u32) -> Self {
        let doy = doy as f64;
        let lat = latitude * PI / 180.0;

        let dr = 1.0 + 0.033 * (2.0 * PI / 365.0 * doy).cos();
        let declination = 0.409 * (2.0 * PI / 365.0 * doy - 1.39).sin();
        let sunset_angle = (-lat.tan() * declination.tan()).clamp(-1.0, 1.0).acos();
        let ra = (24.0 * 60.0 / PI)
            * 0.082
            * dr
            * (sunset_angle * lat.sin() * declination.sin()
                + lat.cos() * declination.cos() * sunset_angle.sin());

        SolarGeometry {
            dr,
            declination,
            sunset_angle,
            ra,
        }
    }
}

/// Saturation vapour pressure (kPa) at `t` °C.
pub fn saturation_vapour_pressure(t: f64) -> f64 {
    0.6108 * (17.27 * t / (t + 237.3)).exp()
}

/// Slope of the vapour pressure curve (kPa/°C) given `es` at `t` °C.
pub fn vapour_pressure_slope(t: f64, es: f64) -> f64 {
    4098.0 * es / (t + 237.3).powi(2)
}

/// Psychrometric constant (kPa/°C) at pressure `p` kPa.
pub fn psychrometric_constant(p: f64) -> f64 {
    0.665e-3 * p / 0.622
}

/// ET0 (mm/day) for one cell using precomputed solar geometry.
///
/// Returns NaN when extraterrestrial radiation is not positive: the cloudiness ratio
/// `Rs/Ra` has no meaning there.
pub fn penman_monteith_with(inputs: &CellInputs, solar: &SolarGeometry, pressure: f64) -> f64 {
    if solar.ra <= 0.0 {
        return f64::NAN;
    }

    let t = inputs.temperature;
    let ws = inputs.wind;
    let rs = inputs.shortwave * W_M2_TO_MJ_M2_DAY;

    let es = saturation_vapour_pressure(t);
    let ea = (inputs.humidity / 100.0) * es;
    let delta = vapour_pressure_slope(t, es);
    let gamma = psychrometric_constant(pressure);

    let rns = 0.77 * rs;
    let rnl = 4.903e-9 * (t + 273.16).powi(4) * (0.34 - 0.14 * ea.sqrt()) * (1.35 * (rs / solar.ra) - 0.35);
    let rn = rns - rnl;
    // daily step
    let g = 0.0;

    (0.408 * delta * (rn - g) + gamma * (900.0 / (t + 273.0)) * ws * (es - ea))
        / (delta + gamma * (1.0 + 0.34 * ws))
}

/// ET0 (mm/day) for one cell at `latitude` degrees on day of year `doy`.
pub fn penman_monteith(inputs: &CellInputs, latitude: f64, doy: u32, pressure: f64) -> f64 {
    penman_monteith_with(inputs, &SolarGeometry::new(latitude, doy), pressure)
}

// -- Tests -------------------------------------------------------------------
