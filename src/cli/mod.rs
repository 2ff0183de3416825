//! Command line interface.

pub mod command;

use std::{path::PathBuf, time::Duration};

use chrono::{Local, NaiveDate};
use clap::{command, Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};

use crate::{
    config::{default_workspace, RunConfig},
    dates::DateRange,
    download::mswx::MSWX_ROOT_FOLDER,
    et0::STANDARD_PRESSURE,
};

#[derive(Parser)]
#[command(version, about, long_about = None)]
/// Agro-climatic data pipeline for Honduras
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Root folder holding `inputs/`, `outputs/` and `config/`
    #[arg(long, global = true, env = "AGROCLIMATE_WORKSPACE")]
    pub workspace: Option<PathBuf>,

    /// Country mask file, instead of the one under the workspace
    #[arg(long, global = true)]
    pub mask: Option<PathBuf>,

    /// First date to process (YYYY-MM-DD)
    #[arg(long, global = true)]
    pub start: Option<NaiveDate>,

    /// Day after the last date to process (YYYY-MM-DD)
    #[arg(long, global = true)]
    pub end: Option<NaiveDate>,

    /// Log filter, e.g. `info` or `hn_agroclimate=debug`
    #[arg(long, global = true, env = "RUST_LOG", default_value = "info")]
    pub log_level: String,
}

impl GlobalArgs {
    pub fn run_config(&self) -> RunConfig {
        let workspace = self.workspace.clone().unwrap_or_else(default_workspace);

        RunConfig::for_today(workspace).with_mask(self.mask.clone())
    }

    /// `[start, end)`, defaulting to the ten days ending yesterday.
    pub fn date_range(&self) -> anyhow::Result<DateRange> {
        let today = Local::now().date_naive();
        let default = DateRange::last_ten_days(today);

        let start = self.start.unwrap_or(default.first);
        let end = self.end.unwrap_or(today);

        DateRange::half_open(start, end)
            .ok_or_else(|| anyhow::anyhow!("empty date range: {} is not before {}", start, end))
    }
}

#[derive(Args, Debug, Clone)]
pub struct EarthdataArgs {
    #[arg(long, env = "EARTHDATA_USERNAME")]
    pub username: Option<String>,

    #[arg(long, env = "EARTHDATA_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// JSON file with `username` and `password`
    #[arg(long)]
    pub credentials: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct DriveArgs {
    /// OAuth access token for the Drive API
    #[arg(long, env = "DRIVE_ACCESS_TOKEN", hide_env_values = true)]
    pub token: String,

    /// Drive folder holding the MSWX variable folders
    #[arg(long, default_value = MSWX_ROOT_FOLDER)]
    pub root_folder: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compute daily FAO-56 reference evapotranspiration from MSWX inputs
    Et0 {
        /// Atmospheric pressure in kPa
        #[arg(long, default_value_t = STANDARD_PRESSURE)]
        pressure: f64,
    },
    /// Download MSWX daily inputs from Google Drive
    Mswx {
        #[command(flatten)]
        drive: DriveArgs,
    },
    /// Merge the observed MSWX mean temperature and crop it to the country
    Temp {},
    /// Download IMERG Late daily precipitation and crop it to the country
    Imerg {
        #[command(flatten)]
        earthdata: EarthdataArgs,
    },
    /// Merge daily `<prefix>YYYY-MM-DD.nc` files into one series
    Merge {
        /// Path prefix of the daily files
        #[arg(long)]
        prefix: String,
        /// Variable to read from each file
        #[arg(long)]
        variable: String,
        #[arg(long, default_value = "mm/day")]
        units: String,
        #[arg(long)]
        output: PathBuf,
    },
    /// Crop a `(time, lat, lon)` series to the country mask
    Crop {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        variable: String,
        #[arg(long)]
        output: PathBuf,
    },
    /// Download MSWX, compute ET0 and temperature, then download IMERG
    Run {
        #[command(flatten)]
        drive: DriveArgs,
        #[command(flatten)]
        earthdata: EarthdataArgs,
        #[arg(long, default_value_t = STANDARD_PRESSURE)]
        pressure: f64,
    },
}

/// Creates a spinner.
pub fn create_spinner(message: String) -> ProgressBar {
    let bar = ProgressBar::new_spinner().with_message(message);
    bar.enable_steady_tick(Duration::from_millis(100));

    bar
}

/// Creates a progress bar.
pub fn create_progress_bar(size: u64, message: String) -> ProgressBar {
    let bar = ProgressBar::new(size).with_message(message);
    if let Ok(style) = ProgressStyle::with_template("[{eta_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}") {
        bar.set_style(style.progress_chars("##-"));
    }

    bar
}

// -- Tests -------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn should_have_valid_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn should_parse_et0_with_dates() {
        let cli = Cli::parse_from([
            "agroclimate",
            "--workspace",
            "/data/ws",
            "et0",
            "--start",
            "2024-07-05",
            "--end",
            "2024-07-15",
            "--pressure",
            "100.1",
        ]);

        let range = cli.global.date_range().unwrap();
        assert_eq!(range.len(), 10);
        assert_eq!(range.last, NaiveDate::from_ymd_opt(2024, 7, 14).unwrap());
        assert_eq!(cli.global.run_config().workspace, PathBuf::from("/data/ws"));
        match cli.command {
            Commands::Et0 { pressure } => assert_eq!(pressure, 100.1),
            _ => panic!("expected et0"),
        }
    }

    #[test]
    fn should_reject_empty_range() {
        let cli = Cli::parse_from([
            "agroclimate",
            "et0",
            "--start",
            "2024-07-15",
            "--end",
            "2024-07-15",
        ]);

        assert!(cli.global.date_range().is_err());
    }

    #[test]
    fn should_parse_merge() {
        let cli = Cli::parse_from([
            "agroclimate",
            "merge",
            "--prefix",
            "/in/RAIN_",
            "--variable",
            "precipitation",
            "--output",
            "/out/RAIN.nc",
        ]);

        match cli.command {
            Commands::Merge { prefix, units, .. } => {
                assert_eq!(prefix, "/in/RAIN_");
                assert_eq!(units, "mm/day");
            }
            _ => panic!("expected merge"),
        }
    }

    #[test]
    fn should_create_progress_bar() {
        let bar = create_progress_bar(10, "ET0".to_string());

        assert_eq!(bar.length(), Some(10));
    }
}
