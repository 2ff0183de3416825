//! Merge forecast dailies `<prefix>YYYY-MM-DD.nc` into one series.

use std::path::Path;

use anyhow::Result;

use super::display;
use crate::{
    cli::create_progress_bar,
    dates::DateRange,
    merge::{merge_daily_files, DailyFiles},
    output::{write_series, Provenance},
};

pub async fn merge(range: &DateRange, prefix: &str, variable: &str, units: &str, output: &Path) -> Result<String> {
    let files = DailyFiles::Iso {
        prefix: prefix.to_string(),
    };

    let bar = create_progress_bar(range.len() as u64, format!("Merging {}", variable));
    let series = merge_daily_files(range, &files, variable, &bar)?;
    bar.finish_with_message(format!("{} days merged", series.len()));

    write_series(output, &series, variable, units, &Provenance::new("forecast"))?;

    Ok(display(output))
}

// -- Tests -------------------------------------------------------------------
