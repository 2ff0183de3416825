//! Date ranges and the date stamps used in file names.

use anyhow::{anyhow, Result};
use chrono::{Datelike, Duration, NaiveDate};

/// 1900-01-01, the reference date of the `time` axis, counted from 0001-01-01 as day 1.
const TIME_EPOCH_FROM_CE: i32 = 693_596;

pub const TIME_UNITS: &str = "days since 1900-01-01 00:00:00";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Inclusive range of days.
pub struct DateRange {
    pub first: NaiveDate,
    pub last: NaiveDate,
}

impl DateRange {
    /// Covers `[start, end)`, so `end` itself is never processed. Returns `None` when empty.
    pub fn half_open(start: NaiveDate, end: NaiveDate) -> Option<Self> {
        if end <= start {
            return None;
        }

        Some(DateRange {
            first: start,
            last: end - Duration::days(1),
        })
    }

    /// The ten days ending yesterday.
    pub fn last_ten_days(today: NaiveDate) -> Self {
        DateRange {
            first: today - Duration::days(10),
            last: today - Duration::days(1),
        }
    }

    pub fn len(&self) -> usize {
        ((self.last - self.first).num_days() + 1) as usize
    }

    pub fn iter(&self) -> impl Iterator<Item = NaiveDate> {
        let last = self.last;
        self.first.iter_days().take_while(move |d| *d <= last)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.first && date <= self.last
    }
}

/// `YYYYjjj`, the MSWX daily file stamp.
pub fn julian_stamp(date: NaiveDate) -> String {
    format!("{}{:03}", date.year(), date.ordinal())
}

pub fn parse_julian_stamp(stamp: &str) -> Result<NaiveDate> {
    if stamp.len() != 7 || !stamp.chars().all(|c| c.is_ascii_digit()) {
        return Err(anyhow!("`{}` is not a YYYYjjj stamp", stamp));
    }

    let year: i32 = stamp[0..4].parse()?;
    let ordinal: u32 = stamp[4..7].parse()?;

    NaiveDate::from_yo_opt(year, ordinal).ok_or_else(|| anyhow!("invalid day of year in `{}`", stamp))
}

/// `YYYY-MM-DD`, used by the forecast files.
pub fn iso_stamp(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// `YYYYMMDD`, used by IMERG file names and run folders.
pub fn compact_stamp(date: NaiveDate) -> String {
    date.format("%Y%m%d").to_string()
}

pub fn days_since_epoch(date: NaiveDate) -> f64 {
    f64::from(date.num_days_from_ce() - TIME_EPOCH_FROM_CE)
}

/// Decodes a CF time value such as `3.0` under `days since 1900-01-01 00:00:00`.
/// Only `days` and `hours` offsets are understood; fractional days are truncated.
pub fn decode_time(units: &str, value: f64) -> Result<NaiveDate> {
    let (unit, origin) = units
        .split_once(" since ")
        .ok_or_else(|| anyhow!("`{}` is not a CF time unit", units))?;

    let origin = origin.trim();
    let origin = NaiveDate::parse_from_str(origin.get(..10).unwrap_or(origin), "%Y-%m-%d")?;

    let days = match unit.trim() {
        "days" | "day" => value,
        "hours" | "hour" => value / 24.0,
        other => return Err(anyhow!("unsupported time unit `{}`", other)),
    };
    if !days.is_finite() {
        return Err(anyhow!("time value {} is not finite", value));
    }

    Ok(origin + Duration::days(days.floor() as i64))
}

// -- Tests -------------------------------------------------------------------
