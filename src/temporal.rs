//! Date parsing and fixed-width year binning
//!
//! The museum datasets disagree on date formats: Cleveland and the Met store
//! bare (possibly negative) years, `MoMA` stores ISO acquisition dates. Both
//! reduce to a [`TemporalValue`] so min/max and binning work across formats.

use crate::{Error, Result};
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use serde::Serialize;
use std::cmp::Ordering;
use std::fmt;

/// Bin width for century histograms
pub const CENTURY: i64 = 100;

/// Earliest year a [`TemporalValue`] can hold (chrono's `NaiveDate::MIN`)
pub const MIN_YEAR: i64 = -262_144;
/// Latest year a [`TemporalValue`] can hold (chrono's `NaiveDate::MAX`)
pub const MAX_YEAR: i64 = 262_143;

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];
const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"];

/// A parsed date value: a bare year or a calendar date
///
/// Ordered chronologically by `(year, day of year)`; a bare year sorts before
/// any date within that year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum TemporalValue {
    /// Year only (negative for BCE)
    Year(i64),
    /// Full calendar date
    Date(NaiveDate),
}

impl TemporalValue {
    /// Parse a text cell
    ///
    /// Accepts integers, finite decimals (floored to a year), ISO and
    /// US-style dates, and date-times. Anything else yields `None`, as do
    /// years outside [`MIN_YEAR`]..=[`MAX_YEAR`].
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        if let Ok(year) = text.parse::<i64>() {
            return Self::from_year(year);
        }
        if let Ok(value) = text.parse::<f64>() {
            return Self::from_f64(value);
        }
        for format in DATE_FORMATS {
            if let Ok(date) = NaiveDate::parse_from_str(text, format) {
                return Some(Self::Date(date));
            }
        }
        for format in DATETIME_FORMATS {
            if let Ok(datetime) = NaiveDateTime::parse_from_str(text, format) {
                return Some(Self::Date(datetime.date()));
            }
        }
        DateTime::parse_from_rfc3339(text)
            .ok()
            .map(|datetime| Self::Date(datetime.date_naive()))
    }

    /// Bare year; `None` outside [`MIN_YEAR`]..=[`MAX_YEAR`]
    #[must_use]
    pub fn from_year(year: i64) -> Option<Self> {
        (MIN_YEAR..=MAX_YEAR).contains(&year).then_some(Self::Year(year))
    }

    /// Year from a floating point value, floored; `None` unless finite and
    /// within the year range
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    pub fn from_f64(value: f64) -> Option<Self> {
        let year = value.floor();
        if !year.is_finite() || year < MIN_YEAR as f64 || year > MAX_YEAR as f64 {
            return None;
        }
        Self::from_year(year as i64)
    }

    /// Calendar year of the value
    #[must_use]
    pub fn year(self) -> i64 {
        match self {
            Self::Year(year) => year,
            Self::Date(date) => i64::from(date.year()),
        }
    }

    fn sort_key(self) -> (i64, u32) {
        match self {
            Self::Year(year) => (year, 0),
            Self::Date(date) => (i64::from(date.year()), date.ordinal()),
        }
    }
}

impl Ord for TemporalValue {
    fn cmp(&self, other: &Self) -> Ordering {
        self.sort_key()
            .cmp(&other.sort_key())
            .then_with(|| match (self, other) {
                (Self::Date(a), Self::Date(b)) => a.cmp(b),
                _ => Ordering::Equal,
            })
    }
}

impl PartialOrd for TemporalValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for TemporalValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Year(year) => write!(f, "{year}"),
            Self::Date(date) => write!(f, "{date}"),
        }
    }
}

/// Reject non-positive bin widths
///
/// # Errors
///
/// Returns [`Error::InvalidInput`] if `width` is not positive
pub fn check_bin_width(width: i64) -> Result<()> {
    if width <= 0 {
        return Err(Error::InvalidInput(format!(
            "Bin width must be positive, got {width}"
        )));
    }
    Ok(())
}

/// Floor a year into a fixed-width bucket: `floor(year / width) * width`
///
/// Uses floor division, so `-150` with width 100 lands in `-200`.
///
/// # Errors
///
/// Returns error if `width` is not positive or the bin key overflows `i64`
pub fn bin_year(year: i64, width: i64) -> Result<i64> {
    check_bin_width(width)?;
    year.div_euclid(width).checked_mul(width).ok_or_else(|| {
        Error::InvalidInput(format!("Year {year} has no bin of width {width}"))
    })
}
