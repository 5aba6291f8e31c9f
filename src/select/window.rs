//! Retention windows for run cleanup.
//!
//! The lower bound accepts either a number of days before today or an
//! absolute date; the upper bound accepts only an absolute date. Parsing is
//! an explicit ordered list of attempts, first match wins.

use crate::config::schema::DATE_FORMAT;
use crate::config::value::{TypedValue, coerce};
use crate::{Error, Result};
use chrono::{Days, NaiveDate};
use serde::Serialize;

/// A parsed retention bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateSpec {
    /// N days before today
    RelativeDays(u64),
    /// A calendar date
    Absolute(NaiveDate),
}

impl DateSpec {
    /// Resolve to a concrete date.
    pub fn to_date(self, today: NaiveDate) -> Option<NaiveDate> {
        match self {
            DateSpec::RelativeDays(days) => today.checked_sub_days(Days::new(days)),
            DateSpec::Absolute(date) => Some(date),
        }
    }
}

type Attempt = fn(&str) -> Option<DateSpec>;

/// Attempts for the oldest bound, in order.
const OLDEST_ATTEMPTS: &[Attempt] = &[relative_days, absolute_date];

/// Attempts for the newest bound, in order.
const NEWEST_ATTEMPTS: &[Attempt] = &[absolute_date];

const OLDEST_EXPECTED: &str = "a number of days or a YYYY-MM-DD date";
const NEWEST_EXPECTED: &str = "a YYYY-MM-DD date";

fn relative_days(raw: &str) -> Option<DateSpec> {
    match coerce(raw) {
        TypedValue::Int(days) if days >= 0 => Some(DateSpec::RelativeDays(days as u64)),
        _ => None,
    }
}

fn absolute_date(raw: &str) -> Option<DateSpec> {
    parse_date(raw).map(DateSpec::Absolute)
}

/// Parse a calendar date in the fixed format.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).ok()
}

/// Format a calendar date in the fixed format.
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

fn parse_date_spec(raw: &str, attempts: &[Attempt], expected: &'static str) -> Result<DateSpec> {
    attempts
        .iter()
        .find_map(|attempt| attempt(raw))
        .ok_or_else(|| Error::InvalidDateSpec {
            value: raw.to_string(),
            expected,
        })
}

/// Parse the lower bound: relative days first, then an absolute date.
pub fn parse_oldest(raw: &str) -> Result<DateSpec> {
    parse_date_spec(raw, OLDEST_ATTEMPTS, OLDEST_EXPECTED)
}

/// Parse the upper bound: absolute date only.
pub fn parse_newest(raw: &str) -> Result<DateSpec> {
    parse_date_spec(raw, NEWEST_ATTEMPTS, NEWEST_EXPECTED)
}

/// An inclusive date range with `oldest <= newest`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RetentionWindow {
    oldest: NaiveDate,
    newest: NaiveDate,
}

impl RetentionWindow {
    pub fn new(oldest: NaiveDate, newest: NaiveDate) -> Result<Self> {
        if oldest > newest {
            return Err(Error::InvertedWindow { oldest, newest });
        }
        Ok(Self { oldest, newest })
    }

    pub fn oldest(&self) -> NaiveDate {
        self.oldest
    }

    pub fn newest(&self) -> NaiveDate {
        self.newest
    }

    /// Inclusive on both ends.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.oldest <= date && date <= self.newest
    }
}

/// Resolve raw bounds into a window relative to `today`.
pub fn resolve_window(oldest_raw: &str, newest_raw: &str, today: NaiveDate) -> Result<RetentionWindow> {
    let oldest = parse_oldest(oldest_raw)?
        .to_date(today)
        .ok_or_else(|| Error::InvalidDateSpec {
            value: oldest_raw.to_string(),
            expected: OLDEST_EXPECTED,
        })?;
    let newest = parse_newest(newest_raw)?
        .to_date(today)
        .ok_or_else(|| Error::InvalidDateSpec {
            value: newest_raw.to_string(),
            expected: NEWEST_EXPECTED,
        })?;
    RetentionWindow::new(oldest, newest)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_relative_oldest_and_absolute_newest() {
        let window = resolve_window("14", "2024-06-01", date(2024, 6, 10)).unwrap();

        assert_eq!(window.oldest(), date(2024, 5, 27));
        assert_eq!(window.newest(), date(2024, 6, 1));
        assert!(window.contains(date(2024, 5, 30)));
        assert!(!window.contains(date(2024, 6, 5)));
    }

    #[test]
    fn test_window_is_inclusive() {
        let window = RetentionWindow::new(date(2024, 1, 1), date(2024, 1, 31)).unwrap();
        assert!(window.contains(date(2024, 1, 1)));
        assert!(window.contains(date(2024, 1, 31)));
        assert!(!window.contains(date(2023, 12, 31)));
        assert!(!window.contains(date(2024, 2, 1)));
    }

    #[test]
    fn test_single_day_window() {
        let window = resolve_window("0", "2024-06-10", date(2024, 6, 10)).unwrap();
        assert!(window.contains(date(2024, 6, 10)));
        assert!(!window.contains(date(2024, 6, 9)));
    }

    #[test]
    fn test_absolute_oldest() {
        assert_eq!(
            parse_oldest("2024-05-01").unwrap(),
            DateSpec::Absolute(date(2024, 5, 1))
        );
    }

    #[test]
    fn test_relative_attempt_comes_first() {
        assert_eq!(parse_oldest("7").unwrap(), DateSpec::RelativeDays(7));
    }

    #[test]
    fn test_negative_days_are_invalid() {
        assert!(matches!(
            parse_oldest("-3"),
            Err(Error::InvalidDateSpec { value, .. }) if value == "-3"
        ));
    }

    #[test]
    fn test_newest_rejects_relative_form() {
        assert!(matches!(
            parse_newest("14"),
            Err(Error::InvalidDateSpec { value, .. }) if value == "14"
        ));
    }

    #[test]
    fn test_garbage_is_invalid() {
        assert!(parse_oldest("last tuesday").is_err());
        assert!(parse_newest("06/01/2024").is_err());
        assert!(resolve_window("14", "soon", date(2024, 6, 10)).is_err());
    }

    #[test]
    fn test_inverted_window_is_an_error() {
        let err = resolve_window("2024-06-05", "2024-06-01", date(2024, 6, 10)).unwrap_err();
        assert!(matches!(err, Error::InvertedWindow { .. }));

        // Relative horizon landing after newest
        let err = resolve_window("1", "2024-01-01", date(2024, 6, 10)).unwrap_err();
        assert!(matches!(err, Error::InvertedWindow { .. }));
    }

    #[test]
    fn test_huge_relative_offset_is_invalid() {
        assert!(matches!(
            resolve_window("9223372036854775807", "2024-06-01", date(2024, 6, 10)),
            Err(Error::InvalidDateSpec { .. })
        ));
    }

    #[test]
    fn test_format_date_matches_parse_date() {
        let d = date(2024, 2, 29);
        assert_eq!(parse_date(&format_date(d)), Some(d));
    }
}
