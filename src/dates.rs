//! Fetch windows and the date-range string that names raw files.

use std::fmt;

use chrono::{Days, NaiveDate};

use crate::error::{PipelineError, Result};

pub const DEFAULT_WINDOW_DAYS: u64 = 90;
pub const LOOK_AHEAD_DAYS: u64 = 14;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// How the user asked for the fetch window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateWindow {
    /// Trailing `n` days ending today.
    Days(u64),
    /// Explicit bounds; a missing start means 90 days ago, a missing end means today.
    Range {
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    },
    /// Today through two weeks from today.
    LookAhead,
}

impl Default for DateWindow {
    fn default() -> Self {
        DateWindow::Days(DEFAULT_WINDOW_DAYS)
    }
}

impl DateWindow {
    pub fn resolve(&self, today: NaiveDate) -> Result<DateRange> {
        match self {
            DateWindow::Days(n) => DateRange::new(days_before(today, *n)?, today),
            DateWindow::Range { start, end } => {
                let start = match start {
                    Some(d) => *d,
                    None => days_before(today, DEFAULT_WINDOW_DAYS)?,
                };
                DateRange::new(start, end.unwrap_or(today))
            }
            DateWindow::LookAhead => {
                let end = today
                    .checked_add_days(Days::new(LOOK_AHEAD_DAYS))
                    .ok_or_else(|| PipelineError::Config("look-ahead end date overflows".into()))?;
                DateRange::new(today, end)
            }
        }
    }
}

fn days_before(today: NaiveDate, n: u64) -> Result<NaiveDate> {
    today
        .checked_sub_days(Days::new(n))
        .ok_or_else(|| PipelineError::Config(format!("cannot go back {n} days from {today}")))
}

/// Inclusive calendar range, rendered as `YYYY-MM-DD_to_YYYY-MM-DD`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(PipelineError::Config(format!(
                "start date {start} is after end date {end}"
            )));
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn start_str(&self) -> String {
        self.start.format(DATE_FORMAT).to_string()
    }

    pub fn end_str(&self) -> String {
        self.end.format(DATE_FORMAT).to_string()
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_to_{}", self.start_str(), self.end_str())
    }
}

/// Parses a `YYYY-MM-DD` command-line argument.
pub fn parse_cli_date(value: &str) -> std::result::Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .map_err(|e| format!("expected YYYY-MM-DD, got '{value}': {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_default_window_is_trailing_ninety_days() {
        let range = DateWindow::default().resolve(d(2023, 4, 1)).unwrap();
        assert_eq!(range.start(), d(2023, 1, 1));
        assert_eq!(range.end(), d(2023, 4, 1));
        assert_eq!(range.to_string(), "2023-01-01_to_2023-04-01");
    }

    #[test]
    fn test_look_ahead_spans_two_weeks() {
        let range = DateWindow::LookAhead.resolve(d(2023, 1, 1)).unwrap();
        assert_eq!(range.end(), d(2023, 1, 15));
    }

    #[test]
    fn test_partial_range_fills_missing_bounds() {
        let window = DateWindow::Range {
            start: None,
            end: Some(d(2023, 6, 30)),
        };
        let range = window.resolve(d(2023, 7, 15)).unwrap();
        assert_eq!(range.start(), d(2023, 4, 16));
        assert_eq!(range.end(), d(2023, 6, 30));
    }

    #[test]
    fn test_inverted_range_is_config_error() {
        let window = DateWindow::Range {
            start: Some(d(2023, 2, 1)),
            end: Some(d(2023, 1, 1)),
        };
        assert!(matches!(
            window.resolve(d(2023, 3, 1)),
            Err(PipelineError::Config(_))
        ));
    }

    #[test]
    fn test_parse_cli_date() {
        assert_eq!(parse_cli_date("2023-01-02").unwrap(), d(2023, 1, 2));
        assert!(parse_cli_date("01/02/2023").is_err());
    }
}
