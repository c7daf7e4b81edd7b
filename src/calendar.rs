use chrono::{Datelike, NaiveDate};
use tracing::warn;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

pub const INVALID_DATE: &str = "Invalid Date";
pub const INVALID_DATE_RANGE: &str = "Invalid Date Range";

/// Parses an ISO `YYYY-MM-DD` date.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT).ok()
}

/// Every calendar day from `start` to `end` inclusive. Empty when `start > end`.
pub fn date_range(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    start.iter_days().take_while(|d| *d <= end).collect()
}

/// Like [`date_range`] but over unparsed dates. A malformed bound yields an
/// empty range instead of an error.
pub fn parse_date_range(start: &str, end: &str) -> Vec<NaiveDate> {
    match (parse_date(start), parse_date(end)) {
        (Some(start), Some(end)) => date_range(start, end),
        _ => {
            warn!(start = %start, end = %end, "cannot build date range from malformed dates");
            Vec::new()
        }
    }
}

/// Short day label, e.g. `Jan 1`.
pub fn format_day(date: NaiveDate) -> String {
    date.format("%b %-d").to_string()
}

/// [`format_day`] over an unparsed date, falling back to `Invalid Date`.
pub fn format_day_str(s: &str) -> String {
    match parse_date(s) {
        Some(date) => format_day(date),
        None => {
            warn!(date = %s, "cannot format malformed date");
            INVALID_DATE.to_string()
        }
    }
}

/// Week label, e.g. `1 - 5 January 2024`. Month and year come from the start.
pub fn format_week_range(start: NaiveDate, end: NaiveDate) -> String {
    format!("{} - {} {}", start.day(), end.day(), start.format("%B %Y"))
}

/// [`format_week_range`] over unparsed dates, falling back to `Invalid Date Range`.
pub fn format_week_range_str(start: &str, end: &str) -> String {
    match (parse_date(start), parse_date(end)) {
        (Some(start), Some(end)) => format_week_range(start, end),
        _ => {
            warn!(start = %start, end = %end, "cannot format malformed date range");
            INVALID_DATE_RANGE.to_string()
        }
    }
}
