//! Day identifiers: calendar dates with no time-of-day component, written as
//! `YYYY-MM-DD`.
use thiserror::Error;
use time::{
    format_description::FormatItem,
    macros::format_description,
    Date, Duration,
    Weekday::{Saturday, Sunday},
};

static YMD_FMT: &[FormatItem<'_>] = format_description!("[year]-[month]-[day]");

/// Parse a strict `YYYY-MM-DD` day identifier
pub fn parse_day(s: &str) -> Result<Date, DayParseError> {
    Date::parse(s, &YMD_FMT).map_err(|source| DayParseError {
        value: s.to_owned(),
        source,
    })
}

/// Render a day identifier in `YYYY-MM-DD` form
pub fn format_day(date: Date) -> String {
    date.format(&YMD_FMT).unwrap_or_else(|_| date.to_string())
}

/// Like [`format_day`], but an absent day renders as the empty string, which
/// is what a cleared form input holds.
pub fn format_day_opt(date: Option<Date>) -> String {
    date.map(format_day).unwrap_or_default()
}

/// Returns `None` if the result would fall outside the range of representable
/// dates
pub fn add_days(date: Date, days: i64) -> Option<Date> {
    date.checked_add(Duration::days(days))
}

/// Saturday and Sunday, i.e., the last and first days of a Sunday-based week
pub fn is_weekend(date: Date) -> bool {
    matches!(date.weekday(), Saturday | Sunday)
}

#[derive(Debug, Error)]
#[error("invalid date {value:?}; expected YYYY-MM-DD")]
pub struct DayParseError {
    value: String,
    source: time::error::Parse,
}
