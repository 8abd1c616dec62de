//! Ordered multi-format date/time parsing.
//!
//! Form templates never agreed on a date format, so each parser supplies its
//! own ordered list. A date-only match yields midnight.

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

/// Formats the stock Winlink templates produce, most common first.
pub const WINLINK_DATE_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%Y-%m-%d %H%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
];

/// Date-only formats, tried after every date-time format has failed.
pub const WINLINK_DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d-%b-%Y"];

/// Try every date-time format in order, then every date-only format.
pub fn parse_date_time(input: &str, date_time_formats: &[&str], date_formats: &[&str]) -> Option<NaiveDateTime> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }
    date_time_formats
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(input, fmt).ok())
        .or_else(|| {
            date_formats
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(input, fmt).ok())
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// [`parse_date_time`] with the stock Winlink format lists.
pub fn parse_winlink_date_time(input: &str) -> Option<NaiveDateTime> {
    parse_date_time(input, WINLINK_DATE_TIME_FORMATS, WINLINK_DATE_FORMATS)
}

/// A date/time field as written, plus its parse when one succeeded.
///
/// Under the lenient policy an unparseable value is kept with `parsed: None`
/// so later validation can still see what the sender wrote.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DateTimeField {
    pub raw: String,
    pub parsed: Option<NaiveDateTime>,
}

impl DateTimeField {
    pub fn new(raw: impl Into<String>, formats: &[&str], date_formats: &[&str]) -> Self {
        let raw = raw.into();
        let parsed = parse_date_time(&raw, formats, date_formats);
        Self { raw, parsed }
    }

    pub fn winlink(raw: impl Into<String>) -> Self {
        Self::new(raw, WINLINK_DATE_TIME_FORMATS, WINLINK_DATE_FORMATS)
    }

    pub fn is_empty(&self) -> bool {
        self.raw.trim().is_empty()
    }

    /// Present but not parseable.
    pub fn is_malformed(&self) -> bool {
        !self.is_empty() && self.parsed.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d).unwrap().and_hms_opt(h, min, 0).unwrap()
    }

    #[test]
    fn test_first_matching_format_wins() {
        assert_eq!(parse_winlink_date_time("2024-03-05 14:30"), Some(at(2024, 3, 5, 14, 30)));
        assert_eq!(parse_winlink_date_time("03/05/2024 14:30"), Some(at(2024, 3, 5, 14, 30)));
    }

    #[test]
    fn test_date_only_is_midnight() {
        assert_eq!(parse_winlink_date_time("2024-03-05"), Some(at(2024, 3, 5, 0, 0)));
    }

    #[test]
    fn test_unparseable_is_none() {
        assert_eq!(parse_winlink_date_time("yesterday at noon"), None);
        assert_eq!(parse_winlink_date_time("   "), None);
    }

    #[test]
    fn test_caller_format_order() {
        // Day-first list reads the same text differently.
        let parsed = parse_date_time("03/05/2024", &[], &["%d/%m/%Y"]);
        assert_eq!(parsed, Some(at(2024, 5, 3, 0, 0)));
    }

    #[test]
    fn test_field_malformed() {
        assert!(DateTimeField::winlink("garbage").is_malformed());
        assert!(!DateTimeField::winlink("").is_malformed());
        assert!(!DateTimeField::winlink("2024-01-01 10:00").is_malformed());
    }
}
