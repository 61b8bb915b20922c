//! Date parsing for the return's `dd/mm/yyyy` format.
//!
//! Dates must carry a four digit year. Two digit years ("01/01/19") are rejected
//! even though chrono would accept them, because the return format forbids them.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

/// chrono format string for submitted dates.
pub const DATE_FORMAT: &str = "%d/%m/%Y";

static DATE_SHAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{1,2}/\d{1,2}/\d{4}$").expect("Invalid date regex"));

/// Parse a submitted date, returning `None` for malformed or impossible dates.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    if !DATE_SHAPE.is_match(trimmed) {
        return None;
    }
    NaiveDate::parse_from_str(trimmed, DATE_FORMAT).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_dates() {
        assert_eq!(
            parse_date("01/01/2021"),
            NaiveDate::from_ymd_opt(2021, 1, 1)
        );
        assert_eq!(
            parse_date("19/02/2010"),
            NaiveDate::from_ymd_opt(2010, 2, 19)
        );
        assert_eq!(parse_date(" 1/4/2022 "), NaiveDate::from_ymd_opt(2022, 4, 1));
    }

    #[test]
    fn test_reject_impossible_day() {
        assert_eq!(parse_date("38/04/2019"), None);
        assert_eq!(parse_date("29/02/2021"), None);
    }

    #[test]
    fn test_reject_two_digit_year() {
        assert_eq!(parse_date("01/01/19"), None);
    }

    #[test]
    fn test_reject_other_formats() {
        assert_eq!(parse_date("2021-01-01"), None);
        assert_eq!(parse_date("01-01-2021"), None);
        assert_eq!(parse_date(""), None);
    }
}
