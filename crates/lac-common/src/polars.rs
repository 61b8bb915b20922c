//! Polars AnyValue utility functions.
//!
//! Submitted tables arrive with mixed column types depending on how the
//! ingestion layer inferred them (a `SEX` column may be `Int64` or `String`).
//! Checks compare codes as text, so every cell goes through [`any_to_string`].
//! Date columns may be text or a native temporal type; [`any_to_date`] reads both.

use chrono::{DateTime, NaiveDate, Utc};
use polars::prelude::*;

use crate::dates::parse_date;

/// Days between 0001-01-01 and the Unix epoch, the offset of polars `Date` values.
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// Converts a Polars `AnyValue` to a `String` representation.
///
/// Returns an empty string for `Null` and formats floats without trailing zeros,
/// so a code read as `1.0` compares equal to `"1"`.
///
/// # Examples
///
/// ```
/// use polars::prelude::AnyValue;
/// use lac_common::any_to_string;
///
/// assert_eq!(any_to_string(AnyValue::Null), "");
/// assert_eq!(any_to_string(AnyValue::Int64(2)), "2");
/// assert_eq!(any_to_string(AnyValue::String("N1")), "N1");
/// ```
pub fn any_to_string(value: AnyValue<'_>) -> String {
    match value {
        AnyValue::Null => String::new(),
        AnyValue::Int8(v) => v.to_string(),
        AnyValue::Int16(v) => v.to_string(),
        AnyValue::Int32(v) => v.to_string(),
        AnyValue::Int64(v) => v.to_string(),
        AnyValue::UInt8(v) => v.to_string(),
        AnyValue::UInt16(v) => v.to_string(),
        AnyValue::UInt32(v) => v.to_string(),
        AnyValue::UInt64(v) => v.to_string(),
        AnyValue::Float32(v) => format_numeric(f64::from(v)),
        AnyValue::Float64(v) => format_numeric(v),
        AnyValue::String(s) => s.to_string(),
        AnyValue::StringOwned(s) => s.to_string(),
        AnyValue::Boolean(b) => if b { "1" } else { "0" }.to_string(),
        other => {
            let s = other.to_string();
            if s.starts_with('"') && s.ends_with('"') && s.len() >= 2 {
                s[1..s.len() - 1].to_string()
            } else {
                s
            }
        }
    }
}

/// Converts `AnyValue` to a trimmed `String`, returning `None` for null or blank cells.
///
/// This is the "missing value" notion used by every check in the catalogue.
pub fn any_to_string_non_empty(value: AnyValue<'_>) -> Option<String> {
    let s = any_to_string(value);
    let trimmed = s.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Reads a date cell.
///
/// Returns `None` for a missing cell and `Some(None)` for a value that is not a
/// date. Native `Date` and `Datetime` cells are taken as they are; anything else
/// must be `dd/mm/yyyy` text.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use polars::prelude::AnyValue;
/// use lac_common::any_to_date;
///
/// assert_eq!(any_to_date(AnyValue::Null), None);
/// assert_eq!(any_to_date(AnyValue::Date(0)), Some(NaiveDate::from_ymd_opt(1970, 1, 1)));
/// assert_eq!(any_to_date(AnyValue::String("2021-01-01")), Some(None));
/// ```
pub fn any_to_date(value: AnyValue<'_>) -> Option<Option<NaiveDate>> {
    match value {
        AnyValue::Null => None,
        AnyValue::Date(days) => Some(
            days.checked_add(UNIX_EPOCH_DAYS_FROM_CE)
                .and_then(NaiveDate::from_num_days_from_ce_opt),
        ),
        AnyValue::Datetime(v, unit, _) | AnyValue::DatetimeOwned(v, unit, _) => {
            Some(timestamp_to_date(v, unit))
        }
        other => any_to_string_non_empty(other).map(|raw| parse_date(&raw)),
    }
}

fn timestamp_to_date(v: i64, unit: TimeUnit) -> Option<NaiveDate> {
    let datetime = match unit {
        TimeUnit::Milliseconds => DateTime::<Utc>::from_timestamp_millis(v),
        TimeUnit::Microseconds => DateTime::<Utc>::from_timestamp_micros(v),
        TimeUnit::Nanoseconds => Some(DateTime::<Utc>::from_timestamp_nanos(v)),
    };
    datetime.map(|dt| dt.date_naive())
}

/// Formats a floating-point number without trailing zeros after the decimal point.
///
/// # Examples
///
/// ```
/// use lac_common::format_numeric;
///
/// assert_eq!(format_numeric(1.0), "1");
/// assert_eq!(format_numeric(1.50), "1.5");
/// assert_eq!(format_numeric(40.0), "40");
/// ```
pub fn format_numeric(v: f64) -> String {
    let s = format!("{v}");
    if s.contains('.') {
        let trimmed = s.trim_end_matches('0').trim_end_matches('.');
        if trimmed.is_empty() {
            "0".to_string()
        } else {
            trimmed.to_string()
        }
    } else {
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_any_to_string_null() {
        assert_eq!(any_to_string(AnyValue::Null), "");
    }

    #[test]
    fn test_any_to_string_integer_codes() {
        assert_eq!(any_to_string(AnyValue::Int32(1)), "1");
        assert_eq!(any_to_string(AnyValue::Int64(-3)), "-3");
        assert_eq!(any_to_string(AnyValue::UInt8(2)), "2");
    }

    #[test]
    fn test_any_to_string_float_codes() {
        assert_eq!(any_to_string(AnyValue::Float64(2.0)), "2");
        assert_eq!(any_to_string(AnyValue::Float64(1.5)), "1.5");
    }

    #[test]
    fn test_any_to_string_non_empty() {
        assert_eq!(any_to_string_non_empty(AnyValue::Null), None);
        assert_eq!(any_to_string_non_empty(AnyValue::String("")), None);
        assert_eq!(any_to_string_non_empty(AnyValue::String("   ")), None);
        assert_eq!(
            any_to_string_non_empty(AnyValue::String(" N1 ")),
            Some("N1".to_string())
        );
    }

    #[test]
    fn test_any_to_date_native_and_text() {
        let jan_first = NaiveDate::from_ymd_opt(2021, 1, 1);
        assert_eq!(any_to_date(AnyValue::Date(18_628)), Some(jan_first));
        assert_eq!(
            any_to_date(AnyValue::Datetime(
                1_609_502_400_000,
                TimeUnit::Milliseconds,
                None
            )),
            Some(jan_first)
        );
        assert_eq!(
            any_to_date(AnyValue::Datetime(
                1_609_502_400_000_000,
                TimeUnit::Microseconds,
                None
            )),
            Some(jan_first)
        );
        assert_eq!(any_to_date(AnyValue::String("01/01/2021")), Some(jan_first));
        assert_eq!(any_to_date(AnyValue::String("31/02/2021")), Some(None));
        assert_eq!(any_to_date(AnyValue::String("  ")), None);
    }

    #[test]
    fn test_format_numeric() {
        assert_eq!(format_numeric(0.0), "0");
        assert_eq!(format_numeric(100.0), "100");
        assert_eq!(format_numeric(10.5), "10.5");
    }
}
