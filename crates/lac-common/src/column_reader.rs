//! Column reader utilities for rule checks.
//!
//! `ColumnReader` hides the boilerplate of walking a DataFrame column row by
//! row. Row indices yielded by the iterators are the positional row
//! identifiers that checks report back to the executor.
//!
//! # Example
//!
//! ```ignore
//! let reader = ColumnReader::new(header);
//!
//! // Rows whose SEX code is missing or unknown
//! let rows: Vec<usize> = reader
//!     .optional_values("SEX")
//!     .into_iter()
//!     .flatten()
//!     .filter(|(_, v)| v.as_deref().is_none_or(|v| !["1", "2"].contains(&v)))
//!     .map(|(idx, _)| idx)
//!     .collect();
//! ```

use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;
use polars::prelude::{AnyValue, Column, DataFrame};

use crate::polars::{any_to_date, any_to_string_non_empty};

/// A reader for accessing DataFrame columns row by row.
#[derive(Debug, Clone, Copy)]
pub struct ColumnReader<'a> {
    df: &'a DataFrame,
}

impl<'a> ColumnReader<'a> {
    /// Create a new column reader for the given DataFrame.
    #[inline]
    pub fn new(df: &'a DataFrame) -> Self {
        Self { df }
    }

    /// Get the number of rows in the DataFrame.
    #[inline]
    pub fn height(&self) -> usize {
        self.df.height()
    }

    /// Get a column by name, returning None if not found.
    #[inline]
    pub fn column(&self, name: &str) -> Option<&'a Column> {
        self.df.column(name).ok()
    }

    /// Check if a column exists.
    #[inline]
    pub fn has_column(&self, name: &str) -> bool {
        self.df.column(name).is_ok()
    }

    /// Get a trimmed value, `None` when the cell is null or blank.
    pub fn get_optional(&self, column: &str, row_idx: usize) -> Option<String> {
        let series = self.column(column)?;
        any_to_string_non_empty(series.get(row_idx).unwrap_or(AnyValue::Null))
    }

    /// Iterate over `(row, Option<value>)` pairs, mapping null and blank cells to `None`.
    ///
    /// Checks decide per rule whether `None` is acceptable, so the distinction
    /// is kept here rather than filtered out.
    pub fn optional_values(&self, column_name: &str) -> Option<OptionalValueIter<'a>> {
        let column = self.column(column_name)?;
        Some(OptionalValueIter {
            column,
            current: 0,
            len: self.df.height(),
        })
    }

    /// Read a date column as `(row, parsed)` pairs for every non-missing cell.
    ///
    /// `parsed` is `None` when a text cell is not a valid `dd/mm/yyyy` date.
    /// Native `Date` and `Datetime` columns are read without a round trip through text.
    pub fn dates(&self, column_name: &str) -> Vec<(usize, Option<NaiveDate>)> {
        let Some(column) = self.column(column_name) else {
            return Vec::new();
        };
        (0..self.df.height())
            .filter_map(|idx| {
                any_to_date(column.get(idx).unwrap_or(AnyValue::Null)).map(|parsed| (idx, parsed))
            })
            .collect()
    }

    /// Get a valid date at a specific row, `None` when missing or malformed.
    pub fn get_date(&self, column: &str, row_idx: usize) -> Option<NaiveDate> {
        let series = self.column(column)?;
        any_to_date(series.get(row_idx).unwrap_or(AnyValue::Null)).flatten()
    }

    /// Collect the distinct non-missing values of a column.
    pub fn distinct_values(&self, column: &str) -> HashSet<String> {
        self.optional_values(column)
            .map(|values| values.filter_map(|(_, value)| value).collect())
            .unwrap_or_default()
    }

    /// Map each non-missing key to the value on the first row carrying it.
    ///
    /// Used to look children up by `CHILD` identifier across tables.
    pub fn first_value_by_key(
        &self,
        key_column: &str,
        value_column: &str,
    ) -> HashMap<String, Option<String>> {
        let mut result = HashMap::new();
        let (Some(keys), Some(_)) = (
            self.optional_values(key_column),
            self.column(value_column),
        ) else {
            return result;
        };

        for (idx, key) in keys {
            let Some(key) = key else {
                continue;
            };
            result
                .entry(key)
                .or_insert_with(|| self.get_optional(value_column, idx));
        }
        result
    }
}

/// Iterator over trimmed values in a column, `None` for missing cells.
pub struct OptionalValueIter<'a> {
    column: &'a Column,
    current: usize,
    len: usize,
}

impl Iterator for OptionalValueIter<'_> {
    type Item = (usize, Option<String>);

    fn next(&mut self) -> Option<Self::Item> {
        if self.current >= self.len {
            return None;
        }

        let idx = self.current;
        self.current += 1;

        let value = self.column.get(idx).unwrap_or(AnyValue::Null);
        Some((idx, any_to_string_non_empty(value)))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.len.saturating_sub(self.current);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for OptionalValueIter<'_> {}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::*;

    fn header_df() -> DataFrame {
        df! {
            "CHILD" => &[Some("C1"), Some("C2"), Some("C3"), None],
            "SEX" => &[Some("1"), Some(" "), None, Some("2")],
            "DOB" => &[Some("01/01/2010"), Some("31/02/2010"), None, Some("05/05/2015")],
        }
        .unwrap()
    }

    #[test]
    fn test_optional_values_maps_blank_and_null_to_none() {
        let df = header_df();
        let reader = ColumnReader::new(&df);

        let values: Vec<_> = reader.optional_values("SEX").unwrap().collect();
        assert_eq!(
            values,
            vec![
                (0, Some("1".to_string())),
                (1, None),
                (2, None),
                (3, Some("2".to_string())),
            ]
        );
    }

    #[test]
    fn test_dates_skips_missing_and_marks_invalid() {
        let df = header_df();
        let reader = ColumnReader::new(&df);

        let dates = reader.dates("DOB");
        assert_eq!(
            dates,
            vec![
                (0, NaiveDate::from_ymd_opt(2010, 1, 1)),
                (1, None),
                (3, NaiveDate::from_ymd_opt(2015, 5, 5)),
            ]
        );
        assert_eq!(reader.get_date("DOB", 0), NaiveDate::from_ymd_opt(2010, 1, 1));
        assert_eq!(reader.get_date("DOB", 1), None);
    }

    #[test]
    fn test_dates_reads_native_date_column() {
        let decom = Series::new(
            "DECOM".into(),
            &[
                NaiveDate::from_ymd_opt(2021, 1, 1),
                None,
                NaiveDate::from_ymd_opt(2023, 6, 1),
            ],
        );
        let df = DataFrame::new(vec![decom.into()]).unwrap();
        let reader = ColumnReader::new(&df);

        assert_eq!(
            reader.dates("DECOM"),
            vec![
                (0, NaiveDate::from_ymd_opt(2021, 1, 1)),
                (2, NaiveDate::from_ymd_opt(2023, 6, 1)),
            ]
        );
        assert_eq!(reader.get_date("DECOM", 2), NaiveDate::from_ymd_opt(2023, 6, 1));
        assert_eq!(reader.get_date("DECOM", 1), None);
    }

    #[test]
    fn test_first_value_by_key() {
        let df = header_df();
        let reader = ColumnReader::new(&df);

        let by_child = reader.first_value_by_key("CHILD", "SEX");
        assert_eq!(by_child.len(), 3);
        assert_eq!(by_child["C1"], Some("1".to_string()));
        assert_eq!(by_child["C2"], None);
    }

    #[test]
    fn test_missing_column_returns_none_or_empty() {
        let df = header_df();
        let reader = ColumnReader::new(&df);

        assert!(reader.column("NONEXISTENT").is_none());
        assert!(!reader.has_column("NONEXISTENT"));
        assert!(reader.optional_values("NONEXISTENT").is_none());
        assert!(reader.dates("NONEXISTENT").is_empty());
        assert!(reader.distinct_values("NONEXISTENT").is_empty());
        assert!(reader.first_value_by_key("CHILD", "NONEXISTENT").is_empty());
        assert_eq!(reader.get_date("NONEXISTENT", 0), None);
    }

    #[test]
    fn test_out_of_bounds_row_access() {
        let df = header_df();
        let reader = ColumnReader::new(&df);

        assert_eq!(reader.get_optional("CHILD", 999), None);
        assert_eq!(reader.get_optional("CHILD", usize::MAX), None);
    }

    #[test]
    fn test_empty_dataframe_safety() {
        let df = DataFrame::empty();
        let reader = ColumnReader::new(&df);

        assert_eq!(reader.height(), 0);
        assert!(reader.optional_values("SEX").is_none());
        assert!(reader.dates("SEX").is_empty());
    }

    #[test]
    fn test_values_iterator_exact_size() {
        let df = header_df();
        let reader = ColumnReader::new(&df);

        let mut iter = reader.optional_values("CHILD").unwrap();
        assert_eq!(iter.len(), 4);
        let _ = iter.next();
        assert_eq!(iter.len(), 3);
    }
}
