//! Building blocks shared by the rule bodies.
//!
//! Every helper follows the same table contract: an absent table yields empty
//! locations, while a present table missing the column is a check error.

use std::collections::BTreeSet;

use polars::prelude::DataFrame;

use lac_common::{ColumnReader, OptionalValueIter};
use lac_model::{CheckError, CheckResult, ErrorLocations, TableStore};

/// How a rule treats a null or blank cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NullPolicy {
    /// Missing values pass.
    Allowed,
    /// Missing values are flagged like invalid ones.
    Flagged,
}

impl NullPolicy {
    fn flags_missing(self) -> bool {
        matches!(self, Self::Flagged)
    }
}

/// Values of a column the check cannot do without.
pub(crate) fn require_column<'a>(
    reader: ColumnReader<'a>,
    table: &str,
    column: &str,
) -> CheckResult<OptionalValueIter<'a>> {
    reader
        .optional_values(column)
        .ok_or_else(|| CheckError::missing_column(table, column))
}

/// Fail unless every named column is present.
pub(crate) fn require_columns(df: &DataFrame, table: &str, columns: &[&str]) -> CheckResult<()> {
    let reader = ColumnReader::new(df);
    match columns.iter().find(|column| !reader.has_column(column)) {
        Some(column) => Err(CheckError::missing_column(table, *column)),
        None => Ok(()),
    }
}

/// Rows whose value in `column` is not one of `valid`.
pub(crate) fn invalid_codes(
    store: &TableStore,
    table: &str,
    column: &str,
    valid: &[&str],
    nulls: NullPolicy,
) -> CheckResult<ErrorLocations> {
    let Some(df) = store.table(table) else {
        return Ok(ErrorLocations::new());
    };
    let rows: BTreeSet<usize> = require_column(ColumnReader::new(df), table, column)?
        .filter(|(_, value)| match value {
            Some(code) => !valid.contains(&code.as_str()),
            None => nulls.flags_missing(),
        })
        .map(|(row, _)| row)
        .collect();
    Ok(ErrorLocations::for_table(table, rows))
}

/// Rows whose value in `column` is neither a native date nor valid `dd/mm/yyyy` text.
pub(crate) fn invalid_dates(
    store: &TableStore,
    table: &str,
    column: &str,
    nulls: NullPolicy,
) -> CheckResult<ErrorLocations> {
    let Some(df) = store.table(table) else {
        return Ok(ErrorLocations::new());
    };
    let reader = ColumnReader::new(df);
    let values = require_column(reader, table, column)?;
    let missing = values.filter(|(_, value)| value.is_none()).map(|(row, _)| row);

    let mut rows: BTreeSet<usize> = reader
        .dates(column)
        .into_iter()
        .filter(|(_, parsed)| parsed.is_none())
        .map(|(row, _)| row)
        .collect();
    if nulls.flags_missing() {
        rows.extend(missing);
    }
    Ok(ErrorLocations::for_table(table, rows))
}
