//! Row locations flagged by a single check.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// Mapping from table name to the row identifiers a check flagged.
///
/// Rows are held as sets, so two results compare equal regardless of the order
/// a check produced them in. Tables with no flagged rows are never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorLocations {
    tables: BTreeMap<String, BTreeSet<usize>>,
}

impl ErrorLocations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Single-table result, the common case for one-table rules.
    pub fn for_table(table: impl Into<String>, rows: impl IntoIterator<Item = usize>) -> Self {
        let mut locations = Self::new();
        locations.flag(table, rows);
        locations
    }

    /// Record flagged rows for a table. Empty row sets are ignored.
    pub fn flag(&mut self, table: impl Into<String>, rows: impl IntoIterator<Item = usize>) {
        let rows: BTreeSet<usize> = rows.into_iter().collect();
        if rows.is_empty() {
            return;
        }
        self.tables.entry(table.into()).or_default().extend(rows);
    }

    /// Builder-style [`flag`](Self::flag).
    #[must_use]
    pub fn with(mut self, table: impl Into<String>, rows: impl IntoIterator<Item = usize>) -> Self {
        self.flag(table, rows);
        self
    }

    pub fn rows(&self, table: &str) -> Option<&BTreeSet<usize>> {
        self.tables.get(table)
    }

    pub fn tables(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &BTreeSet<usize>)> {
        self.tables.iter().map(|(table, rows)| (table.as_str(), rows))
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Total number of flagged rows across all tables.
    pub fn row_count(&self) -> usize {
        self.tables.values().map(BTreeSet::len).sum()
    }
}

impl<T: Into<String>> FromIterator<(T, Vec<usize>)> for ErrorLocations {
    fn from_iter<I: IntoIterator<Item = (T, Vec<usize>)>>(iter: I) -> Self {
        let mut locations = Self::new();
        for (table, rows) in iter {
            locations.flag(table, rows);
        }
        locations
    }
}
