//! In-memory bundle of submitted tables.

use std::collections::BTreeMap;
use std::ops::Range;

use polars::prelude::DataFrame;

use crate::error::StoreError;
use crate::metadata::Metadata;

/// Suffix marking the previous collection year's copy of a table.
pub const PRIOR_YEAR_SUFFIX: &str = "_last";

/// Tables of one return plus metadata, handed read-only to every check.
///
/// Checks borrow the store immutably. A check that needs a derived column must
/// clone the frame first; polars clones share column buffers, so the copy is
/// cheap and the derived column stays private to that check.
#[derive(Debug, Clone)]
pub struct TableStore {
    tables: BTreeMap<String, DataFrame>,
    metadata: Metadata,
}

impl TableStore {
    /// Create an empty store for a collection window.
    pub fn new(metadata: Metadata) -> Self {
        Self {
            tables: BTreeMap::new(),
            metadata,
        }
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with_table(mut self, name: impl Into<String>, df: DataFrame) -> Result<Self, StoreError> {
        self.insert(name, df)?;
        Ok(self)
    }

    /// Add or replace a table.
    ///
    /// Names ending in [`PRIOR_YEAR_SUFFIX`] are prior-year tables.
    pub fn insert(&mut self, name: impl Into<String>, df: DataFrame) -> Result<(), StoreError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(StoreError::EmptyTableName);
        }
        if let Some(base) = name.strip_suffix(PRIOR_YEAR_SUFFIX)
            && base.trim().is_empty()
        {
            return Err(StoreError::EmptyPriorYearName { name });
        }
        self.tables.insert(name, df);
        Ok(())
    }

    /// Add the prior-year copy of `base`, stored as `{base}_last`.
    pub fn insert_prior_year(&mut self, base: &str, df: DataFrame) -> Result<(), StoreError> {
        self.insert(prior_year_name(base), df)
    }

    /// Look up a table by exact name.
    pub fn table(&self, name: &str) -> Option<&DataFrame> {
        self.tables.get(name)
    }

    /// Look up last year's copy of `base`.
    pub fn prior_year(&self, base: &str) -> Option<&DataFrame> {
        self.tables.get(&prior_year_name(base))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tables.contains_key(name)
    }

    /// Number of rows in a table, `None` when the table is absent.
    pub fn height(&self, name: &str) -> Option<usize> {
        self.tables.get(name).map(DataFrame::height)
    }

    /// Valid row identifiers for a table (empty when absent).
    pub fn row_ids(&self, name: &str) -> Range<usize> {
        0..self.height(name).unwrap_or(0)
    }

    /// All table names, current and prior-year.
    pub fn table_names(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }

    /// Names of the current year's tables only.
    pub fn current_table_names(&self) -> impl Iterator<Item = &str> {
        self.table_names()
            .filter(|name| !name.ends_with(PRIOR_YEAR_SUFFIX))
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

/// Name under which the prior-year copy of `base` is stored.
pub fn prior_year_name(base: &str) -> String {
    format!("{base}{PRIOR_YEAR_SUFFIX}")
}
