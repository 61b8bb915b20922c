//! Error types for table store setup and rule check bodies.

use thiserror::Error;

/// Errors raised while assembling a [`TableStore`](crate::TableStore).
///
/// These are setup errors: the caller must fix the input before any rule runs.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StoreError {
    /// A table was registered under an empty name.
    #[error("Table name must not be empty")]
    EmptyTableName,

    /// A prior-year table has nothing before its `_last` suffix.
    #[error("Prior-year table '{name}' has no base table name")]
    EmptyPriorYearName { name: String },

    /// A collection window date could not be parsed.
    #[error("Invalid {field} '{value}': expected dd/mm/yyyy")]
    InvalidCollectionDate { field: &'static str, value: String },

    /// The collection window ends before it starts.
    #[error("Collection window ends ({end}) before it starts ({start})")]
    CollectionWindow { start: String, end: String },
}

/// Errors raised from inside a rule check.
///
/// The executor records these against the rule code instead of aborting the run.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CheckError {
    /// Polars DataFrame operation error.
    #[error("DataFrame error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// A column the check cannot do without is absent from a present table.
    #[error("Column '{column}' not found in table '{table}'")]
    MissingColumn { table: String, column: String },

    /// Reference data the check depends on was not loaded into metadata.
    #[error("Reference data '{name}' is not loaded")]
    MissingReference { name: &'static str },

    /// Any other check failure.
    #[error("{0}")]
    Message(String),
}

impl CheckError {
    /// Create a missing column error.
    pub fn missing_column(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self::MissingColumn {
            table: table.into(),
            column: column.into(),
        }
    }
}

/// Result type returned by check bodies.
pub type CheckResult<T> = std::result::Result<T, CheckError>;
