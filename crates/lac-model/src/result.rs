//! Aggregated output of one validation run.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One row flagged by one rule, with enough context to render it.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RuleHit {
    pub code: String,
    pub message: String,
    pub affected_fields: Vec<String>,
    pub table: String,
    pub row_id: usize,
}

/// Why a rule could not be evaluated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FailureReason {
    /// The check returned an error.
    CheckFailed { detail: String },
    /// The check panicked.
    Panicked { detail: String },
    /// The check flagged rows in a table that is not in the store.
    UnknownTable { table: String },
    /// The check flagged a row identifier the table does not have.
    RowOutOfRange {
        table: String,
        row_id: usize,
        height: usize,
    },
    /// Different definitions were given for the same code; none of them ran.
    ConflictingDefinitions { sources: Vec<String> },
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CheckFailed { detail } => write!(f, "{detail}"),
            Self::Panicked { detail } => write!(f, "check panicked: {detail}"),
            Self::UnknownTable { table } => {
                write!(f, "flagged rows in table '{table}' which was not submitted")
            }
            Self::RowOutOfRange {
                table,
                row_id,
                height,
            } => write!(
                f,
                "flagged row {row_id} in table '{table}' which only has {height} row(s)"
            ),
            Self::ConflictingDefinitions { sources } => {
                write!(f, "code is declared by more than one rule: {}", sources.join(", "))
            }
        }
    }
}

/// A rule that failed to run, recorded against its code.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("rule {code} could not be evaluated: {reason}")]
pub struct RuleExecutionError {
    pub code: String,
    pub reason: FailureReason,
}

impl RuleExecutionError {
    pub fn new(code: impl Into<String>, reason: FailureReason) -> Self {
        Self {
            code: code.into(),
            reason,
        }
    }
}

/// Merged output of a run: flagged rows per table, raw hits and rule failures.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    /// table -> row -> codes of the rules that flagged it
    pub flagged: BTreeMap<String, BTreeMap<usize, BTreeSet<String>>>,
    /// Every (rule, table, row) hit, sorted by table, row, then code.
    pub hits: Vec<RuleHit>,
    /// Rules that could not be evaluated, sorted by code.
    pub errors: Vec<RuleExecutionError>,
    /// Codes of every rule the executor attempted, sorted.
    pub rules_run: Vec<String>,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Row identifiers flagged in a table by any rule.
    pub fn flagged_rows(&self, table: &str) -> BTreeSet<usize> {
        self.flagged
            .get(table)
            .map(|rows| rows.keys().copied().collect())
            .unwrap_or_default()
    }

    /// Codes of the rules that flagged a given row.
    pub fn codes_for(&self, table: &str, row_id: usize) -> BTreeSet<&str> {
        self.flagged
            .get(table)
            .and_then(|rows| rows.get(&row_id))
            .map(|codes| codes.iter().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Tables with at least one flagged row.
    pub fn tables(&self) -> impl Iterator<Item = &str> {
        self.flagged.keys().map(String::as_str)
    }

    pub fn hits_for<'a>(&'a self, code: &'a str) -> impl Iterator<Item = &'a RuleHit> {
        self.hits.iter().filter(move |hit| hit.code == code)
    }

    /// Rows flagged by one rule, per table.
    pub fn rows_for_rule<'a>(&'a self, code: &'a str) -> BTreeMap<&'a str, BTreeSet<usize>> {
        let mut rows: BTreeMap<&'a str, BTreeSet<usize>> = BTreeMap::new();
        for hit in self.hits_for(code) {
            rows.entry(hit.table.as_str()).or_default().insert(hit.row_id);
        }
        rows
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// No rows flagged and no rule failures.
    pub fn is_clean(&self) -> bool {
        self.flagged.is_empty() && self.errors.is_empty()
    }

    /// User-facing warnings for rules that could not be evaluated.
    pub fn warnings(&self) -> Vec<String> {
        self.errors.iter().map(ToString::to_string).collect()
    }
}
