//! Error types for registry construction and validation runs.
//!
//! Everything here is fatal to the caller and raised before any rule runs.
//! Failures inside individual checks are not errors at this level; they are
//! recorded in the [`ValidationResult`](lac_model::ValidationResult).

use std::path::PathBuf;

use thiserror::Error;

/// Errors building or querying a [`RuleRegistry`](crate::RuleRegistry).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum RegistryError {
    /// Two rules in one revision share a code.
    #[error("Duplicate rule code '{code}' in revision {revision}: declared in {first} and {second}")]
    DuplicateRuleCode {
        code: String,
        revision: String,
        first: String,
        second: String,
    },

    /// No rules are registered for the requested revision.
    #[error("Unknown ruleset revision '{revision}'")]
    UnknownRevision { revision: String },

    /// No rule with this code exists in the revision.
    #[error("Unknown rule code '{code}' in revision {revision}")]
    UnknownRuleCode { code: String, revision: String },

    /// A rule was registered with an empty code.
    #[error("Rule declared in {source_module} has an empty code")]
    EmptyRuleCode { source_module: String },

    /// A revision replaces a rule its base revision does not have.
    #[error("Revision {revision} replaces rule '{code}' which it does not inherit")]
    ReplacedRuleMissing { code: String, revision: String },

    /// A revision retires a rule its base revision does not have.
    #[error("Revision {revision} retires rule '{code}' which it does not inherit")]
    RetiredRuleMissing { code: String, revision: String },

    /// A revision extends itself, directly or through other revisions.
    #[error("Revision {revision} extends itself")]
    RevisionCycle { revision: String },
}

/// Errors from the top-level [`validate`](crate::validate) entry point.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ValidateError {
    /// Registry construction or rule selection failed.
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// A configuration or report file could not be read or written.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Configuration or report JSON could not be (de)serialized.
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for registry operations.
pub type Result<T> = std::result::Result<T, RegistryError>;
