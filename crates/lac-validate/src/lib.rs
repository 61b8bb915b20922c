//! Rule registry, executor and rule catalogue for looked-after children returns.
//!
//! ```ignore
//! let config = ValidationConfig::for_year("2023");
//! let result = lac_validate::validate(&store, &config)?;
//! for warning in result.warnings() {
//!     eprintln!("{warning}");
//! }
//! ```
//!
//! # Module Organization
//!
//! - [`registry`]: resolve a collection year's rules from the revision manifests
//! - [`executor`]: run rules with fault isolation and merge their output
//! - [`rules`]: the rule catalogue and [`rules::MANIFESTS`]
//! - [`config`]: run options, loadable from JSON
//! - [`report`]: JSON payload for the reporting layer
//! - [`logging`]: `tracing-subscriber` setup and value redaction

pub mod config;
pub mod error;
pub mod executor;
pub mod logging;
pub mod registry;
pub mod report;
pub mod rules;

pub use config::ValidationConfig;
pub use error::{RegistryError, ValidateError};
pub use executor::RuleExecutor;
pub use registry::{RevisionManifest, RuleRegistry};
pub use report::{ReportPayload, TableSummary, build_report, write_report_json};

use lac_model::{TableStore, ValidationResult};

/// Validate a store against the configured collection year's rules.
///
/// Registry and configuration problems are returned before any rule runs.
/// Individual rule failures are recorded in the result instead.
pub fn validate(store: &TableStore, config: &ValidationConfig) -> Result<ValidationResult, ValidateError> {
    let registry = RuleRegistry::load_revision(&config.collection_year)?;
    let rules = config.select_rules(&registry, store)?;
    tracing::info!(
        revision = registry.revision(),
        selected = rules.len(),
        available = registry.len(),
        tables = store.len(),
        "starting validation"
    );
    Ok(RuleExecutor::new().run(store, &rules))
}
