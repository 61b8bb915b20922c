//! Data model for validating looked-after children statutory returns.
//!
//! # Module Organization
//!
//! - [`store`]: the [`TableStore`] handed to every check, including `_last` prior-year tables
//! - [`metadata`]: collection window, local authority and reference tables
//! - [`rule`]: [`RuleDefinition`] and the [`rule!`] declaration macro
//! - [`locations`]: [`ErrorLocations`] returned by a single check
//! - [`result`]: the merged [`ValidationResult`]
//! - [`error`]: store setup and check errors

pub mod error;
pub mod locations;
pub mod metadata;
pub mod result;
pub mod rule;
pub mod store;

pub use error::{CheckError, CheckResult, StoreError};
pub use locations::ErrorLocations;
pub use metadata::{Metadata, POSTCODE_COLUMN, PROVIDER_URN_COLUMN};
pub use result::{FailureReason, RuleExecutionError, RuleHit, ValidationResult};
pub use rule::{CheckFn, RuleDefinition};
pub use store::{PRIOR_YEAR_SUFFIX, TableStore, prior_year_name};
