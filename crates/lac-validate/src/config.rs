//! Run configuration: which revision to load and which rules to run.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use lac_model::{RuleDefinition, TableStore};

use crate::error::{RegistryError, ValidateError};
use crate::registry::RuleRegistry;

/// Options for one validation run.
///
/// ```json
/// { "collection_year": "2023", "ignore": ["1004"] }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ValidationConfig {
    /// Ruleset revision to load.
    pub collection_year: String,
    /// Run only these codes. `None` runs the whole revision.
    #[serde(default)]
    pub select: Option<Vec<String>>,
    /// Codes to skip.
    #[serde(default)]
    pub ignore: Vec<String>,
    /// Skip rules whose declared tables were not submitted.
    #[serde(default = "default_only_submitted_tables")]
    pub only_submitted_tables: bool,
}

fn default_only_submitted_tables() -> bool {
    true
}

impl ValidationConfig {
    pub fn for_year(collection_year: impl Into<String>) -> Self {
        Self {
            collection_year: collection_year.into(),
            select: None,
            ignore: Vec::new(),
            only_submitted_tables: true,
        }
    }

    #[must_use]
    pub fn with_select<S: Into<String>>(mut self, codes: impl IntoIterator<Item = S>) -> Self {
        self.select = Some(codes.into_iter().map(Into::into).collect());
        self
    }

    #[must_use]
    pub fn with_ignore<S: Into<String>>(mut self, codes: impl IntoIterator<Item = S>) -> Self {
        self.ignore = codes.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_only_submitted_tables(mut self, enable: bool) -> Self {
        self.only_submitted_tables = enable;
        self
    }

    pub fn from_json_str(json: &str) -> Result<Self, ValidateError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: &Path) -> Result<Self, ValidateError> {
        let json = fs::read_to_string(path).map_err(|source| ValidateError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// Pick the rules this configuration runs from a registry.
    ///
    /// Every code in `select` and `ignore` must exist in the registry.
    pub fn select_rules(
        &self,
        registry: &RuleRegistry,
        store: &TableStore,
    ) -> Result<Vec<RuleDefinition>, RegistryError> {
        let ignored: BTreeSet<&str> = self.ignore.iter().map(String::as_str).collect();
        for code in &ignored {
            registry.by_code(code)?;
        }

        let candidates = match &self.select {
            Some(codes) => registry.select(codes)?,
            None => registry.definitions().copied().collect(),
        };

        Ok(candidates
            .into_iter()
            .filter(|rule| !ignored.contains(rule.code()))
            .filter(|rule| !self.only_submitted_tables || rule.concerns_any(store.table_names()))
            .collect())
    }
}
