//! Rule registry: the rules that apply to one collection year.
//!
//! Revisions are listed explicitly in a manifest rather than discovered at
//! runtime. Each [`RevisionManifest`] describes a collection year relative to
//! the year it extends, so a new year only lists what changed.

use std::collections::BTreeMap;

use lac_model::{RuleDefinition, TableStore};

use crate::error::{RegistryError, Result};
use crate::rules::MANIFESTS;

/// The rule changes one collection year makes to the year it extends.
#[derive(Debug, Clone, Copy)]
pub struct RevisionManifest {
    /// Revision identifier, the collection year (e.g. `"2023"`).
    pub id: &'static str,
    /// Revision whose rules are inherited.
    pub extends: Option<&'static str>,
    /// New rules. Codes must not collide with inherited ones.
    pub added: &'static [RuleDefinition],
    /// New versions of inherited rules, matched by code.
    pub replaced: &'static [RuleDefinition],
    /// Codes of inherited rules that no longer apply.
    pub retired: &'static [&'static str],
}

impl RevisionManifest {
    /// A revision that inherits nothing.
    pub const fn base(id: &'static str, added: &'static [RuleDefinition]) -> Self {
        Self {
            id,
            extends: None,
            added,
            replaced: &[],
            retired: &[],
        }
    }
}

/// Rules of one revision indexed by code.
#[derive(Debug, Clone)]
pub struct RuleRegistry {
    revision: String,
    rules: BTreeMap<&'static str, RuleDefinition>,
}

impl RuleRegistry {
    /// Load a revision from the built-in rule catalogue.
    pub fn load_revision(revision: &str) -> Result<Self> {
        Self::from_manifests(MANIFESTS, revision)
    }

    /// Resolve a revision from an arbitrary set of manifests.
    pub fn from_manifests(manifests: &[RevisionManifest], revision: &str) -> Result<Self> {
        let mut chain = Vec::new();
        let rules = resolve(manifests, revision, &mut chain)?;
        if rules.is_empty() {
            return Err(RegistryError::UnknownRevision {
                revision: revision.to_string(),
            });
        }
        tracing::debug!(revision, rules = rules.len(), chain = ?chain, "resolved ruleset revision");
        Ok(Self {
            revision: revision.to_string(),
            rules,
        })
    }

    /// Build a registry from an explicit list of rules.
    pub fn from_rules(
        revision: impl Into<String>,
        rules: impl IntoIterator<Item = RuleDefinition>,
    ) -> Result<Self> {
        let revision = revision.into();
        let mut index = BTreeMap::new();
        for rule in rules {
            add_rule(&mut index, rule, &revision)?;
        }
        if index.is_empty() {
            return Err(RegistryError::UnknownRevision { revision });
        }
        Ok(Self {
            revision,
            rules: index,
        })
    }

    /// Revision identifiers available in the built-in catalogue.
    pub fn available_revisions() -> Vec<&'static str> {
        MANIFESTS.iter().map(|manifest| manifest.id).collect()
    }

    pub fn revision(&self) -> &str {
        &self.revision
    }

    /// Look up a rule by code.
    pub fn by_code(&self, code: &str) -> Result<&RuleDefinition> {
        self.rules
            .get(code)
            .ok_or_else(|| RegistryError::UnknownRuleCode {
                code: code.to_string(),
                revision: self.revision.clone(),
            })
    }

    pub fn contains(&self, code: &str) -> bool {
        self.rules.contains_key(code)
    }

    /// All rules, ordered by code.
    pub fn definitions(&self) -> impl Iterator<Item = &RuleDefinition> {
        self.rules.values()
    }

    /// Rules for the given codes, failing on the first unknown code.
    pub fn select<S: AsRef<str>>(&self, codes: &[S]) -> Result<Vec<RuleDefinition>> {
        codes
            .iter()
            .map(|code| self.by_code(code.as_ref()).copied())
            .collect()
    }

    /// Rules whose declared tables intersect the tables present in the store.
    ///
    /// Rules without declared tables always apply.
    pub fn applicable_to(&self, store: &TableStore) -> Vec<RuleDefinition> {
        self.definitions()
            .filter(|rule| rule.concerns_any(store.table_names()))
            .copied()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

fn resolve<'m>(
    manifests: &'m [RevisionManifest],
    revision: &str,
    chain: &mut Vec<&'m str>,
) -> Result<BTreeMap<&'static str, RuleDefinition>> {
    let manifest = manifests
        .iter()
        .find(|manifest| manifest.id == revision)
        .ok_or_else(|| RegistryError::UnknownRevision {
            revision: revision.to_string(),
        })?;
    if chain.contains(&manifest.id) {
        return Err(RegistryError::RevisionCycle {
            revision: manifest.id.to_string(),
        });
    }
    chain.push(manifest.id);

    let mut rules = match manifest.extends {
        Some(base) => resolve(manifests, base, chain)?,
        None => BTreeMap::new(),
    };

    for code in manifest.retired {
        if rules.remove(code).is_none() {
            return Err(RegistryError::RetiredRuleMissing {
                code: (*code).to_string(),
                revision: manifest.id.to_string(),
            });
        }
    }

    let mut replacements: BTreeMap<&'static str, RuleDefinition> = BTreeMap::new();
    for rule in manifest.replaced {
        if !rules.contains_key(rule.code()) {
            return Err(RegistryError::ReplacedRuleMissing {
                code: rule.code().to_string(),
                revision: manifest.id.to_string(),
            });
        }
        add_rule(&mut replacements, *rule, manifest.id)?;
    }
    rules.extend(replacements);

    for rule in manifest.added {
        add_rule(&mut rules, *rule, manifest.id)?;
    }

    Ok(rules)
}

fn add_rule(
    index: &mut BTreeMap<&'static str, RuleDefinition>,
    rule: RuleDefinition,
    revision: &str,
) -> Result<()> {
    if rule.code().trim().is_empty() {
        return Err(RegistryError::EmptyRuleCode {
            source_module: rule.source().to_string(),
        });
    }
    if let Some(existing) = index.get(rule.code()) {
        return Err(RegistryError::DuplicateRuleCode {
            code: rule.code().to_string(),
            revision: revision.to_string(),
            first: existing.source().to_string(),
            second: rule.source().to_string(),
        });
    }
    index.insert(rule.code(), rule);
    Ok(())
}
