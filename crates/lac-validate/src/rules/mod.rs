//! The rule catalogue and the manifest of revisions built from it.
//!
//! Adding a rule means declaring it with [`rule!`](lac_model::rule) in the
//! module for its subject table and listing it in the manifest of the
//! collection year that introduced it.

mod common;
pub mod cross_table;
pub mod episodes;
pub mod header;
pub mod missing;
pub mod prior_year;
pub mod reference;

pub use common::NullPolicy;

use lac_model::RuleDefinition;

use crate::registry::RevisionManifest;

const RULES_2022: &[RuleDefinition] = &[
    header::RULE_101,
    header::RULE_102,
    header::RULE_103,
    episodes::RULE_141,
    episodes::RULE_143,
    episodes::RULE_144,
    episodes::RULE_145,
    episodes::RULE_146,
    episodes::RULE_157,
    prior_year::RULE_202,
    prior_year::RULE_203,
    cross_table::RULE_1001,
    reference::RULE_1002,
    reference::RULE_1003,
    reference::RULE_1004,
];

/// Every ruleset revision, oldest first.
pub const MANIFESTS: &[RevisionManifest] = &[
    RevisionManifest::base("2022", RULES_2022),
    RevisionManifest {
        id: "2023",
        extends: Some("2022"),
        added: &[missing::RULE_1005],
        replaced: &[episodes::RULE_146_2023],
        retired: &[],
    },
    RevisionManifest {
        id: "2024",
        extends: Some("2023"),
        added: &[],
        replaced: &[],
        retired: &["1004"],
    },
];
