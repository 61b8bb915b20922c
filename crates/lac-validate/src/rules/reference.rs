//! Rules that consult reference data carried in the store metadata.
//!
//! Reference tables are pre-loaded by the caller. When a rule's subject table
//! is submitted but its reference data was never loaded, the rule fails with
//! [`CheckError::MissingReference`] so the gap shows up as a warning instead of
//! a silent pass.

use std::collections::{BTreeSet, HashSet};

use lac_common::ColumnReader;
use lac_model::{
    CheckError, CheckResult, ErrorLocations, POSTCODE_COLUMN, PROVIDER_URN_COLUMN, RuleDefinition,
    TableStore, rule,
};

use super::common::{require_column, require_columns};

const EPISODES: &str = "Episodes";

/// URN placeholder for placements with no Ofsted registration.
const URN_EXEMPT: &str = "XXXXXXX";

pub const RULE_1002: RuleDefinition = rule! {
    code: "1002",
    message: "The URN is not a valid Ofsted provider.",
    fields: ["URN"],
    tables: ["Episodes"],
    check: validate_1002,
};

pub const RULE_1003: RuleDefinition = rule! {
    code: "1003",
    message: "Postcode is not a recognised postcode.",
    fields: ["HOME_POST", "PL_POST"],
    tables: ["Episodes"],
    check: validate_1003,
};

pub const RULE_1004: RuleDefinition = rule! {
    code: "1004",
    message: "The placing local authority is the same as the local authority for an out of authority placement.",
    fields: ["PL_LA", "PL_LOCATION"],
    tables: ["Episodes"],
    check: validate_1004,
};

fn validate_1002(store: &TableStore) -> CheckResult<ErrorLocations> {
    let Some(episodes) = store.table(EPISODES) else {
        return Ok(ErrorLocations::new());
    };
    let providers = store
        .metadata()
        .provider_info
        .as_ref()
        .ok_or(CheckError::MissingReference {
            name: "provider_info",
        })?;
    require_columns(providers, "provider_info", &[PROVIDER_URN_COLUMN])?;
    let known = ColumnReader::new(providers).distinct_values(PROVIDER_URN_COLUMN);

    let rows: BTreeSet<usize> = require_column(ColumnReader::new(episodes), EPISODES, "URN")?
        .filter_map(|(row, urn)| urn.map(|urn| (row, urn)))
        .filter(|(_, urn)| urn != URN_EXEMPT && !known.contains(urn))
        .map(|(row, _)| row)
        .collect();
    Ok(ErrorLocations::for_table(EPISODES, rows))
}

fn validate_1003(store: &TableStore) -> CheckResult<ErrorLocations> {
    let Some(episodes) = store.table(EPISODES) else {
        return Ok(ErrorLocations::new());
    };
    let postcodes = store
        .metadata()
        .postcodes
        .as_ref()
        .ok_or(CheckError::MissingReference { name: "postcodes" })?;
    require_columns(postcodes, "postcodes", &[POSTCODE_COLUMN])?;
    let known: HashSet<String> = ColumnReader::new(postcodes)
        .distinct_values(POSTCODE_COLUMN)
        .iter()
        .map(|postcode| normalise_postcode(postcode))
        .collect();

    let reader = ColumnReader::new(episodes);
    let mut rows = BTreeSet::new();
    for column in ["HOME_POST", "PL_POST"] {
        rows.extend(
            require_column(reader, EPISODES, column)?
                .filter_map(|(row, postcode)| postcode.map(|postcode| (row, postcode)))
                .filter(|(_, postcode)| !known.contains(&normalise_postcode(postcode)))
                .map(|(row, _)| row),
        );
    }
    Ok(ErrorLocations::for_table(EPISODES, rows))
}

/// Out of authority placements must name a different placing authority.
fn validate_1004(store: &TableStore) -> CheckResult<ErrorLocations> {
    let Some(episodes) = store.table(EPISODES) else {
        return Ok(ErrorLocations::new());
    };
    let Some(local_authority) = store.metadata().local_authority.as_deref() else {
        return Err(CheckError::MissingReference {
            name: "localAuthority",
        });
    };
    require_columns(episodes, EPISODES, &["PL_LA", "PL_LOCATION"])?;

    let reader = ColumnReader::new(episodes);
    let rows: BTreeSet<usize> = require_column(reader, EPISODES, "PL_LOCATION")?
        .filter(|(_, location)| location.as_deref() == Some("OUT"))
        .filter(|(row, _)| reader.get_optional("PL_LA", *row).as_deref() == Some(local_authority))
        .map(|(row, _)| row)
        .collect();
    Ok(ErrorLocations::for_table(EPISODES, rows))
}

/// Upper case with all whitespace removed, so "ab1 2cd" matches "AB12CD".
fn normalise_postcode(postcode: &str) -> String {
    postcode
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| c.to_ascii_uppercase())
        .collect()
}
