//! Rules over the `Episodes` table.
//!
//! Code lists follow the return's guidance for the year the rule was
//! introduced. Rule 146 was revised in 2023 when two placement types were added.

use std::collections::BTreeSet;

use lac_common::ColumnReader;
use lac_model::{CheckResult, ErrorLocations, RuleDefinition, TableStore, rule};

use super::common::{NullPolicy, invalid_codes, invalid_dates, require_column};

const EPISODES: &str = "Episodes";

const RNE_CODES: &[&str] = &["S", "P", "L", "T", "U", "B"];

const LS_CODES: &[&str] = &[
    "C1", "C2", "D1", "E1", "J1", "J2", "J3", "L1", "L2", "L3", "V2", "V3", "V4",
];

const CIN_CODES: &[&str] = &["N1", "N2", "N3", "N4", "N5", "N6", "N7", "N8"];

const PLACE_CODES_2022: &[&str] = &[
    "A3", "A4", "A5", "A6", "H5", "K1", "K2", "P1", "P2", "P3", "R1", "R2", "R3", "R5", "S1",
    "T0", "T1", "T2", "T3", "T4", "U1", "U2", "U3", "U4", "U5", "U6", "Z1",
];

const PLACE_CODES_2023: &[&str] = &[
    "A3", "A4", "A5", "A6", "H5", "K1", "K2", "K3", "K4", "P1", "P2", "P3", "R1", "R2", "R3",
    "R5", "S1", "T0", "T1", "T2", "T3", "T4", "U1", "U2", "U3", "U4", "U5", "U6", "Z1",
];

pub const RULE_141: RuleDefinition = rule! {
    code: "141",
    message: "Date episode began is not a valid date.",
    fields: ["DECOM"],
    tables: ["Episodes"],
    check: validate_141,
};

pub const RULE_143: RuleDefinition = rule! {
    code: "143",
    message: "The reason for new episode code is not a valid code.",
    fields: ["RNE"],
    tables: ["Episodes"],
    check: validate_143,
};

pub const RULE_144: RuleDefinition = rule! {
    code: "144",
    message: "The legal status code is not a valid code.",
    fields: ["LS"],
    tables: ["Episodes"],
    check: validate_144,
};

pub const RULE_145: RuleDefinition = rule! {
    code: "145",
    message: "Category of need code is not a valid code.",
    fields: ["CIN"],
    tables: ["Episodes"],
    check: validate_145,
};

pub const RULE_146: RuleDefinition = rule! {
    code: "146",
    message: "Placement type is not a valid code.",
    fields: ["PLACE"],
    tables: ["Episodes"],
    check: validate_146,
};

pub const RULE_146_2023: RuleDefinition = rule! {
    code: "146",
    message: "Placement type is not a valid code.",
    fields: ["PLACE"],
    tables: ["Episodes"],
    check: validate_146_2023,
};

pub const RULE_157: RuleDefinition = rule! {
    code: "157",
    message: "Date episode began is after the end of the collection year.",
    fields: ["DECOM"],
    tables: ["Episodes"],
    check: validate_157,
};

fn validate_141(store: &TableStore) -> CheckResult<ErrorLocations> {
    invalid_dates(store, EPISODES, "DECOM", NullPolicy::Allowed)
}

fn validate_143(store: &TableStore) -> CheckResult<ErrorLocations> {
    invalid_codes(store, EPISODES, "RNE", RNE_CODES, NullPolicy::Allowed)
}

fn validate_144(store: &TableStore) -> CheckResult<ErrorLocations> {
    invalid_codes(store, EPISODES, "LS", LS_CODES, NullPolicy::Allowed)
}

fn validate_145(store: &TableStore) -> CheckResult<ErrorLocations> {
    invalid_codes(store, EPISODES, "CIN", CIN_CODES, NullPolicy::Allowed)
}

fn validate_146(store: &TableStore) -> CheckResult<ErrorLocations> {
    invalid_codes(store, EPISODES, "PLACE", PLACE_CODES_2022, NullPolicy::Allowed)
}

fn validate_146_2023(store: &TableStore) -> CheckResult<ErrorLocations> {
    invalid_codes(store, EPISODES, "PLACE", PLACE_CODES_2023, NullPolicy::Allowed)
}

/// Unparseable dates are left to rule 141.
fn validate_157(store: &TableStore) -> CheckResult<ErrorLocations> {
    let Some(episodes) = store.table(EPISODES) else {
        return Ok(ErrorLocations::new());
    };
    let reader = ColumnReader::new(episodes);
    require_column(reader, EPISODES, "DECOM")?;

    let collection_end = store.metadata().collection_end;
    let rows: BTreeSet<usize> = reader
        .dates("DECOM")
        .into_iter()
        .filter_map(|(row, parsed)| parsed.map(|date| (row, date)))
        .filter(|(_, date)| *date > collection_end)
        .map(|(row, _)| row)
        .collect();
    Ok(ErrorLocations::for_table(EPISODES, rows))
}
