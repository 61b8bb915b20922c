//! Child-level rules over the `Header` table.

use lac_model::{CheckResult, ErrorLocations, RuleDefinition, TableStore, rule};

use super::common::{NullPolicy, invalid_codes, invalid_dates};

const HEADER: &str = "Header";

const SEX_CODES: &[&str] = &["1", "2"];

const ETHNIC_CODES: &[&str] = &[
    "WBRI", "WIRI", "WOTH", "WIRT", "WROM", "MWBC", "MWBA", "MWAS", "MOTH", "AIND", "APKN",
    "ABAN", "AOTH", "BCRB", "BAFR", "BOTH", "CHNE", "OOTH", "REFU", "NOBT",
];

pub const RULE_101: RuleDefinition = rule! {
    code: "101",
    message: "Gender code is not valid.",
    fields: ["SEX"],
    tables: ["Header"],
    check: validate_101,
};

pub const RULE_102: RuleDefinition = rule! {
    code: "102",
    message: "Date of birth is not a valid date.",
    fields: ["DOB"],
    tables: ["Header"],
    check: validate_102,
};

pub const RULE_103: RuleDefinition = rule! {
    code: "103",
    message: "The ethnicity code is either not valid or has not been entered.",
    fields: ["ETHNIC"],
    tables: ["Header"],
    check: validate_103,
};

fn validate_101(store: &TableStore) -> CheckResult<ErrorLocations> {
    invalid_codes(store, HEADER, "SEX", SEX_CODES, NullPolicy::Flagged)
}

fn validate_102(store: &TableStore) -> CheckResult<ErrorLocations> {
    invalid_dates(store, HEADER, "DOB", NullPolicy::Allowed)
}

fn validate_103(store: &TableStore) -> CheckResult<ErrorLocations> {
    invalid_codes(store, HEADER, "ETHNIC", ETHNIC_CODES, NullPolicy::Flagged)
}
