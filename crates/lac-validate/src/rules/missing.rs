//! Rules over the `Missing` table, collected from 2023.

use lac_model::{CheckResult, ErrorLocations, RuleDefinition, TableStore, rule};

use super::common::{NullPolicy, invalid_dates};

pub const RULE_1005: RuleDefinition = rule! {
    code: "1005",
    message: "Date missing episode started is not a valid date.",
    fields: ["MIS_START"],
    tables: ["Missing"],
    check: validate_1005,
};

fn validate_1005(store: &TableStore) -> CheckResult<ErrorLocations> {
    invalid_dates(store, "Missing", "MIS_START", NullPolicy::Allowed)
}
