//! Year-over-year consistency rules comparing `Header` with `Header_last`.

use std::collections::BTreeSet;

use tracing::trace;

use lac_common::ColumnReader;
use lac_model::{CheckResult, ErrorLocations, RuleDefinition, TableStore, rule};

use super::common::{require_column, require_columns};
use crate::logging::redact_value;

const HEADER: &str = "Header";
const CHILD: &str = "CHILD";

pub const RULE_202: RuleDefinition = rule! {
    code: "202",
    message: "The gender code conflicts with the gender already recorded for this child.",
    fields: ["SEX"],
    tables: ["Header"],
    check: validate_202,
};

pub const RULE_203: RuleDefinition = rule! {
    code: "203",
    message: "Date of birth is different from that previously recorded.",
    fields: ["DOB"],
    tables: ["Header"],
    check: validate_203,
};

fn validate_202(store: &TableStore) -> CheckResult<ErrorLocations> {
    changed_since_last_year(store, "SEX")
}

fn validate_203(store: &TableStore) -> CheckResult<ErrorLocations> {
    changed_since_last_year(store, "DOB")
}

/// Header rows whose `field` differs from last year's value for the same child.
///
/// Children missing from either year, and missing values on either side, pass.
fn changed_since_last_year(store: &TableStore, field: &str) -> CheckResult<ErrorLocations> {
    let (Some(header), Some(header_last)) = (store.table(HEADER), store.prior_year(HEADER)) else {
        return Ok(ErrorLocations::new());
    };
    let last_name = lac_model::prior_year_name(HEADER);
    require_columns(header_last, &last_name, &[CHILD, field])?;
    let previous = ColumnReader::new(header_last).first_value_by_key(CHILD, field);

    let reader = ColumnReader::new(header);
    require_column(reader, HEADER, field)?;
    let mut rows = BTreeSet::new();
    for (row, child) in require_column(reader, HEADER, CHILD)? {
        let Some(child) = child else {
            continue;
        };
        let (Some(current), Some(Some(last))) =
            (reader.get_optional(field, row), previous.get(&child))
        else {
            continue;
        };
        if &current != last {
            trace!(
                child = redact_value(&child),
                field,
                current = redact_value(&current),
                last = redact_value(last),
                "value changed since last year"
            );
            rows.insert(row);
        }
    }
    Ok(ErrorLocations::for_table(HEADER, rows))
}
