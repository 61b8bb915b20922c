use std::collections::{BTreeMap, BTreeSet};

use serde_json::json;

use lac_model::{
    CheckResult, ErrorLocations, FailureReason, Metadata, RuleDefinition, RuleExecutionError,
    RuleHit, TableStore, ValidationResult, rule,
};

fn dob_rows(store: &TableStore) -> CheckResult<ErrorLocations> {
    let Some(header) = store.table("Header") else {
        return Ok(ErrorLocations::new());
    };
    Ok(ErrorLocations::for_table("Header", 0..header.height()))
}

const RULE_102: RuleDefinition = rule! {
    code: "102",
    message: "Date of birth is not a valid date.",
    fields: ["DOB"],
    check: dob_rows,
};

#[test]
fn macro_declares_rule_outside_the_model_crate() {
    assert_eq!(RULE_102.code(), "102");
    assert_eq!(RULE_102.source(), "model::dob_rows");
    assert!(RULE_102.affected_tables().is_empty());
    assert_eq!(RULE_102.to_string(), "102: Date of birth is not a valid date.");

    let store = TableStore::new(Metadata::from_collection_dates("01/04/2022", "31/03/2023").unwrap());
    assert!(RULE_102.run(&store).unwrap().is_empty());
}

#[test]
fn result_serializes_for_the_reporting_layer() {
    let mut flagged = BTreeMap::new();
    flagged.insert(
        "Header".to_string(),
        BTreeMap::from([(3, BTreeSet::from(["102".to_string()]))]),
    );
    let result = ValidationResult {
        flagged,
        hits: vec![RuleHit {
            code: "102".to_string(),
            message: "Date of birth is not a valid date.".to_string(),
            affected_fields: vec!["DOB".to_string()],
            table: "Header".to_string(),
            row_id: 3,
        }],
        errors: vec![RuleExecutionError::new(
            "1002",
            FailureReason::RowOutOfRange {
                table: "Episodes".to_string(),
                row_id: 12,
                height: 10,
            },
        )],
        rules_run: vec!["1002".to_string(), "102".to_string()],
    };

    let value = serde_json::to_value(&result).unwrap();
    assert_eq!(value["flagged"]["Header"]["3"], json!(["102"]));
    assert_eq!(value["hits"][0]["row_id"], 3);
    assert_eq!(
        value["errors"][0]["reason"],
        json!({ "kind": "row_out_of_range", "table": "Episodes", "row_id": 12, "height": 10 })
    );

    let back: ValidationResult = serde_json::from_value(value).unwrap();
    assert_eq!(back, result);
    assert_eq!(
        back.warnings(),
        vec!["rule 1002 could not be evaluated: flagged row 12 in table 'Episodes' which only has 10 row(s)"]
    );
    assert_eq!(back.rows_for_rule("102")["Header"], BTreeSet::from([3]));
}
