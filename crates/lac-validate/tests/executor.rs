use std::collections::BTreeSet;

use polars::prelude::*;
use proptest::prelude::*;

use lac_model::{
    CheckError, CheckResult, ErrorLocations, FailureReason, Metadata, RuleDefinition, TableStore,
    rule,
};
use lac_validate::RuleExecutor;

fn store() -> TableStore {
    let header = df! {
        "CHILD" => &["C1", "C2", "C3", "C4"],
        "SEX" => &[Some("1"), Some("2"), Some("3"), None],
    }
    .unwrap();
    let episodes = df! {
        "CHILD" => &["C1", "C1", "C2"],
        "DECOM" => &["01/05/2022", "01/06/2022", "01/07/2022"],
    }
    .unwrap();
    TableStore::new(Metadata::from_collection_dates("01/04/2022", "31/03/2023").unwrap())
        .with_table("Header", header)
        .unwrap()
        .with_table("Episodes", episodes)
        .unwrap()
}

fn flag_header_rows(store: &TableStore) -> CheckResult<ErrorLocations> {
    if store.table("Header").is_none() {
        return Ok(ErrorLocations::new());
    }
    Ok(ErrorLocations::for_table("Header", [2, 3]))
}

fn flag_both_tables(store: &TableStore) -> CheckResult<ErrorLocations> {
    if store.table("Episodes").is_none() {
        return Ok(ErrorLocations::new());
    }
    Ok(ErrorLocations::for_table("Episodes", [1]).with("Header", [0, 2]))
}

fn always_fails(_store: &TableStore) -> CheckResult<ErrorLocations> {
    Err(CheckError::missing_column("Header", "ETHNIC"))
}

fn always_panics(_store: &TableStore) -> CheckResult<ErrorLocations> {
    panic!("index out of bounds in rule body")
}

fn phantom_row(_store: &TableStore) -> CheckResult<ErrorLocations> {
    Ok(ErrorLocations::for_table("Header", [1, 99]))
}

fn phantom_table(_store: &TableStore) -> CheckResult<ErrorLocations> {
    Ok(ErrorLocations::for_table("OC3", [0]))
}

/// Works on a private copy with a derived column.
fn derives_column(store: &TableStore) -> CheckResult<ErrorLocations> {
    let Some(episodes) = store.table("Episodes") else {
        return Ok(ErrorLocations::new());
    };
    let mut local = episodes.clone();
    let parsed = Column::new("DECOM_PARSED".into(), vec![true; local.height()]);
    local.with_column(parsed)?;
    Ok(ErrorLocations::new())
}

fn sees_no_derived_column(store: &TableStore) -> CheckResult<ErrorLocations> {
    let Some(episodes) = store.table("Episodes") else {
        return Ok(ErrorLocations::new());
    };
    if episodes.column("DECOM_PARSED").is_ok() {
        return Err(CheckError::Message("derived column leaked".to_string()));
    }
    Ok(ErrorLocations::new())
}

const HEADER_RULE: RuleDefinition = rule! {
    code: "H1",
    message: "Header rows 2 and 3",
    fields: ["SEX"],
    tables: ["Header"],
    check: flag_header_rows,
};
const BOTH_RULE: RuleDefinition = rule! {
    code: "X1",
    message: "Both tables",
    fields: ["DECOM", "DOB"],
    tables: ["Header", "Episodes"],
    check: flag_both_tables,
};
const FAILING_RULE: RuleDefinition = rule! { code: "F1", message: "fails", check: always_fails };
const PANICKING_RULE: RuleDefinition = rule! { code: "P1", message: "panics", check: always_panics };
const PHANTOM_ROW_RULE: RuleDefinition = rule! { code: "R1", message: "phantom row", check: phantom_row };
const PHANTOM_TABLE_RULE: RuleDefinition =
    rule! { code: "T1", message: "phantom table", check: phantom_table };
const HEADER_RULE_REWORDED: RuleDefinition = rule! {
    code: "H1",
    message: "Header rows 2 and 3, reworded",
    fields: ["SEX"],
    tables: ["Header"],
    check: flag_header_rows,
};
const DERIVES_RULE: RuleDefinition = rule! { code: "D1", message: "derives", check: derives_column };
const OBSERVES_RULE: RuleDefinition =
    rule! { code: "D2", message: "observes", check: sees_no_derived_column };

#[test]
fn merges_rows_and_attributes_codes() {
    let result = RuleExecutor::new().run(&store(), &[HEADER_RULE, BOTH_RULE]);

    assert!(!result.is_clean());
    assert!(!result.has_errors());
    assert_eq!(result.flagged_rows("Header"), BTreeSet::from([0, 2, 3]));
    assert_eq!(result.flagged_rows("Episodes"), BTreeSet::from([1]));
    assert_eq!(result.codes_for("Header", 2), BTreeSet::from(["H1", "X1"]));
    assert_eq!(result.codes_for("Header", 0), BTreeSet::from(["X1"]));
    assert_eq!(result.rules_run, vec!["H1", "X1"]);

    assert_eq!(result.hits.len(), 5);
    let first = &result.hits[0];
    assert_eq!(first.table, "Episodes");
    assert_eq!(first.row_id, 1);
    assert_eq!(first.code, "X1");
    assert_eq!(first.message, "Both tables");
    assert_eq!(first.affected_fields, vec!["DECOM", "DOB"]);
}

#[test]
fn failing_and_panicking_rules_are_isolated() {
    let rules = [FAILING_RULE, HEADER_RULE, PANICKING_RULE, BOTH_RULE];
    let result = RuleExecutor::new().run(&store(), &rules);
    let clean = RuleExecutor::new().run(&store(), &[HEADER_RULE, BOTH_RULE]);

    assert_eq!(result.flagged, clean.flagged);
    assert_eq!(result.hits, clean.hits);

    let codes: Vec<&str> = result.errors.iter().map(|e| e.code.as_str()).collect();
    assert_eq!(codes, vec!["F1", "P1"]);
    assert_eq!(
        result.errors[0].reason,
        FailureReason::CheckFailed {
            detail: "Column 'ETHNIC' not found in table 'Header'".to_string()
        }
    );
    assert_eq!(
        result.errors[1].reason,
        FailureReason::Panicked {
            detail: "index out of bounds in rule body".to_string()
        }
    );
    assert_eq!(
        result.warnings()[1],
        "rule P1 could not be evaluated: check panicked: index out of bounds in rule body"
    );
}

#[test]
fn phantom_output_is_rejected() {
    let result = RuleExecutor::new().run(&store(), &[PHANTOM_ROW_RULE, PHANTOM_TABLE_RULE]);

    assert!(result.flagged.is_empty());
    assert!(result.hits.is_empty());
    assert_eq!(
        result.errors[0].reason,
        FailureReason::RowOutOfRange {
            table: "Header".to_string(),
            row_id: 99,
            height: 4
        }
    );
    assert_eq!(
        result.errors[1].reason,
        FailureReason::UnknownTable {
            table: "OC3".to_string()
        }
    );
}

#[test]
fn derived_columns_stay_local_to_their_check() {
    let store = store();
    let result = RuleExecutor::new().run(&store, &[DERIVES_RULE, OBSERVES_RULE]);
    assert!(result.is_clean(), "{:?}", result.errors);
    assert!(store.table("Episodes").unwrap().column("DECOM_PARSED").is_err());
}

#[test]
fn repeated_runs_are_identical() {
    let store = store();
    let executor = RuleExecutor::new();
    let rules = [HEADER_RULE, BOTH_RULE, FAILING_RULE];
    assert_eq!(executor.run(&store, &rules), executor.run(&store, &rules));
    assert_eq!(
        HEADER_RULE.run(&store).unwrap(),
        HEADER_RULE.run(&store).unwrap()
    );
}

#[test]
fn duplicate_definitions_run_once() {
    let result = RuleExecutor::new().run(&store(), &[HEADER_RULE, HEADER_RULE]);
    assert_eq!(result.rules_run, vec!["H1"]);
    assert_eq!(result.hits.len(), 2);
}

#[test]
fn conflicting_definitions_are_recorded_not_dropped() {
    let rules = [HEADER_RULE, BOTH_RULE, HEADER_RULE_REWORDED];
    let result = RuleExecutor::new().run(&store(), &rules);
    let reversed = RuleExecutor::new().run(&store(), rules.iter().rev());

    assert_eq!(result, reversed);
    assert_eq!(result.rules_run, vec!["H1", "X1"]);
    assert!(result.hits.iter().all(|hit| hit.code == "X1"));
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].code, "H1");
    let FailureReason::ConflictingDefinitions { sources } = &result.errors[0].reason else {
        panic!("expected conflicting definitions, got {:?}", result.errors[0].reason);
    };
    assert_eq!(sources.len(), 2);
    assert!(sources.iter().all(|source| source.ends_with("executor::flag_header_rows")));
}

#[test]
fn run_one_matches_run() {
    let store = store();
    let executor = RuleExecutor::new();
    assert_eq!(
        executor.run_one(&store, &BOTH_RULE),
        executor.run(&store, [&BOTH_RULE])
    );
}

const ALL_RULES: [RuleDefinition; 8] = [
    HEADER_RULE,
    BOTH_RULE,
    FAILING_RULE,
    PANICKING_RULE,
    PHANTOM_ROW_RULE,
    PHANTOM_TABLE_RULE,
    DERIVES_RULE,
    OBSERVES_RULE,
];

proptest! {
    #[test]
    fn result_does_not_depend_on_rule_order(
        order in Just((0..ALL_RULES.len()).collect::<Vec<_>>()).prop_shuffle()
    ) {
        let store = store();
        let shuffled: Vec<RuleDefinition> = order.iter().map(|&i| ALL_RULES[i]).collect();
        let baseline = RuleExecutor::new().run(&store, &ALL_RULES);
        let result = RuleExecutor::new().run(&store, &shuffled);
        prop_assert_eq!(result, baseline);
    }

    #[test]
    fn flagged_rows_exist_in_their_tables(
        subset in proptest::sample::subsequence(ALL_RULES.to_vec(), 0..=ALL_RULES.len())
    ) {
        let store = store();
        let result = RuleExecutor::new().run(&store, &subset);
        for (table, rows) in &result.flagged {
            let height = store.height(table);
            prop_assert!(height.is_some());
            for row in rows.keys() {
                prop_assert!(store.row_ids(table).contains(row));
            }
        }
    }
}
