//! Rule executor: runs rule checks against one table store and merges the output.
//!
//! Rules run sequentially. A rule that returns an error, panics, or flags rows
//! that do not exist is recorded as a [`RuleExecutionError`] and contributes
//! nothing; every other rule's output is unaffected. So does a code given with
//! two different definitions.

use std::any::Any;
use std::collections::BTreeMap;
use std::panic::{self, AssertUnwindSafe};

use tracing::{debug, debug_span, info, warn};

use lac_model::{
    ErrorLocations, FailureReason, RuleDefinition, RuleExecutionError, RuleHit, TableStore,
    ValidationResult,
};

/// Executes rule definitions against a [`TableStore`].
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleExecutor;

impl RuleExecutor {
    pub fn new() -> Self {
        Self
    }

    /// Run every rule against the store.
    ///
    /// Rules are evaluated in code order, so the result does not depend on the
    /// order of `rules`. Repeats of the same definition run once; a code with
    /// differing definitions is not run and is recorded as a failure.
    pub fn run<'r>(
        &self,
        store: &TableStore,
        rules: impl IntoIterator<Item = &'r RuleDefinition>,
    ) -> ValidationResult {
        let mut by_code: BTreeMap<&'static str, Vec<&RuleDefinition>> = BTreeMap::new();
        for rule in rules {
            let definitions = by_code.entry(rule.code()).or_default();
            if !definitions.contains(&rule) {
                definitions.push(rule);
            }
        }

        let mut result = ValidationResult::new();
        for (code, definitions) in &by_code {
            result.rules_run.push((*code).to_string());
            let outcome = match definitions.as_slice() {
                [rule] => execute_rule(rule, store).map(|locations| (*rule, locations)),
                _ => Err(conflicting(definitions)),
            };
            match outcome {
                Ok((rule, locations)) => merge(&mut result, rule, &locations),
                Err(reason) => {
                    warn!(code = *code, %reason, "rule could not be evaluated");
                    result.errors.push(RuleExecutionError::new(*code, reason));
                }
            }
        }

        result
            .hits
            .sort_by(|a, b| hit_order(a).cmp(&hit_order(b)));
        result.errors.sort_by(|a, b| a.code.cmp(&b.code));

        info!(
            rules = result.rules_run.len(),
            hits = result.hits.len(),
            tables = result.flagged.len(),
            failed = result.errors.len(),
            "validation run complete"
        );
        result
    }

    /// Run a single rule. Convenience for callers that only need one.
    pub fn run_one(&self, store: &TableStore, rule: &RuleDefinition) -> ValidationResult {
        self.run(store, [rule])
    }
}

fn execute_rule(
    rule: &RuleDefinition,
    store: &TableStore,
) -> Result<ErrorLocations, FailureReason> {
    let span = debug_span!("rule", code = rule.code());
    let _enter = span.enter();

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| rule.run(store)));
    let locations = match outcome {
        Ok(Ok(locations)) => locations,
        Ok(Err(err)) => {
            return Err(FailureReason::CheckFailed {
                detail: err.to_string(),
            });
        }
        Err(payload) => {
            return Err(FailureReason::Panicked {
                detail: panic_detail(payload.as_ref()),
            });
        }
    };

    verify_locations(store, &locations)?;
    debug!(rows = locations.row_count(), "rule finished");
    Ok(locations)
}

/// Reject output naming tables or rows the store does not have.
fn verify_locations(store: &TableStore, locations: &ErrorLocations) -> Result<(), FailureReason> {
    for (table, rows) in locations.iter() {
        let Some(height) = store.height(table) else {
            return Err(FailureReason::UnknownTable {
                table: table.to_string(),
            });
        };
        if let Some(&row_id) = rows.last()
            && row_id >= height
        {
            return Err(FailureReason::RowOutOfRange {
                table: table.to_string(),
                row_id,
                height,
            });
        }
    }
    Ok(())
}

fn merge(result: &mut ValidationResult, rule: &RuleDefinition, locations: &ErrorLocations) {
    let affected_fields: Vec<String> = rule
        .affected_fields()
        .into_iter()
        .map(str::to_string)
        .collect();

    for (table, rows) in locations.iter() {
        let flagged = result.flagged.entry(table.to_string()).or_default();
        for &row_id in rows {
            flagged
                .entry(row_id)
                .or_default()
                .insert(rule.code().to_string());
            result.hits.push(RuleHit {
                code: rule.code().to_string(),
                message: rule.message().to_string(),
                affected_fields: affected_fields.clone(),
                table: table.to_string(),
                row_id,
            });
        }
    }
}

fn conflicting(definitions: &[&RuleDefinition]) -> FailureReason {
    let mut sources: Vec<String> = definitions
        .iter()
        .map(|rule| rule.source().to_string())
        .collect();
    sources.sort();
    FailureReason::ConflictingDefinitions { sources }
}

fn hit_order(hit: &RuleHit) -> (&str, usize, &str) {
    (&hit.table, hit.row_id, &hit.code)
}

fn panic_detail(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
