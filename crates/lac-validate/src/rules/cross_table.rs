//! Rules that join tables on the child identifier.

use std::collections::{BTreeSet, HashMap};

use chrono::NaiveDate;

use lac_common::ColumnReader;
use lac_model::{CheckResult, ErrorLocations, RuleDefinition, TableStore, rule};

use super::common::{require_column, require_columns};

const HEADER: &str = "Header";
const EPISODES: &str = "Episodes";
const CHILD: &str = "CHILD";

pub const RULE_1001: RuleDefinition = rule! {
    code: "1001",
    message: "Episode start date is before the child's date of birth.",
    fields: ["DECOM", "DOB"],
    tables: ["Header", "Episodes"],
    check: validate_1001,
};

/// Flags the offending episode and the child's header row.
///
/// Missing or unparseable dates are left to the date validity rules.
fn validate_1001(store: &TableStore) -> CheckResult<ErrorLocations> {
    let (Some(header), Some(episodes)) = (store.table(HEADER), store.table(EPISODES)) else {
        return Ok(ErrorLocations::new());
    };
    require_columns(header, HEADER, &[CHILD, "DOB"])?;
    require_columns(episodes, EPISODES, &[CHILD, "DECOM"])?;

    let header_reader = ColumnReader::new(header);
    let mut births: HashMap<String, (usize, NaiveDate)> = HashMap::new();
    for (row, child) in require_column(header_reader, HEADER, CHILD)? {
        let Some(child) = child else {
            continue;
        };
        let Some(dob) = header_reader.get_date("DOB", row) else {
            continue;
        };
        births.entry(child).or_insert((row, dob));
    }

    let episode_reader = ColumnReader::new(episodes);
    let mut header_rows = BTreeSet::new();
    let mut episode_rows = BTreeSet::new();
    for (row, child) in require_column(episode_reader, EPISODES, CHILD)? {
        let Some((header_row, dob)) = child.and_then(|child| births.get(&child).copied()) else {
            continue;
        };
        let Some(decom) = episode_reader.get_date("DECOM", row) else {
            continue;
        };
        if decom < dob {
            episode_rows.insert(row);
            header_rows.insert(header_row);
        }
    }

    Ok(ErrorLocations::for_table(EPISODES, episode_rows).with(HEADER, header_rows))
}
