//! JSON payload handed to the reporting layer.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::Serialize;

use lac_model::{Metadata, RuleHit, ValidationResult};

use crate::error::ValidateError;

const REPORT_SCHEMA: &str = "lac-validate.validation-report";
const REPORT_SCHEMA_VERSION: u32 = 1;
const REPORT_FILE_NAME: &str = "validation_report.json";

#[derive(Debug, Serialize)]
pub struct ReportPayload {
    pub schema: &'static str,
    pub schema_version: u32,
    pub generated_at: String,
    pub revision: String,
    pub collection_start: String,
    pub collection_end: String,
    pub local_authority: Option<String>,
    pub tables: Vec<TableSummary>,
    /// Rules that could not be evaluated.
    pub warnings: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct TableSummary {
    pub table: String,
    pub flagged_rows: Vec<usize>,
    pub hits: Vec<RuleHit>,
}

impl ReportPayload {
    pub fn total_hits(&self) -> usize {
        self.tables.iter().map(|table| table.hits.len()).sum()
    }
}

pub fn build_report(result: &ValidationResult, revision: &str, metadata: &Metadata) -> ReportPayload {
    let tables = result
        .tables()
        .map(|table| TableSummary {
            table: table.to_string(),
            flagged_rows: result.flagged_rows(table).into_iter().collect(),
            hits: result
                .hits
                .iter()
                .filter(|hit| hit.table == table)
                .cloned()
                .collect(),
        })
        .collect();

    ReportPayload {
        schema: REPORT_SCHEMA,
        schema_version: REPORT_SCHEMA_VERSION,
        generated_at: Utc::now().to_rfc3339(),
        revision: revision.to_string(),
        collection_start: metadata.collection_start.to_string(),
        collection_end: metadata.collection_end.to_string(),
        local_authority: metadata.local_authority.clone(),
        tables,
        warnings: result.warnings(),
    }
}

/// Write the payload as pretty JSON to `output_dir/validation_report.json`.
pub fn write_report_json(output_dir: &Path, payload: &ReportPayload) -> Result<PathBuf, ValidateError> {
    fs::create_dir_all(output_dir).map_err(|source| ValidateError::Io {
        path: output_dir.to_path_buf(),
        source,
    })?;
    let output_path = output_dir.join(REPORT_FILE_NAME);
    let json = serde_json::to_string_pretty(payload)?;
    fs::write(&output_path, format!("{json}\n")).map_err(|source| ValidateError::Io {
        path: output_path.clone(),
        source,
    })?;
    Ok(output_path)
}
