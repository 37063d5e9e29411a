/*============================================================
  Synavera Project: Partinfo
  Module: partinfo_core::report
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    Assemble decoded partitions into a JSON report with
    aggregate totals, and persist it.

  Security / Safety Notes:
    Reports are written to operator-controlled paths; no
    credentials are included.

  Dependencies:
    serde for JSON serialization, chrono for timestamps.

  Operational Scope:
    Consumed by operators and downstream tooling.

  Revision History:
    2026-10-19 COD  Authored partition report builder.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Deterministic ordering for reproducible reports
    - Saturating totals; absent sizes counted, not guessed
============================================================*/

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::fs::File;
use std::path::Path;

use chrono::{SecondsFormat, Utc};
use serde::Serialize;

use crate::error::{PartinfoError, Result};
use crate::partition_info::{PartitionInfo, UNAVAILABLE};

/// Full report document.
#[derive(Debug, Serialize)]
pub struct ReportDocument {
    pub metadata: ReportMetadata,
    pub partitions: BTreeMap<String, PartitionInfo>,
}

/// Aggregates over every partition in the report.
#[derive(Debug, Serialize)]
pub struct ReportMetadata {
    pub generated_at: String,
    pub generated_by: String,
    pub database: Option<String>,
    pub total_partitions: usize,
    pub total_doc_count: u64,
    pub total_doc_del_count: u64,
    pub total_active_bytes: u64,
    pub partitions_without_sizes: usize,
}

/// Build a report. Partitions without a key are filed under `unavailable`;
/// a repeated key keeps its first entry and is counted once.
pub fn build_report(database: Option<&str>, infos: Vec<PartitionInfo>) -> ReportDocument {
    let mut partitions = BTreeMap::new();
    let mut total_doc_count = 0u64;
    let mut total_doc_del_count = 0u64;
    let mut total_active_bytes = 0u64;
    let mut partitions_without_sizes = 0usize;

    for info in infos {
        let key = info.partition().unwrap_or(UNAVAILABLE).to_string();
        let Entry::Vacant(slot) = partitions.entry(key) else {
            continue;
        };
        total_doc_count = total_doc_count.saturating_add(info.doc_count());
        total_doc_del_count = total_doc_del_count.saturating_add(info.doc_del_count());
        match info.active_size() {
            Some(active) => total_active_bytes = total_active_bytes.saturating_add(active),
            None => partitions_without_sizes += 1,
        }
        slot.insert(info);
    }

    ReportDocument {
        metadata: ReportMetadata {
            generated_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            generated_by: "partinfo_core".to_string(),
            database: database.map(str::to_string),
            total_partitions: partitions.len(),
            total_doc_count,
            total_doc_del_count,
            total_active_bytes,
            partitions_without_sizes,
        },
        partitions,
    }
}

/// Render the report as pretty JSON.
pub fn render_report(document: &ReportDocument) -> Result<String> {
    serde_json::to_string_pretty(document)
        .map_err(|err| PartinfoError::Runtime(format!("Failed to render report: {err}")))
}

/// Persist the report to the given path.
pub fn write_report(document: &ReportDocument, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|err| {
            PartinfoError::Filesystem(format!(
                "Failed to create report directory {}: {err}",
                parent.display()
            ))
        })?;
    }
    let file = File::create(path).map_err(|err| {
        PartinfoError::Filesystem(format!(
            "Failed to create report file {}: {err}",
            path.display()
        ))
    })?;
    serde_json::to_writer_pretty(file, document).map_err(|err| {
        PartinfoError::Filesystem(format!("Failed to write report {}: {err}", path.display()))
    })?;
    Ok(())
}
