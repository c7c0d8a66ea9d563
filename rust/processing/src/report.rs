// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Report writers: element lists as CSV, detailed changes as JSON and text.
//!
//! Writers only read the [`ComparisonReport`]; a failed write leaves the
//! in-memory report untouched.

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{json, Map, Value as JsonValue};

use crate::change::ChangeStatus;
use crate::error::Result;
use crate::pipeline::ComparisonReport;

pub const ADDED_CSV: &str = "Added_Elements.csv";
pub const DELETED_CSV: &str = "Deleted_Elements.csv";
pub const MODIFIED_CSV: &str = "Modified_Elements.csv";
pub const MODIFIED_JSON: &str = "Modified_Elements.json";
pub const MODIFIED_TXT: &str = "Modified_Elements.txt";

const CSV_HEADER: &str = "GlobalId,Name,Type,Space Container\n";
const NOT_AVAILABLE: &str = "N/A";
const TXT_SEPARATOR: &str =
    "==============================================================================================================";

/// CSV listing of the elements with `status`, one row per element with metadata
pub fn element_csv(report: &ComparisonReport, status: ChangeStatus) -> String {
    let mut content = String::from(CSV_HEADER);
    for info in report.ids(status).iter().filter_map(|id| report.element(id)) {
        let _ = writeln!(
            content,
            "\"{}\",\"{}\",\"{}\",\"{}\"",
            escape_csv(&info.id),
            escape_csv(info.name.as_deref().unwrap_or("")),
            escape_csv(&info.ifc_type),
            escape_csv(info.container.as_deref().unwrap_or("")),
        );
    }
    content
}

/// Double-quote escaping per RFC 4180, newlines flattened
fn escape_csv(s: &str) -> String {
    s.replace('"', "\"\"").replace(['\r', '\n'], " ")
}

/// Heading of one element in the detailed reports
pub fn entry_key(report: &ComparisonReport, id: &str) -> String {
    let info = report.element(id);
    let level = info
        .and_then(|i| i.container.as_deref())
        .unwrap_or(NOT_AVAILABLE);
    let name = info
        .and_then(|i| i.name.as_deref())
        .unwrap_or(NOT_AVAILABLE);
    format!("GUID: {id} | Level: {level} | Name: {name}")
}

/// Detailed JSON document of every record with reportable changes
pub fn changes_json(report: &ComparisonReport) -> Result<JsonValue> {
    let mut entries = Map::new();
    for record in report.reportable() {
        entries.insert(
            entry_key(report, &record.id),
            json!({ "Changes": serde_json::to_value(&record.changes)? }),
        );
    }
    Ok(JsonValue::Object(entries))
}

/// Plain-text rendering of the detailed changes
pub fn changes_text(report: &ComparisonReport) -> String {
    let mut content = String::new();
    for record in report.reportable() {
        let _ = writeln!(content, "{}", entry_key(report, &record.id));
        for item in &record.changes {
            let _ = writeln!(content, "  - {item}");
        }
        let _ = write!(content, "\n\n{TXT_SEPARATOR}\n\n");
    }
    content
}

/// Write all reports into `dir`, returning the files written.
///
/// Element lists are written only when non-empty, the detailed reports only
/// when at least one record has reportable changes.
pub fn write_reports(report: &ComparisonReport, dir: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir)?;
    let mut written = Vec::new();

    for (status, file) in [
        (ChangeStatus::Added, ADDED_CSV),
        (ChangeStatus::Deleted, DELETED_CSV),
        (ChangeStatus::Modified, MODIFIED_CSV),
    ] {
        if report.ids(status).is_empty() {
            continue;
        }
        written.push(write_file(dir.join(file), &element_csv(report, status))?);
    }

    if report.reportable().next().is_some() {
        let json = serde_json::to_string_pretty(&changes_json(report)?)?;
        written.push(write_file(dir.join(MODIFIED_JSON), &json)?);
        written.push(write_file(dir.join(MODIFIED_TXT), &changes_text(report))?);
    } else {
        tracing::info!("no elements with reportable changes");
    }

    Ok(written)
}

fn write_file(path: PathBuf, content: &str) -> Result<PathBuf> {
    fs::write(&path, content)?;
    tracing::info!(path = %path.display(), bytes = content.len(), "generated report");
    Ok(path)
}
