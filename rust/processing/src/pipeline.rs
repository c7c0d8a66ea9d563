// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Comparison runs over type lists, storeys and explicit identifier lists.

use std::collections::BTreeMap;

use ifc_diff_core::{Entity, Snapshot};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::change::{ChangeRecord, ChangeStatus};
use crate::classifier::Classifier;
use crate::error::Result;
use crate::resolver::{exists, partition_types, Partition};
use crate::semantic::container_name;
use crate::storey::scoped_partition;

/// Descriptive data of one element, as listed in reports
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementInfo {
    pub id: String,
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub ifc_type: String,
    /// Name of the direct spatial container
    pub container: Option<String>,
}

impl ElementInfo {
    pub fn from_entity(entity: &Entity, snapshot: &dyn Snapshot) -> Self {
        Self {
            id: entity.id.clone(),
            name: entity.name.clone(),
            ifc_type: entity.declared_type.clone(),
            container: container_name(entity, snapshot),
        }
    }

    fn lookup(id: &str, snapshot: &dyn Snapshot) -> Option<Self> {
        let entity = snapshot.by_id(id).ok().flatten()?;
        Some(Self::from_entity(entity, snapshot))
    }
}

/// Result of one comparison run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComparisonReport {
    pub added: Vec<String>,
    pub deleted: Vec<String>,
    pub modified: Vec<String>,
    pub unmodified: Vec<String>,
    /// Requested identifiers found in neither snapshot
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub missing: Vec<String>,
    /// One record per classified identifier: added, deleted, then shared
    pub records: Vec<ChangeRecord>,
    /// Element metadata, from the newer snapshot except for deleted elements
    pub elements: BTreeMap<String, ElementInfo>,
    pub elapsed_ms: u64,
}

impl ComparisonReport {
    pub fn record(&self, id: &str) -> Option<&ChangeRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    pub fn element(&self, id: &str) -> Option<&ElementInfo> {
        self.elements.get(id)
    }

    /// Records with at least one reportable change
    pub fn reportable(&self) -> impl Iterator<Item = &ChangeRecord> {
        self.records.iter().filter(|r| !r.changes.is_empty())
    }

    /// Identifiers with the given status
    pub fn ids(&self, status: ChangeStatus) -> &[String] {
        match status {
            ChangeStatus::Added => &self.added,
            ChangeStatus::Deleted => &self.deleted,
            ChangeStatus::Modified => &self.modified,
            ChangeStatus::Unmodified => &self.unmodified,
        }
    }
}

/// Compare every entity of the given types
pub fn compare_types<S: AsRef<str>>(
    classifier: &Classifier<'_>,
    type_names: &[S],
) -> Result<ComparisonReport> {
    let span = tracing::info_span!("comparison", types = type_names.len(), parallel = false);
    let _guard = span.enter();
    let partition = partition_types(classifier.before(), classifier.after(), type_names)?;
    Ok(run(classifier, partition, false, true))
}

/// Compare every entity of the given types, classifying shared entities on the rayon pool.
///
/// Produces the same report as [`compare_types`].
pub fn compare_types_parallel<S: AsRef<str>>(
    classifier: &Classifier<'_>,
    type_names: &[S],
) -> Result<ComparisonReport> {
    let span = tracing::info_span!("comparison", types = type_names.len(), parallel = true);
    let _guard = span.enter();
    let partition = partition_types(classifier.before(), classifier.after(), type_names)?;
    Ok(run(classifier, partition, true, true))
}

/// Compare the entities of the given types located on one storey
pub fn compare_storey<S: AsRef<str>>(
    classifier: &Classifier<'_>,
    type_names: &[S],
    level: &str,
) -> Result<ComparisonReport> {
    let span = tracing::info_span!("comparison", types = type_names.len(), storey = level);
    let _guard = span.enter();
    let partition = scoped_partition(classifier.before(), classifier.after(), type_names, level)?;
    Ok(run(classifier, partition, false, true))
}

/// Classify an explicit identifier list by existence, then compare shared ones.
///
/// Identifiers found in neither snapshot are listed as missing. Unlike the
/// type runs, shared identifiers are classified even with every check
/// disabled, and then all come out unmodified.
pub fn classify_ids<S: AsRef<str>>(classifier: &Classifier<'_>, ids: &[S]) -> ComparisonReport {
    let span = tracing::info_span!("comparison", ids = ids.len());
    let _guard = span.enter();

    let mut partition = Partition::default();
    let mut missing = Vec::new();
    for id in ids {
        let id = id.as_ref();
        match (exists(id, classifier.before()), exists(id, classifier.after())) {
            (true, true) => {
                if !partition.shared.iter().any(|s| s == id) {
                    partition.shared.push(id.to_string());
                }
            }
            (true, false) => {
                partition.deleted.insert(id.to_string());
            }
            (false, true) => {
                partition.added.insert(id.to_string());
            }
            (false, false) => missing.push(id.to_string()),
        }
    }
    if !missing.is_empty() {
        tracing::warn!(count = missing.len(), "identifiers found in neither snapshot");
    }

    let mut report = run(classifier, partition, false, false);
    report.missing = missing;
    report
}

fn run(
    classifier: &Classifier<'_>,
    partition: Partition,
    parallel: bool,
    skip_when_disabled: bool,
) -> ComparisonReport {
    let start = std::time::Instant::now();
    let (before, after) = (classifier.before(), classifier.after());

    let mut report = ComparisonReport {
        added: partition.added_sorted(),
        deleted: partition.deleted_sorted(),
        ..Default::default()
    };
    tracing::info!(
        added = report.added.len(),
        deleted = report.deleted.len(),
        shared = partition.shared.len(),
        "partitioned"
    );

    for id in &report.added {
        report.records.push(ChangeRecord::presence(id.as_str(), ChangeStatus::Added));
        if let Some(info) = ElementInfo::lookup(id, after) {
            report.elements.insert(id.clone(), info);
        }
    }
    for id in &report.deleted {
        report.records.push(ChangeRecord::presence(id.as_str(), ChangeStatus::Deleted));
        if let Some(info) = ElementInfo::lookup(id, before) {
            report.elements.insert(id.clone(), info);
        }
    }

    if skip_when_disabled && !classifier.policy().any_enabled() {
        tracing::info!("all checks disabled, skipping shared entities");
        report.elapsed_ms = start.elapsed().as_millis() as u64;
        return report;
    }

    let shared: Vec<ChangeRecord> = if parallel {
        partition
            .shared
            .par_iter()
            .map(|id| classifier.classify_shared(id))
            .collect()
    } else {
        partition
            .shared
            .iter()
            .map(|id| classifier.classify_shared(id))
            .collect()
    };

    for record in shared {
        if let Some(info) = ElementInfo::lookup(&record.id, after) {
            report.elements.insert(record.id.clone(), info);
        }
        match record.status {
            ChangeStatus::Modified => report.modified.push(record.id.clone()),
            _ => report.unmodified.push(record.id.clone()),
        }
        report.records.push(record);
    }

    report.elapsed_ms = start.elapsed().as_millis() as u64;
    tracing::info!(
        added = report.added.len(),
        deleted = report.deleted.len(),
        modified = report.modified.len(),
        unmodified = report.unmodified.len(),
        reportable = report.reportable().count(),
        elapsed_ms = report.elapsed_ms,
        "comparison complete"
    );
    report
}
