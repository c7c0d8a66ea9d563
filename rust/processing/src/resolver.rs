// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Identifier-set resolver
//!
//! Splits the identifiers of one or more types across two snapshots into
//! added, deleted and shared sets.

use ifc_diff_core::Snapshot;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Identifier partition of two snapshots
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Partition {
    /// Only in the newer snapshot
    pub added: FxHashSet<String>,
    /// Only in the older snapshot
    pub deleted: FxHashSet<String>,
    /// In both, ascending
    pub shared: Vec<String>,
}

impl Partition {
    /// Added identifiers, ascending
    pub fn added_sorted(&self) -> Vec<String> {
        sorted(&self.added)
    }

    /// Deleted identifiers, ascending
    pub fn deleted_sorted(&self) -> Vec<String> {
        sorted(&self.deleted)
    }

    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.deleted.is_empty() && self.shared.is_empty()
    }

    /// Keep only the identifiers each predicate accepts
    pub fn retain(
        &mut self,
        mut keep_added: impl FnMut(&str) -> bool,
        mut keep_deleted: impl FnMut(&str) -> bool,
        mut keep_shared: impl FnMut(&str) -> bool,
    ) {
        self.added.retain(|id| keep_added(id));
        self.deleted.retain(|id| keep_deleted(id));
        self.shared.retain(|id| keep_shared(id));
    }
}

fn sorted(ids: &FxHashSet<String>) -> Vec<String> {
    let mut ids: Vec<String> = ids.iter().cloned().collect();
    ids.sort();
    ids
}

fn ids_of_type(snapshot: &dyn Snapshot, type_name: &str) -> Result<FxHashSet<String>> {
    Ok(snapshot
        .by_type(type_name)?
        .into_iter()
        .map(|e| e.id.clone())
        .collect())
}

/// Partition the identifiers of `type_name` (and its subtypes).
///
/// Unknown type names propagate the snapshot error.
pub fn partition(a: &dyn Snapshot, b: &dyn Snapshot, type_name: &str) -> Result<Partition> {
    let ids_a = ids_of_type(a, type_name)?;
    let ids_b = ids_of_type(b, type_name)?;

    let added = ids_b.difference(&ids_a).cloned().collect();
    let deleted = ids_a.difference(&ids_b).cloned().collect();
    let mut shared: Vec<String> = ids_a.intersection(&ids_b).cloned().collect();
    shared.sort();

    Ok(Partition {
        added,
        deleted,
        shared,
    })
}

/// Union of the per-type partitions, shared identifiers deduplicated.
pub fn partition_types<S: AsRef<str>>(
    a: &dyn Snapshot,
    b: &dyn Snapshot,
    type_names: &[S],
) -> Result<Partition> {
    let mut result = Partition::default();
    let mut shared = FxHashSet::default();
    for type_name in type_names {
        let part = partition(a, b, type_name.as_ref())?;
        result.added.extend(part.added);
        result.deleted.extend(part.deleted);
        shared.extend(part.shared);
    }
    result.shared = sorted(&shared);
    Ok(result)
}

/// True if `id` resolves in `snapshot`; lookup failures count as absent.
pub fn exists(id: &str, snapshot: &dyn Snapshot) -> bool {
    match snapshot.by_id(id) {
        Ok(found) => found.is_some(),
        Err(e) => {
            tracing::debug!(id, error = %e, "identifier lookup failed");
            false
        }
    }
}
