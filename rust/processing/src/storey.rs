// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Storey filter: scopes partitions to one building level.

use ifc_diff_core::{Entity, IfcClass, Snapshot};
use rustc_hash::FxHashSet;

use crate::error::Result;
use crate::resolver::{partition_types, Partition};

/// Storey containing `entity`, found by climbing the containment chain.
///
/// A spatial element without a container climbs through its aggregation
/// parent (space → storey, storey → building).
pub fn containing_storey<'a>(entity: &'a Entity, snapshot: &'a dyn Snapshot) -> Option<&'a Entity> {
    let mut visited = FxHashSet::default();
    let mut next = entity.spatial_container.as_deref();
    while let Some(id) = next {
        if !visited.insert(id) {
            tracing::warn!(id, "containment cycle");
            return None;
        }
        let container = snapshot.by_id(id).ok().flatten()?;
        if container.is_a(IfcClass::IfcBuildingStorey) {
            return Some(container);
        }
        next = container
            .spatial_container
            .as_deref()
            .or(container.decomposition_parent.as_deref());
    }
    None
}

/// Whether `id` sits on the storey named `level`.
///
/// Names are compared trimmed and case-folded. `None` when the entity does
/// not resolve or no storey is found above it.
pub fn on_level(id: &str, snapshot: &dyn Snapshot, level: &str) -> Option<bool> {
    let entity = snapshot.by_id(id).ok().flatten()?;
    let storey = containing_storey(entity, snapshot)?;
    let storey_name = storey.name.as_deref().unwrap_or("").trim().to_lowercase();
    Some(storey_name == level.trim().to_lowercase())
}

/// Partition `type_names`, keeping only identifiers on `level`.
///
/// Added and shared identifiers are located in `b`, deleted ones in `a`.
pub fn scoped_partition<S: AsRef<str>>(
    a: &dyn Snapshot,
    b: &dyn Snapshot,
    type_names: &[S],
    level: &str,
) -> Result<Partition> {
    let mut partition = partition_types(a, b, type_names)?;
    let on = |snapshot: &dyn Snapshot, id: &str| on_level(id, snapshot, level) == Some(true);
    partition.retain(|id| on(b, id), |id| on(a, id), |id| on(b, id));
    Ok(partition)
}
