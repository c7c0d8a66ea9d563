// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Change classifier
//!
//! Runs the enabled checks for one entity in fixed order (semantic,
//! geometric, shape) and derives its status and reportable changes. Meshes
//! are generated at most once per entity and shared by the descriptor,
//! shape and movement checks.

use ifc_diff_core::{IfcClass, Snapshot};
use ifc_diff_geometry::{
    detect_movement, extract, generate_mesh, GeometryKernel, KernelSettings, Mesh,
    ShapeComparator,
};

use crate::change::{ChangeItem, ChangeRecord, ChangeStatus, ModificationType};
use crate::error::Result;
use crate::policy::CheckPolicy;
use crate::resolver::exists;
use crate::semantic::SemanticGraph;

/// Outcome of the checks for one shared entity
#[derive(Debug, Default)]
struct Evaluation {
    checks: Vec<bool>,
    changes: Vec<ChangeItem>,
    moved: Option<bool>,
}

/// Classifies entities of two snapshots under one policy
pub struct Classifier<'a> {
    before: &'a dyn Snapshot,
    after: &'a dyn Snapshot,
    kernel: &'a dyn GeometryKernel,
    settings: KernelSettings,
    policy: CheckPolicy,
    comparator: ShapeComparator,
}

impl<'a> Classifier<'a> {
    /// Fails if the policy is invalid.
    pub fn new(
        before: &'a dyn Snapshot,
        after: &'a dyn Snapshot,
        kernel: &'a dyn GeometryKernel,
        settings: KernelSettings,
        policy: CheckPolicy,
    ) -> Result<Self> {
        let comparator = policy.shape_comparator()?;
        Ok(Self {
            before,
            after,
            kernel,
            settings,
            policy,
            comparator,
        })
    }

    pub fn policy(&self) -> &CheckPolicy {
        &self.policy
    }

    pub fn before(&self) -> &'a dyn Snapshot {
        self.before
    }

    pub fn after(&self) -> &'a dyn Snapshot {
        self.after
    }

    /// Meshes of `id` in both snapshots; `None` where the entity or its geometry is missing
    pub fn meshes(&self, id: &str) -> (Option<Mesh>, Option<Mesh>) {
        (self.mesh_before(id), self.mesh_after(id))
    }

    pub fn mesh_before(&self, id: &str) -> Option<Mesh> {
        self.mesh_in(self.before, id)
    }

    pub fn mesh_after(&self, id: &str) -> Option<Mesh> {
        self.mesh_in(self.after, id)
    }

    fn mesh_in(&self, snapshot: &dyn Snapshot, id: &str) -> Option<Mesh> {
        let entity = snapshot.by_id(id).ok().flatten()?;
        generate_mesh(self.kernel, entity, &self.settings)
    }

    /// One flag per enabled check, in semantic, geometric, shape order.
    ///
    /// Empty when every check is disabled.
    pub fn modification_vector(&self, id: &str) -> Vec<bool> {
        self.evaluate(id, &self.policy, false).checks
    }

    /// Existence-based status, refined by the modification vector for shared ids.
    ///
    /// `None` when the id exists in neither snapshot.
    pub fn status(&self, id: &str) -> Option<ChangeStatus> {
        match (exists(id, self.before), exists(id, self.after)) {
            (false, false) => None,
            (true, false) => Some(ChangeStatus::Deleted),
            (false, true) => Some(ChangeStatus::Added),
            (true, true) => Some(ChangeStatus::from_checks(&self.modification_vector(id))),
        }
    }

    /// Reportable changes of a shared entity.
    ///
    /// Always empty for building element proxies, whatever the modification
    /// vector says.
    pub fn analyze_changes(&self, id: &str) -> Vec<ChangeItem> {
        self.evaluate(id, &self.policy, true).changes
    }

    /// All three checks for one entity, regardless of which the policy enables
    pub fn modification_type(&self, id: &str) -> ModificationType {
        let checks = self.evaluate(id, &self.policy.all_checks(), false).checks;
        ModificationType {
            semantic: checks.first().copied().unwrap_or(false),
            geometric: checks.get(1).copied().unwrap_or(false),
            shape: checks.get(2).copied().unwrap_or(false),
        }
    }

    /// Full record for one id, `None` if it exists in neither snapshot
    pub fn classify(&self, id: &str) -> Option<ChangeRecord> {
        let record = match (exists(id, self.before), exists(id, self.after)) {
            (false, false) => return None,
            (true, false) => ChangeRecord::presence(id, ChangeStatus::Deleted),
            (false, true) => ChangeRecord::presence(id, ChangeStatus::Added),
            (true, true) => self.classify_shared(id),
        };
        Some(record)
    }

    /// Record for an id known to exist in both snapshots
    pub fn classify_shared(&self, id: &str) -> ChangeRecord {
        let evaluation = self.evaluate(id, &self.policy, true);
        let status = ChangeStatus::from_checks(&evaluation.checks);
        tracing::debug!(
            id,
            status = %status,
            changes = evaluation.changes.len(),
            moved = ?evaluation.moved,
            "classified"
        );
        ChangeRecord {
            id: id.to_string(),
            status,
            checks: evaluation.checks,
            changes: evaluation.changes,
            moved: evaluation.moved,
        }
    }

    fn is_proxy(&self, id: &str) -> bool {
        matches!(
            self.before.by_id(id),
            Ok(Some(entity)) if entity.is_a(IfcClass::IfcBuildingElementProxy)
        )
    }

    fn evaluate(&self, id: &str, policy: &CheckPolicy, with_payload: bool) -> Evaluation {
        let mut evaluation = Evaluation::default();
        let report = with_payload && !self.is_proxy(id);

        if policy.semantic {
            let before = SemanticGraph::build(id, self.before);
            let after = SemanticGraph::build(id, self.after);
            let changed = before != after;
            evaluation.checks.push(changed);

            if changed && report {
                let diff = before.diff(&after);
                evaluation.changes.extend(
                    diff.added
                        .into_iter()
                        .map(|(node, attributes)| ChangeItem::AddedNode { node, attributes }),
                );
                evaluation.changes.extend(
                    diff.deleted
                        .into_iter()
                        .map(|(node, attributes)| ChangeItem::DeletedNode { node, attributes }),
                );
                evaluation.changes.extend(
                    diff.changed
                        .into_iter()
                        .map(|(node, changes)| ChangeItem::NodeChanged { node, changes }),
                );
            }
        }

        if !(policy.geometric || policy.shape) {
            return evaluation;
        }
        let (mesh_a, mesh_b) = self.meshes(id);
        let (mesh_a, mesh_b) = (mesh_a.as_ref(), mesh_b.as_ref());

        if policy.geometric {
            let (before, after) = (extract(mesh_a), extract(mesh_b));
            // Presence alone decides when either side has no geometry
            evaluation.checks.push(before != after);

            if let (true, Some(before), Some(after)) = (report, before, after) {
                let changes = before.diff(&after);
                if !changes.is_empty() {
                    evaluation.changes.push(ChangeItem::GeometryChanged { changes });
                }
            }
        }

        if policy.shape {
            let (distance, different) = self.comparator.assess(mesh_a, mesh_b);
            evaluation.checks.push(different);

            if let (true, true, Some(distance)) = (report, different, distance) {
                evaluation.changes.push(ChangeItem::ShapeChanged {
                    distance,
                    tolerance: self.comparator.tolerance(),
                });
            }
        }

        if mesh_a.is_some() && mesh_b.is_some() {
            evaluation.moved = Some(detect_movement(
                mesh_a,
                mesh_b,
                policy.movement_tolerance,
            ));
        }
        evaluation
    }
}

impl std::fmt::Debug for Classifier<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Classifier")
            .field("settings", &self.settings)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ifc_diff_core::{Entity, ModelSnapshot, PropertySet, Representation, TessellatedItem};
    use ifc_diff_geometry::{Point3, TessellationKernel};

    fn body(min: [f64; 3], max: [f64; 3]) -> Representation {
        let mesh = Mesh::cuboid(Point3::from(min), Point3::from(max));
        Representation {
            placement: None,
            items: vec![TessellatedItem {
                positions: mesh.positions,
                indices: mesh.indices,
            }],
        }
    }

    fn snapshot(entities: Vec<Entity>) -> ModelSnapshot {
        let mut snapshot = ModelSnapshot::new();
        for entity in entities {
            snapshot.insert(entity).unwrap();
        }
        snapshot
    }

    fn classifier<'a>(
        a: &'a ModelSnapshot,
        b: &'a ModelSnapshot,
        policy: CheckPolicy,
    ) -> Classifier<'a> {
        static KERNEL: TessellationKernel = TessellationKernel;
        Classifier::new(a, b, &KERNEL, KernelSettings::default(), policy).unwrap()
    }

    #[test]
    fn test_existence_status() {
        let a = snapshot(vec![Entity::new("old", "IfcWall"), Entity::new("both", "IfcWall")]);
        let b = snapshot(vec![Entity::new("new", "IfcWall"), Entity::new("both", "IfcWall")]);
        let c = classifier(&a, &b, CheckPolicy::default());
        assert_eq!(c.status("old"), Some(ChangeStatus::Deleted));
        assert_eq!(c.status("new"), Some(ChangeStatus::Added));
        assert_eq!(c.status("both"), Some(ChangeStatus::Unmodified));
        assert_eq!(c.status("nowhere"), None);
        assert!(c.classify("nowhere").is_none());
    }

    #[test]
    fn test_vector_follows_enabled_checks() {
        let a = snapshot(vec![Entity::new("w", "IfcWall").with_name("A")]);
        let b = snapshot(vec![Entity::new("w", "IfcWall").with_name("B")]);

        let all = classifier(&a, &b, CheckPolicy::default());
        assert_eq!(all.modification_vector("w"), vec![true, false, false]);

        let geometry_only = classifier(&a, &b, CheckPolicy::default().with_semantic(false));
        assert_eq!(geometry_only.modification_vector("w"), vec![false, false]);
        assert_eq!(geometry_only.status("w"), Some(ChangeStatus::Unmodified));
    }

    #[test]
    fn test_missing_geometry_counts_as_geometric_change() {
        let a = snapshot(vec![
            Entity::new("w", "IfcWall").with_representation(body([0.0; 3], [1.0; 3]))
        ]);
        let b = snapshot(vec![Entity::new("w", "IfcWall")]);
        let c = classifier(&a, &b, CheckPolicy::default().with_semantic(false));
        // Geometric check sees the presence change, shape cannot measure
        assert_eq!(c.modification_vector("w"), vec![true, false]);

        let record = c.classify_shared("w");
        assert_eq!(record.status, ChangeStatus::Modified);
        assert!(record.changes.is_empty());
        assert!(record.moved.is_none());
    }

    #[test]
    fn test_moved_entity_record() {
        let a = snapshot(vec![
            Entity::new("w", "IfcWall").with_representation(body([0.0; 3], [1.0; 3]))
        ]);
        let b = snapshot(vec![Entity::new("w", "IfcWall")
            .with_representation(body([3.0, 0.0, 0.0], [4.0, 1.0, 1.0]))]);
        let c = classifier(&a, &b, CheckPolicy::default());
        let record = c.classify_shared("w");
        assert_eq!(record.checks, vec![false, true, true]);
        assert_eq!(record.moved, Some(true));
        assert!(matches!(record.changes[0], ChangeItem::GeometryChanged { .. }));
        assert!(matches!(record.changes[1], ChangeItem::ShapeChanged { .. }));
    }

    #[test]
    fn test_proxy_payload_is_empty() {
        let a = snapshot(vec![Entity::new("p", "IfcBuildingElementProxy")
            .with_property_set(PropertySet::new("ps", "Pset").with_property("Mark", "A"))]);
        let b = snapshot(vec![Entity::new("p", "IfcBuildingElementProxy")
            .with_property_set(PropertySet::new("ps", "Pset").with_property("Mark", "B"))]);
        let c = classifier(&a, &b, CheckPolicy::default());
        assert_eq!(c.status("p"), Some(ChangeStatus::Modified));
        assert!(c.analyze_changes("p").is_empty());
    }

    #[test]
    fn test_modification_type_ignores_flags() {
        let a = snapshot(vec![Entity::new("w", "IfcWall").with_name("A")]);
        let b = snapshot(vec![Entity::new("w", "IfcWall").with_name("B")]);
        let policy = CheckPolicy::default()
            .with_semantic(false)
            .with_geometric(false)
            .with_shape(false);
        let c = classifier(&a, &b, policy);
        assert!(c.modification_vector("w").is_empty());
        assert_eq!(
            c.modification_type("w"),
            ModificationType {
                semantic: true,
                geometric: false,
                shape: false,
            }
        );
    }
}
