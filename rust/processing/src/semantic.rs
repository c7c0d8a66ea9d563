// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Semantic graph of one entity
//!
//! The root node holds the entity's name, type and container; one child node
//! per property set, quantity set and aggregation neighbour. Nodes are keyed
//! by their own identifiers, so two graphs compare node by node.

use std::collections::{BTreeMap, BTreeSet};

use ifc_diff_core::{
    diff_attributes, round_decimals, AttributeMap, Entity, FieldChange, PropertyDefinition,
    PropertySet, QuantitySet, Snapshot, Value,
};
use serde::{Deserialize, Serialize};

/// Decimal places kept for quantity values
pub const QUANTITY_DECIMALS: i32 = 4;

const UNNAMED: &str = "un-named";
const NO_CONTAINER: &str = "No Parent";

/// Attributed graph of an entity and its directly related records
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SemanticGraph {
    pub nodes: BTreeMap<String, AttributeMap>,
    /// Root → child edges
    pub edges: BTreeSet<(String, String)>,
}

/// Node-level difference between two graphs
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GraphDiff {
    /// Nodes only in the newer graph, ascending by key
    pub added: Vec<(String, AttributeMap)>,
    /// Nodes only in the older graph, ascending by key
    pub deleted: Vec<(String, AttributeMap)>,
    /// Shared nodes whose attributes differ, ascending by key
    pub changed: Vec<(String, Vec<FieldChange>)>,
}

impl GraphDiff {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.deleted.is_empty() && self.changed.is_empty()
    }
}

impl SemanticGraph {
    /// Build the graph of `id` in `snapshot`.
    ///
    /// An entity that cannot be resolved yields an empty graph.
    pub fn build(id: &str, snapshot: &dyn Snapshot) -> Self {
        match snapshot.by_id(id) {
            Ok(Some(entity)) => Self::from_entity(entity, snapshot),
            Ok(None) => Self::default(),
            Err(e) => {
                tracing::debug!(id, error = %e, "semantic graph lookup failed");
                Self::default()
            }
        }
    }

    /// Build the graph of an already resolved entity
    pub fn from_entity(entity: &Entity, snapshot: &dyn Snapshot) -> Self {
        let mut graph = Self::default();
        let root = entity.id.clone();

        let mut attributes = AttributeMap::new();
        attributes.insert("Name".into(), display_name(entity).into());
        attributes.insert("IfcType".into(), entity.declared_type.as_str().into());
        attributes.insert("Space_container".into(), container_value(entity, snapshot));
        graph.nodes.insert(root.clone(), attributes);

        for definition in &entity.property_definitions {
            let attributes = match definition {
                PropertyDefinition::PropertySet(pset) => property_set_node(pset),
                PropertyDefinition::QuantitySet(qset) => quantity_set_node(qset),
            };
            graph.add_child(&root, definition.id(), attributes);
        }

        for child in &entity.decomposition_children {
            graph.add_child(&root, child, relation_node(child, "Child", snapshot));
        }
        if let Some(parent) = &entity.decomposition_parent {
            graph.add_child(&root, parent, relation_node(parent, "Parent", snapshot));
        }

        graph
    }

    fn add_child(&mut self, root: &str, key: &str, attributes: AttributeMap) {
        self.nodes.insert(key.to_string(), attributes);
        self.edges.insert((root.to_string(), key.to_string()));
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Node-by-node comparison against a newer graph
    pub fn diff(&self, after: &SemanticGraph) -> GraphDiff {
        let mut diff = GraphDiff::default();
        for (key, attributes) in &after.nodes {
            if !self.nodes.contains_key(key) {
                diff.added.push((key.clone(), attributes.clone()));
            }
        }
        for (key, before) in &self.nodes {
            match after.nodes.get(key) {
                None => diff.deleted.push((key.clone(), before.clone())),
                Some(now) if now != before => {
                    diff.changed.push((key.clone(), diff_attributes(before, now)));
                }
                Some(_) => {}
            }
        }
        diff
    }
}

/// Entity name, or the placeholder for unnamed entities
pub fn display_name(entity: &Entity) -> &str {
    entity.name.as_deref().unwrap_or(UNNAMED)
}

/// Name of the entity's direct spatial container, if it resolves
pub fn container_name(entity: &Entity, snapshot: &dyn Snapshot) -> Option<String> {
    let container_id = entity.spatial_container.as_deref()?;
    let container = snapshot.by_id(container_id).ok().flatten()?;
    container.name.clone()
}

/// Container name for the root node: null for an unnamed container,
/// the placeholder when there is no container at all
fn container_value(entity: &Entity, snapshot: &dyn Snapshot) -> Value {
    let container = entity
        .spatial_container
        .as_deref()
        .and_then(|id| snapshot.by_id(id).ok().flatten());
    match container {
        Some(container) => container.name.clone().into(),
        None => NO_CONTAINER.into(),
    }
}

fn property_set_node(pset: &PropertySet) -> AttributeMap {
    let mut attributes: AttributeMap = pset
        .properties
        .iter()
        .filter_map(|p| match &p.value {
            Some(value) if !value.is_null() => Some((p.name.clone(), value.clone())),
            _ => None,
        })
        .collect();
    attributes.insert("Name".into(), pset.name.clone().into());
    attributes.insert("type".into(), "IfcPropertySet".into());
    attributes
}

fn quantity_set_node(qset: &QuantitySet) -> AttributeMap {
    let mut attributes: AttributeMap = qset
        .quantities
        .iter()
        .map(|q| {
            let value = round_decimals(q.value.magnitude(), QUANTITY_DECIMALS);
            (q.name.clone(), Value::Real(value))
        })
        .collect();
    attributes.insert("Name".into(), qset.name.clone().into());
    attributes.insert("type".into(), "IfcElementQuantity".into());
    attributes
}

fn relation_node(id: &str, relation: &str, snapshot: &dyn Snapshot) -> AttributeMap {
    let mut attributes = AttributeMap::new();
    attributes.insert("Relation".into(), relation.into());
    if let Ok(Some(related)) = snapshot.by_id(id) {
        attributes.insert("Name".into(), display_name(related).into());
        attributes.insert("IfcType".into(), related.declared_type.as_str().into());
    }
    attributes
}

#[cfg(test)]
mod tests {
    use super::*;
    use ifc_diff_core::{ModelSnapshot, QuantityValue};

    fn model(wall: Entity) -> ModelSnapshot {
        ModelSnapshot::new()
            .with_entity(Entity::new("storey-1", "IfcBuildingStorey").with_name("Level 1"))
            .unwrap()
            .with_entity(Entity::new("asm-1", "IfcElementAssembly").with_name("Frame"))
            .unwrap()
            .with_entity(wall)
            .unwrap()
    }

    fn wall() -> Entity {
        Entity::new("w1", "IfcWall")
            .with_name("Basic Wall")
            .with_container("storey-1")
            .with_parent("asm-1")
            .with_property_set(
                PropertySet::new("pset-1", "Pset_WallCommon")
                    .with_property("IsExternal", true)
                    .with_property("FireRating", Value::Null),
            )
            .with_quantity_set(
                QuantitySet::new("qset-1", "Qto_WallBaseQuantities")
                    .with_quantity("Length", QuantityValue::Length(4.000049))
                    .with_quantity("NetVolume", QuantityValue::Volume(2.4)),
            )
    }

    #[test]
    fn test_build_nodes_and_edges() {
        let snapshot = model(wall());
        let graph = SemanticGraph::build("w1", &snapshot);

        assert_eq!(graph.node_count(), 4);
        assert_eq!(graph.edges.len(), 3);
        assert!(graph.edges.contains(&("w1".into(), "pset-1".into())));

        let root = &graph.nodes["w1"];
        assert_eq!(root["Name"], Value::from("Basic Wall"));
        assert_eq!(root["IfcType"], Value::from("IfcWall"));
        assert_eq!(root["Space_container"], Value::from("Level 1"));

        let pset = &graph.nodes["pset-1"];
        assert_eq!(pset["IsExternal"], Value::Bool(true));
        assert!(!pset.contains_key("FireRating"));
        assert_eq!(pset["type"], Value::from("IfcPropertySet"));

        let qset = &graph.nodes["qset-1"];
        assert_eq!(qset["Length"], Value::Real(4.0));

        let parent = &graph.nodes["asm-1"];
        assert_eq!(parent["Relation"], Value::from("Parent"));
        assert_eq!(parent["Name"], Value::from("Frame"));
    }

    #[test]
    fn test_fallback_names() {
        let snapshot = model(Entity::new("w1", "IfcWall"));
        let graph = SemanticGraph::build("w1", &snapshot);
        assert_eq!(graph.nodes["w1"]["Name"], Value::from("un-named"));
        assert_eq!(graph.nodes["w1"]["Space_container"], Value::from("No Parent"));
    }

    #[test]
    fn test_unnamed_container_differs_from_no_container() {
        let snapshot = model(Entity::new("w1", "IfcWall").with_container("space-1"))
            .with_entity(Entity::new("space-1", "IfcSpace"))
            .unwrap();
        let contained = SemanticGraph::build("w1", &snapshot);
        assert_eq!(contained.nodes["w1"]["Space_container"], Value::Null);

        let loose = SemanticGraph::build("w1", &model(Entity::new("w1", "IfcWall")));
        assert_ne!(contained, loose);
        let diff = loose.diff(&contained);
        assert_eq!(diff.changed.len(), 1);
        assert_eq!(diff.changed[0].1[0].field(), "Space_container");
    }

    #[test]
    fn test_missing_entity_is_empty() {
        let snapshot = model(wall());
        assert!(SemanticGraph::build("w9", &snapshot).is_empty());
        assert!(SemanticGraph::build("not valid", &snapshot).is_empty());
        assert_ne!(SemanticGraph::build("w9", &snapshot), SemanticGraph::build("w1", &snapshot));
    }

    #[test]
    fn test_single_attribute_diff() {
        let before = model(wall());
        let mut changed = wall();
        if let PropertyDefinition::PropertySet(pset) = &mut changed.property_definitions[0] {
            pset.properties[0].value = Some(Value::Bool(false));
        }
        let after = model(changed);

        let g1 = SemanticGraph::build("w1", &before);
        let g2 = SemanticGraph::build("w1", &after);
        assert_ne!(g1, g2);

        let diff = g1.diff(&g2);
        assert!(diff.added.is_empty());
        assert!(diff.deleted.is_empty());
        assert_eq!(diff.changed.len(), 1);
        let (node, changes) = &diff.changed[0];
        assert_eq!(node, "pset-1");
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].field(), "IsExternal");
    }

    #[test]
    fn test_added_and_deleted_nodes() {
        let before = model(wall());
        let mut changed = wall();
        changed.property_definitions.remove(1);
        let changed = changed.with_property_set(PropertySet::new("pset-2", "Pset_Custom"));
        let after = model(changed);

        let diff = SemanticGraph::build("w1", &before).diff(&SemanticGraph::build("w1", &after));
        assert_eq!(diff.added.len(), 1);
        assert_eq!(diff.added[0].0, "pset-2");
        assert_eq!(diff.deleted.len(), 1);
        assert_eq!(diff.deleted[0].0, "qset-1");
        assert!(diff.changed.is_empty());
    }

    #[test]
    fn test_property_order_does_not_matter() {
        let a = Entity::new("w1", "IfcWall").with_property_set(
            PropertySet::new("p", "Pset")
                .with_property("A", 1i64)
                .with_property("B", "x"),
        );
        let b = Entity::new("w1", "IfcWall").with_property_set(
            PropertySet::new("p", "Pset")
                .with_property("B", "x")
                .with_property("A", 1i64),
        );
        let g1 = SemanticGraph::build("w1", &model(a));
        let g2 = SemanticGraph::build("w1", &model(b));
        assert_eq!(g1, g2);
        assert!(g1.diff(&g2).is_empty());
    }
}
