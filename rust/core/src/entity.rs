// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Entity records exposed by a snapshot.
//!
//! Relationships (containment, decomposition) are stored as identifiers and
//! resolved through the owning [`Snapshot`](crate::Snapshot).

use serde::{Deserialize, Serialize};

use crate::schema::{type_matches, IfcClass};
use crate::value::Value;

/// One modeled object in one revision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    /// Stable identifier (IFC GlobalId)
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Declared IFC class name, e.g. `IfcWall`
    #[serde(rename = "type")]
    pub declared_type: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub property_definitions: Vec<PropertyDefinition>,
    /// Entities aggregated by this one
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub decomposition_children: Vec<String>,
    /// Entity this one is aggregated into
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decomposition_parent: Option<String>,
    /// Spatial structure element containing this entity
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spatial_container: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub representation: Option<Representation>,
}

impl Entity {
    /// Create an entity with only an identifier and a declared type
    pub fn new(id: impl Into<String>, declared_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
            declared_type: declared_type.into(),
            property_definitions: Vec::new(),
            decomposition_children: Vec::new(),
            decomposition_parent: None,
            spatial_container: None,
            representation: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_container(mut self, container_id: impl Into<String>) -> Self {
        self.spatial_container = Some(container_id.into());
        self
    }

    pub fn with_parent(mut self, parent_id: impl Into<String>) -> Self {
        self.decomposition_parent = Some(parent_id.into());
        self
    }

    pub fn with_child(mut self, child_id: impl Into<String>) -> Self {
        self.decomposition_children.push(child_id.into());
        self
    }

    pub fn with_property_set(mut self, pset: PropertySet) -> Self {
        self.property_definitions.push(PropertyDefinition::PropertySet(pset));
        self
    }

    pub fn with_quantity_set(mut self, qset: QuantitySet) -> Self {
        self.property_definitions.push(PropertyDefinition::QuantitySet(qset));
        self
    }

    pub fn with_representation(mut self, representation: Representation) -> Self {
        self.representation = Some(representation);
        self
    }

    /// Class of the declared type, if it is part of the class table
    pub fn class(&self) -> Option<IfcClass> {
        IfcClass::from_name(&self.declared_type)
    }

    /// True if the declared type is `class` or one of its subtypes
    pub fn is_a(&self, class: IfcClass) -> bool {
        type_matches(&self.declared_type, class)
    }

    /// True if the entity carries at least one tessellated item
    pub fn has_representation(&self) -> bool {
        self.representation
            .as_ref()
            .is_some_and(|rep| !rep.items.is_empty())
    }
}

/// Property or quantity set attached to an entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum PropertyDefinition {
    PropertySet(PropertySet),
    QuantitySet(QuantitySet),
}

impl PropertyDefinition {
    /// Identifier of the underlying set
    pub fn id(&self) -> &str {
        match self {
            PropertyDefinition::PropertySet(pset) => &pset.id,
            PropertyDefinition::QuantitySet(qset) => &qset.id,
        }
    }
}

/// Named property set (IfcPropertySet)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertySet {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub properties: Vec<Property>,
}

impl PropertySet {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: Some(name.into()),
            properties: Vec::new(),
        }
    }

    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        let value = value.into();
        self.properties.push(Property {
            name: name.into(),
            value: (!value.is_null()).then_some(value),
        });
        self
    }
}

/// Single property; `value` is `None` when no nominal value is set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    pub name: String,
    #[serde(default)]
    pub value: Option<Value>,
}

/// Element quantity set (IfcElementQuantity)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuantitySet {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub quantities: Vec<Quantity>,
}

impl QuantitySet {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: Some(name.into()),
            quantities: Vec::new(),
        }
    }

    pub fn with_quantity(mut self, name: impl Into<String>, value: QuantityValue) -> Self {
        self.quantities.push(Quantity {
            name: name.into(),
            value,
        });
        self
    }
}

/// Physical quantity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quantity {
    pub name: String,
    pub value: QuantityValue,
}

/// Quantity measure, one variant per IFC quantity kind
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum QuantityValue {
    Length(f64),
    Area(f64),
    Count(f64),
    Time(f64),
    Volume(f64),
    Weight(f64),
}

impl QuantityValue {
    /// The scalar carried by the quantity, regardless of kind
    pub fn magnitude(&self) -> f64 {
        match *self {
            QuantityValue::Length(v)
            | QuantityValue::Area(v)
            | QuantityValue::Count(v)
            | QuantityValue::Time(v)
            | QuantityValue::Volume(v)
            | QuantityValue::Weight(v) => v,
        }
    }
}

/// Tessellated body representation of an entity
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Representation {
    /// Object placement as a column-major 4x4 matrix (local → world)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placement: Option<[f64; 16]>,
    #[serde(default)]
    pub items: Vec<TessellatedItem>,
}

/// Triangulated face set in local coordinates
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TessellatedItem {
    /// Vertex coordinates (x, y, z)
    pub positions: Vec<f64>,
    /// Triangle indices (i0, i1, i2)
    pub indices: Vec<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_a_follows_hierarchy() {
        let wall = Entity::new("2O2Fr$t4X7Zf8NOew3FLOH", "IFCWALLSTANDARDCASE");
        assert!(wall.is_a(IfcClass::IfcWall));
        assert!(wall.is_a(IfcClass::IfcBuildingElement));
        assert!(!wall.is_a(IfcClass::IfcBuildingElementProxy));
    }

    #[test]
    fn test_has_representation_requires_items() {
        let mut wall = Entity::new("w", "IfcWall");
        assert!(!wall.has_representation());
        wall.representation = Some(Representation::default());
        assert!(!wall.has_representation());
        wall.representation = Some(Representation {
            placement: None,
            items: vec![TessellatedItem::default()],
        });
        assert!(wall.has_representation());
    }

    #[test]
    fn test_null_property_values_are_unset() {
        let pset = PropertySet::new("p", "Pset_WallCommon")
            .with_property("IsExternal", true)
            .with_property("FireRating", Value::Null);
        assert_eq!(pset.properties[0].value, Some(Value::Bool(true)));
        assert_eq!(pset.properties[1].value, None);
    }

    #[test]
    fn test_entity_json_shape() {
        let json = r#"{
            "id": "door-1",
            "name": "Door 900",
            "type": "IfcDoor",
            "spatial_container": "storey-0",
            "property_definitions": [
                {"kind": "QuantitySet", "id": "q1", "name": "Qto_DoorBaseQuantities",
                 "quantities": [{"name": "Width", "value": {"Length": 0.9}}]}
            ]
        }"#;
        let entity: Entity = serde_json::from_str(json).unwrap();
        assert_eq!(entity.name.as_deref(), Some("Door 900"));
        assert_eq!(entity.spatial_container.as_deref(), Some("storey-0"));
        match &entity.property_definitions[0] {
            PropertyDefinition::QuantitySet(qset) => {
                assert_eq!(qset.quantities[0].value, QuantityValue::Length(0.9));
            }
            other => panic!("expected quantity set, got {other:?}"),
        }
    }
}
