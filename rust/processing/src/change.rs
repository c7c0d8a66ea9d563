// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Change records produced by the classifier.

use std::fmt;

use ifc_diff_core::{AttributeMap, FieldChange};
use serde::{Deserialize, Serialize};

/// Per-entity classification outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChangeStatus {
    Added,
    Deleted,
    Modified,
    Unmodified,
}

impl ChangeStatus {
    /// Status of a shared entity from its modification vector.
    ///
    /// An empty vector (no checks enabled) is unmodified.
    pub fn from_checks(checks: &[bool]) -> Self {
        if checks.iter().any(|&changed| changed) {
            ChangeStatus::Modified
        } else {
            ChangeStatus::Unmodified
        }
    }
}

impl fmt::Display for ChangeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ChangeStatus::Added => "Added",
            ChangeStatus::Deleted => "Deleted",
            ChangeStatus::Modified => "Modified",
            ChangeStatus::Unmodified => "Unmodified",
        })
    }
}

/// One reportable change of a modified entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ChangeItem {
    /// Node present only in the newer semantic graph
    AddedNode { node: String, attributes: AttributeMap },
    /// Node present only in the older semantic graph
    DeletedNode { node: String, attributes: AttributeMap },
    /// Shared node whose attributes differ
    NodeChanged { node: String, changes: Vec<FieldChange> },
    /// Geometric descriptor fields that differ
    GeometryChanged { changes: Vec<FieldChange> },
    /// Hausdorff distance above tolerance
    ShapeChanged { distance: f64, tolerance: f64 },
}

impl fmt::Display for ChangeItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChangeItem::AddedNode { node, attributes } => {
                write!(f, "Added {node}")?;
                write_attributes(f, attributes)
            }
            ChangeItem::DeletedNode { node, attributes } => {
                write!(f, "Deleted {node}")?;
                write_attributes(f, attributes)
            }
            ChangeItem::NodeChanged { node, changes } => {
                write!(f, "Modified {node}: ")?;
                write_changes(f, changes)
            }
            ChangeItem::GeometryChanged { changes } => write_changes(f, changes),
            ChangeItem::ShapeChanged {
                distance,
                tolerance,
            } => write!(
                f,
                "Shape or position change: Hausdorff distance {distance:.4} > {tolerance}"
            ),
        }
    }
}

fn write_attributes(f: &mut fmt::Formatter<'_>, attributes: &AttributeMap) -> fmt::Result {
    let mut separator = " (";
    for (key, value) in attributes {
        write!(f, "{separator}{key}: {value}")?;
        separator = ", ";
    }
    if !attributes.is_empty() {
        f.write_str(")")?;
    }
    Ok(())
}

fn write_changes(f: &mut fmt::Formatter<'_>, changes: &[FieldChange]) -> fmt::Result {
    for (i, change) in changes.iter().enumerate() {
        if i > 0 {
            f.write_str("; ")?;
        }
        write!(f, "{change}")?;
    }
    Ok(())
}

/// Classification of one entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeRecord {
    pub id: String,
    pub status: ChangeStatus,
    /// One flag per enabled check, in semantic, geometric, shape order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub checks: Vec<bool>,
    /// Reportable changes; empty for proxies and unchanged entities
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub changes: Vec<ChangeItem>,
    /// Rigid translation result, when meshes were produced
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub moved: Option<bool>,
}

impl ChangeRecord {
    /// Record for an entity present in only one snapshot
    pub fn presence(id: impl Into<String>, status: ChangeStatus) -> Self {
        Self {
            id: id.into(),
            status,
            checks: Vec::new(),
            changes: Vec::new(),
            moved: None,
        }
    }

    pub fn is_modified(&self) -> bool {
        self.status == ChangeStatus::Modified
    }
}

/// Which kinds of change one entity underwent, all checks run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModificationType {
    pub semantic: bool,
    pub geometric: bool,
    pub shape: bool,
}

impl ModificationType {
    pub fn any(&self) -> bool {
        self.semantic || self.geometric || self.shape
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ifc_diff_core::Value;

    #[test]
    fn test_status_from_checks() {
        assert_eq!(ChangeStatus::from_checks(&[]), ChangeStatus::Unmodified);
        assert_eq!(ChangeStatus::from_checks(&[false, false]), ChangeStatus::Unmodified);
        assert_eq!(ChangeStatus::from_checks(&[false, true]), ChangeStatus::Modified);
    }

    #[test]
    fn test_item_display() {
        let item = ChangeItem::GeometryChanged {
            changes: vec![FieldChange::Changed {
                field: "Volume".into(),
                from: Value::Real(10.0),
                to: Value::Real(12.5),
            }],
        };
        assert_eq!(item.to_string(), "Volume: 10.0 \u{2192} 12.5");

        let mut attributes = AttributeMap::new();
        attributes.insert("Name".into(), "Pset_Custom".into());
        let item = ChangeItem::AddedNode {
            node: "pset-2".into(),
            attributes,
        };
        assert_eq!(item.to_string(), "Added pset-2 (Name: Pset_Custom)");

        let item = ChangeItem::ShapeChanged {
            distance: 0.5,
            tolerance: 0.01,
        };
        assert_eq!(
            item.to_string(),
            "Shape or position change: Hausdorff distance 0.5000 > 0.01"
        );
    }

    #[test]
    fn test_record_json_omits_empty_fields() {
        let record = ChangeRecord::presence("w1", ChangeStatus::Added);
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(json, r#"{"id":"w1","status":"Added"}"#);
    }
}
