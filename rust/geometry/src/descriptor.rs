// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Geometric descriptor - fixed-schema numeric summary of a mesh
//!
//! Both axis-aligned and oriented box extents are kept: a rotation changes
//! the former while leaving the latter stable, a resize changes both.

use ifc_diff_core::{round_decimals, FieldChange, Value};
use serde::{Deserialize, Serialize};

use crate::mesh::Mesh;

/// Decimal places kept for every numeric field
pub const DESCRIPTOR_DECIMALS: i32 = 3;

/// Numeric summary of a mesh, rounded at construction
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeometricDescriptor {
    pub center: [f64; 3],
    /// Axis-aligned extents, ascending
    pub aabb_extents: [f64; 3],
    /// Oriented extents, ascending
    pub obb_extents: [f64; 3],
    pub volume: f64,
    pub surface_area: f64,
    pub watertight: bool,
}

impl GeometricDescriptor {
    /// Summarize a mesh
    pub fn from_mesh(mesh: &Mesh) -> Self {
        let round = |v: f64| round_decimals(v, DESCRIPTOR_DECIMALS);
        let round3 = |v: [f64; 3]| v.map(round);

        let centroid = mesh.centroid();
        let mut aabb = [mesh.extents().x, mesh.extents().y, mesh.extents().z];
        aabb.sort_by(f64::total_cmp);

        Self {
            center: round3([centroid.x, centroid.y, centroid.z]),
            aabb_extents: round3(aabb),
            obb_extents: round3(mesh.obb_extents()),
            volume: round(mesh.volume()),
            surface_area: round(mesh.area()),
            watertight: mesh.is_watertight(),
        }
    }

    /// Named fields in report order
    pub fn fields(&self) -> [(&'static str, Value); 12] {
        [
            ("X Center Coordinate", Value::Real(self.center[0])),
            ("Y Center Coordinate", Value::Real(self.center[1])),
            ("Z Center Coordinate", Value::Real(self.center[2])),
            ("Axis Aligned Bounding Box Dimension 1", Value::Real(self.aabb_extents[0])),
            ("Axis Aligned Bounding Box Dimension 2", Value::Real(self.aabb_extents[1])),
            ("Axis Aligned Bounding Box Dimension 3", Value::Real(self.aabb_extents[2])),
            ("OBB Dimension 1", Value::Real(self.obb_extents[0])),
            ("OBB Dimension 2", Value::Real(self.obb_extents[1])),
            ("OBB Dimension 3", Value::Real(self.obb_extents[2])),
            ("Volume", Value::Real(self.volume)),
            ("Surface Area", Value::Real(self.surface_area)),
            ("Is Water_Tight", Value::Bool(self.watertight)),
        ]
    }

    /// Fields whose values differ, in report order
    pub fn diff(&self, other: &GeometricDescriptor) -> Vec<FieldChange> {
        self.fields()
            .into_iter()
            .zip(other.fields())
            .filter(|((_, from), (_, to))| from != to)
            .map(|((field, from), (_, to))| FieldChange::Changed {
                field: field.to_string(),
                from,
                to,
            })
            .collect()
    }
}

/// Descriptor for a mesh, absent for the no-geometry sentinel
pub fn extract(mesh: Option<&Mesh>) -> Option<GeometricDescriptor> {
    mesh.map(GeometricDescriptor::from_mesh)
}
