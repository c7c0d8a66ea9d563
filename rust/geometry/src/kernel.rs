// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Geometry kernel - entity representation to mesh
//!
//! Kernel behaviour (world coordinates, welding, item unification) is an
//! explicit [`KernelSettings`] value passed on every call, so concurrent runs
//! can use different settings.

use ifc_diff_core::{Entity, Representation};
use nalgebra::Matrix4;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::mesh::{Mesh, SubMeshCollection};

/// Per-call mesh generation settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KernelSettings {
    /// Apply the object placement (local → world)
    pub use_world_coords: bool,
    /// Merge coincident vertices
    pub weld_vertices: bool,
    /// Distance under which vertices are merged
    pub weld_tolerance: f64,
    /// Merge all representation items before welding
    pub unify_shapes: bool,
}

impl Default for KernelSettings {
    fn default() -> Self {
        Self {
            use_world_coords: true,
            weld_vertices: true,
            weld_tolerance: 1e-6,
            unify_shapes: true,
        }
    }
}

/// Produces a mesh for an entity
pub trait GeometryKernel: Send + Sync {
    /// `Ok(None)` when the entity has no body representation
    fn mesh_for(&self, entity: &Entity, settings: &KernelSettings) -> Result<Option<Mesh>>;
}

/// Kernel for pre-tessellated representations
#[derive(Debug, Clone, Copy, Default)]
pub struct TessellationKernel;

impl TessellationKernel {
    pub fn new() -> Self {
        Self
    }

    fn tessellate(
        &self,
        representation: &Representation,
        settings: &KernelSettings,
    ) -> Result<Mesh> {
        let weld_items = settings.weld_vertices && !settings.unify_shapes;

        let mut collection = SubMeshCollection::new();
        for (index, item) in representation.items.iter().enumerate() {
            let mesh = Mesh::from_buffers(item.positions.clone(), item.indices.clone())
                .map_err(|e| Error::mesh(format!("item {index}: {e}")))?;
            let mesh = if weld_items {
                mesh.weld(settings.weld_tolerance)
            } else {
                mesh
            };
            collection.add(index, mesh);
        }

        let mut mesh = collection.into_combined_mesh();
        if settings.weld_vertices && settings.unify_shapes {
            mesh = mesh.weld(settings.weld_tolerance);
        }

        if settings.use_world_coords {
            if let Some(placement) = &representation.placement {
                mesh.transform(&placement_matrix(placement)?);
            }
        }

        Ok(mesh)
    }
}

impl GeometryKernel for TessellationKernel {
    fn mesh_for(&self, entity: &Entity, settings: &KernelSettings) -> Result<Option<Mesh>> {
        let Some(representation) = entity.representation.as_ref() else {
            return Ok(None);
        };
        let mesh = self.tessellate(representation, settings)?;
        if mesh.triangle_count() == 0 {
            return Ok(None);
        }
        Ok(Some(mesh))
    }
}

/// Column-major placement to an affine matrix
pub fn placement_matrix(values: &[f64; 16]) -> Result<Matrix4<f64>> {
    if values.iter().any(|v| !v.is_finite()) {
        return Err(Error::InvalidPlacement("non-finite matrix entry".to_string()));
    }
    let matrix = Matrix4::from_column_slice(values);
    let bottom = matrix.row(3);
    if bottom[0] != 0.0 || bottom[1] != 0.0 || bottom[2] != 0.0 || bottom[3] != 1.0 {
        return Err(Error::InvalidPlacement(format!(
            "not an affine transform, bottom row {:?}",
            [bottom[0], bottom[1], bottom[2], bottom[3]]
        )));
    }
    Ok(matrix)
}

/// Generate a mesh, mapping every failure to the no-geometry sentinel
pub fn generate_mesh(
    kernel: &dyn GeometryKernel,
    entity: &Entity,
    settings: &KernelSettings,
) -> Option<Mesh> {
    match kernel.mesh_for(entity, settings) {
        Ok(Some(mesh)) => Some(mesh),
        Ok(None) => {
            tracing::debug!(id = %entity.id, "entity has no body geometry");
            None
        }
        Err(e) => {
            tracing::warn!(id = %entity.id, error = %e, "mesh generation failed");
            None
        }
    }
}
