// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! IFC-Diff Geometry
//!
//! Mesh generation and geometric comparison for revision diffs: descriptor
//! extraction, surface sampling, Hausdorff shape distance, rigid translation
//! detection and GLB encoding, built on nalgebra.

pub mod descriptor;
pub mod error;
pub mod glb;
pub mod hausdorff;
pub mod kernel;
pub mod mesh;
pub mod movement;
pub mod obb;
pub mod sampling;

// Re-export nalgebra types for convenience
pub use nalgebra::{Matrix4, Point3, Vector3};

pub use descriptor::{extract, GeometricDescriptor};
pub use error::{Error, Result};
pub use glb::{encode_glb, GlbPrimitive};
pub use hausdorff::{
    directed_hausdorff, hausdorff, hausdorff_points, hausdorff_points_with, BruteForceIndex,
    PointIndex, ShapeComparator,
};
pub use kernel::{generate_mesh, GeometryKernel, KernelSettings, TessellationKernel};
pub use mesh::{Mesh, SubMesh, SubMeshCollection};
pub use movement::{detect_movement, rigid_translation};
pub use obb::OrientedBox;
pub use sampling::{AreaWeightedSampler, GridProjectionSampler, SamplingStrategy, SurfaceSampler};
