// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Oriented bounding box
//!
//! The box is the smallest-volume one over a set of candidate frames: the
//! world axes, the principal axes of the vertex cloud, and frames built from
//! the dominant face normals combined with the longest edge directions. For
//! boxes, extrusions and other faceted building elements one of these frames
//! is the exact minimum.

use nalgebra::{Matrix3, Point3, SymmetricEigen, Vector3};
use rustc_hash::FxHashMap;

use crate::mesh::{triangle_area, Mesh};

/// Face normals tried as a box axis
const MAX_NORMAL_CANDIDATES: usize = 16;
/// Edge directions tried as a second axis per normal
const MAX_EDGE_CANDIDATES: usize = 32;
/// Quantization step for grouping parallel directions
const DIRECTION_QUANTUM: f64 = 1e-6;

/// Orthonormal frame with box extents along its axes
#[derive(Debug, Clone, Copy)]
pub struct OrientedBox {
    pub axes: [Vector3<f64>; 3],
    pub extents: [f64; 3],
}

impl OrientedBox {
    pub fn volume(&self) -> f64 {
        self.extents[0] * self.extents[1] * self.extents[2]
    }

    fn surface(&self) -> f64 {
        let [a, b, c] = self.extents;
        2.0 * (a * b + b * c + c * a)
    }

    /// Extents in ascending order
    pub fn sorted_extents(&self) -> [f64; 3] {
        let mut extents = self.extents;
        extents.sort_by(f64::total_cmp);
        extents
    }
}

impl Mesh {
    /// Minimum-volume oriented bounding box over the candidate frames
    pub fn oriented_box(&self) -> OrientedBox {
        let vertices: Vec<Point3<f64>> = self.vertices().collect();
        let mut best = box_in_frame(&vertices, [Vector3::x(), Vector3::y(), Vector3::z()]);

        let mut consider = |axes: [Vector3<f64>; 3]| {
            let candidate = box_in_frame(&vertices, axes);
            if is_smaller(&candidate, &best) {
                best = candidate;
            }
        };

        if let Some(axes) = principal_axes(&vertices) {
            consider(axes);
        }

        let normals = dominant_normals(self);
        let edges = longest_edge_directions(self);
        for &normal in &normals {
            for &edge in &edges {
                let in_plane = edge - normal * normal.dot(&edge);
                if in_plane.norm() < 1e-9 {
                    continue;
                }
                let u = in_plane.normalize();
                consider([normal, u, normal.cross(&u)]);
            }
        }

        best
    }

    /// Sorted extents of [`oriented_box`](Self::oriented_box)
    pub fn obb_extents(&self) -> [f64; 3] {
        self.oriented_box().sorted_extents()
    }
}

fn is_smaller(candidate: &OrientedBox, best: &OrientedBox) -> bool {
    let (cv, bv) = (candidate.volume(), best.volume());
    let slack = 1e-9 * bv.max(1.0);
    if cv < bv - slack {
        return true;
    }
    // Flat and linear meshes have zero volume in many frames
    cv <= bv + slack && candidate.surface() < best.surface() - slack
}

fn box_in_frame(vertices: &[Point3<f64>], axes: [Vector3<f64>; 3]) -> OrientedBox {
    let mut extents = [0.0; 3];
    if !vertices.is_empty() {
        for (extent, axis) in extents.iter_mut().zip(axes.iter()) {
            let (lo, hi) = vertices.iter().fold((f64::MAX, f64::MIN), |(lo, hi), v| {
                let d = v.coords.dot(axis);
                (lo.min(d), hi.max(d))
            });
            *extent = hi - lo;
        }
    }
    OrientedBox { axes, extents }
}

/// Eigenvectors of the vertex covariance
fn principal_axes(vertices: &[Point3<f64>]) -> Option<[Vector3<f64>; 3]> {
    if vertices.len() < 3 {
        return None;
    }
    let n = vertices.len() as f64;
    let mean = vertices.iter().fold(Vector3::zeros(), |acc, v| acc + v.coords) / n;
    let covariance = vertices.iter().fold(Matrix3::zeros(), |acc, v| {
        let d = v.coords - mean;
        acc + d * d.transpose()
    }) / n;

    let eigen = SymmetricEigen::new(covariance);
    let x = eigen.eigenvectors.column(0).into_owned();
    let y = eigen.eigenvectors.column(1).into_owned();
    if x.norm() < 1e-9 || y.norm() < 1e-9 {
        return None;
    }
    let x = x.normalize();
    let y = (y - x * x.dot(&y)).try_normalize(1e-9)?;
    Some([x, y, x.cross(&y)])
}

/// Canonical sign so that `d` and `-d` share one key
fn canonical(direction: Vector3<f64>) -> Vector3<f64> {
    let flip = direction
        .iter()
        .find(|c| c.abs() > DIRECTION_QUANTUM)
        .is_some_and(|&c| c < 0.0);
    if flip {
        -direction
    } else {
        direction
    }
}

fn direction_key(direction: &Vector3<f64>) -> (i64, i64, i64) {
    (
        (direction.x / DIRECTION_QUANTUM).round() as i64,
        (direction.y / DIRECTION_QUANTUM).round() as i64,
        (direction.z / DIRECTION_QUANTUM).round() as i64,
    )
}

/// Group directions up to sign, rank by accumulated weight, keep the top `limit`
fn rank_directions(
    weighted: impl Iterator<Item = (Vector3<f64>, f64)>,
    limit: usize,
) -> Vec<Vector3<f64>> {
    let mut groups: FxHashMap<(i64, i64, i64), (Vector3<f64>, f64)> = FxHashMap::default();
    for (direction, weight) in weighted {
        let Some(unit) = direction.try_normalize(1e-12) else {
            continue;
        };
        let unit = canonical(unit);
        groups
            .entry(direction_key(&unit))
            .and_modify(|(_, w)| *w += weight)
            .or_insert((unit, weight));
    }

    let mut ranked: Vec<_> = groups.into_values().collect();
    ranked.sort_by(|a, b| {
        b.1.total_cmp(&a.1)
            .then_with(|| direction_key(&a.0).cmp(&direction_key(&b.0)))
    });
    ranked.truncate(limit);
    ranked.into_iter().map(|(d, _)| d).collect()
}

fn dominant_normals(mesh: &Mesh) -> Vec<Vector3<f64>> {
    rank_directions(
        mesh.triangles().map(|tri| {
            let normal = (tri[1] - tri[0]).cross(&(tri[2] - tri[0]));
            (normal, triangle_area(&tri))
        }),
        MAX_NORMAL_CANDIDATES,
    )
}

fn longest_edge_directions(mesh: &Mesh) -> Vec<Vector3<f64>> {
    rank_directions(
        mesh.triangles().flat_map(|[a, b, c]| {
            [b - a, c - b, a - c].into_iter().map(|e| (e, e.norm()))
        }),
        MAX_EDGE_CANDIDATES,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::Rotation3;

    fn unit_box(dx: f64, dy: f64, dz: f64) -> Mesh {
        Mesh::cuboid(Point3::origin(), Point3::new(dx, dy, dz))
    }

    #[test]
    fn test_axis_aligned_box() {
        let extents = unit_box(3.0, 1.0, 2.0).obb_extents();
        assert_relative_eq!(extents[0], 1.0, epsilon = 1e-9);
        assert_relative_eq!(extents[1], 2.0, epsilon = 1e-9);
        assert_relative_eq!(extents[2], 3.0, epsilon = 1e-9);
    }

    #[test]
    fn test_rotation_keeps_obb_but_changes_aabb() {
        let mut mesh = unit_box(1.0, 2.0, 3.0);
        let rotation = Rotation3::from_euler_angles(0.3, 0.0, 0.5236);
        mesh.transform(&rotation.to_homogeneous());

        let extents = mesh.obb_extents();
        assert_relative_eq!(extents[0], 1.0, epsilon = 1e-6);
        assert_relative_eq!(extents[1], 2.0, epsilon = 1e-6);
        assert_relative_eq!(extents[2], 3.0, epsilon = 1e-6);

        let aabb = mesh.extents();
        assert!(aabb.x * aabb.y * aabb.z > 6.0 + 1e-3);
    }

    #[test]
    fn test_flat_mesh_has_zero_thickness() {
        let mesh = Mesh::from_buffers(
            vec![0.0, 0.0, 0.0, 4.0, 0.0, 0.0, 4.0, 2.0, 0.0, 0.0, 2.0, 0.0],
            vec![0, 1, 2, 0, 2, 3],
        )
        .unwrap();
        let extents = mesh.obb_extents();
        assert_relative_eq!(extents[0], 0.0, epsilon = 1e-9);
        assert_relative_eq!(extents[1], 2.0, epsilon = 1e-9);
        assert_relative_eq!(extents[2], 4.0, epsilon = 1e-9);
    }

    #[test]
    fn test_empty_mesh() {
        assert_eq!(Mesh::new().obb_extents(), [0.0, 0.0, 0.0]);
    }
}
