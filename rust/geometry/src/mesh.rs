// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Mesh data structures and surface queries

use nalgebra::{Matrix4, Point3, Vector3};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::error::{Error, Result};

/// Triangle mesh in f64 precision
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    /// Vertex positions (x, y, z)
    pub positions: Vec<f64>,
    /// Triangle indices (i0, i1, i2)
    pub indices: Vec<u32>,
}

/// A sub-mesh with the index of the representation item it came from
#[derive(Debug, Clone)]
pub struct SubMesh {
    pub item_index: usize,
    pub mesh: Mesh,
}

/// Collection of sub-meshes from an element, preserving per-item identity
#[derive(Debug, Clone, Default)]
pub struct SubMeshCollection {
    pub sub_meshes: Vec<SubMesh>,
}

impl SubMeshCollection {
    pub fn new() -> Self {
        Self { sub_meshes: Vec::new() }
    }

    /// Add a sub-mesh; empty meshes are ignored
    pub fn add(&mut self, item_index: usize, mesh: Mesh) {
        if !mesh.is_empty() {
            self.sub_meshes.push(SubMesh { item_index, mesh });
        }
    }

    pub fn is_empty(&self) -> bool {
        self.sub_meshes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.sub_meshes.len()
    }

    /// Merge all sub-meshes into a single mesh (loses per-item identity)
    pub fn into_combined_mesh(self) -> Mesh {
        let mut combined = Mesh::new();
        for sub in self.sub_meshes {
            combined.merge(&sub.mesh);
        }
        combined
    }

    pub fn iter(&self) -> impl Iterator<Item = &SubMesh> {
        self.sub_meshes.iter()
    }
}

impl Mesh {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mesh with capacity
    pub fn with_capacity(vertex_count: usize, index_count: usize) -> Self {
        Self {
            positions: Vec::with_capacity(vertex_count * 3),
            indices: Vec::with_capacity(index_count),
        }
    }

    /// Build a mesh from raw buffers, checking their consistency
    pub fn from_buffers(positions: Vec<f64>, indices: Vec<u32>) -> Result<Self> {
        if positions.len() % 3 != 0 {
            return Err(Error::mesh(format!(
                "position buffer length {} is not a multiple of 3",
                positions.len()
            )));
        }
        if indices.len() % 3 != 0 {
            return Err(Error::mesh(format!(
                "index buffer length {} is not a multiple of 3",
                indices.len()
            )));
        }
        if let Some(bad) = positions.iter().find(|v| !v.is_finite()) {
            return Err(Error::mesh(format!("non-finite coordinate {bad}")));
        }
        let vertex_count = positions.len() / 3;
        if let Some(&bad) = indices.iter().find(|&&i| i as usize >= vertex_count) {
            return Err(Error::mesh(format!(
                "index {bad} out of range for {vertex_count} vertices"
            )));
        }
        Ok(Self { positions, indices })
    }

    /// Closed box between two corners, triangles wound outward
    pub fn cuboid(min: Point3<f64>, max: Point3<f64>) -> Self {
        let mut mesh = Self::with_capacity(8, 36);
        for &(x, y, z) in &[
            (min.x, min.y, min.z),
            (max.x, min.y, min.z),
            (max.x, max.y, min.z),
            (min.x, max.y, min.z),
            (min.x, min.y, max.z),
            (max.x, min.y, max.z),
            (max.x, max.y, max.z),
            (min.x, max.y, max.z),
        ] {
            mesh.add_vertex(Point3::new(x, y, z));
        }
        for &[a, b, c] in &[
            [0, 2, 1],
            [0, 3, 2],
            [4, 5, 6],
            [4, 6, 7],
            [0, 1, 5],
            [0, 5, 4],
            [3, 7, 6],
            [3, 6, 2],
            [0, 4, 7],
            [0, 7, 3],
            [1, 2, 6],
            [1, 6, 5],
        ] {
            mesh.add_triangle(a, b, c);
        }
        mesh
    }

    #[inline]
    pub fn add_vertex(&mut self, position: Point3<f64>) {
        self.positions.push(position.x);
        self.positions.push(position.y);
        self.positions.push(position.z);
    }

    #[inline]
    pub fn add_triangle(&mut self, i0: u32, i1: u32, i2: u32) {
        self.indices.push(i0);
        self.indices.push(i1);
        self.indices.push(i2);
    }

    /// Merge another mesh into this one
    #[inline]
    pub fn merge(&mut self, other: &Mesh) {
        if other.is_empty() {
            return;
        }

        let vertex_offset = self.vertex_count() as u32;

        self.positions.reserve(other.positions.len());
        self.indices.reserve(other.indices.len());

        self.positions.extend_from_slice(&other.positions);
        self.indices
            .extend(other.indices.iter().map(|&i| i + vertex_offset));
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    #[inline]
    pub fn vertex(&self, index: usize) -> Point3<f64> {
        let i = index * 3;
        Point3::new(self.positions[i], self.positions[i + 1], self.positions[i + 2])
    }

    pub fn vertices(&self) -> impl Iterator<Item = Point3<f64>> + '_ {
        self.positions
            .chunks_exact(3)
            .map(|c| Point3::new(c[0], c[1], c[2]))
    }

    /// Triangle corner positions
    pub fn triangles(&self) -> impl Iterator<Item = [Point3<f64>; 3]> + '_ {
        self.indices.chunks_exact(3).map(move |tri| {
            [
                self.vertex(tri[0] as usize),
                self.vertex(tri[1] as usize),
                self.vertex(tri[2] as usize),
            ]
        })
    }

    /// Axis-aligned bounds (min, max); the origin for an empty mesh
    pub fn bounds(&self) -> (Point3<f64>, Point3<f64>) {
        if self.is_empty() {
            return (Point3::origin(), Point3::origin());
        }

        let mut min = Point3::new(f64::MAX, f64::MAX, f64::MAX);
        let mut max = Point3::new(f64::MIN, f64::MIN, f64::MIN);

        self.positions.chunks_exact(3).for_each(|chunk| {
            let (x, y, z) = (chunk[0], chunk[1], chunk[2]);
            min.x = min.x.min(x);
            min.y = min.y.min(y);
            min.z = min.z.min(z);
            max.x = max.x.max(x);
            max.y = max.y.max(y);
            max.z = max.z.max(z);
        });

        (min, max)
    }

    /// Size of the axis-aligned bounding box
    pub fn extents(&self) -> Vector3<f64> {
        let (min, max) = self.bounds();
        max - min
    }

    /// Total surface area
    pub fn area(&self) -> f64 {
        self.triangles().map(|t| triangle_area(&t)).sum()
    }

    /// Enclosed volume as the signed divergence-theorem sum.
    ///
    /// Positive for closed meshes wound outward.
    pub fn volume(&self) -> f64 {
        self.triangles()
            .map(|[a, b, c]| a.coords.dot(&b.coords.cross(&c.coords)))
            .sum::<f64>()
            / 6.0
    }

    /// Area-weighted mean of triangle centroids.
    ///
    /// Falls back to the vertex mean when the mesh has no area.
    pub fn centroid(&self) -> Point3<f64> {
        let mut weighted = Vector3::zeros();
        let mut total = 0.0;
        for tri in self.triangles() {
            let area = triangle_area(&tri);
            let center = (tri[0].coords + tri[1].coords + tri[2].coords) / 3.0;
            weighted += center * area;
            total += area;
        }
        if total > f64::EPSILON {
            return Point3::from(weighted / total);
        }

        let count = self.vertex_count();
        if count == 0 {
            return Point3::origin();
        }
        let sum = self
            .vertices()
            .fold(Vector3::zeros(), |acc, v| acc + v.coords);
        Point3::from(sum / count as f64)
    }

    /// Every undirected edge is shared by exactly two triangles
    pub fn is_watertight(&self) -> bool {
        if self.indices.is_empty() {
            return false;
        }
        let mut edges: FxHashMap<(u32, u32), u32> = FxHashMap::default();
        for tri in self.indices.chunks_exact(3) {
            for (a, b) in [(tri[0], tri[1]), (tri[1], tri[2]), (tri[2], tri[0])] {
                let key = if a < b { (a, b) } else { (b, a) };
                *edges.entry(key).or_insert(0) += 1;
            }
        }
        edges.values().all(|&count| count == 2)
    }

    /// Nearest point on the mesh surface, `None` without triangles
    pub fn closest_point(&self, point: &Point3<f64>) -> Option<Point3<f64>> {
        let mut best: Option<(f64, Point3<f64>)> = None;
        for tri in self.triangles() {
            let candidate = closest_point_on_triangle(point, &tri);
            let dist_sq = (candidate - *point).norm_squared();
            if best.map_or(true, |(d, _)| dist_sq < d) {
                best = Some((dist_sq, candidate));
            }
        }
        best.map(|(_, p)| p)
    }

    /// Apply a local-to-world transform in place
    pub fn transform(&mut self, transform: &Matrix4<f64>) {
        self.positions.chunks_exact_mut(3).for_each(|chunk| {
            let point = Point3::new(chunk[0], chunk[1], chunk[2]);
            let t = transform.transform_point(&point);
            chunk[0] = t.x;
            chunk[1] = t.y;
            chunk[2] = t.z;
        });
    }

    /// Merge vertices closer than `tolerance`.
    ///
    /// Triangles that collapse onto an edge or a point are dropped.
    pub fn weld(&self, tolerance: f64) -> Mesh {
        let cell_size = tolerance.max(1e-10);
        let tol_sq = tolerance * tolerance;
        let cell_of = |p: &Point3<f64>| {
            (
                (p.x / cell_size).floor() as i64,
                (p.y / cell_size).floor() as i64,
                (p.z / cell_size).floor() as i64,
            )
        };

        let mut grid: FxHashMap<(i64, i64, i64), SmallVec<[u32; 4]>> = FxHashMap::default();
        let mut welded = Mesh::with_capacity(self.vertex_count(), self.indices.len());
        let mut remap = Vec::with_capacity(self.vertex_count());

        for v in self.vertices() {
            let (cx, cy, cz) = cell_of(&v);
            let mut found = None;
            'search: for dx in -1..=1 {
                for dy in -1..=1 {
                    for dz in -1..=1 {
                        if let Some(keys) = grid.get(&(cx + dx, cy + dy, cz + dz)) {
                            for &k in keys {
                                if (welded.vertex(k as usize) - v).norm_squared() <= tol_sq {
                                    found = Some(k);
                                    break 'search;
                                }
                            }
                        }
                    }
                }
            }
            let key = match found {
                Some(k) => k,
                None => {
                    let k = welded.vertex_count() as u32;
                    welded.add_vertex(v);
                    grid.entry((cx, cy, cz)).or_default().push(k);
                    k
                }
            };
            remap.push(key);
        }

        for tri in self.indices.chunks_exact(3) {
            let (a, b, c) = (
                remap[tri[0] as usize],
                remap[tri[1] as usize],
                remap[tri[2] as usize],
            );
            if a != b && b != c && a != c {
                welded.add_triangle(a, b, c);
            }
        }

        welded
    }

    pub fn clear(&mut self) {
        self.positions.clear();
        self.indices.clear();
    }
}

#[inline]
pub(crate) fn triangle_area(tri: &[Point3<f64>; 3]) -> f64 {
    (tri[1] - tri[0]).cross(&(tri[2] - tri[0])).norm() * 0.5
}

/// Closest point on a triangle (Voronoi region walk, Ericson 5.1.5)
fn closest_point_on_triangle(p: &Point3<f64>, tri: &[Point3<f64>; 3]) -> Point3<f64> {
    let p = *p;
    let [a, b, c] = *tri;
    let ab = b - a;
    let ac = c - a;
    let ap = p - a;

    let d1 = ab.dot(&ap);
    let d2 = ac.dot(&ap);
    if d1 <= 0.0 && d2 <= 0.0 {
        return a;
    }

    let bp = p - b;
    let d3 = ab.dot(&bp);
    let d4 = ac.dot(&bp);
    if d3 >= 0.0 && d4 <= d3 {
        return b;
    }

    let vc = d1 * d4 - d3 * d2;
    if vc <= 0.0 && d1 >= 0.0 && d3 <= 0.0 {
        let v = d1 / (d1 - d3);
        return a + ab * v;
    }

    let cp = p - c;
    let d5 = ab.dot(&cp);
    let d6 = ac.dot(&cp);
    if d6 >= 0.0 && d5 <= d6 {
        return c;
    }

    let vb = d5 * d2 - d1 * d6;
    if vb <= 0.0 && d2 >= 0.0 && d6 <= 0.0 {
        let w = d2 / (d2 - d6);
        return a + ac * w;
    }

    let va = d3 * d6 - d5 * d4;
    if va <= 0.0 && (d4 - d3) >= 0.0 && (d5 - d6) >= 0.0 {
        let w = (d4 - d3) / ((d4 - d3) + (d5 - d6));
        return b + (c - b) * w;
    }

    let denom = va + vb + vc;
    if denom.abs() < f64::MIN_POSITIVE {
        // Degenerate triangle
        return a;
    }
    let v = vb / denom;
    let w = vc / denom;
    a + ab * v + ac * w
}
