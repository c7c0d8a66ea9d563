// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Surface samplers
//!
//! Two interchangeable ways to turn a mesh into a point cloud on its surface:
//!
//! - [`AreaWeightedSampler`]: random points, triangles picked proportionally
//!   to their area. Deterministic for a fixed seed, but the point layout
//!   depends on the triangulation.
//! - [`GridProjectionSampler`]: a regular grid inside the bounding box,
//!   projected onto the nearest surface point. Density does not depend on
//!   the triangulation.

use std::fmt;
use std::str::FromStr;

use nalgebra::Point3;
use rand::distributions::{Distribution, WeightedIndex};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::mesh::{triangle_area, Mesh};

/// Extents below this are treated as flat
const FLAT_EPSILON: f64 = 1e-9;

/// Produces points on a mesh surface
pub trait SurfaceSampler: Send + Sync {
    /// Roughly `count` points; empty when the mesh has no surface
    fn sample(&self, mesh: &Mesh, count: usize) -> Vec<Point3<f64>>;
}

/// Sampling strategy selected by configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SamplingStrategy {
    AreaWeighted,
    #[default]
    GridProjection,
}

impl SamplingStrategy {
    /// Build the sampler for this strategy
    pub fn sampler(self, oversampling: usize, seed: u64) -> Result<Box<dyn SurfaceSampler>> {
        Ok(match self {
            SamplingStrategy::AreaWeighted => Box::new(AreaWeightedSampler::new(seed)),
            SamplingStrategy::GridProjection => Box::new(GridProjectionSampler::new(oversampling)?),
        })
    }
}

impl fmt::Display for SamplingStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SamplingStrategy::AreaWeighted => "area",
            SamplingStrategy::GridProjection => "grid",
        })
    }
}

impl FromStr for SamplingStrategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "area" | "area_weighted" | "area-weighted" => Ok(SamplingStrategy::AreaWeighted),
            "grid" | "grid_projection" | "grid-projection" => Ok(SamplingStrategy::GridProjection),
            other => Err(Error::InvalidSampling(format!("unknown strategy {other:?}"))),
        }
    }
}

/// Seeded area-weighted random sampler
#[derive(Debug, Clone, Copy)]
pub struct AreaWeightedSampler {
    seed: u64,
}

impl AreaWeightedSampler {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }
}

impl SurfaceSampler for AreaWeightedSampler {
    fn sample(&self, mesh: &Mesh, count: usize) -> Vec<Point3<f64>> {
        if count == 0 {
            return Vec::new();
        }
        let triangles: Vec<[Point3<f64>; 3]> = mesh.triangles().collect();
        let areas: Vec<f64> = triangles.iter().map(triangle_area).collect();
        // Fails for an empty mesh or one without area
        let Ok(picker) = WeightedIndex::new(&areas) else {
            return Vec::new();
        };

        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        (0..count)
            .map(|_| {
                let [a, b, c] = triangles[picker.sample(&mut rng)];
                let s: f64 = rng.gen::<f64>().sqrt();
                let t: f64 = rng.gen();
                Point3::from(a.coords * (1.0 - s) + b.coords * (s * (1.0 - t)) + c.coords * (s * t))
            })
            .collect()
    }
}

/// Grid projection sampler
#[derive(Debug, Clone, Copy)]
pub struct GridProjectionSampler {
    oversampling: usize,
}

impl GridProjectionSampler {
    /// `oversampling` multiplies the candidate grid size and must be at least 1
    pub fn new(oversampling: usize) -> Result<Self> {
        if oversampling < 1 {
            return Err(Error::InvalidSampling(
                "oversampling must be at least 1".to_string(),
            ));
        }
        Ok(Self { oversampling })
    }

    /// Grid cell centers covering the mesh bounds.
    ///
    /// The candidate budget is spread over the axes that are at least one cell
    /// long. Thinner axes get a single layer and the cell is recomputed over
    /// the rest until it settles, so plates and panes stay near the budget.
    pub fn grid_points(&self, mesh: &Mesh, count: usize) -> Vec<Point3<f64>> {
        let candidates = count.saturating_mul(self.oversampling).max(1) as f64;
        let (min, max) = mesh.bounds();
        let size = max - min;

        let mut spanned = size.map(|s| s > FLAT_EPSILON);
        let cell = loop {
            let axes: Vec<f64> = (0..3).filter(|&k| spanned[k]).map(|k| size[k]).collect();
            if axes.is_empty() {
                break f64::INFINITY;
            }
            let measure: f64 = axes.iter().product();
            let cell = (measure / candidates).powf(1.0 / axes.len() as f64);

            let thin: Vec<usize> = (0..3).filter(|&k| spanned[k] && size[k] < cell).collect();
            if thin.is_empty() {
                break cell;
            }
            for k in thin {
                spanned[k] = false;
            }
        };

        let resolution = size.zip_map(&spanned, |s, on| {
            if on {
                ((s / cell).ceil() as usize).max(1)
            } else {
                1
            }
        });
        let spacing = size.zip_map(&resolution, |s, n| s / n as f64);
        let axis = |k: usize, i: usize| min[k] + (i as f64 + 0.5) * spacing[k];

        let mut points = Vec::with_capacity(resolution.x * resolution.y * resolution.z);
        for i in 0..resolution.x {
            for j in 0..resolution.y {
                for k in 0..resolution.z {
                    points.push(Point3::new(axis(0, i), axis(1, j), axis(2, k)));
                }
            }
        }
        points
    }
}

impl SurfaceSampler for GridProjectionSampler {
    fn sample(&self, mesh: &Mesh, count: usize) -> Vec<Point3<f64>> {
        if count == 0 || mesh.area() <= 0.0 {
            return Vec::new();
        }
        let grid = self.grid_points(mesh, count);
        tracing::trace!(count, candidates = grid.len(), "grid projection sampling");
        grid.iter()
            .filter_map(|p| mesh.closest_point(p))
            .filter(|p| p.iter().all(|c| c.is_finite()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn unit_cube() -> Mesh {
        Mesh::cuboid(Point3::origin(), Point3::new(1.0, 1.0, 1.0))
    }

    fn on_cube_surface(p: &Point3<f64>) -> bool {
        let inside = p.iter().all(|&c| (-1e-9..=1.0 + 1e-9).contains(&c));
        let on_face = p.iter().any(|&c| c.abs() < 1e-9 || (c - 1.0).abs() < 1e-9);
        inside && on_face
    }

    #[test]
    fn test_strategy_parsing() {
        assert_eq!("area".parse::<SamplingStrategy>().unwrap(), SamplingStrategy::AreaWeighted);
        assert_eq!(" GRID ".parse::<SamplingStrategy>().unwrap(), SamplingStrategy::GridProjection);
        assert!("poisson".parse::<SamplingStrategy>().is_err());
        assert_eq!(SamplingStrategy::default(), SamplingStrategy::GridProjection);
    }

    #[test]
    fn test_area_weighted_is_deterministic() {
        let sampler = AreaWeightedSampler::new(7);
        let a = sampler.sample(&unit_cube(), 64);
        let b = sampler.sample(&unit_cube(), 64);
        assert_eq!(a.len(), 64);
        assert_eq!(a, b);
        assert!(a.iter().all(on_cube_surface));
    }

    #[test]
    fn test_area_weighted_empty_mesh() {
        assert!(AreaWeightedSampler::new(0).sample(&Mesh::new(), 10).is_empty());
    }

    #[test]
    fn test_grid_points_fill_bounds() {
        let sampler = GridProjectionSampler::new(2).unwrap();
        let points = sampler.grid_points(&unit_cube(), 50);
        // 100 candidates over a unit cube: cell ~0.215, 5 cells per axis
        assert_eq!(points.len(), 125);
        assert_relative_eq!(points[0].x, 0.1, epsilon = 1e-12);
    }

    #[test]
    fn test_grid_points_flat_mesh_stay_planar() {
        let quad = Mesh::from_buffers(
            vec![0.0, 0.0, 0.0, 2.0, 0.0, 0.0, 2.0, 1.0, 0.0, 0.0, 1.0, 0.0],
            vec![0, 1, 2, 0, 2, 3],
        )
        .unwrap();
        let sampler = GridProjectionSampler::new(2).unwrap();
        let points = sampler.grid_points(&quad, 50);
        // 100 candidates over 2 x 1: cell ~0.141, 15 x 8 x 1
        assert_eq!(points.len(), 120);
        assert!(points.iter().all(|p| p.z == 0.0));
    }

    #[test]
    fn test_grid_points_thin_plate_stay_within_budget() {
        let sampler = GridProjectionSampler::new(2).unwrap();
        for thickness in [0.2, 0.01, 0.001, 1e-6] {
            let plate = Mesh::cuboid(Point3::origin(), Point3::new(10.0, 10.0, thickness));
            let points = sampler.grid_points(&plate, 50);
            // 100 candidates: one layer of 10 x 10
            assert_eq!(points.len(), 100, "thickness {thickness}");
            assert!(points.iter().all(|p| (p.z - thickness / 2.0).abs() < 1e-12));
        }
    }

    #[test]
    fn test_grid_points_slender_beam() {
        let sampler = GridProjectionSampler::new(2).unwrap();
        let beam = Mesh::cuboid(Point3::origin(), Point3::new(10.0, 0.05, 0.05));
        // both cross-section axes are thinner than a cell: 100 cells along x
        assert_eq!(sampler.grid_points(&beam, 50).len(), 100);
    }

    #[test]
    fn test_grid_projection_lands_on_surface() {
        let sampler = GridProjectionSampler::new(2).unwrap();
        let points = sampler.sample(&unit_cube(), 50);
        assert_eq!(points.len(), 125);
        assert!(points.iter().all(on_cube_surface));
    }

    #[test]
    fn test_zero_oversampling_rejected() {
        assert!(matches!(
            GridProjectionSampler::new(0),
            Err(Error::InvalidSampling(_))
        ));
        assert!(SamplingStrategy::GridProjection.sampler(0, 0).is_err());
        assert!(SamplingStrategy::AreaWeighted.sampler(0, 0).is_ok());
    }
}
