// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Shape comparison by symmetric Hausdorff distance between surface samples

use nalgebra::Point3;

use crate::error::Result;
use crate::mesh::Mesh;
use crate::sampling::{SamplingStrategy, SurfaceSampler};

/// Nearest-neighbour lookup over a fixed point set
pub trait PointIndex {
    /// Distance from `point` to the closest indexed point, `None` if empty
    fn nearest_distance(&self, point: &Point3<f64>) -> Option<f64>;
}

/// Linear scan; adequate for the tens to hundreds of samples used per mesh
#[derive(Debug, Clone, Copy)]
pub struct BruteForceIndex<'a> {
    points: &'a [Point3<f64>],
}

impl<'a> BruteForceIndex<'a> {
    pub fn new(points: &'a [Point3<f64>]) -> Self {
        Self { points }
    }
}

impl PointIndex for BruteForceIndex<'_> {
    fn nearest_distance(&self, point: &Point3<f64>) -> Option<f64> {
        self.points
            .iter()
            .map(|q| (*q - *point).norm_squared())
            .min_by(f64::total_cmp)
            .map(f64::sqrt)
    }
}

/// Directed distance: the largest nearest-neighbour distance from `from` into `to`
pub fn directed_hausdorff(from: &[Point3<f64>], to: &impl PointIndex) -> Option<f64> {
    let mut worst: Option<f64> = None;
    for p in from {
        let d = to.nearest_distance(p)?;
        worst = Some(worst.map_or(d, |w| w.max(d)));
    }
    worst
}

/// Symmetric Hausdorff distance with a caller-chosen index.
///
/// `None` when either set is empty.
pub fn hausdorff_points_with<'a, I, F>(
    a: &'a [Point3<f64>],
    b: &'a [Point3<f64>],
    build_index: F,
) -> Option<f64>
where
    I: PointIndex,
    F: Fn(&'a [Point3<f64>]) -> I,
{
    if a.is_empty() || b.is_empty() {
        return None;
    }
    let ab = directed_hausdorff(a, &build_index(b))?;
    let ba = directed_hausdorff(b, &build_index(a))?;
    Some(ab.max(ba))
}

/// Symmetric Hausdorff distance using [`BruteForceIndex`]
pub fn hausdorff_points(a: &[Point3<f64>], b: &[Point3<f64>]) -> Option<f64> {
    hausdorff_points_with(a, b, BruteForceIndex::new)
}

/// Hausdorff distance between two meshes' surface samples.
///
/// `None` if either mesh is the no-geometry sentinel or yields no samples.
pub fn hausdorff(
    a: Option<&Mesh>,
    b: Option<&Mesh>,
    sampler: &dyn SurfaceSampler,
    sample_count: usize,
) -> Option<f64> {
    let (a, b) = (a?, b?);
    let samples_a = sampler.sample(a, sample_count);
    let samples_b = sampler.sample(b, sample_count);
    hausdorff_points(&samples_a, &samples_b)
}

/// Configured shape comparator
pub struct ShapeComparator {
    sampler: Box<dyn SurfaceSampler>,
    sample_count: usize,
    tolerance: f64,
}

impl ShapeComparator {
    pub fn new(
        strategy: SamplingStrategy,
        sample_count: usize,
        oversampling: usize,
        seed: u64,
        tolerance: f64,
    ) -> Result<Self> {
        Ok(Self {
            sampler: strategy.sampler(oversampling, seed)?,
            sample_count,
            tolerance,
        })
    }

    /// Comparator around an existing sampler
    pub fn with_sampler(sampler: Box<dyn SurfaceSampler>, sample_count: usize, tolerance: f64) -> Self {
        Self {
            sampler,
            sample_count,
            tolerance,
        }
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    pub fn distance(&self, a: Option<&Mesh>, b: Option<&Mesh>) -> Option<f64> {
        hausdorff(a, b, self.sampler.as_ref(), self.sample_count)
    }

    /// True iff the distance is measurable and strictly above the tolerance.
    ///
    /// An unmeasurable distance counts as "not different".
    pub fn are_different(&self, a: Option<&Mesh>, b: Option<&Mesh>) -> bool {
        self.assess(a, b).1
    }

    /// Distance together with the [`are_different`](Self::are_different) verdict
    pub fn assess(&self, a: Option<&Mesh>, b: Option<&Mesh>) -> (Option<f64>, bool) {
        let distance = self.distance(a, b);
        let different = match distance {
            Some(d) => exceeds(d, self.tolerance),
            None => {
                if a.is_some() && b.is_some() {
                    tracing::warn!("shape distance could not be measured");
                }
                false
            }
        };
        (distance, different)
    }
}

impl std::fmt::Debug for ShapeComparator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShapeComparator")
            .field("sample_count", &self.sample_count)
            .field("tolerance", &self.tolerance)
            .finish_non_exhaustive()
    }
}

/// Strict comparison against a tolerance
#[inline]
pub fn exceeds(distance: f64, tolerance: f64) -> bool {
    distance > tolerance
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sampling::{AreaWeightedSampler, GridProjectionSampler};
    use approx::assert_relative_eq;
    use nalgebra::{Matrix4, Vector3};

    fn cube_at(x: f64) -> Mesh {
        Mesh::cuboid(Point3::new(x, 0.0, 0.0), Point3::new(x + 1.0, 1.0, 1.0))
    }

    #[test]
    fn test_point_sets() {
        let a = [Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 0.0, 0.0)];
        let b = [Point3::new(0.0, 0.0, 0.0), Point3::new(4.0, 0.0, 0.0)];
        // a -> b is 1, b -> a is 3
        assert_relative_eq!(directed_hausdorff(&a, &BruteForceIndex::new(&b)).unwrap(), 1.0);
        assert_relative_eq!(directed_hausdorff(&b, &BruteForceIndex::new(&a)).unwrap(), 3.0);
        assert_relative_eq!(hausdorff_points(&a, &b).unwrap(), 3.0);
        assert_relative_eq!(hausdorff_points(&b, &a).unwrap(), 3.0);
    }

    #[test]
    fn test_empty_sets_are_unmeasurable() {
        let a = [Point3::new(0.0, 0.0, 0.0)];
        assert!(hausdorff_points(&a, &[]).is_none());
        assert!(hausdorff_points(&[], &a).is_none());
    }

    #[test]
    fn test_sentinel_is_unmeasurable() {
        let cube = cube_at(0.0);
        let sampler = GridProjectionSampler::new(2).unwrap();
        assert!(hausdorff(Some(&cube), None, &sampler, 50).is_none());
        assert!(hausdorff(None, None, &sampler, 50).is_none());
    }

    #[test]
    fn test_self_distance_is_zero() {
        let cube = cube_at(0.0);
        for strategy in [SamplingStrategy::AreaWeighted, SamplingStrategy::GridProjection] {
            let comparator = ShapeComparator::new(strategy, 50, 2, 0, 0.01).unwrap();
            assert_eq!(comparator.distance(Some(&cube), Some(&cube)), Some(0.0));
            assert!(!comparator.are_different(Some(&cube), Some(&cube)));
        }
    }

    #[test]
    fn test_symmetry_for_both_strategies() {
        let a = cube_at(0.0);
        let mut b = Mesh::cuboid(Point3::origin(), Point3::new(1.5, 1.0, 0.5));
        b.transform(&Matrix4::new_translation(&Vector3::new(0.2, 0.1, 0.0)));

        let samplers: [Box<dyn SurfaceSampler>; 2] = [
            Box::new(AreaWeightedSampler::new(3)),
            Box::new(GridProjectionSampler::new(2).unwrap()),
        ];
        for sampler in &samplers {
            let ab = hausdorff(Some(&a), Some(&b), sampler.as_ref(), 60).unwrap();
            let ba = hausdorff(Some(&b), Some(&a), sampler.as_ref(), 60).unwrap();
            assert_relative_eq!(ab, ba, epsilon = 1e-12);
            assert!(ab > 0.0);
        }
    }

    #[test]
    fn test_translation_is_measured() {
        let comparator =
            ShapeComparator::new(SamplingStrategy::GridProjection, 50, 2, 0, 0.01).unwrap();
        let d = comparator
            .distance(Some(&cube_at(0.0)), Some(&cube_at(0.5)))
            .unwrap();
        // Opposite faces are 0.5 apart; sample spacing adds at most a cell diagonal
        assert!(d >= 0.5 - 1e-9);
        assert!(d < 0.65);
    }

    #[test]
    fn test_tolerance_boundary_is_strict() {
        let distance = 0.5;
        let (t1, t2) = (0.4, 0.5);
        assert!(exceeds(distance, t1));
        assert!(!exceeds(distance, t2));

        let a = cube_at(0.0);
        let b = cube_at(0.5);
        let loose = ShapeComparator::new(SamplingStrategy::GridProjection, 50, 2, 0, 1.0).unwrap();
        let tight = ShapeComparator::new(SamplingStrategy::GridProjection, 50, 2, 0, 0.4).unwrap();
        assert!(!loose.are_different(Some(&a), Some(&b)));
        assert!(tight.are_different(Some(&a), Some(&b)));
        assert!(!tight.are_different(Some(&a), None));

        // Zero distance against zero tolerance is not a difference
        let exact = ShapeComparator::new(SamplingStrategy::GridProjection, 50, 2, 0, 0.0).unwrap();
        assert!(!exact.are_different(Some(&a), Some(&a)));
    }
}
