// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Check policy: which comparisons run and how they are tuned.

use ifc_diff_geometry::{SamplingStrategy, ShapeComparator};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Enabled checks and their parameters for one comparison run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckPolicy {
    /// Compare property sets, quantity sets and relations.
    pub semantic: bool,
    /// Compare geometric descriptors.
    pub geometric: bool,
    /// Compare surface samples by Hausdorff distance.
    pub shape: bool,
    pub sampling: SamplingStrategy,
    /// Requested surface points per mesh.
    pub sample_count: usize,
    /// Grid candidates per requested point (grid projection only).
    pub oversampling: usize,
    /// Hausdorff distance above which shapes differ.
    pub shape_tolerance: f64,
    /// Translation length above which an entity counts as moved.
    pub movement_tolerance: f64,
    /// Seed for the area-weighted sampler.
    pub seed: u64,
}

impl Default for CheckPolicy {
    fn default() -> Self {
        Self {
            semantic: true,
            geometric: true,
            shape: true,
            sampling: SamplingStrategy::GridProjection,
            sample_count: 50,
            oversampling: 2,
            shape_tolerance: 0.01,
            movement_tolerance: 0.01,
            seed: 0,
        }
    }
}

impl CheckPolicy {
    /// Load the policy from `IFC_DIFF_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load the policy from any key lookup. Unparsable values keep their default.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            semantic: lookup("IFC_DIFF_CHECK_SEMANTIC")
                .and_then(|v| parse_flag(&v))
                .unwrap_or(defaults.semantic),
            geometric: lookup("IFC_DIFF_CHECK_GEOMETRY")
                .and_then(|v| parse_flag(&v))
                .unwrap_or(defaults.geometric),
            shape: lookup("IFC_DIFF_CHECK_SHAPE")
                .and_then(|v| parse_flag(&v))
                .unwrap_or(defaults.shape),
            sampling: lookup("IFC_DIFF_SAMPLING")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.sampling),
            sample_count: lookup("IFC_DIFF_SAMPLE_COUNT")
                .unwrap_or_else(|| "50".into())
                .parse()
                .unwrap_or(defaults.sample_count),
            oversampling: lookup("IFC_DIFF_OVERSAMPLING")
                .unwrap_or_else(|| "2".into())
                .parse()
                .unwrap_or(defaults.oversampling),
            shape_tolerance: lookup("IFC_DIFF_SHAPE_TOLERANCE")
                .unwrap_or_else(|| "0.01".into())
                .parse()
                .unwrap_or(defaults.shape_tolerance),
            movement_tolerance: lookup("IFC_DIFF_MOVEMENT_TOLERANCE")
                .unwrap_or_else(|| "0.01".into())
                .parse()
                .unwrap_or(defaults.movement_tolerance),
            seed: defaults.seed,
        }
    }

    /// Reject parameter combinations no comparator can run with.
    pub fn validate(&self) -> Result<()> {
        if self.sample_count == 0 {
            return Err(Error::InvalidPolicy(
                "sample_count must be at least 1".to_string(),
            ));
        }
        if self.oversampling == 0 {
            return Err(Error::InvalidPolicy(
                "oversampling must be at least 1".to_string(),
            ));
        }
        for (name, value) in [
            ("shape_tolerance", self.shape_tolerance),
            ("movement_tolerance", self.movement_tolerance),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::InvalidPolicy(format!(
                    "{name} must be a finite non-negative number, got {value}"
                )));
            }
        }
        Ok(())
    }

    /// True if at least one check is enabled.
    pub fn any_enabled(&self) -> bool {
        self.semantic || self.geometric || self.shape
    }

    /// Policy with every check enabled and the same tuning.
    pub fn all_checks(&self) -> Self {
        Self {
            semantic: true,
            geometric: true,
            shape: true,
            ..self.clone()
        }
    }

    /// Shape comparator configured from this policy.
    pub fn shape_comparator(&self) -> Result<ShapeComparator> {
        self.validate()?;
        Ok(ShapeComparator::new(
            self.sampling,
            self.sample_count,
            self.oversampling,
            self.seed,
            self.shape_tolerance,
        )?)
    }

    pub fn with_semantic(mut self, enabled: bool) -> Self {
        self.semantic = enabled;
        self
    }

    pub fn with_geometric(mut self, enabled: bool) -> Self {
        self.geometric = enabled;
        self
    }

    pub fn with_shape(mut self, enabled: bool) -> Self {
        self.shape = enabled;
        self
    }

    pub fn with_sampling(mut self, sampling: SamplingStrategy) -> Self {
        self.sampling = sampling;
        self
    }

    pub fn with_sample_count(mut self, sample_count: usize) -> Self {
        self.sample_count = sample_count;
        self
    }

    pub fn with_oversampling(mut self, oversampling: usize) -> Self {
        self.oversampling = oversampling;
        self
    }

    pub fn with_shape_tolerance(mut self, tolerance: f64) -> Self {
        self.shape_tolerance = tolerance;
        self
    }

    pub fn with_movement_tolerance(mut self, tolerance: f64) -> Self {
        self.movement_tolerance = tolerance;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rustc_hash::FxHashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: FxHashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let policy = CheckPolicy::default();
        assert!(policy.semantic && policy.geometric && policy.shape);
        assert_eq!(policy.sampling, SamplingStrategy::GridProjection);
        assert_eq!(policy.sample_count, 50);
        assert_eq!(policy.oversampling, 2);
        assert_eq!(policy.shape_tolerance, 0.01);
        assert_eq!(policy.movement_tolerance, 0.01);
        assert!(policy.validate().is_ok());
    }

    #[test]
    fn test_from_lookup_overrides() {
        let policy = CheckPolicy::from_lookup(lookup(&[
            ("IFC_DIFF_CHECK_SEMANTIC", "false"),
            ("IFC_DIFF_CHECK_SHAPE", "0"),
            ("IFC_DIFF_SAMPLING", "area"),
            ("IFC_DIFF_SAMPLE_COUNT", "120"),
            ("IFC_DIFF_SHAPE_TOLERANCE", "0.05"),
        ]));
        assert!(!policy.semantic);
        assert!(policy.geometric);
        assert!(!policy.shape);
        assert_eq!(policy.sampling, SamplingStrategy::AreaWeighted);
        assert_eq!(policy.sample_count, 120);
        assert_eq!(policy.shape_tolerance, 0.05);
    }

    #[test]
    fn test_from_lookup_falls_back_on_garbage() {
        let policy = CheckPolicy::from_lookup(lookup(&[
            ("IFC_DIFF_CHECK_GEOMETRY", "maybe"),
            ("IFC_DIFF_SAMPLING", "poisson"),
            ("IFC_DIFF_OVERSAMPLING", "lots"),
        ]));
        assert_eq!(policy, CheckPolicy::default());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        assert!(CheckPolicy::default().with_oversampling(0).validate().is_err());
        assert!(matches!(
            CheckPolicy::default().with_sample_count(0).validate(),
            Err(Error::InvalidPolicy(msg)) if msg.contains("sample_count")
        ));
        assert!(CheckPolicy::default().with_sample_count(1).validate().is_ok());
        assert!(CheckPolicy::default()
            .with_shape_tolerance(-1.0)
            .validate()
            .is_err());
        assert!(matches!(
            CheckPolicy::default()
                .with_movement_tolerance(f64::NAN)
                .shape_comparator(),
            Err(Error::InvalidPolicy(_))
        ));
    }

    #[test]
    fn test_any_enabled() {
        let none = CheckPolicy::default()
            .with_semantic(false)
            .with_geometric(false)
            .with_shape(false);
        assert!(!none.any_enabled());
        assert!(none.all_checks().any_enabled());
    }

    #[test]
    fn test_deserialize_partial() {
        let policy: CheckPolicy = serde_json::from_str(r#"{"shape": false}"#).unwrap();
        assert!(!policy.shape);
        assert_eq!(policy.sample_count, 50);
    }
}
