// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Command line options layered over the environment-derived policy.

use std::path::PathBuf;

use clap::Parser;
use ifc_diff_geometry::{KernelSettings, SamplingStrategy};
use ifc_diff_processing::{CheckPolicy, Revision, SceneCategory, SceneOptions};

/// Classify changes between two revisions of an IFC model
#[derive(Parser, Debug)]
#[command(name = "ifc-diff", version)]
pub struct Args {
    /// Snapshot export of the older revision
    #[arg(value_name = "V1")]
    pub before: PathBuf,

    /// Snapshot export of the newer revision
    #[arg(value_name = "V2")]
    pub after: PathBuf,

    /// Directory for the CSV, JSON and text reports
    #[arg(short = 'o', long = "output", value_name = "DIR", default_value = "ifc-diff-report")]
    pub output: PathBuf,

    /// IFC types to compare, comma separated
    #[arg(long, value_delimiter = ',', default_value = "IfcBuildingElement")]
    pub types: Vec<String>,

    /// Only compare elements on this storey
    #[arg(long, value_name = "NAME", conflicts_with = "ids")]
    pub storey: Option<String>,

    /// Compare the identifiers listed in this file instead of whole types
    #[arg(long, value_name = "FILE")]
    pub ids: Option<PathBuf>,

    /// Skip the property, quantity and relation check
    #[arg(long)]
    pub no_semantic: bool,

    /// Skip the geometric descriptor check
    #[arg(long)]
    pub no_geometry: bool,

    /// Skip the Hausdorff shape check
    #[arg(long)]
    pub no_shape: bool,

    /// Surface sampling strategy: area or grid
    #[arg(long, value_name = "STRATEGY")]
    pub sampling: Option<SamplingStrategy>,

    /// Surface points per mesh
    #[arg(long, value_name = "N")]
    pub samples: Option<usize>,

    /// Grid candidates per requested point
    #[arg(long, value_name = "N")]
    pub oversampling: Option<usize>,

    /// Hausdorff distance above which shapes differ
    #[arg(long, value_name = "T")]
    pub tolerance: Option<f64>,

    /// Translation length above which an element counts as moved
    #[arg(long, value_name = "T")]
    pub movement_tolerance: Option<f64>,

    /// Keep element placements local instead of world coordinates
    #[arg(long)]
    pub local_coords: bool,

    /// Classify shared elements on all cores
    #[arg(long)]
    pub parallel: bool,

    /// Also export the changes as a colored GLB model
    #[arg(long)]
    pub scene: bool,

    /// Scene layers to draw, comma separated
    #[arg(
        long,
        value_name = "CATEGORIES",
        value_delimiter = ',',
        default_values_t = SceneCategory::ALL.to_vec()
    )]
    pub scene_categories: Vec<SceneCategory>,

    /// Draw modified, unmodified and context elements in their V1 geometry
    #[arg(long)]
    pub scene_v1: bool,
}

impl Args {
    /// Policy from `IFC_DIFF_*` variables with command line overrides applied
    pub fn policy(&self) -> CheckPolicy {
        self.apply(CheckPolicy::from_env())
    }

    fn apply(&self, base: CheckPolicy) -> CheckPolicy {
        let mut policy = base;
        if self.no_semantic {
            policy.semantic = false;
        }
        if self.no_geometry {
            policy.geometric = false;
        }
        if self.no_shape {
            policy.shape = false;
        }
        if let Some(sampling) = self.sampling {
            policy.sampling = sampling;
        }
        if let Some(samples) = self.samples {
            policy.sample_count = samples;
        }
        if let Some(oversampling) = self.oversampling {
            policy.oversampling = oversampling;
        }
        if let Some(tolerance) = self.tolerance {
            policy.shape_tolerance = tolerance;
        }
        if let Some(tolerance) = self.movement_tolerance {
            policy.movement_tolerance = tolerance;
        }
        policy
    }

    pub fn scene_options(&self) -> SceneOptions {
        let mut options = SceneOptions::showing(&self.scene_categories);
        options.storey = self.storey.clone();
        if self.scene_v1 {
            options.revision = Revision::Before;
        }
        options
    }

    pub fn kernel_settings(&self) -> KernelSettings {
        KernelSettings {
            use_world_coords: !self.local_coords,
            ..KernelSettings::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_keep_base_policy() {
        let args = Args::try_parse_from(["ifc-diff", "v1.json", "v2.json"]).unwrap();
        assert_eq!(args.types, vec!["IfcBuildingElement"]);
        assert_eq!(args.output, PathBuf::from("ifc-diff-report"));
        assert_eq!(args.apply(CheckPolicy::default()), CheckPolicy::default());
        assert!(args.kernel_settings().use_world_coords);
        assert!(!args.scene);
        assert_eq!(args.scene_options(), SceneOptions::default());
    }

    #[test]
    fn test_scene_options() {
        let args = Args::try_parse_from([
            "ifc-diff",
            "v1.json",
            "v2.json",
            "--scene",
            "--scene-categories",
            "added,modified",
            "--storey",
            "Level 1",
            "--scene-v1",
        ])
        .unwrap();
        assert!(args.scene);
        let options = args.scene_options();
        assert!(options.added && options.modified);
        assert!(!options.deleted && !options.unmodified && !options.context);
        assert_eq!(options.file_name(), "Geometry_Level 1_v1.glb");

        let bad = Args::try_parse_from(["ifc-diff", "a", "b", "--scene-categories", "moved"]);
        assert!(bad.is_err());
    }

    #[test]
    fn test_overrides() {
        let args = Args::try_parse_from([
            "ifc-diff",
            "v1.json",
            "v2.json",
            "--types",
            "IfcWall,IfcDoor",
            "--no-shape",
            "--sampling",
            "area",
            "--samples",
            "80",
            "--tolerance",
            "0.05",
            "--parallel",
        ])
        .unwrap();
        assert_eq!(args.types, vec!["IfcWall", "IfcDoor"]);
        assert!(args.parallel);

        let policy = args.apply(CheckPolicy::default());
        assert!(policy.semantic && policy.geometric);
        assert!(!policy.shape);
        assert_eq!(policy.sampling, SamplingStrategy::AreaWeighted);
        assert_eq!(policy.sample_count, 80);
        assert_eq!(policy.shape_tolerance, 0.05);
    }

    #[test]
    fn test_storey_and_ids_conflict() {
        let result = Args::try_parse_from([
            "ifc-diff", "v1.json", "v2.json", "--storey", "Level 1", "--ids", "ids.txt",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_sampling_rejected() {
        let result =
            Args::try_parse_from(["ifc-diff", "v1.json", "v2.json", "--sampling", "poisson"]);
        assert!(result.is_err());
    }
}
