// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # IFC-Diff Processing
//!
//! Change classification between two model revisions.
//!
//! A run partitions identifiers into added, deleted and shared sets
//! ([`resolver`], optionally scoped to one storey by [`storey`]), classifies
//! every shared entity with the checks enabled in a [`CheckPolicy`]
//! ([`Classifier`]) and collects the outcome in a [`ComparisonReport`], which
//! the [`report`] module writes as CSV, JSON and text. The [`scene`] module
//! draws the same outcome as one colored GLB model.
//!
//! ```rust,ignore
//! use ifc_diff_core::ModelSnapshot;
//! use ifc_diff_geometry::{KernelSettings, TessellationKernel};
//! use ifc_diff_processing::{compare_types, write_reports, CheckPolicy, Classifier};
//!
//! let v1 = ModelSnapshot::open("model_v1.json")?;
//! let v2 = ModelSnapshot::open("model_v2.json")?;
//! let kernel = TessellationKernel::new();
//! let classifier = Classifier::new(&v1, &v2, &kernel, KernelSettings::default(), CheckPolicy::from_env())?;
//! let report = compare_types(&classifier, &["IfcWall", "IfcDoor"])?;
//! write_reports(&report, "out")?;
//! ```

pub mod change;
pub mod classifier;
pub mod error;
pub mod pipeline;
pub mod policy;
pub mod report;
pub mod resolver;
pub mod scene;
pub mod semantic;
pub mod storey;

pub use change::{ChangeItem, ChangeRecord, ChangeStatus, ModificationType};
pub use classifier::Classifier;
pub use error::{Error, Result};
pub use pipeline::{
    classify_ids, compare_storey, compare_types, compare_types_parallel, ComparisonReport,
    ElementInfo,
};
pub use policy::CheckPolicy;
pub use report::write_reports;
pub use resolver::{exists, partition, partition_types, Partition};
pub use scene::{build_scene, write_scene, ChangeScene, Revision, SceneCategory, SceneOptions};
pub use semantic::{GraphDiff, SemanticGraph};
pub use storey::{on_level, scoped_partition};
