// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Colored change scene
//!
//! Merges the meshes of a run's added, deleted, modified and unmodified
//! elements, plus the surrounding building elements, into one GLB file with
//! one colored layer per category. Added elements come from the newer
//! revision, deleted ones from the older; the rest from the revision chosen
//! in [`SceneOptions::revision`].

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use ifc_diff_geometry::{encode_glb, GlbPrimitive, Matrix4, Mesh};
use rayon::prelude::*;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::classifier::Classifier;
use crate::error::{Error, Result};
use crate::pipeline::ComparisonReport;
use crate::resolver::partition;
use crate::storey::on_level;

/// Type whose instances fill the context layer
const CONTEXT_TYPE: &str = "IfcBuildingElement";

const NEUTRAL: [u8; 4] = [102, 102, 102, 255];

/// Layer of the change scene
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SceneCategory {
    Added,
    Deleted,
    Modified,
    Unmodified,
    /// Building elements in scope that the run did not list
    Context,
}

impl SceneCategory {
    pub const ALL: [SceneCategory; 5] = [
        SceneCategory::Added,
        SceneCategory::Deleted,
        SceneCategory::Modified,
        SceneCategory::Unmodified,
        SceneCategory::Context,
    ];

    /// RGBA face color of the layer
    pub fn color(self) -> [u8; 4] {
        match self {
            SceneCategory::Added => [0, 128, 0, 255],
            SceneCategory::Deleted => [120, 40, 40, 255],
            SceneCategory::Modified => [40, 60, 100, 255],
            SceneCategory::Unmodified | SceneCategory::Context => NEUTRAL,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SceneCategory::Added => "added",
            SceneCategory::Deleted => "deleted",
            SceneCategory::Modified => "modified",
            SceneCategory::Unmodified => "unmodified",
            SceneCategory::Context => "context",
        }
    }
}

impl fmt::Display for SceneCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SceneCategory {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_ascii_lowercase();
        SceneCategory::ALL
            .into_iter()
            .find(|c| c.as_str() == wanted || (wanted == "other" && *c == SceneCategory::Context))
            .ok_or_else(|| Error::InvalidScene(format!("unknown category {s:?}")))
    }
}

/// Revision whose geometry shows the shared elements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Revision {
    Before,
    #[default]
    After,
}

impl Revision {
    fn suffix(self) -> &'static str {
        match self {
            Revision::Before => "v1",
            Revision::After => "v2",
        }
    }
}

/// Which layers to draw and from which revision
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneOptions {
    pub added: bool,
    pub deleted: bool,
    pub modified: bool,
    pub unmodified: bool,
    pub context: bool,
    /// Limit the context layer to building elements on this storey
    pub storey: Option<String>,
    pub revision: Revision,
}

impl Default for SceneOptions {
    fn default() -> Self {
        Self {
            added: true,
            deleted: true,
            modified: true,
            unmodified: true,
            context: true,
            storey: None,
            revision: Revision::After,
        }
    }
}

impl SceneOptions {
    /// Options drawing exactly the given categories
    pub fn showing(categories: &[SceneCategory]) -> Self {
        let shown = |c| categories.contains(&c);
        Self {
            added: shown(SceneCategory::Added),
            deleted: shown(SceneCategory::Deleted),
            modified: shown(SceneCategory::Modified),
            unmodified: shown(SceneCategory::Unmodified),
            context: shown(SceneCategory::Context),
            ..Self::default()
        }
    }

    pub fn with_storey(mut self, storey: impl Into<String>) -> Self {
        self.storey = Some(storey.into());
        self
    }

    pub fn with_revision(mut self, revision: Revision) -> Self {
        self.revision = revision;
        self
    }

    pub fn shows(&self, category: SceneCategory) -> bool {
        match category {
            SceneCategory::Added => self.added,
            SceneCategory::Deleted => self.deleted,
            SceneCategory::Modified => self.modified,
            SceneCategory::Unmodified => self.unmodified,
            SceneCategory::Context => self.context,
        }
    }

    /// `Geometry_v2.glb`, or `Geometry_<storey>_v1.glb` / `_v2.glb` for a storey
    pub fn file_name(&self) -> String {
        match &self.storey {
            Some(storey) => format!("Geometry_{storey}_{}.glb", self.revision.suffix()),
            None => format!("Geometry_{}.glb", self.revision.suffix()),
        }
    }
}

/// Merged geometry of one category, in Y-up scene coordinates
#[derive(Debug, Clone)]
pub struct SceneLayer {
    pub category: SceneCategory,
    pub mesh: Mesh,
    /// Elements that contributed geometry
    pub elements: usize,
}

#[derive(Debug, Clone, Default)]
pub struct ChangeScene {
    pub layers: Vec<SceneLayer>,
}

impl ChangeScene {
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn layer(&self, category: SceneCategory) -> Option<&SceneLayer> {
        self.layers.iter().find(|l| l.category == category)
    }

    pub fn element_count(&self) -> usize {
        self.layers.iter().map(|l| l.elements).sum()
    }

    /// Binary glTF image of the scene
    pub fn to_glb(&self) -> Result<Vec<u8>> {
        let primitives: Vec<GlbPrimitive<'_>> = self
            .layers
            .iter()
            .map(|layer| GlbPrimitive {
                name: layer.category.as_str(),
                mesh: &layer.mesh,
                color: layer.category.color(),
            })
            .collect();
        Ok(encode_glb(&primitives)?)
    }
}

/// Model Z-up to glTF Y-up: (x, y, z) -> (x, z, -y)
fn z_up_to_y_up() -> Matrix4<f64> {
    Matrix4::new(
        1.0, 0.0, 0.0, 0.0, //
        0.0, 0.0, 1.0, 0.0, //
        0.0, -1.0, 0.0, 0.0, //
        0.0, 0.0, 0.0, 1.0,
    )
}

/// Building elements in the scene's scope that no run category lists.
///
/// Without a storey: every building element of the newer revision. With a
/// storey: shared building elements located on it in the newer revision.
pub fn context_ids(
    classifier: &Classifier<'_>,
    report: &ComparisonReport,
    options: &SceneOptions,
) -> Result<Vec<String>> {
    let listed: FxHashSet<&str> = [&report.added, &report.deleted, &report.modified, &report.unmodified]
        .into_iter()
        .flatten()
        .map(String::as_str)
        .collect();

    let candidates: Vec<String> = match &options.storey {
        None => classifier
            .after()
            .by_type(CONTEXT_TYPE)?
            .into_iter()
            .map(|e| e.id.clone())
            .collect(),
        Some(level) => partition(classifier.before(), classifier.after(), CONTEXT_TYPE)?
            .shared
            .into_iter()
            .filter(|id| on_level(id, classifier.after(), level) == Some(true))
            .collect(),
    };

    Ok(candidates
        .into_iter()
        .filter(|id| !listed.contains(id.as_str()))
        .collect())
}

/// Mesh every shown category of `report` into a scene.
///
/// Elements without geometry are skipped; categories without any geometry
/// produce no layer.
pub fn build_scene(
    classifier: &Classifier<'_>,
    report: &ComparisonReport,
    options: &SceneOptions,
) -> Result<ChangeScene> {
    let context = if options.context {
        context_ids(classifier, report, options)?
    } else {
        Vec::new()
    };
    let to_scene = z_up_to_y_up();

    let mut scene = ChangeScene::default();
    for category in SceneCategory::ALL {
        if !options.shows(category) {
            continue;
        }
        let (ids, revision) = match category {
            SceneCategory::Added => (&report.added, Revision::After),
            SceneCategory::Deleted => (&report.deleted, Revision::Before),
            SceneCategory::Modified => (&report.modified, options.revision),
            SceneCategory::Unmodified => (&report.unmodified, options.revision),
            SceneCategory::Context => (&context, options.revision),
        };

        let meshes: Vec<Mesh> = ids
            .par_iter()
            .filter_map(|id| match revision {
                Revision::Before => classifier.mesh_before(id),
                Revision::After => classifier.mesh_after(id),
            })
            .collect();
        if meshes.is_empty() {
            continue;
        }

        let mut mesh = Mesh::new();
        for part in &meshes {
            mesh.merge(part);
        }
        mesh.transform(&to_scene);
        tracing::debug!(
            category = category.as_str(),
            elements = meshes.len(),
            triangles = mesh.triangle_count(),
            "scene layer"
        );
        scene.layers.push(SceneLayer {
            category,
            mesh,
            elements: meshes.len(),
        });
    }
    Ok(scene)
}

/// Write the scene as GLB into `dir`; `None` when there is nothing to draw
pub fn write_scene(
    scene: &ChangeScene,
    dir: impl AsRef<Path>,
    options: &SceneOptions,
) -> Result<Option<PathBuf>> {
    if scene.is_empty() {
        tracing::info!("no geometry to export for the selected categories");
        return Ok(None);
    }
    let glb = scene.to_glb()?;
    let dir = dir.as_ref();
    fs::create_dir_all(dir)?;
    let path = dir.join(options.file_name());
    fs::write(&path, &glb)?;
    tracing::info!(
        path = %path.display(),
        bytes = glb.len(),
        elements = scene.element_count(),
        "exported change scene"
    );
    Ok(Some(path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ifc_diff_core::{Entity, ModelSnapshot, Representation, TessellatedItem};
    use ifc_diff_geometry::{KernelSettings, Point3, TessellationKernel};

    use crate::policy::CheckPolicy;

    static KERNEL: TessellationKernel = TessellationKernel;

    fn wall(id: &str, storey: &str, min: [f64; 3], max: [f64; 3]) -> Entity {
        let mesh = Mesh::cuboid(Point3::from(min), Point3::from(max));
        Entity::new(id, "IfcWall")
            .with_container(storey)
            .with_representation(Representation {
                placement: None,
                items: vec![TessellatedItem {
                    positions: mesh.positions,
                    indices: mesh.indices,
                }],
            })
    }

    fn snapshot(walls: Vec<Entity>) -> ModelSnapshot {
        let mut snapshot = ModelSnapshot::new();
        for storey in ["l0", "l1"] {
            let name = if storey == "l0" { "Ground" } else { "Upper" };
            snapshot
                .insert(Entity::new(storey, "IfcBuildingStorey").with_name(name))
                .unwrap();
        }
        for wall in walls {
            snapshot.insert(wall).unwrap();
        }
        snapshot
    }

    fn report() -> ComparisonReport {
        ComparisonReport {
            added: vec!["new".into()],
            deleted: vec!["gone".into()],
            modified: vec!["changed".into()],
            ..Default::default()
        }
    }

    fn revisions() -> (ModelSnapshot, ModelSnapshot) {
        let v1 = snapshot(vec![
            wall("gone", "l0", [0.0, 0.0, 0.0], [1.0, 1.0, 1.0]),
            wall("changed", "l0", [0.0, 0.0, 0.0], [1.0, 1.0, 1.0]),
            wall("kept", "l1", [0.0, 0.0, 3.0], [1.0, 1.0, 4.0]),
        ]);
        let v2 = snapshot(vec![
            wall("new", "l0", [5.0, 0.0, 0.0], [6.0, 1.0, 1.0]),
            wall("changed", "l0", [0.0, 0.0, 0.0], [1.0, 1.0, 2.0]),
            wall("kept", "l1", [0.0, 0.0, 3.0], [1.0, 1.0, 4.0]),
        ]);
        (v1, v2)
    }

    #[test]
    fn test_category_parsing() {
        assert_eq!("Added".parse::<SceneCategory>().unwrap(), SceneCategory::Added);
        assert_eq!("other".parse::<SceneCategory>().unwrap(), SceneCategory::Context);
        assert!(matches!("moved".parse::<SceneCategory>(), Err(Error::InvalidScene(_))));
        assert_eq!(SceneCategory::Modified.to_string(), "modified");
    }

    #[test]
    fn test_file_names() {
        assert_eq!(SceneOptions::default().file_name(), "Geometry_v2.glb");
        let storey = SceneOptions::default()
            .with_storey("Level 1")
            .with_revision(Revision::Before);
        assert_eq!(storey.file_name(), "Geometry_Level 1_v1.glb");
    }

    #[test]
    fn test_layers_per_category() {
        let (v1, v2) = revisions();
        let c = Classifier::new(&v1, &v2, &KERNEL, KernelSettings::default(), CheckPolicy::default())
            .unwrap();
        let report = report();

        assert_eq!(context_ids(&c, &report, &SceneOptions::default()).unwrap(), vec!["kept"]);
        let on_ground = SceneOptions::default().with_storey("ground");
        assert!(context_ids(&c, &report, &on_ground).unwrap().is_empty());

        let scene = build_scene(&c, &report, &SceneOptions::default()).unwrap();
        let categories: Vec<SceneCategory> = scene.layers.iter().map(|l| l.category).collect();
        assert_eq!(
            categories,
            vec![
                SceneCategory::Added,
                SceneCategory::Deleted,
                SceneCategory::Modified,
                SceneCategory::Context,
            ]
        );
        assert_eq!(scene.element_count(), 4);

        // model z becomes scene y: the modified wall is 2 high in v2
        let (min, max) = scene.layer(SceneCategory::Modified).unwrap().mesh.bounds();
        assert!((max.y - min.y - 2.0).abs() < 1e-9);
        let v1_view = SceneOptions::default().with_revision(Revision::Before);
        let scene = build_scene(&c, &report, &v1_view).unwrap();
        let (min, max) = scene.layer(SceneCategory::Modified).unwrap().mesh.bounds();
        assert!((max.y - min.y - 1.0).abs() < 1e-9);
        // added walls stay in their v2 geometry
        assert!(scene.layer(SceneCategory::Added).is_some());
    }

    #[test]
    fn test_hidden_categories_and_empty_scene() {
        let (v1, v2) = revisions();
        let c = Classifier::new(&v1, &v2, &KERNEL, KernelSettings::default(), CheckPolicy::default())
            .unwrap();
        let only_added = SceneOptions::showing(&[SceneCategory::Added]);
        let scene = build_scene(&c, &report(), &only_added).unwrap();
        assert_eq!(scene.layers.len(), 1);

        let nothing = SceneOptions::showing(&[]);
        let scene = build_scene(&c, &report(), &nothing).unwrap();
        assert!(scene.is_empty());
        let dir = std::env::temp_dir().join(format!("ifc-diff-empty-scene-{}", std::process::id()));
        assert_eq!(write_scene(&scene, &dir, &nothing).unwrap(), None);
        assert!(!dir.join(nothing.file_name()).exists());
    }

    #[test]
    fn test_write_scene() {
        let (v1, v2) = revisions();
        let c = Classifier::new(&v1, &v2, &KERNEL, KernelSettings::default(), CheckPolicy::default())
            .unwrap();
        let options = SceneOptions::default();
        let scene = build_scene(&c, &report(), &options).unwrap();

        let dir = std::env::temp_dir().join(format!("ifc-diff-scene-{}", std::process::id()));
        let path = write_scene(&scene, &dir, &options).unwrap().unwrap();
        assert_eq!(path.file_name().unwrap(), "Geometry_v2.glb");
        let bytes = fs::read(&path).unwrap();
        assert_eq!(&bytes[0..4], b"glTF");
        fs::remove_dir_all(&dir).unwrap();
    }
}
