// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! IFC-Diff - classify element changes between two model revisions.
//!
//! Loads two snapshot exports, compares the requested element types (or an
//! explicit identifier list, or one storey) and writes:
//!
//! - `Added_Elements.csv`, `Deleted_Elements.csv`, `Modified_Elements.csv`
//! - `Modified_Elements.json` and `Modified_Elements.txt` with per-element changes
//! - with `--scene`, `Geometry_v2.glb` (or `Geometry_<storey>_v1|v2.glb`)
//!   coloring added, deleted and modified elements

use anyhow::{Context, Result};
use clap::Parser;
use ifc_diff_core::{read_identifier_file, ModelSnapshot};
use ifc_diff_geometry::TessellationKernel;
use ifc_diff_processing::{
    build_scene, classify_ids, compare_storey, compare_types, compare_types_parallel,
    write_reports, write_scene, Classifier, ComparisonReport,
};

mod config;

use config::Args;

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,ifc_diff=debug".into()),
        )
        .init();

    let args = Args::parse();
    let policy = args.policy();
    let settings = args.kernel_settings();

    tracing::info!(
        before = %args.before.display(),
        after = %args.after.display(),
        policy = %serde_json::to_string(&policy)?,
        "Starting IFC-Diff"
    );

    let before = ModelSnapshot::open(&args.before)
        .with_context(|| format!("loading {}", args.before.display()))?;
    let after = ModelSnapshot::open(&args.after)
        .with_context(|| format!("loading {}", args.after.display()))?;

    let kernel = TessellationKernel::new();
    let classifier = Classifier::new(&before, &after, &kernel, settings, policy)
        .context("invalid check policy")?;

    let report = if let Some(path) = &args.ids {
        let ids = read_identifier_file(path, true)
            .with_context(|| format!("reading identifier list {}", path.display()))?;
        classify_ids(&classifier, &ids)
    } else if let Some(storey) = &args.storey {
        compare_storey(&classifier, &args.types, storey)?
    } else if args.parallel {
        compare_types_parallel(&classifier, &args.types)?
    } else {
        compare_types(&classifier, &args.types)?
    };

    print_summary(&report);

    let written = write_reports(&report, &args.output)
        .with_context(|| format!("writing reports to {}", args.output.display()))?;
    for path in written {
        println!("Generated report: {}", path.display());
    }

    if args.scene {
        let options = args.scene_options();
        let scene = build_scene(&classifier, &report, &options).context("meshing change scene")?;
        match write_scene(&scene, &args.output, &options)
            .with_context(|| format!("writing scene to {}", args.output.display()))?
        {
            Some(path) => println!("Exported scene: {}", path.display()),
            None => println!("No geometry to export for the selected categories"),
        }
    }
    Ok(())
}

fn print_summary(report: &ComparisonReport) {
    println!(
        "Added: {}  Deleted: {}  Modified: {}  Unmodified: {}",
        report.added.len(),
        report.deleted.len(),
        report.modified.len(),
        report.unmodified.len()
    );
    if !report.missing.is_empty() {
        println!("Not found in either revision: {}", report.missing.join(", "));
    }
    let moved: Vec<&str> = report
        .records
        .iter()
        .filter(|r| r.moved == Some(true))
        .map(|r| r.id.as_str())
        .collect();
    if !moved.is_empty() {
        println!("Moved: {}", moved.join(", "));
    }
}
