//! One full synchronization pass, wiring the collaborators together.

use std::path::Path;

use anyhow::{Context, Result};

use crate::catalog::Catalog;
use crate::config::Config;
use crate::manifest::Manifest;
use crate::marker::Marker;
use crate::positions::{resolve_skip_list, PositionSource, SkipPolicy};
use crate::reconcile::{Engine, Report};
use crate::tracker::IssueTracker;

/// Resolve the skip list, reconcile the tracker against `catalog`, and write
/// the manifest.
///
/// Live runs always write the manifest; dry runs only when
/// `write_manifest_in_dry_run` is set. Any error returns before the manifest
/// is touched.
pub async fn sync(
    config: &Config,
    catalog: &Catalog,
    positions: &dyn PositionSource,
    tracker: &dyn IssueTracker,
    dry_run: bool,
) -> Result<Report> {
    let marker = Marker::new(&config.marker_prefix).context("Invalid marker prefix")?;
    let skip_list = resolve_skip_list(positions, &SkipPolicy::from_config(config)).await?;

    let report = Engine::new(catalog, &skip_list, &marker, config.label.as_str())
        .dry_run(dry_run)
        .run(tracker)
        .await?;

    if !dry_run || config.write_manifest_in_dry_run {
        log_changes(&report.manifest, &config.manifest_path);
        report.manifest.write(&config.manifest_path)?;
    } else {
        tracing::info!(
            entries = report.manifest.len(),
            "Dry run, not writing manifest"
        );
    }

    Ok(report)
}

/// Log what the new manifest adds and drops. An unreadable previous file is
/// only reported; it never blocks writing the new one.
fn log_changes(manifest: &Manifest, path: &Path) {
    match Manifest::load(path) {
        Ok(previous) => {
            let diff = manifest.diff(&previous);
            tracing::info!(
                added = diff.added.len(),
                removed = diff.removed.len(),
                "Manifest changes"
            );
        }
        Err(e) => {
            tracing::warn!(error = %format!("{:#}", e), "Previous manifest unreadable, replacing it");
        }
    }
}
