use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::cli::StatusArgs;
use crate::model::SplitRunManifest;
use crate::util::read_json;

pub fn run(args: StatusArgs) -> Result<()> {
    let manifest_dir = args.out_dir.join("manifests");

    info!(out_dir = %args.out_dir.display(), "status requested");

    let Some(manifest_path) = latest_split_manifest(&manifest_dir)? else {
        warn!(path = %manifest_dir.display(), "no split run manifest found");
        return Ok(());
    };

    let manifest: SplitRunManifest = read_json(&manifest_path)?;
    info!(
        path = %manifest_path.display(),
        run_id = %manifest.run_id,
        status = %manifest.status,
        started_at = %manifest.started_at,
        updated_at = %manifest.updated_at,
        language = %manifest.language,
        output_mode = %manifest.output_mode,
        documents = manifest.counts.document_count,
        completed = manifest.counts.completed_count,
        skipped = manifest.counts.skipped_count,
        failed = manifest.counts.failed_count,
        fragments = manifest.counts.fragments_written,
        "loaded split run manifest"
    );

    for record in &manifest.documents {
        if record.status == "completed" {
            info!(
                file = %record.filename,
                chapters = record.chapters.len(),
                fragments = record.written_files.len(),
                "document split"
            );
        } else {
            warn!(
                file = %record.filename,
                status = %record.status,
                reason = %record.failure_reason.clone().unwrap_or_default(),
                "document not split"
            );
        }
    }

    Ok(())
}

/// Manifest names embed a sortable UTC timestamp, so the greatest name is the
/// most recent run.
pub fn latest_split_manifest(manifest_dir: &Path) -> Result<Option<PathBuf>> {
    if !manifest_dir.exists() {
        return Ok(None);
    }

    let entries = fs::read_dir(manifest_dir)
        .with_context(|| format!("failed to read {}", manifest_dir.display()))?;

    let mut latest: Option<PathBuf> = None;
    for entry in entries {
        let entry = entry
            .with_context(|| format!("failed to read entry in {}", manifest_dir.display()))?;
        let path = entry.path();
        let is_split_manifest = path
            .file_name()
            .and_then(|name| name.to_str())
            .map(|name| name.starts_with("split_run_") && name.ends_with(".json"))
            .unwrap_or(false);
        if !is_split_manifest {
            continue;
        }
        if latest.as_ref().map(|current| path > *current).unwrap_or(true) {
            latest = Some(path);
        }
    }

    Ok(latest)
}
