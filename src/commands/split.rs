use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result, bail};
use chrono::Utc;
use tracing::{info, warn};

use crate::chapters::{ChapterResolver, MatchProfile};
use crate::cli::{OutputMode, SplitArgs};
use crate::commands::inventory;
use crate::error::SplitError;
use crate::model::{
    DocumentEntry, DocumentSplitRecord, SplitCounts, SplitRunManifest, ToolVersions,
};
use crate::util::{
    command_version_optional, ensure_directory, now_utc_string, read_json, utc_compact_string,
    write_json_pretty,
};

mod convert;
mod load;
mod scan_detect;
#[cfg(test)]
mod tests;
mod write;

use load::load_document;
use write::FragmentWriter;

/// Settings shared by every document of one split run.
struct SplitContext<'a> {
    resolver: ChapterResolver,
    writer: FragmentWriter,
    allow_list: Option<BTreeMap<String, bool>>,
    args: &'a SplitArgs,
}

pub fn run(args: SplitArgs) -> Result<()> {
    let started_ts = Utc::now();
    let started_at = now_utc_string();
    let run_id = format!("split-{}", utc_compact_string(started_ts));

    ensure_directory(&args.out_dir)?;
    let manifest_path = args.split_manifest_path.clone().unwrap_or_else(|| {
        args.out_dir
            .join("manifests")
            .join(format!("split_run_{}.json", utc_compact_string(started_ts)))
    });

    info!(
        input_dir = %args.input_dir.display(),
        out_dir = %args.out_dir.display(),
        run_id = %run_id,
        language = args.language.as_str(),
        "starting split"
    );

    let profile = load_profile(args.profile.as_deref())?;
    let allow_list = load_allow_list(args.chapters.as_deref())?;
    let context = SplitContext {
        resolver: ChapterResolver::new(args.language, profile)
            .context("failed to build chapter resolver")?,
        writer: FragmentWriter::new()?,
        allow_list,
        args: &args,
    };

    let inventory = inventory::build_manifest(&args.input_dir)?;

    let mut documents = Vec::<DocumentSplitRecord>::new();
    let mut warnings = Vec::<String>::new();

    for filename in &inventory.unsupported_files {
        let error = SplitError::UnsupportedFormat(filename.clone());
        warnings.push(format!("{filename}: {error}"));
        documents.push(failed_record(filename, None, &anyhow::Error::new(error)));
    }

    for entry in &inventory.documents {
        match split_document(&context, entry) {
            Ok(record) => {
                if let Some(reason) = &record.failure_reason {
                    warnings.push(format!("{}: {}", entry.filename, reason));
                }
                documents.push(record);
            }
            Err(error) => {
                warn!(file = %entry.filename, error = %error, "document failed");
                warnings.push(format!("{}: {:#}", entry.filename, error));
                documents.push(failed_record(&entry.filename, Some(entry), &error));
            }
        }
    }

    let counts = summarize(&documents);
    let status = if counts.failed_count == counts.document_count {
        "failed"
    } else {
        "completed"
    };

    let manifest = SplitRunManifest {
        manifest_version: 1,
        run_id,
        status: status.to_string(),
        started_at,
        updated_at: now_utc_string(),
        command: render_split_command(&args),
        language: args.language.as_str().to_string(),
        chapter_num: args.chapter_num,
        output_mode: args.output.as_str().to_string(),
        source_directory: args.input_dir.display().to_string(),
        output_directory: args.out_dir.display().to_string(),
        tool_versions: collect_tool_versions(),
        counts: counts.clone(),
        documents,
        warnings,
    };

    write_json_pretty(&manifest_path, &manifest)?;
    info!(path = %manifest_path.display(), "wrote split run manifest");

    if counts.failed_count == counts.document_count {
        bail!(
            "every document failed to split; see {}",
            manifest_path.display()
        );
    }

    info!(
        documents = counts.document_count,
        completed = counts.completed_count,
        skipped = counts.skipped_count,
        failed = counts.failed_count,
        fragments = counts.fragments_written,
        "split completed"
    );

    Ok(())
}

fn split_document(context: &SplitContext<'_>, entry: &DocumentEntry) -> Result<DocumentSplitRecord> {
    let args = context.args;
    let path = args.input_dir.join(&entry.filename);
    let converted_dir = args.out_dir.join("converted");

    let mut nodes = load_document(&path, entry.format, &converted_dir, args.min_text_chars)?;
    let resolution = context
        .resolver
        .resolve(&mut nodes, args.chapter_num)
        .with_context(|| format!("failed to resolve chapters for {}", path.display()))?;

    let mut record = DocumentSplitRecord {
        filename: entry.filename.clone(),
        format: Some(entry.format),
        sha256: Some(entry.sha256.clone()),
        status: "completed".to_string(),
        failure_reason: None,
        node_count: nodes.len(),
        toc_index: Some(resolution.toc_index),
        dictionary_size: resolution.dictionary_size,
        chapters: resolution.ranges(&nodes),
        selected_chapters: None,
        hidden_node_count: 0,
        written_files: Vec::new(),
    };

    if resolution.matches.is_empty() {
        warn!(file = %entry.filename, "no chapter heading found in document body");
    }

    let chapters = match &context.allow_list {
        Some(allow_list) => {
            match context
                .resolver
                .apply_allow_list(&mut nodes, &resolution, allow_list)
            {
                Ok((selected, hidden)) => {
                    record.selected_chapters = Some(selected.clone());
                    record.hidden_node_count = hidden;
                    selected
                }
                Err(error) => {
                    warn!(file = %entry.filename, error = %error, "skipping document");
                    record.status = "skipped".to_string();
                    record.failure_reason = Some(error.to_string());
                    return Ok(record);
                }
            }
        }
        None => resolution.labels(),
    };

    let written = context.writer.write(
        &nodes,
        &args.out_dir,
        &entry.filename,
        args.output,
        &chapters,
    )?;
    record.written_files = written
        .iter()
        .map(|path| path.display().to_string())
        .collect();

    info!(
        file = %entry.filename,
        nodes = record.node_count,
        chapters = record.chapters.len(),
        fragments = record.written_files.len(),
        "split document"
    );

    Ok(record)
}

fn failed_record(
    filename: &str,
    entry: Option<&DocumentEntry>,
    error: &anyhow::Error,
) -> DocumentSplitRecord {
    DocumentSplitRecord {
        filename: filename.to_string(),
        format: entry.map(|value| value.format),
        sha256: entry.map(|value| value.sha256.clone()),
        status: "failed".to_string(),
        failure_reason: Some(format!("{error:#}")),
        node_count: 0,
        toc_index: None,
        dictionary_size: 0,
        chapters: Vec::new(),
        selected_chapters: None,
        hidden_node_count: 0,
        written_files: Vec::new(),
    }
}

fn summarize(documents: &[DocumentSplitRecord]) -> SplitCounts {
    let count_status = |status: &str| {
        documents
            .iter()
            .filter(|record| record.status == status)
            .count()
    };

    SplitCounts {
        document_count: documents.len(),
        completed_count: count_status("completed"),
        skipped_count: count_status("skipped"),
        failed_count: count_status("failed"),
        fragments_written: documents
            .iter()
            .map(|record| record.written_files.len())
            .sum(),
    }
}

fn load_profile(path: Option<&Path>) -> Result<MatchProfile> {
    let Some(path) = path else {
        return Ok(MatchProfile::default());
    };

    let profile: MatchProfile = read_json(path)?;
    info!(path = %path.display(), "loaded match profile");
    Ok(profile)
}

fn load_allow_list(path: Option<&Path>) -> Result<Option<BTreeMap<String, bool>>> {
    let Some(path) = path else {
        return Ok(None);
    };

    let allow_list: BTreeMap<String, bool> = read_json(path)?;
    info!(
        path = %path.display(),
        approved = allow_list.values().filter(|approved| **approved).count(),
        "loaded chapter allow-list"
    );
    Ok(Some(allow_list))
}

fn collect_tool_versions() -> ToolVersions {
    ToolVersions {
        unoconv: command_version_optional("unoconv", &["--version"]),
        pdftotext: command_version_optional("pdftotext", &["-v"]),
    }
}

fn render_split_command(args: &SplitArgs) -> String {
    let mut command = vec![
        "chapter-split".to_string(),
        "split".to_string(),
        "--input-dir".to_string(),
        args.input_dir.display().to_string(),
        "--out-dir".to_string(),
        args.out_dir.display().to_string(),
        "--chapter-num".to_string(),
        args.chapter_num.to_string(),
        "--language".to_string(),
        args.language.as_str().to_string(),
    ];

    if let Some(path) = &args.chapters {
        command.push("--chapters".to_string());
        command.push(path.display().to_string());
    }
    if args.output != OutputMode::Combine {
        command.push("--output".to_string());
        command.push(args.output.as_str().to_string());
    }
    if let Some(path) = &args.profile {
        command.push("--profile".to_string());
        command.push(path.display().to_string());
    }
    command.push("--min-text-chars".to_string());
    command.push(args.min_text_chars.to_string());
    if let Some(path) = &args.split_manifest_path {
        command.push("--split-manifest-path".to_string());
        command.push(path.display().to_string());
    }

    command.join(" ")
}
