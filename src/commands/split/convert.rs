use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{Context, Result, bail};
use tracing::info;

use crate::util::ensure_directory;

/// Converts a word-processor or PDF file to HTML with `unoconv`.
pub fn convert_to_html(source: &Path, converted_dir: &Path) -> Result<PathBuf> {
    ensure_directory(converted_dir)?;

    let stem = source
        .file_stem()
        .and_then(|stem| stem.to_str())
        .with_context(|| format!("invalid UTF-8 filename: {}", source.display()))?;
    let output_path = converted_dir.join(format!("{stem}.html"));

    let output = Command::new("unoconv")
        .arg("-f")
        .arg("html")
        .arg("-o")
        .arg(&output_path)
        .arg(source)
        .output()
        .with_context(|| format!("failed to execute unoconv for {}", source.display()))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!(
            "unoconv returned non-zero exit status for {}: {}",
            source.display(),
            stderr.trim()
        );
    }

    if !output_path.exists() {
        bail!(
            "unoconv did not produce {} for {}",
            output_path.display(),
            source.display()
        );
    }

    info!(source = %source.display(), html = %output_path.display(), "converted document to html");
    Ok(output_path)
}
