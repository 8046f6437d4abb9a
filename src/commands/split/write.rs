use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use regex::Regex;
use tracing::debug;

use crate::chapters::is_hidden;
use crate::cli::OutputMode;
use crate::model::{ContentNode, NodeKind};
use crate::util::ensure_directory;

pub struct FragmentWriter {
    line_style: Regex,
}

impl FragmentWriter {
    pub fn new() -> Result<Self> {
        Ok(Self {
            line_style: Regex::new(
                r#"(?i)(<line\b[^>]*?)\s+style\s*=\s*(?:"[^"]*"|'[^']*')"#,
            )
            .context("failed to compile line style regex")?,
        })
    }

    /// Writes the labelled nodes of one document and returns the files created.
    pub fn write(
        &self,
        nodes: &[ContentNode],
        out_dir: &Path,
        filename: &str,
        mode: OutputMode,
        chapters: &[String],
    ) -> Result<Vec<PathBuf>> {
        ensure_directory(out_dir)?;

        match mode {
            OutputMode::Combine => chapters
                .iter()
                .map(|chapter| -> Result<PathBuf> {
                    let body = nodes
                        .iter()
                        .filter(|node| node.kind != NodeKind::Image)
                        .filter(|node| node.chapter_str() == Some(chapter.as_str()))
                        .filter(|node| !is_hidden(node))
                        .map(|node| self.render_node(node, true))
                        .collect::<String>();
                    let path = out_dir.join(format!("{filename}_{chapter}.html"));
                    write_file(&path, &body)?;
                    Ok(path)
                })
                .collect(),
            OutputMode::Whole => {
                let body = nodes
                    .iter()
                    .filter(|node| !node.nested)
                    .map(|node| self.render_node(node, false))
                    .collect::<Vec<String>>()
                    .join("\n");
                let document = format!(
                    "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"></head>\n<body>\n{body}\n</body>\n</html>\n"
                );
                let path = out_dir.join(format!("{filename}.html"));
                write_file(&path, &document)?;
                Ok(vec![path])
            }
        }
    }

    /// Serializes one node with its chapter attribute. Fragments drop style
    /// attributes from the node and its `line` children; the whole-document
    /// form keeps authored style and the hidden marker.
    pub fn render_node(&self, node: &ContentNode, fragment: bool) -> String {
        let tag = node.kind.tag();
        let mut out = format!("<{tag}");
        for (name, value) in &node.attributes {
            push_attribute(&mut out, name, value);
        }
        if let Some(chapter) = node.chapter_str() {
            push_attribute(&mut out, "chapter", chapter);
        }
        if !fragment {
            if let Some(style) = &node.style {
                push_attribute(&mut out, "style", style);
            }
        }

        if node.kind == NodeKind::Image {
            out.push_str("/>");
            return out;
        }

        out.push('>');
        if fragment {
            out.push_str(&self.line_style.replace_all(&node.inner_html, "$1"));
        } else {
            out.push_str(&node.inner_html);
        }
        out.push_str(&format!("</{tag}>"));
        out
    }
}

fn push_attribute(out: &mut String, name: &str, value: &str) {
    out.push(' ');
    out.push_str(name);
    out.push_str("=\"");
    out.push_str(&escape_attribute(value));
    out.push('"');
}

fn escape_attribute(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    fs::write(path, contents).with_context(|| format!("failed to write {}", path.display()))?;
    debug!(path = %path.display(), bytes = contents.len(), "wrote fragment");
    Ok(())
}
