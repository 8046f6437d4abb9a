use std::collections::{BTreeMap, HashSet};

use tracing::info;

use crate::model::ContentNode;

use super::language::TitleNormalizer;
use super::similarity::quick_ratio;

pub const HIDDEN_MARKER: &str = "display:none;";

/// Maps every approved title onto the closest resolved chapter label. An
/// approved title with no label above `threshold` empties the selection.
pub fn select_chapters(
    normalizer: &TitleNormalizer,
    allow_list: &BTreeMap<String, bool>,
    labels: &[String],
    threshold: f64,
) -> Vec<String> {
    let label_tokens = labels
        .iter()
        .map(|label| normalizer.normalize(label))
        .collect::<Vec<String>>();

    let mut selected = Vec::<String>::new();
    for (title, approved) in allow_list {
        if !approved {
            continue;
        }

        let tokens = normalizer.normalize(title);
        let mut best: Option<(usize, f64)> = None;
        for (index, label) in label_tokens.iter().enumerate() {
            let ratio = if label.is_empty() {
                0.0
            } else {
                quick_ratio(&tokens, label)
            };
            if best.map(|(_, score)| ratio > score).unwrap_or(true) {
                best = Some((index, ratio));
            }
        }

        match best {
            Some((index, score)) if score >= threshold => {
                if !selected.contains(&labels[index]) {
                    selected.push(labels[index].clone());
                }
            }
            _ => {
                info!(chapter = %title, "current document does not contain approved chapter");
                return Vec::new();
            }
        }
    }

    selected
}

/// Marks nodes outside the selection, or without visible text, as hidden.
/// Returns the number of nodes marked.
pub fn hide_unselected(nodes: &mut [ContentNode], selected: &[String]) -> usize {
    let selected = selected.iter().map(String::as_str).collect::<HashSet<&str>>();
    let mut hidden = 0usize;

    for node in nodes {
        let in_selection = node
            .chapter_str()
            .map(|chapter| selected.contains(chapter))
            .unwrap_or(false);
        if in_selection && !node.raw_text.trim().is_empty() {
            continue;
        }

        node.style = Some(match node.style.take() {
            Some(style) => format!("{style};{HIDDEN_MARKER}"),
            None => HIDDEN_MARKER.to_string(),
        });
        hidden += 1;
    }

    hidden
}

pub fn is_hidden(node: &ContentNode) -> bool {
    node.style
        .as_deref()
        .map(|style| style.contains(HIDDEN_MARKER))
        .unwrap_or(false)
}
