use tracing::debug;

use crate::error::SplitError;
use crate::model::{ChapterLabel, ContentNode};

use super::language::{Language, TitleNormalizer};

const IDEOGRAPH_TOC_MARKER: &str = "目录";
const IDEOGRAPH_TOC_HEAD: &str = "目";
const IDEOGRAPH_TOC_TAIL: &str = "录";
const LATIN_TOC_MARKER: &str = "contents";
const PAGE_BREAK: char = '\u{000C}';

/// Returns the index of the node carrying the table-of-contents marker.
pub fn locate_toc(
    normalizer: &TitleNormalizer,
    nodes: &[ContentNode],
    split_window: usize,
) -> Result<usize, SplitError> {
    for (index, node) in nodes.iter().enumerate() {
        let text = normalizer.normalize(&node.raw_text);
        match normalizer.language() {
            Language::Ideograph => {
                if text == IDEOGRAPH_TOC_HEAD {
                    if let Some(tail_index) =
                        find_split_marker_tail(normalizer, nodes, index, split_window)
                    {
                        debug!(head = index, tail = tail_index, "found split toc marker");
                        return Ok(tail_index);
                    }
                } else if text.contains(IDEOGRAPH_TOC_MARKER) {
                    return Ok(index);
                }
            }
            Language::Latin => {
                if text.to_ascii_lowercase().contains(LATIN_TOC_MARKER) {
                    return Ok(index);
                }
            }
        }
    }

    Err(SplitError::UnsupportedTemplate)
}

fn find_split_marker_tail(
    normalizer: &TitleNormalizer,
    nodes: &[ContentNode],
    head_index: usize,
    split_window: usize,
) -> Option<usize> {
    let end = (head_index + split_window).min(nodes.len());
    for index in head_index..end {
        let text = normalizer.normalize(&nodes[index].raw_text);
        if text.is_empty() {
            continue;
        }
        if text == IDEOGRAPH_TOC_TAIL {
            return Some(index);
        }
    }
    None
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitleDictionary {
    pub titles: Vec<String>,
    /// First node index after the TOC region.
    pub body_start: usize,
}

/// Collects candidate titles from the nodes following the TOC marker. Visited
/// nodes are provisionally labelled as cover.
pub fn build_dictionary(
    normalizer: &TitleNormalizer,
    nodes: &mut [ContentNode],
    toc_index: usize,
    chapter_num: usize,
) -> TitleDictionary {
    let mut titles = Vec::<String>::new();
    let mut collected = 0usize;
    let mut body_start = nodes.len();

    for index in (toc_index + 1)..nodes.len() {
        let node = &mut nodes[index];
        node.chapter = Some(ChapterLabel::Cover);
        body_start = index + 1;

        let text = normalizer.normalize(&node.raw_text);
        if text.is_empty() || node.raw_text.contains(PAGE_BREAK) {
            continue;
        }

        let candidates = normalizer
            .split_titles(&text)
            .into_iter()
            .filter(|candidate| !candidate.is_empty())
            .collect::<Vec<String>>();
        if candidates.is_empty() {
            continue;
        }

        titles.extend(candidates);
        collected += 1;
        if collected > chapter_num {
            break;
        }
    }

    debug!(
        titles = titles.len(),
        toc_index,
        body_start,
        "built title dictionary"
    );

    TitleDictionary { titles, body_start }
}
