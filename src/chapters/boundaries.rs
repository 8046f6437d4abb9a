use std::collections::HashSet;

use crate::model::{ChapterLabel, ChapterRange, ContentNode};

use super::matcher::TitleMatch;

/// Keeps the first match of every title, e.g. dropping a running header that
/// echoed a title before its real heading.
pub fn dedupe_matches(matches: Vec<TitleMatch>) -> Vec<TitleMatch> {
    let mut seen = HashSet::<String>::new();
    matches
        .into_iter()
        .filter(|entry| seen.insert(entry.title.clone()))
        .collect()
}

/// Labels every node: cover before the first match, then each match's title
/// up to the next match.
pub fn assign_chapters(nodes: &mut [ContentNode], matches: &[TitleMatch]) {
    let first = matches
        .first()
        .map(|entry| entry.position.min(nodes.len()))
        .unwrap_or(nodes.len());
    for node in &mut nodes[..first] {
        node.chapter = Some(ChapterLabel::Cover);
    }

    for (index, entry) in matches.iter().enumerate() {
        let start = entry.position.min(nodes.len());
        let end = matches
            .get(index + 1)
            .map(|next| next.position.min(nodes.len()))
            .unwrap_or(nodes.len());
        for node in &mut nodes[start..end.max(start)] {
            node.chapter = Some(ChapterLabel::Title(entry.title.clone()));
        }
    }
}

pub fn chapter_ranges(nodes: &[ContentNode], matches: &[TitleMatch]) -> Vec<ChapterRange> {
    matches
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            let end = matches
                .get(index + 1)
                .map(|next| next.position)
                .unwrap_or(nodes.len());
            ChapterRange {
                title: entry.title.clone(),
                start: entry.position,
                end,
                node_count: end.saturating_sub(entry.position),
            }
        })
        .collect()
}
