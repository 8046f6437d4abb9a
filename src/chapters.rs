//! Chapter boundary resolution: find the table of contents, build the title
//! dictionary from it, re-find each title in the body and label every node
//! with the chapter it belongs to.

use std::collections::BTreeMap;

use tracing::info;

use crate::error::SplitError;
use crate::model::{ChapterRange, ContentNode};

mod allow_list;
mod boundaries;
mod language;
mod matcher;
mod profile;
mod similarity;
mod toc;

pub use allow_list::is_hidden;
pub use language::Language;
pub use profile::MatchProfile;

use allow_list::{hide_unselected, select_chapters};
use boundaries::{assign_chapters, chapter_ranges, dedupe_matches};
use language::TitleNormalizer;
use matcher::{TitleMatch, TitleMatcher};
use similarity::SubstitutionTable;
use toc::{TitleDictionary, build_dictionary, locate_toc};

/// Outcome of one resolution pass over a document.
#[derive(Debug, Clone)]
pub struct Resolution {
    pub toc_index: usize,
    pub dictionary_size: usize,
    /// Deduplicated matches in document order.
    pub matches: Vec<TitleMatch>,
}

impl Resolution {
    pub fn labels(&self) -> Vec<String> {
        self.matches.iter().map(|entry| entry.title.clone()).collect()
    }

    pub fn ranges(&self, nodes: &[ContentNode]) -> Vec<ChapterRange> {
        chapter_ranges(nodes, &self.matches)
    }
}

/// Runs the resolution stages for one language and match profile.
#[derive(Debug, Clone)]
pub struct ChapterResolver {
    normalizer: TitleNormalizer,
    profile: MatchProfile,
    substitutions: SubstitutionTable,
}

impl ChapterResolver {
    pub fn new(language: Language, profile: MatchProfile) -> Result<Self, SplitError> {
        let normalizer = TitleNormalizer::new(language, &profile.conjunctions)?;
        let substitutions = SubstitutionTable::from_pairs(&profile.substitutions);
        Ok(Self {
            normalizer,
            profile,
            substitutions,
        })
    }

    #[cfg(test)]
    pub fn normalizer(&self) -> &TitleNormalizer {
        &self.normalizer
    }

    pub fn matcher(&self) -> TitleMatcher<'_> {
        TitleMatcher::new(&self.normalizer, &self.profile, &self.substitutions)
    }

    pub fn locate_toc(&self, nodes: &[ContentNode]) -> Result<usize, SplitError> {
        locate_toc(&self.normalizer, nodes, self.profile.toc_split_window)
    }

    pub fn build_dictionary(
        &self,
        nodes: &mut [ContentNode],
        toc_index: usize,
        chapter_num: usize,
    ) -> TitleDictionary {
        build_dictionary(&self.normalizer, nodes, toc_index, chapter_num)
    }

    /// Labels every node of the document. Fails only when no table of
    /// contents can be found.
    pub fn resolve(
        &self,
        nodes: &mut [ContentNode],
        chapter_num: usize,
    ) -> Result<Resolution, SplitError> {
        let toc_index = self.locate_toc(nodes)?;
        let TitleDictionary {
            mut titles,
            body_start,
        } = self.build_dictionary(nodes, toc_index, chapter_num);
        let dictionary_size = titles.len();

        let raw_matches = self.matcher().match_titles(nodes, &mut titles, body_start);
        let matches = dedupe_matches(raw_matches);
        assign_chapters(nodes, &matches);

        info!(
            toc_index,
            dictionary_size,
            matched = matches.len(),
            unmatched = titles.len(),
            "resolved chapter boundaries"
        );

        Ok(Resolution {
            toc_index,
            dictionary_size,
            matches,
        })
    }

    /// Hides nodes outside the approved chapters. Returns the selected labels
    /// and the number of hidden nodes, or `NoRecognizedChapters` when the
    /// allow-list resolves to nothing.
    pub fn apply_allow_list(
        &self,
        nodes: &mut [ContentNode],
        resolution: &Resolution,
        allow_list: &BTreeMap<String, bool>,
    ) -> Result<(Vec<String>, usize), SplitError> {
        let selected = select_chapters(
            &self.normalizer,
            allow_list,
            &resolution.labels(),
            self.profile.allow_list_threshold,
        );
        if selected.is_empty() {
            return Err(SplitError::NoRecognizedChapters);
        }

        let hidden = hide_unselected(nodes, &selected);
        Ok((selected, hidden))
    }
}
