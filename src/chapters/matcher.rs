use tracing::debug;

use crate::model::ContentNode;

use super::language::TitleNormalizer;
use super::profile::MatchProfile;
use super::similarity::{SubstitutionTable, weighted_levenshtein};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitleMatch {
    pub title: String,
    pub position: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchRule {
    ExactSuffix,
    LengthGate,
    WeightedDistance,
}

impl MatchRule {
    pub const CHAIN: [MatchRule; 3] = [
        MatchRule::ExactSuffix,
        MatchRule::LengthGate,
        MatchRule::WeightedDistance,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Accept,
    /// The entry cannot match this node; later rules are not consulted.
    Reject,
    /// Undecided; defer to the next rule.
    Defer,
}

/// A body node prepared once for comparison against every dictionary entry.
#[derive(Debug, Clone)]
pub struct Candidate<'a> {
    pub original: &'a str,
    /// Script-filtered text that still carries conjunctions such as 的.
    pub filtered: String,
    pub normalized: String,
    pub title_form: String,
}

impl<'a> Candidate<'a> {
    pub fn new(normalizer: &TitleNormalizer, original: &'a str) -> Self {
        let filtered = normalizer.filter_script(original);
        let normalized = normalizer.normalize(original);
        let title_form = normalizer.title_form(&normalized);
        Self {
            original,
            filtered,
            normalized,
            title_form,
        }
    }
}

pub struct TitleMatcher<'a> {
    normalizer: &'a TitleNormalizer,
    profile: &'a MatchProfile,
    substitutions: &'a SubstitutionTable,
}

impl<'a> TitleMatcher<'a> {
    pub fn new(
        normalizer: &'a TitleNormalizer,
        profile: &'a MatchProfile,
        substitutions: &'a SubstitutionTable,
    ) -> Self {
        Self {
            normalizer,
            profile,
            substitutions,
        }
    }

    /// Scans forward from `start`, consuming dictionary entries as their
    /// headings are found.
    pub fn match_titles(
        &self,
        nodes: &[ContentNode],
        dictionary: &mut Vec<String>,
        start: usize,
    ) -> Vec<TitleMatch> {
        let mut matches = Vec::<TitleMatch>::new();

        for (position, node) in nodes.iter().enumerate().skip(start) {
            if dictionary.is_empty() {
                break;
            }

            let candidate = Candidate::new(self.normalizer, &node.raw_text);
            if candidate.normalized.is_empty() {
                continue;
            }

            if let Some(entry_index) = self.match_node(&candidate, dictionary) {
                let title = dictionary.remove(entry_index);
                debug!(title = %title, position, ordinal = node.ordinal, "matched chapter heading");
                matches.push(TitleMatch { title, position });
            }
        }

        matches
    }

    /// Index of the first dictionary entry the node heads, if any.
    pub fn match_node(&self, candidate: &Candidate<'_>, dictionary: &[String]) -> Option<usize> {
        if self.ends_mid_clause(candidate.original) {
            return None;
        }

        dictionary
            .iter()
            .position(|entry| self.evaluate_entry(candidate, entry) == Verdict::Accept)
    }

    pub fn evaluate_entry(&self, candidate: &Candidate<'_>, entry: &str) -> Verdict {
        let cleaned = self.normalizer.clean_entry(entry);
        for rule in MatchRule::CHAIN {
            match self.apply(rule, candidate, &cleaned) {
                Verdict::Defer => continue,
                verdict => return verdict,
            }
        }
        Verdict::Reject
    }

    pub fn apply(&self, rule: MatchRule, candidate: &Candidate<'_>, cleaned: &str) -> Verdict {
        match rule {
            MatchRule::ExactSuffix => self.exact_suffix(candidate, cleaned),
            MatchRule::LengthGate => self.length_gate(candidate, cleaned),
            MatchRule::WeightedDistance => self.weighted_distance(candidate, cleaned),
        }
    }

    /// A heading line does not end with sentence-final punctuation.
    pub fn ends_mid_clause(&self, original: &str) -> bool {
        original
            .trim()
            .chars()
            .last()
            .map(|last| self.profile.clause_endings.contains(&last))
            .unwrap_or(false)
    }

    fn exact_suffix(&self, candidate: &Candidate<'_>, cleaned: &str) -> Verdict {
        if cleaned.is_empty() || !candidate.normalized.ends_with(cleaned) {
            return Verdict::Defer;
        }

        let mentioned = self.profile.false_positive_prefixes.iter().any(|prefix| {
            !prefix.is_empty() && candidate.filtered.ends_with(&format!("{prefix}{cleaned}"))
        });
        if mentioned {
            return Verdict::Defer;
        }

        Verdict::Accept
    }

    fn length_gate(&self, candidate: &Candidate<'_>, cleaned: &str) -> Verdict {
        let node_len = candidate.title_form.chars().count();
        let entry_len = cleaned.chars().count();
        if node_len.abs_diff(entry_len) >= self.profile.length_gate {
            Verdict::Reject
        } else {
            Verdict::Defer
        }
    }

    fn weighted_distance(&self, candidate: &Candidate<'_>, cleaned: &str) -> Verdict {
        let max_distance = self.profile.max_distance;
        let whole = weighted_levenshtein(&candidate.normalized, cleaned, self.substitutions);
        if whole <= max_distance {
            return Verdict::Accept;
        }

        let title = weighted_levenshtein(&candidate.title_form, cleaned, self.substitutions);
        if title <= max_distance {
            Verdict::Accept
        } else {
            Verdict::Reject
        }
    }
}
