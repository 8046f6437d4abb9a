use serde::{Deserialize, Serialize};

use super::similarity::SubstitutionPair;

/// Tunable data for title matching. Every field has a built-in default so a
/// profile file only needs to list what it overrides.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchProfile {
    /// Glyphs that, glued in front of a title, mark a mention rather than a heading.
    pub false_positive_prefixes: Vec<String>,
    pub conjunctions: Vec<char>,
    pub clause_endings: Vec<char>,
    pub substitutions: Vec<SubstitutionPair>,
    pub length_gate: usize,
    pub max_distance: f64,
    /// Nodes searched for the second half of a split TOC marker.
    pub toc_split_window: usize,
    pub allow_list_threshold: f64,
}

impl Default for MatchProfile {
    fn default() -> Self {
        Self {
            false_positive_prefixes: vec!["本".to_string(), "的".to_string()],
            conjunctions: vec!['和', '与', '或', '的'],
            clause_endings: vec![';', '；', '。', '"', '”'],
            substitutions: default_substitutions(),
            length_gate: 3,
            max_distance: 1.0,
            toc_split_window: 10,
            allow_list_threshold: 0.25,
        }
    }
}

fn default_substitutions() -> Vec<SubstitutionPair> {
    [
        ('己', '已'),
        ('已', '巳'),
        ('未', '末'),
        ('土', '士'),
        ('人', '入'),
        ('日', '曰'),
        ('戊', '戌'),
    ]
    .into_iter()
    .map(|(from, to)| SubstitutionPair {
        from,
        to,
        cost: 0.5,
    })
    .collect()
}
