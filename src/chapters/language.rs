use clap::ValueEnum;
use regex::Regex;
use scraper::Html;
use serde::{Deserialize, Serialize};

use crate::error::SplitError;

const ORDINAL_GLYPH: char = '第';
const NUMERAL_GLYPHS: &str = "十一二三四五六七八九";
const LATIN_ORDINAL_KEYWORDS: [&str; 3] = ["chapter", "part", "section"];

/// Script whose heading conventions drive normalization and title cleaning.
#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Language {
    Ideograph,
    Latin,
}

impl Language {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ideograph => "ideograph",
            Self::Latin => "latin",
        }
    }

    fn keeps(self, character: char) -> bool {
        match self {
            Self::Ideograph => ('\u{4e00}'..='\u{9fa5}').contains(&character),
            Self::Latin => character.is_ascii_alphabetic(),
        }
    }
}

/// Language-aware text filter plus the title-cleaning transform.
#[derive(Debug, Clone)]
pub struct TitleNormalizer {
    language: Language,
    conjunctions: Vec<char>,
    markup: Regex,
    part_marker: Regex,
    section_marker: Regex,
    whitespace: Regex,
    numerals: Regex,
}

impl TitleNormalizer {
    pub fn new(language: Language, conjunctions: &[char]) -> Result<Self, SplitError> {
        Ok(Self {
            language,
            conjunctions: conjunctions.to_vec(),
            markup: Regex::new(r"</?[A-Za-z][^>]*>")?,
            part_marker: Regex::new(r".部分|..部分|...部分")?,
            section_marker: Regex::new(r".节|..节|...节")?,
            whitespace: Regex::new(r"\s+")?,
            numerals: Regex::new(&format!("[{NUMERAL_GLYPHS}]"))?,
        })
    }

    pub fn language(&self) -> Language {
        self.language
    }

    /// Keeps only the characters of the active script; ideograph mode also
    /// drops the configured conjunctions.
    pub fn normalize(&self, text: &str) -> String {
        let filtered = self.filter_script(text);
        match self.language {
            Language::Ideograph => filtered
                .chars()
                .filter(|character| !self.conjunctions.contains(character))
                .collect(),
            Language::Latin => filtered,
        }
    }

    /// Visible characters of the active script, conjunctions included.
    pub fn filter_script(&self, text: &str) -> String {
        let visible = if self.markup.is_match(text) {
            visible_text(text)
        } else {
            text.to_string()
        };

        visible
            .chars()
            .filter(|character| self.language.keeps(*character))
            .collect()
    }

    /// Splits a normalized TOC line into cleaned candidate titles, one per
    /// heading level joined into the line.
    pub fn split_titles(&self, text: &str) -> Vec<String> {
        match self.language {
            Language::Ideograph => {
                if text.contains(ORDINAL_GLYPH) {
                    text.split(ORDINAL_GLYPH)
                        .skip(1)
                        .map(|segment| self.strip_ideograph_markers(segment))
                        .collect()
                } else {
                    vec![self.strip_ideograph_markers(text)]
                }
            }
            Language::Latin => vec![strip_latin_keywords(text)],
        }
    }

    /// Body-side title form: all cleaned candidates of a node concatenated.
    pub fn title_form(&self, text: &str) -> String {
        self.split_titles(text).concat()
    }

    /// Cleans one dictionary entry, including any stray ordinal glyph.
    pub fn clean_entry(&self, entry: &str) -> String {
        match self.language {
            Language::Ideograph => {
                let text = self.part_marker.replace_all(entry, "");
                let text = text.replace(ORDINAL_GLYPH, "");
                let text = self.section_marker.replace_all(&text, "");
                let text = self.whitespace.replace_all(&text, "");
                self.numerals.replace_all(&text, "").into_owned()
            }
            Language::Latin => strip_latin_keywords(entry),
        }
    }

    fn strip_ideograph_markers(&self, text: &str) -> String {
        let text = self.part_marker.replace_all(text, "");
        let text = self.section_marker.replace_all(&text, "");
        let text = self.whitespace.replace_all(&text, "");
        self.numerals.replace_all(&text, "").into_owned()
    }
}

fn visible_text(markup: &str) -> String {
    Html::parse_fragment(markup)
        .root_element()
        .text()
        .collect::<String>()
}

fn strip_latin_keywords(text: &str) -> String {
    let mut rest = text.trim();
    'outer: loop {
        for keyword in LATIN_ORDINAL_KEYWORDS {
            let Some(head) = rest.get(..keyword.len()) else {
                continue;
            };
            if !head.eq_ignore_ascii_case(keyword) {
                continue;
            }
            let tail = &rest[keyword.len()..];
            let starts_new_word = tail
                .chars()
                .next()
                .map(|character| character.is_ascii_uppercase())
                .unwrap_or(false);
            if starts_new_word {
                rest = tail;
                continue 'outer;
            }
        }
        break;
    }

    rest.split_whitespace().collect()
}
