use serde::{Deserialize, Serialize};

pub const COVER_LABEL: &str = "cover";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Paragraph,
    Table,
    Image,
}

impl NodeKind {
    pub fn tag(self) -> &'static str {
        match self {
            NodeKind::Paragraph => "p",
            NodeKind::Table => "table",
            NodeKind::Image => "img",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "p" => Some(NodeKind::Paragraph),
            "table" => Some(NodeKind::Table),
            "img" => Some(NodeKind::Image),
            _ => None,
        }
    }
}

/// Chapter a content node belongs to once boundaries are resolved.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ChapterLabel {
    Cover,
    Title(String),
}

impl ChapterLabel {
    pub fn as_str(&self) -> &str {
        match self {
            ChapterLabel::Cover => COVER_LABEL,
            ChapterLabel::Title(title) => title,
        }
    }
}

/// One paragraph, table or image block in reading order.
#[derive(Debug, Clone)]
pub struct ContentNode {
    pub ordinal: usize,
    pub kind: NodeKind,
    pub raw_text: String,
    pub chapter: Option<ChapterLabel>,
    pub style: Option<String>,
    pub attributes: Vec<(String, String)>,
    pub inner_html: String,
    /// Set when an enclosing block is itself a node, so its markup is already
    /// part of that block's `inner_html`.
    pub nested: bool,
}

impl ContentNode {
    pub fn new(ordinal: usize, kind: NodeKind, raw_text: impl Into<String>) -> Self {
        Self {
            ordinal,
            kind,
            raw_text: raw_text.into(),
            chapter: None,
            style: None,
            attributes: Vec::new(),
            inner_html: String::new(),
            nested: false,
        }
    }

    pub fn chapter_str(&self) -> Option<&str> {
        self.chapter.as_ref().map(ChapterLabel::as_str)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceFormat {
    Html,
    Docx,
    Doc,
    Pdf,
}

impl SourceFormat {
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "html" | "htm" => Some(SourceFormat::Html),
            "docx" => Some(SourceFormat::Docx),
            "doc" => Some(SourceFormat::Doc),
            "pdf" => Some(SourceFormat::Pdf),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SourceFormat::Html => "html",
            SourceFormat::Docx => "docx",
            SourceFormat::Doc => "doc",
            SourceFormat::Pdf => "pdf",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentEntry {
    pub filename: String,
    pub format: SourceFormat,
    pub sha256: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentInventoryManifest {
    pub manifest_version: u32,
    pub generated_at: String,
    pub source_directory: String,
    pub document_count: usize,
    pub documents: Vec<DocumentEntry>,
    #[serde(default)]
    pub unsupported_files: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolVersions {
    pub unoconv: Option<String>,
    pub pdftotext: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChapterRange {
    pub title: String,
    pub start: usize,
    pub end: usize,
    pub node_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentSplitRecord {
    pub filename: String,
    pub format: Option<SourceFormat>,
    pub sha256: Option<String>,
    pub status: String,
    pub failure_reason: Option<String>,
    pub node_count: usize,
    pub toc_index: Option<usize>,
    pub dictionary_size: usize,
    pub chapters: Vec<ChapterRange>,
    pub selected_chapters: Option<Vec<String>>,
    pub hidden_node_count: usize,
    pub written_files: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SplitCounts {
    pub document_count: usize,
    pub completed_count: usize,
    pub skipped_count: usize,
    pub failed_count: usize,
    pub fragments_written: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SplitRunManifest {
    pub manifest_version: u32,
    pub run_id: String,
    pub status: String,
    pub started_at: String,
    pub updated_at: String,
    pub command: String,
    pub language: String,
    pub chapter_num: usize,
    pub output_mode: String,
    pub source_directory: String,
    pub output_directory: String,
    pub tool_versions: ToolVersions,
    pub counts: SplitCounts,
    pub documents: Vec<DocumentSplitRecord>,
    pub warnings: Vec<String>,
}
