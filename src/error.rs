use thiserror::Error;

/// Failures that stop processing of a single document.
#[derive(Error, Debug)]
pub enum SplitError {
    #[error("no table of contents found: unsupported document template")]
    UnsupportedTemplate,

    #[error("unsupported input format: {0}")]
    UnsupportedFormat(String),

    #[error("scanned image PDFs are not supported: {0}")]
    ScannedPdf(String),

    #[error("document contains no recognizable chapter matching current configuration")]
    NoRecognizedChapters,

    #[error("failed to compile title pattern: {0}")]
    Pattern(#[from] regex::Error),
}
