use std::path::Path;
use std::process::Command;

use anyhow::{Context, Result, bail};

const BAD_CHAR_RATIO: f64 = 0.9;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanAssessment {
    pub page_count: usize,
    pub image_like_pages: usize,
    pub searchable: bool,
}

pub fn assess_pdf(pdf_path: &Path, min_text_chars: usize) -> Result<ScanAssessment> {
    let pages = extract_pages_with_pdftotext(pdf_path)?;
    Ok(assess_pages(&pages, min_text_chars))
}

/// A PDF is searchable while fewer than half of its pages look like images:
/// pages dominated by unmapped glyphs, or (after the first page) pages with
/// almost no text layer.
pub fn assess_pages(pages: &[String], min_text_chars: usize) -> ScanAssessment {
    let mut image_like_pages = 0usize;

    for (index, page) in pages.iter().enumerate() {
        let visible = page
            .chars()
            .filter(|character| !character.is_whitespace())
            .collect::<Vec<char>>();
        let bad_chars = visible
            .iter()
            .filter(|character| is_bad_char(**character))
            .count();

        if !visible.is_empty() && bad_chars as f64 / visible.len() as f64 > BAD_CHAR_RATIO {
            image_like_pages += 1;
            continue;
        }

        // cover pages are often a single scanned image
        if pages.len() > 1 && index == 0 {
            continue;
        }

        if visible.len() < min_text_chars {
            image_like_pages += 1;
        }
    }

    ScanAssessment {
        page_count: pages.len(),
        image_like_pages,
        searchable: !pages.is_empty() && image_like_pages * 2 < pages.len(),
    }
}

fn is_bad_char(character: char) -> bool {
    matches!(
        character,
        '\u{E000}'..='\u{F8FF}'
            | '\u{F0000}'..='\u{FFFFD}'
            | '\u{100000}'..='\u{10FFFD}'
            | '\u{FFFD}'
    )
}

fn extract_pages_with_pdftotext(pdf_path: &Path) -> Result<Vec<String>> {
    let output = Command::new("pdftotext")
        .arg("-enc")
        .arg("UTF-8")
        .arg(pdf_path)
        .arg("-")
        .output()
        .with_context(|| format!("failed to execute pdftotext for {}", pdf_path.display()))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!(
            "pdftotext returned non-zero exit status for {}: {}",
            pdf_path.display(),
            stderr.trim()
        );
    }

    let raw = String::from_utf8_lossy(&output.stdout);
    let mut pages: Vec<String> = raw
        .split('\u{000C}')
        .map(|chunk| chunk.replace('\u{0000}', ""))
        .collect();

    // pdftotext terminates the last page with a form feed
    while pages.last().map(|page| page.trim().is_empty()).unwrap_or(false) {
        pages.pop();
    }

    Ok(pages)
}
