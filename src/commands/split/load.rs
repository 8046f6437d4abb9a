use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info};

use crate::error::SplitError;
use crate::model::{ContentNode, NodeKind, SourceFormat};

use super::convert::convert_to_html;
use super::scan_detect::assess_pdf;

const NODE_SELECTOR: &str = "p, table, img";

/// Produces the node sequence for one source document, converting word
/// processor files and text-layer PDFs to HTML first.
pub fn load_document(
    path: &Path,
    format: SourceFormat,
    converted_dir: &Path,
    min_text_chars: usize,
) -> Result<Vec<ContentNode>> {
    let html_path = match format {
        SourceFormat::Html => path.to_path_buf(),
        SourceFormat::Docx | SourceFormat::Doc => convert_to_html(path, converted_dir)?,
        SourceFormat::Pdf => {
            let assessment = assess_pdf(path, min_text_chars)?;
            info!(
                file = %path.display(),
                pages = assessment.page_count,
                image_like_pages = assessment.image_like_pages,
                "assessed pdf text layer"
            );
            if !assessment.searchable {
                return Err(SplitError::ScannedPdf(path.display().to_string()).into());
            }
            convert_to_html(path, converted_dir)?
        }
    };

    let raw = fs::read(&html_path)
        .with_context(|| format!("failed to read {}", html_path.display()))?;
    let html = String::from_utf8_lossy(&raw);
    let nodes = parse_html_nodes(&html)?;
    debug!(
        file = %html_path.display(),
        format = format.as_str(),
        nodes = nodes.len(),
        "parsed content nodes"
    );

    Ok(nodes)
}

/// Every paragraph, table and image element in document order.
pub fn parse_html_nodes(html: &str) -> Result<Vec<ContentNode>> {
    let document = Html::parse_document(html);
    let selector = Selector::parse(NODE_SELECTOR)
        .map_err(|error| anyhow!("failed to compile node selector: {error:?}"))?;

    let mut nodes = Vec::new();
    for element in document.select(&selector) {
        let Some(kind) = NodeKind::from_tag(element.value().name()) else {
            continue;
        };

        let mut node = ContentNode::new(nodes.len(), kind, element.text().collect::<String>());
        node.style = element.value().attr("style").map(str::to_string);
        node.attributes = element
            .value()
            .attrs()
            .filter(|(name, _)| *name != "style" && *name != "chapter")
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect();
        node.inner_html = element.inner_html();
        node.nested = element
            .ancestors()
            .filter_map(ElementRef::wrap)
            .any(|ancestor| NodeKind::from_tag(ancestor.value().name()).is_some());
        nodes.push(node);
    }

    Ok(nodes)
}
