//! Raw text extraction for each source mode

use crate::error::{PrettyParserError, Result};
use crate::input::file_detector::SourceMode;
use crate::input::pdf::{join_pages, PageExtractor, PdfPage};
use crate::input::source::{SourceItem, SourceKind};
use log::{debug, warn};
use lopdf::Document;
use std::fs;
use std::path::Path;
use std::sync::Arc;

pub trait TextExtractor: Send + Sync {
    /// Raw text of the item, empty when nothing could be extracted.
    fn extract(&self, item: &SourceItem) -> Result<String>;
}

/// Build the extractor for a mode.
pub fn for_mode(
    mode: SourceMode,
    page_extractor: Arc<dyn PageExtractor>,
    page_separator: &str,
) -> Arc<dyn TextExtractor> {
    match mode {
        SourceMode::Pdf => Arc::new(PdfExtractor::new(page_extractor, page_separator)),
        SourceMode::Text => Arc::new(PlainTextExtractor),
        SourceMode::Memory => Arc::new(MemoryExtractor),
    }
}

fn file_path(item: &SourceItem) -> Result<&Path> {
    item.path().ok_or_else(|| {
        PrettyParserError::InvalidInput(format!("Item {} is not a file", item.id))
    })
}

pub struct PdfExtractor {
    page_extractor: Arc<dyn PageExtractor>,
    page_separator: String,
}

impl PdfExtractor {
    pub fn new(page_extractor: Arc<dyn PageExtractor>, page_separator: &str) -> Self {
        Self {
            page_extractor,
            page_separator: page_separator.to_string(),
        }
    }
}

impl TextExtractor for PdfExtractor {
    fn extract(&self, item: &SourceItem) -> Result<String> {
        let path = file_path(item)?;
        let doc = Document::load(path).map_err(|e| {
            PrettyParserError::PdfExtraction(format!(
                "Failed to open PDF '{}': {}",
                path.display(),
                e
            ))
        })?;

        let pages = doc.get_pages();
        debug!("Extracting {} pages from {}", pages.len(), path.display());

        let texts = pages.into_iter().filter_map(|(number, id)| {
            let page = PdfPage::new(&doc, number, id);
            match self.page_extractor.extract_page(&page) {
                Ok(text) => Some(text),
                Err(e) => {
                    warn!("Skipping page {} of {}: {}", number, path.display(), e);
                    None
                }
            }
        });

        Ok(join_pages(texts, &self.page_separator))
    }
}

pub struct PlainTextExtractor;

impl TextExtractor for PlainTextExtractor {
    fn extract(&self, item: &SourceItem) -> Result<String> {
        let path = file_path(item)?;
        let content = fs::read_to_string(path)?;
        Ok(content)
    }
}

pub struct MemoryExtractor;

impl TextExtractor for MemoryExtractor {
    fn extract(&self, item: &SourceItem) -> Result<String> {
        match &item.kind {
            SourceKind::Memory(text) => Ok(text.clone()),
            SourceKind::File { path, .. } => Err(PrettyParserError::InvalidInput(format!(
                "Expected in-memory text, got file {}",
                path.display()
            ))),
        }
    }
}
