//! Per-page PDF text strategies

use crate::error::{PrettyParserError, Result};
use lopdf::{Document, ObjectId};
use std::sync::Arc;

/// A single page of an opened document.
pub struct PdfPage<'a> {
    doc: &'a Document,
    number: u32,
    id: ObjectId,
}

impl<'a> PdfPage<'a> {
    pub fn new(doc: &'a Document, number: u32, id: ObjectId) -> Self {
        Self { doc, number, id }
    }

    /// 1-based page number.
    pub fn number(&self) -> u32 {
        self.number
    }

    pub fn id(&self) -> ObjectId {
        self.id
    }

    pub fn document(&self) -> &'a Document {
        self.doc
    }

    /// Text of this page as decoded by lopdf.
    pub fn extract_text(&self) -> Result<String> {
        Ok(self.doc.extract_text(&[self.number])?)
    }
}

/// Turns one page into text. An empty result means the page is skipped.
pub trait PageExtractor: Send + Sync {
    fn extract_page(&self, page: &PdfPage<'_>) -> Result<String>;
}

/// lopdf's text as is.
pub struct PlainPages;

impl PageExtractor for PlainPages {
    fn extract_page(&self, page: &PdfPage<'_>) -> Result<String> {
        page.extract_text()
    }
}

/// Each line trimmed, empty lines dropped.
pub struct TrimmedPages;

impl PageExtractor for TrimmedPages {
    fn extract_page(&self, page: &PdfPage<'_>) -> Result<String> {
        let text = page.extract_text()?;
        Ok(text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>()
            .join("\n"))
    }
}

/// Drops the first non-empty line of every page (running headers).
pub struct HeaderlessPages;

impl PageExtractor for HeaderlessPages {
    fn extract_page(&self, page: &PdfPage<'_>) -> Result<String> {
        let text = page.extract_text()?;
        Ok(text
            .lines()
            .skip_while(|line| line.trim().is_empty())
            .skip(1)
            .collect::<Vec<_>>()
            .join("\n"))
    }
}

/// Registered strategy names and descriptions.
pub const PAGE_STRATEGIES: &[(&str, &str)] = &[
    ("plain", "Text of each page as extracted"),
    ("trimmed", "Trim every line and drop empty lines"),
    ("no-header", "Drop the first non-empty line of every page"),
];

pub const DEFAULT_PAGE_STRATEGY: &str = "plain";

pub fn page_strategy(name: &str) -> Result<Arc<dyn PageExtractor>> {
    match name {
        "plain" => Ok(Arc::new(PlainPages)),
        "trimmed" => Ok(Arc::new(TrimmedPages)),
        "no-header" => Ok(Arc::new(HeaderlessPages)),
        _ => Err(PrettyParserError::Configuration(format!(
            "Unknown page strategy: {}. Supported: {}",
            name,
            PAGE_STRATEGIES
                .iter()
                .map(|(name, _)| *name)
                .collect::<Vec<_>>()
                .join(", ")
        ))),
    }
}

/// Join page texts, skipping blank pages. No separator precedes the first page.
pub fn join_pages<I>(pages: I, separator: &str) -> String
where
    I: IntoIterator<Item = String>,
{
    let mut joined = String::new();
    let mut first = true;
    for page in pages {
        if page.trim().is_empty() {
            continue;
        }
        if !first {
            joined.push_str(separator);
        }
        joined.push_str(&page);
        first = false;
    }
    joined
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_pages_no_leading_separator() {
        let pages = vec!["P1".to_string(), "P2".to_string()];
        assert_eq!(join_pages(pages, "<S>"), "P1<S>P2");
    }

    #[test]
    fn test_join_pages_skips_blank() {
        let pages = vec![
            String::new(),
            "P1".to_string(),
            " \n".to_string(),
            "P2".to_string(),
        ];
        assert_eq!(join_pages(pages, "\n\n"), "P1\n\nP2");
        assert_eq!(join_pages(Vec::new(), "\n\n"), "");
    }

    #[test]
    fn test_registry() {
        for (name, _) in PAGE_STRATEGIES {
            assert!(page_strategy(name).is_ok());
        }
        assert!(page_strategy(DEFAULT_PAGE_STRATEGY).is_ok());
        let err = page_strategy("eval").err().unwrap();
        assert!(err.is_configuration());
    }
}
