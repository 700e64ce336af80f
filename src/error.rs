//! Error handling for the pretty parser

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PrettyParserError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("PDF extraction error: {0}")]
    PdfExtraction(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid rule pattern '{pattern}': {source}")]
    InvalidRule {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Output file already exists: {}", .0.display())]
    OutputExists(PathBuf),

    #[error("Processing error: {0}")]
    Processing(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, PrettyParserError>;

impl From<lopdf::Error> for PrettyParserError {
    fn from(err: lopdf::Error) -> Self {
        PrettyParserError::PdfExtraction(err.to_string())
    }
}

impl PrettyParserError {
    /// Errors raised while validating options, before any item is processed.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            PrettyParserError::Configuration(_)
                | PrettyParserError::InvalidRule { .. }
                | PrettyParserError::ConfigParse(_)
        )
    }
}
