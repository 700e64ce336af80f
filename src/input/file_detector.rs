//! File type detection and source modes

use crate::error::PrettyParserError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq)]
pub enum FileType {
    Pdf,
    Text,
    Unknown,
}

impl FileType {
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "pdf" => FileType::Pdf,
            "txt" => FileType::Text,
            _ => FileType::Unknown,
        }
    }

    pub fn from_path(path: &Path) -> Self {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map_or(FileType::Unknown, FileType::from_extension)
    }
}

/// Where the raw text of each item comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceMode {
    #[default]
    Pdf,
    Text,
    Memory,
}

impl SourceMode {
    /// File type accepted in this mode, `None` for in-memory text.
    pub fn file_type(&self) -> Option<FileType> {
        match self {
            SourceMode::Pdf => Some(FileType::Pdf),
            SourceMode::Text => Some(FileType::Text),
            SourceMode::Memory => None,
        }
    }

    pub fn accepts(&self, path: &Path) -> bool {
        self.file_type() == Some(FileType::from_path(path))
    }
}

impl FromStr for SourceMode {
    type Err = PrettyParserError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pdf" => Ok(SourceMode::Pdf),
            "txt" | "text" => Ok(SourceMode::Text),
            "list" | "memory" | "pyobj" => Ok(SourceMode::Memory),
            _ => Err(PrettyParserError::Configuration(format!(
                "Invalid mode: {}. Supported: pdf, txt, list",
                s
            ))),
        }
    }
}

impl fmt::Display for SourceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceMode::Pdf => write!(f, "pdf"),
            SourceMode::Text => write!(f, "txt"),
            SourceMode::Memory => write!(f, "list"),
        }
    }
}
