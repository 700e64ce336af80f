//! Source items and their enumeration

use crate::error::{PrettyParserError, Result};
use crate::input::file_detector::SourceMode;
use log::debug;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceKind {
    /// A file on disk and its path relative to the root it was found under.
    File { path: PathBuf, relative: PathBuf },
    Memory(String),
}

/// One unit of work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceItem {
    pub id: String,
    pub kind: SourceKind,
}

impl SourceItem {
    pub fn file(path: PathBuf, relative: PathBuf) -> Self {
        Self {
            id: path.display().to_string(),
            kind: SourceKind::File { path, relative },
        }
    }

    pub fn memory(index: usize, text: String) -> Self {
        Self {
            id: index.to_string(),
            kind: SourceKind::Memory(text),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        match &self.kind {
            SourceKind::File { path, .. } => Some(path),
            SourceKind::Memory(_) => None,
        }
    }

    pub fn relative_path(&self) -> Option<&Path> {
        match &self.kind {
            SourceKind::File { relative, .. } => Some(relative),
            SourceKind::Memory(_) => None,
        }
    }
}

/// What a run enumerates its items from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inputs {
    Files(Vec<PathBuf>),
    Directories(Vec<PathBuf>),
    Texts(Vec<String>),
}

impl Inputs {
    /// Fail if a named file or directory is missing.
    pub fn check_exists(&self) -> Result<()> {
        match self {
            Inputs::Files(paths) => {
                if let Some(missing) = paths.iter().find(|p| !p.is_file()) {
                    return Err(PrettyParserError::InvalidInput(format!(
                        "File does not exist: {}",
                        missing.display()
                    )));
                }
            }
            Inputs::Directories(dirs) => {
                if let Some(missing) = dirs.iter().find(|d| !d.is_dir()) {
                    return Err(PrettyParserError::InvalidInput(format!(
                        "Directory does not exist: {}",
                        missing.display()
                    )));
                }
            }
            Inputs::Texts(_) => {}
        }
        Ok(())
    }

    pub fn enumerate(&self, mode: SourceMode) -> Result<Vec<SourceItem>> {
        match self {
            Inputs::Texts(texts) => Ok(texts
                .iter()
                .enumerate()
                .map(|(i, text)| SourceItem::memory(i, text.clone()))
                .collect()),
            Inputs::Files(paths) => Ok(paths
                .iter()
                .filter(|path| accepted(mode, path))
                .map(|path| {
                    let relative = path
                        .file_name()
                        .map(PathBuf::from)
                        .unwrap_or_else(|| path.clone());
                    SourceItem::file(path.clone(), relative)
                })
                .collect()),
            Inputs::Directories(dirs) => {
                let mut items = Vec::new();
                for dir in dirs {
                    let mut files = Vec::new();
                    collect_files_recursive(dir, mode, &mut files)?;
                    files.sort();
                    for path in files {
                        let relative = path
                            .strip_prefix(dir)
                            .map(Path::to_path_buf)
                            .unwrap_or_else(|_| path.clone());
                        items.push(SourceItem::file(path, relative));
                    }
                }
                Ok(items)
            }
        }
    }
}

fn accepted(mode: SourceMode, path: &Path) -> bool {
    let ok = mode.accepts(path);
    if !ok {
        debug!("Skipping {} (not a {} file)", path.display(), mode);
    }
    ok
}

fn collect_files_recursive(path: &Path, mode: SourceMode, files: &mut Vec<PathBuf>) -> Result<()> {
    for entry in fs::read_dir(path)? {
        let entry = entry?;
        let entry_path = entry.path();
        // file_type() does not follow symlinks
        let file_type = entry.file_type()?;

        if file_type.is_dir() {
            collect_files_recursive(&entry_path, mode, files)?;
        } else if file_type.is_symlink() && entry_path.is_dir() {
            debug!("Skipping symlinked directory {}", entry_path.display());
        } else if accepted(mode, &entry_path) {
            files.push(entry_path);
        }
    }
    Ok(())
}
