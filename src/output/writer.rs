//! Output path derivation and overwrite-aware writes

use crate::error::{PrettyParserError, Result};
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

pub const OUTPUT_EXTENSION: &str = "txt";

/// Mirror `relative` under `root` with a `.txt` extension.
pub fn output_path(root: &Path, relative: &Path) -> PathBuf {
    root.join(relative).with_extension(OUTPUT_EXTENSION)
}

/// Write `text` to `path`, creating parent directories.
///
/// Without `overwrite` an existing file is left untouched and
/// [`PrettyParserError::OutputExists`] is returned.
pub fn write_output(path: &Path, text: &str, overwrite: bool) -> Result<()> {
    if let Some(parent) = path.parent() {
        // create_dir_all tolerates a concurrent worker creating the same directory
        fs::create_dir_all(parent)?;
    }

    if overwrite {
        fs::write(path, text)?;
        return Ok(());
    }

    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .map_err(|e| match e.kind() {
            ErrorKind::AlreadyExists => PrettyParserError::OutputExists(path.to_path_buf()),
            _ => PrettyParserError::Io(e),
        })?;
    file.write_all(text.as_bytes())?;
    Ok(())
}
