//! File I/O operations and validation
//!
//! This module handles reading page files and placing the output artifacts
//! next to the manuscript directory.

use std::fs;
use std::path::{Path, PathBuf};

use super::models::{LayoutDocument, Transcription};
use super::parsing::alto::parse_layout;
use crate::error::{Error, Result};

/// Sibling of `dir` with the same base name and `extension`:
/// `data/btv1b8452` becomes `data/btv1b8452.txt`.
pub fn sibling_path(dir: &Path, extension: &str) -> PathBuf {
    let base = dir
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "transcription".to_string());
    let parent = dir.parent().unwrap_or_else(|| Path::new(""));
    parent.join(format!("{base}.{extension}"))
}

/// Where the transcription of `dir` is written.
pub fn output_path(dir: &Path) -> PathBuf {
    sibling_path(dir, "txt")
}

/// Read and parse one page file.
pub(crate) fn read_layout(dir: &Path, file_name: &str) -> Result<LayoutDocument> {
    let path = dir.join(file_name);
    let xml = fs::read_to_string(&path).map_err(|e| Error::io(&path, e))?;
    parse_layout(&xml).map_err(|source| Error::Xml {
        file: file_name.to_string(),
        source,
    })
}

/// Write the transcription text next to `dir` and return its path.
pub fn write_transcription(dir: &Path, transcription: &Transcription) -> Result<PathBuf> {
    let path = output_path(dir);
    fs::write(&path, transcription.text.as_bytes()).map_err(|e| Error::io(&path, e))?;
    Ok(path)
}
