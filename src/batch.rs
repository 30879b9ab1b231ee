//! Batch processing of manuscript directories
//!
//! Every directory is an independent document. Documents run concurrently
//! on the blocking pool; one failure never stops the others, and reports
//! come back in input order.

use anyhow::{Context, Result};
use log::{debug, error, info};
use std::fs;
use std::path::{Path, PathBuf};
use tokio::task::JoinSet;

use crate::catalogue::{CatalogueClient, CatalogueMetadata};
use crate::config::CatalogueConfig;
use crate::document::io::sibling_path;
use crate::document::{load_transcription, write_transcription, TranscriptionOptions};

#[derive(Debug, Clone, Default)]
pub struct BatchOptions {
    pub transcription: TranscriptionOptions,
    /// Also write `<dir>.metadata.json` from the catalogue
    pub fetch_metadata: bool,
    pub catalogue: CatalogueConfig,
}

#[derive(Debug, Clone)]
pub struct DocumentOutput {
    pub text_path: PathBuf,
    pub paragraph_count: usize,
    pub metadata_path: Option<PathBuf>,
    pub catalogue_found: Option<bool>,
}

#[derive(Debug)]
pub struct DocumentReport {
    pub dir: PathBuf,
    pub result: Result<DocumentOutput>,
}

/// Keep the arguments that are directories, in order.
pub fn select_directories(paths: &[PathBuf]) -> Vec<PathBuf> {
    paths
        .iter()
        .filter(|path| {
            let is_dir = path.is_dir();
            if !is_dir {
                debug!("skipping {}: not a directory", path.display());
            }
            is_dir
        })
        .cloned()
        .collect()
}

/// Absolute form of `dir`, so that `.` or `ms/..` still has a base name for
/// the output files and the catalogue identifier.
pub fn resolve_directory(dir: &Path) -> Result<PathBuf> {
    fs::canonicalize(dir).with_context(|| format!("failed to resolve {}", dir.display()))
}

/// Build and write the transcription of one directory.
pub fn process_directory(dir: &Path, options: &TranscriptionOptions) -> Result<DocumentOutput> {
    let dir = resolve_directory(dir)?;
    let transcription = load_transcription(&dir, options)
        .with_context(|| format!("failed to transcribe {}", dir.display()))?;
    let text_path = write_transcription(&dir, &transcription)?;
    info!("wrote {}", text_path.display());

    Ok(DocumentOutput {
        text_path,
        paragraph_count: transcription.metadata.paragraph_count,
        metadata_path: None,
        catalogue_found: None,
    })
}

/// Catalogue identifier of a document: its directory name
pub fn document_ark(dir: &Path) -> Option<String> {
    dir.file_name().map(|name| name.to_string_lossy().into_owned())
}

/// Write catalogue metadata as pretty JSON next to `dir`.
pub fn write_metadata(dir: &Path, metadata: &CatalogueMetadata) -> Result<PathBuf> {
    let path = sibling_path(dir, "metadata.json");
    let json = serde_json::to_string_pretty(metadata)?;
    fs::write(&path, json).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(path)
}

async fn process_document(
    dir: PathBuf,
    options: TranscriptionOptions,
    client: Option<CatalogueClient>,
) -> Result<DocumentOutput> {
    let dir = resolve_directory(&dir)?;
    let blocking_dir = dir.clone();
    let mut output =
        tokio::task::spawn_blocking(move || process_directory(&blocking_dir, &options))
            .await
            .context("transcription task panicked")??;

    if let Some(client) = client {
        let ark = document_ark(&dir)
            .with_context(|| format!("no catalogue identifier for {}", dir.display()))?;
        let metadata = client.fetch(&ark).await.metadata();
        output.catalogue_found = Some(metadata.found);
        output.metadata_path = Some(write_metadata(&dir, &metadata)?);
    }

    Ok(output)
}

/// Process every directory and report on each, in input order.
pub async fn run_batch(dirs: Vec<PathBuf>, options: BatchOptions) -> Result<Vec<DocumentReport>> {
    let client = if options.fetch_metadata {
        Some(CatalogueClient::new(&options.catalogue)?)
    } else {
        None
    };

    let mut tasks = JoinSet::new();
    for (index, dir) in dirs.iter().cloned().enumerate() {
        let transcription = options.transcription.clone();
        let client = client.clone();
        tasks.spawn(async move {
            let result = process_document(dir, transcription, client).await;
            (index, result)
        });
    }

    let mut results: Vec<Option<Result<DocumentOutput>>> = dirs.iter().map(|_| None).collect();
    while let Some(joined) = tasks.join_next().await {
        let (index, result) = joined.context("document task panicked")?;
        if let Err(err) = &result {
            error!("{err:#}");
        }
        results[index] = Some(result);
    }

    Ok(dirs
        .into_iter()
        .zip(results)
        .map(|(dir, result)| DocumentReport {
            result: result.unwrap_or_else(|| Err(anyhow::anyhow!("document was not processed"))),
            dir,
        })
        .collect())
}
