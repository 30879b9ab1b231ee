//! Transcription loading and orchestration
//!
//! This module contains `load_transcription()`, which runs the whole
//! pipeline for one manuscript directory: folio ordering, main zone
//! extraction page by page, then text reconstruction.

use log::{debug, info};
use std::path::Path;

use super::cleanup::{count_paragraphs, reconstruct};
use super::folio::order_folios;
use super::io::read_layout;
use super::models::*;
use super::parsing::zones::{extract_main_zones, ZoneSelector};
use crate::error::Result;

/// Build the transcription of the manuscript stored in `dir`.
///
/// This function:
/// 1. Orders the page files by folio number
/// 2. Collects the word strings of each page's main zones
/// 3. Joins, repairs and segments the text under the configured policy
pub fn load_transcription(dir: &Path, options: &TranscriptionOptions) -> Result<Transcription> {
    let sequence = order_folios(dir)?;
    debug!(
        "{}: {} folios with prefix {:?}",
        dir.display(),
        sequence.len(),
        sequence.prefix
    );

    let selector = ZoneSelector::new(options.main_zone.as_str());
    let extracted = extract_document(&sequence, dir, &selector)?;
    let text = reconstruct(&extracted.tokens, options.policy);

    let title = dir
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("Untitled Manuscript")
        .to_string();

    let metadata = TranscriptionMetadata {
        source_dir: dir.display().to_string(),
        folio_count: sequence.len(),
        pages_with_text: extracted.pages_with_text,
        token_count: extracted.tokens.len(),
        paragraph_count: count_paragraphs(&text),
    };
    info!(
        "{title}: {} folios, {} with a main zone, {} paragraphs",
        metadata.folio_count, metadata.pages_with_text, metadata.paragraph_count
    );

    Ok(Transcription {
        title,
        metadata,
        text,
    })
}

/// Collect the main zone strings of every folio, in folio order.
pub fn extract_document(
    sequence: &FolioSequence,
    dir: &Path,
    selector: &ZoneSelector,
) -> Result<ExtractedText> {
    let mut extracted = ExtractedText::default();

    for file_name in sequence.file_names() {
        let page = read_layout(dir, file_name)?;
        match extract_main_zones(&page, selector) {
            Some(strings) => {
                extracted.pages_with_text += 1;
                extracted.tokens.extend(strings);
            }
            None => debug!("{file_name}: no {} zone", selector.base_label()),
        }
    }

    Ok(extracted)
}
