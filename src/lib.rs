//! altotext: plain-text transcriptions from ALTO manuscript pages
//!
//! This library orders a manuscript's per-folio ALTO files, extracts the text
//! of each page's main zone, repairs words broken across lines and pages, and
//! segments the result into paragraph-sized units for lemmatisation. It can
//! also look up the manuscript's record in the BnF catalogue.

pub mod batch;
pub mod catalogue;
pub mod config;
pub mod document;
pub mod error;

use serde::{Deserialize, Serialize};

/// Rule set used to rebuild and segment a transcription
#[derive(clap::ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SegmentationPolicy {
    /// Unit-separator join marker, whitespace at a boundary becomes the break
    #[default]
    Canonical,
    /// Behaviour of the historical extraction script (`%%` marker, breaks
    /// appended after the boundary whitespace)
    Legacy,
}

// Re-export commonly used types
pub use catalogue::{CatalogueClient, CatalogueLookup, CatalogueMetadata};
pub use config::Config;
pub use document::{load_transcription, FolioSequence, Transcription};
pub use error::{Error, Result};
