//! Transcription building and data structures module
//!
//! This module turns a directory of per-folio ALTO files into one
//! paragraph-segmented plain text.

pub mod cleanup;
pub mod folio;
pub mod io;
pub mod loader;
pub mod models;
pub mod parsing;
pub mod segment;

// Re-export all models and the pipeline entry points
pub use cleanup::{dehyphenate, join_tokens, normalize_ligatures, reconstruct};
pub use folio::{order_folio_names, order_folios};
pub use io::{output_path, write_transcription};
pub use loader::{extract_document, load_transcription};
pub use models::*;
pub use parsing::alto::{parse_layout, ALTO_NAMESPACE};
pub use parsing::zones::{extract_main_zones, ZoneSelector};
pub use segment::segment;
