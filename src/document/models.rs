//! Core data structures for transcription building
//!
//! This module defines the public types used to represent an ordered folio
//! set, a parsed ALTO page, and the finished transcription.

use serde::{Deserialize, Serialize};

use super::parsing::zones::DEFAULT_MAIN_ZONE;
use crate::SegmentationPolicy;

/// Transcription building options
#[derive(Debug, Clone)]
pub struct TranscriptionOptions {
    pub policy: SegmentationPolicy,
    /// Label of the main content zone; `<label>#<n>` continuations follow it
    pub main_zone: String,
}

impl Default for TranscriptionOptions {
    fn default() -> Self {
        Self {
            policy: SegmentationPolicy::default(),
            main_zone: DEFAULT_MAIN_ZONE.to_string(),
        }
    }
}

/// One page file of a manuscript, identified by its folio number
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Folio {
    pub number: u64,
    pub file_name: String,
}

/// The page files of one manuscript directory, in ascending folio order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FolioSequence {
    /// Everything up to and including the folio marker, e.g. `btv1b8452f`
    pub prefix: String,
    pub folios: Vec<Folio>,
}

impl FolioSequence {
    pub fn file_names(&self) -> impl Iterator<Item = &str> {
        self.folios.iter().map(|folio| folio.file_name.as_str())
    }

    pub fn len(&self) -> usize {
        self.folios.len()
    }

    pub fn is_empty(&self) -> bool {
        self.folios.is_empty()
    }
}

/// A zone declared in the page's tag list (`<OtherTag LABEL=.. ID=..>`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneDeclaration {
    pub label: String,
    pub id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextLine {
    /// `CONTENT` of each `<String>`; a missing attribute is stored as ""
    pub strings: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextBlock {
    /// Value of the block's `TAGREFS` attribute, if any
    pub tag_ref: Option<String>,
    pub lines: Vec<TextLine>,
}

/// One parsed ALTO page
#[derive(Debug, Clone, Default)]
pub struct LayoutDocument {
    pub zones: Vec<ZoneDeclaration>,
    pub blocks: Vec<TextBlock>,
}

impl LayoutDocument {
    /// Identifier of the first zone declared with `label`
    pub fn zone_id(&self, label: &str) -> Option<&str> {
        self.zones
            .iter()
            .find(|zone| zone.label == label)
            .map(|zone| zone.id.as_str())
    }

    /// Blocks referencing `zone_id`, in document order
    pub fn blocks_in_zone<'a>(&'a self, zone_id: &'a str) -> impl Iterator<Item = &'a TextBlock> {
        self.blocks
            .iter()
            .filter(move |block| block.tag_ref.as_deref() == Some(zone_id))
    }
}

/// Word tokens gathered from the main zones of every folio, in reading order
#[derive(Debug, Clone, Default)]
pub struct ExtractedText {
    pub tokens: Vec<String>,
    /// Number of folios that contributed at least one main zone
    pub pages_with_text: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptionMetadata {
    pub source_dir: String,
    pub folio_count: usize,
    pub pages_with_text: usize,
    pub token_count: usize,
    pub paragraph_count: usize,
}

/// The rebuilt, segmented text of one manuscript
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transcription {
    pub title: String,
    pub metadata: TranscriptionMetadata,
    pub text: String,
}
