//! Text reconstruction
//!
//! This module turns the flat list of word strings into one running text:
//! tokens are joined with a marker that cannot occur in a transcription, so
//! hyphens left at the end of a line or page can be told apart from hyphens
//! inside a word.

use once_cell::sync::Lazy;
use regex::Regex;

use super::segment::segment;
use crate::SegmentationPolicy;

/// U+001F INFORMATION SEPARATOR ONE
pub const CANONICAL_JOIN_MARKER: &str = "\u{1f}";
pub const LEGACY_JOIN_MARKER: &str = "%%";

/// Tironian "et", the scribal abbreviation of the conjunction
pub const TIRONIAN_ET: char = '\u{204a}';

// Hyphen, not sign, soft hyphen and double oblique hyphen.
static CANONICAL_LINE_BREAK_HYPHEN: Lazy<Regex> =
    Lazy::new(|| Regex::new("[-\u{ac}\u{ad}\u{2e17}]\u{1f}").unwrap());
static LEGACY_LINE_BREAK_HYPHEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[¬|\-]%%").unwrap());

pub fn join_marker(policy: SegmentationPolicy) -> &'static str {
    match policy {
        SegmentationPolicy::Canonical => CANONICAL_JOIN_MARKER,
        SegmentationPolicy::Legacy => LEGACY_JOIN_MARKER,
    }
}

/// Concatenate word strings, separated by the policy's join marker.
pub fn join_tokens<S: AsRef<str>>(tokens: &[S], policy: SegmentationPolicy) -> String {
    let marker = join_marker(policy);
    let mut joined = String::new();
    for (index, token) in tokens.iter().enumerate() {
        if index > 0 {
            joined.push_str(marker);
        }
        joined.push_str(token.as_ref());
    }
    joined
}

/// Fuse words broken across a line or page: a hyphen directly followed by a
/// join marker is removed along with the marker. Every other marker becomes
/// a single space.
pub fn dehyphenate(joined: &str, policy: SegmentationPolicy) -> String {
    let hyphen = match policy {
        SegmentationPolicy::Canonical => &*CANONICAL_LINE_BREAK_HYPHEN,
        SegmentationPolicy::Legacy => &*LEGACY_LINE_BREAK_HYPHEN,
    };
    hyphen
        .replace_all(joined, "")
        .replace(join_marker(policy), " ")
}

/// Expand every Tironian "et" to the word `et`.
pub fn normalize_ligatures(text: &str) -> String {
    text.replace(TIRONIAN_ET, "et")
}

/// Run the whole reconstruction pipeline of `policy` over a document's word
/// strings.
pub fn reconstruct<S: AsRef<str>>(tokens: &[S], policy: SegmentationPolicy) -> String {
    let joined = join_tokens(tokens, policy);
    let running = match policy {
        SegmentationPolicy::Canonical => normalize_ligatures(&dehyphenate(&joined, policy)),
        SegmentationPolicy::Legacy => dehyphenate(&normalize_ligatures(&joined), policy),
    };
    segment(&running, policy)
}

/// Number of non-empty paragraphs in a reconstructed text.
pub(crate) fn count_paragraphs(text: &str) -> usize {
    text.split("\n\n")
        .filter(|paragraph| !paragraph.trim().is_empty())
        .count()
}
