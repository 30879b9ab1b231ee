//! Paragraph segmentation
//!
//! The transcriptions carry no sentence markup, so units small enough for
//! the lemmatisation model are recovered from punctuation and a few lexical
//! cues. Each rule is applied once, in order, to the output of the previous
//! rule; a boundary that already starts a unit is left alone.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::ops::Range;

use crate::SegmentationPolicy;

pub const PARAGRAPH_BREAK: &str = "\n\n";

/// Period, whitespace, then a capital (French accented capitals included) or
/// a digit.
static SENTENCE_START: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\.(\s+)[A-ZÀÂÄÇÉÈÊËÎÏÔÖÙÛÜŸÆŒ0-9]").unwrap());

/// Period, whitespace, then a coordinating conjunction.
static CONJUNCTION_START: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\.(\s+)(?:et|car|ou|donc|mais|ni)\b").unwrap());

/// Capitalised "Et" before a space or tab, and the paragraph marks. A line
/// break after "Et" is one this rule inserted itself.
static PARAGRAPH_MARK: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bEt[ \t]|[⁋¶]").unwrap());

static CLAUSE_END: Lazy<Regex> = Lazy::new(|| Regex::new(r"[;!?:](\s+)").unwrap());

static LEGACY_SENTENCE_START: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\.\s)([A-ZÉÀ])").unwrap());
static LEGACY_PARAGRAPH_MARK: Lazy<Regex> = Lazy::new(|| Regex::new(r"Et\s|⁋|¶").unwrap());
static LEGACY_CLAUSE_END: Lazy<Regex> = Lazy::new(|| Regex::new(r"[;?!:]").unwrap());

/// Insert paragraph breaks into running text according to `policy`.
pub fn segment(text: &str, policy: SegmentationPolicy) -> String {
    match policy {
        SegmentationPolicy::Canonical => segment_canonical(text),
        SegmentationPolicy::Legacy => segment_legacy(text),
    }
}

fn segment_canonical(text: &str) -> String {
    let text = break_at(text, &SENTENCE_START, |caps| caps.get(1).map(|m| m.range()));
    let text = break_at(&text, &CONJUNCTION_START, |caps| {
        caps.get(1).map(|m| m.range())
    });
    let text = break_at(&text, &PARAGRAPH_MARK, |caps| {
        let start = caps.get(0)?.start();
        Some(start..start)
    });
    let len = text.len();
    break_at(&text, &CLAUSE_END, |caps| {
        // Trailing punctuation does not open a new unit
        caps.get(1).map(|m| m.range()).filter(|gap| gap.end < len)
    })
}

/// Replace the gap chosen by `gap` in every match of `pattern` with a
/// paragraph break. Spaces left in front of the break are dropped. Nothing is
/// inserted when the gap already starts a unit; a `None` gap leaves the match
/// untouched.
fn break_at<F>(text: &str, pattern: &Regex, gap: F) -> String
where
    F: Fn(&Captures) -> Option<Range<usize>>,
{
    let mut out = String::with_capacity(text.len() + 16);
    let mut last = 0;

    for caps in pattern.captures_iter(text) {
        let Some(range) = gap(&caps) else {
            continue;
        };
        out.push_str(&text[last..range.start]);
        if starts_unit(&out) {
            out.push_str(&text[range.clone()]);
        } else {
            let kept = out.trim_end_matches([' ', '\t']).len();
            out.truncate(kept);
            out.push_str(PARAGRAPH_BREAK);
        }
        last = range.end;
    }

    out.push_str(&text[last..]);
    out
}

fn starts_unit(preceding: &str) -> bool {
    let trimmed = preceding.trim_end_matches([' ', '\t']);
    trimmed.is_empty() || trimmed.ends_with('\n')
}

fn segment_legacy(text: &str) -> String {
    let text = LEGACY_SENTENCE_START.replace_all(text, "${1}\n\n${2}");

    let mut marked = String::with_capacity(text.len() + 16);
    let mut last = 0;
    for m in LEGACY_PARAGRAPH_MARK.find_iter(&text) {
        marked.push_str(&text[last..m.start()]);
        let preceding = &text[..m.start()];
        if !preceding.is_empty() && !preceding.ends_with(PARAGRAPH_BREAK) {
            marked.push_str(PARAGRAPH_BREAK);
        }
        marked.push_str(m.as_str());
        last = m.end();
    }
    marked.push_str(&text[last..]);

    let mut out = String::with_capacity(marked.len() + 16);
    let mut last = 0;
    for m in LEGACY_CLAUSE_END.find_iter(&marked) {
        out.push_str(&marked[last..m.end()]);
        if !marked[..m.start()].ends_with(PARAGRAPH_BREAK) {
            out.push_str(PARAGRAPH_BREAK);
        }
        last = m.end();
    }
    out.push_str(&marked[last..]);
    out
}
