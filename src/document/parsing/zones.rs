//! Main zone selection
//!
//! A page's main text may be declared as `MainZone`, or split into numbered
//! continuations `MainZone#1`, `MainZone#2`, ... Every other zone
//! (margins, running titles, numbering) is left out of the transcription.

use super::super::models::*;

pub const DEFAULT_MAIN_ZONE: &str = "MainZone";

/// Recognizes the labels of the main content zone
#[derive(Debug, Clone)]
pub struct ZoneSelector {
    base_label: String,
}

impl Default for ZoneSelector {
    fn default() -> Self {
        Self::new(DEFAULT_MAIN_ZONE)
    }
}

impl ZoneSelector {
    pub fn new(base_label: impl Into<String>) -> Self {
        Self {
            base_label: base_label.into(),
        }
    }

    pub fn base_label(&self) -> &str {
        &self.base_label
    }

    /// Sort key of a main zone label: 0 for the base label, `n` for `base#n`.
    /// `None` for any other label.
    pub fn rank(&self, label: &str) -> Option<u64> {
        let rest = label.strip_prefix(self.base_label.as_str())?;
        if rest.is_empty() {
            return Some(0);
        }
        let suffix = rest.strip_prefix('#')?;
        if suffix.is_empty() || !suffix.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        suffix.parse::<u64>().ok()
    }

    /// Main zone labels declared by `document`, base label first, then the
    /// continuations by ascending number. Each label appears once.
    pub fn main_zone_labels<'a>(&self, document: &'a LayoutDocument) -> Vec<&'a str> {
        let mut labels: Vec<(u64, &str)> = document
            .zones
            .iter()
            .filter_map(|zone| self.rank(&zone.label).map(|rank| (rank, zone.label.as_str())))
            .collect();
        labels.sort();
        labels.dedup();
        labels.into_iter().map(|(_, label)| label).collect()
    }
}

/// Word strings of every main zone of `document`, in zone order and then
/// document order. Returns `None` when the page declares no main zone.
pub fn extract_main_zones(document: &LayoutDocument, selector: &ZoneSelector) -> Option<Vec<String>> {
    let labels = selector.main_zone_labels(document);
    if labels.is_empty() {
        return None;
    }

    let mut strings = Vec::new();
    for label in labels {
        let Some(zone_id) = document.zone_id(label) else {
            continue;
        };
        for block in document.blocks_in_zone(zone_id) {
            for line in &block.lines {
                strings.extend(line.strings.iter().cloned());
            }
        }
    }
    Some(strings)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zone(label: &str, id: &str) -> ZoneDeclaration {
        ZoneDeclaration {
            label: label.to_string(),
            id: id.to_string(),
        }
    }

    fn block(tag_ref: &str, words: &[&str]) -> TextBlock {
        TextBlock {
            tag_ref: Some(tag_ref.to_string()),
            lines: vec![TextLine {
                strings: words.iter().map(|w| w.to_string()).collect(),
            }],
        }
    }

    #[test]
    fn test_rank() {
        let selector = ZoneSelector::default();
        assert_eq!(selector.rank("MainZone"), Some(0));
        assert_eq!(selector.rank("MainZone#2"), Some(2));
        assert_eq!(selector.rank("MainZone#10"), Some(10));
        assert_eq!(selector.rank("MainZone#"), None);
        assert_eq!(selector.rank("MainZoneX"), None);
        assert_eq!(selector.rank("MarginTextZone"), None);
    }

    #[test]
    fn test_continuations_follow_numeric_order() {
        let document = LayoutDocument {
            zones: vec![
                zone("MainZone#10", "c"),
                zone("MainZone#2", "b"),
                zone("MainZone", "a"),
            ],
            blocks: vec![block("c", &["ten"]), block("b", &["two"]), block("a", &["base"])],
        };
        let words = extract_main_zones(&document, &ZoneSelector::default()).unwrap();
        assert_eq!(words, vec!["base", "two", "ten"]);
    }

    #[test]
    fn test_first_declaration_wins() {
        let document = LayoutDocument {
            zones: vec![zone("MainZone", "a"), zone("MainZone", "b")],
            blocks: vec![block("b", &["second"]), block("a", &["first"])],
        };
        let words = extract_main_zones(&document, &ZoneSelector::default()).unwrap();
        assert_eq!(words, vec!["first"]);
    }

    #[test]
    fn test_zone_without_blocks_contributes_nothing() {
        let document = LayoutDocument {
            zones: vec![zone("MainZone", "a")],
            blocks: vec![block("other", &["margin"])],
        };
        let words = extract_main_zones(&document, &ZoneSelector::default()).unwrap();
        assert!(words.is_empty());
    }

    #[test]
    fn test_page_without_main_zone() {
        let document = LayoutDocument {
            zones: vec![zone("MarginTextZone", "m")],
            blocks: vec![block("m", &["glosa"])],
        };
        assert!(extract_main_zones(&document, &ZoneSelector::default()).is_none());
    }

    #[test]
    fn test_custom_base_label() {
        let document = LayoutDocument {
            zones: vec![zone("Main", "a"), zone("MainZone", "b")],
            blocks: vec![block("a", &["kept"]), block("b", &["skipped"])],
        };
        let words = extract_main_zones(&document, &ZoneSelector::new("Main")).unwrap();
        assert_eq!(words, vec!["kept"]);
    }
}
