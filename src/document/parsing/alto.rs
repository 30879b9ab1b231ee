//! ALTO page parsing
//!
//! Streams an ALTO file with quick-xml and keeps only what transcription
//! needs: the zone declarations of the tag list and the text blocks with
//! their lines and word strings. Elements are matched by local name so the
//! v2, v3 and v4 schemas are all accepted.

use log::warn;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use super::super::models::*;
use crate::error::{missing_root, unclosed_element};

/// Namespace of the ALTO v4 schema produced by eScriptorium and Kraken
pub const ALTO_NAMESPACE: &str = "http://www.loc.gov/standards/alto/ns-v4#";

const ALTO_NAMESPACE_ROOT: &str = "http://www.loc.gov/standards/alto/";

/// Parse one ALTO page.
pub fn parse_layout(xml: &str) -> Result<LayoutDocument, quick_xml::Error> {
    let mut reader = Reader::from_str(strip_bom(xml));
    reader.config_mut().trim_text(true);

    let mut document = LayoutDocument::default();
    // Local names of the currently open elements
    let mut open: Vec<Vec<u8>> = Vec::new();
    let mut current_block: Option<usize> = None;
    let mut seen_root = false;

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                let local = e.local_name().as_ref().to_vec();
                if open.is_empty() {
                    check_root_namespace(&e)?;
                }
                seen_root = true;
                handle_element(&e, &local, &open, &mut document, &mut current_block)?;
                open.push(local);
            }
            Event::Empty(e) => {
                seen_root = true;
                let local = e.local_name().as_ref().to_vec();
                handle_element(&e, &local, &open, &mut document, &mut current_block)?;
                if local == b"TextBlock" {
                    current_block = None;
                }
            }
            Event::End(e) => {
                if e.local_name().as_ref() == b"TextBlock" {
                    current_block = None;
                }
                open.pop();
            }
            Event::Eof => {
                if let Some(name) = open.last() {
                    return Err(unclosed_element(name));
                }
                if !seen_root {
                    return Err(missing_root());
                }
                break;
            }
            _ => {}
        }
    }

    Ok(document)
}

fn handle_element(
    e: &BytesStart,
    local: &[u8],
    open: &[Vec<u8>],
    document: &mut LayoutDocument,
    current_block: &mut Option<usize>,
) -> Result<(), quick_xml::Error> {
    let parent = open.last().map(Vec::as_slice);

    match local {
        b"OtherTag" => {
            let label = attribute(e, b"LABEL")?;
            let id = attribute(e, b"ID")?;
            if let (Some(label), Some(id)) = (label, id) {
                document.zones.push(ZoneDeclaration { label, id });
            }
        }
        b"TextBlock" => {
            document.blocks.push(TextBlock {
                tag_ref: attribute(e, b"TAGREFS")?,
                lines: Vec::new(),
            });
            *current_block = Some(document.blocks.len() - 1);
        }
        b"TextLine" if parent == Some(b"TextBlock".as_slice()) => {
            if let Some(index) = *current_block {
                document.blocks[index].lines.push(TextLine::default());
            }
        }
        b"String" if parent == Some(b"TextLine".as_slice()) && line_in_block(open) => {
            let content = attribute(e, b"CONTENT")?.unwrap_or_default();
            if let Some(line) = current_block
                .and_then(|index| document.blocks[index].lines.last_mut())
            {
                line.strings.push(content);
            }
        }
        _ => {}
    }

    Ok(())
}

/// True when the innermost open `TextLine` sits directly in a `TextBlock`.
fn line_in_block(open: &[Vec<u8>]) -> bool {
    open.len() >= 2 && open[open.len() - 2] == b"TextBlock"
}

fn attribute(e: &BytesStart, key: &[u8]) -> Result<Option<String>, quick_xml::Error> {
    for attr in e.attributes() {
        let attr = attr?;
        if attr.key.local_name().as_ref() == key {
            return Ok(Some(attr.unescape_value()?.into_owned()));
        }
    }
    Ok(None)
}

fn check_root_namespace(e: &BytesStart) -> Result<(), quick_xml::Error> {
    for attr in e.attributes() {
        let attr = attr?;
        let key = attr.key.as_ref();
        if (key == b"xmlns" || key.starts_with(b"xmlns:"))
            && attr.value.starts_with(ALTO_NAMESPACE_ROOT.as_bytes())
        {
            return Ok(());
        }
    }
    warn!("root element declares no ALTO namespace");
    Ok(())
}

fn strip_bom(xml: &str) -> &str {
    xml.strip_prefix('\u{feff}').unwrap_or(xml)
}
