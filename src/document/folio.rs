//! Folio ordering
//!
//! Page files are named `<prefix>f<number>.xml`. A lexical directory listing
//! puts `f10` before `f2`, so the files are re-ordered by the numeric folio.

use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;

use super::models::{Folio, FolioSequence};
use crate::error::{Error, Result};

// Greedy prefix: the folio number follows the last `f` of the name.
static FOLIO_NAME: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(.*f)(\d+)\.(?i:xml)$").unwrap());

/// Returns the layout file names of `dir` in ascending folio order.
pub fn order_folios(dir: &Path) -> Result<FolioSequence> {
    let names = list_layout_files(dir)?;
    order_folio_names(&names).map_err(|err| match err {
        Error::NoLayoutFiles(_) => Error::NoLayoutFiles(dir.to_path_buf()),
        other => other,
    })
}

/// Orders a set of file names by folio number.
///
/// The common prefix is recovered from the first name; every other name must
/// share it and no folio number may appear twice.
pub fn order_folio_names<S: AsRef<str>>(names: &[S]) -> Result<FolioSequence> {
    let mut prefix: Option<String> = None;
    let mut folios = Vec::with_capacity(names.len());

    for name in names {
        let name = name.as_ref();
        let (name_prefix, number) = parse_folio_name(name)?;
        match &prefix {
            None => prefix = Some(name_prefix.to_string()),
            Some(expected) if expected != name_prefix => {
                return Err(Error::MixedFolioPrefix {
                    file: name.to_string(),
                    expected: expected.clone(),
                });
            }
            Some(_) => {}
        }
        folios.push(Folio {
            number,
            file_name: name.to_string(),
        });
    }

    let Some(prefix) = prefix else {
        return Err(Error::NoLayoutFiles(Default::default()));
    };

    folios.sort_by_key(|folio| folio.number);
    if let Some(pair) = folios.windows(2).find(|pair| pair[0].number == pair[1].number) {
        return Err(Error::DuplicateFolio {
            number: pair[0].number,
            first: pair[0].file_name.clone(),
            second: pair[1].file_name.clone(),
        });
    }

    Ok(FolioSequence { prefix, folios })
}

/// Splits `btv1b8452f12.xml` into (`btv1b8452f`, 12).
pub fn parse_folio_name(name: &str) -> Result<(&str, u64)> {
    let captures = FOLIO_NAME
        .captures(name)
        .ok_or_else(|| Error::MalformedFolioName(name.to_string()))?;
    let prefix = captures.get(1).map_or("", |m| m.as_str());
    let number = captures[2]
        .parse::<u64>()
        .map_err(|_| Error::MalformedFolioName(name.to_string()))?;
    Ok((prefix, number))
}

/// Names of the regular `.xml` files in `dir`, sorted lexically so the prefix
/// source is deterministic.
fn list_layout_files(dir: &Path) -> Result<Vec<String>> {
    let entries = std::fs::read_dir(dir).map_err(|e| Error::io(dir, e))?;

    let mut names = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| Error::io(dir, e))?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let is_xml = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("xml"));
        if !is_xml {
            debug!("skipping non-layout file {}", path.display());
            continue;
        }
        match entry.file_name().into_string() {
            Ok(name) => names.push(name),
            Err(raw) => return Err(Error::MalformedFolioName(raw.to_string_lossy().into_owned())),
        }
    }

    if names.is_empty() {
        return Err(Error::NoLayoutFiles(dir.to_path_buf()));
    }
    names.sort();
    Ok(names)
}
