//! Metadata cleaning
//!
//! Maps a UNIMARC record to the flat set of attributes used in the header of
//! the transcription. Every field is optional: a missing tag leaves its
//! attribute unset.

use serde::{Deserialize, Serialize};

use super::record::{DataField, MarcRecord};

/// Name particles, in the order they are tried. Longer particles come before
/// the particles they start with.
pub const NAME_PARTICLES: &[&str] = &["van der", "de la", "de", "du", "von", "van"];

/// Responsibility statement for dates read from the coded field 100
pub const DATE_RESPONSIBILITY: &str = "BNF";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateCertainty {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub isni: Option<String>,
    pub primary_name: Option<String>,
    pub secondary_name: Option<String>,
    pub namelink: Option<String>,
    pub xmlid: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogueMetadata {
    pub found: bool,
    pub authors: Option<Vec<Author>>,
    pub title: Option<String>,
    pub ptr: Option<String>,
    pub pubplace: Option<String>,
    pub pubplace_key: Option<String>,
    pub publisher: Option<String>,
    pub date: Option<String>,
    pub when: Option<String>,
    pub date_cert: Option<DateCertainty>,
    pub date_resp: Option<String>,
    pub country: Option<String>,
    pub idno: Option<String>,
    pub objectdesc: Option<String>,
    pub lang: Option<String>,
}

/// Clean a catalogue record; `None` means the lookup found nothing.
pub fn clean(record: Option<&MarcRecord>) -> CatalogueMetadata {
    let Some(record) = record else {
        return CatalogueMetadata::default();
    };

    let owned = |value: Option<&str>| value.map(str::to_string);

    let mut data = CatalogueMetadata {
        found: true,
        authors: Some(clean_authors(record)),
        ptr: owned(record.control_field("003")),
        lang: owned(record.first_subfield("101", "a")),
        pubplace_key: owned(record.first_subfield("102", "a")),
        title: owned(record.first_subfield("200", "a")),
        objectdesc: owned(record.first_subfield("200", "b")),
        pubplace: owned(record.first_subfield("210", "a")),
        publisher: owned(record.first_subfield("210", "c")),
        country: owned(record.first_subfield("801", "a")),
        idno: owned(record.first_subfield("930", "a")),
        ..CatalogueMetadata::default()
    };

    match record.first_subfield("100", "a").and_then(coded_date) {
        Some((year, code)) => {
            data.date = Some(year.clone());
            data.when = Some(year);
            data.date_cert = date_certainty(code);
            data.date_resp = Some(DATE_RESPONSIBILITY.to_string());
        }
        None => data.date = owned(record.first_subfield("210", "d")),
    }

    data
}

/// Year and date-type code of a 100$a general processing field. The type
/// code sits at position 8 and the first date at 9..13; an unknown date
/// (`u`) or a truncated field yields `None`.
fn coded_date(field: &str) -> Option<(String, char)> {
    let chars: Vec<char> = field.chars().collect();
    if chars.len() < 13 {
        return None;
    }
    let code = chars[8];
    if code == 'u' {
        return None;
    }
    Some((chars[9..13].iter().collect(), code))
}

/// Certainty of the publication date for a UNIMARC date-type code.
pub fn date_certainty(code: char) -> Option<DateCertainty> {
    match code {
        'a' | 'b' | 'd' | 'e' | 'h' | 'i' | 'j' => Some(DateCertainty::High),
        'g' | 'k' => Some(DateCertainty::Medium),
        'f' => Some(DateCertainty::Low),
        _ => None,
    }
}

/// Authors from the primary (700, not repeatable) and secondary (701)
/// responsibility fields, numbered from 1.
pub fn clean_authors(record: &MarcRecord) -> Vec<Author> {
    record
        .data_fields("700")
        .take(1)
        .chain(record.data_fields("701"))
        .enumerate()
        .map(|(index, field)| author_data(field, index + 1))
        .collect()
}

pub fn author_data(field: &DataField, ordinal: usize) -> Author {
    let isni = field
        .subfield("o")
        .and_then(|value| value.strip_prefix("ISNI"))
        .map(|value| value.trim().to_string());

    let primary_name = field
        .subfield("a")
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string);

    let (namelink, secondary_name) = match field.subfield("b") {
        Some(value) => split_name_particle(value),
        None => (None, None),
    };

    let xmlid = match primary_name.as_deref().or(secondary_name.as_deref()) {
        Some(name) => format!("{}{ordinal}", name.chars().take(2).collect::<String>()),
        None => format!("au{ordinal}"),
    };

    Author {
        isni,
        primary_name,
        secondary_name,
        namelink: namelink.map(str::to_string),
        xmlid,
    }
}

/// Separate a name particle from the rest of a secondary name.
///
/// Particles are matched as whole words, in `NAME_PARTICLES` order. The
/// remainder is `None` when nothing but the particle was given.
pub fn split_name_particle(name: &str) -> (Option<&'static str>, Option<String>) {
    let words: Vec<&str> = name.split_whitespace().collect();

    for particle in NAME_PARTICLES {
        let particle_words: Vec<&str> = particle.split(' ').collect();
        let width = particle_words.len();
        if words.len() < width {
            continue;
        }
        if let Some(start) = (0..=words.len() - width)
            .find(|&start| words[start..start + width] == particle_words[..])
        {
            let rest: Vec<&str> = words[..start]
                .iter()
                .chain(&words[start + width..])
                .copied()
                .collect();
            return (Some(*particle), non_empty(rest.join(" ")));
        }
    }

    (None, non_empty(words.join(" ")))
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() { None } else { Some(value) }
}
