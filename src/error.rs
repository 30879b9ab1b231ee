//! Error types for transcription and catalogue operations.

use std::path::PathBuf;

use quick_xml::errors::IllFormedError;
use thiserror::Error;

/// Errors that make a single document unprocessable.
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("XML parsing error in {file}: {source}")]
    Xml {
        file: String,
        #[source]
        source: quick_xml::Error,
    },

    #[error("no layout files (*.xml) found in {0}")]
    NoLayoutFiles(PathBuf),

    #[error("file name {0:?} does not match the <prefix>f<number>.xml pattern")]
    MalformedFolioName(String),

    #[error("folio {number} is claimed by both {first:?} and {second:?}")]
    DuplicateFolio {
        number: u64,
        first: String,
        second: String,
    },

    #[error("file name {file:?} does not share the folio prefix {expected:?}")]
    MixedFolioPrefix { file: String, expected: String },

    #[error("catalogue request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("malformed catalogue response: {0}")]
    Catalogue(String),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

// quick-xml reaches `Eof` without complaint when elements are still open or
// when no element was read at all; the readers check both themselves.

pub(crate) fn unclosed_element(name: &[u8]) -> quick_xml::Error {
    quick_xml::Error::IllFormed(IllFormedError::MissingEndTag(
        String::from_utf8_lossy(name).into_owned(),
    ))
}

pub(crate) fn missing_root() -> quick_xml::Error {
    std::io::Error::new(
        std::io::ErrorKind::UnexpectedEof,
        "document has no root element",
    )
    .into()
}
