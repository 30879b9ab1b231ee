//! Catalogue metadata
//!
//! Fetches the BnF record of a digitised manuscript and reduces it to the
//! flat attributes needed for the transcription header.

pub mod clean;
pub mod client;
pub mod record;

pub use clean::{clean, Author, CatalogueMetadata, DateCertainty};
pub use client::{CatalogueClient, CatalogueLookup};
pub use record::{parse_search_response, MarcRecord, SearchResponse};
