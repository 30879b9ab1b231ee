//! Layout parsing utilities
//!
//! This module contains the ALTO reader and the selection of the zones whose
//! text belongs to the transcription.

pub mod alto;
pub mod zones;
