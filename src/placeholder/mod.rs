//! Placeholder location and format-preserving substitution
//!
//! Occurrences are computed fresh per substitution pass and never
//! persisted.

pub mod engine;
pub mod locator;

pub use engine::{bindings_from_strings, substitute, Bindings, Replacement};
pub use locator::{scan_document, scan_runs, Located, Occurrence};
