//! Definition extraction and end-to-end lookups for uscdefs.
//!
//! This crate ties the document model to the extraction passes:
//! - [`extractor`] — term discovery and definition binding
//! - [`stats`] — term frequencies against the whole title
//! - [`pipeline`] — title code + level → results, including file loading

pub mod extractor;
pub mod pipeline;
pub mod stats;

pub use extractor::{DefinitionExtractor, discover_terms, extract_defined_terms};
pub use pipeline::{LoadedTitle, define, defined_terms, load_title, sentences, term_statistics};
pub use stats::{ScanProgress, SilentProgress, term_frequencies, title_definition_counts};
