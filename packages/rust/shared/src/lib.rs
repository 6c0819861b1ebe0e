//! Shared types, error model, and configuration for uscdefs.
//!
//! This crate is the foundation depended on by all other uscdefs crates.
//! It provides:
//! - [`UscDefsError`] — the unified error type
//! - Output types ([`TermDefinition`], [`DefinitionRecord`], [`ClauseType`], [`TermFrequency`])
//! - Configuration ([`AppConfig`], [`BuildConfig`], [`ExtractConfig`], config loading)
//! - [`unique_key`] — marker-suffixed keys for duplicate level numbers and terms

pub mod config;
pub mod error;
pub mod keys;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, BuildConfig, DefaultsConfig, ExtractConfig, LimitsConfig, config_dir,
    config_file_path, init_config, load_config, load_config_from,
};
pub use error::{Result, UscDefsError};
pub use keys::{CHILD_KEY_MARKER, TERM_KEY_MARKER, unique_key};
pub use types::{ClauseType, DefinitionRecord, TermDefinition, TermFrequency};
