//! Error types for uscdefs.
//!
//! Library crates use [`UscDefsError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all uscdefs operations.
#[derive(Debug, thiserror::Error)]
pub enum UscDefsError {
    /// Malformed level locator string.
    #[error("validation error: {message}")]
    Validation { message: String },

    /// No element in the document carries the computed identifier.
    #[error("level not found: {identifier}")]
    LevelNotFound { identifier: String },

    /// A hierarchy element was reached that has no `identifier` attribute.
    ///
    /// Happens for quoted sections embedded in annotation notes.
    #[error("level has no identifier: <{tag}>")]
    LevelHasNoId { tag: String },

    /// Extraction completed but bound no definitions.
    #[error("no term definitions found in {level}")]
    NoDefinitionsFound { level: String },

    /// Source data broke an assumption well-formed input never breaks.
    #[error("invariant violation: {message}")]
    Invariant { message: String },

    /// The markup source could not be parsed.
    #[error("xml error: {message}")]
    Xml { message: String },

    /// A title code is missing from the configured title table.
    #[error("unknown title code: {code}")]
    UnknownTitle { code: String },

    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, UscDefsError>;

impl UscDefsError {
    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Create an invariant violation from any displayable message.
    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::Invariant {
            message: msg.into(),
        }
    }

    /// Create an XML parse error from any displayable message.
    pub fn xml(msg: impl Into<String>) -> Self {
        Self::Xml {
            message: msg.into(),
        }
    }

    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Fixed, user-facing text for each error kind.
    ///
    /// The presentation layer shows this instead of the diagnostic `Display`
    /// output, so "nothing defined here" reads differently from "no such section".
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "Invalid section id.",
            Self::LevelNotFound { .. } => "Section does not exist.",
            Self::LevelHasNoId { .. } => "Section has no valid id.",
            Self::NoDefinitionsFound { .. } => "No term definitions found.",
            Self::UnknownTitle { .. } => "Unknown title.",
            Self::Invariant { .. } | Self::Xml { .. } => "The source document is malformed.",
            Self::Config { .. } | Self::Io { .. } => "The title could not be loaded.",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = UscDefsError::validation("invalid level id: 7701");
        assert_eq!(err.to_string(), "validation error: invalid level id: 7701");

        let err = UscDefsError::LevelNotFound {
            identifier: "/us/usc/t26/s9999".into(),
        };
        assert!(err.to_string().contains("/us/usc/t26/s9999"));
    }

    #[test]
    fn user_messages_distinguish_kinds() {
        let not_found = UscDefsError::LevelNotFound {
            identifier: "x".into(),
        };
        let no_defs = UscDefsError::NoDefinitionsFound { level: "s1".into() };
        let no_id = UscDefsError::LevelHasNoId {
            tag: "section".into(),
        };

        assert_eq!(not_found.user_message(), "Section does not exist.");
        assert_eq!(no_defs.user_message(), "No term definitions found.");
        assert_eq!(no_id.user_message(), "Section has no valid id.");
    }
}
