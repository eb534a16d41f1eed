//! Error types for lexicon.
//!
//! Library crates use [`LexiconError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.
//!
//! Every variant is fatal to a generation run: the pipeline either produces a
//! complete artifact or nothing at all.

use std::path::PathBuf;

/// Top-level error type for all lexicon operations.
#[derive(Debug, thiserror::Error)]
pub enum LexiconError {
    /// A term record failed the schema (missing, empty, or mistyped field).
    #[error("validation error in term '{slug}': field '{field}' {reason}")]
    Validation {
        slug: String,
        field: String,
        reason: String,
    },

    /// Two source records resolved to the same slug.
    #[error("duplicate slug '{slug}': claimed by both {first} and {second}")]
    DuplicateSlug {
        slug: String,
        first: String,
        second: String,
    },

    /// The fixed identity graph (or the run's input set) is incomplete.
    #[error("configuration error: {message}")]
    Configuration { message: String },

    /// Configuration file loading or parsing error.
    #[error("config error: {message}")]
    Config { message: String },

    /// A source document could not be parsed as JSON.
    #[error("parse error in {source_id}: {message}")]
    Parse { source_id: String, message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The built graph's cross-references do not agree.
    #[error("graph integrity error: {message}")]
    Integrity { message: String },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, LexiconError>;

impl LexiconError {
    /// Create a validation error for one field of one term.
    pub fn validation(
        slug: impl Into<String>,
        field: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::Validation {
            slug: slug.into(),
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Create a duplicate-slug error naming both claimants.
    pub fn duplicate_slug(
        slug: impl Into<String>,
        first: impl Into<String>,
        second: impl Into<String>,
    ) -> Self {
        Self::DuplicateSlug {
            slug: slug.into(),
            first: first.into(),
            second: second.into(),
        }
    }

    /// Create a configuration error from any displayable message.
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration {
            message: msg.into(),
        }
    }

    /// Create a config-file error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a parse error for a named source document.
    pub fn parse(source_id: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Parse {
            source_id: source_id.into(),
            message: msg.into(),
        }
    }

    /// Create an integrity error from any displayable message.
    pub fn integrity(msg: impl Into<String>) -> Self {
        Self::Integrity {
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
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = LexiconError::validation("lords-of-zero", "description", "must not be empty");
        assert_eq!(
            err.to_string(),
            "validation error in term 'lords-of-zero': field 'description' must not be empty"
        );

        let err = LexiconError::duplicate_slug("cronofuturism", "a/cronofuturism.json", "b/cronofuturism.json");
        assert!(err.to_string().contains("a/cronofuturism.json"));
        assert!(err.to_string().contains("b/cronofuturism.json"));

        let err = LexiconError::configuration("identity graph has no Person node");
        assert_eq!(
            err.to_string(),
            "configuration error: identity graph has no Person node"
        );
    }

    #[test]
    fn parse_error_names_source() {
        let err = LexiconError::parse("broken.json", "expected value at line 1 column 1");
        assert!(err.to_string().starts_with("parse error in broken.json"));
    }
}
