//! Shared types, error model, and configuration for lexicon.
//!
//! This crate is the foundation depended on by all other lexicon crates.
//! It provides:
//! - [`LexiconError`]: the unified error type
//! - Domain types ([`Slug`], [`TermRecord`], [`LinkRecord`])
//! - Configuration ([`AppConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, COUNT_PLACEHOLDER, CONFIG_FILE_NAME, ClassifierConfig, PageConfig, PathsConfig,
    init_config, load_config, load_config_from, resolve_path,
};
pub use error::{LexiconError, Result};
pub use types::{LinkRecord, Slug, TermRecord, slug_order};
