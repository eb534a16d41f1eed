//! Core domain types for lexicon term records.

use std::cmp::Ordering;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Allowed slug shape: lowercase ASCII letters, digits and hyphens.
static SLUG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9-]+$").expect("slug regex"));

// ---------------------------------------------------------------------------
// Slug
// ---------------------------------------------------------------------------

/// Unique identifier of a term, derived from its source record's storage name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Slug(String);

impl Slug {
    /// Accept `raw` as a slug if it matches `[a-z0-9-]+`.
    pub fn parse(raw: &str) -> Option<Self> {
        SLUG_RE.is_match(raw).then(|| Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Slug {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Slug {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Publication order for slugs: case-insensitive, ties broken by raw bytes.
pub fn slug_order(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.as_bytes().cmp(b.as_bytes()))
}

// ---------------------------------------------------------------------------
// TermRecord
// ---------------------------------------------------------------------------

/// One outbound link of a term. The first link of a record is its primary origin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkRecord {
    pub url: String,
    pub label: String,
}

/// A validated term, the only shape downstream stages ever see.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermRecord {
    pub slug: Slug,
    /// Display name.
    pub name: String,
    /// Year or calendar date, kept as free text.
    pub date: String,
    /// Prose shared verbatim by the rendered entry and the graph node.
    pub description: String,
    /// Never empty once loaded.
    pub links: Vec<LinkRecord>,
    #[serde(default, rename = "sameAs", skip_serializing_if = "Vec::is_empty")]
    pub same_as: Vec<String>,
}

impl TermRecord {
    /// The link the term was first defined in.
    pub fn primary_link(&self) -> Option<&LinkRecord> {
        self.links.first()
    }
}
