//! Term loader and validator.
//!
//! Source documents are untyped JSON objects. This module is the only place
//! that looks at their shape: everything past [`load_terms`] works with
//! checked [`TermRecord`]s. A slug always comes from the document's storage
//! name, never from a field inside it.

use std::collections::HashMap;
use std::path::Path;

use serde_json::{Map, Value};
use tracing::{debug, info, instrument, warn};

use lexicon_shared::{LexiconError, LinkRecord, Result, Slug, TermRecord, slug_order};

/// Suffix stripped from a storage name to obtain the slug.
pub const SOURCE_SUFFIX: &str = ".json";

const KNOWN_FIELDS: &[&str] = &["name", "date", "description", "links", "sameAs"];

/// One raw source record and the identifier it is stored under.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceDocument {
    /// Storage identifier, e.g. `lords-of-zero.json` or `data/lords-of-zero.json`.
    pub id: String,
    pub body: Value,
}

/// Read every `*.json` file in `dir`, in file-name order.
#[instrument(skip_all, fields(dir = %dir.display()))]
pub fn read_source_dir(dir: &Path) -> Result<Vec<SourceDocument>> {
    if !dir.is_dir() {
        return Err(LexiconError::configuration(format!(
            "data directory not found at {}",
            dir.display()
        )));
    }

    let mut paths = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(|e| LexiconError::io(dir, e))? {
        let path = entry.map_err(|e| LexiconError::io(dir, e))?.path();
        let is_source = path.is_file()
            && path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.ends_with(SOURCE_SUFFIX));
        if is_source {
            paths.push(path);
        }
    }
    paths.sort();

    let mut docs = Vec::with_capacity(paths.len());
    for path in paths {
        let id = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_string();
        let content = std::fs::read_to_string(&path).map_err(|e| LexiconError::io(&path, e))?;
        let body = serde_json::from_str(&content).map_err(|e| LexiconError::parse(&id, e.to_string()))?;
        docs.push(SourceDocument { id, body });
    }

    debug!(count = docs.len(), "read source documents");
    Ok(docs)
}

/// Derive the slug from a storage identifier: last path component minus `.json`.
pub fn slug_from_source_id(id: &str) -> Result<Slug> {
    let name = id.rsplit(|c: char| c == '/' || c == '\\').next().unwrap_or(id);
    let stem = name.strip_suffix(SOURCE_SUFFIX).ok_or_else(|| {
        LexiconError::validation(id, "slug", format!("storage name must end in {SOURCE_SUFFIX}"))
    })?;
    Slug::parse(stem).ok_or_else(|| {
        LexiconError::validation(stem, "slug", "must match [a-z0-9-]+")
    })
}

/// Validate every document and return the terms sorted by slug.
///
/// Any invalid record or slug collision aborts the whole load.
#[instrument(skip_all, fields(documents = docs.len()))]
pub fn load_terms(docs: &[SourceDocument]) -> Result<Vec<TermRecord>> {
    let mut seen: HashMap<String, &str> = HashMap::with_capacity(docs.len());
    let mut terms = Vec::with_capacity(docs.len());

    for doc in docs {
        let slug = slug_from_source_id(&doc.id)?;
        if let Some(first) = seen.insert(slug.to_string(), &doc.id) {
            return Err(LexiconError::duplicate_slug(slug.as_str(), first, &doc.id));
        }
        let term = validate(slug, &doc.body)?;
        debug!(slug = %term.slug, links = term.links.len(), "term validated");
        terms.push(term);
    }

    terms.sort_by(|a, b| slug_order(a.slug.as_str(), b.slug.as_str()));

    info!(count = terms.len(), "terms loaded");
    Ok(terms)
}

// ---------------------------------------------------------------------------
// Field validation
// ---------------------------------------------------------------------------

fn validate(slug: Slug, body: &Value) -> Result<TermRecord> {
    let obj = body
        .as_object()
        .ok_or_else(|| LexiconError::validation(slug.as_str(), "<document>", "must be a JSON object"))?;

    for key in obj.keys() {
        if !KNOWN_FIELDS.contains(&key.as_str()) {
            warn!(slug = %slug, field = %key, "ignoring unknown field");
        }
    }

    let s = slug.as_str();
    let name = required_text(s, obj, "name")?;
    let date = required_text(s, obj, "date")?;
    let description = required_text(s, obj, "description")?;
    let links = links(s, obj)?;
    let same_as = same_as(s, obj)?;

    Ok(TermRecord {
        slug,
        name,
        date,
        description,
        links,
        same_as,
    })
}

fn required_text(slug: &str, obj: &Map<String, Value>, field: &str) -> Result<String> {
    text(slug, obj.get(field), field)
}

fn text(slug: &str, value: Option<&Value>, field: &str) -> Result<String> {
    match value {
        None | Some(Value::Null) => Err(LexiconError::validation(slug, field, "is missing")),
        Some(Value::String(s)) if s.trim().is_empty() => {
            Err(LexiconError::validation(slug, field, "must not be empty"))
        }
        Some(Value::String(s)) => Ok(s.clone()),
        Some(_) => Err(LexiconError::validation(slug, field, "must be a string")),
    }
}

fn links(slug: &str, obj: &Map<String, Value>) -> Result<Vec<LinkRecord>> {
    let items = match obj.get("links") {
        None | Some(Value::Null) => {
            return Err(LexiconError::validation(slug, "links", "is missing"));
        }
        Some(Value::Array(items)) => items,
        Some(_) => return Err(LexiconError::validation(slug, "links", "must be an array")),
    };
    if items.is_empty() {
        return Err(LexiconError::validation(slug, "links", "must contain at least one link"));
    }

    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let field = format!("links[{i}]");
            let link = item
                .as_object()
                .ok_or_else(|| LexiconError::validation(slug, &field, "must be an object"))?;
            Ok(LinkRecord {
                url: text(slug, link.get("url"), &format!("{field}.url"))?,
                label: text(slug, link.get("label"), &format!("{field}.label"))?,
            })
        })
        .collect()
}

fn same_as(slug: &str, obj: &Map<String, Value>) -> Result<Vec<String>> {
    match obj.get("sameAs") {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => items
            .iter()
            .enumerate()
            .map(|(i, item)| text(slug, Some(item), &format!("sameAs[{i}]")))
            .collect(),
        Some(_) => Err(LexiconError::validation(slug, "sameAs", "must be an array")),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
