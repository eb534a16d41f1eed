//! Artifact writer.
//!
//! Publishes a rendered document to disk with an atomic replace, so readers
//! see either the previous artifact or the complete new one.

use std::path::Path;

use serde::Serialize;
use tracing::{debug, info, instrument};

use lexicon_render::Document;
use lexicon_shared::{LexiconError, Result};

/// Metadata for a written artifact file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactMeta {
    pub filename: String,
    pub sha256: String,
    pub size_bytes: usize,
}

/// Write `document` to `target` (temp file, then rename).
#[instrument(skip_all, fields(target = %target.display(), terms = document.term_count))]
pub fn write_document(target: &Path, document: &Document) -> Result<ArtifactMeta> {
    let filename = target
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| {
            LexiconError::configuration(format!("output path {} has no file name", target.display()))
        })?
        .to_string();

    let dir = match target.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => std::path::PathBuf::from("."),
    };
    std::fs::create_dir_all(&dir).map_err(|e| LexiconError::io(&dir, e))?;

    let temp = dir.join(format!(".{filename}.tmp"));

    // Write to temp file first
    std::fs::write(&temp, &document.html).map_err(|e| LexiconError::io(&temp, e))?;

    // Atomic rename
    if let Err(e) = std::fs::rename(&temp, target) {
        let _ = std::fs::remove_file(&temp);
        return Err(LexiconError::io(target, e));
    }

    debug!(file = %filename, size = document.len(), "wrote artifact");

    let meta = ArtifactMeta {
        filename,
        sha256: document.sha256(),
        size_bytes: document.len(),
    };
    info!(sha256 = %meta.sha256, "artifact published");
    Ok(meta)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
