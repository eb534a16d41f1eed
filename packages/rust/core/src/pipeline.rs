//! End-to-end generation: sources → load → build graph → render.
//!
//! Each stage consumes the complete output of the previous one. A run either
//! produces one document or fails before producing anything.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use tracing::{info, instrument};

use lexicon_graph::{Graph, IdentityGraph, LinkClassifier};
use lexicon_render::Document;
use lexicon_shared::{
    AppConfig, ClassifierConfig, LexiconError, PageConfig, Result, TermRecord, resolve_path,
};

use crate::loader::{self, SourceDocument};

/// Inputs of a generation run.
#[derive(Debug, Clone)]
pub struct GenerateConfig {
    /// Directory of `<slug>.json` term files.
    pub data_dir: PathBuf,
    pub identity: IdentityGraph,
    pub page: PageConfig,
    pub classifier: ClassifierConfig,
}

impl GenerateConfig {
    /// Resolve paths in `app` against `config_path` and load the identity graph.
    pub fn from_app_config(config_path: &Path, app: &AppConfig) -> Result<Self> {
        let identity_path = resolve_path(config_path, &app.paths.identity);
        Ok(Self {
            data_dir: resolve_path(config_path, &app.paths.data_dir),
            identity: IdentityGraph::load(&identity_path)?,
            page: app.page.clone(),
            classifier: app.classifier.clone(),
        })
    }
}

/// Validated terms and the graph built from them.
#[derive(Debug, Clone)]
pub struct Checked {
    pub terms: Vec<TermRecord>,
    pub graph: Graph,
}

/// Everything a run derives, in stage order.
#[derive(Debug, Clone)]
pub struct Generated {
    pub terms: Vec<TermRecord>,
    pub graph: Graph,
    pub document: Document,
}

/// Result of [`generate`].
#[derive(Debug)]
pub struct GenerateResult {
    pub generated: Generated,
    pub elapsed: Duration,
}

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new stage.
    fn phase(&self, name: &str);
    /// Called when the run completes.
    fn done(&self, term_count: usize);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn done(&self, _term_count: usize) {}
}

// ---------------------------------------------------------------------------
// Pure stages
// ---------------------------------------------------------------------------

/// Load and validate `docs`, then build the graph. Nothing is rendered.
pub fn check_sources(
    docs: &[SourceDocument],
    identity: &IdentityGraph,
    classifier: &ClassifierConfig,
) -> Result<Checked> {
    let terms = loader::load_terms(docs)?;
    if terms.is_empty() {
        return Err(LexiconError::configuration("no term records found"));
    }

    let classifier = LinkClassifier::new(classifier.clone());
    let graph = lexicon_graph::build(identity, &terms, &classifier)?;

    Ok(Checked { terms, graph })
}

/// Run every stage over in-memory sources.
pub fn generate_from_sources(
    docs: &[SourceDocument],
    identity: &IdentityGraph,
    page: &PageConfig,
    classifier: &ClassifierConfig,
) -> Result<Generated> {
    let Checked { terms, graph } = check_sources(docs, identity, classifier)?;
    let document = lexicon_render::render(&terms, &graph, page)?;
    Ok(Generated {
        terms,
        graph,
        document,
    })
}

// ---------------------------------------------------------------------------
// Runs over a data directory
// ---------------------------------------------------------------------------

/// Run the full pipeline over `config.data_dir`.
#[instrument(skip_all, fields(data_dir = %config.data_dir.display()))]
pub fn generate(config: &GenerateConfig, progress: &dyn ProgressReporter) -> Result<GenerateResult> {
    let start = Instant::now();

    progress.phase("Reading term files");
    let docs = loader::read_source_dir(&config.data_dir)?;

    progress.phase("Validating terms and building graph");
    let Checked { terms, graph } = check_sources(&docs, &config.identity, &config.classifier)?;

    progress.phase("Rendering document");
    let document = lexicon_render::render(&terms, &graph, &config.page)?;

    let elapsed = start.elapsed();
    info!(
        terms = terms.len(),
        bytes = document.len(),
        elapsed_ms = elapsed.as_millis() as u64,
        "generation complete"
    );
    progress.done(terms.len());

    Ok(GenerateResult {
        generated: Generated {
            terms,
            graph,
            document,
        },
        elapsed,
    })
}

/// Validate `config.data_dir` and build the graph without rendering.
#[instrument(skip_all, fields(data_dir = %config.data_dir.display()))]
pub fn check(config: &GenerateConfig, progress: &dyn ProgressReporter) -> Result<Checked> {
    progress.phase("Reading term files");
    let docs = loader::read_source_dir(&config.data_dir)?;

    progress.phase("Validating terms and building graph");
    let checked = check_sources(&docs, &config.identity, &config.classifier)?;

    info!(terms = checked.terms.len(), "check passed");
    progress.done(checked.terms.len());
    Ok(checked)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
