//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use color_eyre::eyre::Result;
use indicatif::{ProgressBar, ProgressStyle};
use lexicon_core::assembler;
use lexicon_core::pipeline::{self, GenerateConfig, ProgressReporter};
use lexicon_graph::LinkClassifier;
use lexicon_shared::{AppConfig, CONFIG_FILE_NAME, init_config, load_config, resolve_path};
use tracing::info;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// Lexicon: turn a folder of term files into a searchable glossary page.
#[derive(Parser)]
#[command(
    name = "lexicon",
    version,
    about = "Generate a single-page term lexicon with schema.org structured data.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to the config file. Relative paths inside it resolve against its directory.
    #[arg(long, default_value = CONFIG_FILE_NAME, env = "LEXICON_CONFIG", global = true)]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Load, validate, and render the lexicon page.
    Generate {
        /// Directory of term files (overrides `paths.data_dir`).
        #[arg(short, long)]
        data: Option<PathBuf>,

        /// Output HTML file (overrides `paths.output`).
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Validate term files and the identity graph without writing anything.
    Check {
        /// Directory of term files (overrides `paths.data_dir`).
        #[arg(short, long)]
        data: Option<PathBuf>,
    },

    /// Show which provenance type each URL would be recorded as.
    Classify {
        /// URLs to classify.
        #[arg(required = true)]
        urls: Vec<String>,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "lexicon=info",
        1 => "lexicon=debug",
        _ => "lexicon=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config;
    match cli.command {
        Command::Generate { data, out } => cmd_generate(&config_path, data, out),
        Command::Check { data } => cmd_check(&config_path, data),
        Command::Classify { urls } => cmd_classify(&config_path, &urls),
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(&config_path),
            ConfigAction::Show => cmd_config_show(&config_path),
        },
    }
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

fn generate_config(config_path: &Path, data: Option<PathBuf>) -> Result<(AppConfig, GenerateConfig)> {
    let app = load_config(config_path)?;
    let mut config = GenerateConfig::from_app_config(config_path, &app)?;
    if let Some(data) = data {
        config.data_dir = data;
    }
    Ok((app, config))
}

fn cmd_generate(config_path: &Path, data: Option<PathBuf>, out: Option<PathBuf>) -> Result<()> {
    let (app, config) = generate_config(config_path, data)?;
    let target = out.unwrap_or_else(|| resolve_path(config_path, &app.paths.output));

    info!(
        data_dir = %config.data_dir.display(),
        out = %target.display(),
        "generating lexicon"
    );

    let reporter = CliProgress::new();
    let result = pipeline::generate(&config, &reporter)?;
    let meta = assembler::write_document(&target, &result.generated.document)?;

    println!();
    println!("  Lexicon generated!");
    println!("  Terms:  {}", result.generated.terms.len());
    println!("  Path:   {}", target.display());
    println!("  Size:   {} bytes", meta.size_bytes);
    println!("  SHA256: {}", meta.sha256);
    println!("  Time:   {:.1}s", result.elapsed.as_secs_f64());
    println!();

    Ok(())
}

fn cmd_check(config_path: &Path, data: Option<PathBuf>) -> Result<()> {
    let (_, config) = generate_config(config_path, data)?;

    let reporter = CliProgress::new();
    let checked = pipeline::check(&config, &reporter)?;

    let with_provenance = checked
        .graph
        .term_nodes()
        .filter(|n| n.is_defined_in.is_some())
        .count();

    println!();
    println!("  All term files are valid.");
    println!("  Terms:           {}", checked.terms.len());
    println!("  With provenance: {with_provenance}");
    println!();

    Ok(())
}

fn cmd_classify(config_path: &Path, urls: &[String]) -> Result<()> {
    let app = load_config(config_path)?;
    let classifier = LinkClassifier::new(app.classifier);

    for url in urls {
        let classification = classifier.explain(url);
        let kind = classification.kind.map_or("-", |k| k.as_str());
        println!("{kind:<24} {:<20} {url}", classification.rule);
    }

    Ok(())
}

fn cmd_config_init(config_path: &Path) -> Result<()> {
    init_config(config_path)?;
    println!("Config initialized at: {}", config_path.display());
    Ok(())
}

fn cmd_config_show(config_path: &Path) -> Result<()> {
    let config: AppConfig = load_config(config_path)?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]);
        spinner.set_style(style);
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn done(&self, _term_count: usize) {
        self.spinner.finish_and_clear();
    }
}

impl Drop for CliProgress {
    fn drop(&mut self) {
        if !self.spinner.is_finished() {
            self.spinner.finish_and_clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_generate_overrides() {
        let cli = Cli::parse_from(["lexicon", "generate", "--data", "terms", "--out", "site/index.html"]);
        match cli.command {
            Command::Generate { data, out } => {
                assert_eq!(data, Some(PathBuf::from("terms")));
                assert_eq!(out, Some(PathBuf::from("site/index.html")));
            }
            _ => panic!("expected generate"),
        }
        assert_eq!(cli.config, PathBuf::from(CONFIG_FILE_NAME));
    }

    #[test]
    fn classify_requires_a_url() {
        assert!(Cli::try_parse_from(["lexicon", "classify"]).is_err());
    }

    #[test]
    fn verbosity_counts() {
        let cli = Cli::parse_from(["lexicon", "-vv", "config", "show"]);
        assert_eq!(cli.verbose, 2);
        assert!(matches!(
            cli.command,
            Command::Config {
                action: ConfigAction::Show
            }
        ));
    }
}
