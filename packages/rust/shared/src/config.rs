//! Application configuration for lexicon.
//!
//! The project config lives in `lexicon.toml` next to the term data.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{LexiconError, Result};

/// Default configuration file name.
pub const CONFIG_FILE_NAME: &str = "lexicon.toml";

/// Placeholder replaced by the rendered term count in page templates.
pub const COUNT_PLACEHOLDER: &str = "{count}";

// ---------------------------------------------------------------------------
// Config structs (matching lexicon.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Input and output locations.
    #[serde(default)]
    pub paths: PathsConfig,

    /// Page chrome around the term entries.
    #[serde(default)]
    pub page: PageConfig,

    /// Host/path hints for provenance classification.
    #[serde(default)]
    pub classifier: ClassifierConfig,
}

/// `[paths]` section. Relative paths resolve against the config file's directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Directory holding one `<slug>.json` file per term.
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    /// Generated document path.
    #[serde(default = "default_output")]
    pub output: String,

    /// JSON array of fixed identity-graph nodes.
    #[serde(default = "default_identity")]
    pub identity: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            output: default_output(),
            identity: default_identity(),
        }
    }
}

fn default_data_dir() -> String {
    "data".into()
}
fn default_output() -> String {
    "index.html".into()
}
fn default_identity() -> String {
    "identity.json".into()
}

/// `[page]` section.
///
/// `intro` and `description` may contain `{count}`, which is replaced with the
/// number of rendered terms.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageConfig {
    #[serde(default = "default_title")]
    pub title: String,

    #[serde(default = "default_heading")]
    pub heading: String,

    #[serde(default = "default_subtitle")]
    pub subtitle: String,

    #[serde(default = "default_intro")]
    pub intro: String,

    /// `<meta name="description">` content.
    #[serde(default = "default_description")]
    pub description: String,

    #[serde(default = "default_lang")]
    pub lang: String,

    #[serde(default = "default_back_link_href")]
    pub back_link_href: String,

    #[serde(default = "default_back_link_label")]
    pub back_link_label: String,

    /// Trusted markup placed verbatim inside `<footer>`.
    #[serde(default)]
    pub footer_html: String,

    /// Analytics script URL; analytics calls are skipped when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analytics_script: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analytics_website_id: Option<String>,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            heading: default_heading(),
            subtitle: default_subtitle(),
            intro: default_intro(),
            description: default_description(),
            lang: default_lang(),
            back_link_href: default_back_link_href(),
            back_link_label: default_back_link_label(),
            footer_html: String::new(),
            analytics_script: None,
            analytics_website_id: None,
        }
    }
}

fn default_title() -> String {
    "Terms \u{2014} A Lexicon of Original Concepts".into()
}
fn default_heading() -> String {
    "Terms".into()
}
fn default_subtitle() -> String {
    "A Lexicon of Original Concepts".into()
}
fn default_intro() -> String {
    "{count} and frameworks. Each links back to the work where it first appeared.".into()
}
fn default_description() -> String {
    "A lexicon of {count} original concepts.".into()
}
fn default_lang() -> String {
    "en".into()
}
fn default_back_link_href() -> String {
    "/".into()
}
fn default_back_link_label() -> String {
    "\u{2190} home".into()
}

/// `[classifier]` section.
///
/// A host counts as a blog (archive) host when listed here or when its first
/// DNS label is `blog` (`archive`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClassifierConfig {
    #[serde(default)]
    pub blog_hosts: Vec<String>,

    #[serde(default)]
    pub archive_hosts: Vec<String>,

    /// Exact URLs that never carry a provenance reference (e.g. site roots).
    #[serde(default)]
    pub no_provenance: Vec<String>,
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Load the config from `path`. Returns defaults if the file does not exist.
pub fn load_config(path: &Path) -> Result<AppConfig> {
    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| LexiconError::io(path, e))?;

    toml::from_str(&content).map_err(|e| {
        LexiconError::config(format!("failed to parse {}: {e}", path.display()))
    })
}

/// Write a default config file at `path`, refusing to overwrite an existing one.
pub fn init_config(path: &Path) -> Result<()> {
    if path.exists() {
        return Err(LexiconError::config(format!(
            "{} already exists",
            path.display()
        )));
    }

    let content = toml::to_string_pretty(&AppConfig::default())
        .map_err(|e| LexiconError::config(e.to_string()))?;

    std::fs::write(path, content).map_err(|e| LexiconError::io(path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(())
}

/// Resolve a configured path against the directory containing the config file.
pub fn resolve_path(config_path: &Path, configured: &str) -> PathBuf {
    let configured = Path::new(configured);
    if configured.is_absolute() {
        return configured.to_path_buf();
    }
    match config_path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.join(configured),
        _ => configured.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("data_dir"));
        assert!(toml_str.contains("identity.json"));
    }

    #[test]
    fn config_roundtrip() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize");
        let parsed: AppConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.paths.output, "index.html");
        assert_eq!(parsed.page.lang, "en");
        assert!(parsed.page.intro.contains(COUNT_PLACEHOLDER));
    }

    #[test]
    fn empty_file_is_valid() {
        let config: AppConfig = toml::from_str("").expect("parse");
        assert_eq!(config.paths.data_dir, "data");
        assert!(config.classifier.blog_hosts.is_empty());
        assert!(config.page.analytics_script.is_none());
    }

    #[test]
    fn config_with_classifier_hints() {
        let toml_str = r#"
[paths]
data_dir = "terms"

[page]
heading = "Mycal Terms"
analytics_script = "https://analytics.example.net/script.js"

[classifier]
blog_hosts = ["notes.example.net"]
no_provenance = ["https://blog.example.net/", "https://product.example.com/"]
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.paths.data_dir, "terms");
        assert_eq!(config.paths.output, "index.html");
        assert_eq!(config.page.heading, "Mycal Terms");
        assert_eq!(config.classifier.blog_hosts, vec!["notes.example.net"]);
        assert_eq!(config.classifier.no_provenance.len(), 2);
    }

    #[test]
    fn resolve_path_uses_config_dir() {
        let cfg = Path::new("/site/terms/lexicon.toml");
        assert_eq!(resolve_path(cfg, "data"), PathBuf::from("/site/terms/data"));
        assert_eq!(resolve_path(cfg, "/abs/out.html"), PathBuf::from("/abs/out.html"));
        assert_eq!(resolve_path(Path::new("lexicon.toml"), "data"), PathBuf::from("data"));
    }

    #[test]
    fn load_missing_config_yields_defaults() {
        let config = load_config(Path::new("/definitely/not/here/lexicon.toml")).expect("defaults");
        assert_eq!(config.paths.identity, "identity.json");
    }
}
