//! Provenance classification for a term's primary link.
//!
//! Rules are tried top to bottom and the first match wins. Every rule is a
//! plain predicate over the parsed URL, so each one can be tested on its own
//! and the precedence order is visible in [`LinkClassifier::new`].
//! Classification never fails: anything unrecognized yields no provenance.

use std::sync::LazyLock;

use lexicon_shared::ClassifierConfig;
use regex::Regex;
use serde::{Serialize, Serializer};
use url::Url;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// The schema.org type of the work a term was first defined in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProvenanceKind {
    Article,
    DiscussionForumPosting,
    CreativeWorkSeries,
}

impl ProvenanceKind {
    /// schema.org type name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Article => "Article",
            Self::DiscussionForumPosting => "DiscussionForumPosting",
            Self::CreativeWorkSeries => "CreativeWorkSeries",
        }
    }
}

impl std::fmt::Display for ProvenanceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ProvenanceKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// The `isDefinedIn` reference attached to a term node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Provenance {
    #[serde(rename = "@type")]
    pub kind: ProvenanceKind,
    #[serde(rename = "@id")]
    pub id: String,
}

/// Outcome of classifying one URL, with the rule that decided it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub rule: &'static str,
    pub kind: Option<ProvenanceKind>,
}

/// A parsed URL handed to rule predicates.
pub struct Candidate {
    pub url: Url,
}

impl Candidate {
    fn host(&self) -> &str {
        self.url.host_str().unwrap_or("")
    }

    fn segments(&self) -> Vec<&str> {
        self.url
            .path_segments()
            .map(|s| s.filter(|seg| !seg.is_empty()).collect())
            .unwrap_or_default()
    }

    fn is_root(&self) -> bool {
        self.segments().is_empty()
    }
}

/// One predicate → category rule.
pub struct Rule {
    /// Short name reported by [`LinkClassifier::explain`].
    pub name: &'static str,
    /// Category assigned when the rule matches; `None` means "no provenance".
    pub outcome: Option<ProvenanceKind>,
    pub matches: fn(&Candidate, &ClassifierConfig) -> bool,
}

// ---------------------------------------------------------------------------
// Patterns (compiled once)
// ---------------------------------------------------------------------------

/// A single post slug, optionally under a `/YYYY/MM[/DD]/` date prefix.
static POST_PATH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^/(?:\d{4}/\d{1,2}/(?:\d{1,2}/)?)?[A-Za-z0-9][A-Za-z0-9._~%-]*/?$")
        .expect("post path regex")
});

/// A listing page: `.../tag/<name>/`, `.../series/<name>/`, `.../category/<name>/`.
static SERIES_PATH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|/)(?:tag|tags|series|category)/[^/]+/?$").expect("series path regex")
});

/// Path segments that mark an archived discussion regardless of host.
const DISCUSSION_SEGMENTS: &[&str] = &["mailing-lists", "usenet"];

// ---------------------------------------------------------------------------
// Rule predicates
// ---------------------------------------------------------------------------

fn host_matches(host: &str, listed: &[String], label: &str) -> bool {
    listed.iter().any(|h| h.eq_ignore_ascii_case(host))
        || host.split('.').next().is_some_and(|first| first == label)
}

fn same_url(candidate: &Candidate, other: &str) -> bool {
    Url::parse(other).is_ok_and(|u| u == candidate.url)
}

fn is_listed_without_provenance(c: &Candidate, config: &ClassifierConfig) -> bool {
    config.no_provenance.iter().any(|u| same_url(c, u))
}

fn is_blog_post(c: &Candidate, config: &ClassifierConfig) -> bool {
    host_matches(c.host(), &config.blog_hosts, "blog") && POST_PATH_RE.is_match(c.url.path())
}

fn is_archived_discussion(c: &Candidate, config: &ClassifierConfig) -> bool {
    let archive_host = host_matches(c.host(), &config.archive_hosts, "archive") && !c.is_root();
    archive_host
        || c.segments()
            .iter()
            .any(|seg| DISCUSSION_SEGMENTS.contains(seg))
}

fn is_series_listing(c: &Candidate, _config: &ClassifierConfig) -> bool {
    SERIES_PATH_RE.is_match(c.url.path())
}

fn always(_c: &Candidate, _config: &ClassifierConfig) -> bool {
    true
}

// ---------------------------------------------------------------------------
// Classifier
// ---------------------------------------------------------------------------

/// Ordered rule list plus the host hints it is evaluated against.
pub struct LinkClassifier {
    config: ClassifierConfig,
    rules: Vec<Rule>,
}

impl LinkClassifier {
    /// Create a classifier with the built-in rules in precedence order.
    pub fn new(config: ClassifierConfig) -> Self {
        Self {
            config,
            rules: vec![
                Rule {
                    name: "no-provenance",
                    outcome: None,
                    matches: is_listed_without_provenance,
                },
                Rule {
                    name: "blog-post",
                    outcome: Some(ProvenanceKind::Article),
                    matches: is_blog_post,
                },
                Rule {
                    name: "archived-discussion",
                    outcome: Some(ProvenanceKind::DiscussionForumPosting),
                    matches: is_archived_discussion,
                },
                Rule {
                    name: "series-listing",
                    outcome: Some(ProvenanceKind::CreativeWorkSeries),
                    matches: is_series_listing,
                },
                Rule {
                    name: "fallback",
                    outcome: None,
                    matches: always,
                },
            ],
        }
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Classify `url`, reporting which rule decided.
    pub fn explain(&self, url: &str) -> Classification {
        let Ok(parsed) = Url::parse(url.trim()) else {
            return Classification {
                rule: "unparsable",
                kind: None,
            };
        };
        let candidate = Candidate { url: parsed };

        for rule in &self.rules {
            if (rule.matches)(&candidate, &self.config) {
                return Classification {
                    rule: rule.name,
                    kind: rule.outcome,
                };
            }
        }
        // Unreachable: the fallback rule always matches
        Classification {
            rule: "fallback",
            kind: None,
        }
    }

    pub fn classify(&self, url: &str) -> Option<ProvenanceKind> {
        self.explain(url).kind
    }

    /// Build the `isDefinedIn` reference for `url`, if it classifies.
    ///
    /// Articles are referenced through their `#article` fragment; listings and
    /// postings are referenced by URL.
    pub fn provenance(&self, url: &str) -> Option<Provenance> {
        let kind = self.classify(url)?;
        let id = match kind {
            ProvenanceKind::Article if !url.contains('#') => format!("{url}#article"),
            _ => url.to_string(),
        };
        Some(Provenance { kind, id })
    }
}

impl Default for LinkClassifier {
    fn default() -> Self {
        Self::new(ClassifierConfig::default())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
