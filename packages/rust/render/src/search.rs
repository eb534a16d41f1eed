//! Search index embedded in the document, and the behaviour of the client
//! that consumes it.
//!
//! [`SearchEngine`] is the reference model of `assets/search.js`: same
//! matching rule, same debounce and analytics threshold, same URL handling.
//! Time is passed in explicitly so the state machine is deterministic.

use std::time::Duration;

use lexicon_shared::TermRecord;
use serde::ser::{Serialize, SerializeMap, Serializer};
use url::Url;

use crate::count_label;

/// Idle time after the last keystroke before a search is reported.
pub const DEBOUNCE: Duration = Duration::from_millis(500);

/// Shorter queries are filtered but never reported.
pub const MIN_TRACKED_QUERY_CHARS: usize = 3;

/// Query-string parameter mirroring the current query.
pub const QUERY_PARAM: &str = "q";

// ---------------------------------------------------------------------------
// Index
// ---------------------------------------------------------------------------

/// Searchable text for one term.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    pub slug: String,
    pub text: String,
}

/// Flattened searchable text per term, in publication order.
///
/// Serializes as a JSON object keyed by slug, preserving entry order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchIndex {
    entries: Vec<IndexEntry>,
}

impl SearchIndex {
    pub fn build(terms: &[TermRecord]) -> Self {
        Self {
            entries: terms
                .iter()
                .map(|t| IndexEntry {
                    slug: t.slug.to_string(),
                    text: flatten(t),
                })
                .collect(),
        }
    }

    pub fn entries(&self) -> &[IndexEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for SearchIndex {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for entry in &self.entries {
            map.serialize_entry(&entry.slug, &entry.text)?;
        }
        map.end()
    }
}

/// Name, description, date and every link label, space-separated.
pub fn flatten(term: &TermRecord) -> String {
    let mut parts = vec![term.name.as_str(), term.description.as_str(), term.date.as_str()];
    parts.extend(term.links.iter().map(|l| l.label.as_str()));
    parts.join(" ")
}

// ---------------------------------------------------------------------------
// Matching
// ---------------------------------------------------------------------------

/// Lowercased whitespace-separated tokens of a query.
pub fn tokenize(query: &str) -> Vec<String> {
    query.split_whitespace().map(str::to_lowercase).collect()
}

/// A blob matches when every token is a substring of it, ignoring case.
/// No tokens matches everything.
pub fn matches(tokens: &[String], blob: &str) -> bool {
    let blob = blob.to_lowercase();
    tokens.iter().all(|t| blob.contains(t.as_str()))
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchState {
    Idle,
    /// A keystroke arrived and the debounce timer is running.
    Typing,
    /// The timer elapsed for a non-empty query.
    Filtered,
}

/// Keys with page-wide meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// `/`: focus the search input.
    Focus,
    /// `Escape`: clear the query.
    Cancel,
}

/// Analytics payload sent once a query settles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchEvent {
    pub query: String,
    pub results: usize,
}

pub struct SearchEngine<'a> {
    index: &'a SearchIndex,
    query: String,
    visible: Vec<bool>,
    state: SearchState,
    deadline: Option<Duration>,
    focused: bool,
}

impl<'a> SearchEngine<'a> {
    pub fn new(index: &'a SearchIndex) -> Self {
        Self {
            index,
            query: String::new(),
            visible: vec![true; index.len()],
            state: SearchState::Idle,
            deadline: None,
            focused: false,
        }
    }

    /// Apply the page location on load: `?q=` filters without reporting,
    /// then a fragment naming a term clears the filter and returns the slug
    /// to scroll to and highlight.
    pub fn load(&mut self, location: &Url) -> Option<&'a str> {
        let query = location
            .query_pairs()
            .find(|(k, _)| k == QUERY_PARAM)
            .map(|(_, v)| v.into_owned());
        if let Some(query) = query {
            self.apply(&query);
            if !self.query.trim().is_empty() {
                self.state = SearchState::Filtered;
            }
        }

        location.fragment().and_then(|f| self.navigate(f))
    }

    /// A keystroke left the input holding `query`.
    pub fn input(&mut self, query: &str, now: Duration) {
        self.apply(query);
        self.state = SearchState::Typing;
        self.deadline = Some(now + DEBOUNCE);
    }

    /// Advance the clock. Returns the analytics event when the debounce
    /// timer elapses on a query of at least [`MIN_TRACKED_QUERY_CHARS`].
    pub fn tick(&mut self, now: Duration) -> Option<SearchEvent> {
        let deadline = self.deadline?;
        if now < deadline {
            return None;
        }
        self.deadline = None;

        let trimmed = self.query.trim();
        if trimmed.is_empty() {
            self.state = SearchState::Idle;
            return None;
        }
        self.state = SearchState::Filtered;

        (trimmed.chars().count() >= MIN_TRACKED_QUERY_CHARS).then(|| SearchEvent {
            query: trimmed.to_string(),
            results: self.visible_count(),
        })
    }

    pub fn key(&mut self, key: Key) {
        match key {
            Key::Focus => self.focused = true,
            Key::Cancel => {
                self.clear();
                self.focused = false;
            }
        }
    }

    /// Jump to the entry whose slug equals `fragment`, clearing any filter
    /// so it is visible.
    pub fn navigate(&mut self, fragment: &str) -> Option<&'a str> {
        let index: &'a SearchIndex = self.index;
        let entry = index.entries().iter().find(|e| e.slug == fragment)?;
        self.clear();
        Some(entry.slug.as_str())
    }

    /// `base` with `?q=` set to the current query, or removed when empty.
    /// Other parameters and the fragment are kept.
    pub fn location(&self, base: &Url) -> Url {
        let kept: Vec<(String, String)> = base
            .query_pairs()
            .filter(|(k, _)| k != QUERY_PARAM)
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();

        let mut url = base.clone();
        url.set_query(None);
        let trimmed = self.query.trim();
        if !kept.is_empty() || !trimmed.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (k, v) in &kept {
                pairs.append_pair(k, v);
            }
            if !trimmed.is_empty() {
                pairs.append_pair(QUERY_PARAM, trimmed);
            }
        }
        url
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn state(&self) -> SearchState {
        self.state
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn visible_slugs(&self) -> Vec<&'a str> {
        let index: &'a SearchIndex = self.index;
        index
            .entries()
            .iter()
            .zip(&self.visible)
            .filter(|(_, shown)| **shown)
            .map(|(e, _)| e.slug.as_str())
            .collect()
    }

    pub fn visible_count(&self) -> usize {
        self.visible.iter().filter(|v| **v).count()
    }

    /// "X of Y terms".
    pub fn count_indicator(&self) -> String {
        format!("{} of {}", self.visible_count(), count_label(self.index.len()))
    }

    /// True when a non-empty query hides every term.
    pub fn shows_no_results(&self) -> bool {
        !self.query.trim().is_empty() && self.visible_count() == 0
    }

    fn apply(&mut self, query: &str) {
        self.query = query.to_string();
        let tokens = tokenize(query);
        for (shown, entry) in self.visible.iter_mut().zip(self.index.entries()) {
            *shown = matches(&tokens, &entry.text);
        }
    }

    fn clear(&mut self) {
        self.apply("");
        self.state = SearchState::Idle;
        self.deadline = None;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use lexicon_shared::{LinkRecord, Slug};

    fn index(blobs: &[(&str, &str)]) -> SearchIndex {
        SearchIndex {
            entries: blobs
                .iter()
                .map(|(slug, text)| IndexEntry {
                    slug: (*slug).into(),
                    text: (*text).into(),
                })
                .collect(),
        }
    }

    fn widgets() -> SearchIndex {
        index(&[
            ("first", "alpha widget"),
            ("second", "beta widget"),
            ("third", "alpha gadget"),
        ])
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn and_semantics_across_tokens() {
        let idx = widgets();
        let mut engine = SearchEngine::new(&idx);

        engine.input("alpha widget", ms(0));
        assert_eq!(engine.visible_slugs(), vec!["first"]);

        engine.input("widget", ms(10));
        assert_eq!(engine.visible_slugs(), vec!["first", "second"]);

        engine.input("", ms(20));
        assert_eq!(engine.visible_slugs(), vec!["first", "second", "third"]);
    }

    #[test]
    fn matching_ignores_case_and_extra_whitespace() {
        let tokens = tokenize("  ALPHA   Gad ");
        assert_eq!(tokens, vec!["alpha", "gad"]);
        assert!(matches(&tokens, "Alpha GADGET"));
        assert!(!matches(&tokens, "alpha widget"));
        assert!(matches(&[], "anything"));
    }

    #[test]
    fn analytics_fires_only_after_debounce() {
        let idx = widgets();
        let mut engine = SearchEngine::new(&idx);
        assert_eq!(engine.state(), SearchState::Idle);

        engine.input("alp", ms(0));
        assert_eq!(engine.state(), SearchState::Typing);
        assert_eq!(engine.tick(ms(499)), None);

        // Another keystroke restarts the timer.
        engine.input("alph", ms(400));
        assert_eq!(engine.tick(ms(899)), None);

        let event = engine.tick(ms(900)).expect("event after debounce");
        assert_eq!(
            event,
            SearchEvent {
                query: "alph".into(),
                results: 2
            }
        );
        assert_eq!(engine.state(), SearchState::Filtered);

        // The timer is spent.
        assert_eq!(engine.tick(ms(5000)), None);
    }

    #[test]
    fn short_queries_are_not_reported() {
        let idx = widgets();
        let mut engine = SearchEngine::new(&idx);
        engine.input("al", ms(0));
        assert_eq!(engine.tick(ms(600)), None);
        assert_eq!(engine.state(), SearchState::Filtered);
        assert_eq!(engine.visible_count(), 2);
    }

    #[test]
    fn tracking_threshold_counts_characters_not_utf16_units() {
        let idx = index(&[("glyphs", "\u{1f600}\u{1f601} faces")]);
        let mut engine = SearchEngine::new(&idx);
        engine.input("\u{1f600}\u{1f601}", ms(0));
        assert_eq!(engine.tick(ms(500)), None, "two characters, four UTF-16 units");

        engine.input("\u{1f600}\u{1f601}f", ms(600));
        let event = engine.tick(ms(1100)).unwrap();
        assert_eq!(event.results, 0);

        engine.input("\u{1f601} f", ms(1200));
        let event = engine.tick(ms(1700)).unwrap();
        assert_eq!(event.query, "\u{1f601} f");
        assert_eq!(event.results, 1);
    }

    #[test]
    fn emptied_query_settles_to_idle() {
        let idx = widgets();
        let mut engine = SearchEngine::new(&idx);
        engine.input("beta", ms(0));
        engine.input("", ms(100));
        assert_eq!(engine.tick(ms(700)), None);
        assert_eq!(engine.state(), SearchState::Idle);
    }

    #[test]
    fn cancel_key_clears_and_returns_to_idle() {
        let idx = widgets();
        let mut engine = SearchEngine::new(&idx);
        engine.key(Key::Focus);
        assert!(engine.is_focused());

        engine.input("gadget", ms(0));
        assert_eq!(engine.visible_count(), 1);

        engine.key(Key::Cancel);
        assert_eq!(engine.query(), "");
        assert_eq!(engine.visible_count(), 3);
        assert_eq!(engine.state(), SearchState::Idle);
        assert!(!engine.is_focused());
        assert_eq!(engine.tick(ms(1000)), None, "pending timer is dropped");
    }

    #[test]
    fn count_indicator_and_no_results() {
        let idx = widgets();
        let mut engine = SearchEngine::new(&idx);
        assert_eq!(engine.count_indicator(), "3 of 3 terms");
        assert!(!engine.shows_no_results());

        engine.input("widget", ms(0));
        assert_eq!(engine.count_indicator(), "2 of 3 terms");

        engine.input("zzz", ms(0));
        assert_eq!(engine.count_indicator(), "0 of 3 terms");
        assert!(engine.shows_no_results());
    }

    #[test]
    fn location_reflects_query() {
        let idx = widgets();
        let mut engine = SearchEngine::new(&idx);
        let base = Url::parse("https://www.example.net/terms/?ref=home#second").unwrap();

        engine.input("alpha widget", ms(0));
        let url = engine.location(&base);
        assert_eq!(url.as_str(), "https://www.example.net/terms/?ref=home&q=alpha+widget#second");

        engine.input("  ", ms(0));
        let url = engine.location(&Url::parse("https://www.example.net/terms/?q=old").unwrap());
        assert_eq!(url.as_str(), "https://www.example.net/terms/");
    }

    #[test]
    fn load_applies_query_without_reporting() {
        let idx = widgets();
        let mut engine = SearchEngine::new(&idx);
        let target = engine.load(&Url::parse("https://www.example.net/terms/?q=beta").unwrap());
        assert_eq!(target, None);
        assert_eq!(engine.visible_slugs(), vec!["second"]);
        assert_eq!(engine.state(), SearchState::Filtered);
        assert_eq!(engine.tick(ms(10_000)), None);
    }

    #[test]
    fn fragment_navigation_overrides_filter() {
        let idx = widgets();
        let mut engine = SearchEngine::new(&idx);
        let target = engine.load(&Url::parse("https://www.example.net/terms/?q=beta#third").unwrap());
        assert_eq!(target, Some("third"));
        assert_eq!(engine.query(), "");
        assert!(engine.visible_slugs().contains(&"third"));

        assert_eq!(engine.navigate("missing"), None);
    }

    #[test]
    fn index_flattens_all_searchable_fields() {
        let term = TermRecord {
            slug: Slug::parse("lords-of-zero").unwrap(),
            name: "Lords of Zero".into(),
            date: "2025".into(),
            description: "Permission, not scarcity.".into(),
            links: vec![
                LinkRecord {
                    url: "https://blog.example.net/the-lords-of-zero/".into(),
                    label: "The Lords of Zero".into(),
                },
                LinkRecord {
                    url: "https://music.example.net/".into(),
                    label: "companion song".into(),
                },
            ],
            same_as: vec![],
        };
        let idx = SearchIndex::build(std::slice::from_ref(&term));
        assert_eq!(
            idx.entries()[0].text,
            "Lords of Zero Permission, not scarcity. 2025 The Lords of Zero companion song"
        );

        let json = serde_json::to_string(&idx).unwrap();
        assert!(json.starts_with("{\"lords-of-zero\":"));
    }

    #[test]
    fn index_serializes_in_entry_order() {
        let idx = index(&[("b", "two"), ("a", "one")]);
        assert_eq!(serde_json::to_string(&idx).unwrap(), r#"{"b":"two","a":"one"}"#);
    }
}
