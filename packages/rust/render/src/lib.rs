//! Document rendering for lexicon.
//!
//! Turns the ordered term list and the finished graph into one HTML document
//! carrying the term entries, the linked-data block, the search index and
//! the client-side search script. Rendering is a pure function of its inputs.

pub mod escape;
pub mod search;

use std::fmt::Write;

use lexicon_graph::Graph;
use lexicon_shared::{COUNT_PLACEHOLDER, PageConfig, Result, TermRecord};
use sha2::{Digest, Sha256};
use tracing::{debug, info, instrument};

pub use search::{SearchEngine, SearchIndex};

/// Prefix of every link instrumentation identifier.
pub const LINK_EVENT_PREFIX: &str = "term";

/// Attribute carrying the instrumentation identifier.
pub const LINK_EVENT_ATTR: &str = "data-umami-event";

const SEARCH_SCRIPT: &str = include_str!("../assets/search.js");
const STYLESHEET: &str = include_str!("../assets/style.css");

/// The rendered artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub html: String,
    pub term_count: usize,
}

impl Document {
    /// Hex SHA-256 of the document bytes.
    pub fn sha256(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.html.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    pub fn len(&self) -> usize {
        self.html.len()
    }

    pub fn is_empty(&self) -> bool {
        self.html.is_empty()
    }
}

/// "1 term", "55 terms".
pub fn count_label(n: usize) -> String {
    if n == 1 {
        "1 term".to_string()
    } else {
        format!("{n} terms")
    }
}

/// Instrumentation identifier of the `position`-th link of `slug`.
pub fn link_event_id(slug: &str, position: usize) -> String {
    format!("{LINK_EVENT_PREFIX}-{slug}-{position}")
}

/// Render the complete document.
///
/// `terms` and `graph` must describe the same terms in the same order; the
/// graph is embedded exactly as built.
#[instrument(skip_all, fields(terms = terms.len()))]
pub fn render(terms: &[TermRecord], graph: &Graph, page: &PageConfig) -> Result<Document> {
    graph.check_terms(terms)?;

    let count = count_label(terms.len());
    let graph_json = escape::script_json(graph, true)?;
    let index_json = escape::script_json(&SearchIndex::build(terms), false)?;

    let mut html = String::with_capacity(16 * 1024 + terms.len() * 1024);
    write_head(&mut html, page, &count, &graph_json);
    write_header(&mut html, page, &count, terms.len());

    html.push_str("    <main id=\"terms_list\">\n");
    for term in terms {
        write_entry(&mut html, term);
        debug!(slug = %term.slug, links = term.links.len(), "rendered entry");
    }
    html.push_str(
        "      <div class=\"no-results\" id=\"no_results\" hidden>No terms match your search.</div>\n",
    );
    html.push_str("    </main>\n\n");

    let _ = write!(
        html,
        "    <footer>{}</footer>\n  </div>\n\n",
        page.footer_html
    );
    let _ = write!(
        html,
        "  <script type=\"application/json\" id=\"term_index\">{index_json}</script>\n"
    );
    let _ = write!(html, "  <script>\n{SEARCH_SCRIPT}  </script>\n</body>\n</html>\n");

    info!(bytes = html.len(), "document rendered");

    Ok(Document {
        html,
        term_count: terms.len(),
    })
}

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

fn fill(template: &str, count: &str) -> String {
    escape::html(&template.replace(COUNT_PLACEHOLDER, count))
}

fn write_head(html: &mut String, page: &PageConfig, count: &str, graph_json: &str) {
    let _ = write!(
        html,
        "<!DOCTYPE html>\n<html lang=\"{}\">\n<head>\n",
        escape::html(&page.lang)
    );
    html.push_str("  <meta charset=\"UTF-8\">\n");
    html.push_str(
        "  <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n",
    );
    let _ = writeln!(html, "  <title>{}</title>", escape::html(&page.title));
    let _ = writeln!(
        html,
        "  <meta name=\"description\" content=\"{}\">",
        fill(&page.description, count)
    );

    if let Some(src) = &page.analytics_script {
        let _ = write!(html, "  <script defer src=\"{}\"", escape::html(src));
        if let Some(id) = &page.analytics_website_id {
            let _ = write!(html, " data-website-id=\"{}\"", escape::html(id));
        }
        html.push_str("></script>\n");
    }

    let _ = write!(html, "  <style>\n{STYLESHEET}  </style>\n");
    let _ = write!(
        html,
        "  <script type=\"application/ld+json\">\n{graph_json}\n  </script>\n</head>\n"
    );
}

fn write_header(html: &mut String, page: &PageConfig, count: &str, total: usize) {
    html.push_str("<body>\n  <div class=\"container\">\n    <header>\n");
    let _ = writeln!(
        html,
        "      <a href=\"{}\" class=\"back-link\">{}</a>",
        escape::html(&page.back_link_href),
        escape::html(&page.back_link_label)
    );
    let _ = writeln!(html, "      <h1>{}</h1>", escape::html(&page.heading));
    let _ = writeln!(
        html,
        "      <p class=\"subtitle\">{}</p>",
        escape::html(&page.subtitle)
    );
    let _ = writeln!(
        html,
        "      <p class=\"intro\" id=\"term_count\">{}</p>",
        fill(&page.intro, count)
    );
    html.push_str("      <div class=\"search-wrap\" role=\"search\">\n");
    html.push_str(
        "        <input type=\"search\" id=\"term_search\" placeholder=\"Search terms\u{2026}\" autocomplete=\"off\" spellcheck=\"false\" aria-label=\"Search terms\">\n",
    );
    html.push_str(
        "        <button class=\"search-clear\" id=\"search_clear\" aria-label=\"Clear search\">\u{00d7}</button>\n",
    );
    html.push_str("        <span class=\"search-hint\" id=\"search_hint\">/</span>\n");
    let _ = writeln!(
        html,
        "        <div class=\"search-count\" id=\"search_count\" aria-live=\"polite\">{total} of {count}</div>"
    );
    html.push_str("      </div>\n    </header>\n\n");
}

fn write_entry(html: &mut String, term: &TermRecord) {
    let slug = term.slug.as_str();
    let _ = writeln!(
        html,
        "      <article class=\"term-entry\" id=\"{}\">",
        escape::html(slug)
    );
    let _ = writeln!(
        html,
        "        <h2 class=\"term-name\">{}</h2>",
        escape::html(&term.name)
    );
    let _ = writeln!(
        html,
        "        <div class=\"term-meta\"><span>First used: {}</span></div>",
        escape::html(&term.date)
    );
    let _ = writeln!(
        html,
        "        <p class=\"term-definition\">{}</p>",
        escape::html(&term.description)
    );
    html.push_str("        <div class=\"term-links\">\n");
    for (i, link) in term.links.iter().enumerate() {
        let _ = writeln!(
            html,
            "          <a href=\"{}\" class=\"term-link\" {LINK_EVENT_ATTR}=\"{}\">{}</a>",
            escape::html(&link.url),
            escape::html(&link_event_id(slug, i)),
            escape::html(&link.label)
        );
    }
    html.push_str("        </div>\n      </article>\n\n");
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
