//! Linked-data graph builder.
//!
//! Combines the fixed identity graph with one `DefinedTerm` node per term
//! record. Term order is taken from the input as-is; the loader owns sorting.

use lexicon_shared::{LexiconError, Result, TermRecord, slug_order};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, info, instrument};

use crate::classify::{LinkClassifier, Provenance};
use crate::identity::IdentityGraph;

/// JSON-LD vocabulary of the emitted graph.
pub const SCHEMA_CONTEXT: &str = "https://schema.org";

const TERM_TYPE: &str = "DefinedTerm";

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// A `{"@id": ...}` reference to another node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeRef {
    #[serde(rename = "@id")]
    pub id: String,
}

impl NodeRef {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

/// Graph representation of one term record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TermNode {
    #[serde(rename = "@type")]
    pub kind: &'static str,
    #[serde(rename = "@id")]
    pub id: String,
    pub name: String,
    /// The term's slug.
    #[serde(rename = "termCode")]
    pub term_code: String,
    pub description: String,
    #[serde(rename = "inDefinedTermSet")]
    pub in_defined_term_set: NodeRef,
    pub url: String,
    pub creator: NodeRef,
    #[serde(rename = "dateCreated")]
    pub date_created: String,
    #[serde(rename = "isDefinedIn", skip_serializing_if = "Option::is_none")]
    pub is_defined_in: Option<Provenance>,
    #[serde(rename = "sameAs", skip_serializing_if = "Vec::is_empty")]
    pub same_as: Vec<String>,
}

/// The DefinedTermSet: configured fields plus the generated term list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TermSetNode {
    #[serde(flatten)]
    pub fields: Map<String, Value>,
    #[serde(rename = "hasDefinedTerm")]
    pub has_defined_term: Vec<NodeRef>,
}

impl TermSetNode {
    pub fn id(&self) -> &str {
        self.fields.get("@id").and_then(Value::as_str).unwrap_or("")
    }
}

/// One entry of `@graph`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum GraphNode {
    /// An identity node, copied unchanged from configuration.
    Fixed(Map<String, Value>),
    TermSet(TermSetNode),
    Term(TermNode),
}

/// The complete linked-data document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Graph {
    #[serde(rename = "@context")]
    pub context: String,
    #[serde(rename = "@graph")]
    pub nodes: Vec<GraphNode>,
}

impl Graph {
    pub fn term_set(&self) -> Option<&TermSetNode> {
        self.nodes.iter().find_map(|n| match n {
            GraphNode::TermSet(set) => Some(set),
            _ => None,
        })
    }

    /// Term nodes in emission order.
    pub fn term_nodes(&self) -> impl Iterator<Item = &TermNode> {
        self.nodes.iter().filter_map(|n| match n {
            GraphNode::Term(term) => Some(term),
            _ => None,
        })
    }

    /// Verify the graph's internal cross-references.
    ///
    /// - exactly one DefinedTermSet
    /// - `hasDefinedTerm` lists exactly the term node ids, in node order
    /// - every term points back at the set
    /// - term codes are unique and in publication order
    pub fn check_integrity(&self) -> Result<()> {
        let sets = self
            .nodes
            .iter()
            .filter(|n| matches!(n, GraphNode::TermSet(_)))
            .count();
        if sets != 1 {
            return Err(LexiconError::integrity(format!(
                "expected one DefinedTermSet, found {sets}"
            )));
        }
        let set = self
            .term_set()
            .ok_or_else(|| LexiconError::integrity("missing DefinedTermSet"))?;

        let term_ids: Vec<&str> = self.term_nodes().map(|t| t.id.as_str()).collect();
        let listed: Vec<&str> = set.has_defined_term.iter().map(|r| r.id.as_str()).collect();
        if term_ids != listed {
            return Err(LexiconError::integrity(
                "hasDefinedTerm does not match the term nodes",
            ));
        }

        let mut previous: Option<&str> = None;
        for term in self.term_nodes() {
            if term.in_defined_term_set.id != set.id() {
                return Err(LexiconError::integrity(format!(
                    "term '{}' references set '{}' instead of '{}'",
                    term.term_code,
                    term.in_defined_term_set.id,
                    set.id()
                )));
            }
            if let Some(prev) = previous {
                if slug_order(prev, &term.term_code).is_ge() {
                    return Err(LexiconError::integrity(format!(
                        "term '{}' is out of order or repeated after '{prev}'",
                        term.term_code
                    )));
                }
            }
            previous = Some(term.term_code.as_str());
        }

        Ok(())
    }

    /// Verify that the term nodes mirror `terms` one-to-one, field for field.
    pub fn check_terms(&self, terms: &[TermRecord]) -> Result<()> {
        let nodes: Vec<&TermNode> = self.term_nodes().collect();
        if nodes.len() != terms.len() {
            return Err(LexiconError::integrity(format!(
                "graph has {} term nodes for {} term records",
                nodes.len(),
                terms.len()
            )));
        }
        for (node, term) in nodes.iter().zip(terms) {
            let mirrors = node.term_code == term.slug.as_str()
                && node.name == term.name
                && node.description == term.description
                && node.date_created == term.date;
            if !mirrors {
                return Err(LexiconError::integrity(format!(
                    "term node '{}' does not mirror record '{}'",
                    node.term_code, term.slug
                )));
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Build the graph: fixed identity nodes, the DefinedTermSet, then one term
/// node per record in the given order.
///
/// Fails with a configuration error before any term node is built when the
/// identity graph is incomplete.
#[instrument(skip_all, fields(terms = terms.len()))]
pub fn build(
    identity: &IdentityGraph,
    terms: &[TermRecord],
    classifier: &LinkClassifier,
) -> Result<Graph> {
    let resolved = identity.resolve()?;

    let mut nodes: Vec<GraphNode> = resolved
        .fixed
        .iter()
        .map(|node| GraphNode::Fixed((*node).clone()))
        .collect();

    let term_id = |slug: &str| format!("{}#{slug}", resolved.term_set_url);

    let mut set_fields = resolved.term_set.clone();
    set_fields.remove("hasDefinedTerm");
    nodes.push(GraphNode::TermSet(TermSetNode {
        fields: set_fields,
        has_defined_term: terms
            .iter()
            .map(|t| NodeRef::new(term_id(t.slug.as_str())))
            .collect(),
    }));

    for term in terms {
        let id = term_id(term.slug.as_str());
        let is_defined_in = term
            .primary_link()
            .and_then(|link| classifier.provenance(&link.url));

        debug!(
            slug = %term.slug,
            provenance = is_defined_in.as_ref().map(|p| p.kind.as_str()).unwrap_or("none"),
            "built term node"
        );

        nodes.push(GraphNode::Term(TermNode {
            kind: TERM_TYPE,
            url: id.clone(),
            id,
            name: term.name.clone(),
            term_code: term.slug.to_string(),
            description: term.description.clone(),
            in_defined_term_set: NodeRef::new(resolved.term_set_id),
            creator: NodeRef::new(resolved.creator_id),
            date_created: term.date.clone(),
            is_defined_in,
            same_as: term.same_as.clone(),
        }));
    }

    let graph = Graph {
        context: SCHEMA_CONTEXT.to_string(),
        nodes,
    };
    graph.check_integrity()?;
    graph.check_terms(terms)?;

    info!(nodes = graph.nodes.len(), "graph built");
    Ok(graph)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
