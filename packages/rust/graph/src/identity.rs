//! The fixed identity graph shared by every generated document.
//!
//! Nodes are opaque JSON-LD objects supplied by configuration. The builder
//! only reads them: it needs the Person's `@id` (term creator) and the
//! DefinedTermSet's `@id` and `url` (term membership and term identifiers).

use std::path::Path;

use lexicon_shared::{LexiconError, Result};
use serde_json::{Map, Value};

/// schema.org types the identity graph must provide exactly once.
/// Any other node is optional and is passed through as configured.
pub const FIXED_NODE_TYPES: &[&str] = &[
    "Person",
    "Organization",
    "WebSite",
    "WebPage",
    "BreadcrumbList",
];

pub const TERM_SET_TYPE: &str = "DefinedTermSet";

/// Fixed types that may omit `@id`.
const ID_OPTIONAL_TYPES: &[&str] = &["BreadcrumbList"];

/// Immutable identity configuration passed into the graph builder.
#[derive(Debug, Clone, PartialEq)]
pub struct IdentityGraph {
    nodes: Vec<Value>,
}

impl IdentityGraph {
    pub fn new(nodes: Vec<Value>) -> Self {
        Self { nodes }
    }

    /// Parse a JSON array of nodes.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let nodes: Vec<Value> = serde_json::from_str(json).map_err(|e| {
            LexiconError::configuration(format!("identity graph is not a JSON array of nodes: {e}"))
        })?;
        Ok(Self::new(nodes))
    }

    /// Read the identity graph from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| LexiconError::io(path, e))?;
        Self::from_json_str(&content)
    }

    pub fn nodes(&self) -> &[Value] {
        &self.nodes
    }

    /// Check completeness and pull out what the builder needs.
    ///
    /// Every configured node except the DefinedTermSet is kept, in
    /// configuration order.
    pub(crate) fn resolve(&self) -> Result<ResolvedIdentity<'_>> {
        for ty in FIXED_NODE_TYPES {
            let node = self.find_unique(ty)?;
            if !ID_OPTIONAL_TYPES.contains(ty) {
                string_field(node, ty, "@id")?;
            }
        }

        let person = self.find_unique("Person")?;
        let term_set = self.find_unique(TERM_SET_TYPE)?;

        let fixed = self
            .nodes
            .iter()
            .filter_map(Value::as_object)
            .filter(|obj| node_type(obj) != Some(TERM_SET_TYPE))
            .collect();

        Ok(ResolvedIdentity {
            fixed,
            creator_id: string_field(person, "Person", "@id")?,
            term_set_id: string_field(term_set, TERM_SET_TYPE, "@id")?,
            term_set_url: string_field(term_set, TERM_SET_TYPE, "url")?,
            term_set,
        })
    }

    fn find_unique(&self, ty: &str) -> Result<&Map<String, Value>> {
        let mut found = None;
        for (i, node) in self.nodes.iter().enumerate() {
            let obj = node.as_object().ok_or_else(|| {
                LexiconError::configuration(format!("identity node #{i} is not a JSON object"))
            })?;
            if node_type(obj) == Some(ty) {
                if found.is_some() {
                    return Err(LexiconError::configuration(format!(
                        "identity graph has more than one {ty} node"
                    )));
                }
                found = Some(obj);
            }
        }
        found.ok_or_else(|| {
            LexiconError::configuration(format!("identity graph has no {ty} node"))
        })
    }
}

/// Borrowed view of a complete identity graph.
#[derive(Debug)]
pub(crate) struct ResolvedIdentity<'a> {
    /// Identity nodes other than the DefinedTermSet, in configuration order.
    pub fixed: Vec<&'a Map<String, Value>>,
    pub term_set: &'a Map<String, Value>,
    pub creator_id: &'a str,
    pub term_set_id: &'a str,
    pub term_set_url: &'a str,
}

fn node_type(obj: &Map<String, Value>) -> Option<&str> {
    obj.get("@type").and_then(Value::as_str)
}

fn string_field<'a>(obj: &'a Map<String, Value>, ty: &str, field: &str) -> Result<&'a str> {
    match obj.get(field).and_then(Value::as_str) {
        Some(s) if !s.trim().is_empty() => Ok(s),
        _ => Err(LexiconError::configuration(format!(
            "{ty} node is missing a non-empty '{field}'"
        ))),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use serde_json::json;

    pub(crate) fn sample_identity() -> IdentityGraph {
        IdentityGraph::new(vec![
            json!({"@type": "Person", "@id": "https://blog.example.net/about/#me", "name": "Ada Example"}),
            json!({"@type": "Organization", "@id": "https://blog.example.net/#publisher", "name": "Example Labs"}),
            json!({"@type": "WebSite", "@id": "https://www.example.net/#website", "url": "https://www.example.net/"}),
            json!({"@type": "WebPage", "@id": "https://www.example.net/terms/#webpage", "url": "https://www.example.net/terms/"}),
            json!({"@type": "DefinedTermSet", "@id": "https://www.example.net/terms/#termset", "url": "https://www.example.net/terms/", "name": "Example Terms"}),
            json!({"@type": "BreadcrumbList", "itemListElement": [
                {"@type": "ListItem", "position": 1, "name": "Home", "item": "https://www.example.net/"}
            ]}),
        ])
    }

    fn without(ty: &str) -> IdentityGraph {
        let nodes = sample_identity()
            .nodes()
            .iter()
            .filter(|n| n["@type"] != ty)
            .cloned()
            .collect();
        IdentityGraph::new(nodes)
    }

    #[test]
    fn resolves_complete_graph() {
        let identity = sample_identity();
        let resolved = identity.resolve().expect("complete graph");
        assert_eq!(resolved.fixed.len(), FIXED_NODE_TYPES.len());
        assert_eq!(resolved.fixed[0]["@type"], "Person");
        assert_eq!(resolved.fixed[4]["@type"], "BreadcrumbList");
        assert_eq!(resolved.creator_id, "https://blog.example.net/about/#me");
        assert_eq!(resolved.term_set_url, "https://www.example.net/terms/");
    }

    #[test]
    fn each_required_node_is_checked() {
        for ty in FIXED_NODE_TYPES.iter().chain(std::iter::once(&TERM_SET_TYPE)) {
            let err = without(ty).resolve().unwrap_err();
            assert!(
                matches!(err, LexiconError::Configuration { .. }),
                "missing {ty} should be a configuration error"
            );
            assert!(err.to_string().contains(ty));
        }
    }

    #[test]
    fn optional_nodes_are_kept_in_configured_order() {
        let mut nodes = sample_identity().nodes().to_vec();
        nodes.insert(1, json!({"@type": "ImageObject", "@id": "https://blog.example.net/#logo"}));
        nodes.push(json!({"@type": "ProfilePage", "@id": "https://www.example.net/about/"}));
        let identity = IdentityGraph::new(nodes);
        let resolved = identity.resolve().unwrap();
        let types: Vec<&str> = resolved.fixed.iter().filter_map(|n| node_type(n)).collect();
        assert_eq!(
            types,
            vec![
                "Person",
                "ImageObject",
                "Organization",
                "WebSite",
                "WebPage",
                "BreadcrumbList",
                "ProfilePage",
            ]
        );
    }

    #[test]
    fn duplicate_node_type_is_rejected() {
        let mut nodes = sample_identity().nodes().to_vec();
        nodes.push(json!({"@type": "Person", "@id": "https://other.example/#p"}));
        let err = IdentityGraph::new(nodes).resolve().unwrap_err();
        assert!(err.to_string().contains("more than one Person"));
    }

    #[test]
    fn term_set_requires_url() {
        let mut nodes = sample_identity().nodes().to_vec();
        nodes[4] = json!({"@type": "DefinedTermSet", "@id": "https://www.example.net/terms/#termset"});
        let err = IdentityGraph::new(nodes).resolve().unwrap_err();
        assert!(err.to_string().contains("'url'"));
    }

    #[test]
    fn breadcrumb_may_omit_id_but_person_may_not() {
        assert!(sample_identity().resolve().is_ok());

        let mut nodes = sample_identity().nodes().to_vec();
        nodes[0] = json!({"@type": "Person", "name": "Anonymous"});
        let err = IdentityGraph::new(nodes).resolve().unwrap_err();
        assert!(err.to_string().contains("Person node is missing"));
    }

    #[test]
    fn non_array_json_is_a_configuration_error() {
        let err = IdentityGraph::from_json_str(r#"{"@type": "Person"}"#).unwrap_err();
        assert!(matches!(err, LexiconError::Configuration { .. }));
    }
}
