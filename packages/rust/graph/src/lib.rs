//! Knowledge-graph assembly for lexicon.
//!
//! - [`classify`]: provenance classification of a term's primary link
//! - [`identity`]: the fixed, configuration-supplied identity nodes
//! - [`builder`]: the ordered `@graph` with one node per term

pub mod builder;
pub mod classify;
pub mod identity;

pub use builder::{Graph, GraphNode, NodeRef, SCHEMA_CONTEXT, TermNode, TermSetNode, build};
pub use classify::{Classification, LinkClassifier, Provenance, ProvenanceKind, Rule};
pub use identity::IdentityGraph;
