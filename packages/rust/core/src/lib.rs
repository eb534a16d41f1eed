//! Core pipeline orchestration for the term lexicon.
//!
//! This crate ties together source loading, graph building, and rendering
//! into end-to-end runs (`generate`, `check`) and writes the final artifact.

pub mod assembler;
pub mod loader;
pub mod pipeline;
