//! Lexicon CLI: build a single-page term glossary with embedded JSON-LD.
//!
//! Reads one JSON file per term, links each term to the work where it first
//! appeared, and writes a self-contained, searchable HTML document.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli)
}
