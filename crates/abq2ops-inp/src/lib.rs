//! Abaqus `.inp` parser for the OpenSeesPy translator.
//!
//! Handles the keyword subset the translator maps: `*NODE`, `*ELEMENT`,
//! `*MATERIAL` with `*ELASTIC`/`*DENSITY`, `*SHELL SECTION`, `*SOLID SECTION`,
//! `*BOUNDARY`, `*CLOAD`, `*ELSET` and `*NSET`. Every other keyword is skipped.

use std::path::Path;

use abq2ops_model::Model;
use tracing::info;

pub mod error;
pub mod header;
mod parser;
pub mod source;

pub use error::{InpError, Result};
pub use header::{Header, Parameter};
pub use parser::{
    DEFAULT_THICKNESS, Diagnostic, MAX_GENERATED_IDS, ParseOutcome, ParserState, parse_source,
    parse_str, parse_str_with_diagnostics,
};
pub use source::{SourceMap, SourceText};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOptions {
    /// Splice `*INCLUDE, INPUT=...` targets into the deck before parsing
    pub expand_includes: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            expand_includes: true,
        }
    }
}

/// Parse a deck file with default options.
pub fn parse_file(path: impl AsRef<Path>) -> Result<Model> {
    parse_file_with_options(path, &ParseOptions::default()).map(|outcome| outcome.model)
}

pub fn parse_file_with_options(
    path: impl AsRef<Path>,
    options: &ParseOptions,
) -> Result<ParseOutcome> {
    let path = path.as_ref();
    info!("parsing Abaqus file {}", path.display());
    let source = if options.expand_includes {
        source::read_with_includes(path)?
    } else {
        let text = source::read_text(path)?;
        SourceText {
            map: SourceMap::single(path, text.lines().count()),
            text,
        }
    };
    let outcome = parse_source(&source);
    info!(
        "parsed {}: {} nodes, {} elements, {} skipped rows",
        path.display(),
        outcome.model.nodes.len(),
        outcome.model.elements.len(),
        outcome.diagnostics.len()
    );
    Ok(outcome)
}
