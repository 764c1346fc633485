//! Command-line front end.
//!
//! `medrecon <order>` prints the parsed order as JSON.
//! `medrecon <before> <after>` prints the change reason.

use std::path::PathBuf;

use thiserror::Error;

use crate::config::{DiffConfig, ParserConfig, LEXICON_ENV};
use crate::diff::ChangeReasoner;
use crate::lexicon::{Lexicon, LexiconError};
use crate::parser::OrderParser;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("usage: medrecon <order> | medrecon <before> <after>")]
    Usage,
    #[error(transparent)]
    Lexicon(#[from] LexiconError),
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Built-in lexicon, extended with the overlay file named by
/// `MEDRECON_LEXICON` when it is set.
pub fn load_lexicon() -> Result<Lexicon, CliError> {
    match std::env::var_os(LEXICON_ENV) {
        Some(path) => {
            let path = PathBuf::from(path);
            let lexicon = Lexicon::from_overlay_file(&path)?;
            tracing::info!(path = %path.display(), "Lexicon overlay loaded");
            Ok(lexicon)
        }
        None => Ok(Lexicon::builtin()),
    }
}

/// Run one command against `lexicon` and return what should be printed.
pub fn execute(args: &[String], lexicon: &Lexicon) -> Result<String, CliError> {
    let parser = OrderParser::new(lexicon, ParserConfig::default());
    match args {
        [order] => {
            let parsed = parser.parse(order);
            Ok(serde_json::to_string_pretty(&parsed)?)
        }
        [before, after] => {
            let reasoner = ChangeReasoner::new(lexicon, DiffConfig::default());
            Ok(reasoner.reason(&parser.parse(before), &parser.parse(after)))
        }
        _ => Err(CliError::Usage),
    }
}
