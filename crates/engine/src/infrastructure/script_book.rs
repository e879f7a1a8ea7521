//! Loading the scripted dialogue book.

use std::path::{Path, PathBuf};

use minefriend_domain::{DomainError, ScriptBook};

/// The book shipped with the engine.
pub const BUILT_IN_SCRIPT_BOOK: &str = include_str!("../../data/script_book.json");

#[derive(Debug, thiserror::Error)]
pub enum ScriptBookError {
    #[error("Failed to read script book {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Script book is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Script book rejected: {0}")]
    Invalid(#[from] DomainError),
}

pub fn parse_script_book(json: &str) -> Result<ScriptBook, ScriptBookError> {
    let book: ScriptBook = serde_json::from_str(json)?;
    book.validate()?;
    Ok(book)
}

pub fn built_in_script_book() -> Result<ScriptBook, ScriptBookError> {
    parse_script_book(BUILT_IN_SCRIPT_BOOK)
}

/// Load from `path` when given, otherwise the built-in book.
pub fn load_script_book(path: Option<&Path>) -> Result<ScriptBook, ScriptBookError> {
    let Some(path) = path else {
        return built_in_script_book();
    };
    let json = std::fs::read_to_string(path).map_err(|source| ScriptBookError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let book = parse_script_book(&json)?;
    tracing::info!(path = %path.display(), "Loaded script book");
    Ok(book)
}
