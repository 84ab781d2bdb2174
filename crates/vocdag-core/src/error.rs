//! Error types for ontology parsing.

use thiserror::Error;

/// Errors raised while reading an ontology file.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("failed to read ontology file: {0}")]
    Io(#[from] std::io::Error),

    #[error("line {line}: {message}")]
    Malformed { line: usize, message: String },
}

pub type Result<T> = std::result::Result<T, ParseError>;
