//! Error types for graph and ontology operations.

use crate::term::TermId;
use thiserror::Error;

/// Structural errors raised by [`Dag`](crate::Dag).
///
/// Every failing operation leaves the graph exactly as it was.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError<N> {
    #[error("node {0:?} not found")]
    NodeNotFound(N),

    #[error("edge {parent:?} -> {child:?} not found")]
    EdgeNotFound { parent: N, child: N },

    #[error("edge {parent:?} -> {child:?} would create a cycle")]
    Cycle { parent: N, child: N },
}

/// Errors raised by [`Ontology`](crate::Ontology).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OntologyError {
    #[error("term {0} not found")]
    TermNotFound(String),

    #[error("relationship {parent} -> {child} not found")]
    RelationshipNotFound { parent: String, child: String },

    #[error("attribute `{attribute}` cannot be modified")]
    InvalidOperation { attribute: String },

    #[error("invalid value `{value}` for attribute `{attribute}`")]
    InvalidValue { attribute: String, value: String },

    #[error(transparent)]
    Graph(#[from] GraphError<TermId>),
}

pub type Result<T> = std::result::Result<T, OntologyError>;
