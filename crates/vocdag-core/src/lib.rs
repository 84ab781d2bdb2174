//! Vocdag Core - ontology records and OBO parsing
//!
//! This crate turns OBO ontology files into flat term and relationship
//! records. It knows nothing about graphs: the records are handed to
//! `vocdag-graph`, which builds the DAG and runs closure and cycle checks.
//!
//! # Example
//!
//! ```no_run
//! use vocdag_core::OboParser;
//!
//! let parsed = OboParser::parse_file("go-basic.obo").unwrap();
//! println!("{} terms, {} relationships", parsed.terms.len(), parsed.relationships.len());
//! ```

mod error;
mod obo;
mod record;

pub use error::{ParseError, Result};
pub use obo::OboParser;
pub use record::{
    OboHeader, ParsedOntology, RelationshipRecord, Synonym, SynonymScope, TermRecord,
};
