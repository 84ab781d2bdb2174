//! Vocdag Graph - directed acyclic graphs for ontologies
//!
//! This crate holds a generic DAG with labelled edges, a hook-based
//! depth-first traversal, and the algorithms built on it. The
//! [`Ontology`] type layers terms, namespaces and relationship types on top.
//!
//! # Architecture
//!
//! - [`Dag`] wraps a petgraph `DiGraphMap` and enforces acyclicity on
//!   checked inserts
//! - [`Traversal`] walks the graph and calls a [`Visitor`] before and after
//!   each node and edge; returning `false` from a `before_*` hook prunes
//! - closure, cycle detection, pruning, subgraph extraction, mapping and
//!   printing are all visitors
//!
//! # Example
//!
//! ```no_run
//! use vocdag_graph::Ontology;
//!
//! let mut ontology = Ontology::new();
//! ontology.add_term("GO:0008150", Some("biological_process"));
//! ontology.add_relationship("GO:0009987", "is_a", "GO:0008150");
//!
//! assert!(ontology.check_cycles().is_empty());
//! let below = ontology.descendants("GO:0008150").unwrap();
//! ```

mod builder;
mod closure;
mod cycles;
mod dag;
mod error;
mod export;
mod mapper;
mod ontology;
mod printer;
mod prune;
mod subgraph;
mod term;
mod topo;
mod traverse;

pub use builder::{BuildOptions, OntologyBuilder, IS_A};
pub use closure::{Closure, ClosureMap};
pub use cycles::CycleChecker;
pub use dag::Dag;
pub use error::{GraphError, OntologyError, Result};
pub use export::{ClosureRow, EdgeRow, LoadSet, TermRow};
pub use mapper::DagMapper;
pub use ontology::Ontology;
pub use printer::SimplePrinter;
pub use prune::{prune_edges, prune_nodes, PruneReport, SimplePruner};
pub use subgraph::SubgraphExtractor;
pub use term::{Term, TermId, TermRef};
pub use traverse::{path_depth, PathStep, Traversal, Visitor};
