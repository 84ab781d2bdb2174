//! Builds an [`Ontology`] from parsed OBO records.
//!
//! The builder works in two passes:
//! 1. Add every term with its attributes
//! 2. Add relationships, creating placeholders for unknown parents

use crate::error::Result;
use crate::ontology::Ontology;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, info};
use vocdag_core::{ParsedOntology, RelationshipRecord, TermRecord};

/// The relationship type that is always kept.
pub const IS_A: &str = "is_a";

/// Which records make it into the ontology.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildOptions {
    /// Terms in these namespaces are skipped with their relationships.
    pub exclude_namespaces: Vec<String>,
    /// Relationship types to keep besides `is_a`; `None` keeps all.
    pub relationship_types: Option<Vec<String>>,
    pub include_obsolete: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            exclude_namespaces: Vec::new(),
            relationship_types: None,
            include_obsolete: true,
        }
    }
}

impl BuildOptions {
    fn keeps_term(&self, record: &TermRecord) -> bool {
        if record.is_obsolete && !self.include_obsolete {
            return false;
        }
        match &record.namespace {
            Some(ns) => !self.exclude_namespaces.iter().any(|x| x == ns),
            None => true,
        }
    }

    fn keeps_relationship(&self, rel: &str) -> bool {
        rel == IS_A
            || self
                .relationship_types
                .as_ref()
                .map_or(true, |types| types.iter().any(|t| t == rel))
    }
}

/// Builds an ontology from one or more parsed files.
#[derive(Debug, Default)]
pub struct OntologyBuilder {
    options: BuildOptions,
    terms: Vec<TermRecord>,
    relationships: Vec<RelationshipRecord>,
}

impl OntologyBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: BuildOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    /// Queues the records of a parsed file.
    ///
    /// Call this for each file, then call `build` once everything is added.
    pub fn add_parsed(&mut self, parsed: ParsedOntology) -> &mut Self {
        self.terms.extend(parsed.terms);
        self.relationships.extend(parsed.relationships);
        self
    }

    /// Runs both passes and returns the ontology.
    pub fn build(self) -> Result<Ontology> {
        let mut ontology = Ontology::new();
        let mut skipped: HashSet<String> = HashSet::new();

        for record in self.terms {
            if !self.options.keeps_term(&record) {
                debug!("Skipping term {}", record.id);
                skipped.insert(record.id);
                continue;
            }
            add_record(&mut ontology, record)?;
        }

        let mut dropped = 0usize;
        for RelationshipRecord { child, rel, parent } in self.relationships {
            if skipped.contains(&child)
                || skipped.contains(&parent)
                || !self.options.keeps_relationship(&rel)
            {
                dropped += 1;
                continue;
            }
            ontology.add_relationship(&child, &rel, &parent);
        }

        info!(
            "Built ontology: {} terms, {} relationships ({} terms and {} relationships filtered)",
            ontology.term_count(),
            ontology.relationship_count(),
            skipped.len(),
            dropped
        );
        Ok(ontology)
    }
}

fn add_record(ontology: &mut Ontology, record: TermRecord) -> Result<()> {
    let handle = ontology.add_term(&record.id, record.name.as_deref());

    if let Some(ns) = &record.namespace {
        ontology.set_term_attribute(handle, "namespace", ns)?;
    }
    if record.is_obsolete {
        ontology.set_term_attribute(handle, "is_obsolete", "true")?;
    }
    if let Some(def) = &record.definition {
        ontology.set_term_attribute(handle, "def", def)?;
    }
    if let Some(comment) = &record.comment {
        ontology.set_term_attribute(handle, "comment", comment)?;
    }

    for synonym in &record.synonyms {
        ontology.add_term_attribute(handle, "synonym", &synonym.text)?;
    }
    let lists = [
        ("alt_id", &record.alt_ids),
        ("xref", &record.xrefs),
        ("subset", &record.subsets),
    ];
    for (attr, values) in lists {
        for value in values {
            ontology.add_term_attribute(handle, attr, value)?;
        }
    }
    for (attr, values) in &record.extra {
        for value in values {
            ontology.add_term_attribute(handle, attr, value)?;
        }
    }
    Ok(())
}
