//! Term types for the ontology graph.
//!
//! Terms live in the [`Ontology`](crate::Ontology); the graph itself only
//! stores their [`TermId`] handles.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Handle of a term inside one ontology.
///
/// Handles are never reused, so a handle of a removed term stays invalid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TermId(pub(crate) u32);

impl TermId {
    pub fn index(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for TermId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// An ontology term.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Term {
    /// Accession id, e.g. `GO:0008150`. Immutable once created.
    pub id: String,
    pub name: Option<String>,
    pub namespace: Option<String>,
    pub is_obsolete: bool,

    /// Every other stanza tag, in insertion order per tag.
    pub attributes: BTreeMap<String, Vec<String>>,
}

impl Term {
    pub fn new(id: impl Into<String>, name: Option<String>) -> Self {
        Self {
            id: id.into(),
            name,
            namespace: None,
            is_obsolete: false,
            attributes: BTreeMap::new(),
        }
    }

    /// The name, falling back to the id for placeholder terms.
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }

    /// All values stored for a generic attribute.
    pub fn attribute(&self, attr: &str) -> &[String] {
        self.attributes
            .get(attr)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

/// Names a term either by handle or by accession id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TermRef<'a> {
    Handle(TermId),
    Id(&'a str),
}

impl From<TermId> for TermRef<'_> {
    fn from(id: TermId) -> Self {
        TermRef::Handle(id)
    }
}

impl<'a> From<&'a str> for TermRef<'a> {
    fn from(id: &'a str) -> Self {
        TermRef::Id(id)
    }
}

impl<'a> From<&'a String> for TermRef<'a> {
    fn from(id: &'a String) -> Self {
        TermRef::Id(id.as_str())
    }
}

impl fmt::Display for TermRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TermRef::Handle(id) => write!(f, "{}", id),
            TermRef::Id(id) => write!(f, "{}", id),
        }
    }
}
