//! Flat records produced by the parser.
//!
//! A record mirrors one OBO stanza. Relationships are kept separate from
//! terms so the graph builder can add every term before resolving edges.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Scope of a term synonym.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SynonymScope {
    Exact,
    Narrow,
    Broad,
    Related,
}

impl SynonymScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Exact => "EXACT",
            Self::Narrow => "NARROW",
            Self::Broad => "BROAD",
            Self::Related => "RELATED",
        }
    }

    /// Maps the pre-1.2 OBO synonym tags (`exact_synonym` etc.) to a scope.
    pub fn from_legacy_tag(tag: &str) -> Option<Self> {
        match tag {
            "exact_synonym" => Some(Self::Exact),
            "narrow_synonym" => Some(Self::Narrow),
            "broad_synonym" => Some(Self::Broad),
            "related_synonym" => Some(Self::Related),
            _ => None,
        }
    }
}

impl FromStr for SynonymScope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "EXACT" => Ok(Self::Exact),
            "NARROW" => Ok(Self::Narrow),
            "BROAD" => Ok(Self::Broad),
            "RELATED" => Ok(Self::Related),
            other => Err(format!("unknown synonym scope: {}", other)),
        }
    }
}

impl fmt::Display for SynonymScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A synonym attached to a term.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Synonym {
    pub text: String,
    pub scope: SynonymScope,
    pub xrefs: Vec<String>,
}

/// One `[Term]` stanza.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TermRecord {
    pub id: String,
    pub name: Option<String>,
    pub namespace: Option<String>,
    pub definition: Option<String>,
    pub comment: Option<String>,
    pub is_obsolete: bool,
    pub synonyms: Vec<Synonym>,
    pub alt_ids: Vec<String>,
    pub xrefs: Vec<String>,
    pub subsets: Vec<String>,

    /// Tags the parser has no typed field for, in file order per tag.
    pub extra: BTreeMap<String, Vec<String>>,
}

impl TermRecord {
    /// Creates a record with only an id.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }
}

/// A `child rel parent` association read from an `is_a` or
/// `relationship` tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RelationshipRecord {
    pub child: String,
    pub rel: String,
    pub parent: String,
}

impl RelationshipRecord {
    pub fn new(
        child: impl Into<String>,
        rel: impl Into<String>,
        parent: impl Into<String>,
    ) -> Self {
        Self {
            child: child.into(),
            rel: rel.into(),
            parent: parent.into(),
        }
    }
}

/// Header tags that precede the first stanza.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OboHeader {
    pub format_version: Option<String>,
    pub data_version: Option<String>,
    pub default_namespace: Option<String>,
    pub ontology: Option<String>,
}

/// Everything read from one ontology file, in file order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParsedOntology {
    pub header: OboHeader,
    pub terms: Vec<TermRecord>,
    pub relationships: Vec<RelationshipRecord>,
    /// Ids of `[Typedef]` stanzas (the declared relationship types).
    pub typedefs: Vec<String>,
}
