//! Flat rows for bulk loading an ontology into a store.

use crate::ontology::Ontology;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermRow {
    pub id: String,
    pub name: Option<String>,
    pub namespace: Option<String>,
    pub definition: Option<String>,
    pub is_obsolete: bool,
    pub is_root: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeRow {
    pub child: String,
    pub rel: String,
    pub parent: String,
}

/// One ancestor/descendant pair of the transitive closure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClosureRow {
    pub ancestor: String,
    pub descendant: String,
}

/// Everything a loader needs, sorted by id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadSet {
    pub terms: Vec<TermRow>,
    pub edges: Vec<EdgeRow>,
    pub closure: Vec<ClosureRow>,
}

impl LoadSet {
    /// Flattens an ontology. The closure rows assume it is acyclic.
    pub fn from_ontology(ontology: &Ontology) -> Self {
        let dag = ontology.dag();
        let mut terms: Vec<TermRow> = dag
            .nodes()
            .filter_map(|handle| {
                let term = ontology.get(handle)?;
                Some(TermRow {
                    id: term.id.clone(),
                    name: term.name.clone(),
                    namespace: term.namespace.clone(),
                    definition: term.attribute("def").first().cloned(),
                    is_obsolete: term.is_obsolete,
                    is_root: ontology.is_namespace_root(handle).unwrap_or(false),
                })
            })
            .collect();
        terms.sort_by(|a, b| a.id.cmp(&b.id));

        let mut edges: Vec<EdgeRow> = ontology
            .relationships()
            .map(|(child, rel, parent)| EdgeRow {
                child: child.to_string(),
                rel: rel.to_string(),
                parent: parent.to_string(),
            })
            .collect();
        edges.sort_by(|a, b| (&a.child, &a.parent).cmp(&(&b.child, &b.parent)));

        let mut closure: Vec<ClosureRow> = ontology
            .closure(false)
            .pairs()
            .into_iter()
            .filter_map(|(ancestor, descendant)| {
                Some(ClosureRow {
                    ancestor: ontology.get(ancestor)?.id.clone(),
                    descendant: ontology.get(descendant)?.id.clone(),
                })
            })
            .collect();
        closure.sort_by(|a, b| (&a.ancestor, &a.descendant).cmp(&(&b.ancestor, &b.descendant)));

        Self {
            terms,
            edges,
            closure,
        }
    }
}
