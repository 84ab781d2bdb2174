//! Ontology view over the graph core.
//!
//! `Ontology` keeps the term records next to a `Dag<TermId, String>` whose
//! edge payloads are relationship type labels (`is_a`, `part_of`, ...).
//! All structural changes go through here so the derived state stays in
//! step with the graph:
//!
//! - the namespace and relationship type vocabularies, which only grow;
//! - the per-namespace root lists, rebuilt lazily after any change.
//!
//! Relationships are added without cycle checks because ontology files
//! reference parents before declaring them. Call
//! [`Ontology::check_cycles`] before trusting roots or closures.
//!
//! The root cache uses a `OnceCell`, so an `Ontology` is `!Sync`.

use crate::closure::{Closure, ClosureMap};
use crate::dag::Dag;
use crate::error::{OntologyError, Result};
use crate::printer::SimplePrinter;
use crate::term::{Term, TermId, TermRef};
use crate::traverse::Traversal;
use std::cell::OnceCell;
use std::collections::{BTreeSet, HashMap};
use tracing::{debug, info};

const ATTR_ID: &str = "id";
const ATTR_NAME: &str = "name";
const ATTR_NAMESPACE: &str = "namespace";
const ATTR_OBSOLETE: &str = "is_obsolete";

/// Roots of the graph, all together and per namespace, sorted by label.
#[derive(Debug, Clone, Default)]
struct RootIndex {
    all: Vec<TermId>,
    by_namespace: HashMap<String, Vec<TermId>>,
}

/// A set of terms connected by typed relationships.
#[derive(Debug, Clone, Default)]
pub struct Ontology {
    dag: Dag<TermId, String>,
    terms: HashMap<TermId, Term>,
    id_index: HashMap<String, TermId>,
    next_handle: u32,
    namespaces: BTreeSet<String>,
    relationship_types: BTreeSet<String>,
    roots: OnceCell<RootIndex>,
}

impl Ontology {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the term with this id, creating it if needed.
    ///
    /// A `Some` name replaces the stored one; `None` leaves it alone, so
    /// placeholder terms created by forward references pick up their name
    /// once their stanza is read.
    pub fn add_term(&mut self, id: &str, name: Option<&str>) -> TermId {
        self.invalidate_roots();

        if let Some(&handle) = self.id_index.get(id) {
            if let (Some(name), Some(term)) = (name, self.terms.get_mut(&handle)) {
                term.name = Some(name.to_string());
            }
            return handle;
        }

        let handle = TermId(self.next_handle);
        self.next_handle += 1;
        self.terms
            .insert(handle, Term::new(id, name.map(str::to_string)));
        self.id_index.insert(id.to_string(), handle);
        self.dag.add_node(handle);
        handle
    }

    /// Removes a term and every relationship touching it.
    pub fn remove_term<'a>(&mut self, term: impl Into<TermRef<'a>>) -> Result<Term> {
        let handle = self.resolve(term)?;

        let parents: Vec<TermId> = self.dag.parents(handle).collect();
        let children: Vec<TermId> = self
            .dag
            .children(handle)
            .filter(|&child| child != handle)
            .collect();
        for parent in parents {
            self.remove_relationship(parent, handle)?;
        }
        for child in children {
            self.remove_relationship(handle, child)?;
        }

        self.dag.remove_node(handle)?;
        self.invalidate_roots();

        let removed = self
            .terms
            .remove(&handle)
            .ok_or_else(|| OntologyError::TermNotFound(handle.to_string()))?;
        self.id_index.remove(&removed.id);
        debug!("Removed term {}", removed.id);
        Ok(removed)
    }

    /// Replaces an attribute of a term.
    ///
    /// `name`, `namespace` and `is_obsolete` set the typed fields; anything
    /// else replaces the values stored under that key. `id` cannot be
    /// changed.
    pub fn set_term_attribute<'a>(
        &mut self,
        term: impl Into<TermRef<'a>>,
        attr: &str,
        value: &str,
    ) -> Result<()> {
        let handle = self.resolve(term)?;
        self.write_attribute(handle, attr, value, false)
    }

    /// Like [`set_term_attribute`](Self::set_term_attribute), but generic
    /// attributes collect every value instead of keeping the last.
    pub fn add_term_attribute<'a>(
        &mut self,
        term: impl Into<TermRef<'a>>,
        attr: &str,
        value: &str,
    ) -> Result<()> {
        let handle = self.resolve(term)?;
        self.write_attribute(handle, attr, value, true)
    }

    fn write_attribute(&mut self, handle: TermId, attr: &str, value: &str, append: bool) -> Result<()> {
        if attr == ATTR_ID {
            return Err(OntologyError::InvalidOperation {
                attribute: attr.to_string(),
            });
        }
        let flag = match attr {
            ATTR_OBSOLETE => Some(parse_flag(value).ok_or_else(|| OntologyError::InvalidValue {
                attribute: attr.to_string(),
                value: value.to_string(),
            })?),
            _ => None,
        };

        let term = self
            .terms
            .get_mut(&handle)
            .ok_or_else(|| OntologyError::TermNotFound(handle.to_string()))?;

        match attr {
            ATTR_NAME => term.name = Some(value.to_string()),
            ATTR_NAMESPACE => term.namespace = Some(value.to_string()),
            ATTR_OBSOLETE => term.is_obsolete = flag.unwrap_or_default(),
            _ if append => term
                .attributes
                .entry(attr.to_string())
                .or_default()
                .push(value.to_string()),
            _ => {
                term.attributes
                    .insert(attr.to_string(), vec![value.to_string()]);
            }
        }

        match attr {
            ATTR_NAMESPACE => {
                self.record_namespace(value);
                self.invalidate_roots();
            }
            ATTR_OBSOLETE => self.invalidate_roots(),
            _ => {}
        }
        Ok(())
    }

    /// Adds `child rel parent`, creating either term if it is unknown.
    ///
    /// No cycle check is made. Returns the label the pair carried before,
    /// if it was already related.
    pub fn add_relationship(&mut self, child: &str, rel: &str, parent: &str) -> Option<String> {
        let child = self.add_term(child, None);
        let parent = self.add_term(parent, None);
        self.record_relationship_type(rel);
        self.invalidate_roots();
        self.dag.add_edge_unchecked(parent, child, rel.to_string())
    }

    /// Removes the relationship between `parent` and `child`, returning its
    /// label.
    pub fn remove_relationship<'a, 'b>(
        &mut self,
        parent: impl Into<TermRef<'a>>,
        child: impl Into<TermRef<'b>>,
    ) -> Result<String> {
        let parent = self.resolve(parent)?;
        let child = self.resolve(child)?;

        if !self.dag.has_edge(parent, child) {
            return Err(OntologyError::RelationshipNotFound {
                parent: self.id_of(parent),
                child: self.id_of(child),
            });
        }
        let label = self.dag.remove_edge(parent, child)?;
        self.invalidate_roots();
        Ok(label)
    }

    /// Looks up a handle, failing if the term does not exist.
    pub fn resolve<'a>(&self, term: impl Into<TermRef<'a>>) -> Result<TermId> {
        match term.into() {
            TermRef::Handle(handle) if self.terms.contains_key(&handle) => Ok(handle),
            TermRef::Handle(handle) => Err(OntologyError::TermNotFound(handle.to_string())),
            TermRef::Id(id) => self
                .id_index
                .get(id)
                .copied()
                .ok_or_else(|| OntologyError::TermNotFound(id.to_string())),
        }
    }

    /// Looks up a term, failing if it does not exist.
    pub fn term<'a>(&self, term: impl Into<TermRef<'a>>) -> Result<&Term> {
        let handle = self.resolve(term)?;
        self.terms
            .get(&handle)
            .ok_or_else(|| OntologyError::TermNotFound(handle.to_string()))
    }

    pub fn get(&self, handle: TermId) -> Option<&Term> {
        self.terms.get(&handle)
    }

    pub fn handle(&self, id: &str) -> Option<TermId> {
        self.id_index.get(id).copied()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.id_index.contains_key(id)
    }

    fn id_of(&self, handle: TermId) -> String {
        self.terms
            .get(&handle)
            .map(|t| t.id.clone())
            .unwrap_or_else(|| handle.to_string())
    }

    /// Iterates over all terms.
    pub fn terms(&self) -> impl Iterator<Item = &Term> + '_ {
        self.dag.nodes().filter_map(move |h| self.terms.get(&h))
    }

    pub fn term_count(&self) -> usize {
        self.terms.len()
    }

    pub fn relationship_count(&self) -> usize {
        self.dag.edge_count()
    }

    /// The label of `parent -> child`, if they are related.
    pub fn relationship(&self, parent: TermId, child: TermId) -> Option<&str> {
        self.dag.get_edge(parent, child).map(String::as_str)
    }

    /// Every relationship as `(child, rel, parent)` ids.
    pub fn relationships(&self) -> impl Iterator<Item = (&str, &str, &str)> + '_ {
        self.dag.edges().filter_map(move |(parent, child, rel)| {
            let parent = self.terms.get(&parent)?;
            let child = self.terms.get(&child)?;
            Some((child.id.as_str(), rel.as_str(), parent.id.as_str()))
        })
    }

    /// Direct parents with the relationship label leading to each.
    pub fn parents<'a>(&self, term: impl Into<TermRef<'a>>) -> Result<Vec<(&Term, &str)>> {
        let handle = self.resolve(term)?;
        Ok(self
            .dag
            .in_edges(handle)
            .filter_map(|(parent, rel)| Some((self.terms.get(&parent)?, rel.as_str())))
            .collect())
    }

    /// Direct children with the relationship label leading to each.
    pub fn children<'a>(&self, term: impl Into<TermRef<'a>>) -> Result<Vec<(&Term, &str)>> {
        let handle = self.resolve(term)?;
        Ok(self
            .dag
            .out_edges(handle)
            .filter_map(|(child, rel)| Some((self.terms.get(&child)?, rel.as_str())))
            .collect())
    }

    /// Every namespace ever assigned to a term, including ones whose terms
    /// have since been removed.
    pub fn namespaces(&self) -> &BTreeSet<String> {
        &self.namespaces
    }

    /// Namespaces of the terms currently present.
    pub fn active_namespaces(&self) -> BTreeSet<String> {
        self.terms
            .values()
            .filter_map(|t| t.namespace.clone())
            .collect()
    }

    /// Every relationship label ever added.
    pub fn relationship_types(&self) -> &BTreeSet<String> {
        &self.relationship_types
    }

    /// Relationship labels of the edges currently present.
    pub fn active_relationship_types(&self) -> BTreeSet<String> {
        self.dag.edges().map(|(_, _, rel)| rel.clone()).collect()
    }

    fn record_namespace(&mut self, namespace: &str) {
        if !self.namespaces.contains(namespace) {
            self.namespaces.insert(namespace.to_string());
        }
    }

    fn record_relationship_type(&mut self, rel: &str) {
        if !self.relationship_types.contains(rel) {
            self.relationship_types.insert(rel.to_string());
        }
    }

    fn invalidate_roots(&mut self) {
        self.roots.take();
    }

    fn root_index(&self) -> &RootIndex {
        self.roots.get_or_init(|| {
            let mut index = RootIndex::default();
            for handle in self.dag.roots() {
                let Some(term) = self.terms.get(&handle) else {
                    continue;
                };
                if term.is_obsolete {
                    continue;
                }
                index.all.push(handle);
                if let Some(namespace) = &term.namespace {
                    index
                        .by_namespace
                        .entry(namespace.clone())
                        .or_default()
                        .push(handle);
                }
            }

            let key = |h: &TermId| self.terms.get(h).map(|t| (t.label(), t.id.as_str()));
            index.all.sort_by_key(key);
            for roots in index.by_namespace.values_mut() {
                roots.sort_by_key(key);
            }
            debug!("Rebuilt root index: {} roots", index.all.len());
            index
        })
    }

    /// Non-obsolete terms without parents, sorted by name.
    ///
    /// With a namespace, only roots in that namespace are returned.
    pub fn roots(&self, namespace: Option<&str>) -> Vec<&Term> {
        let index = self.root_index();
        let handles: &[TermId] = match namespace {
            None => &index.all,
            Some(ns) => index
                .by_namespace
                .get(ns)
                .map(Vec::as_slice)
                .unwrap_or_default(),
        };
        handles.iter().filter_map(|h| self.terms.get(h)).collect()
    }

    /// True if the term is a non-obsolete root.
    pub fn is_namespace_root<'a>(&self, term: impl Into<TermRef<'a>>) -> Result<bool> {
        let handle = self.resolve(term)?;
        Ok(self.root_index().all.contains(&handle))
    }

    /// Obsolete terms, in graph order.
    pub fn obsolete_terms(&self) -> Vec<&Term> {
        self.terms().filter(|t| t.is_obsolete).collect()
    }

    /// Ids of all terms on a cycle; empty when the ontology is a DAG.
    pub fn check_cycles(&self) -> BTreeSet<String> {
        self.dag
            .check_cycles()
            .into_iter()
            .map(|h| self.id_of(h))
            .collect()
    }

    /// Closure over every term: descendants, or ancestors when reversed.
    pub fn closure(&self, reversed: bool) -> ClosureMap<TermId> {
        Closure::new().reversed(reversed).compute(&self.dag)
    }

    /// Ids of every term below `term`, sorted.
    pub fn descendants<'a>(&self, term: impl Into<TermRef<'a>>) -> Result<BTreeSet<String>> {
        self.reachable(term, false)
    }

    /// Ids of every term above `term`, sorted.
    pub fn ancestors<'a>(&self, term: impl Into<TermRef<'a>>) -> Result<BTreeSet<String>> {
        self.reachable(term, true)
    }

    fn reachable<'a>(&self, term: impl Into<TermRef<'a>>, reversed: bool) -> Result<BTreeSet<String>> {
        let handle = self.resolve(term)?;
        let closure = Closure::new()
            .reversed(reversed)
            .compute_from(&self.dag, [handle]);
        Ok(closure
            .get(handle)
            .into_iter()
            .map(|h| self.id_of(h))
            .collect())
    }

    /// Terms ordered so every parent precedes its children.
    pub fn topological_order(&self) -> Vec<&Term> {
        self.dag
            .topological_order(|h| self.terms.get(&h).map(|t| (t.label(), t.id.as_str())))
            .into_iter()
            .filter_map(|h| self.terms.get(&h))
            .collect()
    }

    /// Removes every term of a namespace and returns how many went.
    pub fn prune_namespace(&mut self, namespace: &str) -> Result<usize> {
        let doomed: Vec<TermId> = self
            .terms
            .iter()
            .filter(|(_, t)| t.namespace.as_deref() == Some(namespace))
            .map(|(&h, _)| h)
            .collect();
        for &handle in &doomed {
            self.remove_term(handle)?;
        }
        info!("Pruned {} terms from namespace {}", doomed.len(), namespace);
        Ok(doomed.len())
    }

    /// Indented tree of everything below `term`.
    ///
    /// A term reachable over several paths is expanded once; later edges
    /// into it print as a single line ending in `...`.
    pub fn render_tree<'a>(&self, term: impl Into<TermRef<'a>>) -> Result<String> {
        let handle = self.resolve(term)?;
        let printer = SimplePrinter::new(
            |h: TermId| match self.terms.get(&h) {
                Some(t) => format!("{} {}", t.id, t.label()),
                None => h.to_string(),
            },
            |rel: &String| rel.clone(),
        )
        .collapse_repeats(true);
        Ok(printer.render(&self.dag, &Traversal::from_nodes([handle])))
    }

    /// The underlying graph, for running other algorithms.
    pub fn dag(&self) -> &Dag<TermId, String> {
        &self.dag
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}
