//! Transitive closure.
//!
//! Each visited node starts with the set `{node}` (or `{}` when the selector
//! rejects it). After every crossed edge the far end's set is merged into
//! the near end's, so in post-order every node ends up holding all selected
//! nodes below it (or above it, when reversed).
//!
//! The result is only meaningful for acyclic graphs. Run
//! [`Dag::check_cycles`] first on untrusted input.

use crate::dag::Dag;
use crate::traverse::{PathStep, Traversal, Visitor};
use petgraph::graphmap::NodeTrait;
use std::collections::{BTreeMap, BTreeSet};

/// Computes closure sets during a traversal.
pub struct Closure<N, F> {
    selector: F,
    reversed: bool,
    sets: BTreeMap<N, BTreeSet<N>>,
}

impl<N: NodeTrait> Closure<N, fn(N) -> bool> {
    /// Closure over every node.
    pub fn new() -> Self {
        Self::with_selector(|_| true)
    }
}

impl<N: NodeTrait> Default for Closure<N, fn(N) -> bool> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N: NodeTrait, F: FnMut(N) -> bool> Closure<N, F> {
    /// Closure restricted to nodes accepted by `selector`.
    pub fn with_selector(selector: F) -> Self {
        Self {
            selector,
            reversed: false,
            sets: BTreeMap::new(),
        }
    }

    /// Collects ancestors instead of descendants.
    pub fn reversed(mut self, reversed: bool) -> Self {
        self.reversed = reversed;
        self
    }

    /// Walks the whole graph from its roots (or leaves) and returns the sets.
    pub fn compute<E>(mut self, dag: &Dag<N, E>) -> ClosureMap<N> {
        Traversal::new().reversed(self.reversed).run(dag, &mut self);
        ClosureMap { sets: self.sets }
    }

    /// Walks only from `start`, so the map covers just what those nodes reach.
    pub fn compute_from<E>(mut self, dag: &Dag<N, E>, start: impl IntoIterator<Item = N>) -> ClosureMap<N> {
        Traversal::from_nodes(start)
            .reversed(self.reversed)
            .run(dag, &mut self);
        ClosureMap { sets: self.sets }
    }
}

impl<N: NodeTrait, E, F: FnMut(N) -> bool> Visitor<N, E> for Closure<N, F> {
    fn before_node(&mut self, _dag: &Dag<N, E>, node: N, _path: &[PathStep<'_, N, E>]) -> bool {
        if !self.sets.contains_key(&node) {
            let mut set = BTreeSet::new();
            if (self.selector)(node) {
                set.insert(node);
            }
            self.sets.insert(node, set);
        }
        true
    }

    fn after_edge(
        &mut self,
        _dag: &Dag<N, E>,
        parent: N,
        child: N,
        _payload: &E,
        _path: &[PathStep<'_, N, E>],
    ) {
        let (into, from) = if self.reversed {
            (child, parent)
        } else {
            (parent, child)
        };
        if into == from {
            return;
        }
        if let Some(source) = self.sets.remove(&from) {
            self.sets
                .entry(into)
                .or_default()
                .extend(source.iter().copied());
            self.sets.insert(from, source);
        }
    }
}

/// Closure sets keyed by node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClosureMap<N> {
    sets: BTreeMap<N, BTreeSet<N>>,
}

impl<N: NodeTrait> ClosureMap<N> {
    /// The closure set including `node` itself when it was selected.
    pub fn reflexive(&self, node: N) -> BTreeSet<N> {
        self.sets.get(&node).cloned().unwrap_or_default()
    }

    /// The closure of `node` without `node` itself.
    pub fn get(&self, node: N) -> BTreeSet<N> {
        let mut set = self.reflexive(node);
        set.remove(&node);
        set
    }

    /// Nodes the traversal reached.
    pub fn nodes(&self) -> impl Iterator<Item = N> + '_ {
        self.sets.keys().copied()
    }

    /// `(node, reachable)` pairs, excluding self-pairs, sorted.
    pub fn pairs(&self) -> Vec<(N, N)> {
        let mut pairs: Vec<(N, N)> = self
            .sets
            .iter()
            .flat_map(|(&node, set)| {
                set.iter()
                    .copied()
                    .filter(move |&other| other != node)
                    .map(move |other| (node, other))
            })
            .collect();
        pairs.sort();
        pairs
    }
}

impl<N: NodeTrait, E> Dag<N, E> {
    /// Descendant sets for every node reachable from a root.
    pub fn closure(&self) -> ClosureMap<N> {
        Closure::new().compute(self)
    }

    /// Ancestor sets for every node reachable from a leaf.
    pub fn reverse_closure(&self) -> ClosureMap<N> {
        Closure::new().reversed(true).compute(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diamond() -> Dag<char, ()> {
        let mut dag = Dag::new();
        dag.add_edge('a', 'b', ()).unwrap();
        dag.add_edge('a', 'c', ()).unwrap();
        dag.add_edge('b', 'd', ()).unwrap();
        dag.add_edge('c', 'd', ()).unwrap();
        dag
    }

    fn set(nodes: &str) -> BTreeSet<char> {
        nodes.chars().collect()
    }

    #[test]
    fn test_diamond_closure() {
        let closure = diamond().closure();
        assert_eq!(closure.get('a'), set("bcd"));
        assert_eq!(closure.get('b'), set("d"));
        assert_eq!(closure.get('d'), set(""));
        assert_eq!(closure.reflexive('a'), set("abcd"));
    }

    #[test]
    fn test_reverse_closure() {
        let ancestors = diamond().reverse_closure();
        assert_eq!(ancestors.get('d'), set("abc"));
        assert_eq!(ancestors.get('a'), set(""));
    }

    #[test]
    fn test_selector_limits_members() {
        let closure = Closure::with_selector(|n: char| n != 'd').compute(&diamond());
        assert_eq!(closure.get('a'), set("bc"));
        assert_eq!(closure.reflexive('d'), set(""));
    }

    #[test]
    fn test_closure_is_idempotent() {
        let dag = diamond();
        assert_eq!(dag.closure(), dag.closure());
    }

    #[test]
    fn test_pairs() {
        let pairs = diamond().closure().pairs();
        assert_eq!(
            pairs,
            vec![('a', 'b'), ('a', 'c'), ('a', 'd'), ('b', 'd'), ('c', 'd')]
        );
    }
}
