//! Sub-graph extraction.

use crate::dag::Dag;
use crate::traverse::{PathStep, Traversal, Visitor};
use petgraph::graphmap::NodeTrait;
use std::collections::HashSet;

/// Copies part of a graph into a new one.
///
/// Inclusive extraction keeps everything reachable from the start nodes.
/// Exclusive extraction keeps only the start nodes themselves and the edges
/// running directly between them.
pub struct SubgraphExtractor<N, E> {
    start_nodes: Vec<N>,
    members: HashSet<N>,
    inclusive: bool,
    reversed: bool,
    result: Dag<N, E>,
}

impl<N: NodeTrait, E: Clone> SubgraphExtractor<N, E> {
    pub fn new<I: IntoIterator<Item = N>>(start_nodes: I, inclusive: bool) -> Self {
        let start_nodes: Vec<N> = start_nodes.into_iter().collect();
        Self {
            members: start_nodes.iter().copied().collect(),
            start_nodes,
            inclusive,
            reversed: false,
            result: Dag::new(),
        }
    }

    /// Follows incoming edges, collecting ancestors instead of descendants.
    pub fn reversed(mut self, reversed: bool) -> Self {
        self.reversed = reversed;
        self
    }

    pub fn extract(mut self, dag: &Dag<N, E>) -> Dag<N, E> {
        Traversal::from_nodes(self.start_nodes.clone())
            .reversed(self.reversed)
            .run(dag, &mut self);
        self.result
    }
}

impl<N: NodeTrait, E: Clone> Visitor<N, E> for SubgraphExtractor<N, E> {
    fn before_node(&mut self, _dag: &Dag<N, E>, node: N, _path: &[PathStep<'_, N, E>]) -> bool {
        if self.inclusive || self.members.contains(&node) {
            self.result.add_node(node);
            true
        } else {
            false
        }
    }

    fn before_edge(
        &mut self,
        _dag: &Dag<N, E>,
        parent: N,
        child: N,
        payload: &E,
        _path: &[PathStep<'_, N, E>],
    ) -> bool {
        if self.inclusive || (self.members.contains(&parent) && self.members.contains(&child)) {
            self.result
                .add_edge_unchecked(parent, child, payload.clone());
        }
        true
    }
}

impl<N: NodeTrait, E: Clone> Dag<N, E> {
    /// Everything below the given nodes, as a new graph.
    pub fn descendant_subgraph<I: IntoIterator<Item = N>>(&self, nodes: I) -> Dag<N, E> {
        SubgraphExtractor::new(nodes, true).extract(self)
    }

    /// The given nodes and the edges directly between them.
    pub fn induced_subgraph<I: IntoIterator<Item = N>>(&self, nodes: I) -> Dag<N, E> {
        SubgraphExtractor::new(nodes, false).extract(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Dag<char, u8> {
        let mut dag = Dag::new();
        dag.add_edge('r', 'a', 1).unwrap();
        dag.add_edge('a', 'b', 2).unwrap();
        dag.add_edge('a', 'c', 3).unwrap();
        dag.add_edge('b', 'd', 4).unwrap();
        dag.add_edge('c', 'd', 5).unwrap();
        dag
    }

    #[test]
    fn test_inclusive_extraction() {
        let sub = sample().descendant_subgraph(['a']);
        assert_eq!(sub.node_count(), 4);
        assert_eq!(sub.edge_count(), 4);
        assert!(!sub.has_node('r'));
        assert_eq!(sub.get_edge('c', 'd'), Some(&5));
    }

    #[test]
    fn test_exclusive_extraction() {
        let sub = sample().induced_subgraph(['a', 'b', 'd']);
        assert_eq!(sub.node_count(), 3);
        assert!(sub.has_edge('a', 'b'));
        assert!(sub.has_edge('b', 'd'));
        assert!(!sub.has_edge('a', 'd'), "no edge is invented across c");
        assert_eq!(sub.edge_count(), 2);
    }

    #[test]
    fn test_reversed_extraction() {
        let sub = SubgraphExtractor::new(['b'], true)
            .reversed(true)
            .extract(&sample());
        let mut nodes: Vec<char> = sub.nodes().collect();
        nodes.sort();
        assert_eq!(nodes, vec!['a', 'b', 'r']);
        assert!(sub.has_edge('r', 'a'));
    }
}
