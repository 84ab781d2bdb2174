//! Core graph data structure.
//!
//! `Dag` wraps petgraph's `DiGraphMap`, which keys nodes by value and keeps
//! a per-node adjacency list of outgoing and incoming neighbours. An edge is
//! identified by its ordered `(parent, child)` pair; adding the same pair
//! again replaces the payload instead of creating a parallel edge.
//!
//! Acyclicity is not enforced by storage. [`Dag::add_edge`] refuses edges
//! that would close a cycle, [`Dag::add_edge_unchecked`] does not, and
//! [`Dag::check_cycles`](crate::cycles) finds cycles after the fact.
//!
//! A `Dag` is not synchronized. Share it across threads only behind your own
//! lock.

use crate::error::GraphError;
use petgraph::graphmap::{DiGraphMap, NodeTrait};
use petgraph::Direction;
use std::collections::HashSet;
use std::fmt;

/// A directed graph of copyable node identities with edge payloads.
#[derive(Clone)]
pub struct Dag<N, E> {
    graph: DiGraphMap<N, E>,
}

impl<N: NodeTrait + fmt::Debug, E: fmt::Debug> fmt::Debug for Dag<N, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dag").field("graph", &self.graph).finish()
    }
}

impl<N: NodeTrait, E> Default for Dag<N, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N: NodeTrait, E> Dag<N, E> {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self {
            graph: DiGraphMap::new(),
        }
    }

    /// Adds a node. Adding a node that is already present does nothing.
    pub fn add_node(&mut self, node: N) {
        self.graph.add_node(node);
    }

    /// Removes a node together with every edge touching it.
    pub fn remove_node(&mut self, node: N) -> Result<(), GraphError<N>> {
        if self.graph.remove_node(node) {
            Ok(())
        } else {
            Err(GraphError::NodeNotFound(node))
        }
    }

    /// Adds `parent -> child`, refusing edges that would close a cycle.
    ///
    /// Missing endpoints are added. On `Cycle` the graph is untouched.
    pub fn add_edge(&mut self, parent: N, child: N, payload: E) -> Result<(), GraphError<N>> {
        if parent == child || self.is_descendant(parent, child) {
            return Err(GraphError::Cycle { parent, child });
        }
        self.add_edge_unchecked(parent, child, payload);
        Ok(())
    }

    /// Adds `parent -> child` without looking for cycles.
    ///
    /// Returns the payload previously stored for the pair, if any.
    pub fn add_edge_unchecked(&mut self, parent: N, child: N, payload: E) -> Option<E> {
        self.graph.add_edge(parent, child, payload)
    }

    /// Removes `parent -> child` and returns its payload.
    pub fn remove_edge(&mut self, parent: N, child: N) -> Result<E, GraphError<N>> {
        self.graph
            .remove_edge(parent, child)
            .ok_or(GraphError::EdgeNotFound { parent, child })
    }

    pub fn has_node(&self, node: N) -> bool {
        self.graph.contains_node(node)
    }

    pub fn has_edge(&self, parent: N, child: N) -> bool {
        self.graph.contains_edge(parent, child)
    }

    /// Returns the payload of `parent -> child`.
    pub fn get_edge(&self, parent: N, child: N) -> Option<&E> {
        self.graph.edge_weight(parent, child)
    }

    /// True if the node is present and has no incoming edges.
    pub fn is_root(&self, node: N) -> bool {
        self.has_node(node)
            && self
                .graph
                .neighbors_directed(node, Direction::Incoming)
                .next()
                .is_none()
    }

    /// True if the node is present and has no outgoing edges.
    pub fn is_leaf(&self, node: N) -> bool {
        self.has_node(node)
            && self
                .graph
                .neighbors_directed(node, Direction::Outgoing)
                .next()
                .is_none()
    }

    /// True if `child` is a direct child of `parent`.
    pub fn is_child(&self, child: N, parent: N) -> bool {
        self.has_edge(parent, child)
    }

    /// True if `parent` is a direct parent of `child`.
    pub fn is_parent(&self, parent: N, child: N) -> bool {
        self.has_edge(parent, child)
    }

    /// True if `node` can be reached from `of` along outgoing edges.
    pub fn is_descendant(&self, node: N, of: N) -> bool {
        self.reaches(of, node, Direction::Outgoing)
    }

    /// True if `node` can be reached from `of` along incoming edges.
    pub fn is_ancestor(&self, node: N, of: N) -> bool {
        self.reaches(of, node, Direction::Incoming)
    }

    /// Depth-first reachability that terminates on cyclic input too.
    fn reaches(&self, from: N, to: N, direction: Direction) -> bool {
        let mut seen = HashSet::new();
        let mut stack: Vec<N> = self.graph.neighbors_directed(from, direction).collect();

        while let Some(current) = stack.pop() {
            if current == to {
                return true;
            }
            if seen.insert(current) {
                stack.extend(self.graph.neighbors_directed(current, direction));
            }
        }

        false
    }

    /// Returns the number of nodes.
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Returns the number of edges.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Iterates over all nodes.
    pub fn nodes(&self) -> impl Iterator<Item = N> + '_ {
        self.graph.nodes()
    }

    /// Iterates over nodes without parents.
    pub fn roots(&self) -> impl Iterator<Item = N> + '_ {
        self.nodes().filter(move |&n| self.is_root(n))
    }

    /// Iterates over nodes without children.
    pub fn leaves(&self) -> impl Iterator<Item = N> + '_ {
        self.nodes().filter(move |&n| self.is_leaf(n))
    }

    /// Direct parents of a node.
    pub fn parents(&self, node: N) -> impl Iterator<Item = N> + '_ {
        self.graph.neighbors_directed(node, Direction::Incoming)
    }

    /// Direct children of a node.
    pub fn children(&self, node: N) -> impl Iterator<Item = N> + '_ {
        self.graph.neighbors_directed(node, Direction::Outgoing)
    }

    /// Incoming edges of a node as `(parent, payload)`.
    pub fn in_edges(&self, node: N) -> impl Iterator<Item = (N, &E)> + '_ {
        self.parents(node)
            .filter_map(move |p| self.graph.edge_weight(p, node).map(|e| (p, e)))
    }

    /// Outgoing edges of a node as `(child, payload)`.
    pub fn out_edges(&self, node: N) -> impl Iterator<Item = (N, &E)> + '_ {
        self.children(node)
            .filter_map(move |c| self.graph.edge_weight(node, c).map(|e| (c, e)))
    }

    /// Every edge as `(parent, child, payload)`.
    pub fn edges(&self) -> impl Iterator<Item = (N, N, &E)> + '_ {
        self.graph.all_edges()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diamond() -> Dag<&'static str, &'static str> {
        let mut dag = Dag::new();
        dag.add_edge("a", "b", "is_a").unwrap();
        dag.add_edge("a", "c", "is_a").unwrap();
        dag.add_edge("b", "d", "is_a").unwrap();
        dag.add_edge("c", "d", "part_of").unwrap();
        dag
    }

    #[test]
    fn test_add_node_is_idempotent() {
        let mut dag: Dag<u32, ()> = Dag::new();
        dag.add_node(1);
        assert!(dag.has_node(1));
        dag.add_node(1);
        assert_eq!(dag.node_count(), 1);
    }

    #[test]
    fn test_add_edge_overwrites_payload() {
        let mut dag = Dag::new();
        dag.add_edge("p", "c", 1).unwrap();
        assert_eq!(dag.get_edge("p", "c"), Some(&1));

        dag.add_edge("p", "c", 2).unwrap();
        assert_eq!(dag.get_edge("p", "c"), Some(&2));
        assert_eq!(dag.edge_count(), 1);
        assert_eq!(dag.node_count(), 2, "endpoints are added on demand");
    }

    #[test]
    fn test_adjacency_stays_symmetric() {
        let dag = diamond();
        for (parent, child, payload) in dag.edges() {
            assert!(dag.out_edges(parent).any(|(c, p)| c == child && p == payload));
            assert!(dag.in_edges(child).any(|(p, e)| p == parent && e == payload));
        }
    }

    #[test]
    fn test_remove_node_drops_incident_edges() {
        let mut dag = diamond();
        dag.add_edge("d", "e", "is_a").unwrap();
        assert_eq!(dag.edge_count(), 5);

        // d has two parents and one child.
        dag.remove_node("d").unwrap();
        assert_eq!(dag.edge_count(), 2);
        assert!(!dag.has_node("d"));
        assert!(dag.is_leaf("b"));
        assert!(dag.is_root("e"));
    }

    #[test]
    fn test_remove_missing() {
        let mut dag = diamond();
        assert_eq!(dag.remove_node("z"), Err(GraphError::NodeNotFound("z")));
        assert_eq!(
            dag.remove_edge("b", "c"),
            Err(GraphError::EdgeNotFound {
                parent: "b",
                child: "c"
            })
        );
        assert_eq!(dag.remove_edge("c", "d"), Ok("part_of"));
        assert!(!dag.has_edge("c", "d"));
    }

    #[test]
    fn test_cycle_prevention_leaves_graph_unchanged() {
        let mut dag = Dag::new();
        dag.add_edge("a", "b", ()).unwrap();
        dag.add_edge("b", "c", ()).unwrap();

        let err = dag.add_edge("c", "a", ()).unwrap_err();
        assert_eq!(
            err,
            GraphError::Cycle {
                parent: "c",
                child: "a"
            }
        );
        assert_eq!(
            dag.add_edge("b", "a", ()).unwrap_err(),
            GraphError::Cycle {
                parent: "b",
                child: "a"
            }
        );
        assert!(dag.add_edge("x", "x", ()).is_err());
        assert_eq!(dag.edge_count(), 2);
        assert_eq!(dag.node_count(), 3);
    }

    #[test]
    fn test_root_and_leaf() {
        let mut dag = Dag::new();
        dag.add_node("solo");
        assert!(dag.is_root("solo"));
        assert!(dag.is_leaf("solo"));

        dag.add_edge("solo", "kid", ()).unwrap();
        assert!(dag.is_root("solo"));
        assert!(!dag.is_leaf("solo"));
    }

    #[test]
    fn test_missing_node_is_neither_root_nor_leaf() {
        let mut dag: Dag<&str, ()> = Dag::new();
        assert!(!dag.is_root("ghost"));
        assert!(!dag.is_leaf("ghost"));

        dag.add_node("ghost");
        dag.remove_node("ghost").unwrap();
        assert!(!dag.is_root("ghost"));
        assert!(!dag.is_leaf("ghost"));
    }

    #[test]
    fn test_relationship_predicates() {
        let dag = diamond();
        assert!(dag.is_child("b", "a"));
        assert!(dag.is_parent("a", "b"));
        assert!(!dag.is_child("d", "a"));
        assert!(dag.is_descendant("d", "a"));
        assert!(dag.is_ancestor("a", "d"));
        assert!(!dag.is_descendant("a", "d"));
        assert!(!dag.is_descendant("b", "c"));
    }

    #[test]
    fn test_reachability_terminates_on_cycles() {
        let mut dag = Dag::new();
        dag.add_edge_unchecked("a", "b", ());
        dag.add_edge_unchecked("b", "a", ());
        assert!(dag.is_descendant("a", "a"));
        assert!(!dag.is_descendant("z", "a"));
    }

    #[test]
    fn test_roots_and_leaves() {
        let dag = diamond();
        assert_eq!(dag.roots().collect::<Vec<_>>(), vec!["a"]);
        assert_eq!(dag.leaves().collect::<Vec<_>>(), vec!["d"]);
    }

    #[test]
    fn test_clone_is_independent() {
        let dag = diamond();
        let mut copy = dag.clone();
        copy.remove_edge("a", "b").unwrap();
        copy.add_edge("d", "e", "is_a").unwrap();

        assert!(dag.has_edge("a", "b"));
        assert!(!dag.has_node("e"));
        assert_eq!(dag.edge_count(), 4);
        assert_eq!(copy.edge_count(), 4);
    }
}
