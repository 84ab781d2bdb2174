//! Structural mapping into a new graph.
//!
//! `DagMapper` rebuilds a graph node by node and edge by edge through
//! caller-supplied transforms. Each node and each `(parent, child)` pair is
//! mapped at most once, however many paths reach it.

use crate::dag::Dag;
use crate::traverse::{PathStep, Traversal, Visitor};
use petgraph::graphmap::NodeTrait;
use std::collections::{HashMap, HashSet};

type NodeFilter<'f, N> = Box<dyn FnMut(N) -> bool + 'f>;
type EdgeFilter<'f, N, E> = Box<dyn FnMut(N, N, &E) -> bool + 'f>;

/// Maps a `Dag<N, E>` into a `Dag<M, F>`.
pub struct DagMapper<'f, N, E, M, F> {
    node_map: Box<dyn FnMut(N) -> M + 'f>,
    edge_map: Box<dyn FnMut(N, N, &E) -> F + 'f>,
    node_filter: NodeFilter<'f, N>,
    edge_filter: EdgeFilter<'f, N, E>,
    nodes: HashMap<N, M>,
    mapped_edges: HashSet<(N, N)>,
    result: Dag<M, F>,
}

impl<'f, N, E, M, F> DagMapper<'f, N, E, M, F>
where
    N: NodeTrait,
    M: NodeTrait,
{
    pub fn new(
        node_map: impl FnMut(N) -> M + 'f,
        edge_map: impl FnMut(N, N, &E) -> F + 'f,
    ) -> Self {
        Self {
            node_map: Box::new(node_map),
            edge_map: Box::new(edge_map),
            node_filter: Box::new(|_: N| true),
            edge_filter: Box::new(|_: N, _: N, _: &E| true),
            nodes: HashMap::new(),
            mapped_edges: HashSet::new(),
            result: Dag::new(),
        }
    }

    /// Only nodes accepted by `filter` (and edges between them) are mapped.
    pub fn node_filter(mut self, filter: impl FnMut(N) -> bool + 'f) -> Self {
        self.node_filter = Box::new(filter);
        self
    }

    /// Only edges accepted by `filter` are mapped.
    pub fn edge_filter(mut self, filter: impl FnMut(N, N, &E) -> bool + 'f) -> Self {
        self.edge_filter = Box::new(filter);
        self
    }

    pub fn map(mut self, dag: &Dag<N, E>) -> Dag<M, F> {
        Traversal::new().run(dag, &mut self);
        self.result
    }

    /// Like [`map`](Self::map) but walks with the given settings.
    pub fn map_with(mut self, dag: &Dag<N, E>, traversal: &Traversal<N>) -> Dag<M, F> {
        traversal.run(dag, &mut self);
        self.result
    }
}

impl<'f, N, E, M, F> Visitor<N, E> for DagMapper<'f, N, E, M, F>
where
    N: NodeTrait,
    M: NodeTrait,
{
    fn before_node(&mut self, _dag: &Dag<N, E>, node: N, _path: &[PathStep<'_, N, E>]) -> bool {
        if !self.nodes.contains_key(&node) && (self.node_filter)(node) {
            let mapped = (self.node_map)(node);
            self.result.add_node(mapped);
            self.nodes.insert(node, mapped);
        }
        true
    }

    fn after_edge(
        &mut self,
        _dag: &Dag<N, E>,
        parent: N,
        child: N,
        payload: &E,
        _path: &[PathStep<'_, N, E>],
    ) {
        if self.mapped_edges.contains(&(parent, child)) {
            return;
        }
        let (Some(&from), Some(&to)) = (self.nodes.get(&parent), self.nodes.get(&child)) else {
            return;
        };
        if (self.edge_filter)(parent, child, payload) {
            let mapped = (self.edge_map)(parent, child, payload);
            self.result.add_edge_unchecked(from, to, mapped);
            self.mapped_edges.insert((parent, child));
        }
    }
}
