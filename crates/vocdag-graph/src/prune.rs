//! Filter-based pruning.
//!
//! The pruner only records matches while walking. Removal happens once the
//! walk is over: edges first, then nodes, so the structure never changes
//! under the traversal.

use crate::dag::Dag;
use crate::error::GraphError;
use crate::traverse::{PathStep, Traversal, Visitor};
use petgraph::graphmap::NodeTrait;
use tracing::debug;

/// What a prune pass removed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PruneReport {
    pub nodes_removed: usize,
    pub edges_removed: usize,
}

/// Removes nodes and edges matching the given filters.
pub struct SimplePruner<N, NF, EF> {
    node_filter: NF,
    edge_filter: EF,
    nodes: Vec<N>,
    edges: Vec<(N, N)>,
}

impl<N: NodeTrait, NF, EF> SimplePruner<N, NF, EF> {
    /// `node_filter` and `edge_filter` return `true` for what should go.
    pub fn new(node_filter: NF, edge_filter: EF) -> Self {
        Self {
            node_filter,
            edge_filter,
            nodes: Vec::new(),
            edges: Vec::new(),
        }
    }

    /// Prunes everything reachable from the roots.
    pub fn prune<E>(self, dag: &mut Dag<N, E>) -> Result<PruneReport, GraphError<N>>
    where
        Self: Visitor<N, E>,
    {
        self.prune_with(dag, &Traversal::new())
    }

    /// Prunes whatever `traversal` reaches.
    pub fn prune_with<E>(
        mut self,
        dag: &mut Dag<N, E>,
        traversal: &Traversal<N>,
    ) -> Result<PruneReport, GraphError<N>>
    where
        Self: Visitor<N, E>,
    {
        traversal.run(dag, &mut self);

        let mut report = PruneReport::default();
        for (parent, child) in self.edges {
            // An edge can be listed once per path in all-paths mode.
            if dag.has_edge(parent, child) {
                dag.remove_edge(parent, child)?;
                report.edges_removed += 1;
            }
        }
        for node in self.nodes {
            if dag.has_node(node) {
                dag.remove_node(node)?;
                report.nodes_removed += 1;
            }
        }

        debug!(
            "Pruned {} nodes and {} edges",
            report.nodes_removed, report.edges_removed
        );
        Ok(report)
    }
}

impl<N, E, NF, EF> Visitor<N, E> for SimplePruner<N, NF, EF>
where
    N: NodeTrait,
    NF: FnMut(N) -> bool,
    EF: FnMut(N, N, &E) -> bool,
{
    fn before_node(&mut self, _dag: &Dag<N, E>, node: N, _path: &[PathStep<'_, N, E>]) -> bool {
        if (self.node_filter)(node) {
            self.nodes.push(node);
        }
        true
    }

    fn before_edge(
        &mut self,
        _dag: &Dag<N, E>,
        parent: N,
        child: N,
        payload: &E,
        _path: &[PathStep<'_, N, E>],
    ) -> bool {
        if (self.edge_filter)(parent, child, payload) {
            self.edges.push((parent, child));
        }
        true
    }
}

/// Removes every reachable node accepted by `filter`.
pub fn prune_nodes<N, E, F>(dag: &mut Dag<N, E>, filter: F) -> Result<PruneReport, GraphError<N>>
where
    N: NodeTrait,
    F: FnMut(N) -> bool,
{
    SimplePruner::new(filter, |_: N, _: N, _: &E| false).prune(dag)
}

/// Removes every reachable edge accepted by `filter`.
pub fn prune_edges<N, E, F>(dag: &mut Dag<N, E>, filter: F) -> Result<PruneReport, GraphError<N>>
where
    N: NodeTrait,
    F: FnMut(N, N, &E) -> bool,
{
    SimplePruner::new(|_: N| false, filter).prune(dag)
}
