//! Cycle detection.
//!
//! [`CycleChecker`] walks every path (not just every node) and remembers
//! where each node sits on the current path. Meeting a node that is already
//! on the path means the stretch of path from its earlier position to the
//! end is a cycle; every node on that stretch is recorded and the walk
//! backs off instead of looping.

use crate::dag::Dag;
use crate::traverse::{PathStep, Traversal, Visitor};
use petgraph::graphmap::NodeTrait;
use std::collections::{BTreeSet, HashMap, HashSet};
use tracing::{debug, warn};

/// Collects the nodes that lie on at least one cycle.
#[derive(Debug)]
pub struct CycleChecker<N> {
    /// Index in the current path of each node on it.
    positions: HashMap<N, usize>,
    seen: HashSet<N>,
    cyclic: BTreeSet<N>,
}

impl<N: NodeTrait> Default for CycleChecker<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N: NodeTrait> CycleChecker<N> {
    pub fn new() -> Self {
        Self {
            positions: HashMap::new(),
            seen: HashSet::new(),
            cyclic: BTreeSet::new(),
        }
    }

    /// Checks every path of `dag`.
    ///
    /// Starts at the roots, then again at any node still unseen, so cycles
    /// with no root above them are found too.
    pub fn find_cycles<E>(mut self, dag: &Dag<N, E>) -> BTreeSet<N> {
        Traversal::new().all_paths(true).run(dag, &mut self);

        let unseen: Vec<N> = dag.nodes().filter(|n| !self.seen.contains(n)).collect();
        for node in unseen {
            if !self.seen.contains(&node) {
                Traversal::from_nodes([node])
                    .all_paths(true)
                    .run(dag, &mut self);
            }
        }

        self.cyclic
    }
}

impl<N: NodeTrait, E> Visitor<N, E> for CycleChecker<N> {
    fn before_node(&mut self, _dag: &Dag<N, E>, node: N, path: &[PathStep<'_, N, E>]) -> bool {
        self.seen.insert(node);
        if let Some(&start) = self.positions.get(&node) {
            self.cyclic
                .extend(path[start..].iter().filter_map(PathStep::node));
            return false;
        }
        self.positions.insert(node, path.len());
        true
    }

    fn after_node(&mut self, _dag: &Dag<N, E>, node: N, _path: &[PathStep<'_, N, E>]) {
        self.positions.remove(&node);
    }
}

impl<N: NodeTrait, E: Clone> Dag<N, E> {
    /// Returns every node that lies on a cycle; empty means acyclic.
    ///
    /// Nodes without parents or without children cannot be on a cycle, so
    /// they are peeled off a copy of the graph until none remain. Only the
    /// leftover core is searched path by path.
    pub fn check_cycles(&self) -> BTreeSet<N> {
        let mut core = self.clone();
        loop {
            let peel: Vec<N> = core
                .nodes()
                .filter(|&n| core.is_root(n) || core.is_leaf(n))
                .collect();
            if peel.is_empty() {
                break;
            }
            for node in peel {
                if core.remove_node(node).is_err() {
                    debug!("Peeled node was already gone");
                }
            }
        }

        if core.node_count() == 0 {
            debug!("Graph of {} nodes is acyclic", self.node_count());
            return BTreeSet::new();
        }

        let cyclic = CycleChecker::new().find_cycles(&core);
        warn!(
            "Found {} nodes on cycles (core of {} nodes)",
            cyclic.len(),
            core.node_count()
        );
        cyclic
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> Dag<char, ()> {
        let mut dag = Dag::new();
        dag.add_edge_unchecked('a', 'b', ());
        dag.add_edge_unchecked('b', 'c', ());
        dag.add_edge_unchecked('c', 'a', ());
        dag
    }

    fn set(nodes: &str) -> BTreeSet<char> {
        nodes.chars().collect()
    }

    #[test]
    fn test_rootless_cycle() {
        let mut dag = triangle();
        assert_eq!(dag.check_cycles(), set("abc"));

        dag.remove_edge('c', 'a').unwrap();
        assert!(dag.check_cycles().is_empty());
    }

    #[test]
    fn test_checker_without_peeling() {
        assert_eq!(CycleChecker::new().find_cycles(&triangle()), set("abc"));
    }

    #[test]
    fn test_cycle_below_acyclic_prefix() {
        let mut dag = triangle();
        dag.add_edge_unchecked('r', 'a', ());
        dag.add_edge_unchecked('c', 'x', ());
        assert_eq!(dag.check_cycles(), set("abc"));
        assert_eq!(CycleChecker::new().find_cycles(&dag), set("abc"));
    }

    #[test]
    fn test_cycle_reached_through_finished_node() {
        // a -> b -> a and a -> c -> b; every node is on some cycle.
        let mut dag = Dag::new();
        dag.add_edge_unchecked('a', 'b', ());
        dag.add_edge_unchecked('b', 'a', ());
        dag.add_edge_unchecked('a', 'c', ());
        dag.add_edge_unchecked('c', 'b', ());
        assert_eq!(dag.check_cycles(), set("abc"));
    }

    #[test]
    fn test_self_loop() {
        let mut dag = Dag::new();
        dag.add_edge_unchecked('a', 'a', ());
        dag.add_edge_unchecked('a', 'b', ());
        assert_eq!(dag.check_cycles(), set("a"));
    }

    #[test]
    fn test_diamond_is_acyclic_and_repeatable() {
        let mut dag = Dag::new();
        dag.add_edge('a', 'b', ()).unwrap();
        dag.add_edge('a', 'c', ()).unwrap();
        dag.add_edge('b', 'd', ()).unwrap();
        dag.add_edge('c', 'd', ()).unwrap();

        assert!(dag.check_cycles().is_empty());
        assert!(CycleChecker::new().find_cycles(&dag).is_empty());
        assert_eq!(dag.check_cycles(), dag.check_cycles());
    }

    #[test]
    fn test_two_disjoint_cycles() {
        let mut dag = triangle();
        dag.add_edge_unchecked('x', 'y', ());
        dag.add_edge_unchecked('y', 'x', ());
        assert_eq!(dag.check_cycles(), set("abcxy"));
    }
}
