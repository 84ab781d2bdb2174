//! Hook-driven depth-first traversal.
//!
//! Every algorithm in this crate walks the graph through [`Traversal::run`].
//! The walk is depth-first and calls back into a [`Visitor`] around each
//! node and each edge it crosses. Hooks returning `false` prune: a rejected
//! node is not descended into and gets no `after_node`, a rejected edge is
//! not crossed and gets no `after_edge`.
//!
//! The walker keeps its own frame stack instead of recursing, so deep
//! graphs cannot overflow the call stack. Hook order is the same as a
//! recursive walk:
//!
//! ```text
//! before_node(n)
//!   for each edge e of n:
//!     before_edge(e) -> visit(other end of e) -> after_edge(e)
//! after_node(n)
//! ```

use crate::dag::Dag;
use petgraph::graphmap::NodeTrait;
use std::collections::HashSet;
use tracing::debug;

/// One element of the current traversal path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathStep<'g, N, E> {
    Node(N),
    Edge { parent: N, child: N, payload: &'g E },
}

impl<'g, N: Copy, E> PathStep<'g, N, E> {
    /// The node of a `Node` step.
    pub fn node(&self) -> Option<N> {
        match self {
            PathStep::Node(n) => Some(*n),
            PathStep::Edge { .. } => None,
        }
    }
}

/// Number of edges on a path, i.e. the depth of whatever is visited next.
pub fn path_depth<N, E>(path: &[PathStep<'_, N, E>]) -> usize {
    path.iter()
        .filter(|step| matches!(step, PathStep::Edge { .. }))
        .count()
}

/// Callbacks invoked by [`Traversal::run`].
///
/// `path` holds the alternating nodes and edges from the start node up to,
/// but not including, the node or edge being reported. Edges are always
/// reported in stored orientation, `parent -> child`, even when walking
/// in reverse.
pub trait Visitor<N, E> {
    /// Returning `false` aborts the traversal before anything is visited.
    fn before_traverse(&mut self, _dag: &Dag<N, E>) -> bool {
        true
    }

    fn after_traverse(&mut self, _dag: &Dag<N, E>) {}

    /// Returning `false` skips the node's edges and its `after_node`.
    fn before_node(&mut self, _dag: &Dag<N, E>, _node: N, _path: &[PathStep<'_, N, E>]) -> bool {
        true
    }

    fn after_node(&mut self, _dag: &Dag<N, E>, _node: N, _path: &[PathStep<'_, N, E>]) {}

    /// Returning `false` leaves the edge uncrossed.
    fn before_edge(
        &mut self,
        _dag: &Dag<N, E>,
        _parent: N,
        _child: N,
        _payload: &E,
        _path: &[PathStep<'_, N, E>],
    ) -> bool {
        true
    }

    fn after_edge(
        &mut self,
        _dag: &Dag<N, E>,
        _parent: N,
        _child: N,
        _payload: &E,
        _path: &[PathStep<'_, N, E>],
    ) {
    }
}

/// Traversal settings.
///
/// By default the walk starts at every root, follows outgoing edges and
/// visits each node once.
#[derive(Debug, Clone)]
pub struct Traversal<N> {
    start_nodes: Option<Vec<N>>,
    reversed: bool,
    all_paths: bool,
}

impl<N: NodeTrait> Default for Traversal<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N: NodeTrait> Traversal<N> {
    pub fn new() -> Self {
        Self {
            start_nodes: None,
            reversed: false,
            all_paths: false,
        }
    }

    /// Starts from the given nodes instead of the roots (or leaves).
    pub fn from_nodes<I: IntoIterator<Item = N>>(nodes: I) -> Self {
        Self {
            start_nodes: Some(nodes.into_iter().collect()),
            ..Self::new()
        }
    }

    /// Walks incoming edges, starting from the leaves by default.
    pub fn reversed(mut self, reversed: bool) -> Self {
        self.reversed = reversed;
        self
    }

    /// Visits a node once per path reaching it rather than once overall.
    ///
    /// A node already on the current path is never entered again, so the
    /// walk terminates on cyclic graphs.
    pub fn all_paths(mut self, all_paths: bool) -> Self {
        self.all_paths = all_paths;
        self
    }

    pub fn is_reversed(&self) -> bool {
        self.reversed
    }

    /// Runs the traversal, reporting to `visitor`.
    pub fn run<E, V: Visitor<N, E>>(&self, dag: &Dag<N, E>, visitor: &mut V) {
        if !visitor.before_traverse(dag) {
            debug!("Traversal aborted by before_traverse");
            return;
        }

        let starts: Vec<N> = match &self.start_nodes {
            Some(nodes) => nodes.clone(),
            None if self.reversed => dag.leaves().collect(),
            None => dag.roots().collect(),
        };

        let mut walk = Walk {
            dag,
            visitor: &mut *visitor,
            reversed: self.reversed,
            all_paths: self.all_paths,
            visited: HashSet::new(),
            on_path: HashSet::new(),
            path: Vec::new(),
            stack: Vec::new(),
        };

        for start in starts {
            if !dag.has_node(start) {
                debug!("Skipping start node that is not in the graph");
                continue;
            }
            walk.run_from(start);
        }

        visitor.after_traverse(dag);
    }
}

/// A node whose edges are being walked.
struct Frame<'g, N, E> {
    node: N,
    edges: Vec<(N, N, &'g E)>,
    next: usize,
    /// The edge whose far end is currently being visited.
    crossing: Option<(N, N, &'g E)>,
}

/// Mutable state of one traversal.
struct Walk<'g, 'v, N, E, V> {
    dag: &'g Dag<N, E>,
    visitor: &'v mut V,
    reversed: bool,
    all_paths: bool,
    visited: HashSet<N>,
    on_path: HashSet<N>,
    path: Vec<PathStep<'g, N, E>>,
    stack: Vec<Frame<'g, N, E>>,
}

impl<'g, 'v, N: NodeTrait, E, V: Visitor<N, E>> Walk<'g, 'v, N, E, V> {
    fn run_from(&mut self, start: N) {
        self.enter(start);

        while let Some(frame) = self.stack.last_mut() {
            if let Some((parent, child, payload)) = frame.crossing.take() {
                self.path.pop();
                self.visitor
                    .after_edge(self.dag, parent, child, payload, &self.path);
                continue;
            }

            let next_edge = frame.edges.get(frame.next).copied();
            match next_edge {
                Some((parent, child, payload)) => {
                    frame.next += 1;
                    if !self
                        .visitor
                        .before_edge(self.dag, parent, child, payload, &self.path)
                    {
                        continue;
                    }
                    if let Some(frame) = self.stack.last_mut() {
                        frame.crossing = Some((parent, child, payload));
                    }
                    self.path.push(PathStep::Edge {
                        parent,
                        child,
                        payload,
                    });
                    self.enter(if self.reversed { parent } else { child });
                }
                None => {
                    let node = frame.node;
                    self.stack.pop();
                    self.path.pop();
                    self.on_path.remove(&node);
                    self.visitor.after_node(self.dag, node, &self.path);
                }
            }
        }
    }

    /// Reports `node` and, unless pruned, pushes a frame for its edges.
    fn enter(&mut self, node: N) {
        if !self.all_paths && !self.visited.insert(node) {
            return;
        }
        if !self.visitor.before_node(self.dag, node, &self.path) {
            return;
        }
        if self.on_path.contains(&node) {
            return;
        }

        let dag = self.dag;
        let edges: Vec<(N, N, &'g E)> = if self.reversed {
            dag.in_edges(node).map(|(p, e)| (p, node, e)).collect()
        } else {
            dag.out_edges(node).map(|(c, e)| (node, c, e)).collect()
        };

        self.on_path.insert(node);
        self.path.push(PathStep::Node(node));
        self.stack.push(Frame {
            node,
            edges,
            next: 0,
            crossing: None,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Records every hook call as a string.
    #[derive(Default)]
    struct Recorder {
        events: Vec<String>,
        prune_node: Option<&'static str>,
        skip_edge: Option<(&'static str, &'static str)>,
        abort: bool,
    }

    impl Visitor<&'static str, ()> for Recorder {
        fn before_traverse(&mut self, _dag: &Dag<&'static str, ()>) -> bool {
            self.events.push("begin".to_string());
            !self.abort
        }

        fn after_traverse(&mut self, _dag: &Dag<&'static str, ()>) {
            self.events.push("end".to_string());
        }

        fn before_node(
            &mut self,
            _dag: &Dag<&'static str, ()>,
            node: &'static str,
            path: &[PathStep<'_, &'static str, ()>],
        ) -> bool {
            self.events.push(format!("+{}@{}", node, path.len()));
            self.prune_node != Some(node)
        }

        fn after_node(
            &mut self,
            _dag: &Dag<&'static str, ()>,
            node: &'static str,
            path: &[PathStep<'_, &'static str, ()>],
        ) {
            self.events.push(format!("-{}@{}", node, path.len()));
        }

        fn before_edge(
            &mut self,
            _dag: &Dag<&'static str, ()>,
            parent: &'static str,
            child: &'static str,
            _payload: &(),
            _path: &[PathStep<'_, &'static str, ()>],
        ) -> bool {
            self.skip_edge != Some((parent, child))
        }

        fn after_edge(
            &mut self,
            _dag: &Dag<&'static str, ()>,
            parent: &'static str,
            child: &'static str,
            _payload: &(),
            _path: &[PathStep<'_, &'static str, ()>],
        ) {
            self.events.push(format!("{}>{}", parent, child));
        }
    }

    fn diamond() -> Dag<&'static str, ()> {
        let mut dag = Dag::new();
        dag.add_edge("a", "b", ()).unwrap();
        dag.add_edge("a", "c", ()).unwrap();
        dag.add_edge("b", "d", ()).unwrap();
        dag.add_edge("c", "d", ()).unwrap();
        dag
    }

    #[test]
    fn test_single_visit_order() {
        let mut recorder = Recorder::default();
        Traversal::new().run(&diamond(), &mut recorder);

        assert_eq!(
            recorder.events,
            vec![
                "begin", "+a@0", "+b@2", "+d@4", "-d@4", "b>d", "-b@2", "a>b", "+c@2",
                "c>d", "-c@2", "a>c", "-a@0", "end"
            ]
        );
    }

    #[test]
    fn test_all_paths_revisits_shared_nodes() {
        let mut recorder = Recorder::default();
        Traversal::new().all_paths(true).run(&diamond(), &mut recorder);

        let d_visits = recorder.events.iter().filter(|e| *e == "+d@4").count();
        assert_eq!(d_visits, 2);
    }

    #[test]
    fn test_reversed_starts_at_leaves() {
        let mut recorder = Recorder::default();
        Traversal::new().reversed(true).run(&diamond(), &mut recorder);

        assert_eq!(recorder.events[1], "+d@0");
        assert!(recorder.events.contains(&"a>b".to_string()));
        assert!(recorder.events.contains(&"-a@4".to_string()));
    }

    #[test]
    fn test_pruned_node_has_no_after_hook() {
        let mut recorder = Recorder {
            prune_node: Some("b"),
            ..Recorder::default()
        };
        Traversal::new().run(&diamond(), &mut recorder);

        assert!(!recorder.events.contains(&"-b@2".to_string()));
        assert!(
            recorder.events.contains(&"a>b".to_string()),
            "the edge into a pruned node still completes"
        );
        assert!(recorder.events.contains(&"+d@4".to_string()), "d reached via c");
    }

    #[test]
    fn test_skipped_edge_is_not_crossed() {
        let mut recorder = Recorder {
            skip_edge: Some(("a", "b")),
            ..Recorder::default()
        };
        Traversal::new().run(&diamond(), &mut recorder);

        assert!(!recorder.events.iter().any(|e| e.starts_with("+b")));
        assert!(!recorder.events.contains(&"a>b".to_string()));
    }

    #[test]
    fn test_abort_before_traverse() {
        let mut recorder = Recorder {
            abort: true,
            ..Recorder::default()
        };
        Traversal::new().run(&diamond(), &mut recorder);
        assert_eq!(recorder.events, vec!["begin"]);
    }

    #[test]
    fn test_all_paths_terminates_on_cycle() {
        let mut dag = Dag::new();
        dag.add_edge_unchecked("a", "b", ());
        dag.add_edge_unchecked("b", "a", ());

        let mut recorder = Recorder::default();
        Traversal::from_nodes(["a"])
            .all_paths(true)
            .run(&dag, &mut recorder);

        assert_eq!(recorder.events.iter().filter(|e| e.starts_with("+a")).count(), 2);
        assert_eq!(recorder.events.iter().filter(|e| e.starts_with("-a")).count(), 1);
    }

    #[test]
    fn test_unknown_start_node_is_skipped() {
        let mut recorder = Recorder::default();
        Traversal::from_nodes(["zz"]).run(&diamond(), &mut recorder);
        assert_eq!(recorder.events, vec!["begin", "end"]);
    }
}
