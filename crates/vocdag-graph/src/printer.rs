//! Indented text dump of a traversal, for diagnostics.

use crate::dag::Dag;
use crate::traverse::{path_depth, PathStep, Traversal, Visitor};
use petgraph::graphmap::NodeTrait;
use std::collections::HashSet;
use std::fmt::Debug;

/// Writes one line per visited node, indented by depth.
///
/// A node reached over an edge is prefixed with the edge's label:
///
/// ```text
/// a
///   [is_a] b
///     [is_a] d
///   [part_of] c
/// ```
///
/// With [`collapse_repeats`](SimplePrinter::collapse_repeats), a node that
/// was already printed is written once more with a trailing `...` and not
/// expanded again, so the output has one line per node plus one per edge.
pub struct SimplePrinter<'f, N, E> {
    node_label: Box<dyn Fn(N) -> String + 'f>,
    edge_label: Box<dyn Fn(&E) -> String + 'f>,
    collapse_repeats: bool,
    reversed: bool,
    printed: HashSet<N>,
    lines: Vec<String>,
}

impl<'f, N: NodeTrait + Debug, E: Debug> SimplePrinter<'f, N, E> {
    /// Labels nodes and edges with their `Debug` output.
    pub fn debug() -> Self {
        Self::new(|n: N| format!("{:?}", n), |e: &E| format!("{:?}", e))
    }
}

impl<'f, N: NodeTrait, E> SimplePrinter<'f, N, E> {
    pub fn new(
        node_label: impl Fn(N) -> String + 'f,
        edge_label: impl Fn(&E) -> String + 'f,
    ) -> Self {
        Self {
            node_label: Box::new(node_label),
            edge_label: Box::new(edge_label),
            collapse_repeats: false,
            reversed: false,
            printed: HashSet::new(),
            lines: Vec::new(),
        }
    }

    /// Prints edges into already printed nodes as `[edge] node ...` leaves.
    pub fn collapse_repeats(mut self, collapse: bool) -> Self {
        self.collapse_repeats = collapse;
        self
    }

    /// Renders the walk described by `traversal`.
    pub fn render(mut self, dag: &Dag<N, E>, traversal: &Traversal<N>) -> String {
        self.reversed = traversal.is_reversed();
        traversal.run(dag, &mut self);
        self.lines.join("\n")
    }
}

impl<'f, N: NodeTrait, E> Visitor<N, E> for SimplePrinter<'f, N, E> {
    fn before_node(&mut self, _dag: &Dag<N, E>, node: N, path: &[PathStep<'_, N, E>]) -> bool {
        let indent = "  ".repeat(path_depth(path));
        let line = match path.last() {
            Some(PathStep::Edge { payload, .. }) => {
                format!("{}[{}] {}", indent, (self.edge_label)(payload), (self.node_label)(node))
            }
            _ => format!("{}{}", indent, (self.node_label)(node)),
        };
        self.lines.push(line);
        self.printed.insert(node);
        true
    }

    fn before_edge(
        &mut self,
        _dag: &Dag<N, E>,
        parent: N,
        child: N,
        payload: &E,
        path: &[PathStep<'_, N, E>],
    ) -> bool {
        let next = if self.reversed { parent } else { child };
        if !self.collapse_repeats || !self.printed.contains(&next) {
            return true;
        }
        self.lines.push(format!(
            "{}[{}] {} ...",
            "  ".repeat(path_depth(path) + 1),
            (self.edge_label)(payload),
            (self.node_label)(next)
        ));
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_tree() {
        let mut dag = Dag::new();
        dag.add_edge('a', 'b', "is_a").unwrap();
        dag.add_edge('a', 'c', "part_of").unwrap();
        dag.add_edge('b', 'd', "is_a").unwrap();
        dag.add_edge('c', 'd', "is_a").unwrap();

        let text = SimplePrinter::new(|n: char| n.to_string(), |e: &&str| e.to_string())
            .render(&dag, &Traversal::new().all_paths(true));

        assert_eq!(
            text,
            "a\n  [is_a] b\n    [is_a] d\n  [part_of] c\n    [is_a] d"
        );
    }

    #[test]
    fn test_collapsed_repeats() {
        let mut dag = Dag::new();
        dag.add_edge('a', 'b', "is_a").unwrap();
        dag.add_edge('a', 'c', "part_of").unwrap();
        dag.add_edge('b', 'd', "is_a").unwrap();
        dag.add_edge('c', 'd', "is_a").unwrap();

        let text = SimplePrinter::new(|n: char| n.to_string(), |e: &&str| e.to_string())
            .collapse_repeats(true)
            .render(&dag, &Traversal::new());

        assert_eq!(
            text,
            "a\n  [is_a] b\n    [is_a] d\n  [part_of] c\n    [is_a] d ..."
        );
    }

    #[test]
    fn test_debug_labels() {
        let mut dag: Dag<u8, ()> = Dag::new();
        dag.add_edge(1, 2, ()).unwrap();
        let text = SimplePrinter::debug().render(&dag, &Traversal::new());
        assert_eq!(text, "1\n  [()] 2");
    }
}
