//! Topological ordering.

use crate::dag::Dag;
use petgraph::graphmap::NodeTrait;
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

impl<N: NodeTrait, E> Dag<N, E> {
    /// Orders nodes so every parent precedes its children.
    ///
    /// Among the nodes whose parents have all been placed, the one with the
    /// smallest `key` goes next, so both roots and siblings come out in key
    /// order. Nodes on a cycle, and everything below one, are left out;
    /// check for cycles first.
    pub fn topological_order<K, F>(&self, mut key: F) -> Vec<N>
    where
        K: Ord,
        F: FnMut(N) -> K,
    {
        let mut in_degree: HashMap<N, usize> = HashMap::with_capacity(self.node_count());
        let mut keys: HashMap<N, K> = HashMap::with_capacity(self.node_count());
        for node in self.nodes() {
            in_degree.insert(node, self.parents(node).count());
            keys.insert(node, key(node));
        }

        let mut ready = BinaryHeap::new();
        for (&node, &degree) in &in_degree {
            if degree == 0 {
                if let Some(k) = keys.remove(&node) {
                    ready.push(Reverse((k, node)));
                }
            }
        }

        let mut order = Vec::with_capacity(in_degree.len());
        while let Some(Reverse((_, node))) = ready.pop() {
            order.push(node);
            for child in self.children(node) {
                let Some(degree) = in_degree.get_mut(&child) else {
                    continue;
                };
                *degree -= 1;
                if *degree == 0 {
                    if let Some(k) = keys.remove(&child) {
                        ready.push(Reverse((k, child)));
                    }
                }
            }
        }
        order
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn position(order: &[char], node: char) -> usize {
        order.iter().position(|&n| n == node).unwrap()
    }

    #[test]
    fn test_parents_before_children() {
        let mut dag = Dag::new();
        dag.add_edge('a', 'b', ()).unwrap();
        dag.add_edge('a', 'c', ()).unwrap();
        dag.add_edge('b', 'd', ()).unwrap();
        dag.add_edge('c', 'd', ()).unwrap();
        dag.add_edge('x', 'c', ()).unwrap();

        let order = dag.topological_order(|n| n);
        assert_eq!(order.len(), 5);
        for (parent, child, _) in dag.edges() {
            assert!(position(&order, parent) < position(&order, child));
        }
        assert_eq!(order[0], 'a', "roots come in key order");
    }

    #[test]
    fn test_is_stable() {
        let mut dag = Dag::new();
        for child in ['m', 'k', 'z'] {
            dag.add_edge('r', child, ()).unwrap();
        }
        assert_eq!(dag.topological_order(|n| n), dag.topological_order(|n| n));
    }

    #[test]
    fn test_siblings_in_key_order() {
        let mut dag = Dag::new();
        for child in ['m', 'k', 'z'] {
            dag.add_edge('r', child, ()).unwrap();
        }
        dag.add_edge('k', 'a', ()).unwrap();
        assert_eq!(dag.topological_order(|n| n), vec!['r', 'k', 'a', 'm', 'z']);
    }

    #[test]
    fn test_cycle_is_left_out() {
        let mut dag = Dag::new();
        dag.add_edge('r', 'a', ()).unwrap();
        dag.add_edge_unchecked('a', 'b', ());
        dag.add_edge_unchecked('b', 'a', ());
        dag.add_edge_unchecked('b', 'c', ());
        assert_eq!(dag.topological_order(|n| n), vec!['r']);
    }
}
