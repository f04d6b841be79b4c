//! Directed adjacency-list graph with breadth- and depth-first traversal.

use std::collections::{HashMap, HashSet, VecDeque};
use std::hash::Hash;

use tracing::debug;

/// A directed multigraph stored as adjacency lists.
///
/// Parallel edges and self-loops are kept. Neighbors are expanded in the order their edges were
/// added, which makes both traversals deterministic.
///
/// # Examples
///
/// ```
/// use catalog_index::AdjacencyIndex;
///
/// let mut graph = AdjacencyIndex::new();
/// for (u, v) in [(0, 1), (0, 2), (1, 2), (2, 0), (2, 3), (3, 3)] {
///     graph.add_edge(u, v);
/// }
///
/// assert_eq!(graph.bfs(2), [2, 0, 3, 1]);
/// assert_eq!(graph.dfs(2), [2, 0, 1, 3]);
/// ```
#[derive(Clone, Debug)]
pub struct AdjacencyIndex<N> {
    adjacency: HashMap<N, Vec<N>>,
    edges: usize,
}

impl<N: Clone + Eq + Hash> AdjacencyIndex<N> {
    /// Creates an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self {
            adjacency: HashMap::new(),
            edges: 0,
        }
    }

    /// Adds the directed edge `from -> to`. Both endpoints become known nodes.
    pub fn add_edge(&mut self, from: N, to: N) {
        self.adjacency.entry(to.clone()).or_default();
        self.adjacency.entry(from).or_default().push(to);
        self.edges += 1;
        debug!(nodes = self.adjacency.len(), edges = self.edges, "added edge");
    }

    /// Outgoing neighbors of `node` in insertion order; empty for unknown nodes.
    #[must_use]
    pub fn neighbors(&self, node: &N) -> &[N] {
        self.adjacency.get(node).map(Vec::as_slice).unwrap_or_default()
    }

    /// Number of distinct nodes that appear in any edge.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.adjacency.len()
    }

    /// Number of edges added, counting duplicates.
    #[must_use]
    pub const fn edge_count(&self) -> usize {
        self.edges
    }

    /// Breadth-first order from `start`, visiting each reachable node once.
    ///
    /// An unknown `start` yields just `[start]`.
    #[must_use]
    pub fn bfs(&self, start: N) -> Vec<N> {
        let mut order = Vec::new();
        let mut seen: HashSet<N> = HashSet::from([start.clone()]);
        let mut queue = VecDeque::from([start]);

        while let Some(node) = queue.pop_front() {
            for next in self.neighbors(&node) {
                if seen.insert(next.clone()) {
                    queue.push_back(next.clone());
                }
            }
            order.push(node);
        }
        order
    }

    /// Depth-first pre-order from `start`, visiting each reachable node once.
    ///
    /// Uses an explicit stack, but yields the same order as the recursive formulation: a node is
    /// marked when it is popped, and neighbors are pushed in reverse so the first edge is explored
    /// first.
    #[must_use]
    pub fn dfs(&self, start: N) -> Vec<N> {
        let mut order = Vec::new();
        let mut seen: HashSet<N> = HashSet::new();
        let mut stack = vec![start];

        while let Some(node) = stack.pop() {
            if !seen.insert(node.clone()) {
                continue;
            }
            stack.extend(self.neighbors(&node).iter().rev().filter(|next| !seen.contains(*next)).cloned());
            order.push(node);
        }
        order
    }
}

impl<N: Clone + Eq + Hash> Default for AdjacencyIndex<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N: Clone + Eq + Hash> Extend<(N, N)> for AdjacencyIndex<N> {
    fn extend<T: IntoIterator<Item = (N, N)>>(&mut self, iter: T) {
        for (from, to) in iter {
            self.add_edge(from, to);
        }
    }
}

impl<N: Clone + Eq + Hash> FromIterator<(N, N)> for AdjacencyIndex<N> {
    fn from_iter<T: IntoIterator<Item = (N, N)>>(iter: T) -> Self {
        let mut graph = Self::new();
        graph.extend(iter);
        graph
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn recursive_dfs(graph: &AdjacencyIndex<u8>, node: u8, seen: &mut HashSet<u8>, order: &mut Vec<u8>) {
        seen.insert(node);
        order.push(node);
        for &next in graph.neighbors(&node) {
            if !seen.contains(&next) {
                recursive_dfs(graph, next, seen, order);
            }
        }
    }

    #[test]
    fn unknown_start_is_a_single_node_walk() {
        let graph: AdjacencyIndex<&str> = [("a", "b")].into_iter().collect();
        assert_eq!(graph.bfs("z"), ["z"]);
        assert_eq!(graph.dfs("z"), ["z"]);
        assert_eq!(graph.node_count(), 2);
    }

    #[test]
    fn parallel_edges_are_counted_but_visited_once() {
        let graph: AdjacencyIndex<u8> = [(1, 2), (1, 2), (2, 2)].into_iter().collect();
        assert_eq!(graph.edge_count(), 3);
        assert_eq!(graph.neighbors(&1), [2, 2]);
        assert_eq!(graph.bfs(1), [1, 2]);
        assert_eq!(graph.dfs(1), [1, 2]);
    }

    proptest! {
        #[test]
        fn iterative_dfs_matches_recursive(
            edges in prop::collection::vec((0u8..12, 0u8..12), 0..60),
            start in 0u8..12,
        ) {
            let graph: AdjacencyIndex<u8> = edges.into_iter().collect();
            let mut expected = Vec::new();
            recursive_dfs(&graph, start, &mut HashSet::new(), &mut expected);

            prop_assert_eq!(graph.dfs(start), expected);
        }

        #[test]
        fn bfs_and_dfs_reach_the_same_nodes(
            edges in prop::collection::vec((0u8..12, 0u8..12), 0..60),
            start in 0u8..12,
        ) {
            let graph: AdjacencyIndex<u8> = edges.into_iter().collect();
            let mut bfs = graph.bfs(start);
            let mut dfs = graph.dfs(start);
            bfs.sort_unstable();
            dfs.sort_unstable();
            prop_assert_eq!(bfs, dfs);
        }
    }
}
