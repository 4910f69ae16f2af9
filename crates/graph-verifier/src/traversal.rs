//! Breadth-first and depth-first traversal solvers.
//!
//! Both are small state machines over a visited set and a frontier. The
//! frontier is fed in ascending identifier order so the canonical output is
//! deterministic for a given input.

use std::collections::VecDeque;

use smallvec::SmallVec;
use tracing::trace;

use crate::graph::Graph;

/// Depth-first frontiers rarely exceed this on puzzle-sized graphs.
pub(crate) type NodeStack = SmallVec<[usize; 32]>;

/// Breadth-first visit order from `start`.
///
/// Nodes are marked visited when enqueued. Unreachable nodes are left out.
pub fn bfs(graph: &Graph, start: usize) -> Vec<usize> {
    let mut visited = vec![false; graph.len()];
    let mut order = Vec::with_capacity(graph.len());
    let mut queue = VecDeque::new();

    visited[start] = true;
    queue.push_back(start);

    while let Some(current) = queue.pop_front() {
        order.push(current);
        for &(neighbor, _) in graph.neighbors(current) {
            if !visited[neighbor] {
                visited[neighbor] = true;
                queue.push_back(neighbor);
            }
        }
    }

    trace!(visited = order.len(), "bfs finished");
    order
}

/// Depth-first visit order from `start`.
///
/// Neighbors are pushed in descending identifier order so the smallest one
/// is popped first. Unreachable nodes are left out.
pub fn dfs(graph: &Graph, start: usize) -> Vec<usize> {
    let mut visited = vec![false; graph.len()];
    let mut order = Vec::with_capacity(graph.len());
    let mut stack = NodeStack::new();
    stack.push(start);

    while let Some(current) = stack.pop() {
        if visited[current] {
            continue;
        }
        visited[current] = true;
        order.push(current);

        for &(neighbor, _) in graph.neighbors(current).iter().rev() {
            if !visited[neighbor] {
                stack.push(neighbor);
            }
        }
    }

    trace!(visited = order.len(), "dfs finished");
    order
}

/// Hop distance of every node from `start`; `None` when unreachable.
pub fn bfs_depths(graph: &Graph, start: usize) -> Vec<Option<usize>> {
    let mut depths = vec![None; graph.len()];
    let mut queue = VecDeque::new();

    depths[start] = Some(0);
    queue.push_back((start, 0));

    while let Some((current, depth)) = queue.pop_front() {
        for &(neighbor, _) in graph.neighbors(current) {
            if depths[neighbor].is_none() {
                depths[neighbor] = Some(depth + 1);
                queue.push_back((neighbor, depth + 1));
            }
        }
    }

    depths
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::puzzle::{Edge, NodeId};

    fn graph(nodes: &[&str], edges: &[(&str, &str)]) -> Graph {
        let ids: Vec<NodeId> = nodes.iter().map(|n| NodeId::from(*n)).collect();
        let edges: Vec<Edge> = edges.iter().map(|(a, b)| Edge::new(*a, *b, 1)).collect();
        Graph::build(&ids, &edges).unwrap()
    }

    fn names(graph: &Graph, order: &[usize]) -> Vec<String> {
        order.iter().map(|&n| graph.id(n).to_string()).collect()
    }

    #[test]
    fn test_bfs_visits_level_by_level() {
        let g = graph(&["A", "B", "C", "D"], &[("A", "B"), ("A", "C"), ("B", "D")]);
        assert_eq!(names(&g, &bfs(&g, 0)), ["A", "B", "C", "D"]);
    }

    #[test]
    fn test_bfs_orders_neighbors_by_identifier() {
        // Edge input order must not matter.
        let g = graph(&["S", "Z", "M", "B"], &[("S", "Z"), ("S", "M"), ("S", "B")]);
        assert_eq!(names(&g, &bfs(&g, 0)), ["S", "B", "M", "Z"]);
    }

    #[test]
    fn test_dfs_goes_deep_before_wide() {
        let g = graph(
            &["A", "B", "C", "D", "E"],
            &[("A", "B"), ("A", "C"), ("B", "D"), ("C", "E")],
        );
        assert_eq!(names(&g, &dfs(&g, 0)), ["A", "B", "D", "C", "E"]);
    }

    #[test]
    fn test_dfs_skips_already_visited_entries() {
        // C is pushed twice (from A and from B) but visited once.
        let g = graph(&["A", "B", "C"], &[("A", "B"), ("A", "C"), ("B", "C")]);
        assert_eq!(names(&g, &dfs(&g, 0)), ["A", "B", "C"]);
    }

    #[test]
    fn test_unreachable_nodes_are_absent() {
        let g = graph(&["A", "B", "C"], &[("A", "B")]);
        assert_eq!(names(&g, &bfs(&g, 0)), ["A", "B"]);
        assert_eq!(names(&g, &dfs(&g, 0)), ["A", "B"]);
        assert_eq!(bfs_depths(&g, 0), vec![Some(0), Some(1), None]);
    }
}
