//! Dijkstra shortest-path solver.
//!
//! Node selection is a linear scan in input order rather than a heap: ties
//! on tentative distance go to the node listed first, which keeps the
//! canonical path stable for puzzle authors. Graphs are small enough that
//! the quadratic scan never matters.

use tracing::trace;

use crate::graph::Graph;

/// A minimum-cost path as node indices, with its total weight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShortestPath {
    pub path: Vec<usize>,
    pub total_cost: u64,
}

/// Find a minimum-cost path from `start` to `end`.
///
/// Returns `None` when `end` is unreachable from `start`.
pub fn dijkstra(graph: &Graph, start: usize, end: usize) -> Option<ShortestPath> {
    let n = graph.len();
    let mut dist: Vec<Option<u64>> = vec![None; n];
    let mut prev: Vec<Option<usize>> = vec![None; n];
    let mut visited = vec![false; n];
    dist[start] = Some(0);

    loop {
        let mut current: Option<(usize, u64)> = None;
        for node in 0..n {
            if visited[node] {
                continue;
            }
            if let Some(d) = dist[node] {
                if current.map_or(true, |(_, best)| d < best) {
                    current = Some((node, d));
                }
            }
        }

        // Everything left is unreachable.
        let Some((current, d)) = current else { break };
        if current == end {
            break;
        }
        visited[current] = true;

        for &(neighbor, weight) in graph.neighbors(current) {
            if visited[neighbor] {
                continue;
            }
            let candidate = d.saturating_add(weight);
            if dist[neighbor].map_or(true, |old| candidate < old) {
                dist[neighbor] = Some(candidate);
                prev[neighbor] = Some(current);
            }
        }
    }

    let total_cost = dist[end]?;

    let mut path = vec![end];
    let mut step = end;
    while let Some(p) = prev[step] {
        path.push(p);
        step = p;
    }
    path.reverse();

    trace!(hops = path.len() - 1, total_cost, "dijkstra finished");
    Some(ShortestPath { path, total_cost })
}
