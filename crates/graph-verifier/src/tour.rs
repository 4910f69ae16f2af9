//! Nearest-neighbor tour heuristic.
//!
//! This is a greedy approximation of the travelling-salesperson problem,
//! not an optimal solver: the tour it builds is feasible but may be
//! beaten, and players who find a cheaper tour are judged correct. Pairs of
//! nodes without a direct edge cost infinity; no multi-hop substitute is
//! searched for.

use tracing::trace;

use crate::graph::Graph;

/// The heuristic's walk as node indices; first and last are the start node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tour {
    pub tour: Vec<usize>,
    /// `None` when the walk got stuck or could not close, i.e. the tour
    /// uses a leg with no direct edge and has no finite weight.
    pub total_weight: Option<u64>,
}

impl Tour {
    /// Whether every leg of the walk is a real edge.
    pub fn is_closed(&self) -> bool {
        self.total_weight.is_some()
    }
}

/// Greedy tour from `start`.
///
/// A walk that reaches a node with no edge to any unvisited node stops
/// there and returns straight to `start`. That tour, like one whose last
/// node has no edge back to `start`, carries no weight.
pub fn nearest_neighbor(graph: &Graph, start: usize) -> Tour {
    let n = graph.len();
    let mut visited = vec![false; n];
    let mut tour = Vec::with_capacity(n + 1);
    let mut total_weight = Some(0u64);

    visited[start] = true;
    tour.push(start);
    let mut current = start;

    while tour.len() < n {
        let mut nearest: Option<(usize, u64)> = None;
        for node in 0..n {
            if visited[node] {
                continue;
            }
            if let Some(w) = graph.weight(current, node) {
                if nearest.map_or(true, |(_, best)| w < best) {
                    nearest = Some((node, w));
                }
            }
        }

        let Some((next, w)) = nearest else {
            trace!(stuck_at = %graph.id(current), "nearest-neighbor walk is stuck");
            total_weight = None;
            break;
        };
        visited[next] = true;
        tour.push(next);
        total_weight = total_weight.map(|t| t.saturating_add(w));
        current = next;
    }

    total_weight = total_weight
        .zip(leg_weight(graph, current, start))
        .map(|(t, w)| t.saturating_add(w));
    tour.push(start);

    trace!(?total_weight, "nearest-neighbor tour built");
    Tour { tour, total_weight }
}

/// Sum of leg weights along `tour`.
///
/// On a missing edge, returns the offending leg's position (0-based) as the
/// error.
pub fn tour_weight(graph: &Graph, tour: &[usize]) -> Result<u64, usize> {
    let mut total = 0u64;
    for (leg, pair) in tour.windows(2).enumerate() {
        let w = leg_weight(graph, pair[0], pair[1]).ok_or(leg)?;
        total = total.saturating_add(w);
    }
    Ok(total)
}

/// Staying put is free; it only happens in the one-node tour.
fn leg_weight(graph: &Graph, from: usize, to: usize) -> Option<u64> {
    if from == to {
        Some(0)
    } else {
        graph.weight(from, to)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::puzzle::{Edge, NodeId};

    fn graph(nodes: &[&str], edges: &[(&str, &str, u64)]) -> Graph {
        let ids: Vec<NodeId> = nodes.iter().map(|n| NodeId::from(*n)).collect();
        let edges: Vec<Edge> = edges.iter().map(|(a, b, w)| Edge::new(*a, *b, *w)).collect();
        Graph::build(&ids, &edges).unwrap()
    }

    fn square() -> Graph {
        graph(
            &["A", "B", "C", "D"],
            &[
                ("A", "B", 1),
                ("A", "C", 4),
                ("A", "D", 2),
                ("B", "C", 2),
                ("B", "D", 5),
                ("C", "D", 3),
            ],
        )
    }

    #[test]
    fn test_greedy_walk() {
        let g = square();
        let tour = nearest_neighbor(&g, 0);
        assert_eq!(tour.tour, vec![0, 1, 2, 3, 0]);
        assert_eq!(tour.total_weight, Some(1 + 2 + 3 + 2));
        assert_eq!(tour_weight(&g, &tour.tour).ok(), tour.total_weight);
    }

    #[test]
    fn test_ties_go_to_first_listed_node() {
        let g = graph(
            &["A", "B", "C"],
            &[("A", "C", 1), ("A", "B", 1), ("B", "C", 1)],
        );
        assert_eq!(nearest_neighbor(&g, 0).tour, vec![0, 1, 2, 0]);
    }

    #[test]
    fn test_open_walk_has_no_weight() {
        // A path graph: the walk reaches C and cannot return to A.
        let g = graph(&["A", "B", "C"], &[("A", "B", 1), ("B", "C", 1)]);
        let open = nearest_neighbor(&g, 0);
        assert_eq!(open.tour, vec![0, 1, 2, 0]);
        assert_eq!(open.total_weight, None);
        assert!(!open.is_closed());

        let disconnected = graph(&["A", "B", "C"], &[("A", "B", 1)]);
        let stuck = nearest_neighbor(&disconnected, 0);
        assert_eq!(stuck.tour, vec![0, 1, 0]);
        assert_eq!(stuck.total_weight, None);
    }

    #[test]
    fn test_greedy_dead_end_in_a_tourable_graph() {
        // A-B-C is cheapest first, but C only connects back to A and B,
        // leaving D behind; A-D-B-C-A is a real tour.
        let g = graph(
            &["A", "B", "C", "D"],
            &[
                ("A", "B", 1),
                ("B", "C", 1),
                ("A", "C", 9),
                ("A", "D", 2),
                ("B", "D", 3),
            ],
        );
        let greedy = nearest_neighbor(&g, 0);
        assert_eq!(greedy.tour, vec![0, 1, 2, 0]);
        assert_eq!(greedy.total_weight, None);
        assert_eq!(tour_weight(&g, &[0, 3, 1, 2, 0]), Ok(15));
    }

    #[test]
    fn test_single_node_tour() {
        let g = graph(&["A"], &[]);
        let tour = nearest_neighbor(&g, 0);
        assert_eq!(tour.tour, vec![0, 0]);
        assert_eq!(tour.total_weight, Some(0));
    }

    #[test]
    fn test_tour_weight_reports_missing_leg() {
        let g = graph(&["A", "B", "C"], &[("A", "B", 1), ("B", "C", 1)]);
        assert_eq!(tour_weight(&g, &[0, 1, 2, 0]), Err(2));
    }
}
