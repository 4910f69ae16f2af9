//! Kruskal minimum spanning tree (forest) solver.

use tracing::trace;

use crate::graph::Graph;
use crate::puzzle::Edge;
use crate::union_find::DisjointSet;

/// Minimum spanning forest of `graph`, edges in selection order.
///
/// Edges are considered by ascending weight with ties kept in input order,
/// so the result is deterministic even when several minimum trees exist.
/// A disconnected graph yields `nodes - components` edges.
pub fn kruskal(graph: &Graph) -> Vec<Edge> {
    let resolved = graph.resolved_edges();
    let mut order: Vec<usize> = (0..resolved.len()).collect();
    order.sort_by_key(|&i| resolved[i].2);

    let target = graph.len().saturating_sub(1);
    let mut sets = DisjointSet::new(graph.len());
    let mut selected = Vec::with_capacity(target);

    for i in order {
        if selected.len() == target {
            break;
        }
        let (from, to, _) = resolved[i];
        if sets.union(from, to) {
            selected.push(graph.edges()[i].clone());
        }
    }

    trace!(edges = selected.len(), "kruskal finished");
    selected
}

/// Total weight of an edge set, saturating at `u64::MAX`.
///
/// Edge sets drawn from a built [`Graph`] never reach the cap; see
/// [`crate::graph::MAX_TOTAL_WEIGHT`].
pub fn total_weight(edges: &[Edge]) -> u64 {
    edges
        .iter()
        .fold(0u64, |total, e| total.saturating_add(e.weight))
}
