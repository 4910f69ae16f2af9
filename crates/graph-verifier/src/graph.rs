//! Adjacency index shared by every solver and verifier.
//!
//! Nodes are addressed by their position in the puzzle's node list, so the
//! algorithms work on plain `usize` indices and only translate back to
//! [`NodeId`]s when producing output.

use std::collections::HashMap;

use crate::error::PuzzleError;
use crate::puzzle::{Edge, NodeId};
use crate::union_find::DisjointSet;

/// Largest total edge weight a graph may carry.
///
/// Every simple path, spanning forest and closed tour uses each listed edge
/// at most twice, so at this bound none of their sums can overflow a `u64`.
pub const MAX_TOTAL_WEIGHT: u64 = u64::MAX / 2;

/// An undirected weighted graph built from a node list and an edge list.
#[derive(Debug, Clone)]
pub struct Graph {
    ids: Vec<NodeId>,
    index: HashMap<NodeId, usize>,
    /// Per node: `(neighbor, weight)` sorted by the neighbor's identifier.
    adjacency: Vec<Vec<(usize, u64)>>,
    /// Direct weight per unordered pair `(low, high)`; the lightest parallel
    /// edge wins, matching what the shortest-path solver can relax.
    weights: HashMap<(usize, usize), u64>,
    edges: Vec<Edge>,
    resolved: Vec<(usize, usize, u64)>,
}

impl Graph {
    /// Build the index, rejecting inputs the solvers cannot make sense of.
    pub fn build(nodes: &[NodeId], edges: &[Edge]) -> Result<Self, PuzzleError> {
        if nodes.is_empty() {
            return Err(PuzzleError::EmptyGraph);
        }

        let mut index = HashMap::with_capacity(nodes.len());
        for (i, id) in nodes.iter().enumerate() {
            if index.insert(id.clone(), i).is_some() {
                return Err(PuzzleError::DuplicateNode { node: id.clone() });
            }
        }

        let mut adjacency = vec![Vec::new(); nodes.len()];
        let mut weights = HashMap::with_capacity(edges.len());
        let mut resolved = Vec::with_capacity(edges.len());
        let mut total = 0u64;

        for edge in edges {
            let lookup = |id: &NodeId| {
                index
                    .get(id.as_str())
                    .copied()
                    .ok_or_else(|| PuzzleError::UnknownNode {
                        node: id.clone(),
                        context: format!("edge {}-{}", edge.from, edge.to),
                    })
            };
            let from = lookup(&edge.from)?;
            let to = lookup(&edge.to)?;
            if from == to {
                return Err(PuzzleError::SelfLoop {
                    node: edge.from.clone(),
                });
            }

            total = total
                .checked_add(edge.weight)
                .filter(|&t| t <= MAX_TOTAL_WEIGHT)
                .ok_or(PuzzleError::WeightOverflow {
                    limit: MAX_TOTAL_WEIGHT,
                })?;

            adjacency[from].push((to, edge.weight));
            adjacency[to].push((from, edge.weight));
            weights
                .entry(pair(from, to))
                .and_modify(|w: &mut u64| *w = (*w).min(edge.weight))
                .or_insert(edge.weight);
            resolved.push((from, to, edge.weight));
        }

        // Stable, so parallel edges keep their input order.
        for list in &mut adjacency {
            list.sort_by(|a, b| nodes[a.0].cmp(&nodes[b.0]));
        }

        Ok(Self {
            ids: nodes.to_vec(),
            index,
            adjacency,
            weights,
            edges: edges.to_vec(),
            resolved,
        })
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Node identifiers in input order.
    pub fn ids(&self) -> &[NodeId] {
        &self.ids
    }

    pub fn id(&self, node: usize) -> &NodeId {
        &self.ids[node]
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    /// `(neighbor, weight)` pairs in ascending identifier order.
    pub fn neighbors(&self, node: usize) -> &[(usize, u64)] {
        &self.adjacency[node]
    }

    pub fn is_adjacent(&self, a: usize, b: usize) -> bool {
        self.weights.contains_key(&pair(a, b))
    }

    /// Weight of the direct edge between `a` and `b`, if there is one.
    pub fn weight(&self, a: usize, b: usize) -> Option<u64> {
        self.weights.get(&pair(a, b)).copied()
    }

    /// Edges in input order.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Edges in input order as `(from, to, weight)` index triples.
    pub fn resolved_edges(&self) -> &[(usize, usize, u64)] {
        &self.resolved
    }

    /// Translate a list of indices back to identifiers.
    pub fn ids_of(&self, nodes: &[usize]) -> Vec<NodeId> {
        nodes.iter().map(|&n| self.ids[n].clone()).collect()
    }

    pub fn component_count(&self) -> usize {
        let mut sets = DisjointSet::new(self.len());
        for &(from, to, _) in &self.resolved {
            sets.union(from, to);
        }
        (0..self.len()).filter(|&n| sets.find(n) == n).count()
    }
}

fn pair(a: usize, b: usize) -> (usize, usize) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}
