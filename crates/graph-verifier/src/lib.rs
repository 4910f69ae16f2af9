//! Solver and answer verifier for graph-theory puzzles.
//!
//! A [`Puzzle`] names one algorithm class and a small weighted, undirected
//! graph. The crate computes the canonical solution for the class and judges
//! a player's answer against it structurally, so any valid traversal order,
//! equal-cost path or no-heavier tour is accepted, and every rejection comes
//! with an explanation.

pub mod error;
pub mod graph;
pub mod puzzle;
pub mod shortest_path;
pub mod solver;
pub mod spanning_tree;
pub mod tour;
pub mod traversal;
mod union_find;
pub mod verifier;

// Re-export main types
pub use error::{PuzzleError, PuzzleErrorCode};
pub use graph::{Graph, MAX_TOTAL_WEIGHT};
pub use puzzle::{
    complete_edges, AlgorithmClass, Edge, Instance, NodeId, NodeSpec, PlayerAnswer, Puzzle,
};
pub use shortest_path::{dijkstra, ShortestPath};
pub use solver::{judge, solve, Judgement, Solution};
pub use spanning_tree::{kruskal, total_weight};
pub use tour::{nearest_neighbor, tour_weight, Tour};
pub use traversal::{bfs, bfs_depths, dfs};
pub use verifier::{
    check_bfs, check_dfs, check_shortest_path, check_spanning_tree, check_tour, verify,
    verify_bfs, verify_dfs, verify_shortest_path, verify_spanning_tree, verify_tour, Rejection,
    SpanningTreePolicy, Verdict, VerifierConfig,
};
