//! Canonical solutions and the solve-then-verify pipeline.
//!
//! Canonical solutions are recomputed for every submission rather than
//! stored with the puzzle, so an edited graph can never be judged against a
//! stale answer.

use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::error::PuzzleError;
use crate::puzzle::{AlgorithmClass, Edge, Instance, NodeId, PlayerAnswer, Puzzle};
use crate::shortest_path::dijkstra;
use crate::spanning_tree::kruskal;
use crate::tour::nearest_neighbor;
use crate::traversal::{bfs, dfs};
use crate::verifier::{verify, Verdict, VerifierConfig};

/// The reference answer a solver computes for one puzzle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Solution {
    /// BFS or DFS visit order.
    Traversal(Vec<NodeId>),
    Path {
        path: Vec<NodeId>,
        #[serde(rename = "totalCost")]
        total_cost: u64,
    },
    SpanningTree(Vec<Edge>),
    /// Nearest-neighbor tour. `total_weight` is `None` (`null` on the wire)
    /// when the heuristic could not close a tour from direct edges.
    Tour {
        tour: Vec<NodeId>,
        #[serde(rename = "totalWeight")]
        total_weight: Option<u64>,
    },
}

impl Solution {
    /// The answer a player would submit to reproduce this solution.
    pub fn to_answer(&self) -> PlayerAnswer {
        match self {
            Solution::Traversal(nodes) => PlayerAnswer::Sequence(nodes.clone()),
            Solution::Path { path, .. } => PlayerAnswer::Sequence(path.clone()),
            Solution::SpanningTree(edges) => PlayerAnswer::Edges(edges.clone()),
            Solution::Tour { tour, .. } => PlayerAnswer::Sequence(tour.clone()),
        }
    }
}

/// Result of judging one submission.
#[derive(Debug, Clone, PartialEq)]
pub enum Judgement {
    /// The puzzle had a canonical solution and the answer was checked.
    Judged { verdict: Verdict, solution: Solution },
    /// The puzzle itself has no solution; the answer was not judged.
    Unsolvable { reason: String },
}

fn require(node: Option<usize>, err: impl FnOnce() -> PuzzleError) -> Result<usize, PuzzleError> {
    node.ok_or_else(err)
}

/// Compute the canonical solution for `instance`.
///
/// `Ok(None)` means the puzzle has no solution (an unreachable target);
/// that is a normal outcome, not an error. A tour puzzle always has a
/// solution, though its weight may be unknown.
#[instrument(
    skip_all,
    fields(algorithm = %instance.algorithm(), nodes = instance.graph().len())
)]
pub fn solve(instance: &Instance) -> Result<Option<Solution>, PuzzleError> {
    let graph = instance.graph();
    let algorithm = instance.algorithm();
    let start = || require(instance.start(), || PuzzleError::MissingStart { algorithm });
    let traversal = |order: Vec<usize>| Some(Solution::Traversal(graph.ids_of(&order)));

    let solution = match algorithm {
        AlgorithmClass::BfsTraversal => traversal(bfs(graph, start()?)),
        AlgorithmClass::DfsTraversal => traversal(dfs(graph, start()?)),
        AlgorithmClass::ShortestPath => {
            let end = require(instance.end(), || PuzzleError::MissingEnd { algorithm })?;
            dijkstra(graph, start()?, end).map(|found| Solution::Path {
                path: graph.ids_of(&found.path),
                total_cost: found.total_cost,
            })
        }
        AlgorithmClass::SpanningTree => Some(Solution::SpanningTree(kruskal(graph))),
        AlgorithmClass::TourHeuristic => {
            let found = nearest_neighbor(graph, start()?);
            Some(Solution::Tour {
                tour: graph.ids_of(&found.tour),
                total_weight: found.total_weight,
            })
        }
    };

    debug!(solvable = solution.is_some(), "canonical solution computed");
    Ok(solution)
}

/// Validate `puzzle`, solve it and judge `answer` against the result.
///
/// Malformed puzzles fail fast with a [`PuzzleError`]; a wrong answer is an
/// `Ok` judgement carrying an incorrect verdict.
#[instrument(skip_all, fields(algorithm = %puzzle.algorithm))]
pub fn judge(
    puzzle: &Puzzle,
    answer: &PlayerAnswer,
    config: &VerifierConfig,
) -> Result<Judgement, PuzzleError> {
    let instance = puzzle.instance()?;

    let Some(solution) = solve(&instance)? else {
        let reason = unsolvable_reason(&instance);
        info!(%reason, "puzzle has no solution");
        return Ok(Judgement::Unsolvable { reason });
    };

    let verdict = verify(&instance, answer, &solution, config)?;
    info!(correct = verdict.is_correct, "submission judged");
    Ok(Judgement::Judged { verdict, solution })
}

fn unsolvable_reason(instance: &Instance) -> String {
    let graph = instance.graph();
    let name = |node: Option<usize>| node.map(|n| graph.id(n).to_string()).unwrap_or_default();
    match instance.algorithm() {
        AlgorithmClass::ShortestPath => format!(
            "This puzzle has no solution: {} cannot be reached from {}.",
            name(instance.end()),
            name(instance.start())
        ),
        other => format!("This {other} puzzle has no solution."),
    }
}
