//! Structural answer verification.
//!
//! Most puzzle classes accept many correct answers, so an answer is never
//! compared to the canonical solution directly. Each class has its own
//! predicate that re-derives correctness from the graph, and every rule that
//! can fail has its own [`Rejection`] so players are told which rule they
//! broke and where.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, instrument};

use crate::error::PuzzleError;
use crate::graph::Graph;
use crate::puzzle::{AlgorithmClass, Edge, Instance, NodeId, PlayerAnswer};
use crate::solver::Solution;
use crate::spanning_tree::total_weight;
use crate::tour::tour_weight;
use crate::traversal::{bfs_depths, NodeStack};
use crate::union_find::DisjointSet;

/// How spanning-tree answers are compared.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SpanningTreePolicy {
    /// Only the edge set the solver produced is accepted.
    #[default]
    CanonicalOnly,
    /// Any acyclic set of graph edges with the minimum total weight.
    AnyMinimum,
}

/// Verifier settings, passed explicitly with every call.
#[derive(Debug, Clone, Default)]
pub struct VerifierConfig {
    /// How spanning-tree answers are compared to the canonical tree.
    pub spanning_tree_policy: SpanningTreePolicy,
}

/// Correctness judgment plus the explanation shown to the player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Verdict {
    /// Whether the answer satisfies every rule of its class.
    pub is_correct: bool,
    /// Praise on success, otherwise the first broken rule.
    pub feedback: String,
}

impl Verdict {
    pub fn correct(feedback: impl Into<String>) -> Self {
        Self {
            is_correct: true,
            feedback: feedback.into(),
        }
    }

    pub fn incorrect(feedback: impl Into<String>) -> Self {
        Self {
            is_correct: false,
            feedback: feedback.into(),
        }
    }
}

impl From<Rejection> for Verdict {
    fn from(rejection: Rejection) -> Self {
        Verdict::incorrect(rejection.to_string())
    }
}

/// A broken correctness rule. Steps are 1-based positions in the answer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    /// Empty or unrecognizable traversal or tour answer.
    #[error("No answer submitted.")]
    NoAnswer,
    /// Empty or unrecognizable shortest-path answer.
    #[error("No path submitted.")]
    NoPath,
    /// Empty or unrecognizable spanning-tree answer.
    #[error("No edges submitted.")]
    NoEdges,
    /// The traversal does not begin at the start node.
    #[error("Your traversal must start at {start}.")]
    WrongStart { start: NodeId },
    /// The answer names a node the graph does not have.
    #[error("\"{node}\" is not a node in this graph.")]
    UnknownNode { node: NodeId },
    /// A traversal names a node in another component.
    #[error("\"{node}\" cannot be reached from {start}, so it cannot be part of this traversal.")]
    Unreachable { node: NodeId, start: NodeId },
    /// A node appears twice in a traversal or tour.
    #[error("You visited \"{node}\" more than once (again at step {step}).")]
    RepeatedNode { node: NodeId, step: usize },
    /// A traversal stopped before covering the reachable set.
    #[error("You visited {visited} nodes but {expected} can be reached from {start}; \"{missing}\" was never visited.")]
    MissingNode {
        visited: usize,
        expected: usize,
        start: NodeId,
        /// First reachable node, in input order, that was skipped.
        missing: NodeId,
    },
    /// A BFS answer went back up a level.
    #[error("Invalid BFS order at step {step}: \"{node}\" is at depth {depth} but \"{previous}\" is at depth {previous_depth}. BFS must finish all nodes at one level before going deeper.")]
    DepthRegression {
        step: usize,
        node: NodeId,
        depth: usize,
        previous: NodeId,
        previous_depth: usize,
    },
    /// A BFS answer visited a node touching nothing visited so far.
    #[error("\"{node}\" cannot be visited at step {step}. In BFS, you can only visit a node adjacent to an already-visited node.")]
    NotOnFrontier { node: NodeId, step: usize },
    /// A DFS answer visited a node no node on the path stack can reach.
    #[error("\"{node}\" is not a valid DFS move at step {step}. It is not adjacent to any node on the current DFS path.")]
    NoDfsContinuation { node: NodeId, step: usize },
    /// The path does not begin at the start node.
    #[error("Path must start at {start}.")]
    PathWrongStart { start: NodeId },
    /// The path does not finish at the end node.
    #[error("Path must end at {end}.")]
    PathWrongEnd { end: NodeId },
    /// Consecutive stops of a path or tour share no edge.
    #[error("There is no direct edge between \"{from}\" and \"{to}\" (step {step}).")]
    MissingEdge { from: NodeId, to: NodeId, step: usize },
    /// A valid path that is not the cheapest.
    #[error("Your path \"{path}\" costs {cost} but the shortest possible cost is {optimal}. Try a cheaper route.")]
    CostMismatch { path: String, cost: u64, optimal: u64 },
    /// A valid path whose cost does not fit in a `u64`; it only arises
    /// from revisiting nodes over heavy edges.
    #[error("Your path \"{path}\" costs far more than the shortest possible cost of {optimal}. Try a cheaper route.")]
    CostOverflow { path: String, optimal: u64 },
    /// The tree has the wrong number of edges.
    #[error("Your MST has {submitted} edges but the correct MST has {expected} edges.")]
    EdgeCountMismatch { submitted: usize, expected: usize },
    /// The same edge, in either orientation, was submitted twice.
    #[error("Edge {edge} was submitted more than once.")]
    DuplicateEdge { edge: Edge },
    /// Canonical policy: the edge is not in the canonical tree.
    #[error("Incorrect. {edge} is not in the minimum spanning tree. The correct MST edges were: {expected}")]
    EdgeNotInTree {
        edge: Edge,
        /// The canonical tree, rendered for the player.
        expected: String,
    },
    /// Any-minimum policy: no graph edge has these endpoints and weight.
    #[error("{edge} is not an edge of this graph.")]
    NotAGraphEdge { edge: Edge },
    /// Any-minimum policy: the edge joins two already-connected nodes.
    #[error("Edge {edge} closes a cycle; a spanning tree cannot contain cycles.")]
    CycleEdge { edge: Edge },
    /// Any-minimum policy: acyclic but heavier than the minimum.
    #[error("Your spanning tree has total weight {weight} but the minimum is {optimal}.")]
    TreeWeightMismatch { weight: u64, optimal: u64 },
    /// The tour does not leave from the start node.
    #[error("Tour must start at {start}.")]
    TourWrongStart { start: NodeId },
    /// The tour does not return to the start node.
    #[error("Tour must end at {start}.")]
    TourWrongEnd { start: NodeId },
    /// A tour must have one stop per node plus the return to start.
    #[error("Tour must visit all {nodes} nodes exactly once and return to start ({submitted} stops submitted, {expected} expected).")]
    TourLength {
        nodes: usize,
        submitted: usize,
        expected: usize,
    },
    /// A valid tour heavier than the heuristic's.
    #[error("Incorrect. Your tour has weight {weight} but the reference tour weighs {reference}. Reference tour: {tour}.")]
    TourTooHeavy {
        weight: u64,
        reference: u64,
        /// The heuristic's tour, rendered for the player.
        tour: String,
    },
}

fn render(nodes: &[NodeId]) -> String {
    nodes
        .iter()
        .map(NodeId::as_str)
        .collect::<Vec<_>>()
        .join(" → ")
}

fn resolve(graph: &Graph, node: &NodeId) -> Result<usize, Rejection> {
    graph
        .index_of(node.as_str())
        .ok_or_else(|| Rejection::UnknownNode { node: node.clone() })
}

fn finish(result: Result<String, Rejection>) -> Verdict {
    match result {
        Ok(feedback) => Verdict::correct(feedback),
        Err(rejection) => {
            debug!(?rejection, "answer rejected");
            rejection.into()
        }
    }
}

/// Checks shared by both traversal classes: start, membership,
/// reachability and uniqueness. Returns the answer as node indices.
fn resolve_visits(
    graph: &Graph,
    start: usize,
    answer: &[NodeId],
    depths: &[Option<usize>],
) -> Result<Vec<usize>, Rejection> {
    let start_id = graph.id(start);
    match answer.first() {
        None => return Err(Rejection::NoAnswer),
        Some(first) if first != start_id => {
            return Err(Rejection::WrongStart {
                start: start_id.clone(),
            })
        }
        Some(_) => {}
    }

    let mut seen = vec![false; graph.len()];
    let mut order = Vec::with_capacity(answer.len());
    for (i, id) in answer.iter().enumerate() {
        let node = resolve(graph, id)?;
        if depths[node].is_none() {
            return Err(Rejection::Unreachable {
                node: id.clone(),
                start: start_id.clone(),
            });
        }
        if seen[node] {
            return Err(Rejection::RepeatedNode {
                node: id.clone(),
                step: i + 1,
            });
        }
        seen[node] = true;
        order.push(node);
    }
    Ok(order)
}

/// Only nodes reachable from the start can be visited, so completeness is
/// measured against the reachable set. `order` holds no repeats.
fn check_complete(
    graph: &Graph,
    start: usize,
    order: &[usize],
    depths: &[Option<usize>],
) -> Result<(), Rejection> {
    let reachable = depths.iter().filter(|d| d.is_some()).count();
    if order.len() == reachable {
        return Ok(());
    }

    let mut seen = vec![false; graph.len()];
    for &node in order {
        seen[node] = true;
    }
    let missing = (0..graph.len())
        .find(|&n| depths[n].is_some() && !seen[n])
        .unwrap_or(start);
    Err(Rejection::MissingNode {
        visited: order.len(),
        expected: reachable,
        start: graph.id(start).clone(),
        missing: graph.id(missing).clone(),
    })
}

/// Whether `answer` is a valid breadth-first visit order from `start`.
///
/// Depth must never decrease along the answer, and every node must touch an
/// already-visited node when it is visited. Order rules are checked before
/// completeness, so a partial answer that skips a level is reported at the
/// step where it jumps.
///
/// # Panics
///
/// Panics if `start` is not a node index of `graph`.
pub fn check_bfs(graph: &Graph, start: usize, answer: &[NodeId]) -> Result<(), Rejection> {
    let depths = bfs_depths(graph, start);
    let order = resolve_visits(graph, start, answer, &depths)?;
    let depth = |n: usize| depths[n].unwrap_or(usize::MAX);

    for (i, pair) in order.windows(2).enumerate() {
        let (previous, node) = (pair[0], pair[1]);
        if depth(node) < depth(previous) {
            return Err(Rejection::DepthRegression {
                step: i + 2,
                node: graph.id(node).clone(),
                depth: depth(node),
                previous: graph.id(previous).clone(),
                previous_depth: depth(previous),
            });
        }
    }

    let mut visited = vec![false; graph.len()];
    visited[start] = true;
    for (i, &node) in order.iter().enumerate().skip(1) {
        if !graph.neighbors(node).iter().any(|&(n, _)| visited[n]) {
            return Err(Rejection::NotOnFrontier {
                node: graph.id(node).clone(),
                step: i + 1,
            });
        }
        visited[node] = true;
    }

    check_complete(graph, start, &order, &depths)
}

pub fn verify_bfs(graph: &Graph, start: usize, answer: &[NodeId]) -> Verdict {
    finish(
        check_bfs(graph, start, answer)
            .map(|()| format!("Correct! \"{}\" is a valid BFS traversal.", render(answer))),
    )
}

/// Whether `answer` is a valid depth-first visit order from `start`.
///
/// Replays the answer against a simulated path stack: each new node must be
/// adjacent to the top of the stack after backtracking.
///
/// # Panics
///
/// Panics if `start` is not a node index of `graph`.
pub fn check_dfs(graph: &Graph, start: usize, answer: &[NodeId]) -> Result<(), Rejection> {
    let depths = bfs_depths(graph, start);
    let order = resolve_visits(graph, start, answer, &depths)?;

    let mut stack = NodeStack::new();
    stack.push(start);
    for (i, &node) in order.iter().enumerate().skip(1) {
        while let Some(&top) = stack.last() {
            if graph.is_adjacent(top, node) {
                break;
            }
            stack.pop();
        }
        if stack.is_empty() {
            return Err(Rejection::NoDfsContinuation {
                node: graph.id(node).clone(),
                step: i + 1,
            });
        }
        stack.push(node);
    }

    check_complete(graph, start, &order, &depths)
}

pub fn verify_dfs(graph: &Graph, start: usize, answer: &[NodeId]) -> Verdict {
    finish(
        check_dfs(graph, start, answer)
            .map(|()| format!("Correct! \"{}\" is a valid DFS traversal.", render(answer))),
    )
}

/// Whether `answer` is a path from `start` to `end` costing exactly
/// `optimal`. Returns the path's cost.
///
/// # Panics
///
/// Panics if `start` or `end` is not a node index of `graph`.
pub fn check_shortest_path(
    graph: &Graph,
    start: usize,
    end: usize,
    optimal: u64,
    answer: &[NodeId],
) -> Result<u64, Rejection> {
    let (Some(first), Some(last)) = (answer.first(), answer.last()) else {
        return Err(Rejection::NoPath);
    };
    if first != graph.id(start) {
        return Err(Rejection::PathWrongStart {
            start: graph.id(start).clone(),
        });
    }
    if last != graph.id(end) {
        return Err(Rejection::PathWrongEnd {
            end: graph.id(end).clone(),
        });
    }

    let path = answer
        .iter()
        .map(|id| resolve(graph, id))
        .collect::<Result<Vec<_>, _>>()?;

    // Every leg is checked before the cost, so a missing edge late in an
    // overlong path is still reported as such.
    let mut cost = Some(0u64);
    for (i, pair) in path.windows(2).enumerate() {
        let weight = graph.weight(pair[0], pair[1]).ok_or_else(|| Rejection::MissingEdge {
            from: graph.id(pair[0]).clone(),
            to: graph.id(pair[1]).clone(),
            step: i + 1,
        })?;
        cost = cost.and_then(|c| c.checked_add(weight));
    }
    let Some(cost) = cost else {
        return Err(Rejection::CostOverflow {
            path: render(answer),
            optimal,
        });
    };

    // Nothing can cost less than the optimum, so equality is the only pass.
    if cost != optimal {
        return Err(Rejection::CostMismatch {
            path: render(answer),
            cost,
            optimal,
        });
    }
    Ok(cost)
}

pub fn verify_shortest_path(
    graph: &Graph,
    start: usize,
    end: usize,
    optimal: u64,
    answer: &[NodeId],
) -> Verdict {
    finish(
        check_shortest_path(graph, start, end, optimal, answer).map(|cost| {
            format!(
                "Correct! \"{}\" is a valid shortest path with cost {cost}.",
                render(answer)
            )
        }),
    )
}

/// Whether `answer` is an acceptable minimum spanning tree under `policy`.
/// Returns the answer's total weight.
pub fn check_spanning_tree(
    graph: &Graph,
    canonical: &[Edge],
    policy: SpanningTreePolicy,
    answer: &[Edge],
) -> Result<u64, Rejection> {
    // A one-node graph has an empty tree; only then is an empty answer right.
    if answer.is_empty() && !canonical.is_empty() {
        return Err(Rejection::NoEdges);
    }
    if answer.len() != canonical.len() {
        return Err(Rejection::EdgeCountMismatch {
            submitted: answer.len(),
            expected: canonical.len(),
        });
    }

    let mut submitted = HashSet::with_capacity(answer.len());
    for edge in answer {
        if !submitted.insert(edge.key()) {
            return Err(Rejection::DuplicateEdge { edge: edge.clone() });
        }
    }

    match policy {
        SpanningTreePolicy::CanonicalOnly => {
            let expected: HashSet<_> = canonical.iter().map(Edge::key).collect();
            if let Some(edge) = answer.iter().find(|e| !expected.contains(&e.key())) {
                return Err(Rejection::EdgeNotInTree {
                    edge: edge.clone(),
                    expected: canonical
                        .iter()
                        .map(Edge::to_string)
                        .collect::<Vec<_>>()
                        .join(", "),
                });
            }
        }
        SpanningTreePolicy::AnyMinimum => {
            let available: HashSet<_> = graph.edges().iter().map(Edge::key).collect();
            let mut sets = DisjointSet::new(graph.len());
            for edge in answer {
                if !available.contains(&edge.key()) {
                    return Err(Rejection::NotAGraphEdge { edge: edge.clone() });
                }
                let from = resolve(graph, &edge.from)?;
                let to = resolve(graph, &edge.to)?;
                if !sets.union(from, to) {
                    return Err(Rejection::CycleEdge { edge: edge.clone() });
                }
            }

            let weight = total_weight(answer);
            let optimal = total_weight(canonical);
            if weight != optimal {
                return Err(Rejection::TreeWeightMismatch { weight, optimal });
            }
        }
    }

    Ok(total_weight(answer))
}

pub fn verify_spanning_tree(
    graph: &Graph,
    canonical: &[Edge],
    policy: SpanningTreePolicy,
    answer: &[Edge],
) -> Verdict {
    finish(
        check_spanning_tree(graph, canonical, policy, answer).map(|weight| match policy {
            SpanningTreePolicy::CanonicalOnly => {
                "Correct! Your MST matches the optimal solution.".to_string()
            }
            SpanningTreePolicy::AnyMinimum => {
                format!("Correct! Your spanning tree has the minimum total weight of {weight}.")
            }
        }),
    )
}

/// Whether `answer` is a closed tour from `start` no heavier than the
/// reference tour. Returns the answer's weight.
///
/// A `reference_weight` of `None` means the heuristic found no closed tour,
/// so any closed tour is accepted.
///
/// # Panics
///
/// Panics if `start` is not a node index of `graph`.
pub fn check_tour(
    graph: &Graph,
    start: usize,
    reference: &[NodeId],
    reference_weight: Option<u64>,
    answer: &[NodeId],
) -> Result<u64, Rejection> {
    let start_id = graph.id(start);
    let (Some(first), Some(last)) = (answer.first(), answer.last()) else {
        return Err(Rejection::NoAnswer);
    };
    if first != start_id {
        return Err(Rejection::TourWrongStart {
            start: start_id.clone(),
        });
    }
    if last != start_id {
        return Err(Rejection::TourWrongEnd {
            start: start_id.clone(),
        });
    }
    if answer.len() != graph.len() + 1 {
        return Err(Rejection::TourLength {
            nodes: graph.len(),
            submitted: answer.len(),
            expected: graph.len() + 1,
        });
    }

    // With the length fixed, n distinct known stops cover every node.
    let mut seen = vec![false; graph.len()];
    let mut tour = Vec::with_capacity(answer.len());
    for (i, id) in answer[..answer.len() - 1].iter().enumerate() {
        let node = resolve(graph, id)?;
        if seen[node] {
            return Err(Rejection::RepeatedNode {
                node: id.clone(),
                step: i + 1,
            });
        }
        seen[node] = true;
        tour.push(node);
    }
    tour.push(start);

    let weight = tour_weight(graph, &tour).map_err(|leg| Rejection::MissingEdge {
        from: graph.id(tour[leg]).clone(),
        to: graph.id(tour[leg + 1]).clone(),
        step: leg + 1,
    })?;

    // The heuristic is only an upper bound; beating it is allowed.
    match reference_weight {
        Some(reference_weight) if weight > reference_weight => Err(Rejection::TourTooHeavy {
            weight,
            reference: reference_weight,
            tour: render(reference),
        }),
        _ => Ok(weight),
    }
}

pub fn verify_tour(
    graph: &Graph,
    start: usize,
    reference: &[NodeId],
    reference_weight: Option<u64>,
    answer: &[NodeId],
) -> Verdict {
    finish(
        check_tour(graph, start, reference, reference_weight, answer).map(|weight| {
            match reference_weight {
                Some(_) => format!("Correct! Your tour has total weight {weight}."),
                None => format!(
                    "Correct! Your tour has total weight {weight}. \
                     The nearest-neighbor heuristic could not close a tour on this graph."
                ),
            }
        }),
    )
}

/// Judge `answer` against the canonical `solution` of `instance`.
///
/// An answer of the wrong shape is an incorrect verdict, not an error.
/// Errors are reserved for callers handing over a solution of another class
/// or an instance missing its endpoints.
#[instrument(skip_all, fields(algorithm = %instance.algorithm()))]
pub fn verify(
    instance: &Instance,
    answer: &PlayerAnswer,
    solution: &Solution,
    config: &VerifierConfig,
) -> Result<Verdict, PuzzleError> {
    let graph = instance.graph();
    let algorithm = instance.algorithm();
    let start = || instance.start().ok_or(PuzzleError::MissingStart { algorithm });
    let no_answer = || Verdict::from(Rejection::NoAnswer);

    let verdict = match (algorithm, solution) {
        (AlgorithmClass::BfsTraversal, Solution::Traversal(_)) => match answer.as_sequence() {
            Some(seq) => verify_bfs(graph, start()?, seq),
            None => no_answer(),
        },
        (AlgorithmClass::DfsTraversal, Solution::Traversal(_)) => match answer.as_sequence() {
            Some(seq) => verify_dfs(graph, start()?, seq),
            None => no_answer(),
        },
        (AlgorithmClass::ShortestPath, Solution::Path { total_cost, .. }) => {
            let end = instance.end().ok_or(PuzzleError::MissingEnd { algorithm })?;
            match answer.as_sequence() {
                Some(seq) => verify_shortest_path(graph, start()?, end, *total_cost, seq),
                None => Verdict::from(Rejection::NoPath),
            }
        }
        (AlgorithmClass::SpanningTree, Solution::SpanningTree(canonical)) => {
            match answer.as_edges() {
                Some(edges) => {
                    verify_spanning_tree(graph, canonical, config.spanning_tree_policy, edges)
                }
                None => Verdict::from(Rejection::NoEdges),
            }
        }
        (AlgorithmClass::TourHeuristic, Solution::Tour { tour, total_weight }) => {
            match answer.as_sequence() {
                Some(seq) => verify_tour(graph, start()?, tour, *total_weight, seq),
                None => no_answer(),
            }
        }
        _ => return Err(PuzzleError::SolutionMismatch { algorithm }),
    };

    debug!(correct = verdict.is_correct, "answer verified");
    Ok(verdict)
}
