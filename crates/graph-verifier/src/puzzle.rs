//! Puzzle representation types that match the puzzle store's JSON format.
//!
//! These types deserialize directly from the documents the game backend
//! stores (camelCase keys, nodes given either as bare identifiers or as
//! records carrying layout coordinates).

use std::borrow::Borrow;
use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString, VariantArray};

use crate::error::PuzzleError;
use crate::graph::Graph;

/// Opaque node identifier.
///
/// Ordered by plain string order, which is the order neighbors are visited
/// in by the traversal solvers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for NodeId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for NodeId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl Borrow<str> for NodeId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A node as it appears in a puzzle document.
///
/// Coordinates are layout metadata for the UI and never influence solving.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NodeSpec {
    Id(NodeId),
    Record {
        id: NodeId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        x: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        y: Option<f64>,
    },
}

impl NodeSpec {
    pub fn id(&self) -> &NodeId {
        match self {
            NodeSpec::Id(id) => id,
            NodeSpec::Record { id, .. } => id,
        }
    }
}

impl From<&str> for NodeSpec {
    fn from(value: &str) -> Self {
        NodeSpec::Id(NodeId::from(value))
    }
}

fn default_weight() -> u64 {
    1
}

/// An undirected, weighted edge.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edge {
    pub from: NodeId,
    pub to: NodeId,
    /// Unweighted puzzles omit the weight; it counts as 1.
    #[serde(default = "default_weight")]
    pub weight: u64,
}

impl Edge {
    pub fn new(from: impl Into<NodeId>, to: impl Into<NodeId>, weight: u64) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            weight,
        }
    }

    /// Undirected identity: endpoints in ascending order plus the weight.
    pub fn key(&self) -> (&NodeId, &NodeId, u64) {
        if self.from <= self.to {
            (&self.from, &self.to, self.weight)
        } else {
            (&self.to, &self.from, self.weight)
        }
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}({})", self.from, self.to, self.weight)
    }
}

/// The closed set of puzzle classes.
///
/// The primary tags are the ones the puzzle store uses; the descriptive
/// spellings are accepted as aliases.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, AsRefStr, EnumString,
    VariantArray,
)]
#[serde(try_from = "String")]
pub enum AlgorithmClass {
    #[serde(rename = "dijkstra")]
    #[strum(to_string = "dijkstra", serialize = "shortest-path")]
    ShortestPath,
    #[serde(rename = "bfs")]
    #[strum(to_string = "bfs", serialize = "bfs-traversal")]
    BfsTraversal,
    #[serde(rename = "dfs")]
    #[strum(to_string = "dfs", serialize = "dfs-traversal")]
    DfsTraversal,
    #[serde(rename = "mst")]
    #[strum(to_string = "mst", serialize = "spanning-tree")]
    SpanningTree,
    #[serde(rename = "tsp")]
    #[strum(to_string = "tsp", serialize = "tour")]
    TourHeuristic,
}

impl AlgorithmClass {
    /// Whether puzzles of this class must name a start node.
    pub fn needs_start(self) -> bool {
        !matches!(self, AlgorithmClass::SpanningTree)
    }

    /// Whether puzzles of this class must name an end node.
    pub fn needs_end(self) -> bool {
        matches!(self, AlgorithmClass::ShortestPath)
    }
}

impl TryFrom<String> for AlgorithmClass {
    type Error = PuzzleError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        AlgorithmClass::from_str(value.trim()).map_err(|_| PuzzleError::UnknownAlgorithm(value))
    }
}

/// The complete puzzle document
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Puzzle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "algorithmType")]
    pub algorithm: AlgorithmClass,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<String>,
    pub nodes: Vec<NodeSpec>,
    #[serde(default)]
    pub edges: Vec<Edge>,
    #[serde(default)]
    pub start_node: Option<NodeId>,
    #[serde(default)]
    pub end_node: Option<NodeId>,
}

impl Puzzle {
    pub fn new(algorithm: AlgorithmClass, nodes: Vec<NodeSpec>, edges: Vec<Edge>) -> Self {
        Self {
            id: None,
            algorithm,
            difficulty: None,
            nodes,
            edges,
            start_node: None,
            end_node: None,
        }
    }

    pub fn with_start(mut self, start: impl Into<NodeId>) -> Self {
        self.start_node = Some(start.into());
        self
    }

    pub fn with_end(mut self, end: impl Into<NodeId>) -> Self {
        self.end_node = Some(end.into());
        self
    }

    /// Validate the document and build its graph.
    pub fn instance(&self) -> Result<Instance, PuzzleError> {
        let ids: Vec<NodeId> = self.nodes.iter().map(|n| n.id().clone()).collect();
        let graph = Graph::build(&ids, &self.edges)?;

        let start = resolve(&graph, self.start_node.as_ref(), "start node")?;
        let end = resolve(&graph, self.end_node.as_ref(), "end node")?;

        if self.algorithm.needs_start() && start.is_none() {
            return Err(PuzzleError::MissingStart {
                algorithm: self.algorithm,
            });
        }
        if self.algorithm.needs_end() && end.is_none() {
            return Err(PuzzleError::MissingEnd {
                algorithm: self.algorithm,
            });
        }

        Ok(Instance {
            algorithm: self.algorithm,
            graph,
            start,
            end,
        })
    }
}

fn resolve(
    graph: &Graph,
    node: Option<&NodeId>,
    context: &str,
) -> Result<Option<usize>, PuzzleError> {
    match node {
        None => Ok(None),
        Some(id) => graph
            .index_of(id.as_str())
            .map(Some)
            .ok_or_else(|| PuzzleError::UnknownNode {
                node: id.clone(),
                context: context.to_string(),
            }),
    }
}

/// A validated puzzle: the graph is built and every required endpoint
/// resolved to a node index.
///
/// Only [`Puzzle::instance`] builds one, so `start` and `end` are always
/// node indices of `graph`.
#[derive(Debug, Clone)]
pub struct Instance {
    algorithm: AlgorithmClass,
    graph: Graph,
    start: Option<usize>,
    end: Option<usize>,
}

impl Instance {
    pub fn algorithm(&self) -> AlgorithmClass {
        self.algorithm
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// Start node index; present whenever the class needs one.
    pub fn start(&self) -> Option<usize> {
        self.start
    }

    /// End node index; present for shortest-path puzzles.
    pub fn end(&self) -> Option<usize> {
        self.end
    }
}

/// An untrusted answer as submitted by a player.
///
/// Anything that does not fit one of the expected shapes lands in
/// `Unrecognized` so the verifier can reject it instead of failing to parse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PlayerAnswer {
    Sequence(Vec<NodeId>),
    Edges(Vec<Edge>),
    Path { path: Vec<NodeId> },
    Unrecognized(serde_json::Value),
}

impl PlayerAnswer {
    /// Node sequence for traversal, path and tour answers.
    pub fn as_sequence(&self) -> Option<&[NodeId]> {
        match self {
            PlayerAnswer::Sequence(nodes) => Some(nodes),
            PlayerAnswer::Path { path } => Some(path),
            _ => None,
        }
    }

    /// Edge list for spanning-tree answers. An empty array parses as an
    /// empty sequence and is treated as an empty edge list.
    pub fn as_edges(&self) -> Option<&[Edge]> {
        match self {
            PlayerAnswer::Edges(edges) => Some(edges),
            PlayerAnswer::Sequence(nodes) if nodes.is_empty() => Some(&[]),
            _ => None,
        }
    }
}

impl Default for PlayerAnswer {
    fn default() -> Self {
        PlayerAnswer::Unrecognized(serde_json::Value::Null)
    }
}

/// Generate one edge per unordered pair of nodes with a random weight.
///
/// Pairs are emitted in input order (`i < j`). A reversed weight range is
/// read as its normalised form.
pub fn complete_edges<R: Rng>(
    nodes: &[NodeId],
    weights: RangeInclusive<u64>,
    rng: &mut R,
) -> Vec<Edge> {
    let (lo, hi) = if weights.start() <= weights.end() {
        (*weights.start(), *weights.end())
    } else {
        (*weights.end(), *weights.start())
    };

    let mut edges = Vec::with_capacity(nodes.len() * nodes.len().saturating_sub(1) / 2);
    for (i, from) in nodes.iter().enumerate() {
        for to in &nodes[i + 1..] {
            edges.push(Edge::new(from.clone(), to.clone(), rng.gen_range(lo..=hi)));
        }
    }
    edges
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;
    use serde_json::json;

    #[test]
    fn test_nodes_accept_bare_ids_and_records() {
        let nodes: Vec<NodeSpec> =
            serde_json::from_value(json!(["A", {"id": "B", "x": 10.0, "y": 4.5}, {"id": "C"}]))
                .unwrap();
        let ids: Vec<&str> = nodes.iter().map(|n| n.id().as_str()).collect();
        assert_eq!(ids, ["A", "B", "C"]);
    }

    #[test]
    fn test_edge_weight_defaults_to_one() {
        let edge: Edge = serde_json::from_value(json!({"from": "A", "to": "B"})).unwrap();
        assert_eq!(edge.weight, 1);
    }

    #[test]
    fn test_edge_key_is_undirected() {
        let a = Edge::new("B", "A", 3);
        let b = Edge::new("A", "B", 3);
        assert_eq!(a.key(), b.key());
        assert_ne!(a.key(), Edge::new("A", "B", 4).key());
    }

    #[test]
    fn test_algorithm_tags() {
        assert_eq!(AlgorithmClass::from_str("dijkstra").unwrap(), AlgorithmClass::ShortestPath);
        assert_eq!(AlgorithmClass::from_str("tour").unwrap(), AlgorithmClass::TourHeuristic);
        assert_eq!(AlgorithmClass::SpanningTree.to_string(), "mst");

        let parsed: AlgorithmClass = serde_json::from_value(json!("bfs")).unwrap();
        assert_eq!(parsed, AlgorithmClass::BfsTraversal);
        assert_eq!(serde_json::to_value(parsed).unwrap(), json!("bfs"));

        for class in AlgorithmClass::VARIANTS {
            assert_eq!(AlgorithmClass::from_str(class.as_ref()).unwrap(), *class);
        }
    }

    #[test]
    fn test_unknown_algorithm_is_rejected() {
        let err = AlgorithmClass::try_from("astar".to_string()).unwrap_err();
        assert_eq!(err, PuzzleError::UnknownAlgorithm("astar".to_string()));

        let parsed: Result<Puzzle, _> =
            serde_json::from_value(json!({"algorithmType": "astar", "nodes": ["A"]}));
        assert!(parsed.unwrap_err().to_string().contains("unknown algorithm type"));
    }

    #[test]
    fn test_puzzle_document() {
        let puzzle: Puzzle = serde_json::from_value(json!({
            "algorithmType": "dijkstra",
            "difficulty": "easy",
            "nodes": [{"id": "A", "x": 0, "y": 0}, {"id": "B", "x": 1, "y": 0}],
            "edges": [{"from": "A", "to": "B", "weight": 4}],
            "startNode": "A",
            "endNode": "B"
        }))
        .unwrap();

        let instance = puzzle.instance().unwrap();
        assert_eq!(instance.algorithm(), AlgorithmClass::ShortestPath);
        assert_eq!(instance.start(), Some(0));
        assert_eq!(instance.end(), Some(1));
    }

    #[test]
    fn test_instance_requires_endpoints() {
        let nodes = vec![NodeSpec::from("A"), NodeSpec::from("B")];
        let edges = vec![Edge::new("A", "B", 1)];

        let missing_start = Puzzle::new(AlgorithmClass::BfsTraversal, nodes.clone(), edges.clone());
        assert!(matches!(
            missing_start.instance(),
            Err(PuzzleError::MissingStart { .. })
        ));

        let missing_end =
            Puzzle::new(AlgorithmClass::ShortestPath, nodes.clone(), edges.clone()).with_start("A");
        assert!(matches!(missing_end.instance(), Err(PuzzleError::MissingEnd { .. })));

        let unknown_start = Puzzle::new(AlgorithmClass::TourHeuristic, nodes.clone(), edges.clone())
            .with_start("Q");
        assert!(matches!(
            unknown_start.instance(),
            Err(PuzzleError::UnknownNode { .. })
        ));

        let tree = Puzzle::new(AlgorithmClass::SpanningTree, nodes, edges);
        assert!(tree.instance().is_ok());
    }

    #[test]
    fn test_instance_endpoints_index_the_graph() {
        let nodes = vec![NodeSpec::from("A"), NodeSpec::from("B"), NodeSpec::from("C")];
        let instance = Puzzle::new(AlgorithmClass::ShortestPath, nodes, vec![])
            .with_start("C")
            .with_end("B")
            .instance()
            .unwrap();

        let graph = instance.graph();
        for node in [instance.start(), instance.end()].into_iter().flatten() {
            assert!(node < graph.len());
        }
        assert_eq!(instance.start().map(|n| graph.id(n).as_str()), Some("C"));
        assert_eq!(instance.end().map(|n| graph.id(n).as_str()), Some("B"));
    }

    #[test]
    fn test_player_answer_shapes() {
        let seq: PlayerAnswer = serde_json::from_value(json!(["A", "B"])).unwrap();
        assert_eq!(seq.as_sequence().map(|s| s.len()), Some(2));

        let path: PlayerAnswer = serde_json::from_value(json!({"path": ["A", "C"]})).unwrap();
        assert_eq!(path.as_sequence().map(|s| s.len()), Some(2));

        let edges: PlayerAnswer =
            serde_json::from_value(json!([{"from": "A", "to": "B", "weight": 2}])).unwrap();
        assert_eq!(edges.as_edges().map(|e| e.len()), Some(1));
        assert!(edges.as_sequence().is_none());

        let empty: PlayerAnswer = serde_json::from_value(json!([])).unwrap();
        assert_eq!(empty.as_edges().map(|e| e.len()), Some(0));

        let junk: PlayerAnswer = serde_json::from_value(json!({"nodes": 7})).unwrap();
        assert!(matches!(junk, PlayerAnswer::Unrecognized(_)));
        assert!(junk.as_sequence().is_none() && junk.as_edges().is_none());
    }

    #[test]
    fn test_complete_edges() {
        let nodes: Vec<NodeId> = ["A", "B", "C", "D"].into_iter().map(NodeId::from).collect();
        let mut rng = SmallRng::seed_from_u64(7);

        let edges = complete_edges(&nodes, 9..=2, &mut rng);
        assert_eq!(edges.len(), 6);
        assert!(edges.iter().all(|e| (2..=9).contains(&e.weight)));
        assert_eq!((edges[0].from.as_str(), edges[0].to.as_str()), ("A", "B"));
        assert_eq!((edges[5].from.as_str(), edges[5].to.as_str()), ("C", "D"));
    }
}
