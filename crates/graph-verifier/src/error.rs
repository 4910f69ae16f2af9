//! Error types for malformed puzzles.
//!
//! A [`PuzzleError`] means the puzzle itself could not be solved or judged.
//! It never describes a wrong player answer: those become an incorrect
//! [`crate::Verdict`] instead.

use thiserror::Error;

use crate::puzzle::{AlgorithmClass, NodeId};

/// Errors raised while validating a puzzle or dispatching a solution.
#[non_exhaustive]
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum PuzzleError {
    /// The puzzle has no nodes.
    #[error("puzzle contains no nodes")]
    EmptyGraph,
    /// The same node identifier was listed twice.
    #[error("node \"{node}\" is listed more than once")]
    DuplicateNode {
        /// The repeated identifier.
        node: NodeId,
    },
    /// An edge, start or end referenced a node that is not in the node list.
    #[error("{context} references unknown node \"{node}\"")]
    UnknownNode {
        /// The identifier that could not be resolved.
        node: NodeId,
        /// Where the reference came from, e.g. `edge A-Z`.
        context: String,
    },
    /// The edge weights are too large for any path, tree or tour sum to be
    /// represented.
    #[error("edge weights sum past {limit}; no cost could be computed safely")]
    WeightOverflow {
        /// Largest total edge weight a graph may carry.
        limit: u64,
    },
    /// An edge connected a node to itself.
    #[error("edge on \"{node}\" is a self-loop")]
    SelfLoop {
        /// The node carrying the loop.
        node: NodeId,
    },
    /// The algorithm requires a start node but the puzzle has none.
    #[error("{algorithm} puzzles require a start node")]
    MissingStart {
        /// Class that needed the start node.
        algorithm: AlgorithmClass,
    },
    /// The algorithm requires an end node but the puzzle has none.
    #[error("{algorithm} puzzles require an end node")]
    MissingEnd {
        /// Class that needed the end node.
        algorithm: AlgorithmClass,
    },
    /// The algorithm tag is not one of the supported classes.
    #[error("unknown algorithm type \"{0}\"")]
    UnknownAlgorithm(String),
    /// A canonical solution of another class was handed to the verifier.
    #[error("canonical solution does not belong to a {algorithm} puzzle")]
    SolutionMismatch {
        /// Class of the puzzle being verified.
        algorithm: AlgorithmClass,
    },
}

impl PuzzleError {
    /// Returns a stable, machine-readable error code for the variant.
    #[must_use]
    pub const fn code(&self) -> PuzzleErrorCode {
        match self {
            Self::EmptyGraph => PuzzleErrorCode::EmptyGraph,
            Self::DuplicateNode { .. } => PuzzleErrorCode::DuplicateNode,
            Self::UnknownNode { .. } => PuzzleErrorCode::UnknownNode,
            Self::SelfLoop { .. } => PuzzleErrorCode::SelfLoop,
            Self::WeightOverflow { .. } => PuzzleErrorCode::WeightOverflow,
            Self::MissingStart { .. } => PuzzleErrorCode::MissingStart,
            Self::MissingEnd { .. } => PuzzleErrorCode::MissingEnd,
            Self::UnknownAlgorithm(_) => PuzzleErrorCode::UnknownAlgorithm,
            Self::SolutionMismatch { .. } => PuzzleErrorCode::SolutionMismatch,
        }
    }
}

/// Machine-readable codes for [`PuzzleError`].
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum PuzzleErrorCode {
    /// The puzzle has no nodes.
    EmptyGraph,
    /// A node identifier was repeated.
    DuplicateNode,
    /// A reference to a node outside the node list.
    UnknownNode,
    /// An edge from a node to itself.
    SelfLoop,
    /// Edge weights too large to sum.
    WeightOverflow,
    /// Start node required but absent.
    MissingStart,
    /// End node required but absent.
    MissingEnd,
    /// Unsupported algorithm tag.
    UnknownAlgorithm,
    /// Canonical solution of the wrong class.
    SolutionMismatch,
}

impl PuzzleErrorCode {
    /// Returns the symbolic identifier used in logs and CLI output.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::EmptyGraph => "EMPTY_GRAPH",
            Self::DuplicateNode => "DUPLICATE_NODE",
            Self::UnknownNode => "UNKNOWN_NODE",
            Self::SelfLoop => "SELF_LOOP",
            Self::WeightOverflow => "WEIGHT_OVERFLOW",
            Self::MissingStart => "MISSING_START",
            Self::MissingEnd => "MISSING_END",
            Self::UnknownAlgorithm => "UNKNOWN_ALGORITHM",
            Self::SolutionMismatch => "SOLUTION_MISMATCH",
        }
    }
}
