//! CLI entry point for the graph verifier.
//!
//! Usage:
//!   graph-verifier solve <puzzle.json>
//!   graph-verifier solve --stdin
//!   graph-verifier verify <submission.json> [--accept-any-minimum-tree]
//!   graph-verifier verify --stdin [--accept-any-minimum-tree]
//!   graph-verifier complete-edges --node A --node B --node C [options]
//!
//! A submission is `{"puzzle": {...}, "playerAnswer": ...}`.
//!
//! Exit codes: 0 correct (or success), 1 incorrect or unsolvable,
//! 2 unreadable or malformed input.

mod logging;

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error, info};

use graph_verifier::{
    complete_edges, judge, solve, AlgorithmClass, Judgement, NodeId, PlayerAnswer, Puzzle,
    PuzzleError, Solution, SpanningTreePolicy, VerifierConfig,
};

#[derive(Parser)]
#[command(name = "graph-verifier")]
#[command(about = "Solver and answer verifier for graph algorithm puzzles")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute the canonical solution of a puzzle
    Solve {
        /// Path to puzzle JSON file (use --stdin to read from stdin)
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,

        /// Read puzzle from stdin instead of file
        #[arg(long)]
        stdin: bool,
    },
    /// Judge a player's answer to a puzzle
    Verify {
        /// Path to submission JSON file (use --stdin to read from stdin)
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,

        /// Read submission from stdin instead of file
        #[arg(long)]
        stdin: bool,

        /// Accept any minimum spanning tree, not only the canonical one
        #[arg(long)]
        accept_any_minimum_tree: bool,
    },
    /// Generate a complete graph's edges with random weights
    CompleteEdges {
        /// Node identifier (repeat for each node)
        #[arg(long = "node", value_name = "ID", required = true)]
        nodes: Vec<String>,

        /// Smallest edge weight
        #[arg(long, default_value = "1")]
        min_weight: u64,

        /// Largest edge weight
        #[arg(long, default_value = "10")]
        max_weight: u64,

        /// Seed for reproducible weights
        #[arg(long)]
        seed: Option<u64>,
    },
}

#[derive(Debug, Error)]
enum CliError {
    #[error("must provide either a file path or --stdin")]
    NoInput,
    #[error("failed to read {source_name}: {source}")]
    Io {
        source_name: String,
        #[source]
        source: io::Error,
    },
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid puzzle [{code}]: {0}", code = .0.code().as_str())]
    Puzzle(#[from] PuzzleError),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Submission {
    puzzle: Puzzle,
    #[serde(default, alias = "userAnswer")]
    player_answer: PlayerAnswer,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SolveOutput {
    algorithm: AlgorithmClass,
    solvable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    solution: Option<Solution>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VerificationOutput {
    is_correct: bool,
    solvable: bool,
    feedback: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    correct_solution: Option<Solution>,
}

/// Outcome of a command: what to print and how to exit.
struct Report {
    json: String,
    success: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match logging::init_logging() {
        Ok(format) => debug!(%format, "logging ready"),
        Err(err) => {
            eprintln!("Error: {err}");
            return ExitCode::from(2);
        }
    }

    match run(cli.command) {
        Ok(report) => {
            println!("{}", report.json);
            if report.success {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(1)
            }
        }
        Err(err) => {
            error!(%err, "command failed");
            eprintln!("Error: {err}");
            ExitCode::from(2)
        }
    }
}

fn run(command: Commands) -> Result<Report, CliError> {
    match command {
        Commands::Solve { file, stdin } => {
            let puzzle: Puzzle = serde_json::from_str(&read_input(file, stdin)?)?;
            let instance = puzzle.instance()?;
            let solution = solve(&instance)?;
            let output = SolveOutput {
                algorithm: instance.algorithm(),
                solvable: solution.is_some(),
                solution,
            };
            Ok(Report {
                success: output.solvable,
                json: serde_json::to_string_pretty(&output)?,
            })
        }
        Commands::Verify {
            file,
            stdin,
            accept_any_minimum_tree,
        } => {
            let submission: Submission = serde_json::from_str(&read_input(file, stdin)?)?;
            let config = VerifierConfig {
                spanning_tree_policy: if accept_any_minimum_tree {
                    SpanningTreePolicy::AnyMinimum
                } else {
                    SpanningTreePolicy::CanonicalOnly
                },
            };

            let output = match judge(&submission.puzzle, &submission.player_answer, &config)? {
                Judgement::Judged { verdict, solution } => VerificationOutput {
                    is_correct: verdict.is_correct,
                    solvable: true,
                    feedback: verdict.feedback,
                    correct_solution: Some(solution),
                },
                Judgement::Unsolvable { reason } => VerificationOutput {
                    is_correct: false,
                    solvable: false,
                    feedback: reason,
                    correct_solution: None,
                },
            };
            info!(correct = output.is_correct, "verification finished");
            Ok(Report {
                success: output.is_correct,
                json: serde_json::to_string_pretty(&output)?,
            })
        }
        Commands::CompleteEdges {
            nodes,
            min_weight,
            max_weight,
            seed,
        } => {
            let nodes: Vec<NodeId> = nodes.into_iter().map(NodeId::from).collect();
            let mut rng = match seed {
                Some(seed) => SmallRng::seed_from_u64(seed),
                None => SmallRng::from_entropy(),
            };
            let edges = complete_edges(&nodes, min_weight..=max_weight, &mut rng);
            Ok(Report {
                success: true,
                json: serde_json::to_string_pretty(&edges)?,
            })
        }
    }
}

fn read_input(file: Option<PathBuf>, stdin: bool) -> Result<String, CliError> {
    if stdin {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .map_err(|source| CliError::Io {
                source_name: "stdin".to_string(),
                source,
            })?;
        Ok(buffer)
    } else if let Some(path) = file {
        fs::read_to_string(&path).map_err(|source| CliError::Io {
            source_name: path.display().to_string(),
            source,
        })
    } else {
        Err(CliError::NoInput)
    }
}
