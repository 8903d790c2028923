use std::path::PathBuf;

use thiserror::Error;

/// Fatal configuration errors. Everything here is detected before or during
/// startup and aborts the run; protocol artifacts of the simulated network
/// (stale, duplicate, reordered messages) are never surfaced as errors.
#[derive(Debug, Error)]
pub enum SimError {
    #[error("cannot read topology file {path}: {source}")]
    ReadTopology {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("malformed topology file: {0}")]
    ParseTopology(#[from] toml::de::Error),

    #[error(
        "topology declares {nodes} nodes but the population budget is \
         {honest} honest + {adversarial} adversarial"
    )]
    PopulationMismatch {
        nodes: usize,
        honest: usize,
        adversarial: usize,
    },

    #[error("population budget is empty, set --good-nodes and/or --bad-nodes")]
    EmptyPopulation,

    #[error("nomination budgets exhausted before every node was served")]
    BudgetExhausted,

    #[error("message relay closed before the round completed")]
    RelayClosed,
}
