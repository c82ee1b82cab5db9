//! Error types for simulation runs

use rf_cluster_lab::ConfigError;
use thiserror::Error;

/// Simulation errors.
///
/// Every variant is raised before the first spin; a started run always completes.
#[derive(Error, Debug)]
pub enum SimError {
    #[error("Game configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid spin count: {0} (must be positive)")]
    InvalidSpinCount(u64),

    #[error("Invalid batch size: {0} (must be positive)")]
    InvalidBatchSize(u64),

    #[error("Invalid thread count: {0} (must be positive)")]
    InvalidThreadCount(usize),

    #[error("Thread pool error: {0}")]
    ThreadPool(String),

    #[error("Cannot finalize a run with no spins")]
    EmptyRun,

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for simulation operations
pub type SimResult<T> = Result<T, SimError>;
