//! Error types for game configuration

use thiserror::Error;

use crate::symbols::Symbol;

/// Configuration errors.
///
/// All of these are terminal: a model that fails validation never runs a spin.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Weight table '{0}' is empty")]
    EmptyWeightTable(&'static str),

    #[error("Weight table '{0}' has zero total weight")]
    ZeroTotalWeight(&'static str),

    #[error("Invalid weight table '{table}': {reason}")]
    InvalidWeights { table: &'static str, reason: String },

    #[error("Invalid grid dimensions: {rows}x{cols}")]
    InvalidGrid { rows: u8, cols: u8 },

    #[error("Malformed grid: {0}")]
    MalformedGrid(String),

    #[error("Pay table is empty")]
    EmptyPayTable,

    #[error("Pay table for {0} has no tiers")]
    EmptyPayTiers(Symbol),

    #[error("Invalid payout for {symbol} at size {size}: {multiplier}")]
    InvalidPayout {
        symbol: Symbol,
        size: u32,
        multiplier: f64,
    },

    #[error("Symbol {0} cannot carry a pay table")]
    NonPayingSymbolInPayTable(Symbol),

    #[error("Invalid minimum cluster size: {0}")]
    InvalidClusterSize(u32),

    #[error("Invalid scatter trigger count: {0}")]
    InvalidScatterTrigger(u32),

    #[error("No free spin modes configured")]
    NoFreeSpinModes,

    #[error("Invalid free spin mode '{mode}': {reason}")]
    InvalidMode { mode: String, reason: String },

    #[error("Invalid probability for {name}: {value}")]
    InvalidProbability { name: &'static str, value: f64 },

    #[error("Invalid {name}: {value}")]
    InvalidValue { name: &'static str, value: f64 },

    #[error(
        "Free spin sessions are unbounded: retrigger probability {probability:.4} x {bonus} bonus spins >= 1"
    )]
    UnboundedFreeSpins { probability: f64, bonus: u32 },

    #[error("Invalid stake: {0}")]
    InvalidStake(f64),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;
