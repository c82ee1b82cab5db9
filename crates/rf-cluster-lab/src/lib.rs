//! # rf-cluster-lab — Cluster-Pays Slot Math Engine
//!
//! Evaluates a 7×7 cluster-pays slot exactly: weighted symbol grids,
//! flood-fill cluster detection with wild substitution, tiered payouts,
//! and free-spin sessions with growing multipliers and a jackpot event.
//!
//! ## Architecture
//!
//! ```text
//! GameModel (validated GameConfig)
//!     │
//!     ├── SymbolSampler ×2 (base / free spins)
//!     ├── PayTable (symbol → size tiers)
//!     └── FreeSpinRules (modes, retrigger, jackpot)
//!           │
//!           v
//! SpinEvaluator ── Grid ── ClusterEvaluator ── PayTable
//!     │
//!     v
//! FreeSpinRunner → RoundOutcome
//! ```
//!
//! All randomness comes from an RNG passed in by the caller, so a fixed
//! seed always reproduces the same rounds.

pub mod cluster;
pub mod config;
pub mod error;
pub mod free_spins;
pub mod grid;
pub mod model;
pub mod paytable;
pub mod round;
pub mod spin;
pub mod symbols;
pub mod weights;

pub use cluster::*;
pub use config::*;
pub use error::*;
pub use free_spins::*;
pub use grid::*;
pub use model::*;
pub use paytable::*;
pub use round::*;
pub use spin::*;
pub use symbols::*;
pub use weights::*;
