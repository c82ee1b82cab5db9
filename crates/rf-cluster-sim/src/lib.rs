//! # rf-cluster-sim — Monte Carlo Simulator for Cluster-Pays Math
//!
//! Plays millions of independent rounds of an `rf-cluster-lab` game model
//! and reports RTP, hit rate, variance and the win distribution.
//!
//! ```text
//! SimConfig ──┐
//!             ├── Simulator ── rayon pool ── batch 0..k (own ChaCha8 stream)
//! GameModel ──┘                                   │
//!                                                 v
//!                         SimAccumulator (batch order merge) → SimulationResult
//! ```

pub mod config;
pub mod driver;
pub mod error;
pub mod stats;

pub use config::*;
pub use driver::*;
pub use error::*;
pub use stats::*;
