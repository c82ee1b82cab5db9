//! Parallel batch driver
//!
//! A run of N rounds is cut into fixed-size batches. Each batch plays on a
//! rayon worker with its own ChaCha8 stream (root seed, stream = batch
//! index) and its own spin evaluator. Batches run in waves of at most
//! [`BATCHES_PER_WAVE`]; each wave's partial accumulators come back in batch
//! order and are merged sequentially before the next wave starts. A seed
//! gives the same result whatever the thread count, and memory stays flat
//! however many batches a run has.

use std::time::Instant;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;

use rf_cluster_lab::{GameConfig, GameModel, play_round};

use crate::config::SimConfig;
use crate::error::{SimError, SimResult};
use crate::stats::{SimAccumulator, SimulationResult};

/// Batches played in parallel before their partials are folded into the total
pub const BATCHES_PER_WAVE: u64 = 1024;

/// Monte Carlo simulator over a validated game model
#[derive(Debug)]
pub struct Simulator {
    model: GameModel,
    config: SimConfig,
}

impl Simulator {
    /// Validate both configs; fails before any spin is played
    pub fn new(game: GameConfig, config: SimConfig) -> SimResult<Self> {
        config.validate()?;
        let model = GameModel::new(game)?;
        Ok(Self { model, config })
    }

    pub fn from_model(model: GameModel, config: SimConfig) -> SimResult<Self> {
        config.validate()?;
        Ok(Self { model, config })
    }

    pub fn model(&self) -> &GameModel {
        &self.model
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Play every batch and return the finalized statistics
    pub fn run(&self) -> SimResult<SimulationResult> {
        let threads = self.config.resolved_threads();
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build()
            .map_err(|e| SimError::ThreadPool(e.to_string()))?;

        let batch_count = self.config.batch_count();
        log::info!(
            "Simulating {} rounds of '{}': {} batches of {} on {} threads (seed {})",
            self.config.spins,
            self.model.config().name,
            batch_count,
            self.config.batch_size,
            threads,
            self.config.seed
        );

        let start = Instant::now();
        let mut total = SimAccumulator::new();
        let mut first = 0;
        while first < batch_count {
            let end = batch_count.min(first.saturating_add(BATCHES_PER_WAVE));
            let partials: Vec<SimAccumulator> =
                pool.install(|| (first..end).into_par_iter().map(|index| self.run_batch(index)).collect());
            for partial in &partials {
                total.merge(partial);
            }
            log::trace!("Merged batches {}..{} of {}", first, end, batch_count);
            first = end;
        }

        let mut result = total.finalize()?;
        result.seed = self.config.seed;

        let elapsed = start.elapsed().as_secs_f64();
        log::info!(
            "Simulation complete in {:.2}s ({:.0} rounds/s): RTP {:.4}%, hit rate {:.2}%",
            elapsed,
            result.total_spins as f64 / elapsed.max(f64::EPSILON),
            result.rtp,
            result.hit_rate
        );
        Ok(result)
    }

    /// Play one batch on its own RNG stream
    pub fn run_batch(&self, index: u64) -> SimAccumulator {
        let first = index.saturating_mul(self.config.batch_size);
        let rounds = self
            .config
            .batch_size
            .min(self.config.spins.saturating_sub(first));

        let mut rng = ChaCha8Rng::seed_from_u64(self.config.seed);
        rng.set_stream(index);

        let stake = self.model.stake();
        let mut evaluator = self.model.spin_evaluator();
        let mut acc = SimAccumulator::new();
        for _ in 0..rounds {
            let round = play_round(&mut evaluator, &mut rng);
            acc.record(&round, stake);
        }

        log::debug!(
            "Batch {} done: {} rounds, won {:.2}, {} free spin triggers",
            index,
            acc.spins,
            acc.won,
            acc.free_spins_triggered
        );
        acc
    }
}

/// Validate, run, and finalize in one call
pub fn simulate(game: GameConfig, config: SimConfig) -> SimResult<SimulationResult> {
    Simulator::new(game, config)?.run()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_batch_is_partial() {
        let sim = Simulator::new(
            GameConfig::quantum_cats(),
            SimConfig::new(2_500, 1).with_batch_size(1_000).with_threads(1),
        )
        .unwrap();
        assert_eq!(sim.run_batch(0).spins, 1_000);
        assert_eq!(sim.run_batch(2).spins, 500);
        assert_eq!(sim.run_batch(3).spins, 0);
    }

    #[test]
    fn test_batches_use_distinct_streams() {
        let sim = Simulator::new(
            GameConfig::quantum_cats(),
            SimConfig::new(4_000, 3).with_batch_size(2_000).with_threads(1),
        )
        .unwrap();
        assert_ne!(sim.run_batch(0), sim.run_batch(1));
        assert_eq!(sim.run_batch(1), sim.run_batch(1));
    }

    #[test]
    fn test_waves_merge_in_batch_order() {
        // Tiny batches spread the run over three waves.
        let spins = 2 * BATCHES_PER_WAVE + 300;
        let config = SimConfig::new(spins, 9).with_batch_size(1);
        assert_eq!(config.batch_count(), spins);

        let one = Simulator::new(GameConfig::quantum_cats(), config.clone().with_threads(1)).unwrap();
        let four = Simulator::new(GameConfig::quantum_cats(), config.with_threads(4)).unwrap();

        let mut sequential = SimAccumulator::new();
        for index in 0..spins {
            sequential.merge(&one.run_batch(index));
        }
        let expected = {
            let mut result = sequential.finalize().unwrap();
            result.seed = 9;
            result
        };

        assert_eq!(one.run().unwrap(), expected);
        assert_eq!(four.run().unwrap(), expected);
    }

    #[test]
    fn test_invalid_configs_fail_before_running() {
        assert!(matches!(
            Simulator::new(GameConfig::quantum_cats(), SimConfig::new(0, 1)),
            Err(SimError::InvalidSpinCount(0))
        ));

        let game = GameConfig {
            stake: 0.0,
            ..GameConfig::quantum_cats()
        };
        assert!(matches!(
            Simulator::new(game, SimConfig::new(10, 1)),
            Err(SimError::Config(_))
        ));
    }
}
