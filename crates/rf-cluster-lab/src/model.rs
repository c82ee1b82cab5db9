//! Validated, ready-to-spin game model

use rand::Rng;
use rand::distr::Distribution;
use rand::distr::weighted::WeightedIndex;

use crate::config::GameConfig;
use crate::error::{ConfigError, ConfigResult};
use crate::free_spins::{FreeSpinRunner, SessionPlan};
use crate::spin::{SpinEvaluator, SpinPhase};
use crate::weights::SymbolSampler;

/// A [`GameConfig`] that passed validation, with its samplers built.
///
/// Immutable once constructed; share it by reference across workers.
#[derive(Debug, Clone)]
pub struct GameModel {
    config: GameConfig,
    base: SymbolSampler,
    free: SymbolSampler,
    modes: WeightedIndex<u32>,
    retrigger_probability: f64,
}

impl GameModel {
    pub fn new(config: GameConfig) -> ConfigResult<Self> {
        config.validate()?;

        let base = SymbolSampler::new("base", &config.base_weights)?;
        let free = SymbolSampler::new("free_spins", &config.free_spin_weights)?;
        let modes = WeightedIndex::new(config.free_spins.modes.iter().map(|m| m.weight)).map_err(|e| {
            ConfigError::InvalidWeights {
                table: "free_spin_modes",
                reason: e.to_string(),
            }
        })?;
        let retrigger_probability = config.retrigger_probability();

        // Each spin adds p × bonus spins on average, so the session
        // length is stretched by 1 / (1 - p × bonus).
        let growth = 1.0 / (1.0 - retrigger_probability * config.free_spins.retrigger_spins as f64);
        log::debug!(
            "Game model '{}': {}x{} grid, retrigger p={:.5}, expected session length x{:.3}",
            config.name,
            config.grid.rows,
            config.grid.cols,
            retrigger_probability,
            growth
        );

        Ok(Self {
            config,
            base,
            free,
            modes,
            retrigger_probability,
        })
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Sampler for the given phase
    pub fn sampler(&self, phase: SpinPhase) -> &SymbolSampler {
        match phase {
            SpinPhase::Base => &self.base,
            SpinPhase::FreeSpins => &self.free,
        }
    }

    pub fn stake(&self) -> f64 {
        self.config.stake
    }

    /// Chance that one free spin retriggers
    pub fn retrigger_probability(&self) -> f64 {
        self.retrigger_probability
    }

    /// Pick a free spin mode by weight and fix its parameters
    pub fn select_mode<R: Rng + ?Sized>(&self, rng: &mut R) -> SessionPlan {
        let mode = &self.config.free_spins.modes[self.modes.sample(rng)];
        mode.plan(rng)
    }

    /// Fresh evaluator with its own scratch buffers
    pub fn spin_evaluator(&self) -> SpinEvaluator<'_> {
        SpinEvaluator::new(self)
    }

    /// Runner for one free spin session
    pub fn free_spin_runner(&self) -> FreeSpinRunner<'_> {
        FreeSpinRunner::new(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::free_spins::FreeSpinMode;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_new_rejects_invalid_config() {
        let config = GameConfig {
            stake: -1.0,
            ..GameConfig::quantum_cats()
        };
        assert!(matches!(GameModel::new(config), Err(ConfigError::InvalidStake(_))));
    }

    #[test]
    fn test_mode_selection_frequencies() {
        let model = GameModel::new(GameConfig::quantum_cats()).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(21);

        let mut counts = [0usize; 3];
        for _ in 0..30_000 {
            match model.select_mode(&mut rng).mode.as_str() {
                "Particle" => counts[0] += 1,
                "Wave" => counts[1] += 1,
                "Superposition" => counts[2] += 1,
                other => panic!("unexpected mode {}", other),
            }
        }
        for count in counts {
            let share = count as f64 / 30_000.0;
            assert!((share - 1.0 / 3.0).abs() < 0.02, "share = {}", share);
        }
    }

    #[test]
    fn test_zero_weight_mode_never_selected() {
        let mut wave = FreeSpinMode::wave();
        wave.weight = 0;
        let mut config = GameConfig::quantum_cats();
        config.free_spins.modes = vec![FreeSpinMode::particle(), wave];

        let model = GameModel::new(config).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(22);
        assert!((0..1000).all(|_| model.select_mode(&mut rng).mode == "Particle"));
    }

    #[test]
    fn test_superposition_plan_ranges() {
        let mut config = GameConfig::quantum_cats();
        config.free_spins.modes = vec![FreeSpinMode::superposition()];
        let model = GameModel::new(config).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(23);

        for _ in 0..1000 {
            let plan = model.select_mode(&mut rng);
            assert!((3..=20).contains(&plan.spins));
            assert!((1.0..=5.0).contains(&plan.start_multiplier));
            assert!((0.0..1.0).contains(&plan.multiplier_growth));
        }
    }

    #[test]
    fn test_samplers_follow_phase() {
        let model = GameModel::new(GameConfig::quantum_cats()).unwrap();
        assert_eq!(model.sampler(SpinPhase::Base).symbols().len(), 11);
        assert_eq!(model.sampler(SpinPhase::FreeSpins).symbols().len(), 11);
        assert_eq!(model.stake(), 1.0);
        assert!(model.retrigger_probability() > 0.0);
    }
}
