//! Game configuration: presets, validation, and JSON/YAML loading

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::cluster::DEFAULT_MIN_CLUSTER_SIZE;
use crate::error::{ConfigError, ConfigResult};
use crate::free_spins::FreeSpinRules;
use crate::grid::GridSpec;
use crate::paytable::PayTable;
use crate::spin::{ObserverBonus, TumbleConfig};
use crate::symbols::Symbol;
use crate::weights::{SymbolSampler, WeightTable};

// ═══════════════════════════════════════════════════════════════════════════════
// GAME CONFIG
// ═══════════════════════════════════════════════════════════════════════════════

/// Complete math definition of a cluster-pays game.
///
/// Missing fields in a config file fall back to the Quantum Cats preset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub name: String,
    pub grid: GridSpec,
    /// Symbol weights for base game grids
    pub base_weights: WeightTable,
    /// Symbol weights for free spin grids
    pub free_spin_weights: WeightTable,
    pub paytable: PayTable,
    /// Smallest cluster that can pay
    pub min_cluster_size: u32,
    /// Scatters needed to trigger (base) or retrigger (free spins)
    pub scatter_trigger_count: u32,
    pub free_spins: FreeSpinRules,
    /// `None` disables the observer bonus
    pub observer_bonus: Option<ObserverBonus>,
    pub tumbles: TumbleConfig,
    /// Bet per base spin; payouts are multiples of it
    pub stake: f64,
}

impl GameConfig {
    /// Quantum Cats: 7×7, three free spin modes, multiverse jackpot
    pub fn quantum_cats() -> Self {
        Self {
            name: "Quantum Cats".into(),
            grid: GridSpec::square_7x7(),
            base_weights: WeightTable::quantum_cats_base(),
            free_spin_weights: WeightTable::quantum_cats_free_spins(),
            paytable: PayTable::quantum_cats(),
            min_cluster_size: DEFAULT_MIN_CLUSTER_SIZE,
            scatter_trigger_count: 3,
            free_spins: FreeSpinRules::default(),
            observer_bonus: Some(ObserverBonus::default()),
            tumbles: TumbleConfig::default(),
            stake: 1.0,
        }
    }

    /// Quantum Cats with cascading wins (up to 20 tumbles). Free spins do
    /// not retrigger, which keeps the session length fixed by the mode.
    pub fn quantum_cats_cascading() -> Self {
        let mut config = Self {
            name: "Quantum Cats (Cascading)".into(),
            ..Self::quantum_cats()
        }
        .with_tumbles(20);
        config.free_spins.retrigger_spins = 0;
        config
    }

    /// Builder: enable cascading wins
    pub fn with_tumbles(mut self, max_steps: u32) -> Self {
        self.tumbles = TumbleConfig {
            enabled: true,
            max_steps,
        };
        self
    }

    /// Builder: set the stake
    pub fn with_stake(mut self, stake: f64) -> Self {
        self.stake = stake;
        self
    }

    /// Check everything a [`GameModel`](crate::model::GameModel) relies on
    pub fn validate(&self) -> ConfigResult<()> {
        self.grid.validate()?;
        SymbolSampler::new("base", &self.base_weights)?;
        SymbolSampler::new("free_spins", &self.free_spin_weights)?;

        if self.paytable.iter().next().is_none() {
            return Err(ConfigError::EmptyPayTable);
        }
        self.paytable.validate()?;

        if self.min_cluster_size == 0 {
            return Err(ConfigError::InvalidClusterSize(self.min_cluster_size));
        }
        if self.scatter_trigger_count == 0 {
            return Err(ConfigError::InvalidScatterTrigger(self.scatter_trigger_count));
        }
        if !self.stake.is_finite() || self.stake <= 0.0 {
            return Err(ConfigError::InvalidStake(self.stake));
        }

        self.validate_free_spins()?;

        if let Some(observer) = self.observer_bonus {
            check_probability("observer_bonus.probability", observer.probability)?;
            check_non_negative("observer_bonus.multiplier", observer.multiplier)?;
        }

        let probability = self.retrigger_probability();
        let bonus = self.free_spins.retrigger_spins;
        if probability * bonus as f64 >= 1.0 {
            return Err(ConfigError::UnboundedFreeSpins { probability, bonus });
        }
        Ok(())
    }

    fn validate_free_spins(&self) -> ConfigResult<()> {
        let rules = &self.free_spins;
        if rules.modes.is_empty() {
            return Err(ConfigError::NoFreeSpinModes);
        }
        for mode in &rules.modes {
            mode.check().map_err(|reason| ConfigError::InvalidMode {
                mode: mode.name.clone(),
                reason,
            })?;
        }
        if rules.modes.iter().all(|m| m.weight == 0) {
            return Err(ConfigError::ZeroTotalWeight("free_spin_modes"));
        }
        if rules.max_session_spins == 0 {
            return Err(ConfigError::InvalidValue {
                name: "max_session_spins",
                value: 0.0,
            });
        }
        if let Some(jackpot) = rules.jackpot {
            check_probability("jackpot.probability", jackpot.probability)?;
            check_non_negative("jackpot.multiplier_threshold", jackpot.multiplier_threshold)?;
            if jackpot.universes == 0 {
                return Err(ConfigError::InvalidValue {
                    name: "jackpot.universes",
                    value: 0.0,
                });
            }
        }
        Ok(())
    }

    /// Symbols one spin can draw: the initial fill, plus a full refill per tumble
    pub fn draws_per_spin(&self) -> u32 {
        let cells = self.grid.cells() as u32;
        if self.tumbles.enabled {
            cells.saturating_mul(self.tumbles.max_steps.saturating_add(1))
        } else {
            cells
        }
    }

    /// Chance that a single free spin lands the scatter trigger count.
    ///
    /// With tumbles on this is an upper bound: the settled grid holds a
    /// subset of everything drawn during the cascade.
    pub fn retrigger_probability(&self) -> f64 {
        let p = self.free_spin_weights.probability(Symbol::Scatter);
        binomial_tail(self.draws_per_spin(), p, self.scatter_trigger_count)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Loading
    // ─────────────────────────────────────────────────────────────────────────

    pub fn from_json(json: &str) -> ConfigResult<Self> {
        serde_json::from_str(json).map_err(|e| ConfigError::Parse(format!("JSON: {}", e)))
    }

    pub fn from_yaml(yaml: &str) -> ConfigResult<Self> {
        serde_yml::from_str(yaml).map_err(|e| ConfigError::Parse(format!("YAML: {}", e)))
    }

    /// Load by extension: `.yaml`/`.yml` as YAML, anything else as JSON
    pub fn from_path(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let is_yaml = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("yaml") || e.eq_ignore_ascii_case("yml"));

        let config = if is_yaml {
            Self::from_yaml(&text)?
        } else {
            Self::from_json(&text)?
        };
        log::info!("Loaded game config '{}' from {}", config.name, path.display());
        Ok(config)
    }

    pub fn to_json(&self) -> ConfigResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::quantum_cats()
    }
}

fn check_probability(name: &'static str, value: f64) -> ConfigResult<()> {
    if !(0.0..=1.0).contains(&value) {
        return Err(ConfigError::InvalidProbability { name, value });
    }
    Ok(())
}

fn check_non_negative(name: &'static str, value: f64) -> ConfigResult<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(ConfigError::InvalidValue { name, value });
    }
    Ok(())
}

/// P(X >= k) for X ~ Binomial(n, p)
pub fn binomial_tail(n: u32, p: f64, k: u32) -> f64 {
    if k == 0 {
        return 1.0;
    }
    if k > n || p <= 0.0 {
        return 0.0;
    }
    if p >= 1.0 {
        return 1.0;
    }

    // The pmf recurrence runs in log space: (1 - p)^n underflows on large grids.
    let log_ratio = p.ln() - (-p).ln_1p();
    let next = |log_pmf: f64, i: u32| log_pmf + ((n - i) as f64 / (i + 1) as f64).ln() + log_ratio;
    let mut log_pmf = n as f64 * (-p).ln_1p();

    if k as f64 <= n as f64 * p {
        let mut below = 0.0;
        for i in 0..k {
            below += log_pmf.exp();
            log_pmf = next(log_pmf, i);
        }
        return (1.0 - below).clamp(0.0, 1.0);
    }

    // Above the mean the upper tail is summed directly; its terms only shrink.
    for i in 0..k {
        log_pmf = next(log_pmf, i);
    }
    let mut above = 0.0;
    for i in k..=n {
        let term = log_pmf.exp();
        above += term;
        if term < above * f64::EPSILON || i == n {
            break;
        }
        log_pmf = next(log_pmf, i);
    }
    above.clamp(0.0, 1.0)
}
