//! Spin evaluation — one grid, its clusters, scatters, and payout

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::cluster::{Cluster, ClusterEvaluator};
use crate::grid::Grid;
use crate::model::GameModel;
use crate::symbols::Symbol;

/// Which weight table and trigger rules apply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpinPhase {
    Base,
    FreeSpins,
}

/// Observer bonus: a winning spin is occasionally "observed" and its
/// payout amplified by a fixed factor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObserverBonus {
    /// Chance per winning spin
    pub probability: f64,
    /// Payout factor when it fires
    pub multiplier: f64,
}

impl Default for ObserverBonus {
    fn default() -> Self {
        Self {
            probability: 0.05,
            multiplier: 1.5,
        }
    }
}

/// Tumble (cascade) rules: winning cells vanish, columns fall, the grid
/// refills and is evaluated again.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TumbleConfig {
    pub enabled: bool,
    /// Maximum cascades after the initial evaluation
    pub max_steps: u32,
}

impl Default for TumbleConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            max_steps: 20,
        }
    }
}

/// One paying cluster
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterWin {
    pub symbol: Symbol,
    pub size: usize,
    /// Paytable multiplier for the size tier
    pub pay_multiplier: f64,
    /// pay multiplier × win multiplier × stake
    pub amount: f64,
    /// 0 for the initial grid, n for the n-th tumble
    pub tumble_step: u32,
}

/// Result of one evaluated spin
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpinOutcome {
    /// Total payout, win multiplier and observer bonus included
    pub payout: f64,
    pub scatter_count: u32,
    pub triggers_free_spins: bool,
    pub wins: Vec<ClusterWin>,
    pub tumbles: u32,
    pub observer_bonus: bool,
}

impl SpinOutcome {
    pub fn is_win(&self) -> bool {
        self.payout > 0.0
    }
}

/// Evaluates spins against a [`GameModel`].
///
/// Holds the cluster finder's scratch space, so keep one per worker.
pub struct SpinEvaluator<'m> {
    model: &'m GameModel,
    clusters: ClusterEvaluator,
}

impl<'m> SpinEvaluator<'m> {
    pub fn new(model: &'m GameModel) -> Self {
        Self {
            model,
            clusters: ClusterEvaluator::new(model.config().min_cluster_size),
        }
    }

    pub fn model(&self) -> &'m GameModel {
        self.model
    }

    /// Generate a fresh grid for `phase` and evaluate it
    pub fn spin<R: Rng + ?Sized>(&mut self, phase: SpinPhase, multiplier: f64, rng: &mut R) -> SpinOutcome {
        let grid = Grid::generate(self.model.config().grid, self.model.sampler(phase), rng);
        self.evaluate(grid, phase, multiplier, rng)
    }

    /// Evaluate a given grid, applying tumbles and the observer bonus when configured
    pub fn evaluate<R: Rng + ?Sized>(
        &mut self,
        mut grid: Grid,
        phase: SpinPhase,
        multiplier: f64,
        rng: &mut R,
    ) -> SpinOutcome {
        let config = self.model.config();
        let mut outcome = SpinOutcome::default();
        let mut removed = Vec::new();

        loop {
            let clusters = self.clusters.find_clusters(&grid);
            removed.clear();
            outcome.payout += self.score(&clusters, multiplier, outcome.tumbles, &mut outcome.wins, &mut removed);

            if !config.tumbles.enabled || removed.is_empty() || outcome.tumbles >= config.tumbles.max_steps {
                break;
            }
            grid.tumble(&removed, self.model.sampler(phase), rng);
            outcome.tumbles += 1;
        }

        self.finish(&grid, phase, &mut outcome);

        if let Some(observer) = config.observer_bonus {
            if outcome.payout > 0.0 && rng.random_bool(observer.probability) {
                outcome.payout *= observer.multiplier;
                outcome.observer_bonus = true;
            }
        }
        outcome
    }

    /// Evaluate a grid exactly as it stands: no tumbles, no observer bonus
    pub fn evaluate_static(&mut self, grid: &Grid, phase: SpinPhase, multiplier: f64) -> SpinOutcome {
        let clusters = self.clusters.find_clusters(grid);
        let mut outcome = SpinOutcome::default();
        let mut removed = Vec::new();
        outcome.payout = self.score(&clusters, multiplier, 0, &mut outcome.wins, &mut removed);
        self.finish(grid, phase, &mut outcome);
        outcome
    }

    /// Price clusters; paying cells are appended to `removed`
    fn score(
        &self,
        clusters: &[Cluster],
        multiplier: f64,
        tumble_step: u32,
        wins: &mut Vec<ClusterWin>,
        removed: &mut Vec<usize>,
    ) -> f64 {
        let config = self.model.config();
        let mut total = 0.0;
        for cluster in clusters {
            let pay_multiplier = config.paytable.resolve(cluster.symbol, cluster.size());
            if pay_multiplier <= 0.0 {
                continue;
            }
            let amount = pay_multiplier * multiplier * config.stake;
            total += amount;
            removed.extend_from_slice(&cluster.cells);
            wins.push(ClusterWin {
                symbol: cluster.symbol,
                size: cluster.size(),
                pay_multiplier,
                amount,
                tumble_step,
            });
        }
        total
    }

    fn finish(&self, grid: &Grid, phase: SpinPhase, outcome: &mut SpinOutcome) {
        let config = self.model.config();
        outcome.scatter_count = grid.count(Symbol::Scatter) as u32;
        outcome.triggers_free_spins =
            phase == SpinPhase::Base && outcome.scatter_count >= config.scatter_trigger_count;
    }
}
