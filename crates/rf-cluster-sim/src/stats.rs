//! Run statistics: per-batch accumulators and the finalized result
//!
//! Accumulators keep the round count, the running mean and M2 (sum of
//! squared deviations) next to plain totals. Partial accumulators combine
//! with Chan's parallel formula, so RTP and variance are derived once from
//! the merged state instead of averaging per-batch figures.

use serde::{Deserialize, Serialize};

use rf_cluster_lab::RoundOutcome;

use crate::error::{SimError, SimResult};

// ═══════════════════════════════════════════════════════════════════════════════
// WIN BUCKETS
// ═══════════════════════════════════════════════════════════════════════════════

/// Win-multiple ranges for the distribution histogram
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WinBucket {
    Zero,
    UpTo1,
    UpTo5,
    UpTo20,
    UpTo100,
    UpTo500,
    Over500,
}

impl WinBucket {
    pub const COUNT: usize = 7;

    pub const ALL: [WinBucket; Self::COUNT] = [
        WinBucket::Zero,
        WinBucket::UpTo1,
        WinBucket::UpTo5,
        WinBucket::UpTo20,
        WinBucket::UpTo100,
        WinBucket::UpTo500,
        WinBucket::Over500,
    ];

    /// Bucket for a payout expressed as a multiple of stake
    pub fn classify(multiple: f64) -> Self {
        match multiple {
            m if m <= 0.0 => WinBucket::Zero,
            m if m < 1.0 => WinBucket::UpTo1,
            m if m < 5.0 => WinBucket::UpTo5,
            m if m < 20.0 => WinBucket::UpTo20,
            m if m < 100.0 => WinBucket::UpTo100,
            m if m < 500.0 => WinBucket::UpTo500,
            _ => WinBucket::Over500,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            WinBucket::Zero => "0x",
            WinBucket::UpTo1 => "0.01-1x",
            WinBucket::UpTo5 => "1-5x",
            WinBucket::UpTo20 => "5-20x",
            WinBucket::UpTo100 => "20-100x",
            WinBucket::UpTo500 => "100-500x",
            WinBucket::Over500 => "500x+",
        }
    }

    pub fn index(&self) -> usize {
        *self as usize
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// ACCUMULATOR
// ═══════════════════════════════════════════════════════════════════════════════

/// Running statistics for a batch (or a merged set of batches)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SimAccumulator {
    pub spins: u64,
    pub wagered: f64,
    pub won: f64,
    pub base_won: f64,
    pub free_spins_won: f64,
    pub hits: u64,
    pub max_win: f64,
    /// Running mean of per-round payout
    mean: f64,
    /// Sum of squared deviations from the running mean
    m2: f64,
    pub buckets: [u64; WinBucket::COUNT],
    pub free_spins_triggered: u64,
    pub free_spins_played: u64,
    pub retriggers: u64,
    pub jackpots: u64,
    pub observer_bonuses: u64,
    pub tumbles: u64,
    pub capped_sessions: u64,
}

impl SimAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one round in
    pub fn record(&mut self, round: &RoundOutcome, stake: f64) {
        let payout = round.payout;

        self.spins += 1;
        self.wagered += stake;
        self.won += payout;
        self.base_won += round.base.payout;
        if payout > 0.0 {
            self.hits += 1;
        }
        if payout > self.max_win {
            self.max_win = payout;
        }
        self.buckets[WinBucket::classify(round.win_multiple(stake)).index()] += 1;

        // Welford
        let delta = payout - self.mean;
        self.mean += delta / self.spins as f64;
        self.m2 += delta * (payout - self.mean);

        if round.base.observer_bonus {
            self.observer_bonuses += 1;
        }
        self.tumbles += round.base.tumbles as u64;

        if let Some(session) = &round.free_spins {
            self.free_spins_triggered += 1;
            self.free_spins_won += session.total_win();
            self.free_spins_played += session.spins_played as u64;
            self.retriggers += session.retriggers as u64;
            self.observer_bonuses += session.observer_bonuses as u64;
            self.tumbles += session.tumbles as u64;
            if session.jackpot_triggered {
                self.jackpots += 1;
            }
            if session.capped {
                self.capped_sessions += 1;
            }
        }
    }

    /// Combine another accumulator into this one (Chan et al.)
    pub fn merge(&mut self, other: &SimAccumulator) {
        if other.spins == 0 {
            return;
        }
        if self.spins == 0 {
            *self = other.clone();
            return;
        }

        let n_a = self.spins as f64;
        let n_b = other.spins as f64;
        let n = n_a + n_b;
        let delta = other.mean - self.mean;
        self.mean += delta * n_b / n;
        self.m2 += other.m2 + delta * delta * n_a * n_b / n;

        self.spins += other.spins;
        self.wagered += other.wagered;
        self.won += other.won;
        self.base_won += other.base_won;
        self.free_spins_won += other.free_spins_won;
        self.hits += other.hits;
        self.max_win = self.max_win.max(other.max_win);
        for (bucket, count) in self.buckets.iter_mut().zip(other.buckets) {
            *bucket += count;
        }
        self.free_spins_triggered += other.free_spins_triggered;
        self.free_spins_played += other.free_spins_played;
        self.retriggers += other.retriggers;
        self.jackpots += other.jackpots;
        self.observer_bonuses += other.observer_bonuses;
        self.tumbles += other.tumbles;
        self.capped_sessions += other.capped_sessions;
    }

    /// Mean per-round payout so far
    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// Population variance of per-round payout so far
    pub fn variance(&self) -> f64 {
        if self.spins == 0 {
            0.0
        } else {
            self.m2 / self.spins as f64
        }
    }

    /// Derive the final figures
    pub fn finalize(&self) -> SimResult<SimulationResult> {
        if self.spins == 0 || self.wagered <= 0.0 {
            return Err(SimError::EmptyRun);
        }
        let n = self.spins as f64;
        let variance = self.variance();

        Ok(SimulationResult {
            total_spins: self.spins,
            total_wagered: self.wagered,
            total_won: self.won,
            rtp: self.won / self.wagered * 100.0,
            hit_rate: self.hits as f64 / n * 100.0,
            max_win: self.max_win,
            win_distribution: WinBucket::ALL
                .iter()
                .map(|b| BucketCount {
                    label: b.label().to_string(),
                    count: self.buckets[b.index()],
                })
                .collect(),
            free_spins_triggered: self.free_spins_triggered,
            variance,
            std_dev: variance.sqrt(),
            mean_win: self.mean,
            base_game_won: self.base_won,
            free_spins_won: self.free_spins_won,
            free_spins_played: self.free_spins_played,
            trigger_rate: self.free_spins_triggered as f64 / n * 100.0,
            retriggers: self.retriggers,
            jackpots: self.jackpots,
            observer_bonuses: self.observer_bonuses,
            tumbles: self.tumbles,
            capped_sessions: self.capped_sessions,
            seed: 0,
        })
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// RESULT
// ═══════════════════════════════════════════════════════════════════════════════

/// One histogram bar
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketCount {
    pub label: String,
    pub count: u64,
}

/// Finalized statistics of a completed run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    pub total_spins: u64,
    pub total_wagered: f64,
    pub total_won: f64,
    /// Return to player, percent
    pub rtp: f64,
    /// Rounds with a payout, percent
    pub hit_rate: f64,
    /// Largest single-round payout
    pub max_win: f64,
    /// Histogram by win multiple, in bucket order
    pub win_distribution: Vec<BucketCount>,
    pub free_spins_triggered: u64,
    /// Population variance of per-round payout
    pub variance: f64,
    pub std_dev: f64,

    pub mean_win: f64,
    pub base_game_won: f64,
    pub free_spins_won: f64,
    pub free_spins_played: u64,
    /// Rounds that triggered free spins, percent
    pub trigger_rate: f64,
    pub retriggers: u64,
    pub jackpots: u64,
    pub observer_bonuses: u64,
    pub tumbles: u64,
    /// Sessions stopped by the spin cap
    pub capped_sessions: u64,
    /// Root seed of the run
    pub seed: u64,
}

impl SimulationResult {
    /// Count in a given bucket
    pub fn bucket(&self, bucket: WinBucket) -> u64 {
        self.win_distribution
            .get(bucket.index())
            .map(|b| b.count)
            .unwrap_or(0)
    }
}
