//! Free Spins — mode catalogue and the session runner
//!
//! A session walks `SelectingMode → Spinning → JackpotCheck → Done`:
//! - **SelectingMode**: pick a mode by weight and draw its randomized
//!   parameters once, producing an immutable [`SessionPlan`]
//! - **Spinning**: play free spins at a multiplier that grows every spin;
//!   a scatter trigger adds retrigger spins
//! - **JackpotCheck**: at a high enough multiplier, occasionally replay
//!   several parallel "universes" and pay the best one scaled by their count
//!
//! Sessions always end: the model rejects retrigger odds whose expected
//! session length diverges, and `max_session_spins` caps any single run.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::model::GameModel;
use crate::spin::{SpinEvaluator, SpinPhase};

// ═══════════════════════════════════════════════════════════════════════════════
// CONFIGURATION
// ═══════════════════════════════════════════════════════════════════════════════

/// Number of spins a mode awards
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpinCount {
    Fixed(u32),
    /// Uniform over `min..=max`
    Range { min: u32, max: u32 },
}

impl SpinCount {
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> u32 {
        match *self {
            SpinCount::Fixed(n) => n,
            SpinCount::Range { min, max } => rng.random_range(min..=max),
        }
    }

    pub fn mean(&self) -> f64 {
        match *self {
            SpinCount::Fixed(n) => n as f64,
            SpinCount::Range { min, max } => (min as f64 + max as f64) / 2.0,
        }
    }

    fn check(&self) -> Result<(), String> {
        match *self {
            SpinCount::Fixed(0) => Err("spin count must be positive".into()),
            SpinCount::Range { min, max } if min == 0 || min > max => {
                Err(format!("invalid spin range {}..={}", min, max))
            }
            _ => Ok(()),
        }
    }
}

/// A multiplier parameter (starting value or per-spin growth)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MultiplierParam {
    Fixed(f64),
    /// Whole number, uniform over `min..=max`
    Steps { min: u32, max: u32 },
    /// Uniform over `[min, max)`
    Uniform { min: f64, max: f64 },
}

impl MultiplierParam {
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        match *self {
            MultiplierParam::Fixed(v) => v,
            MultiplierParam::Steps { min, max } => rng.random_range(min..=max) as f64,
            MultiplierParam::Uniform { min, max } => min + rng.random::<f64>() * (max - min),
        }
    }

    fn check(&self) -> Result<(), String> {
        match *self {
            MultiplierParam::Fixed(v) if !v.is_finite() || v < 0.0 => {
                Err(format!("invalid multiplier {}", v))
            }
            MultiplierParam::Steps { min, max } if min > max => {
                Err(format!("invalid multiplier steps {}..={}", min, max))
            }
            MultiplierParam::Uniform { min, max }
                if !min.is_finite() || !max.is_finite() || min < 0.0 || min > max =>
            {
                Err(format!("invalid multiplier range [{}, {})", min, max))
            }
            _ => Ok(()),
        }
    }
}

/// A free spin mode variant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FreeSpinMode {
    pub name: String,
    /// Relative selection weight
    #[serde(default = "default_mode_weight")]
    pub weight: u32,
    pub spins: SpinCount,
    pub start_multiplier: MultiplierParam,
    pub multiplier_growth: MultiplierParam,
}

fn default_mode_weight() -> u32 {
    1
}

impl FreeSpinMode {
    /// Few spins, high start, fast growth
    pub fn particle() -> Self {
        Self {
            name: "Particle".into(),
            weight: 1,
            spins: SpinCount::Fixed(5),
            start_multiplier: MultiplierParam::Fixed(3.0),
            multiplier_growth: MultiplierParam::Fixed(1.0),
        }
    }

    /// Many spins, slow growth
    pub fn wave() -> Self {
        Self {
            name: "Wave".into(),
            weight: 1,
            spins: SpinCount::Fixed(15),
            start_multiplier: MultiplierParam::Fixed(1.0),
            multiplier_growth: MultiplierParam::Fixed(0.167),
        }
    }

    /// Everything randomized at selection time
    pub fn superposition() -> Self {
        Self {
            name: "Superposition".into(),
            weight: 1,
            spins: SpinCount::Range { min: 3, max: 20 },
            start_multiplier: MultiplierParam::Steps { min: 1, max: 5 },
            multiplier_growth: MultiplierParam::Uniform { min: 0.0, max: 1.0 },
        }
    }

    /// Draw the concrete parameters for one session
    pub fn plan<R: Rng + ?Sized>(&self, rng: &mut R) -> SessionPlan {
        SessionPlan {
            mode: self.name.clone(),
            spins: self.spins.sample(rng),
            start_multiplier: self.start_multiplier.sample(rng),
            multiplier_growth: self.multiplier_growth.sample(rng),
        }
    }

    /// Reason the mode is unusable, if any
    pub fn check(&self) -> Result<(), String> {
        self.spins.check()?;
        self.start_multiplier.check()?;
        self.multiplier_growth.check()
    }
}

/// Multiverse jackpot rules
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JackpotConfig {
    /// Multiplier the session must reach before the jackpot can fire
    pub multiplier_threshold: f64,
    /// Chance the jackpot fires once the threshold is reached
    pub probability: f64,
    /// Parallel universes evaluated; the best is paid × this count
    pub universes: u32,
}

impl Default for JackpotConfig {
    fn default() -> Self {
        Self {
            multiplier_threshold: 100.0,
            probability: 0.05,
            universes: 4,
        }
    }
}

/// Free spin rules
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FreeSpinRules {
    pub modes: Vec<FreeSpinMode>,
    /// Spins added when a free spin lands the scatter trigger count
    #[serde(default = "default_retrigger_spins")]
    pub retrigger_spins: u32,
    /// Hard cap on spins played in one session
    #[serde(default = "default_max_session_spins")]
    pub max_session_spins: u32,
    #[serde(default)]
    pub jackpot: Option<JackpotConfig>,
}

fn default_retrigger_spins() -> u32 {
    3
}

fn default_max_session_spins() -> u32 {
    10_000
}

impl Default for FreeSpinRules {
    fn default() -> Self {
        Self {
            modes: vec![
                FreeSpinMode::particle(),
                FreeSpinMode::wave(),
                FreeSpinMode::superposition(),
            ],
            retrigger_spins: default_retrigger_spins(),
            max_session_spins: default_max_session_spins(),
            jackpot: Some(JackpotConfig::default()),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// SESSION
// ═══════════════════════════════════════════════════════════════════════════════

/// Concrete parameters of one session, fixed once the mode is selected
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionPlan {
    pub mode: String,
    pub spins: u32,
    pub start_multiplier: f64,
    pub multiplier_growth: f64,
}

/// Session runner states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    SelectingMode,
    Spinning,
    JackpotCheck,
    Done,
}

/// Outcome of one free spin session
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FreeSpinSession {
    pub plan: SessionPlan,
    pub spins_played: u32,
    pub retriggers: u32,
    /// Multiplier after the last growth step
    pub final_multiplier: f64,
    /// Sum of all free spin payouts
    pub spin_win: f64,
    pub jackpot_triggered: bool,
    pub jackpot_win: f64,
    pub observer_bonuses: u32,
    pub tumbles: u32,
    /// Session stopped at `max_session_spins`
    pub capped: bool,
}

impl FreeSpinSession {
    pub fn total_win(&self) -> f64 {
        self.spin_win + self.jackpot_win
    }
}

/// Drives one free spin session through its states
pub struct FreeSpinRunner<'m> {
    model: &'m GameModel,
    state: SessionState,
    remaining: u32,
    session: FreeSpinSession,
}

impl<'m> FreeSpinRunner<'m> {
    /// Runner that starts by selecting a mode
    pub fn new(model: &'m GameModel) -> Self {
        Self {
            model,
            state: SessionState::SelectingMode,
            remaining: 0,
            session: FreeSpinSession::default(),
        }
    }

    /// Runner that skips mode selection and plays a given plan
    pub fn with_plan(model: &'m GameModel, plan: SessionPlan) -> Self {
        let mut runner = Self::new(model);
        runner.begin(plan);
        runner
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn remaining_spins(&self) -> u32 {
        self.remaining
    }

    pub fn session(&self) -> &FreeSpinSession {
        &self.session
    }

    /// Run to completion
    pub fn run<R: Rng + ?Sized>(
        mut self,
        evaluator: &mut SpinEvaluator<'_>,
        rng: &mut R,
    ) -> FreeSpinSession {
        while self.step(evaluator, rng) != SessionState::Done {}
        self.session
    }

    /// Advance one transition and return the new state
    pub fn step<R: Rng + ?Sized>(
        &mut self,
        evaluator: &mut SpinEvaluator<'_>,
        rng: &mut R,
    ) -> SessionState {
        match self.state {
            SessionState::SelectingMode => {
                let plan = self.model.select_mode(rng);
                self.begin(plan);
            }
            SessionState::Spinning => self.spin_once(evaluator, rng),
            SessionState::JackpotCheck => {
                self.check_jackpot(evaluator, rng);
                self.state = SessionState::Done;
            }
            SessionState::Done => {}
        }
        self.state
    }

    fn begin(&mut self, plan: SessionPlan) {
        self.remaining = plan.spins;
        self.session = FreeSpinSession {
            final_multiplier: plan.start_multiplier,
            plan,
            ..Default::default()
        };
        self.state = if self.remaining > 0 {
            SessionState::Spinning
        } else {
            SessionState::JackpotCheck
        };
    }

    fn spin_once<R: Rng + ?Sized>(&mut self, evaluator: &mut SpinEvaluator<'_>, rng: &mut R) {
        let config = self.model.config();
        let rules = &config.free_spins;

        let outcome = evaluator.spin(SpinPhase::FreeSpins, self.session.final_multiplier, rng);
        let session = &mut self.session;
        session.spins_played += 1;
        session.spin_win += outcome.payout;
        session.tumbles += outcome.tumbles;
        if outcome.observer_bonus {
            session.observer_bonuses += 1;
        }
        session.final_multiplier += session.plan.multiplier_growth;

        if outcome.scatter_count >= config.scatter_trigger_count {
            self.remaining = self.remaining.saturating_add(rules.retrigger_spins);
            session.retriggers += 1;
            log::trace!(
                "Retrigger in {} session: +{} spins ({} remaining)",
                session.plan.mode,
                rules.retrigger_spins,
                self.remaining
            );
        }
        self.remaining = self.remaining.saturating_sub(1);

        if self.remaining == 0 {
            self.state = SessionState::JackpotCheck;
        } else if session.spins_played >= rules.max_session_spins {
            session.capped = true;
            log::trace!(
                "{} session capped at {} spins with {} remaining",
                session.plan.mode,
                session.spins_played,
                self.remaining
            );
            self.state = SessionState::JackpotCheck;
        }
    }

    fn check_jackpot<R: Rng + ?Sized>(&mut self, evaluator: &mut SpinEvaluator<'_>, rng: &mut R) {
        let Some(jackpot) = self.model.config().free_spins.jackpot else {
            return;
        };
        let multiplier = self.session.final_multiplier;
        if multiplier < jackpot.multiplier_threshold || !rng.random_bool(jackpot.probability) {
            return;
        }

        let best = (0..jackpot.universes)
            .map(|_| evaluator.spin(SpinPhase::FreeSpins, multiplier, rng).payout)
            .fold(0.0, f64::max);

        self.session.jackpot_triggered = true;
        self.session.jackpot_win = best * jackpot.universes as f64;
        log::debug!(
            "Multiverse jackpot at x{:.2}: best universe {:.2}, award {:.2}",
            multiplier,
            best,
            self.session.jackpot_win
        );
    }
}
