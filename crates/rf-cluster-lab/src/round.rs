//! One paid round: a base spin plus any free spin session it triggers

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::free_spins::FreeSpinSession;
use crate::spin::{SpinEvaluator, SpinOutcome, SpinPhase};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoundOutcome {
    pub base: SpinOutcome,
    pub free_spins: Option<FreeSpinSession>,
    /// Base payout plus free spin and jackpot winnings
    pub payout: f64,
}

impl RoundOutcome {
    pub fn triggered_free_spins(&self) -> bool {
        self.free_spins.is_some()
    }

    /// Payout as a multiple of `stake`
    pub fn win_multiple(&self, stake: f64) -> f64 {
        if stake > 0.0 { self.payout / stake } else { 0.0 }
    }
}

/// Play one round
pub fn play_round<R: Rng + ?Sized>(evaluator: &mut SpinEvaluator<'_>, rng: &mut R) -> RoundOutcome {
    let base = evaluator.spin(SpinPhase::Base, 1.0, rng);
    let mut payout = base.payout;

    let free_spins = if base.triggers_free_spins {
        let session = evaluator.model().free_spin_runner().run(evaluator, rng);
        payout += session.total_win();
        Some(session)
    } else {
        None
    };

    RoundOutcome {
        base,
        free_spins,
        payout,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::free_spins::{FreeSpinMode, MultiplierParam, SpinCount};
    use crate::model::GameModel;
    use crate::symbols::Symbol;
    use crate::weights::WeightTable;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_base_only_round() {
        let config = GameConfig {
            base_weights: WeightTable::single(Symbol::H2),
            observer_bonus: None,
            ..GameConfig::quantum_cats()
        };
        let model = GameModel::new(config).unwrap();
        let mut evaluator = model.spin_evaluator();
        let mut rng = ChaCha8Rng::seed_from_u64(31);

        let round = play_round(&mut evaluator, &mut rng);
        assert!(!round.triggered_free_spins());
        assert_eq!(round.payout, 35.0);
        assert_eq!(round.win_multiple(1.0), 35.0);
    }

    #[test]
    fn test_triggered_round_adds_session() {
        // Base grids are all scatters, free spin grids all L1 (4x at 15+).
        let mut config = GameConfig {
            base_weights: WeightTable::single(Symbol::Scatter),
            free_spin_weights: WeightTable::single(Symbol::L1),
            observer_bonus: None,
            ..GameConfig::quantum_cats()
        };
        config.free_spins.jackpot = None;
        config.free_spins.modes = vec![FreeSpinMode {
            name: "Flat".into(),
            weight: 1,
            spins: SpinCount::Fixed(3),
            start_multiplier: MultiplierParam::Fixed(2.0),
            multiplier_growth: MultiplierParam::Fixed(0.0),
        }];
        let model = GameModel::new(config).unwrap();
        let mut evaluator = model.spin_evaluator();
        let mut rng = ChaCha8Rng::seed_from_u64(32);

        let round = play_round(&mut evaluator, &mut rng);
        assert_eq!(round.base.payout, 0.0);
        assert_eq!(round.base.scatter_count, 49);

        let session = round.free_spins.as_ref().unwrap();
        assert_eq!(session.spins_played, 3);
        assert_eq!(session.retriggers, 0);
        assert_eq!(round.payout, 3.0 * 4.0 * 2.0);
    }
}
