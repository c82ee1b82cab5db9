//! Full-run properties of the batch simulator

use approx::assert_relative_eq;
use rf_cluster_lab::{GameConfig, Symbol, WeightTable};
use rf_cluster_sim::{SimConfig, SimError, Simulator, WinBucket, simulate};

fn quick(spins: u64, seed: u64) -> SimConfig {
    SimConfig::new(spins, seed).with_batch_size(5_000)
}

#[test]
fn test_same_seed_same_result() {
    let a = simulate(GameConfig::quantum_cats(), quick(20_000, 42)).unwrap();
    let b = simulate(GameConfig::quantum_cats(), quick(20_000, 42)).unwrap();
    assert_eq!(a, b);

    let c = simulate(GameConfig::quantum_cats(), quick(20_000, 43)).unwrap();
    assert_ne!(a.total_won, c.total_won);
}

#[test]
fn test_thread_count_does_not_change_result() {
    let one = simulate(GameConfig::quantum_cats(), quick(30_000, 7).with_threads(1)).unwrap();
    let four = simulate(GameConfig::quantum_cats(), quick(30_000, 7).with_threads(4)).unwrap();
    assert_eq!(one, four);
}

#[test]
fn test_aggregate_identities() {
    let result = simulate(GameConfig::quantum_cats(), quick(25_000, 11)).unwrap();

    assert_eq!(result.total_spins, 25_000);
    assert_eq!(result.rtp, result.total_won / result.total_wagered * 100.0);
    let bucket_sum: u64 = result.win_distribution.iter().map(|b| b.count).sum();
    assert_eq!(bucket_sum, result.total_spins);
    assert_eq!(result.win_distribution.len(), WinBucket::COUNT);
    assert_relative_eq!(
        result.base_game_won + result.free_spins_won,
        result.total_won,
        max_relative = 1e-9
    );
    assert_relative_eq!(result.std_dev * result.std_dev, result.variance, max_relative = 1e-9);
    assert!(result.hit_rate > 0.0 && result.hit_rate < 100.0);
    assert!(result.max_win >= result.mean_win);
    assert_eq!(result.seed, 11);
}

#[test]
fn test_single_symbol_game_is_exact() {
    let game = GameConfig {
        base_weights: WeightTable::single(Symbol::H1),
        observer_bonus: None,
        ..GameConfig::quantum_cats()
    };
    let result = simulate(game, quick(12_345, 1)).unwrap();

    // Every round is a full H1 grid paying 50x and never triggers.
    assert_eq!(result.rtp, 5000.0);
    assert_eq!(result.hit_rate, 100.0);
    assert_eq!(result.variance, 0.0);
    assert_eq!(result.max_win, 50.0);
    assert_eq!(result.free_spins_triggered, 0);
    assert_eq!(result.bucket(WinBucket::UpTo100), 12_345);
}

#[test]
fn test_stake_scales_wager_not_rtp() {
    let game = GameConfig {
        base_weights: WeightTable::single(Symbol::L3),
        observer_bonus: None,
        stake: 0.5,
        ..GameConfig::quantum_cats()
    };
    let result = simulate(game, quick(1_000, 2)).unwrap();
    assert_eq!(result.total_wagered, 500.0);
    assert_eq!(result.max_win, 1.5);
    assert_relative_eq!(result.rtp, 300.0, epsilon = 1e-9);
    assert_eq!(result.bucket(WinBucket::UpTo5), 1_000);
}

#[test]
fn test_zero_spins_rejected() {
    assert!(matches!(
        simulate(GameConfig::quantum_cats(), SimConfig::new(0, 1)),
        Err(SimError::InvalidSpinCount(0))
    ));
}

#[test]
fn test_config_errors_surface() {
    let game = GameConfig {
        base_weights: WeightTable::new(),
        ..GameConfig::quantum_cats()
    };
    let err = Simulator::new(game, SimConfig::new(10, 1)).unwrap_err();
    assert!(matches!(err, SimError::Config(_)));
    assert!(err.to_string().contains("empty"));
}

#[test]
fn test_reference_game_statistics_are_sane() {
    let result = simulate(GameConfig::quantum_cats(), quick(100_000, 2024)).unwrap();

    assert!(result.free_spins_triggered > 0);
    assert!(result.free_spins_played >= result.free_spins_triggered * 3);
    assert_eq!(result.capped_sessions, 0);
    assert!(result.rtp > 0.0);
    assert!(result.std_dev > 0.0);
}
