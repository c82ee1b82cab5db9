//! Weight tables and the weighted symbol sampler

use std::collections::BTreeMap;

use rand::Rng;
use rand::distr::Distribution;
use rand::distr::weighted::WeightedIndex;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};
use crate::symbols::Symbol;

/// Symbol → weight mapping. Probability of a symbol = weight / total weight.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WeightTable {
    weights: BTreeMap<Symbol, u32>,
}

impl WeightTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: set a symbol's weight
    pub fn with(mut self, symbol: Symbol, weight: u32) -> Self {
        self.set(symbol, weight);
        self
    }

    pub fn set(&mut self, symbol: Symbol, weight: u32) {
        self.weights.insert(symbol, weight);
    }

    /// Weight of a symbol (0 if absent)
    pub fn get(&self, symbol: Symbol) -> u32 {
        self.weights.get(&symbol).copied().unwrap_or(0)
    }

    /// Sum of all weights
    pub fn total(&self) -> u64 {
        self.weights.values().map(|&w| w as u64).sum()
    }

    /// Probability of drawing `symbol` on one cell (0 for an empty table)
    pub fn probability(&self, symbol: Symbol) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        self.get(symbol) as f64 / total as f64
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Symbol, u32)> + '_ {
        self.weights.iter().map(|(&s, &w)| (s, w))
    }

    /// Degenerate table that only ever yields `symbol`
    pub fn single(symbol: Symbol) -> Self {
        Self::new().with(symbol, 1)
    }

    /// Base game weights of the Quantum Cats math model
    pub fn quantum_cats_base() -> Self {
        Self::new()
            .with(Symbol::H1, 3)
            .with(Symbol::H2, 5)
            .with(Symbol::H3, 8)
            .with(Symbol::H4, 8)
            .with(Symbol::L1, 25)
            .with(Symbol::L2, 30)
            .with(Symbol::L3, 35)
            .with(Symbol::L4, 40)
            .with(Symbol::Wild, 8)
            .with(Symbol::Scatter, 3)
            .with(Symbol::Connector, 25)
    }

    /// Free spin weights of the Quantum Cats math model (richer in highs and wilds)
    pub fn quantum_cats_free_spins() -> Self {
        Self::new()
            .with(Symbol::H1, 6)
            .with(Symbol::H2, 10)
            .with(Symbol::H3, 12)
            .with(Symbol::H4, 12)
            .with(Symbol::L1, 22)
            .with(Symbol::L2, 25)
            .with(Symbol::L3, 28)
            .with(Symbol::L4, 32)
            .with(Symbol::Wild, 15)
            .with(Symbol::Scatter, 5)
            .with(Symbol::Connector, 28)
    }
}

/// Draws symbols in proportion to their weight.
///
/// Cumulative-weight binary search, O(log k) per draw. Zero-weight symbols
/// are never drawn.
#[derive(Debug, Clone)]
pub struct SymbolSampler {
    symbols: Vec<Symbol>,
    index: WeightedIndex<u32>,
}

impl SymbolSampler {
    /// Build a sampler; `table_name` only labels errors.
    pub fn new(table_name: &'static str, table: &WeightTable) -> ConfigResult<Self> {
        if table.is_empty() {
            return Err(ConfigError::EmptyWeightTable(table_name));
        }
        let total = table.total();
        if total == 0 {
            return Err(ConfigError::ZeroTotalWeight(table_name));
        }
        if total > u32::MAX as u64 {
            return Err(ConfigError::InvalidWeights {
                table: table_name,
                reason: format!("total weight {} overflows u32", total),
            });
        }

        let (symbols, weights): (Vec<Symbol>, Vec<u32>) =
            table.iter().filter(|&(_, w)| w > 0).unzip();

        let index = WeightedIndex::new(weights).map_err(|e| ConfigError::InvalidWeights {
            table: table_name,
            reason: e.to_string(),
        })?;

        Ok(Self { symbols, index })
    }

    /// Draw one symbol
    #[inline]
    pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> Symbol {
        self.symbols[self.index.sample(rng)]
    }

    /// Symbols with non-zero weight
    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_weight_table_total() {
        let table = WeightTable::quantum_cats_base();
        assert_eq!(table.total(), 190);
        assert_eq!(table.get(Symbol::L4), 40);
        assert!((table.probability(Symbol::Scatter) - 3.0 / 190.0).abs() < 1e-12);
    }

    #[test]
    fn test_empty_table_rejected() {
        let err = SymbolSampler::new("base", &WeightTable::new()).unwrap_err();
        assert!(matches!(err, ConfigError::EmptyWeightTable("base")));
    }

    #[test]
    fn test_zero_total_rejected() {
        let table = WeightTable::new().with(Symbol::H1, 0).with(Symbol::L1, 0);
        let err = SymbolSampler::new("free_spins", &table).unwrap_err();
        assert!(matches!(err, ConfigError::ZeroTotalWeight("free_spins")));
    }

    #[test]
    fn test_zero_weight_never_drawn() {
        let table = WeightTable::new().with(Symbol::H1, 0).with(Symbol::L1, 5);
        let sampler = SymbolSampler::new("base", &table).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        assert!((0..10_000).all(|_| sampler.draw(&mut rng) == Symbol::L1));
        assert_eq!(sampler.symbols(), &[Symbol::L1]);
    }

    #[test]
    fn test_frequencies_converge() {
        let table = WeightTable::quantum_cats_base();
        let sampler = SymbolSampler::new("base", &table).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(42);

        const DRAWS: usize = 200_000;
        let mut counts = [0usize; Symbol::COUNT];
        for _ in 0..DRAWS {
            counts[sampler.draw(&mut rng).index()] += 1;
        }

        // Chi-square goodness of fit, 10 degrees of freedom.
        // Critical value at p = 0.001 is 29.6.
        let chi_square: f64 = Symbol::ALL
            .iter()
            .map(|&s| {
                let expected = table.probability(s) * DRAWS as f64;
                let observed = counts[s.index()] as f64;
                (observed - expected).powi(2) / expected
            })
            .sum();
        assert!(chi_square < 35.0, "chi-square too large: {chi_square}");

        for &s in &Symbol::ALL {
            let freq = counts[s.index()] as f64 / DRAWS as f64;
            assert!((freq - table.probability(s)).abs() < 0.005, "{s}: {freq}");
        }
    }
}
