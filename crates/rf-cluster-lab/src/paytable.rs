//! Cluster paytable and payout resolution

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};
use crate::symbols::Symbol;

/// Size tiers for one symbol: minimum cluster size → stake multiplier
pub type PayTiers = BTreeMap<u32, f64>;

/// Symbol → size tiers.
///
/// A cluster pays the tier with the highest threshold not exceeding its size.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PayTable {
    symbols: BTreeMap<Symbol, PayTiers>,
}

impl PayTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: set the tiers of one symbol
    pub fn with(mut self, symbol: Symbol, tiers: &[(u32, f64)]) -> Self {
        self.symbols.insert(symbol, tiers.iter().copied().collect());
        self
    }

    /// Multiplier for a cluster of `size` anchored on `symbol` (0 if none applies)
    pub fn resolve(&self, symbol: Symbol, size: usize) -> f64 {
        let Some(tiers) = self.symbols.get(&symbol) else {
            return 0.0;
        };
        let size = u32::try_from(size).unwrap_or(u32::MAX);
        tiers
            .range(..=size)
            .next_back()
            .map(|(_, &multiplier)| multiplier)
            .unwrap_or(0.0)
    }

    pub fn tiers(&self, symbol: Symbol) -> Option<&PayTiers> {
        self.symbols.get(&symbol)
    }

    /// Multiplier of the largest tier, i.e. the best a symbol can pay
    pub fn top_multiplier(&self, symbol: Symbol) -> f64 {
        self.symbols
            .get(&symbol)
            .and_then(|t| t.values().next_back().copied())
            .unwrap_or(0.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Symbol, &PayTiers)> + '_ {
        self.symbols.iter().map(|(&s, t)| (s, t))
    }

    pub fn validate(&self) -> ConfigResult<()> {
        for (&symbol, tiers) in &self.symbols {
            if !symbol.is_paying() {
                return Err(ConfigError::NonPayingSymbolInPayTable(symbol));
            }
            if tiers.is_empty() {
                return Err(ConfigError::EmptyPayTiers(symbol));
            }
            for (&size, &multiplier) in tiers {
                if size == 0 || !multiplier.is_finite() || multiplier < 0.0 {
                    return Err(ConfigError::InvalidPayout {
                        symbol,
                        size,
                        multiplier,
                    });
                }
            }
        }
        Ok(())
    }

    /// Quantum Cats cluster pays (tiers 5, 6, 7, 8, 9, 10, 15+)
    pub fn quantum_cats() -> Self {
        const SIZES: [u32; 7] = [5, 6, 7, 8, 9, 10, 15];
        let rows: [(Symbol, [f64; 7]); 8] = [
            (Symbol::H1, [2.0, 3.0, 5.0, 8.0, 15.0, 25.0, 50.0]),
            (Symbol::H2, [1.5, 2.0, 3.0, 5.0, 10.0, 18.0, 35.0]),
            (Symbol::H3, [1.0, 1.5, 2.0, 3.0, 6.0, 12.0, 25.0]),
            (Symbol::H4, [1.0, 1.5, 2.0, 3.0, 6.0, 12.0, 25.0]),
            (Symbol::L1, [0.5, 0.6, 0.8, 1.0, 1.5, 2.0, 4.0]),
            (Symbol::L2, [0.4, 0.5, 0.6, 0.8, 1.2, 1.8, 3.5]),
            (Symbol::L3, [0.3, 0.4, 0.5, 0.6, 1.0, 1.5, 3.0]),
            (Symbol::L4, [0.2, 0.3, 0.4, 0.5, 0.8, 1.2, 2.5]),
        ];

        let symbols = rows
            .into_iter()
            .map(|(symbol, pays)| (symbol, SIZES.into_iter().zip(pays).collect::<PayTiers>()))
            .collect();
        Self { symbols }
    }
}
