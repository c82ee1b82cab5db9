//! Symbol definitions

use std::fmt;

use serde::{Deserialize, Serialize};

/// Symbol classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SymbolKind {
    /// High paying theme symbol
    High,
    /// Low paying theme symbol
    Low,
    /// Wild - substitutes for any paying symbol inside a cluster
    Wild,
    /// Scatter - counted anywhere, triggers free spins
    Scatter,
    /// Entanglement connector - never pays, never joins a cluster
    Connector,
}

/// A grid symbol. Identity only, no payload.
///
/// Serialized by its two-letter code (`"H1"`, `"WD"`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Symbol {
    #[serde(rename = "H1")]
    H1 = 0,
    #[serde(rename = "H2")]
    H2 = 1,
    #[serde(rename = "H3")]
    H3 = 2,
    #[serde(rename = "H4")]
    H4 = 3,
    #[serde(rename = "L1")]
    L1 = 4,
    #[serde(rename = "L2")]
    L2 = 5,
    #[serde(rename = "L3")]
    L3 = 6,
    #[serde(rename = "L4")]
    L4 = 7,
    #[serde(rename = "WD")]
    Wild = 8,
    #[serde(rename = "SC")]
    Scatter = 9,
    #[serde(rename = "EN")]
    Connector = 10,
}

impl Symbol {
    /// Number of distinct symbols
    pub const COUNT: usize = 11;

    /// Every symbol, in declaration order
    pub const ALL: [Symbol; Self::COUNT] = [
        Symbol::H1,
        Symbol::H2,
        Symbol::H3,
        Symbol::H4,
        Symbol::L1,
        Symbol::L2,
        Symbol::L3,
        Symbol::L4,
        Symbol::Wild,
        Symbol::Scatter,
        Symbol::Connector,
    ];

    /// Symbols that can anchor a cluster
    pub const PAYING: [Symbol; 8] = [
        Symbol::H1,
        Symbol::H2,
        Symbol::H3,
        Symbol::H4,
        Symbol::L1,
        Symbol::L2,
        Symbol::L3,
        Symbol::L4,
    ];

    pub fn kind(self) -> SymbolKind {
        match self {
            Symbol::H1 | Symbol::H2 | Symbol::H3 | Symbol::H4 => SymbolKind::High,
            Symbol::L1 | Symbol::L2 | Symbol::L3 | Symbol::L4 => SymbolKind::Low,
            Symbol::Wild => SymbolKind::Wild,
            Symbol::Scatter => SymbolKind::Scatter,
            Symbol::Connector => SymbolKind::Connector,
        }
    }

    /// Dense index, usable for per-symbol arrays
    pub fn index(self) -> usize {
        self as usize
    }

    /// Two-letter code
    pub fn code(self) -> &'static str {
        match self {
            Symbol::H1 => "H1",
            Symbol::H2 => "H2",
            Symbol::H3 => "H3",
            Symbol::H4 => "H4",
            Symbol::L1 => "L1",
            Symbol::L2 => "L2",
            Symbol::L3 => "L3",
            Symbol::L4 => "L4",
            Symbol::Wild => "WD",
            Symbol::Scatter => "SC",
            Symbol::Connector => "EN",
        }
    }

    /// Theme name
    pub fn name(self) -> &'static str {
        match self {
            Symbol::H1 => "Superposition Cat",
            Symbol::H2 => "Observer Cat",
            Symbol::H3 => "Entangled Cat A",
            Symbol::H4 => "Entangled Cat B",
            Symbol::L1 => "Electron",
            Symbol::L2 => "Proton",
            Symbol::L3 => "Neutron",
            Symbol::L4 => "Photon",
            Symbol::Wild => "Wild",
            Symbol::Scatter => "Scatter",
            Symbol::Connector => "Entanglement",
        }
    }

    /// Can this symbol anchor a cluster and carry a pay table?
    pub fn is_paying(self) -> bool {
        matches!(self.kind(), SymbolKind::High | SymbolKind::Low)
    }

    pub fn is_wild(self) -> bool {
        self == Symbol::Wild
    }

    pub fn is_scatter(self) -> bool {
        self == Symbol::Scatter
    }

    /// Does `cell` belong to a cluster anchored on `self`?
    #[inline]
    pub fn joins(self, cell: Symbol) -> bool {
        cell == self || cell == Symbol::Wild
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
