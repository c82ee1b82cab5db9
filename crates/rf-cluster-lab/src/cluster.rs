//! Cluster detection — 4-directional flood fill with wild substitution
//!
//! Each paying symbol gets its own pass over the grid. A pass flood-fills
//! from every unvisited anchor cell across cells that are the anchor or
//! Wild. Visited state is a stamp matrix: every pass bumps the stamp, so a
//! Wild absorbed by one symbol's cluster is still free for the next symbol.
//! Scatter and the connector symbol never anchor and never join.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::grid::Grid;
use crate::symbols::Symbol;

/// Smallest payable cluster in the reference game
pub const DEFAULT_MIN_CLUSTER_SIZE: u32 = 5;

/// A maximal connected region anchored on one paying symbol
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cluster {
    /// Anchor symbol
    pub symbol: Symbol,
    /// Flat (row-major) cell indices, ascending
    pub cells: Vec<usize>,
}

impl Cluster {
    /// Cell count
    pub fn size(&self) -> usize {
        self.cells.len()
    }

    /// How many of the cells are wilds
    pub fn wild_count(&self, grid: &Grid) -> usize {
        self.cells
            .iter()
            .filter(|&&idx| grid.cells()[idx].is_wild())
            .count()
    }
}

/// Reusable cluster finder.
///
/// Owns its scratch buffers; keep one per worker and feed it grid after grid.
#[derive(Debug, Clone)]
pub struct ClusterEvaluator {
    min_size: usize,
    stamps: Vec<u32>,
    pass: u32,
    stack: Vec<usize>,
    region: Vec<usize>,
}

impl ClusterEvaluator {
    pub fn new(min_size: u32) -> Self {
        Self {
            min_size: min_size.max(1) as usize,
            stamps: Vec::new(),
            pass: 0,
            stack: Vec::new(),
            region: Vec::new(),
        }
    }

    pub fn min_size(&self) -> usize {
        self.min_size
    }

    /// All payable clusters, grouped by anchor (paytable order) then discovery order
    pub fn find_clusters(&mut self, grid: &Grid) -> Vec<Cluster> {
        if self.stamps.len() != grid.len() {
            self.stamps = vec![0; grid.len()];
            self.pass = 0;
        }

        let mut present = [false; Symbol::COUNT];
        for &s in grid.cells() {
            present[s.index()] = true;
        }

        let mut clusters = Vec::new();
        for anchor in Symbol::PAYING {
            if !present[anchor.index()] {
                continue;
            }
            self.next_pass();

            for start in 0..grid.len() {
                if grid.cells()[start] != anchor || self.stamps[start] == self.pass {
                    continue;
                }
                self.fill(grid, start, anchor);
                if self.region.len() >= self.min_size {
                    let mut cells = self.region.clone();
                    cells.sort_unstable();
                    clusters.push(Cluster {
                        symbol: anchor,
                        cells,
                    });
                }
            }
        }
        clusters
    }

    fn next_pass(&mut self) {
        self.pass = self.pass.wrapping_add(1);
        if self.pass == 0 {
            self.stamps.fill(0);
            self.pass = 1;
        }
    }

    /// Collect the region containing `start` into `self.region`
    fn fill(&mut self, grid: &Grid, start: usize, anchor: Symbol) {
        let rows = grid.rows();
        let cols = grid.cols();
        let cells = grid.cells();

        self.region.clear();
        self.stack.clear();
        self.stamps[start] = self.pass;
        self.stack.push(start);

        while let Some(idx) = self.stack.pop() {
            self.region.push(idx);
            let (row, col) = (idx / cols, idx % cols);
            let neighbours = [
                (row > 0).then(|| idx - cols),
                (row + 1 < rows).then(|| idx + cols),
                (col > 0).then(|| idx - 1),
                (col + 1 < cols).then(|| idx + 1),
            ];
            for next in neighbours.into_iter().flatten() {
                if self.stamps[next] != self.pass && anchor.joins(cells[next]) {
                    self.stamps[next] = self.pass;
                    self.stack.push(next);
                }
            }
        }
    }
}

impl Default for ClusterEvaluator {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_CLUSTER_SIZE)
    }
}

/// Symbol → cluster sizes, in discovery order
pub fn sizes_by_symbol(clusters: &[Cluster]) -> BTreeMap<Symbol, Vec<usize>> {
    let mut sizes: BTreeMap<Symbol, Vec<usize>> = BTreeMap::new();
    for cluster in clusters {
        sizes.entry(cluster.symbol).or_default().push(cluster.size());
    }
    sizes
}
