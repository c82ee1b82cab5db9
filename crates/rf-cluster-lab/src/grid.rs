//! Grid specification and generation

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};
use crate::symbols::Symbol;
use crate::weights::SymbolSampler;

/// Grid dimensions (rows × columns)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridSpec {
    pub rows: u8,
    pub cols: u8,
}

impl GridSpec {
    pub fn new(rows: u8, cols: u8) -> Self {
        Self { rows, cols }
    }

    /// Reference 7×7 cluster grid
    pub fn square_7x7() -> Self {
        Self::new(7, 7)
    }

    /// Total cells
    pub fn cells(&self) -> usize {
        self.rows as usize * self.cols as usize
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.rows == 0 || self.cols == 0 {
            return Err(ConfigError::InvalidGrid {
                rows: self.rows,
                cols: self.cols,
            });
        }
        Ok(())
    }
}

impl Default for GridSpec {
    fn default() -> Self {
        Self::square_7x7()
    }
}

/// A rectangular symbol grid, stored row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    rows: usize,
    cols: usize,
    cells: Vec<Symbol>,
}

impl Grid {
    /// Fill a grid with independent draws, row-major
    pub fn generate<R: Rng + ?Sized>(spec: GridSpec, sampler: &SymbolSampler, rng: &mut R) -> Self {
        let cells = (0..spec.cells()).map(|_| sampler.draw(rng)).collect();
        Self {
            rows: spec.rows as usize,
            cols: spec.cols as usize,
            cells,
        }
    }

    /// Grid with every cell set to `symbol`
    pub fn filled(spec: GridSpec, symbol: Symbol) -> Self {
        Self {
            rows: spec.rows as usize,
            cols: spec.cols as usize,
            cells: vec![symbol; spec.cells()],
        }
    }

    /// Build from explicit rows; all rows must have the same non-zero length
    pub fn from_rows(rows: Vec<Vec<Symbol>>) -> ConfigResult<Self> {
        let height = rows.len();
        let width = rows.first().map(Vec::len).unwrap_or(0);
        if height == 0 || width == 0 {
            return Err(ConfigError::MalformedGrid("grid has no cells".into()));
        }
        if let Some((idx, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != width) {
            return Err(ConfigError::MalformedGrid(format!(
                "row {} has {} cells, expected {}",
                idx,
                row.len(),
                width
            )));
        }
        Ok(Self {
            rows: height,
            cols: width,
            cells: rows.into_iter().flatten().collect(),
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Symbol at (row, col)
    pub fn get(&self, row: usize, col: usize) -> Option<Symbol> {
        if row < self.rows && col < self.cols {
            Some(self.cells[row * self.cols + col])
        } else {
            None
        }
    }

    /// Overwrite (row, col); out-of-range writes are ignored
    pub fn set(&mut self, row: usize, col: usize, symbol: Symbol) {
        if row < self.rows && col < self.cols {
            self.cells[row * self.cols + col] = symbol;
        }
    }

    /// Row-major cells
    pub fn cells(&self) -> &[Symbol] {
        &self.cells
    }

    /// Row-major `(row, col, symbol)` triples
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, Symbol)> + '_ {
        let cols = self.cols;
        self.cells
            .iter()
            .enumerate()
            .map(move |(idx, &symbol)| (idx / cols, idx % cols, symbol))
    }

    /// Flat index → (row, col)
    pub fn position(&self, index: usize) -> (usize, usize) {
        (index / self.cols, index % self.cols)
    }

    /// Number of cells holding `symbol`
    pub fn count(&self, symbol: Symbol) -> usize {
        self.cells.iter().filter(|&&s| s == symbol).count()
    }

    pub fn contains(&self, symbol: Symbol) -> bool {
        self.cells.contains(&symbol)
    }

    /// Remove the given cells, let each column fall, and refill from the top.
    ///
    /// `removed` holds flat indices. New symbols are drawn top-down per column.
    pub fn tumble<R: Rng + ?Sized>(&mut self, removed: &[usize], sampler: &SymbolSampler, rng: &mut R) {
        let mut holes = vec![false; self.cells.len()];
        for &idx in removed {
            if idx < holes.len() {
                holes[idx] = true;
            }
        }

        for col in 0..self.cols {
            // Walk bottom-up, compacting survivors toward the bottom.
            let mut write = self.rows;
            for row in (0..self.rows).rev() {
                let idx = row * self.cols + col;
                if !holes[idx] {
                    write -= 1;
                    self.cells[write * self.cols + col] = self.cells[idx];
                }
            }
            for row in 0..write {
                self.cells[row * self.cols + col] = sampler.draw(rng);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::weights::WeightTable;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_spec_validation() {
        assert!(GridSpec::square_7x7().validate().is_ok());
        assert!(GridSpec::new(0, 7).validate().is_err());
        assert!(GridSpec::new(7, 0).validate().is_err());
    }

    #[test]
    fn test_generate_dimensions() {
        let sampler = SymbolSampler::new("base", &WeightTable::quantum_cats_base()).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let grid = Grid::generate(GridSpec::new(5, 6), &sampler, &mut rng);
        assert_eq!(grid.rows(), 5);
        assert_eq!(grid.cols(), 6);
        assert_eq!(grid.len(), 30);
        assert!(grid.get(4, 5).is_some());
        assert!(grid.get(5, 0).is_none());
        assert_eq!(grid.iter().count(), 30);
        assert_eq!(grid.iter().last().map(|(r, c, _)| (r, c)), Some((4, 5)));
    }

    #[test]
    fn test_generate_degenerate_table() {
        let sampler = SymbolSampler::new("base", &WeightTable::single(Symbol::L2)).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let grid = Grid::generate(GridSpec::default(), &sampler, &mut rng);
        assert_eq!(grid.count(Symbol::L2), 49);
    }

    #[test]
    fn test_from_rows_rejects_ragged() {
        let rows = vec![vec![Symbol::H1, Symbol::H2], vec![Symbol::H1]];
        assert!(matches!(
            Grid::from_rows(rows),
            Err(ConfigError::MalformedGrid(_))
        ));
        assert!(Grid::from_rows(Vec::new()).is_err());
    }

    #[test]
    fn test_tumble_drops_and_refills() {
        use crate::symbols::Symbol::*;
        let mut grid = Grid::from_rows(vec![
            vec![H1, L1],
            vec![H2, L2],
            vec![H3, L3],
        ])
        .unwrap();
        let refill = SymbolSampler::new("fill", &WeightTable::single(Connector)).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(0);

        // Remove the bottom of column 0 and the middle of column 1.
        grid.tumble(&[4, 3], &refill, &mut rng);

        assert_eq!(grid.get(0, 0), Some(Connector));
        assert_eq!(grid.get(1, 0), Some(H1));
        assert_eq!(grid.get(2, 0), Some(H2));
        assert_eq!(grid.get(0, 1), Some(Connector));
        assert_eq!(grid.get(1, 1), Some(L1));
        assert_eq!(grid.get(2, 1), Some(L3));
    }
}
