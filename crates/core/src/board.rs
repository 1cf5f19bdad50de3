//! Board module - manages the game grid
//!
//! The board is an 8x8 grid where each cell is empty or filled.
//! Uses a flat array for cache locality and zero allocation.
//! Coordinates: (x, y) where x is the column and y the row, both 0..8.
//!
//! A `Board` is a value: placing and clearing return new boards, nothing is
//! mutated behind a caller's back.

use arrayvec::ArrayVec;

use crate::error::{GameError, Result};
use crate::types::{Cell, GRID_CELLS, GRID_SIZE};

/// The game board - 8 columns x 8 rows using flat array storage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Board {
    /// Flat array of cells, row-major order (y * GRID_SIZE + x)
    cells: [Cell; GRID_CELLS],
}

/// Result of [`Board::clear_lines`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineClear {
    /// Board after every full row and column was emptied
    pub board: Board,
    /// Indices of the rows that were full, top to bottom
    pub rows: ArrayVec<usize, GRID_SIZE>,
    /// Indices of the columns that were full, left to right
    pub columns: ArrayVec<usize, GRID_SIZE>,
}

impl LineClear {
    /// Total cleared lines (rows + columns)
    pub fn count(&self) -> usize {
        self.rows.len() + self.columns.len()
    }
}

impl Board {
    /// Create a new empty board
    pub fn new() -> Self {
        Self {
            cells: [Cell::Empty; GRID_CELLS],
        }
    }

    /// Build a board from untrusted `0`/`1` rows
    ///
    /// Exactly `GRID_SIZE` rows of exactly `GRID_SIZE` binary values are
    /// required.
    pub fn from_bits<R: AsRef<[u8]>>(rows: &[R]) -> Result<Self> {
        if rows.len() != GRID_SIZE {
            return Err(GameError::MalformedBoard(format!(
                "board has {} rows, expected {GRID_SIZE}",
                rows.len()
            )));
        }

        let mut board = Self::new();
        for (y, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            if row.len() != GRID_SIZE {
                return Err(GameError::MalformedBoard(format!(
                    "board row {y} has {} cells, expected {GRID_SIZE}",
                    row.len()
                )));
            }
            for (x, &bit) in row.iter().enumerate() {
                let cell = Cell::from_bit(bit).ok_or_else(|| {
                    GameError::MalformedBoard(format!(
                        "board cell ({x}, {y}) is {bit}, expected 0 or 1"
                    ))
                })?;
                board.cells[Self::index(x, y)] = cell;
            }
        }

        Ok(board)
    }

    /// Rows as `0`/`1` bits, for the wire
    pub fn to_bits(&self) -> Vec<Vec<u8>> {
        self.cells
            .chunks_exact(GRID_SIZE)
            .map(|row| row.iter().map(|c| c.to_bit()).collect())
            .collect()
    }

    /// Calculate flat index from in-range (x, y) coordinates
    #[inline(always)]
    fn index(x: usize, y: usize) -> usize {
        y * GRID_SIZE + x
    }

    /// Get width of the board
    pub fn width(&self) -> usize {
        GRID_SIZE
    }

    /// Get height of the board
    pub fn height(&self) -> usize {
        GRID_SIZE
    }

    /// Get cell at position (x, y)
    /// Returns None if out of bounds
    pub fn get(&self, x: usize, y: usize) -> Option<Cell> {
        if x >= GRID_SIZE || y >= GRID_SIZE {
            return None;
        }
        Some(self.cells[Self::index(x, y)])
    }

    /// Check if position is within bounds and filled
    pub fn is_filled(&self, x: usize, y: usize) -> bool {
        matches!(self.get(x, y), Some(Cell::Filled))
    }

    /// Return a copy with the cell at (x, y) set
    ///
    /// Out-of-bounds coordinates leave the board unchanged.
    pub fn with_cell(mut self, x: usize, y: usize, cell: Cell) -> Self {
        if x < GRID_SIZE && y < GRID_SIZE {
            self.cells[Self::index(x, y)] = cell;
        }
        self
    }

    /// Number of filled cells
    pub fn filled_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_filled()).count()
    }

    /// True when no cell is filled
    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(|c| c.is_empty())
    }

    /// Check if a row is completely filled
    pub fn is_row_full(&self, y: usize) -> bool {
        if y >= GRID_SIZE {
            return false;
        }
        let start = y * GRID_SIZE;
        self.cells[start..start + GRID_SIZE]
            .iter()
            .all(|cell| cell.is_filled())
    }

    /// Check if a column is completely filled
    pub fn is_column_full(&self, x: usize) -> bool {
        if x >= GRID_SIZE {
            return false;
        }
        (0..GRID_SIZE).all(|y| self.cells[Self::index(x, y)].is_filled())
    }

    /// Clear every full row and full column
    ///
    /// Fullness is decided on this board for both axes before anything is
    /// cleared, then the union of those lines is emptied. A cell on both a
    /// full row and a full column is cleared once and counts toward both.
    /// Nothing shifts: cleared lines are reset in place.
    pub fn clear_lines(&self) -> LineClear {
        let rows: ArrayVec<usize, GRID_SIZE> =
            (0..GRID_SIZE).filter(|&y| self.is_row_full(y)).collect();
        let columns: ArrayVec<usize, GRID_SIZE> =
            (0..GRID_SIZE).filter(|&x| self.is_column_full(x)).collect();

        let mut board = *self;
        for &y in &rows {
            let start = y * GRID_SIZE;
            for cell in &mut board.cells[start..start + GRID_SIZE] {
                *cell = Cell::Empty;
            }
        }
        for &x in &columns {
            for y in 0..GRID_SIZE {
                board.cells[Self::index(x, y)] = Cell::Empty;
            }
        }

        LineClear {
            board,
            rows,
            columns,
        }
    }

    /// Set cells directly, bypassing placement rules
    pub(crate) fn fill(&mut self, x: usize, y: usize) {
        self.cells[Self::index(x, y)] = Cell::Filled;
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}
