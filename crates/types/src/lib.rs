//! Core types module - shared data structures and constants
//!
//! This module defines the fundamental types used throughout the workspace.
//! All types are plain data with no external dependencies, so they can be used
//! by the rules engine, the wire protocol, and tests alike.
//!
//! # Board Dimensions
//!
//! The playfield is a square grid of [`GRID_SIZE`] × [`GRID_SIZE`] cells.
//! Coordinates are `(x, y)` where `x` is the column (left to right) and `y`
//! is the row (top to bottom).
//!
//! # Scoring Constants
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `LINE_CLEAR_POINTS` | 10 | Points per cleared row or column |
//! | `CLEARED_GRID_BONUS` | 100 | Bonus when a turn leaves the board empty |
//!
//! # Examples
//!
//! ```
//! use blockfit_types::{Cell, Position, GRID_SIZE, HAND_SIZE};
//!
//! assert_eq!(GRID_SIZE, 8);
//! assert_eq!(HAND_SIZE, 3);
//!
//! assert_eq!(Cell::from_bit(1), Some(Cell::Filled));
//! assert_eq!(Cell::from_bit(2), None);
//!
//! let pos = Position::new(3, 4);
//! assert_eq!((pos.x, pos.y), (3, 4));
//! ```

/// Board width and height in cells (8 × 8)
pub const GRID_SIZE: usize = 8;

/// Total number of cells on the board
pub const GRID_CELLS: usize = GRID_SIZE * GRID_SIZE;

/// Number of shapes dealt into a fresh hand
pub const HAND_SIZE: usize = 3;

/// Points awarded per cleared row or column
pub const LINE_CLEAR_POINTS: u32 = 10;

/// Bonus awarded when the board is completely empty after a clear
pub const CLEARED_GRID_BONUS: u32 = 100;

/// A single board cell
///
/// There are exactly two states. The wire format encodes them as `0` and `1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Cell {
    #[default]
    Empty,
    Filled,
}

impl Cell {
    /// Decode a wire bit (`0` or `1`)
    ///
    /// Any other value is rejected with `None`.
    pub fn from_bit(bit: u8) -> Option<Self> {
        match bit {
            0 => Some(Cell::Empty),
            1 => Some(Cell::Filled),
            _ => None,
        }
    }

    /// Encode as a wire bit
    pub fn to_bit(self) -> u8 {
        match self {
            Cell::Empty => 0,
            Cell::Filled => 1,
        }
    }

    pub fn is_filled(self) -> bool {
        matches!(self, Cell::Filled)
    }

    pub fn is_empty(self) -> bool {
        matches!(self, Cell::Empty)
    }
}

impl From<bool> for Cell {
    fn from(filled: bool) -> Self {
        if filled {
            Cell::Filled
        } else {
            Cell::Empty
        }
    }
}

/// Top-left anchor of a shape's bounding box on the board
///
/// Signed so that out-of-range client input can be represented and rejected
/// by placement validation instead of failing to decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Position {
    /// Column
    pub x: i32,
    /// Row
    pub y: i32,
}

impl Position {
    pub const ORIGIN: Position = Position { x: 0, y: 0 };

    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}
