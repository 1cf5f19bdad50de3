//! Scoring module
//!
//! Each cleared row or column is worth [`LINE_CLEAR_POINTS`]. A turn that
//! leaves the board completely empty earns [`CLEARED_GRID_BONUS`] on top.

use crate::types::{CLEARED_GRID_BONUS, LINE_CLEAR_POINTS};

/// Score calculation result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScoreResult {
    /// Points for the cleared lines
    pub line_clear_score: u32,
    /// Empty-board bonus, 0 when the board still holds cells
    pub clear_bonus: u32,
    pub total: u32,
}

/// Calculate the score delta for one turn
pub fn calculate_score(cleared_lines: usize, board_empty: bool) -> ScoreResult {
    let line_clear_score = LINE_CLEAR_POINTS.saturating_mul(cleared_lines as u32);
    let clear_bonus = if board_empty { CLEARED_GRID_BONUS } else { 0 };

    ScoreResult {
        line_clear_score,
        clear_bonus,
        total: line_clear_score.saturating_add(clear_bonus),
    }
}
