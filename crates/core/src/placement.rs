//! Placement rules - fitting shapes onto the board and detecting dead hands
//!
//! A position anchors the shape's bounding box by its top-left corner. Only
//! filled shape cells constrain a placement; empty cells in the bounding box
//! may sit over filled board cells.

use crate::board::Board;
use crate::error::{GameError, Result};
use crate::shapes::ShapeGrid;
use crate::types::{Position, GRID_SIZE};

/// Does `shape` fit on `board` at `position`?
///
/// Out-of-bounds or overlapping placements return false; this never fails.
/// Bounds use the full bounding box, so a shape whose first row is narrower
/// than a later row is still checked against its true width.
pub fn is_valid_placement(board: &Board, shape: &ShapeGrid, position: Position) -> bool {
    let Some((x0, y0)) = anchor(shape, position) else {
        return false;
    };

    shape
        .filled_cells()
        .all(|(dx, dy)| !board.is_filled(x0 + dx, y0 + dy))
}

/// Place `shape` at `position`, returning the new board
///
/// Validation happens before any cell is written; on failure the input board
/// is untouched and [`GameError::InvalidPlacement`] is returned.
pub fn place(board: &Board, shape: &ShapeGrid, position: Position) -> Result<Board> {
    if !is_valid_placement(board, shape, position) {
        return Err(GameError::InvalidPlacement(position));
    }
    let Some((x0, y0)) = anchor(shape, position) else {
        return Err(GameError::InvalidPlacement(position));
    };

    let mut next = *board;
    for (dx, dy) in shape.filled_cells() {
        next.fill(x0 + dx, y0 + dy);
    }
    Ok(next)
}

/// Can `shape` be placed anywhere on `board`?
///
/// Scans every in-bounds anchor row by row and stops at the first fit.
pub fn can_place_shape(board: &Board, shape: &ShapeGrid) -> bool {
    if shape.width() > GRID_SIZE || shape.height() > GRID_SIZE {
        return false;
    }
    (0..=GRID_SIZE - shape.height()).any(|y| {
        (0..=GRID_SIZE - shape.width())
            .any(|x| is_valid_placement(board, shape, Position::new(x as i32, y as i32)))
    })
}

/// True when no shape in `hand` fits anywhere on `board`
///
/// An empty hand is over by definition; callers replenish before asking.
pub fn is_game_over<'a, I>(board: &Board, hand: I) -> bool
where
    I: IntoIterator<Item = &'a ShapeGrid>,
{
    !hand.into_iter().any(|shape| can_place_shape(board, shape))
}

/// Board coordinates of the shape's top-left cell, if the whole bounding box
/// is on the board
fn anchor(shape: &ShapeGrid, position: Position) -> Option<(usize, usize)> {
    let x0 = usize::try_from(position.x).ok()?;
    let y0 = usize::try_from(position.y).ok()?;
    if x0 + shape.width() > GRID_SIZE || y0 + shape.height() > GRID_SIZE {
        return None;
    }
    Some((x0, y0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::find_template;
    use crate::types::Cell;

    fn grid(id: &str) -> ShapeGrid {
        find_template(id).unwrap().grid
    }

    /// Board with every cell filled except `holes`
    fn full_except(holes: &[(usize, usize)]) -> Board {
        let mut rows = vec![vec![1u8; GRID_SIZE]; GRID_SIZE];
        for &(x, y) in holes {
            rows[y][x] = 0;
        }
        Board::from_bits(&rows).unwrap()
    }

    #[test]
    fn test_rejects_negative_positions() {
        let board = Board::new();
        let dot = grid("2x1 HORIZ LINE");
        assert!(!is_valid_placement(&board, &dot, Position::new(-1, 0)));
        assert!(!is_valid_placement(&board, &dot, Position::new(0, -1)));
    }

    #[test]
    fn test_bounds_use_widest_row() {
        // First row is one cell wide, the last row is three.
        let l = grid("3x2 L MIRRORED 90");
        let board = Board::new();

        assert!(is_valid_placement(&board, &l, Position::new(5, 6)));
        assert!(!is_valid_placement(&board, &l, Position::new(6, 6)));
        assert!(!is_valid_placement(&board, &l, Position::new(5, 7)));
    }

    #[test]
    fn test_empty_shape_cells_may_cover_filled_board_cells() {
        // TEEWEE has empty corners at (0,0) and (2,0).
        let tee = grid("TEEWEE");
        let board = Board::new()
            .with_cell(0, 0, Cell::Filled)
            .with_cell(2, 0, Cell::Filled);

        assert!(is_valid_placement(&board, &tee, Position::ORIGIN));

        let blocked = board.with_cell(1, 0, Cell::Filled);
        assert!(!is_valid_placement(&blocked, &tee, Position::ORIGIN));
    }

    #[test]
    fn test_place_merges_cells() {
        let square = grid("2x2 SMALL SQUARE");
        let board = Board::new().with_cell(0, 0, Cell::Filled);

        let next = place(&board, &square, Position::new(3, 4)).unwrap();
        assert_eq!(next.filled_count(), 5);
        for (x, y) in [(3, 4), (4, 4), (3, 5), (4, 5), (0, 0)] {
            assert!(next.is_filled(x, y));
        }
    }

    #[test]
    fn test_place_rejects_overlap_without_mutation() {
        let square = grid("2x2 SMALL SQUARE");
        let board = Board::new().with_cell(4, 5, Cell::Filled);

        let err = place(&board, &square, Position::new(3, 4)).unwrap_err();
        assert_eq!(err, GameError::InvalidPlacement(Position::new(3, 4)));
        assert_eq!(board.filled_count(), 1);
    }

    #[test]
    fn test_game_over_with_single_hole() {
        let board = full_except(&[(5, 3)]);
        let domino = grid("2x1 HORIZ LINE");
        let monomino = ShapeGrid::from_bits(&[[1u8]]).unwrap();

        assert!(is_game_over(&board, [&domino]));
        assert!(!is_game_over(&board, [&domino, &monomino]));
        assert!(can_place_shape(&board, &monomino));
    }

    #[test]
    fn test_game_over_empty_hand() {
        assert!(is_game_over(&Board::new(), std::iter::empty()));
    }

    #[test]
    fn test_can_place_uses_last_anchor() {
        // Only the bottom-right 3x3 is free.
        let holes: Vec<_> = (5..8).flat_map(|y| (5..8).map(move |x| (x, y))).collect();
        let board = full_except(&holes);

        assert!(can_place_shape(&board, &grid("3x3 BIG SQUARE")));
        assert!(!can_place_shape(&board, &grid("4x1 HORIZ LINE")));
    }
}
