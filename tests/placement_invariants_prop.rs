//! Property tests for placement and clearing invariants
//!
//! Boards are generated from random 64-bit masks; shapes come from the
//! catalog; positions range a little past the grid on every side.

use proptest::prelude::*;

use blockfit::core::{calculate_score, catalog, is_valid_placement, place, Board, GameError};
use blockfit::types::{Cell, Position, GRID_SIZE};

fn board_from_mask(mask: u64) -> Board {
    (0..GRID_SIZE * GRID_SIZE)
        .filter(|i| mask & (1u64 << i) != 0)
        .fold(Board::new(), |b, i| {
            b.with_cell(i % GRID_SIZE, i / GRID_SIZE, Cell::Filled)
        })
}

proptest! {
    #[test]
    fn valid_placements_stay_on_the_board(
        mask in any::<u64>(),
        shape in 0usize..30,
        x in -3i32..11,
        y in -3i32..11,
    ) {
        let board = board_from_mask(mask);
        let grid = &catalog()[shape].grid;
        let pos = Position::new(x, y);

        if is_valid_placement(&board, grid, pos) {
            prop_assert!(x >= 0 && y >= 0);
            prop_assert!(x as usize + grid.width() <= GRID_SIZE);
            prop_assert!(y as usize + grid.height() <= GRID_SIZE);
        }
    }

    #[test]
    fn place_adds_exactly_the_shape_cells(
        mask in any::<u64>(),
        shape in 0usize..30,
        x in -3i32..11,
        y in -3i32..11,
    ) {
        let board = board_from_mask(mask);
        let grid = &catalog()[shape].grid;
        let pos = Position::new(x, y);

        match place(&board, grid, pos) {
            Ok(next) => {
                prop_assert_eq!(next.filled_count(), board.filled_count() + grid.filled_count());
                for (dx, dy) in grid.filled_cells() {
                    prop_assert!(!board.is_filled(x as usize + dx, y as usize + dy));
                    prop_assert!(next.is_filled(x as usize + dx, y as usize + dy));
                }
            }
            Err(e) => {
                prop_assert_eq!(e, GameError::InvalidPlacement(pos));
                prop_assert!(!is_valid_placement(&board, grid, pos));
            }
        }
    }

    #[test]
    fn clearing_empties_exactly_the_full_lines(mask in any::<u64>()) {
        let board = board_from_mask(mask);
        let clear = board.clear_lines();

        for y in 0..GRID_SIZE {
            for x in 0..GRID_SIZE {
                let on_full_line = clear.rows.contains(&y) || clear.columns.contains(&x);
                let expected = board.is_filled(x, y) && !on_full_line;
                prop_assert_eq!(clear.board.is_filled(x, y), expected);
            }
        }
        prop_assert!((0..GRID_SIZE).all(|i| !clear.board.is_row_full(i)));
        prop_assert!((0..GRID_SIZE).all(|i| !clear.board.is_column_full(i)));
    }

    #[test]
    fn score_is_ten_per_line_plus_bonus(lines in 0usize..=16, empty in any::<bool>()) {
        let s = calculate_score(lines, empty);
        prop_assert_eq!(s.total, 10 * lines as u32 + if empty { 100 } else { 0 });
    }
}
