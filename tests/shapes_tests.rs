//! Shape catalog tests

use std::collections::HashSet;

use blockfit::core::{catalog, find_template, GameError, ShapeGrid, SHAPE_COUNT};
use blockfit::types::GRID_SIZE;

#[test]
fn test_catalog_size_and_ids() {
    assert_eq!(catalog().len(), SHAPE_COUNT);

    let ids: HashSet<_> = catalog().iter().map(|t| t.id).collect();
    assert_eq!(ids.len(), SHAPE_COUNT, "template ids must be unique");
}

#[test]
fn test_catalog_grids_are_well_formed() {
    for t in catalog() {
        let g = &t.grid;
        assert!(g.width() >= 1 && g.width() <= GRID_SIZE, "{}", t.id);
        assert!(g.height() >= 1 && g.height() <= GRID_SIZE, "{}", t.id);
        assert!(g.filled_count() > 0, "{} has no cells", t.id);
        assert!(g.is_minimal(), "{} has an empty border row or column", t.id);
        assert!(!t.color.is_empty(), "{}", t.id);
    }
}

#[test]
fn test_catalog_has_no_monomino() {
    assert!(catalog().iter().all(|t| t.grid.filled_count() > 1));
}

#[test]
fn test_find_template() {
    let square = find_template("3x3 BIG SQUARE").unwrap();
    assert_eq!(square.grid.filled_count(), 9);
    assert_eq!((square.grid.width(), square.grid.height()), (3, 3));

    assert!(find_template("3x3 big square").is_none());
}

#[test]
fn test_wire_grid_round_trip() {
    for t in catalog() {
        let back = ShapeGrid::from_bits(&t.grid.to_bits()).unwrap();
        assert_eq!(back, t.grid, "{}", t.id);
    }
}

#[test]
fn test_grid_rejects_oversized() {
    let tall = vec![vec![1u8]; GRID_SIZE + 1];
    assert!(matches!(
        ShapeGrid::from_bits(&tall),
        Err(GameError::MalformedShape(_))
    ));
}
