//! Shapes module - polyomino grids and the fixed shape catalog
//!
//! Every shape is stored as its minimal bounding box. Rotations are not computed
//! at runtime: each rotation is its own catalog entry.
//! The catalog is built at compile time and never allocates.

use std::borrow::Cow;

use crate::dealer::InstanceId;
use crate::error::{GameError, Result};
use crate::types::GRID_SIZE;

/// Rectangular boolean sub-grid of a shape, at most `GRID_SIZE` × `GRID_SIZE`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShapeGrid {
    width: u8,
    height: u8,
    /// Row-major; only `[..height][..width]` is meaningful
    cells: [[bool; GRID_SIZE]; GRID_SIZE],
}

impl ShapeGrid {
    /// Build a grid from static catalog rows of `0`/`1`
    ///
    /// Panics at compile time if the rows are empty, ragged or oversized.
    pub const fn from_static(rows: &[&[u8]]) -> Self {
        let height = rows.len();
        assert!(height > 0 && height <= GRID_SIZE, "shape height out of range");
        let width = rows[0].len();
        assert!(width > 0 && width <= GRID_SIZE, "shape width out of range");

        let mut cells = [[false; GRID_SIZE]; GRID_SIZE];
        let mut y = 0;
        while y < height {
            assert!(rows[y].len() == width, "shape rows must be rectangular");
            let mut x = 0;
            while x < width {
                cells[y][x] = rows[y][x] == 1;
                x += 1;
            }
            y += 1;
        }

        Self {
            width: width as u8,
            height: height as u8,
            cells,
        }
    }

    /// Build a grid from untrusted rows of `0`/`1`
    ///
    /// Rejects empty, ragged, oversized or non-binary input, and grids with no
    /// filled cell at all.
    pub fn from_bits<R: AsRef<[u8]>>(rows: &[R]) -> Result<Self> {
        let height = rows.len();
        if height == 0 {
            return Err(GameError::MalformedShape("shape grid has no rows".into()));
        }
        if height > GRID_SIZE {
            return Err(GameError::MalformedShape(format!(
                "shape grid has {height} rows, at most {GRID_SIZE} allowed"
            )));
        }

        let width = rows[0].as_ref().len();
        if width == 0 {
            return Err(GameError::MalformedShape("shape grid has empty rows".into()));
        }
        if width > GRID_SIZE {
            return Err(GameError::MalformedShape(format!(
                "shape grid has {width} columns, at most {GRID_SIZE} allowed"
            )));
        }

        let mut cells = [[false; GRID_SIZE]; GRID_SIZE];
        let mut filled = 0usize;
        for (y, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            if row.len() != width {
                return Err(GameError::MalformedShape(format!(
                    "shape row {y} has {} cells, expected {width}",
                    row.len()
                )));
            }
            for (x, &bit) in row.iter().enumerate() {
                match bit {
                    0 => {}
                    1 => {
                        cells[y][x] = true;
                        filled += 1;
                    }
                    other => {
                        return Err(GameError::MalformedShape(format!(
                            "shape cell ({x}, {y}) is {other}, expected 0 or 1"
                        )))
                    }
                }
            }
        }

        if filled == 0 {
            return Err(GameError::MalformedShape("shape has no filled cells".into()));
        }

        Ok(Self {
            width: width as u8,
            height: height as u8,
            cells,
        })
    }

    /// Bounding-box width (columns)
    pub fn width(&self) -> usize {
        self.width as usize
    }

    /// Bounding-box height (rows)
    pub fn height(&self) -> usize {
        self.height as usize
    }

    /// Whether the cell at column `x`, row `y` is part of the shape
    ///
    /// Out-of-box coordinates are never filled.
    pub fn is_filled(&self, x: usize, y: usize) -> bool {
        x < self.width() && y < self.height() && self.cells[y][x]
    }

    /// Offsets `(x, y)` of every filled cell, row by row
    pub fn filled_cells(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        (0..self.height()).flat_map(move |y| {
            (0..self.width())
                .filter(move |&x| self.cells[y][x])
                .map(move |x| (x, y))
        })
    }

    pub fn filled_count(&self) -> usize {
        self.filled_cells().count()
    }

    /// True when every border row and column holds at least one filled cell
    pub fn is_minimal(&self) -> bool {
        let (w, h) = (self.width(), self.height());
        let row_used = |y: usize| (0..w).any(|x| self.cells[y][x]);
        let col_used = |x: usize| (0..h).any(|y| self.cells[y][x]);
        row_used(0) && row_used(h - 1) && col_used(0) && col_used(w - 1)
    }

    /// Rows as `0`/`1` bits, for display and the wire
    pub fn to_bits(&self) -> Vec<Vec<u8>> {
        (0..self.height())
            .map(|y| {
                (0..self.width())
                    .map(|x| self.cells[y][x] as u8)
                    .collect()
            })
            .collect()
    }
}

/// A named catalog entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShapeTemplate {
    pub id: &'static str,
    pub grid: ShapeGrid,
    /// Display hint only, never consulted by the rules
    pub color: &'static str,
}

impl ShapeTemplate {
    const fn new(id: &'static str, rows: &[&[u8]], color: &'static str) -> Self {
        Self {
            id,
            grid: ShapeGrid::from_static(rows),
            color,
        }
    }

    /// Mint a dealt instance of this template
    pub fn instantiate(&'static self, instance_id: InstanceId) -> ShapeInstance {
        ShapeInstance {
            template_id: Cow::Borrowed(self.id),
            instance_id,
            grid: self.grid,
            color: Cow::Borrowed(self.color),
        }
    }
}

/// One dealt occurrence of a shape
///
/// `instance_id` is what hand lookups key on: two instances may share a
/// template but never an instance id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShapeInstance {
    pub template_id: Cow<'static, str>,
    pub instance_id: InstanceId,
    pub grid: ShapeGrid,
    pub color: Cow<'static, str>,
}

impl ShapeInstance {
    /// Build an instance from client-supplied parts
    pub fn new(
        template_id: impl Into<String>,
        instance_id: InstanceId,
        grid: ShapeGrid,
        color: impl Into<String>,
    ) -> Self {
        Self {
            template_id: Cow::Owned(template_id.into()),
            instance_id,
            grid,
            color: Cow::Owned(color.into()),
        }
    }
}

/// The full, ordered catalog
pub fn catalog() -> &'static [ShapeTemplate] {
    &SHAPES
}

/// Look up a template by id
pub fn find_template(id: &str) -> Option<&'static ShapeTemplate> {
    SHAPES.iter().find(|t| t.id == id)
}

/// Number of catalog entries
pub const SHAPE_COUNT: usize = 30;

static SHAPES: [ShapeTemplate; SHAPE_COUNT] = [
    ShapeTemplate::new("3x3 LEFT L", &[&[1, 1, 1], &[0, 0, 1], &[0, 0, 1]], "yellow-600"),
    ShapeTemplate::new("2x2 CORNER", &[&[1, 1], &[1, 0]], "blue-600"),
    ShapeTemplate::new("2x2 CORNER 90", &[&[1, 1], &[0, 1]], "blue-600"),
    ShapeTemplate::new("2x2 CORNER 180", &[&[0, 1], &[1, 1]], "blue-600"),
    ShapeTemplate::new("2x2 CORNER 270", &[&[1, 0], &[1, 1]], "blue-600"),
    ShapeTemplate::new("3x2 L MIRRORED 90", &[&[1, 0, 0], &[1, 1, 1]], "green-600"),
    ShapeTemplate::new("3x2 L MIRRORED 270", &[&[1, 1, 1], &[0, 0, 1]], "green-600"),
    ShapeTemplate::new("3x2 L 90", &[&[1, 1, 1], &[1, 0, 0]], "orange-600"),
    ShapeTemplate::new("2x3 L 180", &[&[1, 1], &[0, 1], &[0, 1]], "orange-600"),
    ShapeTemplate::new("2x3 L", &[&[1, 0], &[1, 0], &[1, 1]], "green-600"),
    ShapeTemplate::new("2x3 L MIRRORED", &[&[0, 1], &[0, 1], &[1, 1]], "green-600"),
    ShapeTemplate::new("2x3 L MIRRORED 180", &[&[1, 1], &[1, 0], &[1, 0]], "green-600"),
    ShapeTemplate::new("1x2 VERT LINE", &[&[1], &[1]], "green-600"),
    ShapeTemplate::new("2x1 HORIZ LINE", &[&[1, 1]], "green-600"),
    ShapeTemplate::new("1x3 VERT LINE", &[&[1], &[1], &[1]], "blue-600"),
    ShapeTemplate::new("3x1 HORIZ LINE", &[&[1, 1, 1]], "blue-600"),
    ShapeTemplate::new("5x1 HORIZ LINE", &[&[1, 1, 1, 1, 1]], "blue-600"),
    ShapeTemplate::new("1x5 VERT LINE", &[&[1], &[1], &[1], &[1], &[1]], "blue-600"),
    ShapeTemplate::new("1x4 VERT LINE", &[&[1], &[1], &[1], &[1]], "purple-600"),
    ShapeTemplate::new("4x1 HORIZ LINE", &[&[1, 1, 1, 1]], "purple-600"),
    ShapeTemplate::new("2x2 SMALL SQUARE", &[&[1, 1], &[1, 1]], "yellow-400"),
    ShapeTemplate::new("3x3 BIG SQUARE", &[&[1, 1, 1], &[1, 1, 1], &[1, 1, 1]], "red-600"),
    ShapeTemplate::new("RHODE ISLAND Z", &[&[0, 1, 1], &[1, 1, 0]], "orange-600"),
    ShapeTemplate::new("RHODE ISLAND Z 90", &[&[1, 0], &[1, 1], &[0, 1]], "orange-600"),
    ShapeTemplate::new("CLEVELAND Z", &[&[1, 1, 0], &[0, 1, 1]], "orange-600"),
    ShapeTemplate::new("CLEVELAND Z 90", &[&[0, 1], &[1, 1], &[1, 0]], "orange-600"),
    ShapeTemplate::new("TEEWEE", &[&[0, 1, 0], &[1, 1, 1]], "orange-600"),
    ShapeTemplate::new("TEEWEE 90", &[&[1, 0], &[1, 1], &[1, 0]], "orange-600"),
    ShapeTemplate::new("TEEWEE 180", &[&[1, 1, 1], &[0, 1, 0]], "orange-600"),
    ShapeTemplate::new("TEEWEE 270", &[&[0, 1], &[1, 1], &[0, 1]], "orange-600"),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_templates_are_minimal() {
        for t in catalog() {
            assert!(t.grid.is_minimal(), "{} is not a minimal bounding box", t.id);
        }
    }

    #[test]
    fn test_catalog_ids_are_unique() {
        let ids: std::collections::HashSet<_> = catalog().iter().map(|t| t.id).collect();
        assert_eq!(ids.len(), SHAPE_COUNT);
    }

    #[test]
    fn test_from_bits_rejects_ragged_rows() {
        let err = ShapeGrid::from_bits(&[vec![1u8, 1], vec![1]]).unwrap_err();
        assert!(matches!(err, GameError::MalformedShape(_)));
    }

    #[test]
    fn test_from_bits_rejects_non_binary() {
        let err = ShapeGrid::from_bits(&[[1u8, 2]]).unwrap_err();
        assert!(matches!(err, GameError::MalformedShape(_)));
    }

    #[test]
    fn test_from_bits_rejects_oversized_and_blank() {
        assert!(ShapeGrid::from_bits(&[[1u8; 9]]).is_err());
        assert!(ShapeGrid::from_bits(&[[0u8, 0]]).is_err());
        assert!(ShapeGrid::from_bits::<Vec<u8>>(&[]).is_err());
    }

    #[test]
    fn test_filled_cells_follow_grid() {
        let t = find_template("TEEWEE").unwrap();
        let cells: Vec<_> = t.grid.filled_cells().collect();
        assert_eq!(cells, vec![(1, 0), (0, 1), (1, 1), (2, 1)]);
        assert_eq!(t.grid.width(), 3);
        assert_eq!(t.grid.height(), 2);
        assert_eq!(t.grid.to_bits(), vec![vec![0, 1, 0], vec![1, 1, 1]]);
    }
}
