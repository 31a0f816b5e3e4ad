use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use super::piece::{FallingPiece, PieceKind};

/// Number of columns in the playing field.
pub const GRID_WIDTH: usize = 10;
/// Number of rows in the playing field.
pub const GRID_HEIGHT: usize = 20;

/// A single cell of the grid.
///
/// A cell is either empty or holds the kind of the locked piece it came from.
/// The kind determines the cell's color index (1-7; empty cells are 0), so
/// every cell always maps to a value in `0..=7`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum Cell {
    /// Empty cell (no locked piece).
    #[default]
    Empty,
    /// Locked cell originating from a piece of the given kind.
    Piece(PieceKind),
}

impl Cell {
    #[must_use]
    pub fn is_empty(self) -> bool {
        self == Cell::Empty
    }

    /// The color index of the cell: 0 for empty, 1-7 per piece kind.
    #[must_use]
    pub const fn color_index(self) -> u8 {
        match self {
            Cell::Empty => 0,
            Cell::Piece(kind) => kind.color_index(),
        }
    }

    /// Inverse of [`Self::color_index`].
    #[must_use]
    pub const fn from_color_index(index: u8) -> Option<Self> {
        if index == 0 {
            return Some(Cell::Empty);
        }
        match PieceKind::from_color_index(index) {
            Some(kind) => Some(Cell::Piece(kind)),
            None => None,
        }
    }
}

/// A single row of the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridRow {
    cells: [Cell; GRID_WIDTH],
}

impl GridRow {
    pub const EMPTY: Self = Self {
        cells: [Cell::Empty; GRID_WIDTH],
    };

    #[must_use]
    pub fn cells(&self) -> &[Cell; GRID_WIDTH] {
        &self.cells
    }

    fn is_filled(&self) -> bool {
        self.cells.iter().all(|c| !c.is_empty())
    }
}

/// The playing field: a fixed 20×10 matrix of locked cells.
///
/// The grid stores only locked pieces; the falling piece lives in the session
/// and is overlaid by the renderer. Dimensions never change - line clears
/// remove full rows and refill the top, keeping the row count constant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    rows: [GridRow; GRID_HEIGHT],
}

impl Default for Grid {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl Grid {
    pub const WIDTH: usize = GRID_WIDTH;
    pub const HEIGHT: usize = GRID_HEIGHT;

    pub const EMPTY: Self = Self {
        rows: [GridRow::EMPTY; GRID_HEIGHT],
    };

    /// Returns an iterator over the rows, top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &GridRow> {
        self.rows.iter()
    }

    /// Returns the cell at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if the coordinate is outside the grid.
    #[must_use]
    pub fn cell(&self, x: usize, y: usize) -> Cell {
        self.rows[y].cells[x]
    }

    /// Overwrites the cell at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if the coordinate is outside the grid.
    pub fn set_cell(&mut self, x: usize, y: usize, cell: Cell) {
        self.rows[y].cells[x] = cell;
    }

    /// Whether the piece overlaps a wall, the floor, or a locked cell.
    ///
    /// An occupied piece cell collides when its column is outside `[0, C)`,
    /// its row is at or below the bottom boundary, or it maps onto a
    /// non-empty grid cell. Rows above the grid are exempt from the occupancy
    /// check (a piece may spawn partially above the visible field) but are
    /// still held to the horizontal bounds.
    ///
    /// This is the single source of truth for legality; movement and
    /// rotation both validate candidates through it.
    #[must_use]
    pub fn is_colliding(&self, piece: &FallingPiece) -> bool {
        #[expect(clippy::cast_possible_truncation)]
        const WIDTH: i16 = GRID_WIDTH as i16;
        #[expect(clippy::cast_possible_truncation)]
        const HEIGHT: i16 = GRID_HEIGHT as i16;

        piece.occupied_cells().into_iter().any(|(x, y)| {
            if x < 0 || x >= WIDTH || y >= HEIGHT {
                return true;
            }
            #[expect(clippy::cast_sign_loss)]
            let occupied = y >= 0 && !self.rows[y as usize].cells[x as usize].is_empty();
            occupied
        })
    }

    /// Commits the piece's occupied cells into the grid.
    ///
    /// Cells above the grid (row < 0) are discarded. The piece must not be
    /// colliding at its current position; check [`Self::is_colliding`] first.
    pub fn lock_piece(&mut self, piece: &FallingPiece) {
        for (x, y) in piece.occupied_cells() {
            if y >= 0 {
                #[expect(clippy::cast_sign_loss)]
                let (x, y) = (x as usize, y as usize);
                self.rows[y].cells[x] = Cell::Piece(piece.kind());
            }
        }
    }

    /// Clears filled rows and returns the number of rows cleared.
    ///
    /// Scans bottom to top; each surviving row shifts down by the number of
    /// full rows found below it, and the vacated top rows become empty. Rows
    /// shifted into a previously full slot are themselves re-examined, so
    /// stacked and gapped multi-row clears both compact correctly.
    pub fn clear_lines(&mut self) -> usize {
        let mut count = 0;
        for y in (0..GRID_HEIGHT).rev() {
            if self.rows[y].is_filled() {
                count += 1;
                continue;
            }
            if count > 0 {
                self.rows[y + count] = self.rows[y];
            }
        }
        self.rows[..count].fill(GridRow::EMPTY);
        count
    }
}

impl Serialize for Grid {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        // Format: one digit string of color indices per row, comma-separated
        // (e.g., "0000000000,...,0000110000")
        let mut s = String::with_capacity(GRID_HEIGHT * (GRID_WIDTH + 1));
        for (i, row) in self.rows.iter().enumerate() {
            if i > 0 {
                s.push(',');
            }
            for cell in row.cells {
                write!(&mut s, "{}", cell.color_index()).unwrap();
            }
        }
        serializer.serialize_str(&s)
    }
}

impl<'de> Deserialize<'de> for Grid {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;

        let parts: Vec<&str> = s.split(',').collect();
        if parts.len() != GRID_HEIGHT {
            return Err(serde::de::Error::custom(format!(
                "expected {GRID_HEIGHT} comma-separated rows, got {}",
                parts.len()
            )));
        }

        let mut grid = Grid::EMPTY;
        for (y, row_str) in parts.iter().enumerate() {
            if row_str.chars().count() != GRID_WIDTH {
                return Err(serde::de::Error::custom(format!(
                    "row {y} must have {GRID_WIDTH} digits, got '{row_str}'"
                )));
            }
            for (x, c) in row_str.chars().enumerate() {
                let index = c.to_digit(10).ok_or_else(|| {
                    serde::de::Error::custom(format!("invalid digit '{c}' in row {y}"))
                })?;
                #[expect(clippy::cast_possible_truncation)]
                let cell = Cell::from_color_index(index as u8).ok_or_else(|| {
                    serde::de::Error::custom(format!("color index out of range: {index}"))
                })?;
                grid.rows[y].cells[x] = cell;
            }
        }

        Ok(grid)
    }
}
