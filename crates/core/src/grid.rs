//! Grid module - manages the playing field
//!
//! The grid is a `cols x rows` field where each cell holds a colour value
//! (0 = empty). Uses a flat vector for cache locality.
//! Coordinates: (x, y) where x is the column (left to right) and y is the row
//! (top to bottom).
//!
//! A placement targets the *centre* of the piece's 3x3 box: `place(piece, x, y)`
//! checks and writes the box anchored at `(x - 1, y - 1)`.

use std::fmt;

use crate::pieces::GamePiece;
use crate::types::{GridCoord, EMPTY, OUT_OF_BOUNDS};

/// Callback invoked after every cell write with the coordinate and new value.
///
/// It runs in the middle of the write, while whoever owns the grid is still
/// mutating it. Observers must not call back into that owner; a game driven
/// through a session holds the session lock here.
pub type CellObserver = Box<dyn Fn(GridCoord, u8) + Send + Sync>;

/// The playing field
pub struct Grid {
    cols: usize,
    rows: usize,
    /// Flat array of cells, row-major order (y * cols + x)
    cells: Vec<u8>,
    observer: Option<CellObserver>,
}

impl Grid {
    /// Create a new empty grid
    pub fn new(cols: usize, rows: usize) -> Self {
        Self {
            cols,
            rows,
            cells: vec![EMPTY; cols * rows],
            observer: None,
        }
    }

    /// Calculate flat index from (x, y) coordinates
    #[inline(always)]
    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x as usize >= self.cols || y as usize >= self.rows {
            return None;
        }
        Some(y as usize * self.cols + x as usize)
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Get cell at position (x, y)
    /// Returns None if out of bounds
    pub fn get(&self, x: i32, y: i32) -> Option<u8> {
        self.index(x, y).map(|idx| self.cells[idx])
    }

    /// Get cell at position (x, y), or [`OUT_OF_BOUNDS`] (-1) outside the grid
    pub fn value_at(&self, x: i32, y: i32) -> i32 {
        self.get(x, y).map_or(OUT_OF_BOUNDS, i32::from)
    }

    /// Set cell at position (x, y) and notify the observer
    ///
    /// # Panics
    ///
    /// Panics if (x, y) lies outside the grid. Writers always work from the
    /// grid's own dimensions, so a stray coordinate is a logic error.
    pub fn set(&mut self, x: i32, y: i32, value: u8) {
        let Some(idx) = self.index(x, y) else {
            panic!(
                "cell ({x}, {y}) is outside the {}x{} grid",
                self.cols, self.rows
            );
        };
        self.cells[idx] = value;
        if let Some(observer) = &self.observer {
            observer(GridCoord::new(x as usize, y as usize), value);
        }
    }

    /// Check if position is within bounds and empty
    pub fn is_empty(&self, x: i32, y: i32) -> bool {
        self.get(x, y) == Some(EMPTY)
    }

    /// Check whether the piece's box, anchored at its top-left corner
    /// `(origin_x, origin_y)`, fits: every block must land on an in-bounds,
    /// empty cell.
    pub fn can_place(&self, piece: &GamePiece, origin_x: i32, origin_y: i32) -> bool {
        piece
            .blocks()
            .iter()
            .all(|&(dx, dy, _)| self.is_empty(origin_x + dx, origin_y + dy))
    }

    /// Place a piece centred on (x, y)
    /// Returns false (and leaves the grid untouched) if any block would land
    /// out of bounds or on an occupied cell
    pub fn place(&mut self, piece: &GamePiece, x: i32, y: i32) -> bool {
        let (origin_x, origin_y) = (x - 1, y - 1);
        if !self.can_place(piece, origin_x, origin_y) {
            return false;
        }

        for (dx, dy, value) in piece.blocks() {
            self.set(origin_x + dx, origin_y + dy, value);
        }

        true
    }

    /// Check if a row is completely filled
    pub fn is_row_full(&self, y: usize) -> bool {
        if y >= self.rows {
            return false;
        }
        let start = y * self.cols;
        self.cells[start..start + self.cols]
            .iter()
            .all(|&cell| cell != EMPTY)
    }

    /// Check if a column is completely filled
    pub fn is_col_full(&self, x: usize) -> bool {
        if x >= self.cols {
            return false;
        }
        (0..self.rows).all(|y| self.cells[y * self.cols + x] != EMPTY)
    }

    /// Empty a single cell (no-op outside the grid)
    pub fn clear_cell(&mut self, coord: GridCoord) {
        if coord.x < self.cols && coord.y < self.rows {
            self.set(coord.x as i32, coord.y as i32, EMPTY);
        }
    }

    /// Empty every cell
    pub fn clear(&mut self) {
        for y in 0..self.rows {
            for x in 0..self.cols {
                self.set(x as i32, y as i32, EMPTY);
            }
        }
    }

    /// Get a reference to the internal cells array (row-major)
    pub fn cells(&self) -> &[u8] {
        &self.cells
    }

    /// Cells in column-major order (for each column, every row top to bottom)
    ///
    /// This is the order the multiplayer server expects for board updates.
    pub fn column_major(&self) -> impl Iterator<Item = u8> + '_ {
        (0..self.cols)
            .flat_map(move |x| (0..self.rows).map(move |y| self.cells[y * self.cols + x]))
    }

    /// Subscribe to cell writes, replacing any previous observer
    pub fn set_observer(&mut self, observer: CellObserver) {
        self.observer = Some(observer);
    }

    /// Create from rows of values for testing
    #[cfg(test)]
    pub fn from_rows(rows: &[&[u8]]) -> Self {
        let cols = rows.first().map_or(0, |r| r.len());
        assert!(rows.iter().all(|r| r.len() == cols));
        let mut grid = Self::new(cols, rows.len());
        for (y, row) in rows.iter().enumerate() {
            grid.cells[y * cols..(y + 1) * cols].copy_from_slice(row);
        }
        grid
    }
}

impl Clone for Grid {
    /// Clones the cells only; observers are not carried over.
    fn clone(&self) -> Self {
        Self {
            cols: self.cols,
            rows: self.rows,
            cells: self.cells.clone(),
            observer: None,
        }
    }
}

impl PartialEq for Grid {
    fn eq(&self, other: &Self) -> bool {
        self.cols == other.cols && self.rows == other.rows && self.cells == other.cells
    }
}

impl fmt::Debug for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Grid")
            .field("cols", &self.cols)
            .field("rows", &self.rows)
            .field("cells", &self.cells)
            .field("observed", &self.observer.is_some())
            .finish()
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in 0..self.rows {
            for x in 0..self.cols {
                let cell = self.cells[y * self.cols + x];
                if x > 0 {
                    f.write_str(" ")?;
                }
                if cell == EMPTY {
                    f.write_str(" .")?;
                } else {
                    write!(f, "{cell:2}")?;
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::pieces::GamePiece;
    use crate::types::PieceKind;

    #[test]
    fn test_grid_index_calculation() {
        let grid = Grid::new(5, 4);
        assert_eq!(grid.index(0, 0), Some(0));
        assert_eq!(grid.index(4, 0), Some(4));
        assert_eq!(grid.index(0, 1), Some(5));
        assert_eq!(grid.index(4, 3), Some(19));
        assert_eq!(grid.index(-1, 0), None);
        assert_eq!(grid.index(5, 0), None);
        assert_eq!(grid.index(0, 4), None);
    }

    #[test]
    fn test_out_of_bounds_reads_return_sentinel() {
        let grid = Grid::new(5, 5);
        assert_eq!(grid.value_at(-1, 0), OUT_OF_BOUNDS);
        assert_eq!(grid.value_at(0, 5), OUT_OF_BOUNDS);
        assert_eq!(grid.value_at(2, 2), 0);
        assert_eq!(grid.get(7, 7), None);
    }

    #[test]
    fn test_place_anchors_on_centre() {
        let mut grid = Grid::new(5, 5);
        let dot = GamePiece::new(PieceKind::Dot);

        assert!(grid.place(&dot, 0, 0));
        assert_eq!(grid.get(0, 0), Some(PieceKind::Dot.value()));
        assert_eq!(grid.cells().iter().filter(|&&c| c != 0).count(), 1);
    }

    #[test]
    fn test_place_rejects_edges_without_mutation() {
        let mut grid = Grid::new(5, 5);
        let plus = GamePiece::new(PieceKind::Plus);

        // Centre on the corner: arms would leave the grid.
        assert!(!grid.place(&plus, 0, 0));
        assert!(grid.cells().iter().all(|&c| c == 0));

        assert!(grid.place(&plus, 2, 2));
        // Overlapping centre is now occupied.
        assert!(!grid.place(&plus, 2, 2));
    }

    #[test]
    fn test_full_row_and_column_detection() {
        let grid = Grid::from_rows(&[&[1, 1, 1], &[0, 2, 0], &[0, 3, 0]]);
        assert!(grid.is_row_full(0));
        assert!(!grid.is_row_full(1));
        assert!(grid.is_col_full(1));
        assert!(!grid.is_col_full(0));
        assert!(!grid.is_row_full(3));
    }

    #[test]
    fn test_column_major_order() {
        let grid = Grid::from_rows(&[&[1, 2], &[3, 4], &[5, 6]]);
        let encoded: Vec<u8> = grid.column_major().collect();
        assert_eq!(encoded, vec![1, 3, 5, 2, 4, 6]);
    }

    #[test]
    fn test_observer_sees_every_write() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);

        let mut grid = Grid::new(5, 5);
        grid.set_observer(Box::new(move |coord, value| {
            sink.lock().unwrap().push((coord, value));
        }));

        grid.place(&GamePiece::new(PieceKind::Double), 2, 2);
        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert!(seen.iter().all(|&(_, v)| v == PieceKind::Double.value()));
    }

    #[test]
    #[should_panic(expected = "outside")]
    fn test_set_out_of_bounds_panics() {
        let mut grid = Grid::new(5, 5);
        grid.set(5, 0, 1);
    }
}
