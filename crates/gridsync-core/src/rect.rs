//! Range queries and the visible window.

use crate::cell::CellRef;
use crate::error::{GridsyncError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Half-open rectangular range: start bounds are inclusive, stop bounds exclusive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rect {
    pub start_row: usize,
    pub stop_row: usize,
    pub start_col: usize,
    pub stop_col: usize,
}

impl Rect {
    /// Build a rect, rejecting inverted bounds.
    pub fn new(start_row: usize, stop_row: usize, start_col: usize, stop_col: usize) -> Result<Rect> {
        let rect = Rect {
            start_row,
            stop_row,
            start_col,
            stop_col,
        };
        rect.validate()?;
        Ok(rect)
    }

    /// Rects can also be built as struct literals, so every consumer re-checks.
    pub fn validate(&self) -> Result<()> {
        if self.start_row > self.stop_row || self.start_col > self.stop_col {
            return Err(GridsyncError::InvalidRect { rect: *self });
        }
        Ok(())
    }

    pub fn width(&self) -> usize {
        self.stop_col.saturating_sub(self.start_col)
    }

    pub fn height(&self) -> usize {
        self.stop_row.saturating_sub(self.start_row)
    }

    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    pub fn contains(&self, at: CellRef) -> bool {
        (self.start_row..self.stop_row).contains(&at.row)
            && (self.start_col..self.stop_col).contains(&at.col)
    }

    /// Iterate the covered cells in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = CellRef> + use<> {
        let cols = self.start_col..self.stop_col;
        (self.start_row..self.stop_row)
            .flat_map(move |row| cols.clone().map(move |col| CellRef::new(row, col)))
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "rows {}..{}, cols {}..{}",
            self.start_row, self.stop_row, self.start_col, self.stop_col
        )
    }
}

/// The configured visible window: the grid store never holds keys outside it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Window {
    pub rows: usize,
    pub cols: usize,
}

impl Window {
    pub fn new(rows: usize, cols: usize) -> Window {
        Window { rows, cols }
    }

    pub fn contains(&self, at: CellRef) -> bool {
        at.row < self.rows && at.col < self.cols
    }

    pub fn check(&self, at: CellRef) -> Result<()> {
        if self.contains(at) {
            Ok(())
        } else {
            Err(GridsyncError::OutOfWindow {
                cell: at,
                rows: self.rows,
                cols: self.cols,
            })
        }
    }

    /// The rect covering the whole window.
    pub fn rect(&self) -> Rect {
        Rect {
            start_row: 0,
            stop_row: self.rows,
            start_col: 0,
            stop_col: self.cols,
        }
    }

    /// Row below `row`, wrapping back to the top of the window.
    pub fn next_row(&self, row: usize) -> usize {
        if row + 1 >= self.rows { 0 } else { row + 1 }
    }

    /// Move `at` by a delta, clamping to the window.
    pub fn offset(&self, at: CellRef, d_row: isize, d_col: isize) -> CellRef {
        let clamp = |v: usize, d: isize, len: usize| {
            v.saturating_add_signed(d).min(len.saturating_sub(1))
        };
        CellRef::new(clamp(at.row, d_row, self.rows), clamp(at.col, d_col, self.cols))
    }
}

impl Default for Window {
    fn default() -> Self {
        Window::new(20, 10)
    }
}
