//! Read-only snapshot handed to renderers.

use crate::cell::{Cell, CellRef};
use crate::rect::{Rect, Window};

/// One visible cell as a renderer should draw it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ViewCell {
    pub at: CellRef,
    pub cell: Cell,
    /// Whether this is the selected cell.
    pub active: bool,
    /// Edit buffer for the active cell, display value for every other cell.
    pub text: String,
}

/// The cells of `rect`, row-major. `rect` always lies inside `window`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GridSnapshot {
    pub window: Window,
    pub rect: Rect,
    pub selection: Option<CellRef>,
    pub editing: bool,
    pub cells: Vec<ViewCell>,
}

impl GridSnapshot {
    /// Position of the first cell of `row` in `cells`.
    fn row_start(&self, row: usize) -> Option<usize> {
        if !(self.rect.start_row..self.rect.stop_row).contains(&row) {
            return None;
        }
        (row - self.rect.start_row).checked_mul(self.rect.width())
    }

    pub fn get(&self, at: CellRef) -> Option<&ViewCell> {
        if !self.rect.contains(at) {
            return None;
        }
        let index = self
            .row_start(at.row)?
            .checked_add(at.col - self.rect.start_col)?;
        self.cells.get(index)
    }

    /// The cells of `row` inside the snapshot's columns; empty for rows it
    /// does not cover.
    pub fn row(&self, row: usize) -> &[ViewCell] {
        let Some(start) = self.row_start(row) else {
            return &[];
        };
        let start = start.min(self.cells.len());
        let end = start.saturating_add(self.rect.width()).min(self.cells.len());
        &self.cells[start..end]
    }

    pub fn active(&self) -> Option<&ViewCell> {
        self.selection.and_then(|at| self.get(at))
    }
}
