//! Application state and logic.
//!
//! [`App`] wraps the edit session with the terminal-only state: the modal
//! [`Mode`], cursor position inside the edit buffer, viewport and status line.
//! Remote work is expressed as a [`RemoteOp`] so the event loop can show it as
//! pending before awaiting it.

use std::collections::HashMap;

use gridsync_core::{
    CellRef, CommitIntent, EditSession, GridSnapshot, GridsyncError, Rect, Window,
};
use gridsync_remote::RemoteGateway;
use tracing::{info, warn};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    /// Move the selection, single-key commands.
    Normal,
    /// Type into the selected cell.
    Edit,
    /// Type a cell name to jump to.
    Goto,
}

/// A remote call the event loop awaits before reading more input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RemoteOp {
    Reload,
    Commit(CommitIntent),
}

pub struct App {
    pub session: EditSession<RemoteGateway>,
    pub mode: Mode,
    /// Cursor position within the edit buffer (byte offset)
    pub edit_cursor: usize,
    pub goto_buffer: String,
    pub goto_cursor: usize,
    pub viewport_col: usize,
    pub viewport_row: usize,
    pub visible_cols: usize,
    pub visible_rows: usize,
    /// Default column width for display
    pub col_width: usize,
    pub column_widths: HashMap<usize, usize>,
    pub status_message: String,
    /// Last failed operation, shown until the next success.
    pub last_error: Option<String>,
    /// Remote call in flight, if any.
    pub pending: Option<String>,
    /// Where the cells come from, for the status bar.
    pub remote_label: String,
}

impl App {
    pub fn new(
        session: EditSession<RemoteGateway>,
        col_width: usize,
        remote_label: impl Into<String>,
    ) -> Self {
        Self {
            session,
            mode: Mode::Normal,
            edit_cursor: 0,
            goto_buffer: String::new(),
            goto_cursor: 0,
            viewport_col: 0,
            viewport_row: 0,
            visible_cols: 8,
            visible_rows: 20,
            col_width,
            column_widths: HashMap::new(),
            status_message: String::new(),
            last_error: None,
            pending: None,
            remote_label: remote_label.into(),
        }
    }

    pub fn window(&self) -> Window {
        self.session.store().window()
    }

    /// The selected cell, or A1 when nothing is selected.
    pub fn cursor(&self) -> CellRef {
        self.session.selection().unwrap_or(CellRef::new(0, 0))
    }

    /// Cells in the viewport only; the window may be far larger than the screen.
    pub fn snapshot(&self) -> GridSnapshot {
        self.session.snapshot_rect(self.viewport())
    }

    pub fn viewport(&self) -> Rect {
        Rect {
            start_row: self.viewport_row,
            stop_row: self.viewport_row.saturating_add(self.visible_rows),
            start_col: self.viewport_col,
            stop_col: self.viewport_col.saturating_add(self.visible_cols),
        }
    }

    /// Mark `op` as pending; the caller redraws, then calls [`App::perform`].
    pub fn begin(&mut self, op: RemoteOp) {
        let label = match op {
            RemoteOp::Reload => "loading window...".to_string(),
            RemoteOp::Commit(_) => format!("saving {}...", self.cursor()),
        };
        self.pending = Some(label);
    }

    pub async fn perform(&mut self, op: RemoteOp) {
        match op {
            RemoteOp::Reload => self.reload().await,
            RemoteOp::Commit(intent) => self.commit(intent).await,
        }
        self.pending = None;
    }

    async fn reload(&mut self) {
        let rect = self.window().rect();
        match self.session.store().load_range(rect).await {
            Ok(count) => {
                info!(count, "window loaded");
                self.last_error = None;
                self.status_message = format!("Loaded {} cells", count);
                // Show fresh values in the selected cell unless the user is typing.
                if !self.session.is_editing()
                    && let Some(at) = self.session.selection()
                {
                    self.focus(at);
                }
            }
            Err(e) => self.fail("reload", e),
        }
    }

    async fn commit(&mut self, intent: CommitIntent) {
        let at = self.cursor();
        match self.session.commit(intent).await {
            Ok(outcome) => {
                self.mode = Mode::Normal;
                self.edit_cursor = 0;
                self.last_error = None;
                self.status_message = match outcome.written {
                    Some(_) => format!("Saved {}", at),
                    None => format!("{} unchanged", at),
                };
                self.update_viewport();
            }
            // The session keeps the buffer; stay in Edit mode so it can be retried.
            Err(e) => self.fail("commit", e),
        }
    }

    fn fail(&mut self, what: &str, err: GridsyncError) {
        warn!(error = %err, "{} failed", what);
        self.last_error = Some(format!("{} failed: {}", what, err));
    }

    pub fn focus(&mut self, at: CellRef) {
        match self.session.focus(at) {
            Ok(()) => self.update_viewport(),
            Err(e) => self.fail("focus", e),
        }
    }

    /// Move the selection by delta, clamped to the window.
    pub fn move_selection(&mut self, d_row: isize, d_col: isize) {
        let at = self.window().offset(self.cursor(), d_row, d_col);
        self.focus(at);
    }

    pub fn home_col(&mut self) {
        let at = CellRef::new(self.cursor().row, 0);
        self.focus(at);
    }

    pub fn end_col(&mut self) {
        let at = CellRef::new(self.cursor().row, self.window().cols.saturating_sub(1));
        self.focus(at);
    }

    /// Enter edit mode for the selected cell, cursor at the end of the buffer.
    pub fn enter_edit(&mut self) {
        if self.session.selection().is_none() {
            self.focus(CellRef::new(0, 0));
        }
        self.edit_cursor = self.session.buffer().map(str::len).unwrap_or(0);
        self.mode = Mode::Edit;
    }

    /// Replace the buffer after a keystroke in Edit mode.
    pub fn set_buffer(&mut self, text: String) {
        if let Err(e) = self.session.change(text) {
            self.fail("edit", e);
        }
    }

    /// Escape in Edit mode: forget the typed text.
    pub fn revert_edit(&mut self) {
        if let Err(e) = self.session.revert() {
            self.fail("revert", e);
        }
        self.mode = Mode::Normal;
        self.edit_cursor = 0;
    }

    pub fn blur(&mut self) {
        self.session.blur();
        self.mode = Mode::Normal;
    }

    pub fn open_goto(&mut self) {
        self.mode = Mode::Goto;
        self.goto_buffer.clear();
        self.goto_cursor = 0;
    }

    pub fn cancel_goto(&mut self) {
        self.mode = Mode::Normal;
        self.goto_buffer.clear();
        self.goto_cursor = 0;
    }

    /// Jump to the cell named in the goto prompt.
    pub fn execute_goto(&mut self) {
        let target = self.goto_buffer.trim().to_string();
        self.cancel_goto();
        match CellRef::parse_a1(&target) {
            Some(at) if self.window().contains(at) => {
                self.focus(at);
                self.status_message = format!("Jumped to {}", at);
            }
            Some(at) => {
                let window = self.window();
                self.status_message =
                    format!("{} is outside the {}x{} window", at, window.rows, window.cols);
            }
            None => self.status_message = format!("Invalid cell reference: {}", target),
        }
    }

    /// Update viewport to keep the selection visible
    pub fn update_viewport(&mut self) {
        let cursor = self.cursor();

        if cursor.col < self.viewport_col {
            self.viewport_col = cursor.col;
        } else if cursor.col >= self.viewport_col + self.visible_cols {
            self.viewport_col = cursor.col + 1 - self.visible_cols;
        }

        if cursor.row < self.viewport_row {
            self.viewport_row = cursor.row;
        } else if cursor.row >= self.viewport_row + self.visible_rows {
            self.viewport_row = cursor.row + 1 - self.visible_rows;
        }
    }

    pub fn get_column_width(&self, col: usize) -> usize {
        *self.column_widths.get(&col).unwrap_or(&self.col_width)
    }

    fn set_column_width(&mut self, width: usize) {
        let width = width.clamp(4, 50);
        self.column_widths.insert(self.cursor().col, width);
    }

    pub fn increase_column_width(&mut self) {
        let current = self.get_column_width(self.cursor().col);
        self.set_column_width(current + 2);
    }

    pub fn decrease_column_width(&mut self) {
        let current = self.get_column_width(self.cursor().col);
        self.set_column_width(current.saturating_sub(2));
    }
}
