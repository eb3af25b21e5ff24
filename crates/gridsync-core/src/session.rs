//! Edit session: which cell is active and what is being typed into it.
//!
//! The session is a small state machine:
//!
//! - `Idle`: nothing selected (initial state).
//! - `Selected`: one cell is focused; the buffer starts out as the cell's raw value.
//! - `Editing`: the user has changed the buffer since focusing.
//!
//! Navigating away discards uncommitted text. Only [`EditSession::commit`]
//! turns a buffer into a write, and only when the buffer differs from what
//! the store holds.

use crate::cell::{Cell, CellRef, CellWrite};
use crate::error::{GridsyncError, Result};
use crate::gateway::Gateway;
use crate::rect::Rect;
use crate::store::GridStore;
use crate::view::{GridSnapshot, ViewCell};
use std::sync::Arc;
use tracing::debug;

/// The active cell and its in-progress text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActiveCell {
    pub at: CellRef,
    pub buffer: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Idle,
    Selected(ActiveCell),
    Editing(ActiveCell),
}

impl SessionState {
    fn active(&self) -> Option<&ActiveCell> {
        match self {
            SessionState::Idle => None,
            SessionState::Selected(active) | SessionState::Editing(active) => Some(active),
        }
    }
}

/// What should happen to the selection after a successful commit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CommitIntent {
    /// Keep the committed cell selected.
    Stay,
    /// Explicit accept: move to the cell below, wrapping to the top row.
    Submit,
}

/// Result of a successful commit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommitOutcome {
    /// Cells returned by the store, or `None` when the buffer matched the
    /// stored raw value and no write was issued.
    pub written: Option<Vec<Cell>>,
    /// The selected cell after the commit.
    pub selection: CellRef,
}

pub struct EditSession<G> {
    store: Arc<GridStore<G>>,
    state: SessionState,
}

impl<G: Gateway> EditSession<G> {
    pub fn new(store: Arc<GridStore<G>>) -> Self {
        EditSession {
            store,
            state: SessionState::Idle,
        }
    }

    pub fn store(&self) -> &Arc<GridStore<G>> {
        &self.store
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn selection(&self) -> Option<CellRef> {
        self.state.active().map(|active| active.at)
    }

    pub fn buffer(&self) -> Option<&str> {
        self.state.active().map(|active| active.buffer.as_str())
    }

    pub fn is_editing(&self) -> bool {
        matches!(self.state, SessionState::Editing(_))
    }

    /// Select `at`, dropping whatever was being typed into the previous cell.
    pub fn focus(&mut self, at: CellRef) -> Result<()> {
        self.store.window().check(at)?;
        if let SessionState::Editing(prev) = &self.state {
            if prev.at != at {
                debug!(cell = %prev.at, "discarding uncommitted edit");
            }
        }
        let buffer = self.store.get(at).raw_value;
        self.state = SessionState::Selected(ActiveCell { at, buffer });
        Ok(())
    }

    /// Replace the buffer of the active cell. The store is not touched.
    pub fn change(&mut self, text: impl Into<String>) -> Result<()> {
        let at = self.selection().ok_or(GridsyncError::NoSelection)?;
        self.state = SessionState::Editing(ActiveCell {
            at,
            buffer: text.into(),
        });
        Ok(())
    }

    /// Throw away the typed text and start over from the stored raw value.
    pub fn revert(&mut self) -> Result<()> {
        let at = self.selection().ok_or(GridsyncError::NoSelection)?;
        self.focus(at)
    }

    /// Write the buffer through the store if it differs from the stored raw value.
    ///
    /// On failure the session is left exactly as it was, so the typed text
    /// survives for another attempt.
    pub async fn commit(&mut self, intent: CommitIntent) -> Result<CommitOutcome> {
        let active = self.state.active().ok_or(GridsyncError::NoSelection)?.clone();

        let written = if active.buffer == self.store.get(active.at).raw_value {
            debug!(cell = %active.at, "buffer unchanged, skipping write");
            None
        } else {
            let edit = CellWrite::new(active.at, active.buffer);
            Some(self.store.commit_edits(vec![edit]).await?)
        };

        let selection = match intent {
            CommitIntent::Stay => active.at,
            CommitIntent::Submit => {
                CellRef::new(self.store.window().next_row(active.at.row), active.at.col)
            }
        };
        self.focus(selection)?;

        Ok(CommitOutcome { written, selection })
    }

    /// Deselect. Uncommitted text is discarded, never written.
    pub fn blur(&mut self) {
        if let SessionState::Editing(active) = &self.state {
            debug!(cell = %active.at, "blur discards uncommitted edit");
        }
        self.state = SessionState::Idle;
    }

    /// Read-only projection of the whole window for rendering.
    pub fn snapshot(&self) -> GridSnapshot {
        self.snapshot_rect(self.store.window().rect())
    }

    /// Read-only projection of `rect`, clipped to the window.
    ///
    /// The active cell shows its buffer; every other cell shows its display value.
    pub fn snapshot_rect(&self, rect: Rect) -> GridSnapshot {
        let window = self.store.window();
        let rect = Rect {
            start_row: rect.start_row.min(window.rows),
            stop_row: rect.stop_row.clamp(rect.start_row.min(window.rows), window.rows),
            start_col: rect.start_col.min(window.cols),
            stop_col: rect.stop_col.clamp(rect.start_col.min(window.cols), window.cols),
        };
        let active = self.state.active();
        let cells = rect
            .cells()
            .map(|at| {
                let cell = self.store.get(at);
                match active {
                    Some(active) if active.at == at => ViewCell {
                        at,
                        text: active.buffer.clone(),
                        active: true,
                        cell,
                    },
                    _ => ViewCell {
                        at,
                        text: cell.display_value.clone(),
                        active: false,
                        cell,
                    },
                }
            })
            .collect();

        GridSnapshot {
            window,
            rect,
            selection: self.selection(),
            editing: self.is_editing(),
            cells,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{CommitIntent, EditSession, SessionState};
    use crate::cell::{Cell, CellRef, CellWrite};
    use crate::error::{GatewayError, GridsyncError};
    use crate::gateway::Gateway;
    use crate::rect::{Rect, Window};
    use crate::store::GridStore;
    use std::sync::{Arc, Mutex};

    /// Records every insert batch and echoes it back with `=` stripped as display.
    #[derive(Default)]
    struct RecordingGateway {
        inserts: Mutex<Vec<Vec<CellWrite>>>,
        reject: Mutex<bool>,
    }

    impl Gateway for RecordingGateway {
        async fn fetch_range(
            &self,
            _rect: Rect,
            _table_id: Option<&str>,
        ) -> Result<Vec<Cell>, GatewayError> {
            Ok(vec![Cell::new(CellRef::new(0, 0), "seed", "seed")])
        }

        async fn insert_cells(
            &self,
            cells: &[CellWrite],
            _table_id: Option<&str>,
        ) -> Result<Vec<Cell>, GatewayError> {
            if *self.reject.lock().unwrap() {
                return Err(GatewayError::Transport("timed out".into()));
            }
            self.inserts.lock().unwrap().push(cells.to_vec());
            Ok(cells
                .iter()
                .map(|w| {
                    let display = w.raw_value.trim_start_matches('=').to_string();
                    Cell::new(w.at(), w.raw_value.clone(), display)
                })
                .collect())
        }
    }

    fn session(rows: usize, cols: usize) -> EditSession<RecordingGateway> {
        let store = GridStore::new(RecordingGateway::default(), Window::new(rows, cols));
        EditSession::new(Arc::new(store))
    }

    fn insert_count(session: &EditSession<RecordingGateway>) -> usize {
        session.store().gateway().inserts.lock().unwrap().len()
    }

    #[test]
    fn test_starts_idle() {
        let session = session(5, 5);
        assert_eq!(session.state(), &SessionState::Idle);
        assert_eq!(session.selection(), None);
        assert_eq!(session.buffer(), None);
    }

    #[test]
    fn test_change_without_selection_fails() {
        let mut session = session(5, 5);
        assert_eq!(session.change("x"), Err(GridsyncError::NoSelection));
        assert_eq!(session.state(), &SessionState::Idle);
    }

    #[test]
    fn test_focus_outside_window_fails_fast() {
        let mut session = session(5, 5);
        session.focus(CellRef::new(1, 1)).unwrap();
        let err = session.focus(CellRef::new(5, 0)).unwrap_err();
        assert!(matches!(err, GridsyncError::OutOfWindow { .. }));
        assert_eq!(session.selection(), Some(CellRef::new(1, 1)));
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_focus_initializes_buffer_from_raw_value() {
        let mut session = session(5, 5);
        session.store().load_range(Rect::new(0, 1, 0, 1).unwrap()).await.unwrap();

        session.focus(CellRef::new(0, 0)).unwrap();
        assert_eq!(session.buffer(), Some("seed"));
        assert!(!session.is_editing());

        session.change("seedling").unwrap();
        assert!(session.is_editing());
        assert_eq!(session.store().get(CellRef::new(0, 0)).raw_value, "seed");
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_commit_without_selection_fails() {
        let mut session = session(5, 5);
        let err = session.commit(CommitIntent::Stay).await.unwrap_err();
        assert_eq!(err, GridsyncError::NoSelection);
        assert_eq!(insert_count(&session), 0);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_unchanged_commit_issues_no_write() {
        let mut session = session(5, 5);
        session.focus(CellRef::new(2, 2)).unwrap();

        let outcome = session.commit(CommitIntent::Stay).await.unwrap();
        assert_eq!(outcome.written, None);
        assert_eq!(outcome.selection, CellRef::new(2, 2));

        // Typing the same text back is still a no-op.
        session.change("").unwrap();
        session.commit(CommitIntent::Stay).await.unwrap();
        assert_eq!(insert_count(&session), 0);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_commit_stay_keeps_cell_selected_with_stored_value() {
        let mut session = session(5, 5);
        session.focus(CellRef::new(1, 0)).unwrap();
        session.change("=42").unwrap();

        let outcome = session.commit(CommitIntent::Stay).await.unwrap();
        let written = outcome.written.unwrap();
        assert_eq!(written[0].display_value, "42");
        assert_eq!(session.selection(), Some(CellRef::new(1, 0)));
        assert_eq!(session.buffer(), Some("=42"));
        assert!(!session.is_editing());

        let batches = session.store().gateway().inserts.lock().unwrap().clone();
        assert_eq!(batches, vec![vec![CellWrite::new(CellRef::new(1, 0), "=42")]]);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_submit_moves_down_and_wraps() {
        let mut session = session(3, 2);
        session.focus(CellRef::new(1, 1)).unwrap();
        session.change("a").unwrap();
        let outcome = session.commit(CommitIntent::Submit).await.unwrap();
        assert_eq!(outcome.selection, CellRef::new(2, 1));

        session.change("b").unwrap();
        let outcome = session.commit(CommitIntent::Submit).await.unwrap();
        assert_eq!(outcome.selection, CellRef::new(0, 1));
        assert_eq!(session.buffer(), Some(""));
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_failed_commit_keeps_buffer_and_state() {
        let mut session = session(5, 5);
        *session.store().gateway().reject.lock().unwrap() = true;
        session.focus(CellRef::new(0, 1)).unwrap();
        session.change("precious").unwrap();

        let err = session.commit(CommitIntent::Submit).await.unwrap_err();
        assert!(err.is_remote());
        assert!(session.is_editing());
        assert_eq!(session.selection(), Some(CellRef::new(0, 1)));
        assert_eq!(session.buffer(), Some("precious"));
        assert_eq!(session.store().get(CellRef::new(0, 1)).raw_value, "");

        *session.store().gateway().reject.lock().unwrap() = false;
        let outcome = session.commit(CommitIntent::Stay).await.unwrap();
        assert!(outcome.written.is_some());
        assert_eq!(session.store().get(CellRef::new(0, 1)).raw_value, "precious");
    }

    #[test]
    fn test_blur_discards_buffer() {
        let mut session = session(5, 5);
        session.focus(CellRef::new(0, 0)).unwrap();
        session.change("never saved").unwrap();
        session.blur();

        assert_eq!(session.state(), &SessionState::Idle);
        assert_eq!(session.store().get(CellRef::new(0, 0)).raw_value, "");
        assert_eq!(insert_count(&session), 0);
    }

    #[test]
    fn test_revert_restores_stored_value() {
        let mut session = session(5, 5);
        session.focus(CellRef::new(3, 3)).unwrap();
        session.change("oops").unwrap();
        session.revert().unwrap();
        assert_eq!(session.buffer(), Some(""));
        assert!(!session.is_editing());
    }

    #[test]
    fn test_snapshot_shows_buffer_only_for_active_cell() {
        let mut session = session(2, 2);
        session.focus(CellRef::new(0, 1)).unwrap();
        session.change("typing").unwrap();

        let snapshot = session.snapshot();
        assert_eq!(snapshot.cells.len(), 4);
        assert_eq!(snapshot.selection, Some(CellRef::new(0, 1)));
        assert!(snapshot.editing);

        let active: Vec<_> = snapshot.cells.iter().filter(|c| c.active).collect();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].text, "typing");
        assert_eq!(snapshot.get(CellRef::new(1, 0)).unwrap().text, "");
    }

    #[test]
    fn test_snapshot_rect_is_clipped_to_window() {
        let mut session = session(4, 3);
        session.focus(CellRef::new(3, 2)).unwrap();

        let rect = Rect {
            start_row: 2,
            stop_row: 1_000_000,
            start_col: 1,
            stop_col: usize::MAX,
        };
        let snapshot = session.snapshot_rect(rect);
        assert_eq!(snapshot.rect, Rect::new(2, 4, 1, 3).unwrap());
        assert_eq!(snapshot.cells.len(), 4);
        assert_eq!(snapshot.active().unwrap().at, CellRef::new(3, 2));
        assert!(snapshot.get(CellRef::new(0, 0)).is_none());

        let beyond = session.snapshot_rect(Rect::new(10, 12, 5, 6).unwrap());
        assert!(beyond.cells.is_empty());
        assert!(beyond.active().is_none());
    }
}
