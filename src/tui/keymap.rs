//! Keymap translation layer.
//!
//! This keeps key handling separate from app behavior. Keys that map to no
//! action in Edit and Goto mode are handled as text input.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::app::Mode;

/// Actions that can be triggered by key presses.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Action {
    /// Leave Edit mode and restore the stored raw value.
    RevertEdit,
    /// Drop the selection.
    Blur,
    /// Enter Edit mode for the selected cell.
    EnterEdit,
    /// Commit the buffer and move to the cell below.
    Submit,
    /// Commit the buffer and keep the cell selected.
    CommitStay,
    /// Open the goto prompt.
    OpenGoto,
    /// Jump to the cell typed in the goto prompt.
    ExecuteGoto,
    /// Close the goto prompt.
    CancelGoto,
    /// Fetch the whole window again.
    Reload,

    /// Move the selection by (d_row, d_col).
    Move(isize, isize),
    /// Page up (-1) or down (+1).
    Page(isize),
    /// Jump to first column.
    HomeCol,
    /// Jump to last column.
    EndCol,

    /// Increase current column width.
    IncColWidth,
    /// Decrease current column width.
    DecColWidth,
    Quit,
}

pub fn status_hint(mode: Mode) -> &'static str {
    match mode {
        Mode::Normal => "hjkl:move  i:edit  g:goto  r:reload  +/-:width  Esc:blur  q:quit",
        Mode::Edit => "Enter:submit  Tab:commit  Esc:revert",
        Mode::Goto => "Enter:go  Esc:cancel",
    }
}

/// Translate a key event to an action for the current mode.
///
/// Returns `None` if the key has no binding in the current context.
pub fn translate(mode: Mode, key: KeyEvent) -> Option<Action> {
    match mode {
        Mode::Normal => match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                Some(Action::Quit)
            }
            KeyCode::Up | KeyCode::Char('k') => Some(Action::Move(-1, 0)),
            KeyCode::Down | KeyCode::Char('j') => Some(Action::Move(1, 0)),
            KeyCode::Left | KeyCode::Char('h') => Some(Action::Move(0, -1)),
            KeyCode::Right | KeyCode::Char('l') => Some(Action::Move(0, 1)),

            KeyCode::PageUp => Some(Action::Page(-1)),
            KeyCode::PageDown => Some(Action::Page(1)),
            KeyCode::Home => Some(Action::HomeCol),
            KeyCode::End => Some(Action::EndCol),

            KeyCode::Enter | KeyCode::F(2) | KeyCode::Char('i') => Some(Action::EnterEdit),
            KeyCode::Esc => Some(Action::Blur),
            KeyCode::Char('g') => Some(Action::OpenGoto),
            KeyCode::F(5) | KeyCode::Char('r') => Some(Action::Reload),
            KeyCode::Char('+') | KeyCode::Char('>') => Some(Action::IncColWidth),
            KeyCode::Char('-') | KeyCode::Char('<') => Some(Action::DecColWidth),
            KeyCode::Char('q') => Some(Action::Quit),
            _ => None,
        },

        Mode::Edit => match key.code {
            KeyCode::Esc => Some(Action::RevertEdit),
            KeyCode::Enter => Some(Action::Submit),
            KeyCode::Tab => Some(Action::CommitStay),
            _ => None,
        },

        Mode::Goto => match key.code {
            KeyCode::Esc => Some(Action::CancelGoto),
            KeyCode::Enter => Some(Action::ExecuteGoto),
            _ => None,
        },
    }
}
