use crossterm::event::{self, KeyCode, KeyModifiers};
use gridsync_core::CommitIntent;

use super::app::{App, Mode, RemoteOp};
use super::keymap::Action;

/// Byte offset of the char before `at`, or 0.
fn prev_boundary(text: &str, at: usize) -> usize {
    text[..at].char_indices().next_back().map_or(0, |(i, _)| i)
}

/// Byte offset just past the char at `at`, or `at` at the end of `text`.
fn next_boundary(text: &str, at: usize) -> usize {
    text[at..].chars().next().map_or(at, |c| at + c.len_utf8())
}

fn is_backspace(key: &event::KeyEvent) -> bool {
    key.code == KeyCode::Backspace
        || (key.code == KeyCode::Char('h') && key.modifiers.contains(KeyModifiers::CONTROL))
}

/// Apply one editing key to a single-line prompt. `cursor` is a byte offset
/// kept on a char boundary. Returns whether `text` changed.
fn edit_line(text: &mut String, cursor: &mut usize, key: event::KeyEvent) -> bool {
    *cursor = (*cursor).min(text.len());

    if is_backspace(&key) {
        if *cursor == 0 {
            return false;
        }
        let start = prev_boundary(text, *cursor);
        text.replace_range(start..*cursor, "");
        *cursor = start;
        return true;
    }

    match key.code {
        KeyCode::Left => *cursor = prev_boundary(text, *cursor),
        KeyCode::Right => *cursor = next_boundary(text, *cursor),
        KeyCode::Home => *cursor = 0,
        KeyCode::End => *cursor = text.len(),
        KeyCode::Delete if *cursor < text.len() => {
            let end = next_boundary(text, *cursor);
            text.replace_range(*cursor..end, "");
            return true;
        }
        KeyCode::Char(c) if key.modifiers.difference(KeyModifiers::SHIFT).is_empty() => {
            text.insert(*cursor, c);
            *cursor += c.len_utf8();
            return true;
        }
        _ => {}
    }
    false
}

/// Result of applying an action.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ApplyResult {
    Continue,
    Quit,
    /// The event loop must run this remote call before reading more input.
    Await(RemoteOp),
}

/// Apply an action to the application state.
pub fn apply_action(app: &mut App, action: Action) -> ApplyResult {
    match action {
        Action::RevertEdit => app.revert_edit(),
        Action::Blur => app.blur(),
        Action::EnterEdit => app.enter_edit(),
        Action::Submit => return ApplyResult::Await(RemoteOp::Commit(CommitIntent::Submit)),
        Action::CommitStay => return ApplyResult::Await(RemoteOp::Commit(CommitIntent::Stay)),
        Action::OpenGoto => app.open_goto(),
        Action::ExecuteGoto => app.execute_goto(),
        Action::CancelGoto => app.cancel_goto(),
        Action::Reload => return ApplyResult::Await(RemoteOp::Reload),

        Action::Move(d_row, d_col) => app.move_selection(d_row, d_col),
        Action::Page(dir) => {
            let delta = app.visible_rows as isize * dir;
            app.move_selection(delta, 0);
        }
        Action::HomeCol => app.home_col(),
        Action::EndCol => app.end_col(),

        Action::IncColWidth => app.increase_column_width(),
        Action::DecColWidth => app.decrease_column_width(),
        Action::Quit => return ApplyResult::Quit,
    }
    ApplyResult::Continue
}

/// Feed an unbound key to the edit buffer; every change goes through the session.
pub fn handle_edit_text(app: &mut App, key: event::KeyEvent) {
    let mut buffer = app.session.buffer().unwrap_or_default().to_string();
    if edit_line(&mut buffer, &mut app.edit_cursor, key) {
        app.set_buffer(buffer);
    }
}

pub fn handle_goto_text(app: &mut App, key: event::KeyEvent) {
    edit_line(&mut app.goto_buffer, &mut app.goto_cursor, key);
}

/// Route a key press for the current mode.
pub fn handle_key(app: &mut App, key: event::KeyEvent) -> ApplyResult {
    if let Some(action) = super::keymap::translate(app.mode, key) {
        return apply_action(app, action);
    }
    match app.mode {
        Mode::Edit => handle_edit_text(app, key),
        Mode::Goto => handle_goto_text(app, key),
        Mode::Normal => {}
    }
    ApplyResult::Continue
}
