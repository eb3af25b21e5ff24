//! UI rendering

use gridsync_core::{CellRef, GridSnapshot};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
};

use super::app::{App, Mode};
use super::keymap::status_hint;

pub(crate) const FORMULA_BAR_HEIGHT: u16 = 3;
pub(crate) const GRID_MIN_HEIGHT: u16 = 10;
pub(crate) const STATUS_BAR_HEIGHT: u16 = 1;
pub(crate) const ROW_HEADER_WIDTH: u16 = 4;
pub(crate) const GRID_COLUMN_SPACING: u16 = 1;

pub(crate) fn split_main_chunks(area: Rect) -> [Rect; 3] {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(FORMULA_BAR_HEIGHT),
            Constraint::Min(GRID_MIN_HEIGHT),
            Constraint::Length(STATUS_BAR_HEIGHT),
        ])
        .split(area);
    [chunks[0], chunks[1], chunks[2]]
}

/// Draw the application UI
pub fn draw(f: &mut Frame, app: &mut App) {
    let chunks = split_main_chunks(f.area());

    // Update visible dimensions based on actual size
    let grid_area = chunks[1];
    let available_width = grid_area.width.saturating_sub(ROW_HEADER_WIDTH + 2) as usize;
    let available_height = grid_area.height.saturating_sub(3) as usize; // header + borders

    app.visible_cols = (available_width / (app.col_width + 1)).max(1);
    app.visible_rows = available_height.max(1);
    app.update_viewport();

    let snapshot = app.snapshot();
    draw_formula_bar(f, app, &snapshot, chunks[0]);
    draw_grid(f, app, &snapshot, chunks[1]);
    draw_status_bar(f, app, chunks[2]);
}

fn draw_formula_bar(f: &mut Frame, app: &App, snapshot: &GridSnapshot, area: Rect) {
    let content = match app.mode {
        Mode::Goto => {
            let (before, after) = app.goto_buffer.split_at(app.goto_cursor);
            format!("goto: {}│{}", before, after)
        }
        Mode::Edit | Mode::Normal => match snapshot.active() {
            Some(active) if app.mode == Mode::Edit => {
                let cursor = app.edit_cursor.min(active.text.len());
                let (before, after) = active.text.split_at(cursor);
                format!("{}: {}│{}", active.at, before, after)
            }
            Some(active) if active.text.is_empty() => format!("{}: (empty)", active.at),
            Some(active) => format!("{}: {}", active.at, active.text),
            None => "(no selection)".to_string(),
        },
    };

    let title = match app.mode {
        Mode::Edit => " Edit ",
        Mode::Goto => " Goto ",
        Mode::Normal => " Cell ",
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .border_style(Style::default().fg(match app.mode {
            Mode::Edit => Color::Yellow,
            Mode::Goto => Color::Cyan,
            Mode::Normal => Color::White,
        }));

    let paragraph = Paragraph::new(content).block(block);
    f.render_widget(paragraph, area);
}

fn header_style(highlight: bool) -> Style {
    if highlight {
        Style::default()
            .fg(Color::Black)
            .bg(Color::White)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray)
    }
}

fn draw_grid(f: &mut Frame, app: &App, snapshot: &GridSnapshot, area: Rect) {
    let selection = snapshot.selection;
    let cols = snapshot.rect.start_col..snapshot.rect.stop_col;

    let mut header_cells = vec![Cell::from(" ")]; // Corner
    for col in cols.clone() {
        let highlight = selection.is_some_and(|at| at.col == col);
        header_cells.push(Cell::from(CellRef::col_to_letters(col)).style(header_style(highlight)));
    }
    let header = Row::new(header_cells).height(1);

    let mut rows = Vec::new();
    for row in snapshot.rect.start_row..snapshot.rect.stop_row {
        let highlight = selection.is_some_and(|at| at.row == row);
        let mut cells = vec![Cell::from(format!("{}", row + 1)).style(header_style(highlight))];

        for view in snapshot.row(row) {
            let style = if view.active && snapshot.editing {
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Yellow)
                    .add_modifier(Modifier::BOLD)
            } else if view.active {
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Cyan)
                    .add_modifier(Modifier::BOLD)
            } else if view.text.starts_with('#') {
                Style::default().fg(Color::Red)
            } else {
                Style::default()
            };
            cells.push(Cell::from(view.text.clone()).style(style));
        }

        rows.push(Row::new(cells));
    }

    let mut widths = vec![Constraint::Length(ROW_HEADER_WIDTH)];
    for col in cols {
        widths.push(Constraint::Length(app.get_column_width(col) as u16));
    }

    let title = match app.session.store().table_id() {
        Some(table) => format!(" gridsync: {} ", table),
        None => " gridsync ".to_string(),
    };
    let table = Table::new(rows, widths)
        .header(header)
        .block(Block::default().borders(Borders::ALL).title(title))
        .column_spacing(GRID_COLUMN_SPACING);

    f.render_widget(table, area);
}

fn draw_status_bar(f: &mut Frame, app: &App, area: Rect) {
    let mode = match app.mode {
        Mode::Normal => " NORMAL ",
        Mode::Edit => " EDIT ",
        Mode::Goto => " GOTO ",
    };

    let mut spans = vec![
        Span::styled(mode, Style::default().fg(Color::Black).bg(Color::Blue)),
        Span::raw(format!(" {} ", app.remote_label)),
    ];

    if let Some(pending) = &app.pending {
        spans.push(Span::styled(
            format!(" {} ", pending),
            Style::default().fg(Color::Black).bg(Color::Yellow),
        ));
    } else if let Some(error) = &app.last_error {
        spans.push(Span::styled(
            format!(" {} ", error),
            Style::default().fg(Color::White).bg(Color::Red),
        ));
    } else if !app.status_message.is_empty() {
        spans.push(Span::raw(format!(" {} ", app.status_message)));
    }

    spans.push(Span::styled(
        format!(" {}", status_hint(app.mode)),
        Style::default().fg(Color::DarkGray),
    ));

    f.render_widget(Paragraph::new(Line::from(spans)), area);
}
