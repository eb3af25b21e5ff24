use std::io;
use std::time::Duration;

use crossterm::event::{self, Event, KeyEventKind};
use gridsync_core::CellRef;
use ratatui::prelude::*;
use tracing::debug;

use super::actions::{ApplyResult, handle_key};
use super::app::{App, RemoteOp};
use super::ui;

/// Drop input typed while a remote call was running.
fn discard_queued_input() -> io::Result<()> {
    while event::poll(Duration::ZERO)? {
        let _ = event::read()?;
    }
    Ok(())
}

/// Redraw with the call marked pending, await it, redraw with the result.
async fn await_remote<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    op: RemoteOp,
) -> io::Result<()> {
    app.begin(op);
    terminal.draw(|f| ui::draw(f, app))?;
    app.perform(op).await;
    discard_queued_input()
}

pub async fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    await_remote(terminal, app, RemoteOp::Reload).await?;
    app.focus(CellRef::new(0, 0));

    loop {
        terminal.draw(|f| ui::draw(f, app))?;

        match event::read()? {
            Event::Key(key) => {
                // Only process key press events (Windows reports Press + Release)
                if key.kind != KeyEventKind::Press {
                    continue;
                }

                match handle_key(app, key) {
                    ApplyResult::Continue => {}
                    ApplyResult::Quit => {
                        debug!("quit requested");
                        return Ok(());
                    }
                    ApplyResult::Await(op) => await_remote(terminal, app, op).await?,
                }
            }
            // Resize and everything else just triggers a redraw.
            _ => {}
        }
    }
}
