pub mod input;
pub mod render;
pub mod state;

use crate::engine::EngineCommand;
use anyhow::Result;
use crossterm::{
    event::{Event, EventStream, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use futures_util::StreamExt;
use input::{handle_key, KeyAction};
use ratatui::prelude::*;
use state::{AppState, ViewState};
use std::io::stdout;
use std::time::Duration;
use tokio::sync::{mpsc, watch};

/// Run the TUI. Reads state from `state_rx`, sends commands on `cmd_tx`.
pub async fn run_tui(
    state_rx: watch::Receiver<AppState>,
    cmd_tx: mpsc::Sender<EngineCommand>,
) -> Result<()> {
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let result = tui_loop(&mut terminal, state_rx, cmd_tx).await;

    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    result
}

async fn tui_loop(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    mut state_rx: watch::Receiver<AppState>,
    cmd_tx: mpsc::Sender<EngineCommand>,
) -> Result<()> {
    let mut view = ViewState::new();
    let mut events = EventStream::new();
    // Drives the spinner and the clock on the schedule screen.
    let mut tick = tokio::time::interval(Duration::from_millis(100));
    tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        let state = state_rx.borrow().clone();
        view.clamp_cursor(state.schedule.len());
        terminal.draw(|f| render::draw(f, &state, &view))?;

        tokio::select! {
            maybe_event = events.next() => {
                let Some(event) = maybe_event else { return Ok(()) };
                if let Event::Key(key) = event? {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    match handle_key(&mut view, &state, key.code) {
                        KeyAction::Quit => {
                            let _ = cmd_tx.send(EngineCommand::Quit).await;
                            return Ok(());
                        }
                        KeyAction::Send(cmd) => {
                            if cmd_tx.send(cmd).await.is_err() {
                                tracing::error!("engine stopped, closing TUI");
                                return Ok(());
                            }
                        }
                        KeyAction::None => {}
                    }
                }
            }
            changed = state_rx.changed() => {
                if changed.is_err() {
                    return Ok(());
                }
            }
            _ = tick.tick() => {
                view.spinner_frame = view.spinner_frame.wrapping_add(1);
            }
        }
    }
}
