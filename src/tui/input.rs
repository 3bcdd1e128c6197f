use super::state::{AppState, InputMode, Tab, ViewState};
use crate::engine::EngineCommand;
use crate::feeder::logs::next_filter;
use crate::feeder::schedule::{current_minute, parse_time};
use crossterm::event::KeyCode;

/// What the TUI loop should do after a key press.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyAction {
    None,
    Quit,
    Send(EngineCommand),
}

pub fn handle_key(view: &mut ViewState, state: &AppState, code: KeyCode) -> KeyAction {
    if view.is_editing() {
        return handle_edit_key(view, code);
    }

    match code {
        KeyCode::Char('q') => return KeyAction::Quit,
        KeyCode::Tab => {
            let next = view.tab.next();
            return switch_tab(view, next);
        }
        KeyCode::BackTab => {
            let prev = view.tab.prev();
            return switch_tab(view, prev);
        }
        KeyCode::Char(c @ '1'..='4') => {
            let idx = c as usize - '1' as usize;
            return switch_tab(view, Tab::ALL[idx]);
        }
        _ => {}
    }

    match view.tab {
        Tab::Home => handle_home_key(view, state, code),
        Tab::Schedule => handle_schedule_key(view, state, code),
        Tab::Logs => handle_logs_key(view, code),
        Tab::Settings => handle_settings_key(view, state, code),
    }
}

/// Entering Home re-checks the connection, like opening the dashboard does.
fn switch_tab(view: &mut ViewState, tab: Tab) -> KeyAction {
    if view.tab == tab {
        return KeyAction::None;
    }
    view.tab = tab;
    if tab == Tab::Home {
        KeyAction::Send(EngineCommand::Probe)
    } else {
        KeyAction::None
    }
}

fn handle_home_key(view: &mut ViewState, state: &AppState, code: KeyCode) -> KeyAction {
    match code {
        KeyCode::Char('f') | KeyCode::Enter => {
            // The button is disabled while a request is outstanding.
            if state.is_feeding {
                KeyAction::None
            } else {
                view.history_scroll = 0;
                KeyAction::Send(EngineCommand::Feed)
            }
        }
        KeyCode::Char('j') | KeyCode::Down => {
            if view.history_scroll + 1 < state.history.len() {
                view.history_scroll += 1;
            }
            KeyAction::None
        }
        KeyCode::Char('k') | KeyCode::Up => {
            view.history_scroll = view.history_scroll.saturating_sub(1);
            KeyAction::None
        }
        _ => KeyAction::None,
    }
}

fn handle_schedule_key(view: &mut ViewState, state: &AppState, code: KeyCode) -> KeyAction {
    view.clamp_cursor(state.schedule.len());
    let current_id = state.schedule.entries().get(view.schedule_cursor).map(|e| e.id);

    match code {
        KeyCode::Char('j') | KeyCode::Down => {
            if view.schedule_cursor + 1 < state.schedule.len() {
                view.schedule_cursor += 1;
            }
            KeyAction::None
        }
        KeyCode::Char('k') | KeyCode::Up => {
            view.schedule_cursor = view.schedule_cursor.saturating_sub(1);
            KeyAction::None
        }
        KeyCode::Char(' ') => match current_id {
            Some(id) => KeyAction::Send(EngineCommand::ToggleScheduleSelected(id)),
            None => KeyAction::None,
        },
        KeyCode::Char('t') => match current_id {
            Some(id) => KeyAction::Send(EngineCommand::ToggleScheduleActive(id)),
            None => KeyAction::None,
        },
        KeyCode::Char('a') => KeyAction::Send(EngineCommand::AddSchedule(current_minute())),
        KeyCode::Char('n') => {
            view.input_mode = InputMode::ScheduleTime;
            view.edit_buffer.clear();
            view.input_error = None;
            KeyAction::None
        }
        KeyCode::Char('x') | KeyCode::Delete => KeyAction::Send(EngineCommand::DeleteSelectedSchedules),
        _ => KeyAction::None,
    }
}

fn handle_logs_key(view: &mut ViewState, code: KeyCode) -> KeyAction {
    match code {
        KeyCode::Char('f') => view.log_filter = next_filter(view.log_filter),
        KeyCode::Esc | KeyCode::Char('x') => view.log_filter = None,
        _ => {}
    }
    KeyAction::None
}

fn handle_settings_key(view: &mut ViewState, state: &AppState, code: KeyCode) -> KeyAction {
    match code {
        KeyCode::Char('e') => {
            view.input_mode = InputMode::BaseUrl;
            view.edit_buffer = state.base_url.clone();
            view.input_error = None;
            KeyAction::None
        }
        KeyCode::Char('s') | KeyCode::Enter => {
            if state.probing {
                KeyAction::None
            } else {
                KeyAction::Send(EngineCommand::Probe)
            }
        }
        _ => KeyAction::None,
    }
}

fn handle_edit_key(view: &mut ViewState, code: KeyCode) -> KeyAction {
    match code {
        KeyCode::Esc => {
            view.input_mode = InputMode::Normal;
            view.edit_buffer.clear();
            view.input_error = None;
            KeyAction::None
        }
        KeyCode::Backspace => {
            view.edit_buffer.pop();
            KeyAction::None
        }
        KeyCode::Char(c) => {
            view.edit_buffer.push(c);
            KeyAction::None
        }
        KeyCode::Enter => submit_edit(view),
        _ => KeyAction::None,
    }
}

fn submit_edit(view: &mut ViewState) -> KeyAction {
    let action = match view.input_mode {
        InputMode::ScheduleTime => match parse_time(&view.edit_buffer) {
            Ok(time) => KeyAction::Send(EngineCommand::AddSchedule(time)),
            Err(e) => {
                // Stay in edit mode so the user can fix the input.
                view.input_error = Some(e.to_string());
                return KeyAction::None;
            }
        },
        InputMode::BaseUrl => {
            let url = view.edit_buffer.trim();
            if url.is_empty() {
                view.input_error = Some("address cannot be empty".to_string());
                return KeyAction::None;
            }
            KeyAction::Send(EngineCommand::SetBaseUrl(url.to_string()))
        }
        InputMode::Normal => KeyAction::None,
    };
    view.input_mode = InputMode::Normal;
    view.edit_buffer.clear();
    view.input_error = None;
    action
}
