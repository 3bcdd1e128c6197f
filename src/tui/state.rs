use crate::device::types::ConnectionStatus;
use crate::feeder::history::FeedLogEntry;
use crate::feeder::logs::{FeedSlot, LogBook};
use crate::feeder::schedule::ScheduleBook;
use std::time::Instant;

/// Snapshot published by the engine after every change.
#[derive(Debug, Clone)]
pub struct AppState {
    pub device_name: String,
    pub base_url: String,
    pub connection: ConnectionStatus,
    pub probing: bool,
    pub remaining_feed_g: u32,
    pub last_feed_time: String,
    pub is_feeding: bool,
    pub history: Vec<FeedLogEntry>,
    pub schedule: ScheduleBook,
    pub logs: LogBook,
    pub notice: Option<String>,
    pub start_time: Instant,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            device_name: String::new(),
            base_url: String::new(),
            connection: ConnectionStatus::Offline,
            probing: false,
            remaining_feed_g: 0,
            last_feed_time: "-".to_string(),
            is_feeding: false,
            history: Vec::new(),
            schedule: ScheduleBook::default(),
            logs: LogBook::default(),
            notice: None,
            start_time: Instant::now(),
        }
    }

    pub fn uptime(&self) -> String {
        let secs = self.start_time.elapsed().as_secs();
        let h = secs / 3600;
        let m = (secs % 3600) / 60;
        format!("{}h {:02}m", h, m)
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Home,
    Schedule,
    Logs,
    Settings,
}

impl Tab {
    pub const ALL: [Tab; 4] = [Tab::Home, Tab::Schedule, Tab::Logs, Tab::Settings];

    pub fn title(&self) -> &'static str {
        match self {
            Tab::Home => "Home",
            Tab::Schedule => "Schedule",
            Tab::Logs => "Logs",
            Tab::Settings => "Settings",
        }
    }

    pub fn index(&self) -> usize {
        Tab::ALL.iter().position(|t| t == self).unwrap_or(0)
    }

    pub fn next(&self) -> Tab {
        Tab::ALL[(self.index() + 1) % Tab::ALL.len()]
    }

    pub fn prev(&self) -> Tab {
        Tab::ALL[(self.index() + Tab::ALL.len() - 1) % Tab::ALL.len()]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    /// Typing an HH:MM time for a new schedule entry.
    ScheduleTime,
    /// Typing a new device base URL.
    BaseUrl,
}

/// Navigation and editing state owned by the TUI task.
#[derive(Debug, Clone)]
pub struct ViewState {
    pub tab: Tab,
    pub schedule_cursor: usize,
    pub log_filter: Option<FeedSlot>,
    pub history_scroll: usize,
    pub input_mode: InputMode,
    pub edit_buffer: String,
    pub input_error: Option<String>,
    pub spinner_frame: u8,
}

impl ViewState {
    pub fn new() -> Self {
        Self {
            tab: Tab::Home,
            schedule_cursor: 0,
            log_filter: None,
            history_scroll: 0,
            input_mode: InputMode::Normal,
            edit_buffer: String::new(),
            input_error: None,
            spinner_frame: 0,
        }
    }

    pub fn is_editing(&self) -> bool {
        self.input_mode != InputMode::Normal
    }

    /// Keep the schedule cursor inside the list after adds/deletes.
    pub fn clamp_cursor(&mut self, len: usize) {
        if len == 0 {
            self.schedule_cursor = 0;
        } else if self.schedule_cursor >= len {
            self.schedule_cursor = len - 1;
        }
    }
}

impl Default for ViewState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tab_cycle() {
        assert_eq!(Tab::Home.next(), Tab::Schedule);
        assert_eq!(Tab::Settings.next(), Tab::Home);
        assert_eq!(Tab::Home.prev(), Tab::Settings);
        assert_eq!(Tab::Logs.prev(), Tab::Schedule);
    }

    #[test]
    fn test_clamp_cursor() {
        let mut v = ViewState::new();
        v.schedule_cursor = 5;
        v.clamp_cursor(3);
        assert_eq!(v.schedule_cursor, 2);
        v.clamp_cursor(0);
        assert_eq!(v.schedule_cursor, 0);
    }

    #[test]
    fn test_uptime_format() {
        let s = AppState::new();
        assert_eq!(s.uptime(), "0h 00m");
    }
}
