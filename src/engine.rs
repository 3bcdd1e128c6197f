use crate::config::Config;
use crate::device::types::{ConnectionStatus, FeedOutcome};
use crate::device::FeederDevice;
use crate::feeder::controller::FeedController;
use crate::feeder::logs::LogBook;
use crate::feeder::schedule::{ScheduleBook, TIME_FORMAT};
use crate::tui::state::AppState;
use chrono::NaiveTime;
use std::time::Instant;
use tokio::sync::{mpsc, watch};

/// Requests from the TUI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineCommand {
    Feed,
    Probe,
    AddSchedule(NaiveTime),
    ToggleScheduleActive(u32),
    ToggleScheduleSelected(u32),
    DeleteSelectedSchedules,
    SetBaseUrl(String),
    Quit,
}

/// Completion of a device call running on its own task.
/// `generation` identifies the device address the call was sent to.
/// `confirmed` is the count of successful feeds when a probe started.
#[derive(Debug)]
enum DeviceEvent {
    FeedDone { generation: u64, outcome: FeedOutcome },
    ProbeDone { generation: u64, confirmed: u64, status: ConnectionStatus },
}

/// Owns all feeder data. Device calls are spawned so list edits stay
/// responsive while a request is outstanding.
pub struct Engine<D: FeederDevice + Clone + 'static> {
    device: D,
    device_name: String,
    controller: FeedController,
    schedule: ScheduleBook,
    logs: LogBook,
    generation: u64,
    confirmed: u64,
    probes_in_flight: usize,
    notice: Option<String>,
    start_time: Instant,
    state_tx: watch::Sender<AppState>,
    events_tx: mpsc::UnboundedSender<DeviceEvent>,
    events_rx: mpsc::UnboundedReceiver<DeviceEvent>,
}

impl<D: FeederDevice + Clone + 'static> Engine<D> {
    pub fn new(device: D, config: &Config, state_tx: watch::Sender<AppState>) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            device,
            device_name: config.device.name.clone(),
            controller: FeedController::new(&config.feeder),
            schedule: ScheduleBook::with_samples(),
            logs: LogBook::with_samples(),
            generation: 0,
            confirmed: 0,
            probes_in_flight: 0,
            notice: None,
            start_time: Instant::now(),
            state_tx,
            events_tx,
            events_rx,
        }
    }

    pub fn schedule(&self) -> &ScheduleBook {
        &self.schedule
    }

    pub fn snapshot(&self) -> AppState {
        AppState {
            device_name: self.device_name.clone(),
            base_url: self.device.base_url().to_string(),
            connection: self.controller.connection(),
            probing: self.probes_in_flight > 0,
            remaining_feed_g: self.controller.remaining_feed_g(),
            last_feed_time: self.controller.last_feed_time().to_string(),
            is_feeding: self.controller.is_feeding(),
            history: self.controller.history().entries().iter().cloned().collect(),
            schedule: self.schedule.clone(),
            logs: self.logs.clone(),
            notice: self.notice.clone(),
            start_time: self.start_time,
        }
    }

    fn publish(&self) {
        self.state_tx.send_replace(self.snapshot());
    }

    fn in_flight(&self) -> bool {
        self.controller.is_feeding() || self.probes_in_flight > 0
    }

    fn spawn_probe(&mut self) {
        self.probes_in_flight += 1;
        let device = self.device.clone();
        let tx = self.events_tx.clone();
        let generation = self.generation;
        let confirmed = self.confirmed;
        tokio::spawn(async move {
            let status = device.probe().await;
            let _ = tx.send(DeviceEvent::ProbeDone { generation, confirmed, status });
        });
    }

    fn spawn_feed(&mut self) {
        let device = self.device.clone();
        let tx = self.events_tx.clone();
        let generation = self.generation;
        tokio::spawn(async move {
            let outcome = device.trigger_feed().await;
            let _ = tx.send(DeviceEvent::FeedDone { generation, outcome });
        });
    }

    fn apply(&mut self, event: DeviceEvent) {
        match event {
            DeviceEvent::FeedDone { generation, outcome } => {
                tracing::info!(result = %outcome.label(), "feed finished");
                if generation != self.generation {
                    // The outcome belongs to the old address. Keep the history
                    // and counter, but not its verdict on connectivity.
                    let connection = self.controller.connection();
                    self.controller.finish_feed(&outcome);
                    self.controller.apply_probe(connection);
                    tracing::debug!(generation, current = self.generation, "feed finished on replaced address");
                } else if self.controller.finish_feed(&outcome) {
                    self.spawn_probe();
                } else if outcome.is_success() {
                    self.confirmed += 1;
                }
            }
            DeviceEvent::ProbeDone { generation, confirmed, status } => {
                self.probes_in_flight = self.probes_in_flight.saturating_sub(1);
                if generation != self.generation {
                    tracing::debug!(generation, current = self.generation, "dropping stale probe");
                } else if confirmed != self.confirmed {
                    tracing::debug!("dropping probe started before a successful feed");
                } else {
                    self.controller.apply_probe(status);
                }
            }
        }
        self.publish();
    }

    /// Apply one command. Returns false when the engine should stop.
    pub fn handle(&mut self, cmd: EngineCommand) -> bool {
        match cmd {
            EngineCommand::Feed => {
                if !self.controller.begin_feed() {
                    tracing::debug!("feed already in flight, ignoring");
                    return true;
                }
                self.notice = None;
                self.spawn_feed();
            }
            EngineCommand::Probe => self.spawn_probe(),
            EngineCommand::AddSchedule(time) => {
                let id = self.schedule.add(time);
                let label = time.format(TIME_FORMAT).to_string();
                tracing::info!(id, time = %label, "schedule added");
                self.notice = Some(format!("Added schedule #{} at {}", id, label));
            }
            EngineCommand::ToggleScheduleActive(id) => {
                if !self.schedule.toggle_active(id) {
                    return true;
                }
            }
            EngineCommand::ToggleScheduleSelected(id) => {
                if !self.schedule.toggle_selected(id) {
                    return true;
                }
            }
            EngineCommand::DeleteSelectedSchedules => {
                let removed = self.schedule.delete_selected();
                tracing::info!(removed, "schedule entries deleted");
                self.notice = Some(match removed {
                    0 => "Nothing selected".to_string(),
                    1 => "Deleted 1 schedule".to_string(),
                    n => format!("Deleted {} schedules", n),
                });
            }
            EngineCommand::SetBaseUrl(url) => {
                let url = url.trim();
                if url.is_empty() {
                    return true;
                }
                self.device.set_base_url(url);
                self.generation += 1;
                tracing::info!(url = %self.device.base_url(), "device address changed");
                self.notice = Some(format!("Device set to {}", self.device.base_url()));
                self.controller.apply_probe(ConnectionStatus::Offline);
                self.spawn_probe();
            }
            EngineCommand::Quit => return false,
        }
        self.publish();
        true
    }

    /// Wait for every outstanding device call (and any probe it triggers).
    pub async fn settle(&mut self) {
        while self.in_flight() {
            match self.events_rx.recv().await {
                Some(event) => self.apply(event),
                None => break,
            }
        }
    }

    /// Publish the initial state, probe once, then serve commands until Quit
    /// or until every sender is dropped.
    pub async fn run(mut self, mut cmd_rx: mpsc::Receiver<EngineCommand>) {
        self.spawn_probe();
        self.publish();
        loop {
            tokio::select! {
                cmd = cmd_rx.recv() => {
                    let Some(cmd) = cmd else { break };
                    tracing::debug!(?cmd, "engine command");
                    if !self.handle(cmd) {
                        break;
                    }
                }
                Some(event) = self.events_rx.recv() => self.apply(event),
            }
        }
        tracing::debug!("engine stopped");
    }
}
