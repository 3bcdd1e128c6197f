use super::history::{now_timestamp, FeedHistory};
use crate::config::FeederConfig;
use crate::device::types::{ConnectionStatus, FeedOutcome};
use crate::device::FeederDevice;

pub const REQUESTING_LABEL: &str = "Requesting feed...";

/// Home-screen feed state: remaining food, last feed, connection, history.
#[derive(Debug, Clone)]
pub struct FeedController {
    remaining_feed_g: u32,
    feed_portion_g: u32,
    last_feed_time: Option<String>,
    connection: ConnectionStatus,
    history: FeedHistory,
    is_feeding: bool,
}

impl FeedController {
    pub fn new(config: &FeederConfig) -> Self {
        Self {
            remaining_feed_g: config.initial_remaining_g,
            feed_portion_g: config.feed_portion_g,
            last_feed_time: None,
            connection: ConnectionStatus::Offline,
            history: FeedHistory::new(config.history_capacity),
            is_feeding: false,
        }
    }

    pub fn remaining_feed_g(&self) -> u32 {
        self.remaining_feed_g
    }

    pub fn last_feed_time(&self) -> &str {
        self.last_feed_time.as_deref().unwrap_or("-")
    }

    pub fn connection(&self) -> ConnectionStatus {
        self.connection
    }

    pub fn history(&self) -> &FeedHistory {
        &self.history
    }

    pub fn is_feeding(&self) -> bool {
        self.is_feeding
    }

    /// Mark a feed as in flight. Returns false if one already is.
    pub fn begin_feed(&mut self) -> bool {
        if self.is_feeding {
            return false;
        }
        self.is_feeding = true;
        self.history.record(REQUESTING_LABEL);
        true
    }

    /// Apply the device's answer. Returns true when the connection should be
    /// re-probed (every outcome except Success).
    pub fn finish_feed(&mut self, outcome: &FeedOutcome) -> bool {
        self.history.record(outcome.label());
        self.is_feeding = false;
        if outcome.is_success() {
            self.last_feed_time = Some(now_timestamp());
            self.remaining_feed_g = self.remaining_feed_g.saturating_sub(self.feed_portion_g);
            self.connection = ConnectionStatus::Online;
            false
        } else {
            true
        }
    }

    pub fn apply_probe(&mut self, status: ConnectionStatus) {
        if self.connection != status {
            tracing::info!(from = self.connection.label(), to = status.label(), "connection changed");
        }
        self.connection = status;
    }

    pub async fn probe<D: FeederDevice + ?Sized>(&mut self, device: &D) -> ConnectionStatus {
        let status = device.probe().await;
        self.apply_probe(status);
        status
    }

    /// Run one complete feed attempt. Returns None if a feed was already in flight.
    pub async fn feed_now<D: FeederDevice + ?Sized>(&mut self, device: &D) -> Option<FeedOutcome> {
        if !self.begin_feed() {
            return None;
        }
        let outcome = device.trigger_feed().await;
        if self.finish_feed(&outcome) {
            self.probe(device).await;
        }
        Some(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct MockDevice {
        feed: FeedOutcome,
        probe_status: ConnectionStatus,
        probes: AtomicUsize,
        feeds: AtomicUsize,
    }

    impl MockDevice {
        fn new(feed: FeedOutcome, probe_status: ConnectionStatus) -> Self {
            Self { feed, probe_status, probes: AtomicUsize::new(0), feeds: AtomicUsize::new(0) }
        }
    }

    #[async_trait]
    impl FeederDevice for MockDevice {
        async fn probe(&self) -> ConnectionStatus {
            self.probes.fetch_add(1, Ordering::SeqCst);
            self.probe_status
        }
        async fn trigger_feed(&self) -> FeedOutcome {
            self.feeds.fetch_add(1, Ordering::SeqCst);
            self.feed.clone()
        }
        fn base_url(&self) -> &str {
            "http://mock/feed"
        }
        fn set_base_url(&mut self, _url: &str) {}
    }

    fn config(initial: u32, portion: u32) -> FeederConfig {
        FeederConfig { initial_remaining_g: initial, feed_portion_g: portion, history_capacity: 200 }
    }

    fn results(c: &FeedController) -> Vec<String> {
        c.history().entries().iter().map(|e| e.result.clone()).collect()
    }

    #[test]
    fn test_initial_state() {
        let c = FeedController::new(&config(1200, 50));
        assert_eq!(c.remaining_feed_g(), 1200);
        assert_eq!(c.last_feed_time(), "-");
        assert_eq!(c.connection(), ConnectionStatus::Offline);
        assert!(c.history().is_empty());
        assert!(!c.is_feeding());
    }

    #[tokio::test]
    async fn test_success_decrements_and_sets_online() {
        let device = MockDevice::new(FeedOutcome::Success, ConnectionStatus::Offline);
        let mut c = FeedController::new(&config(1200, 50));
        let outcome = c.feed_now(&device).await;
        assert_eq!(outcome, Some(FeedOutcome::Success));
        assert_eq!(c.remaining_feed_g(), 1150);
        assert_eq!(c.connection(), ConnectionStatus::Online);
        assert_ne!(c.last_feed_time(), "-");
        assert_eq!(device.probes.load(Ordering::SeqCst), 0);
        assert_eq!(results(&c), vec!["Success", REQUESTING_LABEL]);
    }

    #[tokio::test]
    async fn test_success_floors_at_zero() {
        let device = MockDevice::new(FeedOutcome::Success, ConnectionStatus::Online);
        let mut c = FeedController::new(&config(30, 50));
        c.feed_now(&device).await;
        assert_eq!(c.remaining_feed_g(), 0);
        c.feed_now(&device).await;
        assert_eq!(c.remaining_feed_g(), 0);
    }

    #[tokio::test]
    async fn test_deferred_keeps_remaining_and_probes_once() {
        let device = MockDevice::new(FeedOutcome::Deferred, ConnectionStatus::Online);
        let mut c = FeedController::new(&config(1200, 50));
        c.feed_now(&device).await;
        assert_eq!(c.remaining_feed_g(), 1200);
        assert_eq!(c.last_feed_time(), "-");
        assert_eq!(device.probes.load(Ordering::SeqCst), 1);
        assert_eq!(c.connection(), ConnectionStatus::Online);
        assert_eq!(results(&c), vec!["Deferred", REQUESTING_LABEL]);
    }

    #[tokio::test]
    async fn test_rejected_probes_once() {
        let device = MockDevice::new(FeedOutcome::Rejected { code: 500 }, ConnectionStatus::Offline);
        let mut c = FeedController::new(&config(1200, 50));
        c.apply_probe(ConnectionStatus::Online);
        c.feed_now(&device).await;
        assert_eq!(device.probes.load(Ordering::SeqCst), 1);
        assert_eq!(c.connection(), ConnectionStatus::Offline);
        assert_eq!(c.history().entries()[0].result, "Failed (code=500)");
    }

    #[tokio::test]
    async fn test_transport_error_probes_once() {
        let device = MockDevice::new(
            FeedOutcome::Error { message: "connection refused".to_string() },
            ConnectionStatus::Offline,
        );
        let mut c = FeedController::new(&config(1200, 50));
        c.feed_now(&device).await;
        assert_eq!(device.probes.load(Ordering::SeqCst), 1);
        assert_eq!(c.history().entries()[0].result, "Failed: connection refused");
        assert_eq!(c.remaining_feed_g(), 1200);
    }

    #[tokio::test]
    async fn test_each_attempt_prepends_two_entries() {
        let device = MockDevice::new(FeedOutcome::Deferred, ConnectionStatus::Online);
        let mut c = FeedController::new(&config(1200, 50));
        for n in 1..=3 {
            c.feed_now(&device).await;
            assert_eq!(c.history().len(), n * 2);
            assert_eq!(c.history().entries()[0].result, "Deferred");
            assert_eq!(c.history().entries()[1].result, REQUESTING_LABEL);
        }
    }

    #[test]
    fn test_begin_feed_blocks_second_request() {
        let mut c = FeedController::new(&config(1200, 50));
        assert!(c.begin_feed());
        assert!(c.is_feeding());
        assert!(!c.begin_feed());
        assert_eq!(c.history().len(), 1);
        assert!(!c.finish_feed(&FeedOutcome::Success));
        assert!(!c.is_feeding());
        assert!(c.begin_feed());
    }

    #[tokio::test]
    async fn test_feed_now_ignored_while_in_flight() {
        let device = MockDevice::new(FeedOutcome::Success, ConnectionStatus::Online);
        let mut c = FeedController::new(&config(1200, 50));
        assert!(c.begin_feed());
        assert_eq!(c.feed_now(&device).await, None);
        assert_eq!(device.feeds.load(Ordering::SeqCst), 0);
    }
}
