pub mod rest;
pub mod types;

use async_trait::async_trait;
use types::{ConnectionStatus, FeedOutcome};

/// The feeder hardware as the app sees it. Neither call fails: transport
/// problems are folded into the returned status.
#[async_trait]
pub trait FeederDevice: Send + Sync {
    async fn probe(&self) -> ConnectionStatus;
    async fn trigger_feed(&self) -> FeedOutcome;
    fn base_url(&self) -> &str;
    fn set_base_url(&mut self, url: &str);
}
