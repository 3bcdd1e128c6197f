use super::types::{ConnectionStatus, FeedOutcome, FeedRequest};
use super::FeederDevice;
use crate::config::DeviceConfig;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{redirect, Client};
use std::time::Duration;

#[derive(Clone)]
pub struct DeviceRest {
    probe_client: Client,
    feed_client: Client,
    base_url: String,
}

impl DeviceRest {
    pub fn new(config: &DeviceConfig) -> Result<Self> {
        let probe_timeout = Duration::from_millis(config.probe_timeout_ms);
        let probe_client = Client::builder()
            .connect_timeout(probe_timeout)
            .timeout(probe_timeout)
            .redirect(redirect::Policy::none())
            .build()
            .context("failed to build probe HTTP client")?;

        let feed_timeout = Duration::from_millis(config.feed_timeout_ms);
        let feed_client = Client::builder()
            .connect_timeout(feed_timeout)
            .timeout(feed_timeout)
            .build()
            .context("failed to build feed HTTP client")?;

        Ok(Self {
            probe_client,
            feed_client,
            base_url: normalize_base_url(&config.base_url),
        })
    }
}

fn normalize_base_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

/// Flatten an error and its sources into one line. reqwest keeps the useful
/// part ("operation timed out", "Connection refused") in the source chain.
fn error_chain(err: &(dyn std::error::Error + 'static)) -> String {
    let mut parts = vec![err.to_string()];
    let mut source = err.source();
    while let Some(e) = source {
        let msg = e.to_string();
        if !parts.iter().any(|p| p.contains(&msg)) {
            parts.push(msg);
        }
        source = e.source();
    }
    parts.join(": ")
}

#[async_trait]
impl FeederDevice for DeviceRest {
    /// HEAD the device. Redirects are not followed, so a 3xx still counts as up.
    async fn probe(&self) -> ConnectionStatus {
        match self.probe_client.head(&self.base_url).send().await {
            Ok(resp) => {
                let code = resp.status().as_u16();
                let status = ConnectionStatus::from_status(code);
                tracing::debug!(url = %self.base_url, code, status = status.label(), "probe");
                status
            }
            Err(e) => {
                tracing::warn!(url = %self.base_url, error = %error_chain(&e), "probe failed");
                ConnectionStatus::Offline
            }
        }
    }

    async fn trigger_feed(&self) -> FeedOutcome {
        let resp = self
            .feed_client
            .post(&self.base_url)
            .json(&FeedRequest::default())
            .send()
            .await;
        match resp {
            Ok(resp) => {
                let code = resp.status().as_u16();
                // Drain the body so the connection closes cleanly; content is unused.
                let _ = resp.bytes().await;
                let outcome = FeedOutcome::from_status(code);
                if outcome.is_success() {
                    tracing::info!(url = %self.base_url, code, "feed accepted");
                } else {
                    tracing::warn!(url = %self.base_url, code, "feed not completed");
                }
                outcome
            }
            Err(e) => {
                let message = error_chain(&e);
                tracing::warn!(url = %self.base_url, error = %message, "feed request failed");
                FeedOutcome::Error { message }
            }
        }
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }

    fn set_base_url(&mut self, url: &str) {
        self.base_url = normalize_base_url(url);
    }
}
