use serde::Serialize;

/// Reachability of the feeder as seen by the last probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionStatus {
    Online,
    #[default]
    Offline,
}

impl ConnectionStatus {
    /// Any 2xx or 3xx answer counts as reachable.
    pub fn from_status(code: u16) -> Self {
        if (200..400).contains(&code) {
            ConnectionStatus::Online
        } else {
            ConnectionStatus::Offline
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ConnectionStatus::Online => "Online",
            ConnectionStatus::Offline => "Offline",
        }
    }

    pub fn is_online(&self) -> bool {
        matches!(self, ConnectionStatus::Online)
    }
}

/// Result of a single feed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedOutcome {
    /// 200: the device dispensed.
    Success,
    /// 202: the device accepted but postponed.
    Deferred,
    /// Any other HTTP status.
    Rejected { code: u16 },
    /// The request never got a status (DNS, refused, timeout, ...).
    Error { message: String },
}

impl FeedOutcome {
    pub fn from_status(code: u16) -> Self {
        match code {
            200 => FeedOutcome::Success,
            202 => FeedOutcome::Deferred,
            code => FeedOutcome::Rejected { code },
        }
    }

    pub fn label(&self) -> String {
        match self {
            FeedOutcome::Success => "Success".to_string(),
            FeedOutcome::Deferred => "Deferred".to_string(),
            FeedOutcome::Rejected { code } => format!("Failed (code={})", code),
            FeedOutcome::Error { message } => format!("Failed: {}", message),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, FeedOutcome::Success)
    }
}

/// Body of the feed request. The device takes no parameters, so this is `{}`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FeedRequest {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probe_status_range() {
        for code in [200, 204, 301, 302, 399] {
            assert_eq!(ConnectionStatus::from_status(code), ConnectionStatus::Online, "code {}", code);
        }
        for code in [100, 199, 400, 404, 500, 503] {
            assert_eq!(ConnectionStatus::from_status(code), ConnectionStatus::Offline, "code {}", code);
        }
    }

    #[test]
    fn test_connection_default_is_offline() {
        assert_eq!(ConnectionStatus::default(), ConnectionStatus::Offline);
        assert_eq!(ConnectionStatus::default().label(), "Offline");
    }

    #[test]
    fn test_feed_labels() {
        assert_eq!(FeedOutcome::from_status(200).label(), "Success");
        assert_eq!(FeedOutcome::from_status(202).label(), "Deferred");
        assert_eq!(FeedOutcome::from_status(500).label(), "Failed (code=500)");
        assert_eq!(FeedOutcome::from_status(201).label(), "Failed (code=201)");
        let err = FeedOutcome::Error { message: "connection refused".to_string() };
        assert_eq!(err.label(), "Failed: connection refused");
    }

    #[test]
    fn test_only_200_is_success() {
        assert!(FeedOutcome::from_status(200).is_success());
        assert!(!FeedOutcome::from_status(202).is_success());
        assert!(!FeedOutcome::from_status(204).is_success());
    }

    #[test]
    fn test_feed_request_body_is_empty_object() {
        assert_eq!(serde_json::to_string(&FeedRequest::default()).unwrap(), "{}");
    }
}
