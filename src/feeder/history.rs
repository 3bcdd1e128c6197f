use std::collections::VecDeque;

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedLogEntry {
    pub timestamp: String,
    pub result: String,
}

/// Feed attempts shown on the Home screen, newest first.
#[derive(Debug, Clone)]
pub struct FeedHistory {
    entries: VecDeque<FeedLogEntry>,
    capacity: usize,
}

pub fn now_timestamp() -> String {
    chrono::Local::now().format(TIMESTAMP_FORMAT).to_string()
}

impl FeedHistory {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn record(&mut self, result: impl Into<String>) {
        self.push_front(FeedLogEntry {
            timestamp: now_timestamp(),
            result: result.into(),
        });
    }

    pub fn push_front(&mut self, entry: FeedLogEntry) {
        if self.entries.len() >= self.capacity {
            self.entries.pop_back();
        }
        self.entries.push_front(entry);
    }

    pub fn entries(&self) -> &VecDeque<FeedLogEntry> {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(result: &str) -> FeedLogEntry {
        FeedLogEntry { timestamp: "2025-11-28 08:00:00".to_string(), result: result.to_string() }
    }

    #[test]
    fn test_newest_first() {
        let mut h = FeedHistory::new(10);
        h.push_front(entry("a"));
        h.push_front(entry("b"));
        let results: Vec<_> = h.entries().iter().map(|e| e.result.as_str()).collect();
        assert_eq!(results, vec!["b", "a"]);
    }

    #[test]
    fn test_capacity_drops_oldest() {
        let mut h = FeedHistory::new(2);
        h.push_front(entry("a"));
        h.push_front(entry("b"));
        h.push_front(entry("c"));
        assert_eq!(h.len(), 2);
        assert_eq!(h.entries()[0].result, "c");
        assert_eq!(h.entries()[1].result, "b");
    }

    #[test]
    fn test_zero_capacity_keeps_one() {
        let mut h = FeedHistory::new(0);
        h.record("x");
        h.record("y");
        assert_eq!(h.len(), 1);
        assert_eq!(h.entries()[0].result, "y");
    }

    #[test]
    fn test_timestamp_format() {
        let ts = now_timestamp();
        assert!(chrono::NaiveDateTime::parse_from_str(&ts, TIMESTAMP_FORMAT).is_ok(), "{}", ts);
    }
}
