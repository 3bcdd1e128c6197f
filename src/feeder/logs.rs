/// Time-of-day slot a logged feeding belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedSlot {
    Morning,
    Midday,
    Evening,
}

impl FeedSlot {
    pub const ALL: [FeedSlot; 3] = [FeedSlot::Morning, FeedSlot::Midday, FeedSlot::Evening];

    pub fn label(&self) -> &'static str {
        match self {
            FeedSlot::Morning => "Morning feed",
            FeedSlot::Midday => "Midday feed",
            FeedSlot::Evening => "Evening feed",
        }
    }
}

/// Next filter in the cycle All -> Morning -> Midday -> Evening -> All.
pub fn next_filter(current: Option<FeedSlot>) -> Option<FeedSlot> {
    match current {
        None => Some(FeedSlot::Morning),
        Some(FeedSlot::Morning) => Some(FeedSlot::Midday),
        Some(FeedSlot::Midday) => Some(FeedSlot::Evening),
        Some(FeedSlot::Evening) => None,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedLog {
    pub id: u32,
    pub time: String,
    pub date: String,
    pub slot: FeedSlot,
    pub success: bool,
}

impl FeedLog {
    /// `None` matches every entry.
    pub fn matches(&self, filter: Option<FeedSlot>) -> bool {
        filter.is_none_or(|s| self.slot == s)
    }
}

#[derive(Debug, Clone, Default)]
pub struct LogBook {
    logs: Vec<FeedLog>,
}

impl LogBook {
    pub fn new(logs: Vec<FeedLog>) -> Self {
        Self { logs }
    }

    /// Hand-authored history. The device exposes no log endpoint.
    pub fn with_samples() -> Self {
        let rows: [(&str, &str, FeedSlot, bool); 8] = [
            ("08:00", "28 Nov 2025", FeedSlot::Morning, true),
            ("12:30", "28 Nov 2025", FeedSlot::Midday, true),
            ("18:00", "28 Nov 2025", FeedSlot::Evening, false),
            ("08:00", "27 Nov 2025", FeedSlot::Morning, true),
            ("12:30", "27 Nov 2025", FeedSlot::Midday, true),
            ("18:00", "27 Nov 2025", FeedSlot::Evening, true),
            ("08:00", "26 Nov 2025", FeedSlot::Morning, false),
            ("12:30", "26 Nov 2025", FeedSlot::Midday, true),
        ];
        let logs = rows
            .iter()
            .enumerate()
            .map(|(i, (time, date, slot, success))| FeedLog {
                id: i as u32 + 1,
                time: time.to_string(),
                date: date.to_string(),
                slot: *slot,
                success: *success,
            })
            .collect();
        Self { logs }
    }

    pub fn all(&self) -> &[FeedLog] {
        &self.logs
    }

    pub fn filtered(&self, slot: Option<FeedSlot>) -> Vec<&FeedLog> {
        self.logs
            .iter()
            .filter(|l| l.matches(slot))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_samples() {
        let book = LogBook::with_samples();
        assert_eq!(book.all().len(), 8);
        assert_eq!(book.all()[0].id, 1);
        assert_eq!(book.all()[7].id, 8);
        assert_eq!(book.all().iter().filter(|l| !l.success).count(), 2);
    }

    #[test]
    fn test_no_filter_returns_all() {
        let book = LogBook::with_samples();
        assert_eq!(book.filtered(None).len(), 8);
    }

    #[test]
    fn test_filter_by_slot_keeps_order() {
        let book = LogBook::with_samples();
        let evening = book.filtered(Some(FeedSlot::Evening));
        let ids: Vec<u32> = evening.iter().map(|l| l.id).collect();
        assert_eq!(ids, vec![3, 6]);
        assert!(evening.iter().all(|l| l.slot == FeedSlot::Evening));
        assert_eq!(book.filtered(Some(FeedSlot::Morning)).len(), 3);
        assert_eq!(book.filtered(Some(FeedSlot::Midday)).len(), 3);
    }

    #[test]
    fn test_filter_on_empty_book() {
        let book = LogBook::new(Vec::new());
        assert!(book.filtered(Some(FeedSlot::Morning)).is_empty());
    }

    #[test]
    fn test_filter_cycle() {
        let mut f = None;
        let mut seen = Vec::new();
        for _ in 0..4 {
            f = next_filter(f);
            seen.push(f);
        }
        assert_eq!(
            seen,
            vec![Some(FeedSlot::Morning), Some(FeedSlot::Midday), Some(FeedSlot::Evening), None]
        );
        assert_eq!(FeedSlot::ALL.len(), 3);
    }
}
