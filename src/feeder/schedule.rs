use anyhow::{bail, Result};
use chrono::{NaiveTime, Timelike};

pub const TIME_FORMAT: &str = "%H:%M";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleEntry {
    pub id: u32,
    pub time: NaiveTime,
    pub active: bool,
    pub selected: bool,
}

impl ScheduleEntry {
    pub fn time_label(&self) -> String {
        self.time.format(TIME_FORMAT).to_string()
    }

    pub fn status_label(&self) -> &'static str {
        if self.active { "Active" } else { "Inactive" }
    }
}

/// Client-side feeding schedule. Lives only as long as the process.
#[derive(Debug, Clone, Default)]
pub struct ScheduleBook {
    entries: Vec<ScheduleEntry>,
}

fn hm(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or(NaiveTime::MIN)
}

/// Drop seconds and below; schedule entries have minute precision.
pub fn truncate_to_minute(time: NaiveTime) -> NaiveTime {
    hm(time.hour(), time.minute())
}

pub fn current_minute() -> NaiveTime {
    truncate_to_minute(chrono::Local::now().time())
}

/// Parse a typed "HH:MM" time.
pub fn parse_time(input: &str) -> Result<NaiveTime> {
    let input = input.trim();
    if input.is_empty() {
        bail!("time cannot be empty");
    }
    match NaiveTime::parse_from_str(input, TIME_FORMAT) {
        Ok(t) => Ok(t),
        Err(_) => bail!("invalid time '{}', expected HH:MM", input),
    }
}

impl ScheduleBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// The three default slots: morning, midday (off), evening.
    pub fn with_samples() -> Self {
        Self {
            entries: vec![
                ScheduleEntry { id: 1, time: hm(8, 0), active: true, selected: false },
                ScheduleEntry { id: 2, time: hm(12, 30), active: false, selected: false },
                ScheduleEntry { id: 3, time: hm(18, 0), active: true, selected: false },
            ],
        }
    }

    pub fn entries(&self) -> &[ScheduleEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Append an active entry. The id is one past the current maximum.
    pub fn add(&mut self, time: NaiveTime) -> u32 {
        let id = self.entries.iter().map(|e| e.id).max().unwrap_or(0) + 1;
        self.entries.push(ScheduleEntry {
            id,
            time: truncate_to_minute(time),
            active: true,
            selected: false,
        });
        id
    }

    pub fn toggle_active(&mut self, id: u32) -> bool {
        match self.entries.iter_mut().find(|e| e.id == id) {
            Some(e) => {
                e.active = !e.active;
                true
            }
            None => false,
        }
    }

    pub fn toggle_selected(&mut self, id: u32) -> bool {
        match self.entries.iter_mut().find(|e| e.id == id) {
            Some(e) => {
                e.selected = !e.selected;
                true
            }
            None => false,
        }
    }

    /// Remove every selected entry. Returns how many were removed.
    pub fn delete_selected(&mut self) -> usize {
        let before = self.entries.len();
        self.entries.retain(|e| !e.selected);
        before - self.entries.len()
    }

    pub fn selected_count(&self) -> usize {
        self.entries.iter().filter(|e| e.selected).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_to_empty_starts_at_one() {
        let mut book = ScheduleBook::new();
        assert_eq!(book.add(hm(7, 15)), 1);
        let e = &book.entries()[0];
        assert!(e.active);
        assert!(!e.selected);
        assert_eq!(e.time_label(), "07:15");
    }

    #[test]
    fn test_add_uses_max_plus_one() {
        let mut book = ScheduleBook::with_samples();
        // Remove id 1 and 2; next id still follows the max (3), not the count.
        book.toggle_selected(1);
        book.toggle_selected(2);
        assert_eq!(book.delete_selected(), 2);
        assert_eq!(book.add(hm(9, 0)), 4);
        assert_eq!(book.entries().last().unwrap().id, 4);
    }

    #[test]
    fn test_delete_removes_only_selected() {
        let mut book = ScheduleBook::with_samples();
        book.toggle_selected(2);
        assert_eq!(book.selected_count(), 1);
        assert_eq!(book.delete_selected(), 1);
        let ids: Vec<u32> = book.entries().iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn test_delete_with_nothing_selected() {
        let mut book = ScheduleBook::with_samples();
        assert_eq!(book.delete_selected(), 0);
        assert_eq!(book.len(), 3);
    }

    #[test]
    fn test_toggle_flags() {
        let mut book = ScheduleBook::with_samples();
        assert!(!book.entries()[1].active);
        assert!(book.toggle_active(2));
        assert!(book.entries()[1].active);
        assert_eq!(book.entries()[1].status_label(), "Active");
        assert!(book.toggle_selected(3));
        assert!(book.entries()[2].selected);
        assert!(book.toggle_selected(3));
        assert!(!book.entries()[2].selected);
    }

    #[test]
    fn test_toggle_unknown_id() {
        let mut book = ScheduleBook::with_samples();
        assert!(!book.toggle_active(42));
        assert!(!book.toggle_selected(42));
    }

    #[test]
    fn test_add_truncates_seconds() {
        let mut book = ScheduleBook::new();
        book.add(NaiveTime::from_hms_opt(6, 45, 59).unwrap());
        assert_eq!(book.entries()[0].time, hm(6, 45));
    }

    #[test]
    fn test_parse_time() {
        assert_eq!(parse_time(" 06:05 ").unwrap(), hm(6, 5));
        assert_eq!(parse_time("23:59").unwrap(), hm(23, 59));
        assert!(parse_time("").is_err());
        assert!(parse_time("24:00").is_err());
        assert!(parse_time("noon").is_err());
    }
}
