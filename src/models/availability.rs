//! Weekly availability for teachers and classrooms.
//!
//! # Precedence
//! Blocked windows override allowed days. A slot is available iff:
//! - its day is in `days`, AND
//! - it does NOT overlap any `blocked` window.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::time_slot::{minute_of_day, Day, TimeSlot};

/// A recurring weekly interval `[start, end)` on one day.
///
/// Half-open interval: includes start, excludes end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyWindow {
    /// Day of the week.
    pub day: Day,
    /// Interval start (inclusive).
    pub start: NaiveTime,
    /// Interval end (exclusive).
    pub end: NaiveTime,
}

impl WeeklyWindow {
    /// Creates a new weekly window.
    pub fn new(day: Day, start: NaiveTime, end: NaiveTime) -> Self {
        Self { day, start, end }
    }

    /// Window length in minutes.
    #[inline]
    pub fn duration_minutes(&self) -> u32 {
        minute_of_day(self.end).saturating_sub(minute_of_day(self.start))
    }

    /// Whether the window overlaps a slot.
    pub fn overlaps(&self, slot: &TimeSlot) -> bool {
        self.day == slot.day
            && minute_of_day(self.start) < slot.end_minute()
            && slot.start_minute() < minute_of_day(self.end)
    }
}

/// Availability pattern: allowed days minus blocked windows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Availability {
    /// Days on which the resource can be booked.
    pub days: BTreeSet<Day>,
    /// Periods when the resource is unavailable (overrides `days`).
    pub blocked: Vec<WeeklyWindow>,
}

impl Availability {
    /// Available on every day, nothing blocked.
    pub fn always() -> Self {
        Self {
            days: Day::ALL.into_iter().collect(),
            blocked: Vec::new(),
        }
    }

    /// Available only on the given days.
    pub fn on_days(days: impl IntoIterator<Item = Day>) -> Self {
        Self {
            days: days.into_iter().collect(),
            blocked: Vec::new(),
        }
    }

    /// Adds a blocked window.
    pub fn with_blocked(mut self, day: Day, start: NaiveTime, end: NaiveTime) -> Self {
        self.blocked.push(WeeklyWindow::new(day, start, end));
        self
    }

    /// Whether a slot can be booked.
    pub fn is_available(&self, slot: &TimeSlot) -> bool {
        // Blocked windows override
        if self.blocked.iter().any(|w| w.overlaps(slot)) {
            return false;
        }
        self.days.contains(&slot.day)
    }

    /// Total blocked minutes on a day.
    pub fn blocked_minutes(&self, day: Day) -> u32 {
        self.blocked
            .iter()
            .filter(|w| w.day == day)
            .map(WeeklyWindow::duration_minutes)
            .sum()
    }
}

impl Default for Availability {
    fn default() -> Self {
        Self::always()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn slot(day: Day, h: u32) -> TimeSlot {
        TimeSlot::new(0, day, t(h, 0), t(h + 1, 0))
    }

    #[test]
    fn test_always_available() {
        let a = Availability::always();
        assert!(a.is_available(&slot(Day::Monday, 9)));
        assert!(a.is_available(&slot(Day::Sunday, 20)));
    }

    #[test]
    fn test_days_restrict() {
        let a = Availability::on_days([Day::Tuesday, Day::Thursday]);
        assert!(a.is_available(&slot(Day::Tuesday, 9)));
        assert!(!a.is_available(&slot(Day::Monday, 9)));
    }

    #[test]
    fn test_blocked_overrides() {
        let a = Availability::always().with_blocked(Day::Monday, t(10, 30), t(11, 30));

        assert!(a.is_available(&slot(Day::Monday, 9)));
        assert!(!a.is_available(&slot(Day::Monday, 10))); // 10-11 overlaps
        assert!(!a.is_available(&slot(Day::Monday, 11))); // 11-12 overlaps
        assert!(a.is_available(&slot(Day::Monday, 12)));
        assert!(a.is_available(&slot(Day::Tuesday, 10)));
    }

    #[test]
    fn test_blocked_minutes() {
        let a = Availability::always()
            .with_blocked(Day::Friday, t(9, 0), t(10, 0))
            .with_blocked(Day::Friday, t(14, 0), t(14, 30));
        assert_eq!(a.blocked_minutes(Day::Friday), 90);
        assert_eq!(a.blocked_minutes(Day::Monday), 0);
    }
}
