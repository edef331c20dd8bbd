//! Weekly time slots.
//!
//! A slot is a half-open interval `[start, end)` on one day of the
//! teaching week. The slot universe for a run is generated from the
//! configured daily bounds and lunch break (see [`generate_slots`]).
//!
//! # Time Model
//! Clock times are `chrono::NaiveTime`. All arithmetic is done in
//! minutes since midnight so that nothing wraps past 24:00.

use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use crate::config::SchedulingConfig;
use crate::error::Result;

/// Stable time slot identifier (generation order = chronological order).
pub type SlotId = u32;

/// Day of the teaching week. Ordered Monday first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Day {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Day {
    /// Monday through Friday.
    pub const WEEKDAYS: [Day; 5] = [
        Day::Monday,
        Day::Tuesday,
        Day::Wednesday,
        Day::Thursday,
        Day::Friday,
    ];

    /// All seven days.
    pub const ALL: [Day; 7] = [
        Day::Monday,
        Day::Tuesday,
        Day::Wednesday,
        Day::Thursday,
        Day::Friday,
        Day::Saturday,
        Day::Sunday,
    ];

    /// Three-letter abbreviation.
    pub fn short_name(self) -> &'static str {
        match self {
            Day::Monday => "Mon",
            Day::Tuesday => "Tue",
            Day::Wednesday => "Wed",
            Day::Thursday => "Thu",
            Day::Friday => "Fri",
            Day::Saturday => "Sat",
            Day::Sunday => "Sun",
        }
    }
}

impl From<chrono::Weekday> for Day {
    fn from(w: chrono::Weekday) -> Self {
        Day::ALL[w.num_days_from_monday() as usize]
    }
}

impl fmt::Display for Day {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

/// A bookable interval on one weekday.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlot {
    /// Unique slot identifier.
    pub id: SlotId,
    /// Day of the week.
    pub day: Day,
    /// Start time (inclusive).
    pub start: NaiveTime,
    /// End time (exclusive).
    pub end: NaiveTime,
}

impl TimeSlot {
    /// Creates a new slot.
    pub fn new(id: SlotId, day: Day, start: NaiveTime, end: NaiveTime) -> Self {
        Self {
            id,
            day,
            start,
            end,
        }
    }

    /// Start as minutes since midnight.
    #[inline]
    pub fn start_minute(&self) -> u32 {
        minute_of_day(self.start)
    }

    /// End as minutes since midnight.
    #[inline]
    pub fn end_minute(&self) -> u32 {
        minute_of_day(self.end)
    }

    /// Derived duration (0 for a malformed slot with `end <= start`).
    #[inline]
    pub fn duration_minutes(&self) -> u32 {
        self.end_minute().saturating_sub(self.start_minute())
    }

    /// Whether two slots overlap in time on the same day.
    pub fn overlaps(&self, other: &Self) -> bool {
        self.day == other.day
            && self.start_minute() < other.end_minute()
            && other.start_minute() < self.end_minute()
    }

    /// Whether two slots touch end-to-start on the same day.
    pub fn is_adjacent_to(&self, other: &Self) -> bool {
        self.day == other.day
            && (self.end_minute() == other.start_minute()
                || other.end_minute() == self.start_minute())
    }

    /// Whether the slot starts before noon.
    pub fn is_morning(&self) -> bool {
        self.start_minute() < 12 * 60
    }
}

impl fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}-{}",
            self.day,
            self.start.format("%H:%M"),
            self.end.format("%H:%M")
        )
    }
}

/// Minutes since midnight.
#[inline]
pub(crate) fn minute_of_day(t: NaiveTime) -> u32 {
    t.num_seconds_from_midnight() / 60
}

/// Clock time at a minute of the day (`None` past 23:59).
pub(crate) fn time_at(minute: u32) -> Option<NaiveTime> {
    NaiveTime::from_num_seconds_from_midnight_opt(minute.checked_mul(60)?, 0)
}

/// Slot boundaries for one day, in minutes since midnight.
///
/// Back-to-back `session` intervals from `day_start`; an interval that
/// would overlap the lunch window `[lunch_start, lunch_end)` is skipped
/// and generation resumes at `lunch_end`.
pub(crate) fn daily_layout(
    day_start: u32,
    day_end: u32,
    lunch: (u32, u32),
    session: u32,
) -> Vec<(u32, u32)> {
    let mut out = Vec::new();
    if session == 0 {
        return out;
    }
    let (lunch_start, lunch_end) = lunch;
    let mut t = day_start;
    while let Some(end) = t.checked_add(session).filter(|&end| end <= day_end) {
        if lunch_start < lunch_end && t < lunch_end && lunch_start < end {
            t = lunch_end;
            continue;
        }
        out.push((t, end));
        t = end;
    }
    out
}

/// Generates the slot universe for a configuration.
///
/// Slots are numbered from 0 in (day, start) order. Fails with
/// `InfeasibleConfiguration` if the configuration is self-contradictory.
///
/// # Example
///
/// ```
/// use u_timetable::config::SchedulingConfig;
/// use u_timetable::models::generate_slots;
///
/// // 09:00-17:00 with lunch 12:00-13:00 → 7 one-hour slots per weekday
/// let slots = generate_slots(&SchedulingConfig::default()).unwrap();
/// assert_eq!(slots.len(), 35);
/// ```
pub fn generate_slots(config: &SchedulingConfig) -> Result<Vec<TimeSlot>> {
    config.check()?;

    let layout = daily_layout(
        minute_of_day(config.day_start),
        minute_of_day(config.day_end),
        (
            minute_of_day(config.lunch_start),
            minute_of_day(config.lunch_end),
        ),
        config.session_minutes,
    );
    let days: BTreeSet<Day> = config.working_days.iter().copied().collect();

    let mut slots = Vec::with_capacity(days.len() * layout.len());
    for day in days {
        for &(start, end) in &layout {
            // Both bounds come from check()-validated NaiveTimes.
            if let (Some(s), Some(e)) = (time_at(start), time_at(end)) {
                slots.push(TimeSlot::new(slots.len() as SlotId, day, s, e));
            }
        }
    }
    Ok(slots)
}
