//! Workload tracker.
//!
//! Running per-teacher totals consulted by the evaluator and updated by
//! the engine:
//!
//! - cumulative scheduled minutes this week (plus session count)
//! - per (teacher, day), the occupied intervals kept sorted by start
//!
//! # Consistency
//! `project` never mutates; `commit` then `rollback` with the same
//! arguments restores the tracker to a value equal to the pre-commit one
//! (empty per-day lists and zero loads are removed, not left behind).
//!
//! # Consecutive Runs
//! Sessions of one teacher on one day belong to the same run when the gap
//! between them is shorter than the configured threshold (a zero gap
//! always joins). A run's length is the sum of its session minutes.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{EntityKind, Result, TimetableError};
use crate::models::{Day, Schedule, TimeSlot};
use crate::registry::Registry;

/// Occupied interval in minutes since midnight, `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Interval {
    pub start: u32,
    pub end: u32,
}

impl Interval {
    /// Interval a session of `minutes` occupies when it starts with `slot`.
    pub fn of_session(slot: &TimeSlot, minutes: u32) -> Self {
        let start = slot.start_minute();
        Self {
            start,
            end: start.saturating_add(minutes),
        }
    }

    /// Length in minutes.
    pub fn minutes(&self) -> u32 {
        self.end - self.start
    }
}

/// Committed load of one teacher.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeacherLoad {
    /// Scheduled minutes this week.
    pub minutes: u32,
    /// Scheduled sessions this week.
    pub sessions: u32,
}

/// Hypothetical totals after adding one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Projection {
    /// Weekly minutes including the new session.
    pub weekly_minutes: u32,
    /// Length of the consecutive run that would contain the new session.
    pub run_minutes: u32,
}

/// Per-teacher workload state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkloadTracker {
    loads: BTreeMap<String, TeacherLoad>,
    days: BTreeMap<(String, Day), Vec<Interval>>,
    gap_minutes: u32,
}

impl WorkloadTracker {
    /// Creates an empty tracker. Gaps shorter than `gap_minutes` join runs.
    pub fn new(gap_minutes: u32) -> Self {
        Self {
            loads: BTreeMap::new(),
            days: BTreeMap::new(),
            gap_minutes,
        }
    }

    /// Rebuilds a tracker from an existing schedule.
    ///
    /// Entries referencing unknown subjects or slots are skipped; the
    /// validator reports them.
    pub fn from_schedule(schedule: &Schedule, registry: &Registry, gap_minutes: u32) -> Self {
        let mut tracker = Self::new(gap_minutes);
        for entry in schedule {
            let (Some(subject), Some(slot)) = (
                registry.subjects.find(entry.subject.as_str()),
                registry.slots.find(&entry.slot),
            ) else {
                continue;
            };
            tracker.commit(&entry.teacher, slot, subject.duration_minutes);
        }
        tracker
    }

    /// Gap threshold (minutes).
    pub fn gap_minutes(&self) -> u32 {
        self.gap_minutes
    }

    /// Totals the teacher would have after a `minutes` session in `slot`.
    pub fn project(&self, teacher: &str, slot: &TimeSlot, minutes: u32) -> Projection {
        let interval = Interval::of_session(slot, minutes);
        let weekly_minutes = self.load_minutes(teacher).saturating_add(minutes);

        let mut intervals = self.day_intervals(teacher, slot.day).to_vec();
        let at = intervals.partition_point(|i| *i <= interval);
        intervals.insert(at, interval);

        Projection {
            weekly_minutes,
            run_minutes: run_containing(&intervals, at, self.gap_minutes),
        }
    }

    /// Records a session.
    pub fn commit(&mut self, teacher: &str, slot: &TimeSlot, minutes: u32) {
        let interval = Interval::of_session(slot, minutes);

        let load = self.loads.entry(teacher.to_string()).or_default();
        load.minutes = load.minutes.saturating_add(minutes);
        load.sessions += 1;

        let intervals = self
            .days
            .entry((teacher.to_string(), slot.day))
            .or_default();
        let at = intervals.partition_point(|i| *i <= interval);
        intervals.insert(at, interval);
    }

    /// Reverses a previous [`commit`](Self::commit) with the same arguments.
    ///
    /// # Errors
    /// `NotFound` (kind `Booking`) if no such session was committed; the
    /// tracker is unchanged.
    pub fn rollback(&mut self, teacher: &str, slot: &TimeSlot, minutes: u32) -> Result<()> {
        let interval = Interval::of_session(slot, minutes);
        let key = (teacher.to_string(), slot.day);

        let booking = || {
            TimetableError::not_found(EntityKind::Booking, format!("{teacher} @ {slot}"))
        };

        let intervals = self.days.get_mut(&key).ok_or_else(booking)?;
        let pos = intervals
            .iter()
            .rposition(|i| *i == interval)
            .ok_or_else(booking)?;
        let load = self.loads.get_mut(teacher).ok_or_else(booking)?;

        intervals.remove(pos);
        if intervals.is_empty() {
            self.days.remove(&key);
        }

        load.minutes = load.minutes.saturating_sub(minutes);
        load.sessions = load.sessions.saturating_sub(1);
        if load.sessions == 0 {
            self.loads.remove(teacher);
        }
        Ok(())
    }

    /// Committed weekly minutes of a teacher.
    pub fn load_minutes(&self, teacher: &str) -> u32 {
        self.loads.get(teacher).map_or(0, |l| l.minutes)
    }

    /// Committed load of a teacher.
    pub fn load(&self, teacher: &str) -> TeacherLoad {
        self.loads.get(teacher).copied().unwrap_or_default()
    }

    /// Occupied intervals of a teacher on a day, sorted by start.
    pub fn day_intervals(&self, teacher: &str, day: Day) -> &[Interval] {
        self.days
            .get(&(teacher.to_string(), day))
            .map_or(&[][..], Vec::as_slice)
    }

    /// Whether the teacher teaches at all on a day.
    pub fn teaches_on(&self, teacher: &str, day: Day) -> bool {
        !self.day_intervals(teacher, day).is_empty()
    }

    /// Mean committed minutes over a set of teachers (0 for an empty set).
    pub fn mean_load<'a>(&self, teachers: impl IntoIterator<Item = &'a str>) -> f64 {
        let (sum, n) = teachers
            .into_iter()
            .fold((0u64, 0u32), |(sum, n), t| {
                (sum + u64::from(self.load_minutes(t)), n + 1)
            });
        if n == 0 {
            0.0
        } else {
            sum as f64 / f64::from(n)
        }
    }

    /// Committed loads, keyed by teacher.
    pub fn loads(&self) -> impl Iterator<Item = (&str, TeacherLoad)> {
        self.loads.iter().map(|(t, l)| (t.as_str(), *l))
    }
}

/// Whether `next` continues a run that currently ends at `run_end`.
fn joins(run_end: u32, next: &Interval, gap_minutes: u32) -> bool {
    let gap = next.start.saturating_sub(run_end);
    gap == 0 || gap < gap_minutes
}

/// Minutes of the run containing `intervals[index]` (sorted input).
fn run_containing(intervals: &[Interval], index: usize, gap_minutes: u32) -> u32 {
    runs(intervals, gap_minutes)
        .into_iter()
        .find(|&(first, last, _)| first <= index && index <= last)
        .map_or(0, |(_, _, minutes)| minutes)
}

/// Runs of a sorted interval list as `(first index, last index, minutes)`.
pub(crate) fn runs(intervals: &[Interval], gap_minutes: u32) -> Vec<(usize, usize, u32)> {
    let mut out: Vec<(usize, usize, u32)> = Vec::new();
    let mut run_end = 0;
    for (i, interval) in intervals.iter().enumerate() {
        match out.last_mut() {
            Some(run) if joins(run_end, interval, gap_minutes) => {
                run.1 = i;
                run.2 = run.2.saturating_add(interval.minutes());
                run_end = run_end.max(interval.end);
            }
            _ => {
                out.push((i, i, interval.minutes()));
                run_end = interval.end;
            }
        }
    }
    out
}
