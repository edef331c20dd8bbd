//! Timetable quality metrics (KPIs).
//!
//! Computes workload and utilization indicators from a schedule and the
//! registry it was built from.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Teacher hours | Scheduled session hours per teacher |
//! | Room minutes | Scheduled session minutes per room and day |
//! | Room utilization | Booked slot minutes / available slot minutes |
//! | Average teacher hours | Mean over teachers with at least one session |
//! | Total teaching hours | Sum of all session hours |
//! | Success rate | Placed / required sessions × 100 |

use std::collections::BTreeMap;

use crate::models::{Day, Schedule};
use crate::registry::Registry;

/// Timetable performance indicators.
#[derive(Debug, Clone)]
pub struct TimetableKpi {
    /// Weekly teaching hours per teacher.
    pub teacher_hours: BTreeMap<String, f64>,
    /// Scheduled minutes per classroom and day.
    pub room_minutes: BTreeMap<String, BTreeMap<Day, u32>>,
    /// Fraction of slot time each classroom is booked (0.0..1.0).
    pub room_utilization: BTreeMap<String, f64>,
    /// Mean hours over teachers with sessions.
    pub avg_teacher_hours: f64,
    /// Sum of all session hours.
    pub total_teaching_hours: f64,
    /// Sessions placed.
    pub placed_sessions: u32,
    /// Sessions required by all subjects.
    pub required_sessions: u32,
    /// `placed / required * 100` (100 when nothing is required).
    pub success_rate: f64,
}

impl TimetableKpi {
    /// Computes KPIs from a schedule and its registry.
    ///
    /// Entries that reference unknown subjects or slots are ignored.
    pub fn calculate(schedule: &Schedule, registry: &Registry) -> Self {
        let mut teacher_minutes: BTreeMap<String, u32> = BTreeMap::new();
        let mut room_minutes: BTreeMap<String, BTreeMap<Day, u32>> = BTreeMap::new();
        let mut room_slot_minutes: BTreeMap<String, u32> = BTreeMap::new();
        let mut placed: u32 = 0;

        for entry in schedule {
            let (Some(subject), Some(slot)) = (
                registry.subjects.find(entry.subject.as_str()),
                registry.slots.find(&entry.slot),
            ) else {
                continue;
            };
            placed += 1;
            let minutes = teacher_minutes.entry(entry.teacher.clone()).or_default();
            *minutes = minutes.saturating_add(subject.duration_minutes);
            let day = room_minutes
                .entry(entry.classroom.clone())
                .or_default()
                .entry(slot.day)
                .or_default();
            *day = day.saturating_add(subject.duration_minutes);
            let booked = room_slot_minutes.entry(entry.classroom.clone()).or_default();
            *booked = booked.saturating_add(slot.duration_minutes());
        }

        let week_minutes: u32 = registry.slots.list().map(|s| s.duration_minutes()).sum();
        let room_utilization = room_slot_minutes
            .into_iter()
            .map(|(room, booked)| {
                let util = if week_minutes == 0 {
                    0.0
                } else {
                    f64::from(booked) / f64::from(week_minutes)
                };
                (room, util)
            })
            .collect();

        let teacher_hours: BTreeMap<String, f64> = teacher_minutes
            .into_iter()
            .map(|(t, m)| (t, f64::from(m) / 60.0))
            .collect();
        let total_teaching_hours: f64 = teacher_hours.values().sum();
        let avg_teacher_hours = if teacher_hours.is_empty() {
            0.0
        } else {
            total_teaching_hours / teacher_hours.len() as f64
        };

        let required: u32 = registry.subjects.list().map(|s| s.sessions_per_week).sum();
        let success_rate = if required == 0 {
            100.0
        } else {
            f64::from(placed) / f64::from(required) * 100.0
        };

        Self {
            teacher_hours,
            room_minutes,
            room_utilization,
            avg_teacher_hours,
            total_teaching_hours,
            placed_sessions: placed,
            required_sessions: required,
            success_rate,
        }
    }

    /// Whether the timetable meets the given quality thresholds.
    pub fn meets_thresholds(&self, min_success_rate: f64, max_teacher_hours: f64) -> bool {
        self.success_rate >= min_success_rate
            && self
                .teacher_hours
                .values()
                .all(|&h| h <= max_teacher_hours)
    }
}
