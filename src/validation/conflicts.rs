//! Schedule conflict detection.
//!
//! Re-checks a finished schedule against every hard constraint, without
//! trusting how it was produced. Hand-edited and imported schedules go
//! through the same checks as generated ones.
//!
//! # Checks
//!
//! | Order | Kind | Scope |
//! |-------|------|-------|
//! | 1 | `UnknownReference` | entry (unresolved entries skip the rest) |
//! | 2 | `TeacherDoubleBooked`, `ClassroomDoubleBooked` | overlapping pair |
//! | 3 | `UnqualifiedTeacher` | entry |
//! | 4 | `RoomMismatch` | entry |
//! | 5 | `DurationMismatch` | entry |
//! | 6 | `ResourceUnavailable` | entry |
//! | 7 | `SessionCountMismatch` | subject |
//! | 8 | `WeeklyHoursExceeded` | teacher |
//! | 9 | `ConsecutiveHoursExceeded` | teacher and day |
//!
//! # Complexity
//! O(n²) in the number of entries for the pairwise overlap check.

use std::collections::BTreeMap;

use tracing::debug;

use crate::config::SchedulingConfig;
use crate::evaluator::{duration_fits, Candidate};
use crate::models::{Conflict, ConflictKind, Day, Schedule, UnscheduledSession};
use crate::registry::Registry;
use crate::workload::{runs, Interval};

/// Finds every hard-constraint violation in a schedule.
///
/// `unscheduled` is the shortfall reported alongside the schedule. A
/// subject is consistent when its placed sessions plus its reported
/// shortfall equal its weekly requirement.
///
/// Returns an empty list for a valid schedule.
pub fn validate(
    schedule: &Schedule,
    registry: &Registry,
    config: &SchedulingConfig,
    unscheduled: &[UnscheduledSession],
) -> Vec<Conflict> {
    let mut conflicts = Vec::new();

    let mut resolved: Vec<(usize, Candidate<'_>)> = Vec::with_capacity(schedule.len());
    for (index, entry) in schedule.iter().enumerate() {
        match Candidate::resolve(registry, entry) {
            Ok(candidate) => resolved.push((index, candidate)),
            Err(e) => conflicts.push(Conflict::new(
                ConflictKind::UnknownReference,
                vec![index],
                entry.subject.clone(),
                format!("Entry {index}: {e}"),
            )),
        }
    }

    check_double_bookings(&resolved, &mut conflicts);
    for (index, candidate) in &resolved {
        check_entry(*index, candidate, config, &mut conflicts);
    }
    check_session_counts(schedule, registry, unscheduled, &mut conflicts);
    check_workloads(&resolved, config, &mut conflicts);

    debug!(
        event = "schedule_validated",
        entries = schedule.len(),
        conflicts = conflicts.len()
    );
    conflicts
}

fn check_double_bookings(resolved: &[(usize, Candidate<'_>)], conflicts: &mut Vec<Conflict>) {
    for (i, (a, first)) in resolved.iter().enumerate() {
        for (b, second) in &resolved[i + 1..] {
            if !first.slot.overlaps(second.slot) {
                continue;
            }
            let teacher = &first.teacher.employee_code;
            if *teacher == second.teacher.employee_code {
                conflicts.push(Conflict::new(
                    ConflictKind::TeacherDoubleBooked,
                    vec![*a, *b],
                    teacher.clone(),
                    format!(
                        "Teacher '{teacher}' teaches entries {a} and {b} in overlapping slots {} and {}",
                        first.slot, second.slot
                    ),
                ));
            }
            let room = &first.classroom.room_number;
            if *room == second.classroom.room_number {
                conflicts.push(Conflict::new(
                    ConflictKind::ClassroomDoubleBooked,
                    vec![*a, *b],
                    room.clone(),
                    format!(
                        "Classroom '{room}' hosts entries {a} and {b} in overlapping slots {} and {}",
                        first.slot, second.slot
                    ),
                ));
            }
        }
    }
}

fn check_entry(
    index: usize,
    candidate: &Candidate<'_>,
    config: &SchedulingConfig,
    conflicts: &mut Vec<Conflict>,
) {
    let Candidate {
        subject,
        teacher,
        classroom,
        slot,
    } = *candidate;

    if !teacher.can_teach(&subject.code) {
        conflicts.push(Conflict::new(
            ConflictKind::UnqualifiedTeacher,
            vec![index],
            teacher.employee_code.clone(),
            format!(
                "Teacher '{}' is not qualified for subject '{}'",
                teacher.employee_code, subject.code
            ),
        ));
    }
    if let Some(reason) = classroom.mismatch(subject) {
        conflicts.push(Conflict::new(
            ConflictKind::RoomMismatch,
            vec![index],
            classroom.room_number.clone(),
            format!(
                "Classroom '{}' does not suit subject '{}': {reason}",
                classroom.room_number, subject.code
            ),
        ));
    }
    if !duration_fits(slot, subject.duration_minutes, config.duration_slack_minutes) {
        conflicts.push(Conflict::new(
            ConflictKind::DurationMismatch,
            vec![index],
            subject.code.clone(),
            format!(
                "Slot {slot} ({} min) does not fit a {}-minute session of '{}'",
                slot.duration_minutes(),
                subject.duration_minutes,
                subject.code
            ),
        ));
    }
    if !teacher.is_available(slot) {
        conflicts.push(Conflict::new(
            ConflictKind::ResourceUnavailable,
            vec![index],
            teacher.employee_code.clone(),
            format!("Teacher '{}' is unavailable in slot {slot}", teacher.employee_code),
        ));
    }
    if !classroom.is_available(slot) {
        conflicts.push(Conflict::new(
            ConflictKind::ResourceUnavailable,
            vec![index],
            classroom.room_number.clone(),
            format!("Classroom '{}' is unavailable in slot {slot}", classroom.room_number),
        ));
    }
}

fn check_session_counts(
    schedule: &Schedule,
    registry: &Registry,
    unscheduled: &[UnscheduledSession],
    conflicts: &mut Vec<Conflict>,
) {
    let mut reported: BTreeMap<String, u32> = BTreeMap::new();
    for row in unscheduled {
        let code = row.subject.to_uppercase();
        if !registry.subjects.contains(code.as_str()) {
            conflicts.push(Conflict::new(
                ConflictKind::UnknownReference,
                Vec::new(),
                code.clone(),
                format!("Unscheduled report names unknown subject '{code}'"),
            ));
            continue;
        }
        let missing = reported.entry(code).or_default();
        *missing = missing.saturating_add(row.missing);
    }

    for subject in registry.subjects.list() {
        let entries: Vec<usize> = schedule
            .iter()
            .enumerate()
            .filter(|(_, e)| e.subject == subject.code)
            .map(|(i, _)| i)
            .collect();
        let placed = entries.len() as u32;
        let missing = reported.get(&subject.code).copied().unwrap_or(0);
        if placed.saturating_add(missing) != subject.sessions_per_week {
            conflicts.push(Conflict::new(
                ConflictKind::SessionCountMismatch,
                entries,
                subject.code.clone(),
                format!(
                    "Subject '{}' has {placed} placed and {missing} unscheduled sessions, requires {}",
                    subject.code, subject.sessions_per_week
                ),
            ));
        }
    }
}

fn check_workloads(
    resolved: &[(usize, Candidate<'_>)],
    config: &SchedulingConfig,
    conflicts: &mut Vec<Conflict>,
) {
    let mut by_teacher: BTreeMap<&str, Vec<&(usize, Candidate<'_>)>> = BTreeMap::new();
    for item in resolved {
        by_teacher
            .entry(item.1.teacher.employee_code.as_str())
            .or_default()
            .push(item);
    }

    for (code, items) in &by_teacher {
        let teacher = items[0].1.teacher;

        let weekly = items
            .iter()
            .fold(0u32, |sum, (_, c)| sum.saturating_add(c.subject.duration_minutes));
        let weekly_cap = teacher.weekly_cap_minutes(config.max_weekly_hours_per_teacher);
        if weekly > weekly_cap {
            conflicts.push(Conflict::new(
                ConflictKind::WeeklyHoursExceeded,
                items.iter().map(|(i, _)| *i).collect(),
                *code,
                format!("Teacher '{code}' teaches {weekly} minutes a week, cap is {weekly_cap}"),
            ));
        }

        let mut by_day: BTreeMap<Day, Vec<(Interval, usize)>> = BTreeMap::new();
        for (index, c) in items {
            by_day
                .entry(c.slot.day)
                .or_default()
                .push((Interval::of_session(c.slot, c.subject.duration_minutes), *index));
        }
        let run_cap = teacher.consecutive_cap_minutes(config.max_consecutive_hours);
        for (day, mut day_items) in by_day {
            day_items.sort();
            let intervals: Vec<Interval> = day_items.iter().map(|(iv, _)| *iv).collect();
            for (first, last, minutes) in runs(&intervals, config.consecutive_gap_minutes) {
                if minutes > run_cap {
                    conflicts.push(Conflict::new(
                        ConflictKind::ConsecutiveHoursExceeded,
                        day_items[first..=last].iter().map(|(_, i)| *i).collect(),
                        *code,
                        format!(
                            "Teacher '{code}' teaches {minutes} consecutive minutes on {day}, cap is {run_cap}"
                        ),
                    ));
                }
            }
        }
    }
}
