//! Constraint evaluator.
//!
//! Given a candidate (subject, teacher, classroom, slot) tuple, the
//! schedule built so far and the workload tracker, reports whether the
//! tuple satisfies every hard constraint and how well it meets the soft
//! preferences.
//!
//! # Hard Checks (in order)
//!
//! | Check | Rejection |
//! |-------|-----------|
//! | teacher qualified for subject | `UnqualifiedTeacher` |
//! | room type, capacity, features | `RoomMismatch` |
//! | slot length fits session (+ slack) | `DurationMismatch` |
//! | teacher active and available | `TeacherUnavailable` |
//! | room open and available | `ClassroomUnavailable` |
//! | no overlapping teacher booking | `TeacherBusy` |
//! | no overlapping room booking | `ClassroomBusy` |
//! | projected weekly minutes within cap | `WeeklyHoursExceeded` |
//! | projected consecutive run within cap | `ConsecutiveHoursExceeded` |
//!
//! The first failed check is reported. Scoring never rejects.

mod preferences;

pub use preferences::{
    Fragmentation, MorningSlot, Preference, Preferences, RoomFit, ScoreContext, SubjectSpread,
    WorkloadBalance,
};

use thiserror::Error;

use crate::config::SchedulingConfig;
use crate::models::{Classroom, Schedule, ScheduleEntry, Subject, Teacher, TimeSlot};
use crate::registry::Registry;
use crate::workload::WorkloadTracker;

/// A tuple under evaluation.
#[derive(Debug, Clone, Copy)]
pub struct Candidate<'a> {
    pub subject: &'a Subject,
    pub teacher: &'a Teacher,
    pub classroom: &'a Classroom,
    pub slot: &'a TimeSlot,
}

impl<'a> Candidate<'a> {
    /// Creates a candidate.
    pub fn new(
        subject: &'a Subject,
        teacher: &'a Teacher,
        classroom: &'a Classroom,
        slot: &'a TimeSlot,
    ) -> Self {
        Self {
            subject,
            teacher,
            classroom,
            slot,
        }
    }

    /// Resolves an entry's identifiers against the registry.
    ///
    /// # Errors
    /// `NotFound` for the first unknown identifier.
    pub fn resolve(registry: &'a Registry, entry: &ScheduleEntry) -> crate::Result<Self> {
        Ok(Self {
            subject: registry.subject(&entry.subject)?,
            teacher: registry.teacher(&entry.teacher)?,
            classroom: registry.classroom(&entry.classroom)?,
            slot: registry.slot(entry.slot)?,
        })
    }

    /// The schedule entry this candidate would produce.
    pub fn to_entry(&self) -> ScheduleEntry {
        ScheduleEntry::new(
            &self.subject.code,
            &self.teacher.employee_code,
            &self.classroom.room_number,
            self.slot.id,
        )
    }
}

/// Why a candidate is infeasible.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("teacher is not qualified for the subject")]
    UnqualifiedTeacher,

    #[error("room does not suit the subject: {0}")]
    RoomMismatch(String),

    #[error("{slot_minutes}-minute slot does not fit a {session_minutes}-minute session")]
    DurationMismatch {
        slot_minutes: u32,
        session_minutes: u32,
    },

    #[error("teacher is not available in this slot")]
    TeacherUnavailable,

    #[error("classroom is not available in this slot")]
    ClassroomUnavailable,

    #[error("teacher already teaches in an overlapping slot")]
    TeacherBusy,

    #[error("classroom already booked in an overlapping slot")]
    ClassroomBusy,

    #[error("weekly load would reach {projected} of {cap} minutes")]
    WeeklyHoursExceeded { projected: u32, cap: u32 },

    #[error("consecutive run would reach {projected} of {cap} minutes")]
    ConsecutiveHoursExceeded { projected: u32, cap: u32 },
}

/// Whether a slot can hold a session of `session_minutes`.
pub(crate) fn duration_fits(slot: &TimeSlot, session_minutes: u32, slack_minutes: u32) -> bool {
    let available = slot.duration_minutes();
    available >= session_minutes && available - session_minutes <= slack_minutes
}

/// Hard-constraint checks and soft-preference scoring.
///
/// # Example
///
/// ```
/// use u_timetable::config::SchedulingConfig;
/// use u_timetable::evaluator::{Candidate, ConstraintEvaluator};
/// use u_timetable::models::{Classroom, RoomType, Schedule, Subject, Teacher};
/// use u_timetable::registry::Registry;
/// use u_timetable::workload::WorkloadTracker;
///
/// let config = SchedulingConfig::default();
/// let mut registry = Registry::with_slots_from(&config).unwrap();
/// registry.add_subject(Subject::new("MATH", "Math")).unwrap();
/// registry.add_teacher(Teacher::new("T1", "Ada").qualified_for("MATH")).unwrap();
/// registry.add_classroom(Classroom::new("R1", 30, RoomType::Classroom)).unwrap();
///
/// let evaluator = ConstraintEvaluator::new(&registry, &config);
/// let candidate = Candidate::new(
///     registry.subject("MATH").unwrap(),
///     registry.teacher("T1").unwrap(),
///     registry.classroom("R1").unwrap(),
///     registry.slot(0).unwrap(),
/// );
/// let tracker = WorkloadTracker::new(config.consecutive_gap_minutes);
/// assert!(evaluator.is_feasible(&candidate, &Schedule::new(), &tracker));
/// ```
#[derive(Debug, Clone)]
pub struct ConstraintEvaluator<'a> {
    registry: &'a Registry,
    config: &'a SchedulingConfig,
    preferences: Preferences,
}

impl<'a> ConstraintEvaluator<'a> {
    /// Creates an evaluator with the built-in preferences weighted by
    /// `config.weights`.
    pub fn new(registry: &'a Registry, config: &'a SchedulingConfig) -> Self {
        Self {
            registry,
            config,
            preferences: Preferences::from_weights(&config.weights),
        }
    }

    /// Replaces the soft preferences.
    pub fn with_preferences(mut self, preferences: Preferences) -> Self {
        self.preferences = preferences;
        self
    }

    /// Registry the evaluator resolves identifiers against.
    pub fn registry(&self) -> &'a Registry {
        self.registry
    }

    /// Configuration in use.
    pub fn config(&self) -> &'a SchedulingConfig {
        self.config
    }

    /// Checks every hard constraint.
    ///
    /// # Errors
    /// The first failed check.
    pub fn check(
        &self,
        candidate: &Candidate<'_>,
        schedule: &Schedule,
        tracker: &WorkloadTracker,
    ) -> Result<(), Rejection> {
        let Candidate {
            subject,
            teacher,
            classroom,
            slot,
        } = *candidate;

        if !teacher.can_teach(&subject.code) {
            return Err(Rejection::UnqualifiedTeacher);
        }
        if let Some(reason) = classroom.mismatch(subject) {
            return Err(Rejection::RoomMismatch(reason));
        }
        if !duration_fits(
            slot,
            subject.duration_minutes,
            self.config.duration_slack_minutes,
        ) {
            return Err(Rejection::DurationMismatch {
                slot_minutes: slot.duration_minutes(),
                session_minutes: subject.duration_minutes,
            });
        }
        if !teacher.is_available(slot) {
            return Err(Rejection::TeacherUnavailable);
        }
        if !classroom.is_available(slot) {
            return Err(Rejection::ClassroomUnavailable);
        }

        for entry in schedule {
            let Some(booked) = self.registry.slots.find(&entry.slot) else {
                continue;
            };
            if !booked.overlaps(slot) {
                continue;
            }
            if entry.teacher == teacher.employee_code {
                return Err(Rejection::TeacherBusy);
            }
            if entry.classroom == classroom.room_number {
                return Err(Rejection::ClassroomBusy);
            }
        }

        let projection = tracker.project(&teacher.employee_code, slot, subject.duration_minutes);

        let weekly_cap = teacher.weekly_cap_minutes(self.config.max_weekly_hours_per_teacher);
        if projection.weekly_minutes > weekly_cap {
            return Err(Rejection::WeeklyHoursExceeded {
                projected: projection.weekly_minutes,
                cap: weekly_cap,
            });
        }

        let run_cap = teacher.consecutive_cap_minutes(self.config.max_consecutive_hours);
        if projection.run_minutes > run_cap {
            return Err(Rejection::ConsecutiveHoursExceeded {
                projected: projection.run_minutes,
                cap: run_cap,
            });
        }

        Ok(())
    }

    /// Whether the candidate satisfies every hard constraint.
    pub fn is_feasible(
        &self,
        candidate: &Candidate<'_>,
        schedule: &Schedule,
        tracker: &WorkloadTracker,
    ) -> bool {
        self.check(candidate, schedule, tracker).is_ok()
    }

    /// Soft-preference score (higher is better).
    pub fn score(
        &self,
        candidate: &Candidate<'_>,
        schedule: &Schedule,
        tracker: &WorkloadTracker,
    ) -> f64 {
        let context = ScoreContext {
            registry: self.registry,
            config: self.config,
            schedule,
            tracker,
        };
        self.preferences.score(candidate, &context)
    }
}
