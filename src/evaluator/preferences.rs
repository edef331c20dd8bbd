//! Soft preferences.
//!
//! Each preference rates a feasible candidate; the evaluator sums the
//! ratings weighted by [`ScoringWeights`].
//!
//! # Score Convention
//! **Higher score = better candidate.** Bonuses are positive, penalties
//! negative. Subject priority is deliberately absent: it decides the
//! order subjects are placed in, never which slot a session gets.

use std::fmt::Debug;
use std::sync::Arc;

use super::Candidate;
use crate::config::{SchedulingConfig, ScoringWeights};
use crate::models::Schedule;
use crate::registry::Registry;
use crate::workload::{Interval, WorkloadTracker};

/// State a preference may inspect.
#[derive(Debug, Clone, Copy)]
pub struct ScoreContext<'a> {
    pub registry: &'a Registry,
    pub config: &'a SchedulingConfig,
    pub schedule: &'a Schedule,
    pub tracker: &'a WorkloadTracker,
}

/// A soft preference over candidates.
pub trait Preference: Send + Sync + Debug {
    /// Preference name.
    fn name(&self) -> &'static str;

    /// Unweighted rating of a candidate (higher = better).
    fn evaluate(&self, candidate: &Candidate<'_>, context: &ScoreContext<'_>) -> f64;
}

/// Bonus for slots starting before noon, when morning sessions are preferred.
#[derive(Debug, Clone, Copy)]
pub struct MorningSlot;

impl Preference for MorningSlot {
    fn name(&self) -> &'static str {
        "MORNING"
    }

    fn evaluate(&self, candidate: &Candidate<'_>, context: &ScoreContext<'_>) -> f64 {
        if context.config.prefer_morning_sessions && candidate.slot.is_morning() {
            1.0
        } else {
            0.0
        }
    }
}

/// Steers sessions toward under-used teachers.
///
/// Rating = `-(load - mean) / 60`, in hours, where the mean is taken over
/// every teacher qualified for the subject.
#[derive(Debug, Clone, Copy)]
pub struct WorkloadBalance;

impl Preference for WorkloadBalance {
    fn name(&self) -> &'static str {
        "WORKLOAD_BALANCE"
    }

    fn evaluate(&self, candidate: &Candidate<'_>, context: &ScoreContext<'_>) -> f64 {
        let tracker = context.tracker;
        let mean = tracker.mean_load(
            context
                .registry
                .qualified_teachers(candidate.subject)
                .map(|t| t.employee_code.as_str()),
        );
        let load = f64::from(tracker.load_minutes(&candidate.teacher.employee_code));
        -(load - mean) / 60.0
    }
}

/// Penalizes an isolated session in a day the teacher already teaches.
#[derive(Debug, Clone, Copy)]
pub struct Fragmentation;

impl Preference for Fragmentation {
    fn name(&self) -> &'static str {
        "FRAGMENTATION"
    }

    fn evaluate(&self, candidate: &Candidate<'_>, context: &ScoreContext<'_>) -> f64 {
        let day = context
            .tracker
            .day_intervals(&candidate.teacher.employee_code, candidate.slot.day);
        if day.is_empty() {
            return 0.0;
        }
        let new = Interval::of_session(candidate.slot, candidate.subject.duration_minutes);
        let threshold = context.tracker.gap_minutes();
        let near = day.iter().any(|other| {
            let gap = if other.end <= new.start {
                new.start - other.end
            } else {
                other.start.saturating_sub(new.end)
            };
            gap == 0 || gap < threshold
        });
        if near {
            0.0
        } else {
            -1.0
        }
    }
}

/// Penalizes stacking one subject's sessions on the same day.
///
/// Rating = minus the number of the subject's sessions already on that day.
#[derive(Debug, Clone, Copy)]
pub struct SubjectSpread;

impl Preference for SubjectSpread {
    fn name(&self) -> &'static str {
        "SUBJECT_SPREAD"
    }

    fn evaluate(&self, candidate: &Candidate<'_>, context: &ScoreContext<'_>) -> f64 {
        let same_day = context
            .schedule
            .iter()
            .filter(|e| e.subject == candidate.subject.code)
            .filter_map(|e| context.registry.slots.find(&e.slot))
            .filter(|s| s.day == candidate.slot.day)
            .count();
        -(same_day as f64)
    }
}

/// Prefers the room closest to the expected enrolment.
///
/// Rating = minus the unused seat fraction; 0 when enrolment is unknown.
#[derive(Debug, Clone, Copy)]
pub struct RoomFit;

impl Preference for RoomFit {
    fn name(&self) -> &'static str {
        "ROOM_FIT"
    }

    fn evaluate(&self, candidate: &Candidate<'_>, _context: &ScoreContext<'_>) -> f64 {
        let capacity = candidate.classroom.capacity;
        match candidate.subject.expected_students {
            Some(expected) if capacity > 0 => {
                -(f64::from(capacity.saturating_sub(expected)) / f64::from(capacity))
            }
            _ => 0.0,
        }
    }
}

#[derive(Clone)]
struct WeightedPreference {
    preference: Arc<dyn Preference>,
    weight: f64,
}

/// Weighted set of preferences.
#[derive(Clone, Default)]
pub struct Preferences {
    entries: Vec<WeightedPreference>,
}

impl Preferences {
    /// Creates an empty set (every candidate scores 0).
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in preferences with the given weights.
    pub fn from_weights(weights: &ScoringWeights) -> Self {
        Self::new()
            .with(MorningSlot, weights.morning)
            .with(WorkloadBalance, weights.workload_balance)
            .with(Fragmentation, weights.fragmentation)
            .with(SubjectSpread, weights.subject_spread)
            .with(RoomFit, weights.room_fit)
    }

    /// Adds a weighted preference.
    pub fn with<P: Preference + 'static>(mut self, preference: P, weight: f64) -> Self {
        self.entries.push(WeightedPreference {
            preference: Arc::new(preference),
            weight,
        });
        self
    }

    /// Weighted sum of every preference.
    pub fn score(&self, candidate: &Candidate<'_>, context: &ScoreContext<'_>) -> f64 {
        self.entries
            .iter()
            .filter(|wp| wp.weight != 0.0)
            .map(|wp| wp.preference.evaluate(candidate, context) * wp.weight)
            .sum()
    }

    /// Weighted rating per preference, in insertion order.
    pub fn breakdown(
        &self,
        candidate: &Candidate<'_>,
        context: &ScoreContext<'_>,
    ) -> Vec<(&'static str, f64)> {
        self.entries
            .iter()
            .map(|wp| {
                (
                    wp.preference.name(),
                    wp.preference.evaluate(candidate, context) * wp.weight,
                )
            })
            .collect()
    }

    /// Number of preferences.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Debug for Preferences {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Preferences")
            .field(
                "entries",
                &self
                    .entries
                    .iter()
                    .map(|wp| format!("{}(w={})", wp.preference.name(), wp.weight))
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Classroom, RoomType, Subject, Teacher};

    struct Fixture {
        registry: Registry,
        config: SchedulingConfig,
    }

    impl Fixture {
        fn new() -> Self {
            let config = SchedulingConfig::default();
            let mut registry = Registry::with_slots_from(&config).unwrap();
            registry
                .add_subject(Subject::new("MATH", "Math").with_expected_students(15))
                .unwrap();
            registry
                .add_teacher(Teacher::new("T1", "A").qualified_for("MATH"))
                .unwrap();
            registry
                .add_teacher(Teacher::new("T2", "B").qualified_for("MATH"))
                .unwrap();
            registry
                .add_classroom(Classroom::new("R1", 60, RoomType::Classroom))
                .unwrap();
            Self { registry, config }
        }

        fn candidate(&self, teacher: &str, slot: u32) -> Candidate<'_> {
            Candidate::new(
                self.registry.subject("MATH").unwrap(),
                self.registry.teacher(teacher).unwrap(),
                self.registry.classroom("R1").unwrap(),
                self.registry.slot(slot).unwrap(),
            )
        }

        fn context<'a>(
            &'a self,
            schedule: &'a Schedule,
            tracker: &'a WorkloadTracker,
        ) -> ScoreContext<'a> {
            ScoreContext {
                registry: &self.registry,
                config: &self.config,
                schedule,
                tracker,
            }
        }
    }

    #[test]
    fn test_morning_slot() {
        let fx = Fixture::new();
        let (s, w) = (Schedule::new(), WorkloadTracker::new(15));
        let ctx = fx.context(&s, &w);
        // Slot 0 = Mon 09:00, slot 3 = Mon 13:00.
        assert!((MorningSlot.evaluate(&fx.candidate("T1", 0), &ctx) - 1.0).abs() < 1e-10);
        assert!(MorningSlot.evaluate(&fx.candidate("T1", 3), &ctx).abs() < 1e-10);
    }

    #[test]
    fn test_workload_balance_prefers_idle_teacher() {
        let fx = Fixture::new();
        let s = Schedule::new();
        let mut w = WorkloadTracker::new(15);
        w.commit("T1", fx.registry.slot(0).unwrap(), 120);
        let ctx = fx.context(&s, &w);

        // mean = 60 minutes
        let busy = WorkloadBalance.evaluate(&fx.candidate("T1", 7), &ctx);
        let idle = WorkloadBalance.evaluate(&fx.candidate("T2", 7), &ctx);
        assert!((busy + 1.0).abs() < 1e-10);
        assert!((idle - 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_fragmentation() {
        let fx = Fixture::new();
        let s = Schedule::new();
        let mut w = WorkloadTracker::new(15);
        let ctx = fx.context(&s, &w);
        assert!(Fragmentation.evaluate(&fx.candidate("T1", 2), &ctx).abs() < 1e-10);

        w.commit("T1", fx.registry.slot(0).unwrap(), 60);
        let ctx = fx.context(&s, &w);
        // 10:00 is adjacent, 11:00 is isolated.
        assert!(Fragmentation.evaluate(&fx.candidate("T1", 1), &ctx).abs() < 1e-10);
        assert!((Fragmentation.evaluate(&fx.candidate("T1", 2), &ctx) + 1.0).abs() < 1e-10);
        // Other day does not count.
        assert!(Fragmentation.evaluate(&fx.candidate("T1", 9), &ctx).abs() < 1e-10);
    }

    #[test]
    fn test_subject_spread() {
        let fx = Fixture::new();
        let mut s = Schedule::new();
        s.push(fx.candidate("T1", 0).to_entry());
        s.push(fx.candidate("T2", 1).to_entry());
        let w = WorkloadTracker::new(15);
        let ctx = fx.context(&s, &w);

        assert!((SubjectSpread.evaluate(&fx.candidate("T1", 4), &ctx) + 2.0).abs() < 1e-10);
        assert!(SubjectSpread.evaluate(&fx.candidate("T1", 7), &ctx).abs() < 1e-10);
    }

    #[test]
    fn test_room_fit() {
        let fx = Fixture::new();
        let (s, w) = (Schedule::new(), WorkloadTracker::new(15));
        let ctx = fx.context(&s, &w);
        // 45 of 60 seats unused.
        assert!((RoomFit.evaluate(&fx.candidate("T1", 0), &ctx) + 0.75).abs() < 1e-10);
    }

    #[test]
    fn test_weighted_sum_and_breakdown() {
        let fx = Fixture::new();
        let (s, w) = (Schedule::new(), WorkloadTracker::new(15));
        let ctx = fx.context(&s, &w);
        let prefs = Preferences::from_weights(&fx.config.weights);
        assert_eq!(prefs.len(), 5);

        // morning 10 + room_fit 2 * -0.75
        let c = fx.candidate("T1", 0);
        assert!((prefs.score(&c, &ctx) - 8.5).abs() < 1e-10);

        let parts = prefs.breakdown(&c, &ctx);
        assert_eq!(parts[0].0, "MORNING");
        let total: f64 = parts.iter().map(|p| p.1).sum();
        assert!((total - 8.5).abs() < 1e-10);

        assert!(Preferences::new().score(&c, &ctx).abs() < 1e-10);
    }
}
