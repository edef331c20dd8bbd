//! Built-in subject ordering rules.
//!
//! # Categories
//!
//! - **Importance**: PRIORITY
//! - **Size**: LONGEST, MOST_REMAINING
//! - **Scarcity**: FEWEST_TEACHERS, FEWEST_ROOMS, LAB_FIRST
//!
//! # Score Convention
//! All rules return lower scores for subjects to place first.

use super::{RuleScore, SchedulingContext, SubjectRule};
use crate::models::{Subject, SubjectCategory};

// ======================== Importance ========================

/// Highest priority first.
#[derive(Debug, Clone, Copy)]
pub struct HighestPriority;

impl SubjectRule for HighestPriority {
    fn name(&self) -> &'static str {
        "PRIORITY"
    }

    fn evaluate(&self, subject: &Subject, _context: &SchedulingContext) -> RuleScore {
        -f64::from(subject.priority.rank())
    }

    fn description(&self) -> &'static str {
        "Highest Priority First"
    }
}

// ======================== Size ========================

/// Longest session first.
///
/// Long sessions fit fewer slots, so they are placed while the week is
/// still empty.
#[derive(Debug, Clone, Copy)]
pub struct LongestSession;

impl SubjectRule for LongestSession {
    fn name(&self) -> &'static str {
        "LONGEST"
    }

    fn evaluate(&self, subject: &Subject, _context: &SchedulingContext) -> RuleScore {
        -f64::from(subject.duration_minutes)
    }

    fn description(&self) -> &'static str {
        "Longest Session First"
    }
}

/// Most sessions still to place first.
///
/// Uses `context.remaining_sessions` if available, falls back to the
/// weekly requirement.
#[derive(Debug, Clone, Copy)]
pub struct MostRemaining;

impl SubjectRule for MostRemaining {
    fn name(&self) -> &'static str {
        "MOST_REMAINING"
    }

    fn evaluate(&self, subject: &Subject, context: &SchedulingContext) -> RuleScore {
        let remaining = context
            .remaining_sessions
            .get(&subject.code)
            .copied()
            .unwrap_or(subject.sessions_per_week);
        -f64::from(remaining)
    }

    fn description(&self) -> &'static str {
        "Most Sessions Remaining"
    }
}

// ======================== Scarcity ========================

/// Fewest qualified teachers first.
///
/// Subjects without a count in the context are ranked last.
#[derive(Debug, Clone, Copy)]
pub struct FewestTeachers;

impl SubjectRule for FewestTeachers {
    fn name(&self) -> &'static str {
        "FEWEST_TEACHERS"
    }

    fn evaluate(&self, subject: &Subject, context: &SchedulingContext) -> RuleScore {
        context
            .qualified_teachers
            .get(&subject.code)
            .map_or(f64::MAX, |&n| n as f64)
    }

    fn description(&self) -> &'static str {
        "Fewest Qualified Teachers"
    }
}

/// Fewest compatible classrooms first.
#[derive(Debug, Clone, Copy)]
pub struct FewestRooms;

impl SubjectRule for FewestRooms {
    fn name(&self) -> &'static str {
        "FEWEST_ROOMS"
    }

    fn evaluate(&self, subject: &Subject, context: &SchedulingContext) -> RuleScore {
        context
            .compatible_classrooms
            .get(&subject.code)
            .map_or(f64::MAX, |&n| n as f64)
    }

    fn description(&self) -> &'static str {
        "Fewest Compatible Classrooms"
    }
}

/// Lab and workshop subjects first (they need specialised rooms).
#[derive(Debug, Clone, Copy)]
pub struct LabFirst;

impl SubjectRule for LabFirst {
    fn name(&self) -> &'static str {
        "LAB_FIRST"
    }

    fn evaluate(&self, subject: &Subject, _context: &SchedulingContext) -> RuleScore {
        match subject.category {
            SubjectCategory::Lab | SubjectCategory::Workshop => 0.0,
            _ => 1.0,
        }
    }

    fn description(&self) -> &'static str {
        "Specialised Rooms First"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Priority;

    #[test]
    fn test_highest_priority() {
        let ctx = SchedulingContext::new();
        let high = Subject::new("A", "A").with_priority(Priority::High);
        let low = Subject::new("B", "B").with_priority(Priority::Low);
        assert!(HighestPriority.evaluate(&high, &ctx) < HighestPriority.evaluate(&low, &ctx));
    }

    #[test]
    fn test_longest_session() {
        let ctx = SchedulingContext::new();
        let long = Subject::new("A", "A").with_duration(120);
        let short = Subject::new("B", "B").with_duration(45);
        assert!(LongestSession.evaluate(&long, &ctx) < LongestSession.evaluate(&short, &ctx));
    }

    #[test]
    fn test_most_remaining_fallback() {
        let ctx = SchedulingContext::new();
        let s = Subject::new("A", "A").with_sessions(3);
        assert!((MostRemaining.evaluate(&s, &ctx) + 3.0).abs() < 1e-10);

        let ctx = ctx.with_remaining("A", 1);
        assert!((MostRemaining.evaluate(&s, &ctx) + 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_fewest_teachers() {
        let ctx = SchedulingContext::new()
            .with_qualified_teachers("RARE", 1)
            .with_qualified_teachers("COMMON", 5);
        let rare = Subject::new("RARE", "Rare");
        let common = Subject::new("COMMON", "Common");
        let unknown = Subject::new("X", "X");
        assert!(FewestTeachers.evaluate(&rare, &ctx) < FewestTeachers.evaluate(&common, &ctx));
        assert!(FewestTeachers.evaluate(&common, &ctx) < FewestTeachers.evaluate(&unknown, &ctx));
    }

    #[test]
    fn test_fewest_rooms() {
        let ctx = SchedulingContext::new()
            .with_compatible_classrooms("LAB", 1)
            .with_compatible_classrooms("LEC", 4);
        assert!(
            FewestRooms.evaluate(&Subject::new("LAB", "L"), &ctx)
                < FewestRooms.evaluate(&Subject::new("LEC", "L"), &ctx)
        );
    }

    #[test]
    fn test_lab_first() {
        let ctx = SchedulingContext::new();
        let lab = Subject::new("A", "A").with_category(SubjectCategory::Workshop);
        let lecture = Subject::new("B", "B");
        assert!(LabFirst.evaluate(&lab, &ctx) < LabFirst.evaluate(&lecture, &ctx));
    }
}
