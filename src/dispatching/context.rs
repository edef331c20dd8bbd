//! Placement state passed to ordering rules.

use std::collections::HashMap;

use crate::models::Schedule;
use crate::registry::Registry;

/// Placement state visible to ordering rules.
///
/// Rules fall back to the subject's own data when an entry is missing.
#[derive(Debug, Clone, Default)]
pub struct SchedulingContext {
    /// Sessions still to place (subject code → count).
    pub remaining_sessions: HashMap<String, u32>,
    /// Qualified teachers (subject code → count).
    pub qualified_teachers: HashMap<String, usize>,
    /// Compatible classrooms (subject code → count).
    pub compatible_classrooms: HashMap<String, usize>,
}

impl SchedulingContext {
    /// Creates an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Derives the context for a registry and the sessions already placed.
    pub fn from_registry(registry: &Registry, schedule: &Schedule) -> Self {
        let mut context = Self::new();
        for subject in registry.subjects.list() {
            let placed = schedule.sessions_of(&subject.code) as u32;
            context.remaining_sessions.insert(
                subject.code.clone(),
                subject.sessions_per_week.saturating_sub(placed),
            );
            context.qualified_teachers.insert(
                subject.code.clone(),
                registry.qualified_teachers(subject).count(),
            );
            context.compatible_classrooms.insert(
                subject.code.clone(),
                registry.compatible_classrooms(subject).count(),
            );
        }
        context
    }

    /// Sets remaining sessions for a subject.
    pub fn with_remaining(mut self, subject: impl Into<String>, sessions: u32) -> Self {
        self.remaining_sessions.insert(subject.into(), sessions);
        self
    }

    /// Sets the qualified-teacher count for a subject.
    pub fn with_qualified_teachers(mut self, subject: impl Into<String>, count: usize) -> Self {
        self.qualified_teachers.insert(subject.into(), count);
        self
    }

    /// Sets the compatible-classroom count for a subject.
    pub fn with_compatible_classrooms(mut self, subject: impl Into<String>, count: usize) -> Self {
        self.compatible_classrooms.insert(subject.into(), count);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Classroom, RoomType, ScheduleEntry, Subject, Teacher};

    #[test]
    fn test_from_registry() {
        let mut r = Registry::new();
        r.add_subject(Subject::new("MATH", "Math").with_sessions(3))
            .unwrap();
        r.add_subject(Subject::new("ART", "Art")).unwrap();
        r.add_teacher(Teacher::new("T1", "A").qualified_for("MATH"))
            .unwrap();
        r.add_classroom(Classroom::new("R1", 30, RoomType::Classroom))
            .unwrap();

        let mut s = Schedule::new();
        s.push(ScheduleEntry::new("MATH", "T1", "R1", 0));

        let ctx = SchedulingContext::from_registry(&r, &s);
        assert_eq!(ctx.remaining_sessions["MATH"], 2);
        assert_eq!(ctx.remaining_sessions["ART"], 1);
        assert_eq!(ctx.qualified_teachers["MATH"], 1);
        assert_eq!(ctx.qualified_teachers["ART"], 0);
        assert_eq!(ctx.compatible_classrooms["ART"], 1);
    }
}
