//! Timetable aggregate.
//!
//! `TimeTable` owns the registry, the configuration and the current
//! schedule. Every change goes through the conflict validator first and is
//! applied only if the resulting schedule is clean, so readers never see a
//! schedule that breaks a hard constraint.
//!
//! The unscheduled report is derived from the schedule: a subject's
//! shortfall is its weekly requirement minus its placed sessions. Adding a
//! session consumes the shortfall, removing one adds to it, and a session
//! beyond the requirement is rejected as a count mismatch.

use tracing::{info, warn};

use crate::config::SchedulingConfig;
use crate::dispatching::RuleEngine;
use crate::error::{EntityKind, Result, TimetableError};
use crate::evaluator::Candidate;
use crate::models::{Conflict, Day, Schedule, ScheduleEntry, SlotId, UnscheduledSession};
use crate::registry::Registry;
use crate::scheduler::{AssignmentEngine, Suggestion, TimetableKpi};
use crate::validation::{check_registry, validate};

/// Outcome of a change to the timetable.
#[derive(Debug, Clone, PartialEq)]
pub enum EditOutcome {
    /// The change was applied.
    Applied,
    /// The change would break the timetable and was discarded.
    Rejected(Vec<Conflict>),
}

impl EditOutcome {
    /// Whether the change was applied.
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied)
    }
}

/// A named term timetable.
///
/// # Example
///
/// ```
/// use u_timetable::config::SchedulingConfig;
/// use u_timetable::models::{Classroom, RoomType, Subject, Teacher};
/// use u_timetable::timetable::TimeTable;
///
/// let mut tt = TimeTable::new("Year 9", "Autumn", SchedulingConfig::default()).unwrap();
/// tt.registry_mut().add_subject(Subject::new("MATH", "Math").with_sessions(3)).unwrap();
/// tt.registry_mut().add_teacher(Teacher::new("T1", "Ada").qualified_for("MATH")).unwrap();
/// tt.registry_mut().add_classroom(Classroom::new("R1", 30, RoomType::Classroom)).unwrap();
///
/// assert!(tt.generate().unwrap().is_applied());
/// assert_eq!(tt.schedule().len(), 3);
/// assert!(tt.unscheduled().is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct TimeTable {
    name: String,
    term: String,
    registry: Registry,
    engine: AssignmentEngine,
    schedule: Schedule,
}

impl TimeTable {
    /// Creates an empty timetable whose slots are generated from `config`.
    ///
    /// # Errors
    /// `InfeasibleConfiguration` if the configuration is self-contradictory.
    pub fn new(
        name: impl Into<String>,
        term: impl Into<String>,
        config: SchedulingConfig,
    ) -> Result<Self> {
        let registry = Registry::with_slots_from(&config)?;
        Ok(Self {
            name: name.into(),
            term: term.into(),
            registry,
            engine: AssignmentEngine::new(config),
            schedule: Schedule::new(),
        })
    }

    /// Replaces the subject ordering used by [`generate`](Self::generate).
    pub fn with_rule_engine(mut self, rule_engine: RuleEngine) -> Self {
        self.engine = self.engine.with_rule_engine(rule_engine);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn term(&self) -> &str {
        &self.term
    }

    pub fn config(&self) -> &SchedulingConfig {
        self.engine.config()
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Mutable registry access, for adding entities.
    ///
    /// Use the `remove_*` methods to remove entities so the schedule
    /// follows.
    pub fn registry_mut(&mut self) -> &mut Registry {
        &mut self.registry
    }

    /// Current schedule.
    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    /// Required sessions not in the schedule, in registry order.
    pub fn unscheduled(&self) -> Vec<UnscheduledSession> {
        shortfall(&self.schedule, &self.registry)
    }

    /// Conflicts in the current schedule.
    ///
    /// Empty unless entities were changed in place through
    /// [`registry_mut`](Self::registry_mut).
    pub fn conflicts(&self) -> Vec<Conflict> {
        validate(
            &self.schedule,
            &self.registry,
            self.config(),
            &self.unscheduled(),
        )
    }

    /// Generates a fresh schedule and swaps it in if it validates.
    ///
    /// Input issues are logged as warnings and do not stop generation.
    ///
    /// # Errors
    /// `InfeasibleConfiguration` if the configuration is self-contradictory.
    pub fn generate(&mut self) -> Result<EditOutcome> {
        let issues = check_registry(&self.registry, self.config());
        let result = self.engine.generate(&self.registry)?;

        let conflicts = validate(
            &result.schedule,
            &self.registry,
            self.config(),
            &result.unscheduled,
        );
        if !conflicts.is_empty() {
            warn!(
                event = "edit_rejected",
                edit = "generate",
                timetable = %self.name,
                conflicts = conflicts.len()
            );
            return Ok(EditOutcome::Rejected(conflicts));
        }

        info!(
            event = "timetable_generated",
            timetable = %self.name,
            term = %self.term,
            input_issues = issues.len(),
            entries = result.schedule.len(),
            missing = result.missing_sessions(),
            repairs = result.repairs
        );
        self.schedule = result.schedule;
        Ok(EditOutcome::Applied)
    }

    /// Adds a session by hand.
    ///
    /// # Errors
    /// `NotFound` if the entry names an unknown subject, teacher, classroom
    /// or slot.
    pub fn add_entry(&mut self, entry: ScheduleEntry) -> Result<EditOutcome> {
        Candidate::resolve(&self.registry, &entry)?;
        let mut next = self.schedule.clone();
        next.push(entry);
        Ok(self.apply("add", next))
    }

    /// Removes the session at `index`.
    ///
    /// # Errors
    /// `NotFound` if `index` is out of range.
    pub fn remove_entry(&mut self, index: usize) -> Result<EditOutcome> {
        let mut next = self.schedule.clone();
        if next.remove(index).is_none() {
            return Err(TimetableError::not_found(EntityKind::Entry, index));
        }
        Ok(self.apply("remove", next))
    }

    /// Moves the session at `index` to another slot, keeping its teacher
    /// and classroom.
    ///
    /// # Errors
    /// `NotFound` if `index` is out of range or `slot` is unknown.
    pub fn reschedule_entry(&mut self, index: usize, slot: SlotId) -> Result<EditOutcome> {
        self.registry.slot(slot)?;
        let mut next = self.schedule.clone();
        let Some(entry) = next.entries.get_mut(index) else {
            return Err(TimetableError::not_found(EntityKind::Entry, index));
        };
        entry.slot = slot;
        Ok(self.apply("reschedule", next))
    }

    fn apply(&mut self, edit: &'static str, next: Schedule) -> EditOutcome {
        let missing = shortfall(&next, &self.registry);
        let conflicts = validate(&next, &self.registry, self.config(), &missing);
        if conflicts.is_empty() {
            self.schedule = next;
            EditOutcome::Applied
        } else {
            warn!(
                event = "edit_rejected",
                edit,
                timetable = %self.name,
                conflicts = conflicts.len(),
                first = %conflicts[0].message
            );
            EditOutcome::Rejected(conflicts)
        }
    }

    /// Removes a subject and every session of it.
    ///
    /// Returns the dropped entries.
    ///
    /// # Errors
    /// `NotFound` if the subject is unknown; nothing changes.
    pub fn remove_subject(&mut self, code: &str) -> Result<Vec<ScheduleEntry>> {
        let subject = self.registry.remove_subject(code)?;
        Ok(self.drop_entries(EntityKind::Subject, &subject.code, |e| {
            e.subject == subject.code
        }))
    }

    /// Removes a teacher and every session they teach.
    ///
    /// # Errors
    /// `NotFound` if the teacher is unknown; nothing changes.
    pub fn remove_teacher(&mut self, code: &str) -> Result<Vec<ScheduleEntry>> {
        let teacher = self.registry.remove_teacher(code)?;
        Ok(self.drop_entries(EntityKind::Teacher, &teacher.employee_code, |e| {
            e.teacher == teacher.employee_code
        }))
    }

    /// Removes a classroom and every session held in it.
    ///
    /// # Errors
    /// `NotFound` if the classroom is unknown; nothing changes.
    pub fn remove_classroom(&mut self, number: &str) -> Result<Vec<ScheduleEntry>> {
        let classroom = self.registry.remove_classroom(number)?;
        Ok(self.drop_entries(EntityKind::Classroom, &classroom.room_number, |e| {
            e.classroom == classroom.room_number
        }))
    }

    fn drop_entries(
        &mut self,
        kind: EntityKind,
        id: &str,
        matches: impl Fn(&ScheduleEntry) -> bool,
    ) -> Vec<ScheduleEntry> {
        let (dropped, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.schedule.entries)
            .into_iter()
            .partition(|e| matches(e));
        self.schedule.entries = kept;
        info!(
            event = "entity_removed",
            timetable = %self.name,
            kind = %kind,
            id,
            dropped_entries = dropped.len()
        );
        dropped
    }

    /// Removes every session. All requirements become unscheduled.
    pub fn clear_schedule(&mut self) {
        info!(
            event = "schedule_cleared",
            timetable = %self.name,
            entries = self.schedule.len()
        );
        self.schedule.clear();
    }

    /// Entries held on a day, in schedule order.
    pub fn entries_on(&self, day: Day) -> Vec<&ScheduleEntry> {
        self.schedule
            .iter()
            .filter(|e| self.registry.slots.find(&e.slot).is_some_and(|s| s.day == day))
            .collect()
    }

    /// Entries taught by a teacher.
    pub fn entries_for_teacher(&self, teacher: &str) -> Vec<&ScheduleEntry> {
        self.schedule.entries_for_teacher(&teacher.to_uppercase())
    }

    /// Entries held in a classroom.
    pub fn entries_for_classroom(&self, classroom: &str) -> Vec<&ScheduleEntry> {
        self.schedule
            .entries_for_classroom(&classroom.to_uppercase())
    }

    /// Entries of a subject.
    pub fn entries_for_subject(&self, subject: &str) -> Vec<&ScheduleEntry> {
        self.schedule.entries_for_subject(&subject.to_uppercase())
    }

    /// Best placements for one more session of `subject`, highest score
    /// first.
    ///
    /// # Errors
    /// `NotFound` if the subject is unknown.
    pub fn suggestions(&self, subject: &str, limit: usize) -> Result<Vec<Suggestion>> {
        self.engine
            .suggest(&self.registry, &self.schedule, subject, limit)
    }

    /// Quality indicators of the current schedule.
    pub fn kpi(&self) -> TimetableKpi {
        TimetableKpi::calculate(&self.schedule, &self.registry)
    }
}

/// Per-subject shortfall of a schedule, skipping subjects that are met.
fn shortfall(schedule: &Schedule, registry: &Registry) -> Vec<UnscheduledSession> {
    registry
        .subjects
        .list()
        .filter_map(|subject| {
            let placed = schedule.sessions_of(&subject.code) as u32;
            let missing = subject.sessions_per_week.saturating_sub(placed);
            (missing > 0).then(|| UnscheduledSession::new(subject.code.clone(), missing))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Classroom, ConflictKind, RoomType, Subject, Teacher};

    fn timetable() -> TimeTable {
        let mut tt = TimeTable::new("9A", "2025-S1", SchedulingConfig::default()).unwrap();
        let r = tt.registry_mut();
        r.add_subject(Subject::new("MATH", "Math").with_sessions(3))
            .unwrap();
        r.add_subject(Subject::new("ART", "Art").with_sessions(1))
            .unwrap();
        r.add_teacher(Teacher::new("T1", "Ada").qualified_for("MATH"))
            .unwrap();
        r.add_teacher(Teacher::new("T2", "Bob").qualified_for("ART"))
            .unwrap();
        r.add_classroom(Classroom::new("R1", 30, RoomType::Classroom))
            .unwrap();
        r.add_classroom(Classroom::new("R2", 30, RoomType::Classroom))
            .unwrap();
        tt
    }

    fn missing(tt: &TimeTable, subject: &str) -> u32 {
        tt.unscheduled()
            .iter()
            .find(|u| u.subject == subject)
            .map_or(0, |u| u.missing)
    }

    #[test]
    fn test_new_rejects_infeasible_config() {
        let config = SchedulingConfig::default().with_max_consecutive_hours(0);
        let err = TimeTable::new("9A", "T1", config).unwrap_err();
        assert!(matches!(err, TimetableError::InfeasibleConfiguration { .. }));
    }

    #[test]
    fn test_generate_swaps_in_schedule() {
        let mut tt = timetable();
        assert_eq!(tt.unscheduled().len(), 2);

        assert_eq!(tt.generate().unwrap(), EditOutcome::Applied);
        assert_eq!(tt.schedule().len(), 4);
        assert!(tt.unscheduled().is_empty());
        assert!(tt.conflicts().is_empty());
        assert_eq!(tt.entries_for_subject("math").len(), 3);
        assert_eq!(tt.entries_for_teacher("t2").len(), 1);
        assert_eq!(tt.name(), "9A");
        assert_eq!(tt.term(), "2025-S1");
    }

    #[test]
    fn test_generate_reports_shortfall() {
        let mut tt = timetable();
        tt.registry_mut()
            .add_subject(Subject::new("BIO", "Biology").with_sessions(2))
            .unwrap();
        assert!(tt.generate().unwrap().is_applied());
        assert_eq!(missing(&tt, "BIO"), 2);
        assert_eq!(missing(&tt, "MATH"), 0);
        assert!(tt.conflicts().is_empty());
    }

    #[test]
    fn test_add_entry_consumes_shortfall() {
        let mut tt = timetable();
        let outcome = tt
            .add_entry(ScheduleEntry::new("MATH", "T1", "R1", 0))
            .unwrap();
        assert!(outcome.is_applied());
        assert_eq!(missing(&tt, "MATH"), 2);
        assert_eq!(missing(&tt, "ART"), 1);
    }

    #[test]
    fn test_add_entry_rejects_double_booking() {
        let mut tt = timetable();
        tt.add_entry(ScheduleEntry::new("MATH", "T1", "R1", 0))
            .unwrap();
        let outcome = tt
            .add_entry(ScheduleEntry::new("ART", "T2", "R1", 0))
            .unwrap();
        let EditOutcome::Rejected(conflicts) = outcome else {
            panic!("expected rejection");
        };
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].kind, ConflictKind::ClassroomDoubleBooked);
        assert_eq!(tt.schedule().len(), 1);
    }

    #[test]
    fn test_add_entry_beyond_requirement() {
        let mut tt = timetable();
        for slot in [0, 7, 14] {
            let outcome = tt
                .add_entry(ScheduleEntry::new("MATH", "T1", "R1", slot))
                .unwrap();
            assert!(outcome.is_applied());
        }
        let EditOutcome::Rejected(conflicts) = tt
            .add_entry(ScheduleEntry::new("MATH", "T1", "R1", 21))
            .unwrap()
        else {
            panic!("expected rejection");
        };
        assert_eq!(conflicts[0].kind, ConflictKind::SessionCountMismatch);
        assert_eq!(tt.schedule().len(), 3);
    }

    #[test]
    fn test_add_entry_unknown_reference() {
        let mut tt = timetable();
        let err = tt
            .add_entry(ScheduleEntry::new("MATH", "T9", "R1", 0))
            .unwrap_err();
        assert_eq!(
            err,
            TimetableError::NotFound {
                kind: EntityKind::Teacher,
                id: "T9".into()
            }
        );
    }

    #[test]
    fn test_remove_entry() {
        let mut tt = timetable();
        tt.generate().unwrap();
        let subject = tt.schedule().entries[0].subject.clone();
        assert!(tt.remove_entry(0).unwrap().is_applied());
        assert_eq!(missing(&tt, &subject), 1);
        assert_eq!(tt.schedule().len(), 3);

        let err = tt.remove_entry(10).unwrap_err();
        assert!(matches!(
            err,
            TimetableError::NotFound {
                kind: EntityKind::Entry,
                ..
            }
        ));
    }

    #[test]
    fn test_reschedule_entry() {
        let mut tt = timetable();
        tt.add_entry(ScheduleEntry::new("MATH", "T1", "R1", 0))
            .unwrap();
        tt.add_entry(ScheduleEntry::new("ART", "T2", "R1", 1))
            .unwrap();

        assert!(tt.reschedule_entry(1, 2).unwrap().is_applied());
        assert_eq!(tt.schedule().entries[1].slot, 2);

        let EditOutcome::Rejected(conflicts) = tt.reschedule_entry(1, 0).unwrap() else {
            panic!("expected rejection");
        };
        assert_eq!(conflicts[0].kind, ConflictKind::ClassroomDoubleBooked);
        assert_eq!(tt.schedule().entries[1].slot, 2);

        assert!(tt.reschedule_entry(1, 999).is_err());
        assert!(tt.reschedule_entry(5, 3).is_err());
    }

    #[test]
    fn test_remove_entities_cascade() {
        let mut tt = timetable();
        tt.add_entry(ScheduleEntry::new("MATH", "T1", "R1", 0))
            .unwrap();
        tt.add_entry(ScheduleEntry::new("MATH", "T1", "R2", 7))
            .unwrap();
        tt.add_entry(ScheduleEntry::new("ART", "T2", "R2", 0))
            .unwrap();

        let dropped = tt.remove_classroom("r2").unwrap();
        assert_eq!(dropped.len(), 2);
        assert_eq!(tt.schedule().len(), 1);
        assert!(tt.registry().classroom("R2").is_err());
        assert!(tt.conflicts().is_empty());

        let dropped = tt.remove_teacher("T1").unwrap();
        assert_eq!(dropped, vec![ScheduleEntry::new("MATH", "T1", "R1", 0)]);
        assert!(tt.schedule().is_empty());
        assert_eq!(missing(&tt, "MATH"), 3);

        tt.add_entry(ScheduleEntry::new("ART", "T2", "R1", 3))
            .unwrap();
        assert_eq!(tt.remove_subject("art").unwrap().len(), 1);
        assert!(tt.schedule().is_empty());
        let codes: Vec<String> = tt.unscheduled().into_iter().map(|u| u.subject).collect();
        assert_eq!(codes, vec!["MATH".to_string()]);
        assert!(tt.conflicts().is_empty());
    }

    #[test]
    fn test_remove_unknown_entity() {
        let mut tt = timetable();
        tt.add_entry(ScheduleEntry::new("MATH", "T1", "R1", 0))
            .unwrap();
        let err = tt.remove_subject("GHOST").unwrap_err();
        assert_eq!(
            err,
            TimetableError::NotFound {
                kind: EntityKind::Subject,
                id: "GHOST".into()
            }
        );
        assert_eq!(tt.schedule().len(), 1);
        assert!(tt.remove_teacher("T9").is_err());
        assert!(tt.remove_classroom("R9").is_err());
    }

    #[test]
    fn test_clear_schedule() {
        let mut tt = timetable();
        tt.generate().unwrap();
        assert!(!tt.schedule().is_empty());
        tt.clear_schedule();
        assert!(tt.schedule().is_empty());
        assert_eq!(missing(&tt, "MATH"), 3);
        assert_eq!(missing(&tt, "ART"), 1);
        assert!(tt.conflicts().is_empty());
    }

    #[test]
    fn test_entries_on_day() {
        let mut tt = timetable();
        tt.add_entry(ScheduleEntry::new("MATH", "T1", "R1", 0))
            .unwrap();
        tt.add_entry(ScheduleEntry::new("MATH", "T1", "R1", 7))
            .unwrap();
        assert_eq!(tt.entries_on(Day::Monday).len(), 1);
        assert_eq!(tt.entries_on(Day::Tuesday).len(), 1);
        assert!(tt.entries_on(Day::Friday).is_empty());
        assert_eq!(tt.entries_for_classroom("r1").len(), 2);
    }

    #[test]
    fn test_suggestions_and_kpi() {
        let mut tt = timetable();
        tt.add_entry(ScheduleEntry::new("MATH", "T1", "R1", 0))
            .unwrap();

        let suggestions = tt.suggestions("MATH", 3).unwrap();
        assert_eq!(suggestions.len(), 3);
        assert!(suggestions.iter().all(|s| s.entry.teacher == "T1"));
        assert!(suggestions.iter().all(|s| s.entry.slot != 0));
        assert!(suggestions[0].score >= suggestions[2].score);
        assert!(tt.suggestions("GHOST", 3).is_err());

        let kpi = tt.kpi();
        assert_eq!(kpi.placed_sessions, 1);
        assert_eq!(kpi.required_sessions, 4);
        assert!((kpi.success_rate - 25.0).abs() < 1e-10);
    }
}
