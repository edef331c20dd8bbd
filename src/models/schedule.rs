//! Schedule (solution) model.
//!
//! A schedule is an ordered list of (subject, teacher, classroom, slot)
//! entries. Insertion order carries no meaning but is preserved so that
//! output is stable. Sessions the engine could not place are reported
//! separately as [`UnscheduledSession`]s, and invariant breaches found by
//! the validator as [`Conflict`]s.

use serde::{Deserialize, Deserializer, Serialize};

use super::SlotId;

/// One scheduled session.
///
/// Identifiers are upper case whether the entry is built with
/// [`ScheduleEntry::new`] or deserialized.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScheduleEntry {
    /// Subject code.
    #[serde(deserialize_with = "upper_case")]
    pub subject: String,
    /// Teacher employee code.
    #[serde(deserialize_with = "upper_case")]
    pub teacher: String,
    /// Classroom room number.
    #[serde(deserialize_with = "upper_case")]
    pub classroom: String,
    /// Time slot id.
    pub slot: SlotId,
}

impl ScheduleEntry {
    /// Creates a new entry. Identifiers are normalized to upper case.
    pub fn new(
        subject: impl Into<String>,
        teacher: impl Into<String>,
        classroom: impl Into<String>,
        slot: SlotId,
    ) -> Self {
        Self {
            subject: subject.into().to_uppercase(),
            teacher: teacher.into().to_uppercase(),
            classroom: classroom.into().to_uppercase(),
            slot,
        }
    }
}

fn upper_case<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    String::deserialize(d).map(|s| s.to_uppercase())
}

/// An ordered collection of schedule entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    /// Entries in insertion order.
    pub entries: Vec<ScheduleEntry>,
}

impl Schedule {
    /// Creates an empty schedule.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an entry.
    pub fn push(&mut self, entry: ScheduleEntry) {
        self.entries.push(entry);
    }

    /// Inserts an entry at a position (clamped to the end).
    pub fn insert(&mut self, index: usize, entry: ScheduleEntry) {
        let index = index.min(self.entries.len());
        self.entries.insert(index, entry);
    }

    /// Removes the entry at a position.
    pub fn remove(&mut self, index: usize) -> Option<ScheduleEntry> {
        (index < self.entries.len()).then(|| self.entries.remove(index))
    }

    /// Entry at a position.
    pub fn get(&self, index: usize) -> Option<&ScheduleEntry> {
        self.entries.get(index)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the schedule is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over entries in order.
    pub fn iter(&self) -> std::slice::Iter<'_, ScheduleEntry> {
        self.entries.iter()
    }

    /// Removes every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of sessions of a subject.
    pub fn sessions_of(&self, subject: &str) -> usize {
        self.entries.iter().filter(|e| e.subject == subject).count()
    }

    /// Entries for a subject.
    pub fn entries_for_subject(&self, subject: &str) -> Vec<&ScheduleEntry> {
        self.entries.iter().filter(|e| e.subject == subject).collect()
    }

    /// Entries for a teacher.
    pub fn entries_for_teacher(&self, teacher: &str) -> Vec<&ScheduleEntry> {
        self.entries.iter().filter(|e| e.teacher == teacher).collect()
    }

    /// Entries for a classroom.
    pub fn entries_for_classroom(&self, classroom: &str) -> Vec<&ScheduleEntry> {
        self.entries
            .iter()
            .filter(|e| e.classroom == classroom)
            .collect()
    }

    /// Entries in a slot.
    pub fn entries_in_slot(&self, slot: SlotId) -> Vec<&ScheduleEntry> {
        self.entries.iter().filter(|e| e.slot == slot).collect()
    }
}

impl<'a> IntoIterator for &'a Schedule {
    type Item = &'a ScheduleEntry;
    type IntoIter = std::slice::Iter<'a, ScheduleEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Required sessions of a subject the engine could not place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnscheduledSession {
    /// Subject code.
    pub subject: String,
    /// Number of sessions still missing.
    pub missing: u32,
}

impl UnscheduledSession {
    /// Creates a new report line.
    pub fn new(subject: impl Into<String>, missing: u32) -> Self {
        Self {
            subject: subject.into(),
            missing,
        }
    }
}

/// Schedule invariant that a conflict breaches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConflictKind {
    /// Teacher booked twice in overlapping slots.
    TeacherDoubleBooked,
    /// Classroom booked twice in overlapping slots.
    ClassroomDoubleBooked,
    /// Teacher not qualified for the subject.
    UnqualifiedTeacher,
    /// Room type, capacity or features do not suit the subject.
    RoomMismatch,
    /// Slot length does not fit the session length.
    DurationMismatch,
    /// Scheduled + reported-unscheduled sessions differ from the requirement.
    SessionCountMismatch,
    /// Teacher's weekly load above the cap.
    WeeklyHoursExceeded,
    /// Teacher's consecutive run above the cap.
    ConsecutiveHoursExceeded,
    /// Teacher or classroom booked outside its availability.
    ResourceUnavailable,
    /// Entry references an unknown subject, teacher, classroom or slot.
    UnknownReference,
}

/// A detected invariant violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conflict {
    /// Violated invariant.
    pub kind: ConflictKind,
    /// Positions of the offending entries in the schedule.
    pub entries: Vec<usize>,
    /// Main entity involved (subject, teacher or classroom id).
    pub entity_id: String,
    /// Human-readable description.
    pub message: String,
}

impl Conflict {
    /// Creates a conflict.
    pub fn new(
        kind: ConflictKind,
        entries: Vec<usize>,
        entity_id: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            entries,
            entity_id: entity_id.into(),
            message: message.into(),
        }
    }

    /// Whether the conflict names a given entry position.
    pub fn involves(&self, index: usize) -> bool {
        self.entries.contains(&index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_schedule() -> Schedule {
        let mut s = Schedule::new();
        s.push(ScheduleEntry::new("math", "t1", "r1", 0));
        s.push(ScheduleEntry::new("MATH", "T1", "R2", 1));
        s.push(ScheduleEntry::new("PHY", "T2", "R1", 1));
        s
    }

    #[test]
    fn test_entry_normalizes_ids() {
        let e = ScheduleEntry::new("math", "t1", "r-1", 3);
        assert_eq!(e.subject, "MATH");
        assert_eq!(e.teacher, "T1");
        assert_eq!(e.classroom, "R-1");
    }

    #[test]
    fn test_deserialized_entry_normalizes_ids() {
        let e: ScheduleEntry = serde_json::from_str(
            r#"{"subject":"math","teacher":"t1","classroom":"r-1","slot":3}"#,
        )
        .unwrap();
        assert_eq!(e, ScheduleEntry::new("MATH", "T1", "R-1", 3));

        let s: Schedule = serde_json::from_str(
            r#"{"entries":[{"subject":"phy","teacher":"T2","classroom":"r1","slot":0}]}"#,
        )
        .unwrap();
        assert_eq!(s.sessions_of("PHY"), 1);
        assert_eq!(s.entries_for_classroom("R1").len(), 1);
    }

    #[test]
    fn test_queries() {
        let s = sample_schedule();
        assert_eq!(s.len(), 3);
        assert_eq!(s.sessions_of("MATH"), 2);
        assert_eq!(s.entries_for_teacher("T1").len(), 2);
        assert_eq!(s.entries_for_classroom("R1").len(), 2);
        assert_eq!(s.entries_in_slot(1).len(), 2);
        assert_eq!(s.entries_for_subject("PHY")[0].teacher, "T2");
    }

    #[test]
    fn test_remove_and_insert_preserve_order() {
        let mut s = sample_schedule();
        let removed = s.remove(1).unwrap();
        assert_eq!(s.len(), 2);
        assert!(s.remove(5).is_none());

        s.insert(1, removed.clone());
        assert_eq!(s, sample_schedule());

        s.insert(99, removed);
        assert_eq!(s.len(), 4);
    }

    #[test]
    fn test_conflict_involves() {
        let c = Conflict::new(
            ConflictKind::TeacherDoubleBooked,
            vec![0, 2],
            "T1",
            "double booked",
        );
        assert!(c.involves(2));
        assert!(!c.involves(1));
    }

    #[test]
    fn test_schedule_json_shape() {
        let s = sample_schedule();
        let json = serde_json::to_value(&s).unwrap();
        assert_eq!(json["entries"][0]["subject"], "MATH");
        assert_eq!(json["entries"][2]["slot"], 1);
    }
}
