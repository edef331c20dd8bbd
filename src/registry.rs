//! Entity registry.
//!
//! Catalogs of subjects, teachers, classrooms and time slots, keyed by
//! their unique identifiers and kept in insertion order. The registry
//! enforces uniqueness only; scheduling feasibility is the evaluator's
//! concern. Catalogs are immutable for the duration of a generation run.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::hash::Hash;

use crate::config::SchedulingConfig;
use crate::error::{EntityKind, Result, TimetableError};
use crate::models::{generate_slots, Classroom, SlotId, Subject, Teacher, TimeSlot};

/// An entity stored in a [`Catalog`].
pub trait Entity: Clone {
    /// Unique key type.
    type Key: Clone + Eq + Hash + Display + std::fmt::Debug;

    /// Entity kind, for error reporting.
    const KIND: EntityKind;

    /// Unique key.
    fn key(&self) -> Self::Key;
}

impl Entity for Subject {
    type Key = String;
    const KIND: EntityKind = EntityKind::Subject;

    fn key(&self) -> String {
        self.code.clone()
    }
}

impl Entity for Teacher {
    type Key = String;
    const KIND: EntityKind = EntityKind::Teacher;

    fn key(&self) -> String {
        self.employee_code.clone()
    }
}

impl Entity for Classroom {
    type Key = String;
    const KIND: EntityKind = EntityKind::Classroom;

    fn key(&self) -> String {
        self.room_number.clone()
    }
}

impl Entity for TimeSlot {
    type Key = SlotId;
    const KIND: EntityKind = EntityKind::TimeSlot;

    fn key(&self) -> SlotId {
        self.id
    }
}

/// Insertion-ordered catalog of one entity type.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound(
    serialize = "T: Serialize, T::Key: Serialize",
    deserialize = "T: Deserialize<'de>, T::Key: Deserialize<'de>"
))]
pub struct Catalog<T: Entity> {
    items: IndexMap<T::Key, T>,
}

impl<T: Entity> Catalog<T> {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self {
            items: IndexMap::new(),
        }
    }

    /// Adds an entity.
    ///
    /// # Errors
    /// `DuplicateIdentifier` if the key exists; the catalog is unchanged.
    pub fn add(&mut self, item: T) -> Result<()> {
        let key = item.key();
        if self.items.contains_key(&key) {
            return Err(TimetableError::duplicate(T::KIND, key.to_string()));
        }
        self.items.insert(key, item);
        Ok(())
    }

    /// Looks up an entity.
    ///
    /// # Errors
    /// `NotFound` if no entity has this key.
    pub fn get<Q>(&self, key: &Q) -> Result<&T>
    where
        Q: ?Sized + Hash + indexmap::Equivalent<T::Key> + Display,
    {
        self.items
            .get(key)
            .ok_or_else(|| TimetableError::not_found(T::KIND, key))
    }

    /// Removes an entity, keeping the order of the others.
    ///
    /// # Errors
    /// `NotFound` if no entity has this key.
    pub fn remove<Q>(&mut self, key: &Q) -> Result<T>
    where
        Q: ?Sized + Hash + indexmap::Equivalent<T::Key> + Display,
    {
        self.items
            .shift_remove(key)
            .ok_or_else(|| TimetableError::not_found(T::KIND, key))
    }

    /// Looks up an entity, `None` if absent.
    pub fn find<Q>(&self, key: &Q) -> Option<&T>
    where
        Q: ?Sized + Hash + indexmap::Equivalent<T::Key>,
    {
        self.items.get(key)
    }

    /// Whether a key exists.
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        Q: ?Sized + Hash + indexmap::Equivalent<T::Key>,
    {
        self.items.contains_key(key)
    }

    /// Entities in insertion order.
    ///
    /// The iterator is lazy; call `list()` again (or clone it) to restart.
    pub fn list(&self) -> indexmap::map::Values<'_, T::Key, T> {
        self.items.values()
    }

    /// Number of entities.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<T: Entity> Default for Catalog<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// All entity catalogs of a timetable.
///
/// # Example
///
/// ```
/// use u_timetable::registry::Registry;
/// use u_timetable::models::Subject;
///
/// let mut registry = Registry::new();
/// registry.add_subject(Subject::new("MATH101", "Calculus")).unwrap();
/// assert!(registry.add_subject(Subject::new("math101", "Again")).is_err());
/// assert_eq!(registry.subject("MATH101").unwrap().name, "Calculus");
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Registry {
    pub subjects: Catalog<Subject>,
    pub teachers: Catalog<Teacher>,
    pub classrooms: Catalog<Classroom>,
    pub slots: Catalog<TimeSlot>,
}

impl Registry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry whose slot catalog is generated from `config`.
    ///
    /// # Errors
    /// `InfeasibleConfiguration` if the configuration is self-contradictory.
    pub fn with_slots_from(config: &SchedulingConfig) -> Result<Self> {
        let mut registry = Self::new();
        for slot in generate_slots(config)? {
            registry.slots.add(slot)?;
        }
        Ok(registry)
    }

    /// Adds a subject.
    pub fn add_subject(&mut self, subject: Subject) -> Result<()> {
        self.subjects.add(subject)
    }

    /// Adds a teacher.
    pub fn add_teacher(&mut self, teacher: Teacher) -> Result<()> {
        self.teachers.add(teacher)
    }

    /// Adds a classroom.
    pub fn add_classroom(&mut self, classroom: Classroom) -> Result<()> {
        self.classrooms.add(classroom)
    }

    /// Adds a time slot.
    pub fn add_slot(&mut self, slot: TimeSlot) -> Result<()> {
        self.slots.add(slot)
    }

    /// Looks up a subject by code (case-insensitive).
    pub fn subject(&self, code: &str) -> Result<&Subject> {
        self.subjects.get(code.to_uppercase().as_str())
    }

    /// Looks up a teacher by employee code (case-insensitive).
    pub fn teacher(&self, code: &str) -> Result<&Teacher> {
        self.teachers.get(code.to_uppercase().as_str())
    }

    /// Looks up a classroom by room number (case-insensitive).
    pub fn classroom(&self, number: &str) -> Result<&Classroom> {
        self.classrooms.get(number.to_uppercase().as_str())
    }

    /// Removes a subject by code (case-insensitive).
    pub fn remove_subject(&mut self, code: &str) -> Result<Subject> {
        self.subjects.remove(code.to_uppercase().as_str())
    }

    /// Removes a teacher by employee code (case-insensitive).
    pub fn remove_teacher(&mut self, code: &str) -> Result<Teacher> {
        self.teachers.remove(code.to_uppercase().as_str())
    }

    /// Removes a classroom by room number (case-insensitive).
    pub fn remove_classroom(&mut self, number: &str) -> Result<Classroom> {
        self.classrooms.remove(number.to_uppercase().as_str())
    }

    /// Looks up a time slot.
    pub fn slot(&self, id: SlotId) -> Result<&TimeSlot> {
        self.slots.get(&id)
    }

    /// Teachers qualified for a subject, in insertion order.
    pub fn qualified_teachers<'a>(
        &'a self,
        subject: &'a Subject,
    ) -> impl Iterator<Item = &'a Teacher> + Clone + 'a {
        self.teachers
            .list()
            .filter(move |t| t.can_teach(&subject.code))
    }

    /// Classrooms that suit a subject, in insertion order.
    pub fn compatible_classrooms<'a>(
        &'a self,
        subject: &'a Subject,
    ) -> impl Iterator<Item = &'a Classroom> + Clone + 'a {
        self.classrooms.list().filter(move |c| c.suits(subject))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{RoomType, SubjectCategory};

    #[test]
    fn test_add_and_get() {
        let mut r = Registry::new();
        r.add_subject(Subject::new("MATH", "Math")).unwrap();
        r.add_teacher(Teacher::new("T1", "Alice").qualified_for("MATH"))
            .unwrap();
        r.add_classroom(Classroom::new("R1", 30, RoomType::Classroom))
            .unwrap();

        assert_eq!(r.subject("math").unwrap().code, "MATH");
        assert_eq!(r.teacher("t1").unwrap().name, "Alice");
        assert_eq!(r.classroom("R1").unwrap().capacity, 30);
    }

    #[test]
    fn test_duplicate_rejected_and_state_kept() {
        let mut r = Registry::new();
        r.add_teacher(Teacher::new("T1", "Alice")).unwrap();
        let err = r.add_teacher(Teacher::new("t1", "Bob")).unwrap_err();
        assert_eq!(
            err,
            TimetableError::DuplicateIdentifier {
                kind: EntityKind::Teacher,
                id: "T1".into()
            }
        );
        assert_eq!(r.teachers.len(), 1);
        assert_eq!(r.teacher("T1").unwrap().name, "Alice");
    }

    #[test]
    fn test_not_found() {
        let r = Registry::new();
        assert!(matches!(
            r.subject("NOPE"),
            Err(TimetableError::NotFound {
                kind: EntityKind::Subject,
                ..
            })
        ));
        assert!(matches!(
            r.slot(3),
            Err(TimetableError::NotFound {
                kind: EntityKind::TimeSlot,
                ..
            })
        ));
    }

    #[test]
    fn test_list_is_ordered_and_restartable() {
        let mut r = Registry::new();
        for code in ["C", "A", "B"] {
            r.add_subject(Subject::new(code, code)).unwrap();
        }
        let listed: Vec<&str> = r.subjects.list().map(|s| s.code.as_str()).collect();
        assert_eq!(listed, vec!["C", "A", "B"]);

        let iter = r.subjects.list();
        assert_eq!(iter.clone().count(), 3);
        assert_eq!(iter.count(), 3);
    }

    #[test]
    fn test_remove_keeps_order() {
        let mut r = Registry::new();
        for code in ["C", "A", "B"] {
            r.add_subject(Subject::new(code, code)).unwrap();
        }
        assert_eq!(r.remove_subject("a").unwrap().code, "A");
        let listed: Vec<&str> = r.subjects.list().map(|s| s.code.as_str()).collect();
        assert_eq!(listed, vec!["C", "B"]);

        let err = r.remove_subject("A").unwrap_err();
        assert_eq!(err, TimetableError::not_found(EntityKind::Subject, "A"));
        assert!(r.remove_teacher("T1").is_err());
    }

    #[test]
    fn test_slots_from_config() {
        let r = Registry::with_slots_from(&SchedulingConfig::default()).unwrap();
        assert_eq!(r.slots.len(), 35);
        assert_eq!(r.slot(0).unwrap().id, 0);
    }

    #[test]
    fn test_qualified_and_compatible() {
        let mut r = Registry::new();
        let lab = Subject::new("CHEM", "Chemistry").with_category(SubjectCategory::Lab);
        r.add_teacher(Teacher::new("T1", "A").qualified_for("CHEM"))
            .unwrap();
        r.add_teacher(Teacher::new("T2", "B")).unwrap();
        r.add_classroom(Classroom::new("R1", 30, RoomType::Classroom))
            .unwrap();
        r.add_classroom(Classroom::new("L1", 30, RoomType::Laboratory))
            .unwrap();

        let teachers: Vec<_> = r.qualified_teachers(&lab).map(|t| &t.employee_code).collect();
        assert_eq!(teachers, vec!["T1"]);
        let rooms: Vec<_> = r
            .compatible_classrooms(&lab)
            .map(|c| &c.room_number)
            .collect();
        assert_eq!(rooms, vec!["L1"]);
    }
}
