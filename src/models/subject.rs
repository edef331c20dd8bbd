//! Subject model.
//!
//! A subject is a recurring teaching unit: it needs `sessions_per_week`
//! sessions of `duration_minutes` each, every session taught by one
//! qualified teacher in one compatible classroom.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::Feature;

/// Scheduling priority (ordinal, `Low < Medium < High < Critical`).
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

impl Priority {
    /// Numeric rank (0 = Low, 3 = Critical).
    pub fn rank(self) -> i32 {
        self as i32
    }
}

/// Subject category; decides which room types can host it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SubjectCategory {
    #[default]
    Lecture,
    Lab,
    Tutorial,
    Seminar,
    Workshop,
}

/// A subject to be timetabled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subject {
    /// Unique subject code (upper case).
    pub code: String,
    /// Human-readable name.
    pub name: String,
    /// Category (room-type matching).
    pub category: SubjectCategory,
    /// Scheduling priority.
    pub priority: Priority,
    /// Length of one session (minutes).
    pub duration_minutes: u32,
    /// Sessions required per week.
    pub sessions_per_week: u32,
    /// Enrolment; rooms must seat at least this many.
    pub expected_students: Option<u32>,
    /// Room features every session needs.
    pub required_features: BTreeSet<Feature>,
}

impl Subject {
    /// Creates a one-session, 60-minute lecture.
    ///
    /// The code is normalized to upper case.
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            code: code.into().to_uppercase(),
            name: name.into(),
            category: SubjectCategory::Lecture,
            priority: Priority::Medium,
            duration_minutes: 60,
            sessions_per_week: 1,
            expected_students: None,
            required_features: BTreeSet::new(),
        }
    }

    /// Sets the category.
    pub fn with_category(mut self, category: SubjectCategory) -> Self {
        self.category = category;
        self
    }

    /// Sets the priority.
    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    /// Sets the session length.
    pub fn with_duration(mut self, minutes: u32) -> Self {
        self.duration_minutes = minutes;
        self
    }

    /// Sets the number of weekly sessions.
    pub fn with_sessions(mut self, sessions: u32) -> Self {
        self.sessions_per_week = sessions;
        self
    }

    /// Sets the expected enrolment.
    pub fn with_expected_students(mut self, students: u32) -> Self {
        self.expected_students = Some(students);
        self
    }

    /// Adds a required room feature.
    pub fn requiring(mut self, feature: Feature) -> Self {
        self.required_features.insert(feature);
        self
    }

    /// Total teaching minutes per week.
    pub fn weekly_minutes(&self) -> u32 {
        self.duration_minutes * self.sessions_per_week
    }

    /// Total teaching hours per week.
    pub fn weekly_hours(&self) -> f64 {
        self.weekly_minutes() as f64 / 60.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subject_builder() {
        let s = Subject::new("cs-101", "Intro to CS")
            .with_category(SubjectCategory::Lab)
            .with_priority(Priority::High)
            .with_duration(90)
            .with_sessions(2)
            .with_expected_students(24)
            .requiring(Feature::Computers);

        assert_eq!(s.code, "CS-101");
        assert_eq!(s.category, SubjectCategory::Lab);
        assert_eq!(s.priority, Priority::High);
        assert_eq!(s.weekly_minutes(), 180);
        assert!((s.weekly_hours() - 3.0).abs() < 1e-10);
        assert!(s.required_features.contains(&Feature::Computers));
    }

    #[test]
    fn test_priority_order() {
        assert!(Priority::Critical > Priority::High);
        assert!(Priority::High > Priority::Medium);
        assert!(Priority::Medium > Priority::Low);
        assert_eq!(Priority::Critical.rank(), 3);
        assert_eq!(Priority::default(), Priority::Medium);
    }

    #[test]
    fn test_serde_roundtrip_keeps_features() {
        let s = Subject::new("PHY1", "Physics").requiring(Feature::Projector);
        let json = serde_json::to_string(&s).unwrap();
        let back: Subject = serde_json::from_str(&json).unwrap();
        assert_eq!(back, s);
    }
}
