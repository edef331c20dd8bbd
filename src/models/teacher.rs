//! Teacher model.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::{Availability, TimeSlot};

/// Employment status. Only active teachers can be booked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TeacherStatus {
    #[default]
    Active,
    OnLeave,
    Inactive,
}

/// A teacher who can be assigned to sessions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Teacher {
    /// Unique employee code (upper case).
    pub employee_code: String,
    /// Full name.
    pub name: String,
    /// Department (informational).
    pub department: Option<String>,
    /// Employment status.
    pub status: TeacherStatus,
    /// Codes of subjects this teacher may teach (upper case).
    pub qualifications: BTreeSet<String>,
    /// Personal weekly teaching limit (hours).
    pub max_weekly_hours: u32,
    /// Personal limit on consecutive teaching hours, if stricter than the global one.
    pub max_consecutive_hours: Option<u32>,
    /// Weekly availability.
    pub availability: Availability,
}

impl Teacher {
    /// Creates an active teacher with a 40-hour weekly limit.
    pub fn new(employee_code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            employee_code: employee_code.into().to_uppercase(),
            name: name.into(),
            department: None,
            status: TeacherStatus::Active,
            qualifications: BTreeSet::new(),
            max_weekly_hours: 40,
            max_consecutive_hours: None,
            availability: Availability::always(),
        }
    }

    /// Adds a subject qualification.
    pub fn qualified_for(mut self, subject_code: impl Into<String>) -> Self {
        self.qualifications
            .insert(subject_code.into().to_uppercase());
        self
    }

    /// Sets the department.
    pub fn with_department(mut self, department: impl Into<String>) -> Self {
        self.department = Some(department.into());
        self
    }

    /// Sets the status.
    pub fn with_status(mut self, status: TeacherStatus) -> Self {
        self.status = status;
        self
    }

    /// Sets the personal weekly limit.
    pub fn with_max_weekly_hours(mut self, hours: u32) -> Self {
        self.max_weekly_hours = hours;
        self
    }

    /// Sets the personal consecutive-hours limit.
    pub fn with_max_consecutive_hours(mut self, hours: u32) -> Self {
        self.max_consecutive_hours = Some(hours);
        self
    }

    /// Sets the availability.
    pub fn with_availability(mut self, availability: Availability) -> Self {
        self.availability = availability;
        self
    }

    /// Whether the teacher is qualified for a subject code (case-insensitive).
    pub fn can_teach(&self, subject_code: &str) -> bool {
        self.qualifications.contains(&subject_code.to_uppercase())
    }

    /// Whether the teacher can be booked in a slot.
    pub fn is_available(&self, slot: &TimeSlot) -> bool {
        self.status == TeacherStatus::Active && self.availability.is_available(slot)
    }

    /// Weekly cap in minutes given the global cap (hours).
    pub fn weekly_cap_minutes(&self, global_hours: u32) -> u32 {
        self.max_weekly_hours.min(global_hours).saturating_mul(60)
    }

    /// Consecutive-run cap in minutes given the global cap (hours).
    pub fn consecutive_cap_minutes(&self, global_hours: u32) -> u32 {
        self.max_consecutive_hours
            .map_or(global_hours, |h| h.min(global_hours))
            .saturating_mul(60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Day;
    use chrono::NaiveTime;

    #[test]
    fn test_teacher_builder() {
        let t = Teacher::new("emp-7", "Ada Lovelace")
            .with_department("Mathematics")
            .qualified_for("math101")
            .qualified_for("CS101")
            .with_max_weekly_hours(20);

        assert_eq!(t.employee_code, "EMP-7");
        assert!(t.can_teach("MATH101"));
        assert!(t.can_teach("cs101"));
        assert!(!t.can_teach("PHY1"));
        assert_eq!(t.department.as_deref(), Some("Mathematics"));
    }

    #[test]
    fn test_caps_take_the_stricter_limit() {
        let t = Teacher::new("E1", "A").with_max_weekly_hours(20);
        assert_eq!(t.weekly_cap_minutes(40), 20 * 60);
        assert_eq!(t.weekly_cap_minutes(10), 10 * 60);
        assert_eq!(t.consecutive_cap_minutes(3), 180);

        let t = t.with_max_consecutive_hours(2);
        assert_eq!(t.consecutive_cap_minutes(3), 120);
        assert_eq!(t.consecutive_cap_minutes(1), 60);
    }

    #[test]
    fn test_caps_saturate() {
        let t = Teacher::new("E1", "A").with_max_weekly_hours(u32::MAX);
        assert_eq!(t.weekly_cap_minutes(u32::MAX), u32::MAX);
        assert_eq!(t.consecutive_cap_minutes(100_000_000), u32::MAX);
    }

    #[test]
    fn test_inactive_teacher_unavailable() {
        let slot = TimeSlot::new(
            0,
            Day::Monday,
            NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
        );
        let t = Teacher::new("E1", "A");
        assert!(t.is_available(&slot));
        let t = t.with_status(TeacherStatus::OnLeave);
        assert!(!t.is_available(&slot));
    }
}
