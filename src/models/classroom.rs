//! Classroom model.
//!
//! Rooms host sessions. A room suits a subject when its type can host
//! the subject's category, it seats the expected enrolment, and it has
//! every feature the subject requires.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::{Availability, Subject, SubjectCategory, TimeSlot};

/// Room classification.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoomType {
    LectureHall,
    #[default]
    Classroom,
    Laboratory,
    ComputerLab,
    SeminarRoom,
    Auditorium,
    Workshop,
}

impl RoomType {
    /// Whether this room type can host a subject category.
    pub fn hosts(self, category: SubjectCategory) -> bool {
        use RoomType::*;
        match category {
            SubjectCategory::Lecture => {
                matches!(self, LectureHall | Classroom | Auditorium | SeminarRoom)
            }
            SubjectCategory::Lab => matches!(self, Laboratory | ComputerLab),
            SubjectCategory::Tutorial => matches!(self, Classroom | SeminarRoom),
            SubjectCategory::Seminar => matches!(self, SeminarRoom | Classroom),
            SubjectCategory::Workshop => matches!(self, Workshop | Laboratory),
        }
    }
}

/// Operational status. Only `Available` rooms can be booked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoomStatus {
    #[default]
    Available,
    Maintenance,
    Closed,
}

/// Room equipment.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Feature {
    Projector,
    Computers,
    AudioSystem,
    Whiteboard,
    Internet,
    AirConditioning,
    /// Domain-specific equipment.
    Custom(String),
}

/// A bookable room.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classroom {
    /// Unique room number (upper case).
    pub room_number: String,
    /// Display name.
    pub name: String,
    /// Building (informational).
    pub building: Option<String>,
    /// Seats.
    pub capacity: u32,
    /// Room classification.
    pub room_type: RoomType,
    /// Operational status.
    pub status: RoomStatus,
    /// Installed equipment.
    pub features: BTreeSet<Feature>,
    /// Weekly availability.
    pub availability: Availability,
}

impl Classroom {
    /// Creates an available room of the given type.
    pub fn new(room_number: impl Into<String>, capacity: u32, room_type: RoomType) -> Self {
        Self {
            room_number: room_number.into().to_uppercase(),
            name: String::new(),
            building: None,
            capacity,
            room_type,
            status: RoomStatus::Available,
            features: BTreeSet::new(),
            availability: Availability::always(),
        }
    }

    /// Sets the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the building.
    pub fn with_building(mut self, building: impl Into<String>) -> Self {
        self.building = Some(building.into());
        self
    }

    /// Sets the status.
    pub fn with_status(mut self, status: RoomStatus) -> Self {
        self.status = status;
        self
    }

    /// Adds a feature.
    pub fn with_feature(mut self, feature: Feature) -> Self {
        self.features.insert(feature);
        self
    }

    /// Sets the availability.
    pub fn with_availability(mut self, availability: Availability) -> Self {
        self.availability = availability;
        self
    }

    /// Whether the room can seat `students`.
    pub fn can_accommodate(&self, students: u32) -> bool {
        self.capacity >= students
    }

    /// Why the room does not suit a subject, or `None` if it does.
    pub fn mismatch(&self, subject: &Subject) -> Option<String> {
        if !self.room_type.hosts(subject.category) {
            return Some(format!(
                "{:?} room cannot host {:?} subject",
                self.room_type, subject.category
            ));
        }
        if let Some(students) = subject.expected_students {
            if !self.can_accommodate(students) {
                return Some(format!(
                    "capacity {} below expected {} students",
                    self.capacity, students
                ));
            }
        }
        let missing: Vec<&Feature> = subject
            .required_features
            .difference(&self.features)
            .collect();
        if !missing.is_empty() {
            return Some(format!("missing features {missing:?}"));
        }
        None
    }

    /// Whether the room suits a subject (type, capacity, features).
    pub fn suits(&self, subject: &Subject) -> bool {
        self.mismatch(subject).is_none()
    }

    /// Whether the room can be booked in a slot.
    pub fn is_available(&self, slot: &TimeSlot) -> bool {
        self.status == RoomStatus::Available && self.availability.is_available(slot)
    }
}
