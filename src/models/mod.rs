//! Timetabling domain models.
//!
//! Entity catalogs (subjects, teachers, classrooms, time slots) and the
//! solution types produced by the engine and checked by the validator.
//!
//! # Domain Mappings
//!
//! | u-timetable | Generic scheduling |
//! |-------------|--------------------|
//! | Subject | Task with N identical activities |
//! | Teacher | Human resource with skills |
//! | Classroom | Primary resource with type + capacity |
//! | TimeSlot | Discrete time bucket |
//! | ScheduleEntry | Assignment |

mod availability;
mod classroom;
mod schedule;
mod subject;
mod teacher;
mod time_slot;

pub use availability::{Availability, WeeklyWindow};
pub use classroom::{Classroom, Feature, RoomStatus, RoomType};
pub use schedule::{Conflict, ConflictKind, Schedule, ScheduleEntry, UnscheduledSession};
pub use subject::{Priority, Subject, SubjectCategory};
pub use teacher::{Teacher, TeacherStatus};
pub use time_slot::{generate_slots, Day, SlotId, TimeSlot};

pub(crate) use time_slot::{daily_layout, minute_of_day};
