//! Error taxonomy.
//!
//! Every failure the core can report is one of the variants below and
//! carries the offending identifier. Unscheduled sessions and validator
//! conflicts are *not* errors: they are returned as data.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Kind of entity an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Subject,
    Teacher,
    Classroom,
    TimeSlot,
    /// A schedule entry (addressed by position).
    Entry,
    /// A committed workload booking.
    Booking,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Subject => "subject",
            Self::Teacher => "teacher",
            Self::Classroom => "classroom",
            Self::TimeSlot => "time slot",
            Self::Entry => "schedule entry",
            Self::Booking => "booking",
        };
        f.write_str(name)
    }
}

/// Errors raised by the timetabling core.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimetableError {
    /// An entity's unique key collides with an existing one.
    #[error("duplicate {kind} identifier '{id}'")]
    DuplicateIdentifier { kind: EntityKind, id: String },

    /// Lookup of an unknown identifier.
    #[error("{kind} '{id}' not found")]
    NotFound { kind: EntityKind, id: String },

    /// The configuration contradicts itself; no generation is attempted.
    #[error("infeasible configuration for '{field}': {reason}")]
    InfeasibleConfiguration { field: &'static str, reason: String },
}

impl TimetableError {
    pub(crate) fn duplicate(kind: EntityKind, id: impl Into<String>) -> Self {
        Self::DuplicateIdentifier {
            kind,
            id: id.into(),
        }
    }

    pub(crate) fn not_found(kind: EntityKind, id: impl fmt::Display) -> Self {
        Self::NotFound {
            kind,
            id: id.to_string(),
        }
    }

    pub(crate) fn infeasible(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InfeasibleConfiguration {
            field,
            reason: reason.into(),
        }
    }
}

/// Result alias for timetabling operations.
pub type Result<T> = std::result::Result<T, TimetableError>;
