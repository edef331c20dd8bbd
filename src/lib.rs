//! Academic timetabling engine.
//!
//! Places the weekly sessions of every subject onto (teacher, classroom,
//! time slot) triples so that no hard constraint is broken, and reports the
//! sessions it could not place instead of failing the run.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Subject`, `Teacher`, `Classroom`,
//!   `TimeSlot`, `Availability`, `Schedule`, `Conflict`
//! - **`registry`**: Insertion-ordered entity catalogs with unique keys
//! - **`config`**: `SchedulingConfig` value object (TOML-loadable)
//! - **`workload`**: Per-teacher weekly load and consecutive-run tracking
//! - **`evaluator`**: Hard-constraint checks and weighted soft preferences
//! - **`dispatching`**: Subject ordering rules (most constrained first)
//! - **`scheduler`**: Greedy assignment with bounded repair, KPIs
//! - **`validation`**: Conflict detection and registry input checks
//! - **`timetable`**: `TimeTable` aggregate with validated edits
//!
//! # Example
//!
//! ```
//! use u_timetable::{AssignmentEngine, Registry, SchedulingConfig};
//! use u_timetable::models::{Classroom, RoomType, Subject, Teacher};
//! use u_timetable::validation::validate;
//!
//! let config = SchedulingConfig::default();
//! let mut registry = Registry::with_slots_from(&config).unwrap();
//! registry.add_subject(Subject::new("PHYS", "Physics").with_sessions(2)).unwrap();
//! registry.add_teacher(Teacher::new("T1", "Curie").qualified_for("PHYS")).unwrap();
//! registry.add_classroom(Classroom::new("A101", 40, RoomType::Classroom)).unwrap();
//!
//! let result = AssignmentEngine::new(config.clone()).generate(&registry).unwrap();
//! assert!(result.is_complete());
//! assert!(validate(&result.schedule, &registry, &config, &result.unscheduled).is_empty());
//! ```
//!
//! # References
//!
//! - Schaerf (1999), "A Survey of Automated Timetabling"
//! - de Werra (1985), "An introduction to timetabling"

pub mod config;
pub mod dispatching;
pub mod error;
pub mod evaluator;
pub mod models;
pub mod registry;
pub mod scheduler;
pub mod timetable;
pub mod validation;
pub mod workload;

pub use config::{ConfigError, SchedulingConfig, ScoringWeights};
pub use error::{EntityKind, Result, TimetableError};
pub use registry::Registry;
pub use scheduler::{AssignmentEngine, GenerationResult};
pub use timetable::{EditOutcome, TimeTable};
