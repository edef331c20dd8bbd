//! Assignment engine and KPI evaluation.
//!
//! # Algorithm
//!
//! `AssignmentEngine` uses a deterministic, most-constrained-first greedy
//! heuristic with bounded local repair. It is not optimal, but every
//! schedule it returns satisfies all hard constraints and unplaceable
//! sessions are reported rather than failing the run.
//!
//! # KPI
//!
//! `TimetableKpi` computes teacher workload, room usage and placement
//! success rate.
//!
//! # References
//!
//! - Schaerf (1999), "A Survey of Automated Timetabling"
//! - Burke & Petrovic (2002), "Recent research directions in automated timetabling"

mod engine;
mod kpi;

pub use engine::{AssignmentEngine, GenerationResult, Suggestion};
pub use kpi::TimetableKpi;
