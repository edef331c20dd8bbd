//! Subject ordering rules and rule engine.
//!
//! Decides the order in which the assignment engine places subjects.
//! Harder-to-place subjects go first (most-constrained-first), which
//! keeps repairs rare.
//!
//! # Usage
//!
//! ```
//! use u_timetable::dispatching::{RuleEngine, SchedulingContext, TieBreaker};
//! use u_timetable::dispatching::rules;
//! use u_timetable::models::{Priority, Subject};
//!
//! let engine = RuleEngine::new()
//!     .with_rule(rules::HighestPriority)
//!     .with_tie_breaker(rules::LongestSession)
//!     .with_final_tie_breaker(TieBreaker::ById);
//!
//! let subjects = vec![
//!     Subject::new("ART", "Art"),
//!     Subject::new("MATH", "Math").with_priority(Priority::High),
//! ];
//! let order = engine.sort_indices(&subjects, &SchedulingContext::new());
//! assert_eq!(subjects[order[0]].code, "MATH");
//! ```
//!
//! # References
//!
//! - Burke & Petrovic (2002), "Recent research directions in automated timetabling"
//! - Carter, Laporte & Lee (1996), "Examination timetabling: algorithmic strategies
//!   and applications" (largest-degree / saturation-degree orderings)

mod context;
mod engine;
pub mod rules;

pub use context::SchedulingContext;
pub use engine::{EvaluationMode, RuleEngine, TieBreaker};

use crate::models::Subject;
use std::fmt::Debug;

/// Score returned by an ordering rule.
///
/// Lower scores = placed earlier.
pub type RuleScore = f64;

/// A rule that ranks subjects for placement.
///
/// # Score Convention
/// **Lower score = placed first.** Rules return smaller values for
/// subjects that are harder to place.
pub trait SubjectRule: Send + Sync + Debug {
    /// Rule name (e.g., "PRIORITY").
    fn name(&self) -> &'static str;

    /// Evaluates a subject given the current placement state.
    ///
    /// Returns a score where lower = placed earlier.
    fn evaluate(&self, subject: &Subject, context: &SchedulingContext) -> RuleScore;

    /// Rule description.
    fn description(&self) -> &'static str {
        self.name()
    }
}
