//! Input and schedule validation.
//!
//! - [`check_registry`] flags registry contents that cannot be scheduled,
//!   before generation runs.
//! - [`validate`] re-checks a finished schedule against every hard
//!   constraint and returns the conflicts it finds.

mod conflicts;
mod input;

pub use conflicts::validate;
pub use input::{check_registry, validate_input, InputCheckResult, InputIssue, InputIssueKind};
