//! Input checks run before generation.
//!
//! Flags registry contents that guarantee unscheduled sessions. These are
//! warnings: generation still runs and reports what it could not place.
//! Detects:
//! - Subjects with no sessions or a zero session length
//! - Subjects no teacher is qualified for
//! - Subjects no classroom suits
//! - Subjects whose session length fits no slot
//! - Qualifications naming unknown subjects

use tracing::warn;

use crate::config::SchedulingConfig;
use crate::evaluator::duration_fits;
use crate::registry::Registry;

/// Input check result.
pub type InputCheckResult = Result<(), Vec<InputIssue>>;

/// A problem found in the registry.
#[derive(Debug, Clone, PartialEq)]
pub struct InputIssue {
    /// Issue category.
    pub kind: InputIssueKind,
    /// Identifier of the subject or teacher concerned.
    pub entity_id: String,
    /// Human-readable description.
    pub message: String,
}

/// Categories of input issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputIssueKind {
    /// Subject requires zero sessions per week.
    NoSessions,
    /// Subject has a zero session length.
    ZeroDuration,
    /// No teacher is qualified for the subject.
    NoQualifiedTeacher,
    /// No classroom suits the subject.
    NoCompatibleClassroom,
    /// No slot can hold a session of the subject.
    NoFittingSlot,
    /// A teacher is qualified for a subject code that is not registered.
    UnknownQualification,
}

impl InputIssue {
    fn new(kind: InputIssueKind, entity_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            entity_id: entity_id.into(),
            message: message.into(),
        }
    }
}

/// Checks the registry for contents that cannot be scheduled.
///
/// Every issue is also logged as a warning.
pub fn check_registry(registry: &Registry, config: &SchedulingConfig) -> Vec<InputIssue> {
    let mut issues = Vec::new();

    for subject in registry.subjects.list() {
        let code = subject.code.as_str();
        if subject.sessions_per_week == 0 {
            issues.push(InputIssue::new(
                InputIssueKind::NoSessions,
                code,
                format!("Subject '{code}' requires no sessions"),
            ));
        }
        if subject.duration_minutes == 0 {
            issues.push(InputIssue::new(
                InputIssueKind::ZeroDuration,
                code,
                format!("Subject '{code}' has a zero session length"),
            ));
            continue;
        }
        if registry.qualified_teachers(subject).next().is_none() {
            issues.push(InputIssue::new(
                InputIssueKind::NoQualifiedTeacher,
                code,
                format!("No teacher is qualified for subject '{code}'"),
            ));
        }
        if registry.compatible_classrooms(subject).next().is_none() {
            issues.push(InputIssue::new(
                InputIssueKind::NoCompatibleClassroom,
                code,
                format!("No classroom suits subject '{code}'"),
            ));
        }
        let fits = registry.slots.list().any(|slot| {
            duration_fits(slot, subject.duration_minutes, config.duration_slack_minutes)
        });
        if !fits {
            issues.push(InputIssue::new(
                InputIssueKind::NoFittingSlot,
                code,
                format!(
                    "No slot fits a {}-minute session of subject '{code}'",
                    subject.duration_minutes
                ),
            ));
        }
    }

    for teacher in registry.teachers.list() {
        for qualification in &teacher.qualifications {
            if !registry.subjects.contains(qualification.as_str()) {
                issues.push(InputIssue::new(
                    InputIssueKind::UnknownQualification,
                    teacher.employee_code.as_str(),
                    format!(
                        "Teacher '{}' is qualified for unknown subject '{qualification}'",
                        teacher.employee_code
                    ),
                ));
            }
        }
    }

    for issue in &issues {
        warn!(event = "input_issue", kind = ?issue.kind, id = %issue.entity_id, "{}", issue.message);
    }
    issues
}

/// Like [`check_registry`], as a `Result`.
///
/// # Returns
/// `Ok(())` if no issue is found, `Err(issues)` otherwise.
pub fn validate_input(registry: &Registry, config: &SchedulingConfig) -> InputCheckResult {
    let issues = check_registry(registry, config);
    if issues.is_empty() {
        Ok(())
    } else {
        Err(issues)
    }
}
