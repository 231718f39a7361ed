//! Input validation and schedule feasibility checks.
//!
//! [`validate_input`] checks structural integrity of tasks and machines
//! before scheduling. Detects:
//! - Duplicate IDs
//! - Zero IDs
//! - Non-positive durations
//!
//! [`check_feasibility`] reports every deadline miss of a built schedule and,
//! given a horizon (the earliest admissible start), every machine that
//! starts before it.

use std::collections::HashSet;

use crate::models::{Machine, Schedule, Task, Time, Violation};

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Two entities share the same ID.
    DuplicateId,
    /// An entity uses the reserved ID 0.
    ZeroId,
    /// A task's duration is zero or negative.
    NonPositiveDuration,
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Validates the input data for a scheduling problem.
///
/// Checks:
/// 1. No duplicate task IDs
/// 2. No duplicate machine IDs
/// 3. No task or machine uses ID 0
/// 4. Every task has a positive duration
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_input(tasks: &[Task], machines: &[Machine]) -> ValidationResult {
    let mut errors = Vec::new();

    let mut machine_ids = HashSet::new();
    for m in machines {
        if m.id == 0 {
            errors.push(ValidationError::new(
                ValidationErrorKind::ZeroId,
                format!("Machine '{}' has ID 0", m.name),
            ));
        }
        if !machine_ids.insert(m.id) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate machine ID: {}", m.id),
            ));
        }
    }

    let mut task_ids = HashSet::new();
    for task in tasks {
        if task.id == 0 {
            errors.push(ValidationError::new(
                ValidationErrorKind::ZeroId,
                format!("Task '{}' has ID 0", task.name),
            ));
        }
        if !task_ids.insert(task.id) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate task ID: {}", task.id),
            ));
        }
        if task.duration <= 0 {
            errors.push(ValidationError::new(
                ValidationErrorKind::NonPositiveDuration,
                format!("Task {} has duration {}", task.id, task.duration),
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Lists every feasibility violation of `schedule`.
///
/// A task violates its deadline when it completes after it. With a
/// `horizon`, an engaged machine starting before the horizon is a violation
/// too; without one, starts are unconstrained.
pub fn check_feasibility(schedule: &Schedule<'_>, horizon: Option<Time>) -> Vec<Violation> {
    let mut violations = Vec::new();
    for lane in &schedule.machines {
        if let Some(now) = horizon {
            if !lane.is_idle() && lane.start_time < now {
                violations.push(Violation::start_before_horizon(
                    lane.machine.id,
                    now - lane.start_time,
                ));
            }
        }
        for (task, end) in lane.completions() {
            if end > task.deadline {
                violations.push(Violation::deadline_miss(task.id, end - task.deadline));
            }
        }
    }
    violations
}

/// Whether `schedule` has no violation under `horizon`.
pub fn is_feasible_within(schedule: &Schedule<'_>, horizon: Option<Time>) -> bool {
    check_feasibility(schedule, horizon).is_empty()
}
