//! Scheduling domain models.
//!
//! Provides the data types shared by every construction algorithm:
//! immutable [`Task`] and [`Machine`] values owned by the caller, and the
//! [`Schedule`] aggregate the algorithms produce and consume.
//!
//! # Objective
//!
//! All algorithms rank candidate schedules with one primitive,
//! [`compare_start_times`]: sort the per-machine start times ascending and
//! compare component-wise. Later is better.

mod machine;
mod objective;
mod schedule;
mod task;

pub use machine::Machine;
pub use objective::{compare_start_times, is_improvement};
pub use schedule::{latest_start, Assignment, MachineSchedule, Schedule, Violation, ViolationType};
pub use task::Task;

/// Time and duration unit (ticks relative to a caller-chosen epoch).
pub type Time = i64;

/// Start-time sentinel of a machine without tasks.
pub const IDLE: Time = Time::MAX;
