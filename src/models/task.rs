//! Task model.
//!
//! A task is a single non-preemptive unit of work with a processing
//! duration and an absolute deadline. Tasks are created by the caller
//! once per problem instance and are only ever borrowed by the engine.
//!
//! # Reference
//! Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems", Ch. 1

use serde::{Deserialize, Serialize};

use super::Time;

/// A task to be scheduled on one of the identical machines.
///
/// # Time Representation
/// Duration and deadline are in ticks (milliseconds by convention)
/// relative to a scheduling epoch (t=0) chosen by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Task {
    /// Unique positive task identifier.
    pub id: u32,
    /// Human-readable name.
    pub name: String,
    /// Processing duration (ticks, > 0).
    pub duration: Time,
    /// Absolute completion deadline (ticks).
    pub deadline: Time,
}

impl Task {
    /// Creates a new task.
    pub fn new(id: u32, name: impl Into<String>, duration: Time, deadline: Time) -> Self {
        Self {
            id,
            name: name.into(),
            duration,
            deadline,
        }
    }

    /// Creates a task named `Task #<id>`.
    pub fn unnamed(id: u32, duration: Time, deadline: Time) -> Self {
        Self::new(id, format!("Task #{id}"), duration, deadline)
    }

    /// Sets the task name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Latest start at which the task alone still meets its deadline.
    #[inline]
    pub fn extreme_time(&self) -> Time {
        self.deadline - self.duration
    }

    /// Start of this task when it is put in front of a queue starting at
    /// `queue_start`.
    ///
    /// If the queue starts after the deadline the task runs at its extreme
    /// time, otherwise it must finish exactly when the queue starts.
    #[inline]
    pub fn start_before(&self, queue_start: Time) -> Time {
        queue_start.min(self.deadline) - self.duration
    }
}
