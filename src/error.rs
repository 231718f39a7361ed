//! Error types.
//!
//! Algorithmic infeasibility is an expected outcome and is reported through
//! [`Infeasible`] inside a [`Construction`]. Malformed arguments (comparing
//! schedules over different machine sets, bad configuration) use separate
//! error types.

use thiserror::Error;

use crate::models::Schedule;

/// Outcome of a construction that may fail to find or certify a schedule.
pub type Construction<'a> = Result<Schedule<'a>, Infeasible>;

/// Why a constructor gave up. Callers move on to the next strategy.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Infeasible {
    /// Primary build: the task fits on no engaged machine without idle time.
    #[error("task {task_id} would leave slack on an engaged machine")]
    SlackExhausted { task_id: u32 },
    /// Primary build: more than one engaged machine accepts the task.
    #[error("task {task_id} fits on more than one engaged machine")]
    AmbiguousPlacement { task_id: u32 },
    /// Completion pass: appending to the least loaded machine misses the deadline.
    #[error("task {task_id} misses its deadline on the least loaded machine")]
    CompletionDeadlineMiss { task_id: u32 },
    /// Every machine is engaged when the task needs a fresh one.
    #[error("task {task_id} needs a new machine but none is idle")]
    NoIdleMachine { task_id: u32 },
    /// Combinatorial refinement: suspects left after every resolution step.
    #[error("{count} suspected tasks could not be placed jointly")]
    UnresolvedSuspects { count: usize },
    /// An evicted suffix task found no host machine.
    #[error("prefix and suffix could not be merged on machine {machine_id}")]
    MergeConflict { machine_id: u32 },
}

/// Precondition violations on schedule operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleError {
    /// Compared schedules cover different numbers of machines.
    #[error("the schedules must have the same number of machines ({left} vs {right})")]
    MachineCountMismatch { left: usize, right: usize },
}

/// Invalid scheduler configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// `adjustment_border` is zero or negative.
    #[error("adjustment border must be positive, got {0}")]
    AdjustmentBorder(i64),
    /// `combination_border` is not a positive finite number.
    #[error("combination border must be positive and finite, got {0}")]
    CombinationBorder(f64),
}
