//! Constructive schedulers and KPI evaluation.
//!
//! Every builder takes the caller's tasks and machines by reference and
//! returns a [`Schedule`] borrowing them.
//!
//! # Algorithms
//!
//! | Builder | Result |
//! |---------|--------|
//! | [`build_schedule`] | Latest-start list heuristic |
//! | [`primary_construct`] | Certified greedy build plus completion pass, or infeasible |
//! | [`combinatorial_construct`] | Insertion-point refinement with suspect resolution, or infeasible |
//! | [`heuristic_strategy_1`], [`heuristic_strategy_2`], [`heuristic_strategy_3`] | Heuristic repertoire |
//! | [`build_with_primary_then_heuristics`] | Fixed fallback chain over all of the above |
//!
//! The exact solver lives in [`crate::bnb`].
//!
//! # KPI
//!
//! [`ScheduleKpi`] reports start spread and deadline slack of a schedule.
//!
//! # References
//!
//! - Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems", Ch. 5
//! - Baker & Trietsch (2019), "Principles of Sequencing and Scheduling"

mod combinatorial;
mod heuristics;
mod kpi;
mod list;
mod merge;
mod orchestrator;
mod primary;
mod repair;

use std::collections::HashSet;

pub use combinatorial::combinatorial_construct;
pub use heuristics::{heuristic_strategy_1, heuristic_strategy_2, heuristic_strategy_3};
pub use kpi::ScheduleKpi;
pub use list::build_schedule;
pub use orchestrator::{build_with_primary_then_heuristics, Scheduler};
pub use primary::primary_construct;

use crate::models::{Schedule, Task};

/// Frozen partial schedule handed from a stalled construction to the merge.
#[derive(Debug, Clone)]
pub(crate) struct Prefix<'a> {
    /// Engaged machines with their queues; the rest are idle.
    pub(crate) schedule: Schedule<'a>,
    /// Ids of the tasks the prefix covers.
    pub(crate) placed: HashSet<u32>,
}

/// Tasks sorted by (extreme time, id).
pub(crate) fn by_extreme_time(tasks: &[Task]) -> Vec<&Task> {
    let mut sorted: Vec<&Task> = tasks.iter().collect();
    sorted.sort_by_key(|t| (t.extreme_time(), t.id));
    sorted
}

/// Tasks sorted by (deadline, duration, id).
pub(crate) fn by_deadline(tasks: &[Task]) -> Vec<&Task> {
    let mut sorted: Vec<&Task> = tasks.iter().collect();
    sorted.sort_by_key(|t| (t.deadline, t.duration, t.id));
    sorted
}
