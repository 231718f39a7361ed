//! Exact branch-and-bound solver.
//!
//! Finds a schedule whose sorted start-time vector no feasible schedule
//! beats. Worst-case exponential in the number of tasks; callers that need
//! bounded latency must cap the instance size themselves.
//!
//! # Search
//!
//! - Decision order: descending deadline, so every queue is deadline-ordered.
//! - Seed: the list heuristic's assignment drives an initial dive that
//!   yields the first record.
//! - Symmetry: of several idle machines only the first is branched on.
//! - Pruning: a node is discarded once the record's vector is at least as
//!   good as its own.
//!
//! Decision chains are shared, reference-counted back-pointers instead of
//! recursion; a chain is freed as soon as no queued node reaches it, so
//! memory follows the live frontier.
//!
//! # Reference
//! - Brucker (2007), "Scheduling Algorithms", Ch. 5
//! - Land & Doig (1960), "An Automatic Method of Solving Discrete
//!   Programming Problems"

mod node;
mod solver;

pub use solver::{BnbStats, BranchAndBound};

use crate::models::{Machine, Schedule, Task};

/// Builds the optimal schedule with [`BranchAndBound`].
pub fn build_optimal_schedule<'a>(tasks: &'a [Task], machines: &'a [Machine]) -> Schedule<'a> {
    BranchAndBound::new(tasks, machines).solve()
}
