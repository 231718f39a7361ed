//! Fallback chain over every constructor.
//!
//! # Order
//!
//! 1. No tasks or no machines: all-idle schedule, optimal.
//! 2. Primary constructor; if it places every task the result is optimal.
//! 3. Completion pass (A1.1) from the primary prefix.
//! 4. Combinatorial refinement.
//! 5. Merge of A2.1, A2.1a, A2.2 and A2.3 (over the tasks the prefix left)
//!    with the primary prefix, else the refinement's last exact snapshot.
//!    The first successful merge is returned when certified; otherwise it
//!    competes in step 6.
//! 6. Best of the four full heuristics under the start-time comparator
//!    (earlier candidates win ties).

use log::debug;

use super::combinatorial::{self, refine};
use super::heuristics::{self, Strategy};
use super::merge::merge;
use super::primary::{self, complete, primary_prefix};
use super::{by_extreme_time, list, Prefix};
use crate::bnb;
use crate::config::SchedulerConfig;
use crate::error::Construction;
use crate::models::{is_improvement, Machine, Schedule, Task, Time};

/// Entry point holding the tuning parameters shared by the builders.
///
/// # Example
///
/// ```
/// use u_deadline::models::{Machine, Task};
/// use u_deadline::scheduler::Scheduler;
///
/// let tasks = vec![Task::unnamed(1, 10, 100), Task::unnamed(2, 20, 100)];
/// let machines = Machine::numbered(2);
///
/// let schedule = Scheduler::new().build(&tasks, &machines);
/// assert!(schedule.optimal);
/// assert_eq!(schedule.start_times(), vec![80, 90]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    config: SchedulerConfig,
}

impl Scheduler {
    /// Creates a scheduler with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a scheduler with the given configuration.
    pub fn with_config(config: SchedulerConfig) -> Self {
        Self { config }
    }

    /// The active configuration.
    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Latest-start list heuristic.
    pub fn build_schedule<'a>(&self, tasks: &'a [Task], machines: &'a [Machine]) -> Schedule<'a> {
        list::build_schedule(tasks, machines)
    }

    /// Exact branch-and-bound schedule.
    pub fn build_optimal_schedule<'a>(
        &self,
        tasks: &'a [Task],
        machines: &'a [Machine],
    ) -> Schedule<'a> {
        bnb::build_optimal_schedule(tasks, machines)
    }

    /// Primary constructor with the completion pass.
    pub fn primary_construct<'a>(
        &self,
        tasks: &'a [Task],
        machines: &'a [Machine],
    ) -> Construction<'a> {
        primary::primary_construct(tasks, machines)
    }

    /// Combinatorial refinement with the configured combination border.
    pub fn combinatorial_construct<'a>(
        &self,
        tasks: &'a [Task],
        machines: &'a [Machine],
    ) -> Construction<'a> {
        combinatorial::combinatorial_construct(tasks, self.config.combination_border, machines)
    }

    /// Strategy A2.1a with the configured adjustment border.
    pub fn heuristic_strategy_1<'a>(
        &self,
        tasks: &'a [Task],
        machines: &'a [Machine],
    ) -> Schedule<'a> {
        heuristics::heuristic_strategy_1(tasks, machines, Some(self.config.adjustment_border))
    }

    /// Strategy A2.2.
    pub fn heuristic_strategy_2<'a>(
        &self,
        tasks: &'a [Task],
        machines: &'a [Machine],
    ) -> Schedule<'a> {
        heuristics::heuristic_strategy_2(tasks, machines)
    }

    /// Strategy A2.3.
    pub fn heuristic_strategy_3<'a>(
        &self,
        tasks: &'a [Task],
        machines: &'a [Machine],
    ) -> Schedule<'a> {
        heuristics::heuristic_strategy_3(tasks, machines)
    }

    /// Runs the full fallback chain. Always returns a schedule; it is flagged
    /// optimal only when one of the certified constructors succeeded.
    pub fn build<'a>(&self, tasks: &'a [Task], machines: &'a [Machine]) -> Schedule<'a> {
        if tasks.is_empty() || machines.is_empty() {
            return Schedule::new(machines).with_optimal(true);
        }
        let sorted = by_extreme_time(tasks);

        let primary = match primary_prefix(&sorted, machines) {
            Ok(prefix) => {
                let rest = &sorted[prefix.placed.len()..];
                match complete(&prefix, rest) {
                    Ok(schedule) => {
                        debug!("primary construction certified {} tasks", tasks.len());
                        return schedule;
                    }
                    Err(reason) => {
                        debug!("completion pass failed: {reason}");
                        Some(prefix)
                    }
                }
            }
            Err(reason) => {
                debug!("primary construction failed: {reason}");
                None
            }
        };

        let snapshot = match refine(&sorted, machines, &self.config) {
            Ok(schedule) => {
                debug!("combinatorial refinement complete (optimal: {})", schedule.optimal);
                return schedule;
            }
            Err(stall) => {
                debug!("combinatorial refinement failed: {}", stall.reason);
                stall.snapshot
            }
        };

        let repertoire = Strategy::repertoire(self.config.adjustment_border);
        let prefix = primary.unwrap_or(snapshot);
        let merged = match self.merge_first(&prefix, &sorted, machines, &repertoire) {
            Some(schedule) if schedule.optimal => return schedule,
            other => other,
        };

        let candidates = repertoire
            .iter()
            .map(|strategy| {
                let schedule = strategy.run(&sorted, machines);
                debug!("{}: starts {:?}", strategy.label(), schedule.start_times());
                schedule
            })
            .chain(merged);

        let mut best: Option<Schedule<'a>> = None;
        for candidate in candidates {
            let better = best.as_ref().map_or(true, |incumbent| {
                is_improvement(&candidate.start_times(), &incumbent.start_times())
            });
            if better {
                best = Some(candidate);
            }
        }
        best.unwrap_or_else(|| Schedule::new(machines))
    }

    /// Merges each strategy's suffix with `prefix`; the first success wins.
    fn merge_first<'a>(
        &self,
        prefix: &Prefix<'a>,
        sorted: &[&'a Task],
        machines: &'a [Machine],
        repertoire: &[Strategy],
    ) -> Option<Schedule<'a>> {
        if prefix.placed.is_empty() {
            return None;
        }
        let rest: Vec<&'a Task> = sorted
            .iter()
            .copied()
            .filter(|t| !prefix.placed.contains(&t.id))
            .collect();

        for strategy in repertoire {
            match merge(prefix, strategy.run(&rest, machines)) {
                Ok(schedule) => {
                    debug!(
                        "{} merged with a prefix of {} tasks (optimal: {})",
                        strategy.label(),
                        prefix.placed.len(),
                        schedule.optimal
                    );
                    return Some(schedule);
                }
                Err(reason) => debug!("{} merge failed: {reason}", strategy.label()),
            }
        }
        None
    }
}

/// Runs the fallback chain with the default configuration, optionally
/// overriding the A2.1a adjustment border.
pub fn build_with_primary_then_heuristics<'a>(
    tasks: &'a [Task],
    machines: &'a [Machine],
    adjustment_border: Option<Time>,
) -> Schedule<'a> {
    let mut config = SchedulerConfig::default();
    if let Some(border) = adjustment_border {
        config = config.with_adjustment_border(border);
    }
    Scheduler::with_config(config).build(tasks, machines)
}
