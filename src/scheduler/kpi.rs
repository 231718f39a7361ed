//! Schedule quality metrics (KPIs).
//!
//! Computes report figures from a completed schedule. The objective itself
//! is the sorted start-time vector; these numbers summarize it for
//! collaborators that render timelines and reports.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Engaged / idle machines | Machines with / without tasks |
//! | Earliest start | Smallest start of an engaged machine |
//! | Latest start | Largest start of an engaged machine |
//! | Start spread | Latest start - earliest start |
//! | Minimum slack | Smallest deadline - completion over all tasks |
//! | Total slack | Sum of deadline - completion over all tasks |
//! | Deadline misses | Tasks completing after their deadline |
//!
//! # Reference
//! Pinedo (2016), "Scheduling", Ch. 1.2: Performance Measures

use serde::{Deserialize, Serialize};

use crate::models::{Schedule, Time};

/// Schedule performance indicators.
///
/// All time values are in ticks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleKpi {
    /// Machines with at least one task.
    pub engaged_machines: usize,
    /// Machines without tasks.
    pub idle_machines: usize,
    /// Earliest start of an engaged machine.
    pub earliest_start: Option<Time>,
    /// Latest start of an engaged machine.
    pub latest_start: Option<Time>,
    /// Latest start minus earliest start (0 when nothing is engaged).
    pub start_spread: Time,
    /// Smallest deadline slack of any task.
    pub min_slack: Option<Time>,
    /// Sum of deadline slack over all tasks.
    pub total_slack: Time,
    /// Tasks completing after their deadline.
    pub deadline_misses: usize,
}

impl ScheduleKpi {
    /// Computes KPIs from a schedule.
    pub fn calculate(schedule: &Schedule<'_>) -> Self {
        let engaged: Vec<Time> = schedule
            .machines
            .iter()
            .filter(|m| !m.is_idle())
            .map(|m| m.start_time)
            .collect();

        let earliest_start = engaged.iter().copied().min();
        let latest_start = engaged.iter().copied().max();
        let start_spread = match (earliest_start, latest_start) {
            (Some(lo), Some(hi)) => hi - lo,
            _ => 0,
        };

        let mut min_slack: Option<Time> = None;
        let mut total_slack: Time = 0;
        let mut deadline_misses = 0;
        for lane in &schedule.machines {
            for (task, end) in lane.completions() {
                let slack = task.deadline - end;
                total_slack += slack;
                min_slack = Some(min_slack.map_or(slack, |m| m.min(slack)));
                if slack < 0 {
                    deadline_misses += 1;
                }
            }
        }

        Self {
            engaged_machines: engaged.len(),
            idle_machines: schedule.len() - engaged.len(),
            earliest_start,
            latest_start,
            start_spread,
            min_slack,
            total_slack,
            deadline_misses,
        }
    }

    /// Whether every task meets its deadline.
    pub fn is_on_time(&self) -> bool {
        self.deadline_misses == 0
    }

    /// Whether the schedule meets the given quality thresholds.
    pub fn meets_thresholds(&self, not_before: Time, max_spread: Time) -> bool {
        self.is_on_time()
            && self.earliest_start.map_or(true, |s| s >= not_before)
            && self.start_spread <= max_spread
    }
}
