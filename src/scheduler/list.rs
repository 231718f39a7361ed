//! Latest-start list scheduling.
//!
//! # Algorithm
//!
//! 1. Sort tasks by (deadline, duration).
//! 2. Walk the list from the latest deadline backwards. Machines are kept
//!    in an ordered set keyed by (start time, machine id).
//! 3. If some machine already starts at or after the task's deadline, the
//!    one with the smallest such start takes the task at its extreme time.
//! 4. Otherwise the latest-starting machine takes the longest pending task
//!    whose deadline it can still reach, shifting its start earlier by that
//!    duration.
//!
//! # Complexity
//! O(n² + n log m): the longest-task scan is linear in the pending tasks.
//!
//! # Reference
//! Pinedo (2016), "Scheduling", Ch. 5.1: list scheduling on parallel machines

use std::collections::BTreeSet;

use log::trace;

use super::by_deadline;
use crate::models::{Machine, Schedule, Task, Time, IDLE};

/// Builds a schedule with the latest-start list heuristic.
///
/// The result is sorted by start time (ties: machine id). It is never
/// flagged optimal.
pub fn build_schedule<'a>(tasks: &'a [Task], machines: &'a [Machine]) -> Schedule<'a> {
    let mut schedule = Schedule::new(machines);
    if tasks.is_empty() || machines.is_empty() {
        return schedule;
    }

    let mut pending = by_deadline(tasks);
    let mut starts: BTreeSet<(Time, u32, usize)> = machines
        .iter()
        .enumerate()
        .map(|(slot, m)| (IDLE, m.id, slot))
        .collect();

    while let Some(&current) = pending.last() {
        // Unreachable machine with the earliest start.
        if let Some(&key) = starts.range((current.deadline, 0, 0)..).next() {
            starts.remove(&key);
            let lane = &mut schedule.machines[key.2];
            lane.push_front(current);
            starts.insert((lane.start_time, key.1, key.2));
            pending.pop();
            trace!("list: task {} at extreme time on machine {}", current.id, key.1);
            continue;
        }

        let Some((latest_start, id, slot)) = starts.pop_last() else {
            break;
        };

        let mut pick = pending.len() - 1;
        for (idx, task) in pending.iter().enumerate().rev() {
            if task.deadline >= latest_start && task.duration > pending[pick].duration {
                pick = idx;
            }
        }

        let task = pending.remove(pick);
        let lane = &mut schedule.machines[slot];
        lane.push_front(task);
        starts.insert((lane.start_time, id, slot));
        trace!("list: longest task {} shifts machine {id}", task.id);
    }

    schedule.sort_by_start();
    schedule
}
