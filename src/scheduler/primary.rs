//! Primary constructor and completion pass (A1.1).
//!
//! # Algorithm
//!
//! Tasks are taken in ascending extreme-time order and appended to
//! machines running forward from their start:
//!
//! 1. Machine 0 is engaged with the first task (start = extreme time).
//! 2. For every later task, while an idle machine remains:
//!    - if some task already queued keeps slack ≥ the new task's duration,
//!      the build cannot be certified and aborts;
//!    - if the minimum-end machine cannot take the task before its extreme
//!      time, the next idle machine is engaged at the task's extreme time;
//!    - if it can, and a second engaged machine could too, the choice is
//!      ambiguous and the build aborts; otherwise the task is appended.
//! 3. Once every machine is engaged, the completion pass appends each
//!    remaining task to the minimum-end machine, aborting on the first
//!    deadline miss.
//!
//! A build that places every task this way is certified optimal: every
//! machine start equals the extreme time of a task that no engaged machine
//! could absorb.

use std::collections::{BTreeSet, HashSet};

use log::{debug, trace};

use super::{by_extreme_time, Prefix};
use crate::error::{Construction, Infeasible};
use crate::models::{Machine, Schedule, Task, Time};

/// Engaged machines keyed by (running end, machine id, slot).
type EndSet = BTreeSet<(Time, u32, usize)>;

/// Runs the primary construction over `tasks` (sorted by extreme time).
///
/// Returns the frozen prefix: every machine engaged so far with its queue.
/// The prefix covers `tasks[..prefix.placed.len()]`.
pub(crate) fn primary_prefix<'a>(
    tasks: &[&'a Task],
    machines: &'a [Machine],
) -> Result<Prefix<'a>, Infeasible> {
    let mut schedule = Schedule::new(machines);
    let mut ends = EndSet::new();
    let mut placed = HashSet::new();

    let Some(&first) = tasks.first() else {
        return Ok(Prefix { schedule, placed });
    };
    if machines.is_empty() {
        return Ok(Prefix { schedule, placed });
    }

    engage(&mut schedule, &mut ends, 0, first);
    placed.insert(first.id);
    let mut engaged = 1;

    for &task in &tasks[1..] {
        if engaged >= machines.len() {
            break;
        }

        // Check d_i - C_i < l_p for every queued task.
        for &(_, _, slot) in &ends {
            let lane = &schedule.machines[slot];
            if lane
                .completions()
                .any(|(queued, end)| queued.deadline - end >= task.duration)
            {
                trace!("primary: task {} leaves slack on slot {slot}", task.id);
                return Err(Infeasible::SlackExhausted { task_id: task.id });
            }
        }

        match ends.first().copied() {
            Some(min) if min.0 <= task.extreme_time() => {
                ends.remove(&min);
                if let Some(&(next_end, _, _)) = ends.first() {
                    if next_end <= task.extreme_time() {
                        trace!("primary: task {} fits two machines", task.id);
                        return Err(Infeasible::AmbiguousPlacement { task_id: task.id });
                    }
                }
                let (end, id, slot) = min;
                schedule.machines[slot].push_back(task);
                ends.insert((end + task.duration, id, slot));
            }
            _ => {
                engage(&mut schedule, &mut ends, engaged, task);
                engaged += 1;
            }
        }
        placed.insert(task.id);
    }

    debug!(
        "primary: placed {} of {} tasks on {engaged} machines",
        placed.len(),
        tasks.len()
    );
    Ok(Prefix { schedule, placed })
}

/// Engages the idle machine at `slot` with `task`.
fn engage<'a>(schedule: &mut Schedule<'a>, ends: &mut EndSet, slot: usize, task: &'a Task) {
    let lane = &mut schedule.machines[slot];
    lane.push_front(task);
    ends.insert((task.deadline, lane.machine.id, slot));
}

/// Completion pass A1.1: appends `rest` (sorted by extreme time) to the
/// minimum-end engaged machine of `prefix`.
pub(crate) fn complete<'a>(prefix: &Prefix<'a>, rest: &[&'a Task]) -> Construction<'a> {
    let mut schedule = prefix.schedule.clone();
    let mut ends: EndSet = schedule
        .machines
        .iter()
        .enumerate()
        .filter_map(|(slot, m)| m.end_time().map(|end| (end, m.machine.id, slot)))
        .collect();

    for &task in rest {
        let Some(min) = ends.pop_first() else {
            return Err(Infeasible::NoIdleMachine { task_id: task.id });
        };
        let (end, id, slot) = min;
        let new_end = end + task.duration;
        if new_end > task.deadline {
            trace!("A1.1: task {} misses its deadline by {}", task.id, new_end - task.deadline);
            return Err(Infeasible::CompletionDeadlineMiss { task_id: task.id });
        }
        schedule.machines[slot].push_back(task);
        ends.insert((new_end, id, slot));
    }

    schedule.sort_by_start();
    Ok(schedule.with_optimal(true))
}

/// Primary construction followed by the completion pass.
///
/// Returns a certified-optimal schedule, or [`Infeasible`] when the greedy
/// build cannot be certified.
pub fn primary_construct<'a>(tasks: &'a [Task], machines: &'a [Machine]) -> Construction<'a> {
    if tasks.is_empty() || machines.is_empty() {
        return Ok(Schedule::new(machines).with_optimal(true));
    }

    let sorted = by_extreme_time(tasks);
    let prefix = primary_prefix(&sorted, machines)?;
    let rest = &sorted[prefix.placed.len()..];
    complete(&prefix, rest)
}
