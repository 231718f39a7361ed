//! Merge of a frozen prefix with a heuristic suffix.
//!
//! The prefix is the certified part of a construction that could not be
//! completed: per machine a queue ending at some time `E_k`. The suffix is
//! a heuristic schedule over the remaining tasks. Machines are paired by
//! position (suffix sorted by start, prefix sorted by end with idle machines
//! first) and the suffix is made to start no earlier than the paired prefix
//! end by evicting head tasks to other machines.

use log::{debug, trace};

use super::Prefix;
use crate::error::{Construction, Infeasible};
use crate::models::{MachineSchedule, Schedule, Time};

/// Merges `prefix` with `suffix`, which must cover the tasks the prefix did
/// not place on the same machine set.
///
/// The result is flagged optimal iff every machine was engaged in the
/// prefix.
pub(crate) fn merge<'a>(prefix: &Prefix<'a>, mut suffix: Schedule<'a>) -> Construction<'a> {
    let mut frozen: Vec<&MachineSchedule<'a>> = prefix.schedule.machines.iter().collect();
    frozen.sort_by_key(|m| (m.end_time(), m.machine.id));
    suffix.sort_by_start();
    debug_assert_eq!(frozen.len(), suffix.len());

    let bounds: Vec<Option<Time>> = frozen.iter().map(|m| m.end_time()).collect();

    let mut delayed: Vec<(Time, usize)> = bounds
        .iter()
        .enumerate()
        .filter_map(|(k, bound)| {
            let delay = bound.map(|end| end.saturating_sub(suffix.machines[k].start_time))?;
            (delay > 0).then_some((delay, k))
        })
        .collect();
    delayed.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));

    for &(delay, k) in &delayed {
        let Some(bound) = bounds[k] else {
            continue;
        };
        trace!("merge: position {k} is {delay} ahead of its prefix end");

        while suffix.machines[k].start_time < bound {
            let Some(task) = suffix.machines[k].pop_front() else {
                break;
            };

            let mut host: Option<(Time, usize)> = None;
            for (h, lane) in suffix.machines.iter().enumerate() {
                if h == k {
                    continue;
                }
                let new_start = task.start_before(lane.start_time);
                let gap = match bounds[h] {
                    Some(end) if new_start < end => continue,
                    Some(end) => new_start - end,
                    None => Time::MAX,
                };
                if host.map_or(true, |(best, _)| gap < best) {
                    host = Some((gap, h));
                }
            }

            let Some((_, h)) = host else {
                debug!("merge: no host for task {}", task.id);
                return Err(Infeasible::MergeConflict {
                    machine_id: frozen[k].machine.id,
                });
            };
            suffix.machines[h].push_front(task);
        }
    }

    let optimal = bounds.iter().all(Option::is_some);
    let machines = frozen
        .iter()
        .zip(suffix.machines)
        .map(|(head, tail)| {
            let start = if head.is_idle() {
                tail.start_time
            } else {
                head.start_time
            };
            let tasks = head.tasks.iter().copied().chain(tail.tasks).collect();
            MachineSchedule::with_tasks(head.machine, start, tasks)
        })
        .collect();

    let mut merged = Schedule::from_machine_schedules(machines).with_optimal(optimal);
    merged.sort_by_start();
    Ok(merged)
}
