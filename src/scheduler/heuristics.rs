//! Heuristic repertoire (A2.1, A2.1a, A2.2, A2.3).
//!
//! Every strategy works on tasks sorted by extreme time, ends with the
//! shared repair pass and settles each machine to its latest feasible
//! start. The results are never flagged optimal.
//!
//! | Strategy | Rule |
//! |----------|------|
//! | A2.1 | Rounds: reachable tasks, shortest first, to the latest compatible free machine |
//! | A2.1a | A2.1 plus a repair pass whenever the start spread exceeds a border |
//! | A2.2 | Latest-start machine takes the shortest reachable task |
//! | A2.3 | Forward build; full machines accept the task where the start vector is best |

use std::collections::BTreeSet;

use log::trace;

use super::by_extreme_time;
use super::repair::adjust_start_times;
use crate::models::{is_improvement, Machine, Schedule, Task, Time};

/// Strategy A2.1, or A2.1a when `adjustment_border` is given.
pub fn heuristic_strategy_1<'a>(
    tasks: &'a [Task],
    machines: &'a [Machine],
    adjustment_border: Option<Time>,
) -> Schedule<'a> {
    let strategy = match adjustment_border {
        Some(border) => Strategy::AdjustedRounds(border),
        None => Strategy::Rounds,
    };
    strategy.run(&by_extreme_time(tasks), machines)
}

/// Strategy A2.2: the latest-start machine takes the shortest task it can
/// still reach.
pub fn heuristic_strategy_2<'a>(tasks: &'a [Task], machines: &'a [Machine]) -> Schedule<'a> {
    Strategy::LatestMachine.run(&by_extreme_time(tasks), machines)
}

/// Strategy A2.3: forward build that picks the best start vector once every
/// machine is engaged.
pub fn heuristic_strategy_3<'a>(tasks: &'a [Task], machines: &'a [Machine]) -> Schedule<'a> {
    Strategy::BestVector.run(&by_extreme_time(tasks), machines)
}

/// One heuristic construction rule.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Strategy {
    /// Rounds of shortest-first assignment.
    Rounds,
    /// [`Strategy::Rounds`] with mid-construction repair above the border.
    AdjustedRounds(Time),
    /// Always extends the latest-start machine.
    LatestMachine,
    /// Forward build choosing the best start vector.
    BestVector,
}

impl Strategy {
    /// The four strategies in the order the orchestrator tries them.
    pub(crate) fn repertoire(adjustment_border: Time) -> [Strategy; 4] {
        [
            Strategy::Rounds,
            Strategy::AdjustedRounds(adjustment_border),
            Strategy::LatestMachine,
            Strategy::BestVector,
        ]
    }

    /// Short label used in log lines.
    pub(crate) fn label(&self) -> &'static str {
        match self {
            Strategy::Rounds => "A2.1",
            Strategy::AdjustedRounds(_) => "A2.1a",
            Strategy::LatestMachine => "A2.2",
            Strategy::BestVector => "A2.3",
        }
    }

    /// Builds a schedule for `tasks` (sorted by extreme time).
    pub(crate) fn run<'a>(&self, tasks: &[&'a Task], machines: &'a [Machine]) -> Schedule<'a> {
        if tasks.is_empty() || machines.is_empty() {
            return Schedule::new(machines);
        }
        let mut schedule = match *self {
            Strategy::Rounds => rounds(tasks, machines, None),
            Strategy::AdjustedRounds(border) => rounds(tasks, machines, Some(border)),
            Strategy::LatestMachine => latest_machine(tasks, machines),
            Strategy::BestVector => best_vector(tasks, machines),
        };
        finish(&mut schedule);
        schedule
    }
}

/// Repairs, settles and sorts a completed heuristic schedule.
fn finish(schedule: &mut Schedule<'_>) {
    for lane in &mut schedule.machines {
        lane.settle();
    }
    adjust_start_times(schedule);
    for lane in &mut schedule.machines {
        lane.settle();
    }
    schedule.sort_by_start();
}

/// Each machine takes the pending task with the latest extreme time and
/// starts at that extreme time.
fn initial_appointment<'a>(pending: &mut Vec<&'a Task>, machines: &'a [Machine]) -> Schedule<'a> {
    let mut schedule = Schedule::new(machines);
    for lane in &mut schedule.machines {
        let Some(task) = pending.pop() else {
            break;
        };
        lane.push_front(task);
    }
    schedule
}

/// Sorts by deadline descending, then duration ascending.
fn by_deadline_desc(pending: &mut [&Task]) {
    pending.sort_by(|a, b| {
        b.deadline
            .cmp(&a.deadline)
            .then(a.duration.cmp(&b.duration))
            .then(a.id.cmp(&b.id))
    });
}

fn take(pending: &mut Vec<&Task>, task: &Task) {
    if let Some(pos) = pending.iter().position(|t| std::ptr::eq(*t, task)) {
        pending.remove(pos);
    }
}

/// Start spread over engaged machines.
fn spread(schedule: &Schedule<'_>) -> Time {
    let starts = schedule
        .machines
        .iter()
        .filter(|m| !m.is_idle())
        .map(|m| m.start_time);
    let (lo, hi) = starts.fold((Time::MAX, Time::MIN), |(lo, hi), s| (lo.min(s), hi.max(s)));
    if lo > hi {
        0
    } else {
        hi - lo
    }
}

/// A2.1 and, with a border, A2.1a.
fn rounds<'a>(tasks: &[&'a Task], machines: &'a [Machine], border: Option<Time>) -> Schedule<'a> {
    let mut pending = tasks.to_vec();
    let mut schedule = initial_appointment(&mut pending, machines);
    by_deadline_desc(&mut pending);

    while !pending.is_empty() {
        // Pending is deadline-descending: stop at the first unreachable task.
        let mut reachable: Vec<&Task> = pending
            .iter()
            .copied()
            .take_while(|t| schedule.machines.iter().any(|m| m.start_time <= t.deadline))
            .collect();
        reachable.sort_by(|a, b| {
            a.duration
                .cmp(&b.duration)
                .then(b.deadline.cmp(&a.deadline))
                .then(a.id.cmp(&b.id))
        });

        let mut free: Vec<usize> = (0..schedule.len()).collect();
        for task in reachable {
            if free.is_empty() {
                break;
            }
            let mut best: Option<usize> = None;
            for (pos, &slot) in free.iter().enumerate() {
                let start = schedule.machines[slot].start_time;
                if start <= task.deadline
                    && best.map_or(true, |b| schedule.machines[free[b]].start_time < start)
                {
                    best = Some(pos);
                }
            }
            if let Some(pos) = best {
                let slot = free.remove(pos);
                schedule.machines[slot].push_front(task);
                take(&mut pending, task);
            }
        }

        // Machines left without a task this round take the next one anyway.
        for slot in free {
            if pending.is_empty() {
                break;
            }
            let task = pending.remove(0);
            trace!("A2.1: task {} forced onto slot {slot}", task.id);
            schedule.machines[slot].push_front(task);
        }

        if let Some(border) = border {
            if spread(&schedule) > border {
                trace!("A2.1a: spread above {border}, repairing");
                adjust_start_times(&mut schedule);
            }
        }
    }
    schedule
}

/// A2.2.
fn latest_machine<'a>(tasks: &[&'a Task], machines: &'a [Machine]) -> Schedule<'a> {
    let mut pending = tasks.to_vec();
    let mut schedule = initial_appointment(&mut pending, machines);
    by_deadline_desc(&mut pending);

    let mut starts: BTreeSet<(Time, u32, usize)> = schedule
        .machines
        .iter()
        .enumerate()
        .map(|(slot, m)| (m.start_time, m.machine.id, slot))
        .collect();

    while !pending.is_empty() {
        let Some((latest, id, slot)) = starts.pop_last() else {
            break;
        };

        let mut best: Option<usize> = None;
        for (idx, task) in pending.iter().enumerate() {
            if latest > task.deadline {
                break;
            }
            if best.map_or(true, |b| task.duration < pending[b].duration) {
                best = Some(idx);
            }
        }
        let idx = best.unwrap_or_else(|| {
            pending.iter().enumerate().fold(0, |b, (i, t)| {
                if t.extreme_time() > pending[b].extreme_time() {
                    i
                } else {
                    b
                }
            })
        });

        let task = pending.remove(idx);
        if best.is_none() {
            trace!("A2.2: task {} forced onto machine {id}", task.id);
        }
        let lane = &mut schedule.machines[slot];
        lane.push_front(task);
        starts.insert((lane.start_time, id, slot));
    }
    schedule
}

/// A2.3.
fn best_vector<'a>(tasks: &[&'a Task], machines: &'a [Machine]) -> Schedule<'a> {
    let mut schedule = Schedule::new(machines);
    let Some((&first, rest)) = tasks.split_first() else {
        return schedule;
    };

    let mut ends: BTreeSet<(Time, u32, usize)> = BTreeSet::new();
    schedule.machines[0].push_front(first);
    ends.insert((first.deadline, schedule.machines[0].machine.id, 0));
    let mut engaged = 1;

    for &task in rest {
        let Some(&min) = ends.first() else {
            break;
        };
        let extreme = task.extreme_time();

        if min.0 <= extreme {
            ends.remove(&min);
            let (end, id, slot) = min;
            schedule.machines[slot].push_back(task);
            ends.insert((end + task.duration, id, slot));
            continue;
        }

        if engaged < schedule.len() {
            let lane = &mut schedule.machines[engaged];
            lane.push_front(task);
            ends.insert((task.deadline, lane.machine.id, engaged));
            engaged += 1;
            continue;
        }

        // Every machine is engaged: shift one of them earlier so that it
        // ends at the task's extreme time, choosing the best start vector.
        let lanes: Vec<(Time, u32, usize)> = ends.iter().copied().collect();
        let base: Vec<Time> = lanes
            .iter()
            .map(|&(_, _, slot)| schedule.machines[slot].start_time)
            .collect();
        let mut best: Option<(usize, Vec<Time>)> = None;
        for (k, &(end, _, _)) in lanes.iter().enumerate() {
            let mut candidate = base.clone();
            candidate[k] += extreme - end;
            if best
                .as_ref()
                .map_or(true, |(_, incumbent)| is_improvement(&candidate, incumbent))
            {
                best = Some((k, candidate));
            }
        }
        let Some((k, _)) = best else {
            continue;
        };

        let key = lanes[k];
        let (end, id, slot) = key;
        ends.remove(&key);
        let lane = &mut schedule.machines[slot];
        lane.start_time += extreme - end;
        lane.push_back(task);
        ends.insert((task.deadline, id, slot));
        trace!("A2.3: task {} shifts machine {id} by {}", task.id, end - extreme);
    }
    schedule
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_strategies() -> [Strategy; 4] {
        Strategy::repertoire(50)
    }

    fn sample() -> Vec<Task> {
        vec![
            Task::unnamed(1, 30, 100),
            Task::unnamed(2, 20, 100),
            Task::unnamed(3, 10, 60),
            Task::unnamed(4, 40, 150),
            Task::unnamed(5, 15, 90),
        ]
    }

    #[test]
    fn test_every_strategy_is_feasible_and_complete() {
        let tasks = sample();
        let machines = Machine::numbered(2);
        let sorted = by_extreme_time(&tasks);
        for strategy in all_strategies() {
            let s = strategy.run(&sorted, &machines);
            assert_eq!(s.task_count(), tasks.len(), "{}", strategy.label());
            assert!(s.is_feasible(), "{}", strategy.label());
            assert!(!s.optimal);
            for lane in &s.machines {
                assert_eq!(lane.start_time, lane.latest_start());
            }
        }
    }

    #[test]
    fn test_initial_appointment_takes_tail() {
        let tasks = sample();
        let machines = Machine::numbered(2);
        let mut pending = by_extreme_time(&tasks);
        let s = initial_appointment(&mut pending, &machines);
        // Extreme times: 70, 80, 50, 110, 75 -> tail is task 4 then task 2.
        assert_eq!(s.machines[0].tasks[0].id, 4);
        assert_eq!(s.machines[0].start_time, 110);
        assert_eq!(s.machines[1].tasks[0].id, 2);
        assert_eq!(pending.len(), 3);
    }

    #[test]
    fn test_single_machine_chain() {
        let tasks = vec![Task::unnamed(1, 5, 100), Task::unnamed(2, 5, 200)];
        let machines = Machine::numbered(1);
        let sorted = by_extreme_time(&tasks);
        for strategy in all_strategies() {
            let s = strategy.run(&sorted, &machines);
            // Task 1 must end by 100, so the pair starts at 95.
            assert_eq!(s.start_times(), vec![95], "{}", strategy.label());
        }
    }

    #[test]
    fn test_more_machines_than_tasks() {
        let tasks = vec![Task::unnamed(1, 10, 100)];
        let machines = Machine::numbered(3);
        let sorted = by_extreme_time(&tasks);
        for strategy in all_strategies() {
            let s = strategy.run(&sorted, &machines);
            assert_eq!(s.engaged_count(), 1);
            assert_eq!(s.machines[0].start_time, 90);
        }
    }

    #[test]
    fn test_spread_ignores_idle() {
        let tasks = vec![Task::unnamed(1, 10, 100), Task::unnamed(2, 10, 50)];
        let machines = Machine::numbered(3);
        let mut s = Schedule::new(&machines);
        assert_eq!(spread(&s), 0);
        s.machines[0].push_front(&tasks[0]);
        s.machines[1].push_front(&tasks[1]);
        assert_eq!(spread(&s), 50);
    }

    #[test]
    fn test_public_entry_points() {
        let tasks = sample();
        let machines = Machine::numbered(2);
        let schedules = [
            heuristic_strategy_1(&tasks, &machines, None),
            heuristic_strategy_1(&tasks, &machines, Some(10)),
            heuristic_strategy_2(&tasks, &machines),
            heuristic_strategy_3(&tasks, &machines),
        ];
        for s in &schedules {
            assert_eq!(s.task_count(), 5);
            assert!(s.is_feasible());
            let starts = s.start_times();
            assert!(starts.windows(2).all(|w| w[0] <= w[1]));
        }
    }

    #[test]
    fn test_empty_input() {
        let machines = Machine::numbered(2);
        for strategy in all_strategies() {
            let s = strategy.run(&[], &machines);
            assert_eq!(s.task_count(), 0);
            assert_eq!(s.len(), 2);
        }
    }
}
