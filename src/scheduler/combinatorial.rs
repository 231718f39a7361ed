//! Combinatorial refinement.
//!
//! # Algorithm
//!
//! Tasks are taken in ascending extreme-time order. Engaged machines keep the
//! start fixed at engagement; a task may be inserted at any position whose
//! followers all have a deadline at or after its own, provided the task and
//! every shifted follower still meet their deadlines. Per machine the
//! insertion with the largest minimum slack is kept.
//!
//! - One machine qualifies: the task is committed there.
//! - Several qualify: the task is *suspected* and deferred with its
//!   candidate machines.
//! - None qualifies: outstanding suspects are resolved first, then an idle
//!   machine is engaged at the task's extreme time.
//!
//! Suspects are resolved by
//!
//! 1. a pseudo-placement that spreads every suspect evenly over its
//!    candidates and tests joint feasibility, followed by a greedy commit
//!    (the result is no longer certified);
//! 2. if few enough suspects remain, an exhaustive enumeration of their
//!    machine choices, replayed from the last exact snapshot; the first
//!    feasible combination is taken.
//!
//! The result is certified optimal only when no task was ever suspected.
//!
//! A state is *exact* when no task is suspected, every engaged machine's
//! trailing task ends strictly before its deadline, and no trailing task
//! could be appended to another engaged machine.

use std::collections::HashSet;

use log::{debug, trace};

use super::{by_extreme_time, Prefix};
use crate::config::SchedulerConfig;
use crate::error::{Construction, Infeasible};
use crate::models::{Machine, MachineSchedule, Schedule, Task, Time};

/// Runs the combinatorial refinement.
///
/// `combination_border` caps the number of suspects resolved by
/// enumeration at `floor(combination_border * engaged machines)`.
pub fn combinatorial_construct<'a>(
    tasks: &'a [Task],
    combination_border: f64,
    machines: &'a [Machine],
) -> Construction<'a> {
    if tasks.is_empty() || machines.is_empty() {
        return Ok(Schedule::new(machines).with_optimal(true));
    }
    let config = SchedulerConfig::new().with_combination_border(combination_border);
    refine(&by_extreme_time(tasks), machines, &config).map_err(|stall| stall.reason)
}

/// A refinement that gave up, with the last exact state reached.
#[derive(Debug)]
pub(crate) struct Stall<'a> {
    pub(crate) reason: Infeasible,
    pub(crate) snapshot: Prefix<'a>,
}

/// Runs the refinement over `tasks` (sorted by extreme time).
pub(crate) fn refine<'a>(
    tasks: &[&'a Task],
    machines: &'a [Machine],
    config: &SchedulerConfig,
) -> Result<Schedule<'a>, Stall<'a>> {
    let mut refiner = Refiner::new(machines, config);
    for &task in tasks {
        if let Err(reason) = refiner.place(task) {
            return Err(refiner.stall(reason));
        }
    }
    refiner.finish()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Placement {
    slot: usize,
    position: usize,
    slack: Time,
}

#[derive(Debug, Clone)]
struct Suspect<'a> {
    task: &'a Task,
    candidates: Vec<usize>,
}

/// A decision taken since the last exact snapshot.
#[derive(Debug, Clone, Copy)]
enum Step<'a> {
    Engage(&'a Task),
    Commit(&'a Task),
    Suspect(&'a Task),
}

/// Engaged machines occupy slots `0..engaged`.
#[derive(Debug, Clone)]
struct State<'a> {
    schedule: Schedule<'a>,
    engaged: usize,
    placed: HashSet<u32>,
}

impl<'a> State<'a> {
    fn new(machines: &'a [Machine]) -> Self {
        Self {
            schedule: Schedule::new(machines),
            engaged: 0,
            placed: HashSet::new(),
        }
    }

    fn lanes(&self) -> &[MachineSchedule<'a>] {
        &self.schedule.machines[..self.engaged]
    }

    /// Engages the next idle machine at the task's extreme time.
    fn engage(&mut self, task: &'a Task) -> bool {
        let Some(lane) = self.schedule.machines.get_mut(self.engaged) else {
            return false;
        };
        lane.push_front(task);
        self.engaged += 1;
        self.placed.insert(task.id);
        true
    }

    fn commit(&mut self, task: &'a Task, placement: Placement) {
        self.schedule.machines[placement.slot]
            .tasks
            .insert(placement.position, task);
        self.placed.insert(task.id);
    }

    /// Best insertion on `slot`, if any.
    fn best_in(&self, slot: usize, task: &Task) -> Option<Placement> {
        let lane = &self.schedule.machines[slot];
        let mut best: Option<Placement> = None;
        for position in (0..=lane.tasks.len()).rev() {
            if position < lane.tasks.len() && lane.tasks[position].deadline < task.deadline {
                break;
            }
            if let Some(slack) = insertion_slack(lane, position, task) {
                if best.map_or(true, |b| slack > b.slack) {
                    best = Some(Placement {
                        slot,
                        position,
                        slack,
                    });
                }
            }
        }
        best
    }

    /// Best insertion per engaged machine.
    fn placements(&self, task: &Task) -> Vec<Placement> {
        (0..self.engaged)
            .filter_map(|slot| self.best_in(slot, task))
            .collect()
    }

    /// Largest-slack insertion over all engaged machines.
    fn best_placement(&self, task: &Task) -> Option<Placement> {
        self.placements(task)
            .into_iter()
            .fold(None, |best: Option<Placement>, p| match best {
                Some(b) if b.slack >= p.slack => Some(b),
                _ => Some(p),
            })
    }

    fn is_exact(&self) -> bool {
        let lanes = self.lanes();
        for (i, lane) in lanes.iter().enumerate() {
            let (Some(&last), Some(end)) = (lane.tasks.back(), lane.end_time()) else {
                continue;
            };
            if last.deadline <= end {
                return false;
            }
            let movable = lanes.iter().enumerate().any(|(j, other)| {
                j != i
                    && other
                        .end_time()
                        .is_some_and(|other_end| other_end + last.duration <= last.deadline)
            });
            if movable {
                return false;
            }
        }
        true
    }

    fn into_prefix(self) -> Prefix<'a> {
        Prefix {
            schedule: self.schedule,
            placed: self.placed,
        }
    }
}

/// Minimum slack of `task` inserted at `position` and of every task it
/// shifts, or `None` if one of them misses its deadline.
fn insertion_slack(lane: &MachineSchedule<'_>, position: usize, task: &Task) -> Option<Time> {
    let order = lane
        .tasks
        .iter()
        .copied()
        .take(position)
        .chain(std::iter::once(task))
        .chain(lane.tasks.iter().copied().skip(position));

    let mut clock = lane.start_time;
    let mut slack = Time::MAX;
    for (idx, t) in order.enumerate() {
        clock += t.duration;
        if idx >= position {
            let s = t.deadline - clock;
            if s < 0 {
                return None;
            }
            slack = slack.min(s);
        }
    }
    Some(slack)
}

struct Refiner<'a, 'c> {
    state: State<'a>,
    snapshot: State<'a>,
    journal: Vec<Step<'a>>,
    suspects: Vec<Suspect<'a>>,
    certified: bool,
    config: &'c SchedulerConfig,
}

impl<'a, 'c> Refiner<'a, 'c> {
    fn new(machines: &'a [Machine], config: &'c SchedulerConfig) -> Self {
        let state = State::new(machines);
        Self {
            snapshot: state.clone(),
            state,
            journal: Vec::new(),
            suspects: Vec::new(),
            certified: true,
            config,
        }
    }

    fn place(&mut self, task: &'a Task) -> Result<(), Infeasible> {
        if self.assign(task) {
            return Ok(());
        }
        if !self.suspects.is_empty() && self.resolve() && self.assign(task) {
            return Ok(());
        }
        if self.state.engage(task) {
            trace!("combinatorial: task {} engages slot {}", task.id, self.state.engaged - 1);
            self.journal.push(Step::Engage(task));
            self.refresh();
            return Ok(());
        }
        if self.suspects.is_empty() {
            Err(Infeasible::NoIdleMachine { task_id: task.id })
        } else {
            Err(Infeasible::UnresolvedSuspects {
                count: self.suspects.len(),
            })
        }
    }

    /// Commits or suspects `task`; `false` when no engaged machine fits.
    fn assign(&mut self, task: &'a Task) -> bool {
        let placements = self.state.placements(task);
        match placements.as_slice() {
            [] => false,
            [only] => {
                self.state.commit(task, *only);
                self.journal.push(Step::Commit(task));
                self.refresh();
                true
            }
            _ => {
                trace!(
                    "combinatorial: task {} suspected on {} machines",
                    task.id,
                    placements.len()
                );
                self.suspects.push(Suspect {
                    task,
                    candidates: placements.iter().map(|p| p.slot).collect(),
                });
                self.journal.push(Step::Suspect(task));
                true
            }
        }
    }

    fn refresh(&mut self) {
        if self.suspects.is_empty() && self.state.is_exact() {
            self.snapshot = self.state.clone();
            self.journal.clear();
        }
    }

    fn resolve(&mut self) -> bool {
        if self.pseudo_place() {
            debug!(
                "combinatorial: {} suspects resolved by pseudo-placement",
                self.suspects.len()
            );
            self.certified = false;
        } else if self.suspects.len() <= self.config.combination_limit(self.state.engaged) {
            let Some(state) = self.enumerate() else {
                return false;
            };
            debug!(
                "combinatorial: {} suspects resolved by enumeration",
                self.suspects.len()
            );
            // The first feasible combination is kept, not the best one.
            self.certified = false;
            self.state = state;
        } else {
            return false;
        }

        self.suspects.clear();
        for step in &mut self.journal {
            if let Step::Suspect(task) = *step {
                *step = Step::Commit(task);
            }
        }
        self.refresh();
        true
    }

    /// Fractional joint-feasibility test, then greedy commit by slack.
    fn pseudo_place(&mut self) -> bool {
        let mut sets = Vec::with_capacity(self.suspects.len());
        for suspect in &self.suspects {
            let slots: Vec<usize> = self
                .state
                .placements(suspect.task)
                .iter()
                .map(|p| p.slot)
                .collect();
            if slots.is_empty() {
                return false;
            }
            sets.push(slots);
        }

        let mut load = vec![0.0_f64; self.state.schedule.len()];
        for (suspect, slots) in self.suspects.iter().zip(&sets) {
            let share = suspect.task.duration as f64 / slots.len() as f64;
            for &slot in slots {
                load[slot] += share;
            }
        }
        for (suspect, slots) in self.suspects.iter().zip(&sets) {
            for &slot in slots {
                let lane = &self.state.schedule.machines[slot];
                let end = lane.end_time().unwrap_or(lane.start_time) as f64;
                if end + load[slot] > suspect.task.deadline as f64 {
                    return false;
                }
            }
        }

        let mut trial = self.state.clone();
        for suspect in &self.suspects {
            let Some(placement) = trial.best_placement(suspect.task) else {
                return false;
            };
            trial.commit(suspect.task, placement);
        }
        self.state = trial;
        true
    }

    /// Tries every combination of suspect machines, replaying the journal
    /// from the snapshot. Returns the first feasible state.
    fn enumerate(&self) -> Option<State<'a>> {
        let sizes: Vec<usize> = self.suspects.iter().map(|s| s.candidates.len()).collect();
        if sizes.contains(&0) {
            return None;
        }
        let mut choice = vec![0; sizes.len()];
        loop {
            if let Some(state) = self.replay(&choice) {
                return Some(state);
            }
            let mut pos = 0;
            while pos < choice.len() {
                choice[pos] += 1;
                if choice[pos] < sizes[pos] {
                    break;
                }
                choice[pos] = 0;
                pos += 1;
            }
            if pos == choice.len() {
                return None;
            }
        }
    }

    fn replay(&self, choice: &[usize]) -> Option<State<'a>> {
        let mut state = self.snapshot.clone();
        let mut next_suspect = 0;
        for step in &self.journal {
            match *step {
                Step::Engage(task) => {
                    if !state.engage(task) {
                        return None;
                    }
                }
                Step::Commit(task) => {
                    let placement = state.best_placement(task)?;
                    state.commit(task, placement);
                }
                Step::Suspect(task) => {
                    let suspect = &self.suspects[next_suspect];
                    let slot = suspect.candidates[choice[next_suspect]];
                    next_suspect += 1;
                    let placement = state.best_in(slot, task)?;
                    state.commit(task, placement);
                }
            }
        }
        Some(state)
    }

    fn finish(mut self) -> Result<Schedule<'a>, Stall<'a>> {
        while !self.suspects.is_empty() {
            if self.resolve() {
                break;
            }
            // Last resort: give the earliest suspect a machine of its own.
            let suspect = self.suspects.remove(0);
            self.certified = false;
            if !self.state.engage(suspect.task) {
                let count = self.suspects.len() + 1;
                return Err(self.stall(Infeasible::UnresolvedSuspects { count }));
            }
            if let Some(pos) = self
                .journal
                .iter()
                .position(|s| matches!(s, Step::Suspect(t) if t.id == suspect.task.id))
            {
                self.journal.remove(pos);
            }
            self.journal.push(Step::Engage(suspect.task));
        }

        let mut schedule = self.state.schedule;
        for lane in &mut schedule.machines {
            lane.settle();
        }
        schedule.sort_by_start();
        debug!(
            "combinatorial: complete on {} machines, certified: {}",
            self.state.engaged, self.certified
        );
        Ok(schedule.with_optimal(self.certified))
    }

    fn stall(self, reason: Infeasible) -> Stall<'a> {
        debug!("combinatorial: stalled ({reason})");
        Stall {
            reason,
            snapshot: self.snapshot.into_prefix(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_task() {
        let tasks = vec![Task::unnamed(1, 10, 100)];
        let machines = Machine::numbered(1);
        let s = combinatorial_construct(&tasks, 3.0, &machines).unwrap();
        assert!(s.optimal);
        assert_eq!(s.start_times(), vec![90]);
    }

    #[test]
    fn test_engages_when_no_machine_fits() {
        let tasks = vec![Task::unnamed(1, 10, 100), Task::unnamed(2, 10, 100)];
        let machines = Machine::numbered(2);
        let s = combinatorial_construct(&tasks, 3.0, &machines).unwrap();
        assert!(s.optimal);
        assert_eq!(s.start_times(), vec![90, 90]);
    }

    #[test]
    fn test_no_idle_machine() {
        let tasks = vec![Task::unnamed(1, 10, 100), Task::unnamed(2, 10, 100)];
        let machines = Machine::numbered(1);
        assert_eq!(
            combinatorial_construct(&tasks, 3.0, &machines).unwrap_err(),
            Infeasible::NoIdleMachine { task_id: 2 }
        );
    }

    #[test]
    fn test_unique_candidate_commits() {
        let tasks = vec![Task::unnamed(1, 5, 100), Task::unnamed(2, 5, 200)];
        let machines = Machine::numbered(1);
        let s = combinatorial_construct(&tasks, 3.0, &machines).unwrap();
        assert!(s.optimal);
        assert_eq!(s.start_times(), vec![95]);
        let ids: Vec<u32> = s.machines[0].tasks.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn test_insertion_slack() {
        let machines = Machine::numbered(1);
        let tasks = vec![Task::unnamed(1, 10, 20), Task::unnamed(2, 5, 15)];
        let mut state = State::new(&machines);
        assert!(state.engage(&tasks[0]));
        let lane = &state.schedule.machines[0];
        // Lane starts at 10; task 2 after task 1 ends at 25 > 15.
        assert_eq!(insertion_slack(lane, 1, &tasks[1]), None);
        // In front it ends at 15 (slack 0), task 1 then ends at 25 > 20.
        assert_eq!(insertion_slack(lane, 0, &tasks[1]), None);
        assert!(state.best_in(0, &tasks[1]).is_none());
    }

    fn tight_pair_with(extra: Vec<Task>) -> Vec<Task> {
        // Tasks 1 and 2 pin both machines to start 0 and end 10.
        let mut tasks = vec![Task::unnamed(1, 10, 10), Task::unnamed(2, 10, 10)];
        tasks.extend(extra);
        tasks
    }

    #[test]
    fn test_pseudo_placement_is_not_certified() {
        let tasks = tight_pair_with(vec![Task::unnamed(3, 1, 1000)]);
        let machines = Machine::numbered(2);
        let s = combinatorial_construct(&tasks, 3.0, &machines).unwrap();
        assert!(!s.optimal);
        assert_eq!(s.task_count(), 3);
        assert!(s.is_feasible());
        assert_eq!(s.machine_of(3), s.machine_of(1));
    }

    #[test]
    fn test_enumeration_resolves_suspects() {
        // Even spreading overloads both machines for task 3 (10 + 6.5 > 15),
        // so the suspects are enumerated; both fit behind task 1.
        let tasks = tight_pair_with(vec![Task::unnamed(3, 5, 15), Task::unnamed(4, 8, 30)]);
        let machines = Machine::numbered(2);
        let s = combinatorial_construct(&tasks, 3.0, &machines).unwrap();
        // First feasible combination: not certified.
        assert!(!s.optimal);
        assert!(s.is_feasible());
        assert_eq!(s.start_times(), vec![0, 0]);
        assert_eq!(s.machine_of(3), Some(0));
        assert_eq!(s.machine_of(4), Some(0));
    }

    #[test]
    fn test_certified_only_when_exact() {
        // Task 6 is suspected and resolved by enumeration; the exact
        // solver finds [-5, 9, 22] against the refinement's [-5, 9, 19].
        let tasks = vec![
            Task::unnamed(1, 13, 56),
            Task::unnamed(2, 11, 33),
            Task::unnamed(3, 12, 32),
            Task::unnamed(4, 5, 14),
            Task::unnamed(5, 16, 11),
            Task::unnamed(6, 19, 38),
            Task::unnamed(7, 14, 48),
        ];
        let machines = Machine::numbered(3);
        let exact = crate::bnb::build_optimal_schedule(&tasks, &machines);
        if let Ok(s) = combinatorial_construct(&tasks, 3.0, &machines) {
            assert!(s.is_feasible());
            if s.optimal {
                assert_eq!(s.compare(&exact), Ok(std::cmp::Ordering::Equal));
            }
        }
    }

    #[test]
    fn test_enumeration_budget() {
        let tasks = tight_pair_with(vec![Task::unnamed(3, 5, 15), Task::unnamed(4, 8, 30)]);
        let machines = Machine::numbered(2);
        // floor(0.5 * 2) = 1 < 2 suspects and no idle machine is left.
        assert_eq!(
            combinatorial_construct(&tasks, 0.5, &machines).unwrap_err(),
            Infeasible::UnresolvedSuspects { count: 2 }
        );
    }

    #[test]
    fn test_stall_keeps_snapshot() {
        let tasks = vec![Task::unnamed(1, 10, 100), Task::unnamed(2, 10, 100)];
        let machines = Machine::numbered(1);
        let sorted = by_extreme_time(&tasks);
        let stall = refine(&sorted, &machines, &SchedulerConfig::default()).unwrap_err();
        assert_eq!(stall.reason, Infeasible::NoIdleMachine { task_id: 2 });
        // A lone task ending on its deadline is never exact.
        assert!(stall.snapshot.placed.is_empty());
    }

    #[test]
    fn test_degenerate_inputs() {
        let machines = Machine::numbered(2);
        let s = combinatorial_construct(&[], 3.0, &machines).unwrap();
        assert!(s.optimal);
        assert_eq!(s.task_count(), 0);
    }
}
