//! Schedule (solution) model.
//!
//! A schedule assigns every task to exactly one machine and fixes the
//! execution order on that machine. Each machine runs its queue
//! back-to-back from its start time, so a machine is fully described by
//! its start time and its ordered queue.
//!
//! # Reference
//! Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems", Ch. 5

use std::cmp::Ordering;
use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use super::{compare_start_times, Machine, Task, Time, IDLE};
use crate::error::ScheduleError;

/// One machine's ordered task queue plus its start time.
///
/// Tasks and the machine are borrowed from the caller; cloning copies
/// the queue but never the tasks themselves.
#[derive(Debug, Clone, Serialize)]
pub struct MachineSchedule<'a> {
    /// The machine this queue runs on.
    pub machine: &'a Machine,
    /// Start of the first task, or [`IDLE`] when the queue is empty.
    pub start_time: Time,
    /// Tasks in execution order (front = executed first).
    pub tasks: VecDeque<&'a Task>,
}

/// Latest contiguous start at which every task, run in the given order,
/// meets its deadline. [`IDLE`] for an empty sequence.
pub fn latest_start<'t, I>(tasks: I) -> Time
where
    I: DoubleEndedIterator<Item = &'t Task>,
{
    tasks.rev().fold(IDLE, |start, task| task.start_before(start))
}

impl<'a> MachineSchedule<'a> {
    /// Creates an idle machine schedule.
    pub fn new(machine: &'a Machine) -> Self {
        Self {
            machine,
            start_time: IDLE,
            tasks: VecDeque::new(),
        }
    }

    /// Creates a machine schedule with an explicit start and queue.
    pub fn with_tasks(machine: &'a Machine, start_time: Time, tasks: VecDeque<&'a Task>) -> Self {
        Self {
            machine,
            start_time,
            tasks,
        }
    }

    /// Whether no task is assigned.
    #[inline]
    pub fn is_idle(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Puts `task` in front of the queue and moves the start earlier so
    /// that the task still meets its deadline.
    pub fn push_front(&mut self, task: &'a Task) {
        self.start_time = task.start_before(self.start_time);
        self.tasks.push_front(task);
    }

    /// Appends `task` to the queue. The start time is left untouched.
    pub fn push_back(&mut self, task: &'a Task) {
        self.tasks.push_back(task);
    }

    /// Removes the first task and recomputes the latest feasible start.
    pub fn pop_front(&mut self) -> Option<&'a Task> {
        let task = self.tasks.pop_front()?;
        self.settle();
        Some(task)
    }

    /// Sum of task durations.
    pub fn busy_time(&self) -> Time {
        self.tasks.iter().map(|t| t.duration).sum()
    }

    /// Completion time of the last task, `None` when idle.
    pub fn end_time(&self) -> Option<Time> {
        if self.is_idle() {
            None
        } else {
            Some(self.start_time + self.busy_time())
        }
    }

    /// Latest start keeping the current order deadline-feasible.
    pub fn latest_start(&self) -> Time {
        latest_start(self.tasks.iter().copied())
    }

    /// Moves the start to [`latest_start`](Self::latest_start).
    pub fn settle(&mut self) {
        self.start_time = self.latest_start();
    }

    /// Iterates `(task, completion time)` in execution order.
    pub fn completions(&self) -> impl Iterator<Item = (&'a Task, Time)> + '_ {
        self.tasks.iter().scan(self.start_time, |clock, &task| {
            *clock += task.duration;
            Some((task, *clock))
        })
    }

    /// Whether every task completes by its deadline.
    pub fn is_feasible(&self) -> bool {
        self.completions().all(|(task, end)| end <= task.deadline)
    }

    /// Smallest `deadline - completion` over the queue, `None` when idle.
    pub fn min_slack(&self) -> Option<Time> {
        self.completions().map(|(task, end)| task.deadline - end).min()
    }
}

/// A complete schedule: one [`MachineSchedule`] per machine.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Schedule<'a> {
    /// Per-machine queues.
    pub machines: Vec<MachineSchedule<'a>>,
    /// Set only when no feasible schedule has a strictly better sorted
    /// start-time vector.
    pub optimal: bool,
}

/// A task-machine-time row of a schedule's timeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    /// Machine running the task.
    pub machine_id: u32,
    /// Assigned task.
    pub task_id: u32,
    /// Start time (ticks).
    pub start: Time,
    /// End time (ticks).
    pub end: Time,
}

/// A feasibility violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// Type of violation.
    pub violation_type: ViolationType,
    /// Related entity id (task or machine).
    pub entity_id: u32,
    /// Amount by which the bound is exceeded (ticks, > 0).
    pub excess: Time,
}

/// Classification of feasibility violations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ViolationType {
    /// Task completed after its deadline.
    DeadlineMiss,
    /// Machine starts before the admissible horizon.
    StartBeforeHorizon,
}

impl Assignment {
    /// Duration of the row.
    #[inline]
    pub fn duration(&self) -> Time {
        self.end - self.start
    }
}

impl Violation {
    /// Creates a deadline miss violation.
    pub fn deadline_miss(task_id: u32, lateness: Time) -> Self {
        Self {
            violation_type: ViolationType::DeadlineMiss,
            entity_id: task_id,
            excess: lateness,
        }
    }

    /// Creates a start-before-horizon violation.
    pub fn start_before_horizon(machine_id: u32, earliness: Time) -> Self {
        Self {
            violation_type: ViolationType::StartBeforeHorizon,
            entity_id: machine_id,
            excess: earliness,
        }
    }
}

impl<'a> Schedule<'a> {
    /// Creates a schedule with every machine idle.
    pub fn new(machines: &'a [Machine]) -> Self {
        Self {
            machines: machines.iter().map(MachineSchedule::new).collect(),
            optimal: false,
        }
    }

    /// Creates a schedule from prepared machine schedules.
    pub fn from_machine_schedules(machines: Vec<MachineSchedule<'a>>) -> Self {
        Self {
            machines,
            optimal: false,
        }
    }

    /// Sets the optimality flag.
    pub fn with_optimal(mut self, optimal: bool) -> Self {
        self.optimal = optimal;
        self
    }

    /// Number of machines.
    #[inline]
    pub fn len(&self) -> usize {
        self.machines.len()
    }

    /// Whether the schedule covers no machine.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.machines.is_empty()
    }

    /// Per-machine start times in machine order.
    pub fn start_times(&self) -> Vec<Time> {
        self.machines.iter().map(|m| m.start_time).collect()
    }

    /// Sorts machines by start time, then by machine id.
    pub fn sort_by_start(&mut self) {
        self.machines.sort_by_key(|m| (m.start_time, m.machine.id));
    }

    /// Compares two schedules by their sorted start-time vectors.
    ///
    /// `Ordering::Greater` means `self` is better.
    ///
    /// # Errors
    /// [`ScheduleError::MachineCountMismatch`] if the schedules cover a
    /// different number of machines.
    pub fn compare(&self, other: &Schedule<'_>) -> Result<Ordering, ScheduleError> {
        if self.len() != other.len() {
            return Err(ScheduleError::MachineCountMismatch {
                left: self.len(),
                right: other.len(),
            });
        }
        Ok(compare_start_times(&self.start_times(), &other.start_times()))
    }

    /// Whether every machine's queue meets all deadlines.
    pub fn is_feasible(&self) -> bool {
        self.machines.iter().all(MachineSchedule::is_feasible)
    }

    /// Total number of assigned tasks.
    pub fn task_count(&self) -> usize {
        self.machines.iter().map(|m| m.tasks.len()).sum()
    }

    /// Position of the machine running `task_id`.
    pub fn machine_of(&self, task_id: u32) -> Option<usize> {
        self.machines
            .iter()
            .position(|m| m.tasks.iter().any(|t| t.id == task_id))
    }

    /// Number of machines with at least one task.
    pub fn engaged_count(&self) -> usize {
        self.machines.iter().filter(|m| !m.is_idle()).count()
    }

    /// Timeline rows, machine by machine in execution order.
    pub fn assignments(&self) -> Vec<Assignment> {
        self.machines
            .iter()
            .flat_map(|m| {
                m.completions().map(move |(task, end)| Assignment {
                    machine_id: m.machine.id,
                    task_id: task.id,
                    start: end - task.duration,
                    end,
                })
            })
            .collect()
    }
}
