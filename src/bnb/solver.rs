//! Depth-first branch-and-bound over task-to-machine decisions.

use std::cmp::Ordering;

use log::{debug, trace};
use serde::Serialize;

use super::node::Node;
use crate::models::{compare_start_times, Machine, Schedule, Task, IDLE};
use crate::scheduler::{build_schedule, by_deadline};

/// Search counters of one solve.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BnbStats {
    /// Nodes generated, including pruned ones.
    pub nodes_created: usize,
    /// Nodes whose children were generated.
    pub nodes_expanded: usize,
    /// Times the record was set or replaced.
    pub records: usize,
    /// Nodes discarded as dominated by the record.
    pub pruned: usize,
    /// Largest number of nodes waiting in the queue at once.
    pub peak_queue: usize,
}

/// Exact solver for the sorted start-time objective.
///
/// Tasks are decided in descending deadline order, each one put in front of
/// a machine's queue. Per machine the queue therefore runs in deadline
/// order, which is the best order for a fixed assignment. Start times only
/// move earlier along a branch, so a node whose vector the record already
/// matches can be discarded with its subtree.
///
/// # Example
///
/// ```
/// use u_deadline::bnb::BranchAndBound;
/// use u_deadline::models::{Machine, Task};
///
/// let tasks = vec![
///     Task::unnamed(1, 100, 150),
///     Task::unnamed(2, 100, 150),
///     Task::unnamed(3, 100, 150),
/// ];
/// let machines = Machine::numbered(2);
///
/// let (schedule, stats) = BranchAndBound::new(&tasks, &machines).solve_with_stats();
/// assert!(schedule.optimal);
/// assert_eq!(schedule.start_times(), vec![-50, 50]);
/// assert!(stats.records >= 1);
/// ```
#[derive(Debug, Clone)]
pub struct BranchAndBound<'a> {
    source: &'a [Task],
    tasks: Vec<&'a Task>,
    machines: &'a [Machine],
}

impl<'a> BranchAndBound<'a> {
    /// Prepares a search over `tasks` on `machines`.
    pub fn new(tasks: &'a [Task], machines: &'a [Machine]) -> Self {
        Self {
            source: tasks,
            tasks: by_deadline(tasks),
            machines,
        }
    }

    /// Runs the search and returns the optimal schedule.
    pub fn solve(&self) -> Schedule<'a> {
        self.solve_with_stats().0
    }

    /// Runs the search and also returns its counters.
    pub fn solve_with_stats(&self) -> (Schedule<'a>, BnbStats) {
        let mut stats = BnbStats::default();
        let n = self.tasks.len();
        let m = self.machines.len();
        if n == 0 {
            return (Schedule::new(self.machines).with_optimal(true), stats);
        }
        if m == 0 {
            return (Schedule::new(self.machines), stats);
        }

        let hint = self.heuristic_slots();
        let mut queue: Vec<Node> = Vec::new();

        // Initial dive along the heuristic's choices.
        let last = n - 1;
        let mut starts = vec![IDLE; m];
        starts[hint[last]] = self.tasks[last].extreme_time();
        let mut current = Node {
            task: last,
            slot: hint[last],
            prev: None,
            starts,
        };
        stats.nodes_created += 1;

        for index in (0..last).rev() {
            let task = self.tasks[index];
            let link = current.link();
            let preferred = hint[index];
            let mut idle_taken = current.starts[preferred] == IDLE;
            stats.nodes_expanded += 1;

            for slot in 0..m {
                if slot == preferred {
                    continue;
                }
                if current.starts[slot] == IDLE {
                    if idle_taken {
                        continue;
                    }
                    idle_taken = true;
                }
                queue.push(current.child(index, slot, task, &link));
                stats.nodes_created += 1;
            }
            current = current.child(index, preferred, task, &link);
            stats.nodes_created += 1;
        }
        stats.peak_queue = queue.len();

        let mut record = current;
        stats.records += 1;

        // Leaves generated during the dive compete with the record directly.
        let (leaves, open): (Vec<Node>, Vec<Node>) = queue.into_iter().partition(Node::is_leaf);
        queue = open;
        for leaf in leaves {
            if better(&leaf, &record) {
                record = leaf;
                stats.records += 1;
            }
        }
        stats.pruned += prune(&mut queue, &record);

        while let Some(node) = queue.pop() {
            stats.nodes_expanded += 1;
            let index = node.task - 1;
            let task = self.tasks[index];
            let link = node.link();
            let mut idle_taken = false;

            for slot in 0..m {
                if node.starts[slot] == IDLE {
                    if idle_taken {
                        continue;
                    }
                    idle_taken = true;
                }
                let child = node.child(index, slot, task, &link);
                stats.nodes_created += 1;

                if !better(&child, &record) {
                    stats.pruned += 1;
                    continue;
                }
                if child.is_leaf() {
                    trace!("bnb: new record {:?}", child.starts);
                    record = child;
                    stats.records += 1;
                    stats.pruned += prune(&mut queue, &record);
                    continue;
                }
                queue.push(child);
            }
            stats.peak_queue = stats.peak_queue.max(queue.len());
        }

        debug!(
            "bnb: {} tasks on {m} machines, {} nodes created, {} expanded, {} records, \
             {} pruned, peak queue {}",
            n,
            stats.nodes_created,
            stats.nodes_expanded,
            stats.records,
            stats.pruned,
            stats.peak_queue
        );

        let mut schedule = Schedule::new(self.machines);
        let slots = record.slots();
        for (task, slot) in self.tasks.iter().copied().zip(slots) {
            schedule.machines[slot].push_back(task);
        }
        for (lane, &start) in schedule.machines.iter_mut().zip(&record.starts) {
            lane.start_time = start;
        }
        schedule.sort_by_start();
        (schedule.with_optimal(true), stats)
    }

    /// Slot of each deadline-sorted task in the list-scheduling seed.
    fn heuristic_slots(&self) -> Vec<usize> {
        let seed = build_schedule(self.source, self.machines);
        let mut hint = vec![0; self.tasks.len()];
        for (slot, lane) in seed.machines.iter().enumerate() {
            for &placed in &lane.tasks {
                if let Some(index) = self.tasks.iter().position(|t| std::ptr::eq(*t, placed)) {
                    hint[index] = slot;
                }
            }
        }
        hint
    }
}

/// Whether `node` is strictly better than `record`.
fn better(node: &Node, record: &Node) -> bool {
    compare_start_times(&node.starts, &record.starts) == Ordering::Greater
}

/// Drops every queued node the record dominates; returns how many.
fn prune(queue: &mut Vec<Node>, record: &Node) -> usize {
    let before = queue.len();
    queue.retain(|node| better(node, record));
    before - queue.len()
}
