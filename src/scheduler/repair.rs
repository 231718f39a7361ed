//! Start-time repair pass shared by the heuristic strategies.
//!
//! Repeats until no change:
//!
//! 1. Sort machines by start time.
//! 2. For each machine (earliest first), while its head task is longer than
//!    the second one, defer the head behind as many followers as its own
//!    deadline allows.
//! 3. Try to move the (possibly new) head to a later-starting machine; the
//!    move is taken only if the receiving machine then starts strictly later
//!    than the donor did.
//!
//! Every accepted move strictly improves the sorted start-time vector, so
//! the pass terminates.

use log::trace;

use crate::models::{MachineSchedule, Schedule};

/// Runs the repair pass to a fixed point.
pub(crate) fn adjust_start_times(schedule: &mut Schedule<'_>) {
    let count = schedule.len();
    loop {
        schedule.sort_by_start();
        let mut moved = false;

        for i in 0..count.saturating_sub(1) {
            if schedule.machines[i].is_idle() {
                continue;
            }
            let donor_start = schedule.machines[i].start_time;
            defer_long_head(&mut schedule.machines[i]);

            let Some(&moving) = schedule.machines[i].tasks.front() else {
                continue;
            };

            let mut target = None;
            for j in (i + 1..count).rev() {
                if target.is_some() && schedule.machines[j].start_time < moving.deadline {
                    break;
                }
                target = Some(j);
            }
            let Some(j) = target else {
                continue;
            };

            let new_start = moving.start_before(schedule.machines[j].start_time);
            if new_start > donor_start {
                trace!(
                    "repair: task {} from machine {} to machine {}",
                    moving.id,
                    schedule.machines[i].machine.id,
                    schedule.machines[j].machine.id
                );
                schedule.machines[i].pop_front();
                schedule.machines[j].push_front(moving);
                moved = true;
                break;
            }
        }

        if !moved {
            break;
        }
    }
}

/// Moves a head task that is longer than its successor further back in
/// the queue, as long as it still meets its deadline there.
fn defer_long_head(lane: &mut MachineSchedule<'_>) {
    let start = lane.start_time;
    for _ in 0..lane.tasks.len() {
        let (Some(&head), Some(&second)) = (lane.tasks.front(), lane.tasks.get(1)) else {
            break;
        };
        if head.duration <= second.duration {
            break;
        }

        let mut end = start + head.duration;
        let mut node = 0;
        while node + 1 < lane.tasks.len() && end + lane.tasks[node + 1].duration <= head.deadline {
            node += 1;
            end += lane.tasks[node].duration;
        }
        if node == 0 {
            break;
        }

        lane.tasks.pop_front();
        lane.tasks.insert(node, head);
    }
}
