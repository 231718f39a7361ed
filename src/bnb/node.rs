//! Search nodes and their shared decision chains.
//!
//! A node records one decision (task index, machine slot) together with the
//! start-time vector it produces. Earlier decisions are shared between
//! siblings through reference-counted back-pointers, so a node never owns
//! its ancestry exclusively and a chain is freed once no live node reaches
//! it.

use std::rc::Rc;

use crate::models::{Task, Time};

/// One earlier decision: the slot chosen for a task and the link of the
/// decision before it.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct Link {
    pub(crate) slot: usize,
    pub(crate) prev: Option<Rc<Link>>,
}

impl Drop for Link {
    // Unlinks iteratively so that dropping a long chain does not recurse.
    fn drop(&mut self) {
        let mut cursor = self.prev.take();
        while let Some(link) = cursor {
            match Rc::try_unwrap(link) {
                Ok(mut owned) => cursor = owned.prev.take(),
                Err(_) => break,
            }
        }
    }
}

/// A search node: `task` (index into the deadline-sorted tasks) was put on
/// `slot`, giving the per-slot start times `starts`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Node {
    pub(crate) task: usize,
    pub(crate) slot: usize,
    pub(crate) prev: Option<Rc<Link>>,
    pub(crate) starts: Vec<Time>,
}

impl Node {
    /// This node's decision as a link for its children.
    pub(crate) fn link(&self) -> Rc<Link> {
        Rc::new(Link {
            slot: self.slot,
            prev: self.prev.clone(),
        })
    }

    /// Places `task` (at `index`) in front of `slot`'s queue.
    pub(crate) fn child(&self, index: usize, slot: usize, task: &Task, link: &Rc<Link>) -> Node {
        let mut starts = self.starts.clone();
        starts[slot] = task.start_before(starts[slot]);
        Node {
            task: index,
            slot,
            prev: Some(Rc::clone(link)),
            starts,
        }
    }

    /// Whether every task has been placed.
    #[inline]
    pub(crate) fn is_leaf(&self) -> bool {
        self.task == 0
    }

    /// Slots from this decision back to the root.
    pub(crate) fn slots(&self) -> Vec<usize> {
        let mut slots = vec![self.slot];
        let mut cursor = self.prev.as_deref();
        while let Some(link) = cursor {
            slots.push(link.slot);
            cursor = link.prev.as_deref();
        }
        slots
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::IDLE;

    fn root(starts: Vec<Time>) -> Node {
        Node {
            task: 2,
            slot: 0,
            prev: None,
            starts,
        }
    }

    #[test]
    fn test_child_start_times() {
        let task = Task::unnamed(1, 10, 100);
        let node = Node {
            task: 1,
            slot: 0,
            prev: None,
            starts: vec![IDLE, 95],
        };
        let link = node.link();
        // Idle slot: start at the extreme time.
        assert_eq!(node.child(0, 0, &task, &link).starts, vec![90, 95]);
        // Slot starting before the deadline shifts by the duration.
        assert_eq!(node.child(0, 1, &task, &link).starts, vec![IDLE, 85]);
        assert!(node.child(0, 1, &task, &link).is_leaf());
        assert_eq!(node.starts, vec![IDLE, 95]);
    }

    #[test]
    fn test_slots() {
        let task = Task::unnamed(1, 10, 100);
        let top = Node {
            slot: 2,
            ..root(vec![IDLE; 3])
        };
        let middle = top.child(1, 0, &task, &top.link());
        let leaf = middle.child(0, 1, &task, &middle.link());
        assert_eq!(leaf.slots(), vec![1, 0, 2]);
        assert_eq!(top.slots(), vec![2]);
    }

    #[test]
    fn test_chain_freed_with_last_node() {
        let task = Task::unnamed(1, 10, 100);
        let top = root(vec![IDLE, IDLE]);
        let link = top.link();
        let watch = Rc::downgrade(&link);

        let left = top.child(1, 0, &task, &link);
        let right = top.child(1, 1, &task, &link);
        drop(link);
        drop(left);
        // A sibling still reaches the shared decision.
        assert!(watch.upgrade().is_some());
        drop(right);
        assert!(watch.upgrade().is_none());
    }

    #[test]
    fn test_long_chain_drops() {
        let task = Task::unnamed(1, 1, 1_000_000);
        let mut node = root(vec![IDLE]);
        for index in (0..200_000).rev() {
            node = node.child(index, 0, &task, &node.link());
        }
        assert_eq!(node.slots().len(), 200_001);
    }
}
