//! Pending timer queue.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::fmt;
use std::time::Duration;

/// Identifies a scheduled timer, for cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(u64);

pub(crate) type TimerCallback = Box<dyn FnOnce() + Send>;

/// A pending timer entry in the timer queue.
pub(crate) struct TimerEntry {
    /// When the timer fires
    pub(crate) deadline: Duration,
    /// Unique ID, also the tie-breaker for equal deadlines
    id: u64,
    pub(crate) callback: TimerCallback,
}

impl PartialEq for TimerEntry {
    fn eq(&self, other: &Self) -> bool {
        self.deadline == other.deadline && self.id == other.id
    }
}

impl Eq for TimerEntry {}

impl PartialOrd for TimerEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TimerEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse order for min-heap behavior (earliest deadline first)
        other
            .deadline
            .cmp(&self.deadline)
            .then_with(|| other.id.cmp(&self.id))
    }
}

impl fmt::Debug for TimerEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimerEntry")
            .field("deadline", &self.deadline)
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

/// Timers ordered by deadline, then by scheduling order.
#[derive(Debug, Default)]
pub(crate) struct TimerQueue {
    pending: BinaryHeap<TimerEntry>,
    next_id: u64,
}

impl TimerQueue {
    pub(crate) fn push(&mut self, deadline: Duration, callback: TimerCallback) -> TimerId {
        let id = self.next_id;
        self.next_id += 1;
        self.pending.push(TimerEntry {
            deadline,
            id,
            callback,
        });
        TimerId(id)
    }

    /// Pop the earliest timer if it is due at `now`.
    pub(crate) fn pop_due(&mut self, now: Duration) -> Option<TimerEntry> {
        if self.pending.peek()?.deadline <= now {
            self.pending.pop()
        } else {
            None
        }
    }

    pub(crate) fn remove(&mut self, id: TimerId) -> bool {
        let before = self.pending.len();
        self.pending.retain(|entry| entry.id != id.0);
        self.pending.len() != before
    }

    pub(crate) fn len(&self) -> usize {
        self.pending.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pops_in_deadline_order() {
        let mut queue = TimerQueue::default();
        queue.push(Duration::from_millis(30), Box::new(|| {}));
        queue.push(Duration::from_millis(10), Box::new(|| {}));
        queue.push(Duration::from_millis(20), Box::new(|| {}));

        let now = Duration::from_millis(25);
        assert_eq!(queue.pop_due(now).unwrap().deadline, Duration::from_millis(10));
        assert_eq!(queue.pop_due(now).unwrap().deadline, Duration::from_millis(20));
        assert!(queue.pop_due(now).is_none());
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn test_equal_deadlines_keep_scheduling_order() {
        let mut queue = TimerQueue::default();
        let first = queue.push(Duration::from_millis(5), Box::new(|| {}));
        queue.push(Duration::from_millis(5), Box::new(|| {}));

        let entry = queue.pop_due(Duration::from_millis(5)).unwrap();
        assert_eq!(TimerId(entry.id), first);
    }

    #[test]
    fn test_remove() {
        let mut queue = TimerQueue::default();
        let id = queue.push(Duration::from_millis(5), Box::new(|| {}));
        assert!(queue.remove(id));
        assert!(!queue.remove(id));
        assert_eq!(queue.len(), 0);
    }
}
