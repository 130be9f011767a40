use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

/// Work items the correlator schedules against its own queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScheduledTask {
    /// One-shot confirmation timeout for a pending entry. Implicitly
    /// cancelled by resolution: the firing task finds no entry and is a
    /// silent no-op.
    PendingTimeout { correlation_token: String },
    /// Recurring sweep of expired dedup markers; reschedules itself.
    DedupSweep,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct TimerEntry {
    due_ms: u64,
    sequence: u64,
    task: ScheduledTask,
}

impl Ord for TimerEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.due_ms
            .cmp(&other.due_ms)
            .then_with(|| self.sequence.cmp(&other.sequence))
    }
}

impl PartialOrd for TimerEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Single-threaded timer queue: scheduled callbacks represented as data,
/// drained by the owner on every tick. Entries with equal due times fire in
/// scheduling order.
#[derive(Debug, Default)]
pub struct TimerQueue {
    entries: BinaryHeap<Reverse<TimerEntry>>,
    sequence: u64,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, due_ms: u64, task: ScheduledTask) {
        self.sequence = self.sequence.wrapping_add(1);
        self.entries.push(Reverse(TimerEntry {
            due_ms,
            sequence: self.sequence,
            task,
        }));
    }

    /// Pops the next task due at or before `now_ms`, with its due time so
    /// recurring tasks can reschedule from the boundary rather than the
    /// observation time.
    pub fn pop_due(&mut self, now_ms: u64) -> Option<(u64, ScheduledTask)> {
        match self.entries.peek() {
            Some(Reverse(entry)) if entry.due_ms <= now_ms => {
                let Reverse(entry) = self.entries.pop()?;
                Some((entry.due_ms, entry.task))
            }
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
