use crate::record::EventRecord;
use std::collections::VecDeque;

/// Append-ordered, bounded working set of event records.
///
/// Every insert truncates to the most recent `capacity` records; the oldest
/// are silently dropped. Eviction is reported as a count so the caller can
/// emit a size-exceeded notice, never as an error.
pub struct EventStore {
    records: VecDeque<EventRecord>,
    capacity: usize,
}

impl EventStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            records: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    /// Appends a record and enforces the cap. Returns how many records were
    /// evicted from the front.
    pub fn append(&mut self, record: EventRecord) -> usize {
        self.records.push_back(record);
        let mut evicted = 0;
        while self.records.len() > self.capacity {
            self.records.pop_front();
            evicted += 1;
        }
        evicted
    }

    /// Mutates the record holding `correlation_token` in place.
    ///
    /// Returns false without side effects when no such record exists — a
    /// legitimate outcome when the record was already evicted.
    pub fn update_in_place<F>(&mut self, correlation_token: &str, mutate: F) -> bool
    where
        F: FnOnce(&mut EventRecord),
    {
        match self
            .records
            .iter_mut()
            .find(|record| record.correlation_token == correlation_token)
        {
            Some(record) => {
                mutate(record);
                true
            }
            None => false,
        }
    }

    /// Snapshots the most recent `limit` records, most-recent first.
    pub fn list_recent(&self, limit: usize) -> Vec<EventRecord> {
        self.records.iter().rev().take(limit).cloned().collect()
    }

    /// Full snapshot in append order (oldest first), for mirroring/export.
    pub fn snapshot(&self) -> Vec<EventRecord> {
        self.records.iter().cloned().collect()
    }

    pub fn get(&self, correlation_token: &str) -> Option<&EventRecord> {
        self.records
            .iter()
            .find(|record| record.correlation_token == correlation_token)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }
}
