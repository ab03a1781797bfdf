//! Replay ring
//!
//! Fixed-capacity tail of the most recent payloads published to a topic.
//! Late joiners can ask for the last `n` messages on subscribe; the ring is
//! the only retained history, so replay is bounded by whatever is still in
//! it. Capacity 0 is legal and disables retention entirely.

use std::collections::VecDeque;

use echopub_wire::PayloadEnvelope;

#[derive(Debug)]
pub struct ReplayRing {
    entries: VecDeque<PayloadEnvelope>,
    capacity: usize,
}

impl ReplayRing {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity.min(64)),
            capacity,
        }
    }

    /// Append a payload, overwriting the oldest entry once at capacity.
    pub fn append(&mut self, message: PayloadEnvelope) {
        if self.capacity == 0 {
            return;
        }
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(message);
    }

    /// The most recent `min(n, len)` payloads in original insertion order,
    /// oldest first. Does not mutate the ring.
    pub fn last(&self, n: usize) -> Vec<PayloadEnvelope> {
        let skip = self.entries.len().saturating_sub(n);
        self.entries.iter().skip(skip).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
