//! Bounded outbound queue
//!
//! Every subscriber owns one of these: a FIFO buffer of pending deliveries
//! with a hard capacity. When a push lands on a full queue the oldest entry
//! is evicted first and the eviction is reported to the caller, which charges
//! it to the topic's drop counter. Push never fails.
//!
//! Concurrency note: the queue is only ever touched from the broker's actor
//! context (under the broker lock); it is not shared across topics.

use std::collections::VecDeque;

use echopub_wire::PayloadEnvelope;

/// One queued delivery: the topic it belongs to plus the payload envelope.
#[derive(Debug, Clone, PartialEq)]
pub struct Delivery {
    pub topic: String,
    pub message: PayloadEnvelope,
}

#[derive(Debug)]
pub struct BoundedQueue {
    items: VecDeque<Delivery>,
    capacity: usize,
}

impl BoundedQueue {
    pub fn new(capacity: usize) -> Self {
        Self {
            items: VecDeque::with_capacity(capacity.min(64)),
            capacity,
        }
    }

    /// Append to the tail. If the queue is full the head is evicted first;
    /// the return value is the number of evicted entries (0 or 1).
    pub fn push(&mut self, item: Delivery) -> u64 {
        if self.capacity == 0 {
            return 1;
        }
        let mut evicted = 0;
        if self.items.len() == self.capacity {
            self.items.pop_front();
            evicted = 1;
        }
        self.items.push_back(item);
        evicted
    }

    /// Remove up to `max` entries from the head, preserving order.
    pub fn drain(&mut self, max: usize) -> Vec<Delivery> {
        let take = max.min(self.items.len());
        self.items.drain(..take).collect()
    }

    /// Reinsert a just-drained prefix at the head, preserving order. Used
    /// when the transport refuses part of a batch so the entries stay queued
    /// instead of vanishing.
    pub fn requeue_front(&mut self, items: Vec<Delivery>) {
        for item in items.into_iter().rev() {
            self.items.push_front(item);
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
