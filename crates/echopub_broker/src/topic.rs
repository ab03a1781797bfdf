//! Topic records
//!
//! A `Topic` owns its subscriber table, its replay ring and its counters.
//! Subscribers are keyed by the underlying connection id, not by the
//! client-supplied `client_id`: two connections presenting the same
//! `client_id` are distinct subscribers and both receive events.

use std::collections::HashMap;

use echopub_client::{Connection, ConnectionId};
use serde::Serialize;

use crate::queue::BoundedQueue;
use crate::ring::ReplayRing;

/// The binding between a live connection and a topic, carrying the outbound
/// queue used for this topic's fan-out. `client_id` is informational only.
#[derive(Debug)]
pub struct Subscriber {
    pub connection: Connection,
    pub client_id: String,
    pub queue: BoundedQueue,
}

/// Per-topic counters. Monotonic for the life of the topic record; deleting
/// and recreating a topic starts over from zero.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TopicStats {
    /// Total publishes accepted.
    pub messages: u64,
    /// Current subscriber-table size.
    pub subscribers: usize,
    /// Envelopes actually handed to the transport.
    pub delivered: u64,
    /// Entries evicted by queue overflow, summed across subscribers.
    pub dropped: u64,
}

/// A topic-list entry for the observability surface.
#[derive(Debug, Clone, Serialize)]
pub struct TopicSummary {
    pub name: String,
    pub subscribers: usize,
}

#[derive(Debug)]
pub struct Topic {
    pub name: String,
    pub subscribers: HashMap<ConnectionId, Subscriber>,
    pub ring: ReplayRing,
    pub stats: TopicStats,
}

impl Topic {
    pub fn new(name: &str, ring_capacity: usize) -> Self {
        Self {
            name: name.to_string(),
            subscribers: HashMap::new(),
            ring: ReplayRing::new(ring_capacity),
            stats: TopicStats::default(),
        }
    }

    pub fn summary(&self) -> TopicSummary {
        TopicSummary {
            name: self.name.clone(),
            subscribers: self.subscribers.len(),
        }
    }
}
