//! Broker engine
//!
//! The in-memory broker: topic registry, connection registry, fan-out
//! delivery and the heartbeat loop.
//!
//! Concurrency and usage notes:
//! - The public API here is synchronous and designed to be held behind a
//!   lock (`Arc<Mutex<Broker>>`) by the transport layer. Every operation is
//!   atomic with respect to the registry; none of them await I/O.
//! - Outbound emission goes through `Connection::deliver`, a non-blocking
//!   `try_send` into the per-connection channel, so holding the broker lock
//!   across a fan-out cannot block on the network.
//! - The heartbeat loop is designed to run as a background task owning a
//!   clone of the shared handle, like any other periodic broker task.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use echopub_client::{Connection, ConnectionId, DeliverError};
use echopub_wire::{timestamp, PayloadEnvelope, ServerEnvelope};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::queue::{BoundedQueue, Delivery};
use crate::topic::{Subscriber, Topic, TopicStats, TopicSummary};

/// Fan-out drains a subscriber's queue in batches of this many entries.
const DRAIN_BATCH: usize = 100;

pub type Result<T> = std::result::Result<T, BrokerError>;

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum BrokerError {
    #[error("topic not found: {0}")]
    TopicNotFound(String),
    #[error("topic already exists: {0}")]
    TopicExists(String),
}

#[derive(Debug)]
pub struct Broker {
    topics: HashMap<String, Topic>,
    connections: HashMap<ConnectionId, Connection>,
    ring_capacity: usize,
    queue_capacity: usize,
}

impl Default for Broker {
    fn default() -> Self {
        Self::new(100, 512)
    }
}

impl Broker {
    pub fn new(ring_capacity: usize, queue_capacity: usize) -> Self {
        Self {
            topics: HashMap::new(),
            connections: HashMap::new(),
            ring_capacity,
            queue_capacity,
        }
    }

    /// Register a connection so broadcasts (heartbeats) can reach it.
    pub fn register_connection(&mut self, connection: Connection) {
        self.connections.insert(connection.id.clone(), connection);
    }

    /// Insert a new topic record. The caller validates the name.
    pub fn create_topic(&mut self, name: &str) -> Result<()> {
        if self.topics.contains_key(name) {
            return Err(BrokerError::TopicExists(name.to_string()));
        }
        self.topics
            .insert(name.to_string(), Topic::new(name, self.ring_capacity));
        info!(topic = name, "topic created");
        Ok(())
    }

    /// Remove a topic. The registry entry goes first so concurrent
    /// operations immediately see the topic as absent; every captured
    /// subscriber then gets a deletion notice and its connection is closed.
    pub fn delete_topic(&mut self, name: &str) -> Result<()> {
        let topic = self
            .topics
            .remove(name)
            .ok_or_else(|| BrokerError::TopicNotFound(name.to_string()))?;
        for subscriber in topic.subscribers.into_values() {
            let _ = subscriber
                .connection
                .deliver(ServerEnvelope::info("topic_deleted", Some(name)));
            subscriber.connection.close();
        }
        info!(topic = name, "topic deleted");
        Ok(())
    }

    /// Subscribe a connection to a topic. Re-subscribing replaces the
    /// existing record silently (the table is keyed by connection id). On
    /// success an ack is emitted, followed by up to `last_n` replayed
    /// payloads pushed through the normal enqueue+drain path so that replay
    /// overflow is accounted like any other overflow.
    pub fn subscribe(
        &mut self,
        connection: &Connection,
        topic_name: &str,
        client_id: &str,
        last_n: Option<usize>,
        request_id: Option<String>,
    ) -> Result<()> {
        let queue_capacity = self.queue_capacity;
        let topic = self
            .topics
            .get_mut(topic_name)
            .ok_or_else(|| BrokerError::TopicNotFound(topic_name.to_string()))?;

        topic.subscribers.insert(
            connection.id.clone(),
            Subscriber {
                connection: connection.clone(),
                client_id: client_id.to_string(),
                queue: BoundedQueue::new(queue_capacity),
            },
        );
        topic.stats.subscribers = topic.subscribers.len();
        debug!(topic = topic_name, connection = %connection.id, client_id, "subscribed");

        let _ = connection.deliver(ServerEnvelope::ack(topic_name, timestamp(), request_id));

        let depth = last_n.unwrap_or(0);
        if depth > 0 {
            let replay = topic.ring.last(depth);
            if let Some(subscriber) = topic.subscribers.get_mut(&connection.id) {
                let mut dropped = 0;
                for message in replay {
                    dropped += subscriber.queue.push(Delivery {
                        topic: topic_name.to_string(),
                        message,
                    });
                }
                let delivered = Self::drain_subscriber(subscriber);
                topic.stats.dropped += dropped;
                topic.stats.delivered += delivered;
            }
        }
        Ok(())
    }

    /// Remove a connection's subscription to a topic. Idempotent: repeat
    /// calls after removal still ack.
    pub fn unsubscribe(
        &mut self,
        connection: &Connection,
        topic_name: &str,
        request_id: Option<String>,
    ) -> Result<()> {
        let topic = self
            .topics
            .get_mut(topic_name)
            .ok_or_else(|| BrokerError::TopicNotFound(topic_name.to_string()))?;
        if topic.subscribers.remove(&connection.id).is_some() {
            topic.stats.subscribers = topic.subscribers.len();
            debug!(topic = topic_name, connection = %connection.id, "unsubscribed");
        }
        let _ = connection.deliver(ServerEnvelope::ack(topic_name, timestamp(), request_id));
        Ok(())
    }

    /// Publish a payload to a topic: record it in the replay ring, then
    /// enqueue and drain for every current subscriber. Returns the publish
    /// timestamp for the caller's ack.
    pub fn publish(&mut self, topic_name: &str, message: PayloadEnvelope) -> Result<String> {
        let topic = self
            .topics
            .get_mut(topic_name)
            .ok_or_else(|| BrokerError::TopicNotFound(topic_name.to_string()))?;

        topic.stats.messages += 1;
        topic.ring.append(message.clone());

        let mut delivered = 0;
        let mut dropped = 0;
        for subscriber in topic.subscribers.values_mut() {
            dropped += subscriber.queue.push(Delivery {
                topic: topic_name.to_string(),
                message: message.clone(),
            });
            delivered += Self::drain_subscriber(subscriber);
        }
        topic.stats.delivered += delivered;
        topic.stats.dropped += dropped;

        Ok(timestamp())
    }

    /// Drain a subscriber's queue to its transport in batches, stopping as
    /// soon as the transport refuses an envelope. Refused entries go back to
    /// the queue head so they stay queued in order for the next drain.
    /// Returns how many envelopes the transport accepted.
    fn drain_subscriber(subscriber: &mut Subscriber) -> u64 {
        let mut delivered = 0;
        loop {
            let batch = subscriber.queue.drain(DRAIN_BATCH);
            if batch.is_empty() {
                return delivered;
            }
            let mut pending = batch.into_iter();
            while let Some(item) = pending.next() {
                let event = ServerEnvelope::event(&item.topic, item.message.clone());
                match subscriber.connection.deliver(event) {
                    Ok(()) => delivered += 1,
                    Err(DeliverError::Full) | Err(DeliverError::Closed) => {
                        let mut rest = vec![item];
                        rest.extend(pending);
                        subscriber.queue.requeue_front(rest);
                        return delivered;
                    }
                }
            }
        }
    }

    /// Remove a connection from the registry and from every topic it
    /// subscribed to. No notice is sent.
    pub fn handle_disconnect(&mut self, connection_id: &ConnectionId) {
        self.connections.remove(connection_id);
        for topic in self.topics.values_mut() {
            if topic.subscribers.remove(connection_id).is_some() {
                topic.stats.subscribers = topic.subscribers.len();
                debug!(topic = %topic.name, connection = %connection_id, "subscription dropped on disconnect");
            }
        }
    }

    /// Send a liveness `info` envelope to every registered connection.
    pub fn broadcast_heartbeat(&self) {
        for connection in self.connections.values() {
            if connection.deliver(ServerEnvelope::info("ping", None)).is_err() {
                warn!(connection = %connection.id, "heartbeat not delivered");
            }
        }
    }

    /// Periodic heartbeat broadcast. Missed ticks are skipped rather than
    /// queued, so at most one tick is ever in flight. Runs until the process
    /// shuts the task down.
    pub async fn start_heartbeat_loop(broker: Arc<Mutex<Broker>>, period: Duration) {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        interval.tick().await;
        loop {
            interval.tick().await;
            broker.lock().unwrap().broadcast_heartbeat();
        }
    }

    pub fn topic_count(&self) -> usize {
        self.topics.len()
    }

    /// Total subscriptions across topics. A connection subscribed to `k`
    /// topics counts `k` times.
    pub fn subscription_count(&self) -> usize {
        self.topics.values().map(|t| t.subscribers.len()).sum()
    }

    pub fn topic_summaries(&self) -> Vec<TopicSummary> {
        self.topics.values().map(Topic::summary).collect()
    }

    pub fn stats(&self) -> HashMap<String, TopicStats> {
        self.topics
            .iter()
            .map(|(name, topic)| (name.clone(), topic.stats.clone()))
            .collect()
    }

    pub fn topic(&self, name: &str) -> Option<&Topic> {
        self.topics.get(name)
    }
}
