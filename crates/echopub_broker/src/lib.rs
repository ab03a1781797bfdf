//! echopub_broker
//!
//! The broker crate contains the in-memory publish/subscribe engine:
//! - managing the topic registry and per-topic subscriber tables
//! - fanning publishes out through bounded per-subscriber queues with a
//!   drop-oldest overflow policy
//! - retaining a per-topic replay ring for late joiners
//! - broadcasting heartbeats and snapshotting health/stats views
//!
//! Public types:
//! - `Broker`: the registry and fan-out engine
//! - `BoundedQueue`, `ReplayRing`, `Topic`: the building blocks, exposed for
//!   reuse and tests
//!
//! This crate is intended to be used by a transport crate (the WebSocket
//! session adapter and the HTTP admission layer) or binary crates that wire
//! together network and configuration.

pub mod engine;
pub mod queue;
pub mod ring;
pub mod topic;

pub use engine::{Broker, BrokerError};
pub use queue::{BoundedQueue, Delivery};
pub use ring::ReplayRing;
pub use topic::{Subscriber, Topic, TopicStats, TopicSummary};
