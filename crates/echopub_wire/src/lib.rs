//! echopub_wire
//!
//! Shared protocol types for the echopub envelope protocol. Both directions
//! of the WebSocket channel carry JSON envelopes discriminated by a `type`
//! field; this crate owns the tagged unions so the broker can emit outbound
//! envelopes without depending on the transport layer.

pub mod envelope;

pub use envelope::{
    timestamp, ClientEnvelope, ErrorCode, ErrorDetail, PayloadEnvelope, ServerEnvelope,
};

#[cfg(test)]
mod tests;
