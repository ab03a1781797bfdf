//! Connection handles
//!
//! `Connection` models one connected WebSocket client: a uuid identity, the
//! sending side of the bounded per-connection outbound channel, and a close
//! signal. The broker holds clones of the handle (in its connection registry
//! and inside subscriber records) and uses it only to emit outbound envelopes
//! or to force the connection shut; the transport owns the socket itself and
//! the receiving side of both channels.
//!
//! Delivery is non-blocking. `deliver` refuses rather than waits when the
//! outbound buffer is full, and the broker reacts by leaving the item in the
//! subscriber's bounded queue for a later drain. A refused or lost envelope
//! never blocks a broker operation.

use std::sync::Arc;

use echopub_wire::ServerEnvelope;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, watch};
use uuid::Uuid;

pub type ConnectionId = String;

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum DeliverError {
    #[error("outbound buffer full")]
    Full,
    #[error("connection closed")]
    Closed,
}

#[derive(Debug, Clone)]
pub struct Connection {
    pub id: ConnectionId,
    outbound: mpsc::Sender<ServerEnvelope>,
    close: Arc<watch::Sender<bool>>,
}

impl Connection {
    /// Create a connection handle with an outbound buffer of `buffer`
    /// envelopes. Returns the handle plus the receiving ends the transport's
    /// send loop consumes: the envelope stream and the close signal.
    pub fn new(buffer: usize) -> (Self, mpsc::Receiver<ServerEnvelope>, watch::Receiver<bool>) {
        let (outbound, outbound_rx) = mpsc::channel(buffer);
        let (close, close_rx) = watch::channel(false);
        let conn = Self {
            id: Uuid::new_v4().to_string(),
            outbound,
            close: Arc::new(close),
        };
        (conn, outbound_rx, close_rx)
    }

    /// Hand an envelope to the transport. Never blocks; a full buffer or a
    /// gone socket is reported to the caller, not retried.
    pub fn deliver(&self, envelope: ServerEnvelope) -> Result<(), DeliverError> {
        self.outbound.try_send(envelope).map_err(|err| match err {
            TrySendError::Full(_) => DeliverError::Full,
            TrySendError::Closed(_) => DeliverError::Closed,
        })
    }

    /// Signal the transport to close the socket. Idempotent.
    pub fn close(&self) {
        let _ = self.close.send(true);
    }

    /// A fresh receiver on the close signal, for tasks that also need to
    /// observe forced shutdown.
    pub fn close_signal(&self) -> watch::Receiver<bool> {
        self.close.subscribe()
    }

    pub fn is_closed(&self) -> bool {
        *self.close.borrow()
    }
}
