//! WebSocket session adapter
//!
//! Each upgraded connection gets a session: a send loop draining the
//! connection's outbound channel onto the socket, and a receive loop parsing
//! inbound envelopes and dispatching them to the broker under the lock.
//!
//! Fault handling per envelope:
//! - malformed JSON or an unknown `type` yields a `BAD_REQUEST` error
//!   envelope (echoing `request_id` when it can be salvaged)
//! - a missing topic yields `TOPIC_NOT_FOUND`
//! - anything else is contained as `INTERNAL`; the session stays open
//!
//! The broker lock is never held across socket I/O: dispatch only pushes
//! envelopes into the connection's channel, and the send loop does the
//! actual writes.

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use echopub_broker::BrokerError;
use echopub_client::Connection;
use echopub_wire::{ClientEnvelope, ErrorCode, ServerEnvelope};
use futures_util::{SinkExt, StreamExt};
use tracing::{debug, info, warn};

use crate::AppState;

/// Outbound channel depth between the broker and a connection's send loop.
/// When this buffer is full the broker leaves deliveries queued in the
/// subscriber's bounded queue rather than blocking or discarding them.
const OUTBOUND_BUFFER: usize = 256;

pub(crate) async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: AppState) {
    let (mut sink, mut stream) = socket.split();
    let (conn, mut outbound_rx, mut close_rx) = Connection::new(OUTBOUND_BUFFER);
    let conn_id = conn.id.clone();

    state.broker.lock().unwrap().register_connection(conn.clone());
    info!(connection = %conn_id, "client connected");

    // Send loop: envelopes out of the channel, JSON onto the socket. A close
    // signal ends the session with a proper Close frame.
    let send_task = tokio::spawn(async move {
        loop {
            tokio::select! {
                maybe = outbound_rx.recv() => {
                    let Some(envelope) = maybe else { break };
                    let text = match serde_json::to_string(&envelope) {
                        Ok(text) => text,
                        Err(err) => {
                            warn!(error = %err, "failed to serialize outbound envelope");
                            continue;
                        }
                    };
                    if sink.send(Message::Text(text)).await.is_err() {
                        break;
                    }
                }
                changed = close_rx.changed() => {
                    if changed.is_err() || *close_rx.borrow() {
                        // Flush envelopes that were queued before the close
                        // signal (deletion notices in particular), then say
                        // goodbye properly.
                        while let Ok(envelope) = outbound_rx.try_recv() {
                            let Ok(text) = serde_json::to_string(&envelope) else {
                                continue;
                            };
                            if sink.send(Message::Text(text)).await.is_err() {
                                break;
                            }
                        }
                        let _ = sink.send(Message::Close(None)).await;
                        break;
                    }
                }
            }
        }
    });

    // Receive loop: one envelope at a time, until the peer goes away or the
    // connection is force-closed (topic deletion).
    let mut closed = conn.close_signal();
    loop {
        tokio::select! {
            maybe = stream.next() => {
                match maybe {
                    Some(Ok(Message::Text(text))) => handle_envelope(&state, &conn, &text),
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {}
                    Some(Err(err)) => {
                        debug!(connection = %conn_id, error = %err, "socket error");
                        break;
                    }
                }
            }
            changed = closed.changed() => {
                if changed.is_err() || *closed.borrow() {
                    break;
                }
            }
        }
    }

    state.broker.lock().unwrap().handle_disconnect(&conn_id);
    conn.close();
    drop(conn);
    let _ = send_task.await;
    info!(connection = %conn_id, "client disconnected");
}

/// Process one inbound text frame end to end.
pub(crate) fn handle_envelope(state: &AppState, conn: &Connection, text: &str) {
    let envelope = match serde_json::from_str::<ClientEnvelope>(text) {
        Ok(envelope) => envelope,
        Err(err) => {
            debug!(connection = %conn.id, error = %err, "unrecognized envelope");
            let _ = conn.deliver(ServerEnvelope::error(
                ErrorCode::BadRequest,
                "unrecognized envelope",
                salvage_request_id(text),
            ));
            return;
        }
    };
    dispatch(state, conn, envelope);
}

/// Pull a `request_id` out of an envelope that failed to parse, so even a
/// rejection can be correlated by the client.
fn salvage_request_id(text: &str) -> Option<String> {
    serde_json::from_str::<serde_json::Value>(text)
        .ok()?
        .get("request_id")?
        .as_str()
        .map(str::to_string)
}

fn dispatch(state: &AppState, conn: &Connection, envelope: ClientEnvelope) {
    match envelope {
        ClientEnvelope::Subscribe {
            topic,
            client_id,
            last_n,
            request_id,
        } => {
            let result = state.broker.lock().unwrap().subscribe(
                conn,
                &topic,
                &client_id,
                last_n,
                request_id.clone(),
            );
            if let Err(err) = result {
                let _ = conn.deliver(error_envelope(&err, request_id));
            }
        }
        ClientEnvelope::Unsubscribe {
            topic,
            client_id: _,
            request_id,
        } => {
            let result = state
                .broker
                .lock()
                .unwrap()
                .unsubscribe(conn, &topic, request_id.clone());
            if let Err(err) = result {
                let _ = conn.deliver(error_envelope(&err, request_id));
            }
        }
        ClientEnvelope::Publish {
            topic,
            message,
            request_id,
        } => {
            let result = state.broker.lock().unwrap().publish(&topic, message);
            match result {
                Ok(ts) => {
                    let _ = conn.deliver(ServerEnvelope::ack(&topic, ts, request_id));
                }
                Err(err) => {
                    let _ = conn.deliver(error_envelope(&err, request_id));
                }
            }
        }
        ClientEnvelope::Ping { request_id } => {
            let _ = conn.deliver(ServerEnvelope::pong(request_id));
        }
    }
}

/// Map a broker failure onto the wire. A missing topic is the expected
/// failure mode; anything else is contained as `INTERNAL`.
fn error_envelope(err: &BrokerError, request_id: Option<String>) -> ServerEnvelope {
    match err {
        BrokerError::TopicNotFound(topic) => ServerEnvelope::error(
            ErrorCode::TopicNotFound,
            &format!("topic not found: {topic}"),
            request_id,
        ),
        other => {
            warn!(error = %other, "envelope processing failed");
            ServerEnvelope::error(ErrorCode::Internal, "internal error", request_id)
        }
    }
}
