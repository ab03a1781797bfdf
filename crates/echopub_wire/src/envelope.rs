//! Envelope definitions
//!
//! `ClientEnvelope` covers everything a client may send
//! (`subscribe | unsubscribe | publish | ping`); `ServerEnvelope` covers
//! everything the server may emit (`ack | event | error | pong | info`).
//! Parsing rejects unknown `type` discriminants, which the session reports as
//! `BAD_REQUEST`.
//!
//! Notes on fields:
//! - `request_id`: opaque correlation id; when a client supplies one it is
//!   echoed on the corresponding reply and never on broadcast envelopes
//! - `ts`: ISO-8601 UTC timestamp, stamped by the server on every outbound
//!   envelope
//! - `last_n`: replay depth for `subscribe`; absent or zero means no replay

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A published message as the broker carries it: a caller-supplied opaque
/// `id` and an arbitrary JSON `payload` passed through unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayloadEnvelope {
    pub id: String,
    pub payload: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClientEnvelope {
    #[serde(rename = "subscribe")]
    Subscribe {
        topic: String,
        client_id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        last_n: Option<usize>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        request_id: Option<String>,
    },
    #[serde(rename = "unsubscribe")]
    Unsubscribe {
        topic: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        client_id: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        request_id: Option<String>,
    },
    #[serde(rename = "publish")]
    Publish {
        topic: String,
        message: PayloadEnvelope,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        request_id: Option<String>,
    },
    #[serde(rename = "ping")]
    Ping {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        request_id: Option<String>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ServerEnvelope {
    #[serde(rename = "ack")]
    Ack {
        topic: String,
        status: String,
        ts: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        request_id: Option<String>,
    },
    #[serde(rename = "event")]
    Event {
        topic: String,
        message: PayloadEnvelope,
        ts: String,
    },
    #[serde(rename = "error")]
    Error {
        error: ErrorDetail,
        ts: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        request_id: Option<String>,
    },
    #[serde(rename = "pong")]
    Pong {
        ts: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        request_id: Option<String>,
    },
    #[serde(rename = "info")]
    Info {
        msg: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        topic: Option<String>,
        ts: String,
    },
}

/// The closed set of protocol error codes. `SLOW_CONSUMER` and `UNAUTHORIZED`
/// are reserved by the protocol and never emitted by this server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    #[serde(rename = "BAD_REQUEST")]
    BadRequest,
    #[serde(rename = "TOPIC_NOT_FOUND")]
    TopicNotFound,
    #[serde(rename = "SLOW_CONSUMER")]
    SlowConsumer,
    #[serde(rename = "UNAUTHORIZED")]
    Unauthorized,
    #[serde(rename = "INTERNAL")]
    Internal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub code: ErrorCode,
    pub message: String,
}

/// Current time as ISO-8601 UTC with millisecond precision.
pub fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

impl ServerEnvelope {
    pub fn ack(topic: &str, ts: String, request_id: Option<String>) -> Self {
        Self::Ack {
            topic: topic.to_string(),
            status: "ok".to_string(),
            ts,
            request_id,
        }
    }

    pub fn event(topic: &str, message: PayloadEnvelope) -> Self {
        Self::Event {
            topic: topic.to_string(),
            message,
            ts: timestamp(),
        }
    }

    pub fn error(code: ErrorCode, message: &str, request_id: Option<String>) -> Self {
        Self::Error {
            error: ErrorDetail {
                code,
                message: message.to_string(),
            },
            ts: timestamp(),
            request_id,
        }
    }

    pub fn pong(request_id: Option<String>) -> Self {
        Self::Pong {
            ts: timestamp(),
            request_id,
        }
    }

    pub fn info(msg: &str, topic: Option<&str>) -> Self {
        Self::Info {
            msg: msg.to_string(),
            topic: topic.map(str::to_string),
            ts: timestamp(),
        }
    }
}
