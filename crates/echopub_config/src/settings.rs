use serde::Deserialize;

/// Top-level configuration for the echopub server.
#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    /// Network settings: bind address and port for the combined HTTP/ws server.
    pub server: ServerSettings,
    /// Operational parameters for the broker core.
    pub broker: BrokerSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    /// The host address (e.g. "127.0.0.1" or "0.0.0.0") the server binds to.
    pub host: String,
    /// The port serving both the HTTP surface and the `/ws` endpoint.
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BrokerSettings {
    /// Per-topic replay ring capacity. Zero disables retention.
    pub ring_buffer_size: usize,
    /// Per-subscriber outbound queue capacity.
    pub subscriber_queue_size: usize,
    /// Cadence of the broadcast `info: ping` heartbeat.
    pub heartbeat_interval_ms: u64,
}

/// Partial configuration loaded from files or environment. Missing values
/// fall back to the defaults.
#[derive(Debug, Deserialize)]
pub struct PartialSettings {
    pub server: Option<PartialServerSettings>,
    pub broker: Option<PartialBrokerSettings>,
}

#[derive(Debug, Deserialize)]
pub struct PartialServerSettings {
    pub host: Option<String>,
    pub port: Option<u16>,
}

#[derive(Debug, Deserialize)]
pub struct PartialBrokerSettings {
    pub ring_buffer_size: Option<usize>,
    pub subscriber_queue_size: Option<usize>,
    pub heartbeat_interval_ms: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerSettings {
                host: "127.0.0.1".to_string(),
                port: 4000,
            },
            broker: BrokerSettings {
                ring_buffer_size: 100,
                subscriber_queue_size: 512,
                heartbeat_interval_ms: 30_000,
            },
        }
    }
}
