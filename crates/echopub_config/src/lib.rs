//! echopub_config
//!
//! Layered configuration: an optional `config/default` file (TOML/YAML/JSON)
//! and `ECHOPUB__`-prefixed environment variables merged over built-in
//! defaults. Environment keys use `__` between path segments so multi-word
//! field names survive, e.g. `ECHOPUB__BROKER__RING_BUFFER_SIZE=50` or
//! `ECHOPUB__SERVER__PORT=4100`.

pub mod settings;

use config::{Config, ConfigError, Environment, File};

use crate::settings::PartialSettings;

pub use settings::{BrokerSettings, ServerSettings, Settings};

/// Load settings from file, environment and defaults, in that precedence.
///
/// # Errors
///
/// Returns an error if the config file cannot be parsed or deserialized.
pub fn load_config() -> Result<Settings, ConfigError> {
    let builder = Config::builder()
        .add_source(File::with_name("config/default").required(false))
        .add_source(Environment::with_prefix("ECHOPUB").separator("__"));

    let config = builder.build()?;
    let partial: PartialSettings = config.try_deserialize()?;
    let default = Settings::default();

    Ok(Settings {
        server: ServerSettings {
            host: partial
                .server
                .as_ref()
                .and_then(|s| s.host.clone())
                .unwrap_or(default.server.host),
            port: partial
                .server
                .as_ref()
                .and_then(|s| s.port)
                .unwrap_or(default.server.port),
        },
        broker: BrokerSettings {
            ring_buffer_size: partial
                .broker
                .as_ref()
                .and_then(|b| b.ring_buffer_size)
                .unwrap_or(default.broker.ring_buffer_size),
            subscriber_queue_size: partial
                .broker
                .as_ref()
                .and_then(|b| b.subscriber_queue_size)
                .unwrap_or(default.broker.subscriber_queue_size),
            heartbeat_interval_ms: partial
                .broker
                .as_ref()
                .and_then(|b| b.heartbeat_interval_ms)
                .unwrap_or(default.broker.heartbeat_interval_ms),
        },
    })
}

#[cfg(test)]
mod tests;
