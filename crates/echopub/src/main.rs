//! CLI for echopub
//!
//! Subcommands:
//! - `server`: run the combined HTTP/WebSocket broker
//! - `client`: run a scripted smoke client (useful against a live server)

use clap::Parser;
use echopub_broker::Broker;
use echopub_config::load_config;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "echopub")]
enum Command {
    /// Start the broker server
    Server,
    /// Run the example client (connects, subscribes, publishes, prints
    /// everything the server sends back)
    Client {
        /// WebSocket URL of a running server
        #[arg(long, default_value = "ws://127.0.0.1:4000/ws")]
        url: String,
        /// Topic to subscribe and publish to (create it over HTTP first)
        #[arg(long, default_value = "demo")]
        topic: String,
        /// Replay depth requested on subscribe
        #[arg(long, default_value_t = 0)]
        last_n: usize,
    },
}

#[tokio::main]
async fn main() {
    echopub_utils::logging::init("info");

    let cmd = Command::parse();

    match cmd {
        Command::Server => {
            if let Err(e) = run_server().await {
                error!("Server failed: {e}");
            }
        }
        Command::Client { url, topic, last_n } => {
            if let Err(e) = run_client(&url, &topic, last_n).await {
                error!("Client failed: {e}");
            }
        }
    }
}

async fn run_server() -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config()?;
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let broker = Arc::new(Mutex::new(Broker::new(
        config.broker.ring_buffer_size,
        config.broker.subscriber_queue_size,
    )));

    tokio::spawn(Broker::start_heartbeat_loop(
        broker.clone(),
        Duration::from_millis(config.broker.heartbeat_interval_ms),
    ));

    tokio::select! {
        result = echopub_transport::serve(&addr, broker) => {
            if let Err(e) = result {
                error!("Server exited unexpectedly: {e}");
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received. Exiting gracefully.");
        }
    }

    Ok(())
}

async fn run_client(
    url: &str,
    topic: &str,
    last_n: usize,
) -> Result<(), Box<dyn std::error::Error>> {
    use futures_util::{SinkExt, StreamExt};
    use serde_json::json;
    use tokio_tungstenite::connect_async;
    use tokio_tungstenite::tungstenite::Message as WsMessage;

    let (mut ws_stream, _response) = connect_async(url).await?;

    let subscribe = json!({
        "type": "subscribe",
        "topic": topic,
        "client_id": "echopub-cli",
        "last_n": last_n,
        "request_id": "cli-subscribe"
    });
    ws_stream
        .send(WsMessage::Text(subscribe.to_string()))
        .await?;

    let publish = json!({
        "type": "publish",
        "topic": topic,
        "message": {"id": "cli-hello", "payload": {"msg": "hello from echopub"}},
        "request_id": "cli-publish"
    });
    ws_stream.send(WsMessage::Text(publish.to_string())).await?;

    // Print whatever comes back until the server or the user hangs up.
    loop {
        tokio::select! {
            maybe = ws_stream.next() => {
                match maybe {
                    Some(Ok(WsMessage::Text(msg))) => println!("{msg}"),
                    Some(Ok(WsMessage::Close(_))) | None => break,
                    Some(Ok(_)) => {}
                    Some(Err(e)) => return Err(e.into()),
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    Ok(())
}
