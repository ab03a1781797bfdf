//! echopub_transport
//!
//! One axum server carries the whole external surface: the HTTP admission
//! and observability endpoints (`/topics`, `/health`, `/stats`) and the
//! WebSocket session endpoint (`/ws`). The transport owns the sockets and
//! translates between the wire envelopes and broker calls; the broker itself
//! lives behind `Arc<Mutex<_>>` and never touches the network.

pub mod http;
pub mod websocket;

use std::sync::{Arc, Mutex};
use std::time::Instant;

use axum::routing::{delete, get, post};
use axum::Router;
use echopub_broker::Broker;
use tower_http::trace::TraceLayer;
use tracing::info;

#[derive(Clone)]
pub struct AppState {
    pub broker: Arc<Mutex<Broker>>,
    pub started_at: Instant,
}

/// Build the full application router: admission, observability and the
/// WebSocket endpoint, sharing one broker.
pub fn router(broker: Arc<Mutex<Broker>>) -> Router {
    let state = AppState {
        broker,
        started_at: Instant::now(),
    };
    Router::new()
        .route("/topics", post(http::create_topic).get(http::list_topics))
        .route("/topics/:name", delete(http::delete_topic))
        .route("/health", get(http::health))
        .route("/stats", get(http::stats))
        .route("/ws", get(websocket::ws_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind and serve until the process shuts down.
pub async fn serve(addr: &str, broker: Arc<Mutex<Broker>>) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("listening on http://{addr} (sessions at ws://{addr}/ws)");
    axum::serve(listener, router(broker)).await
}
