//! HTTP admission and observability handlers
//!
//! Topics are created and deleted over plain REST; the same surface exposes
//! the health, topic-list and per-topic stats snapshots. Name validation
//! happens here, not in the broker.

use std::collections::HashMap;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use echopub_broker::{TopicStats, TopicSummary};
use serde::{Deserialize, Serialize};

use crate::AppState;

const TOPIC_NAME_MAX: usize = 200;

/// Admission check: `^[A-Za-z0-9._-]{1,200}$`.
pub(crate) fn valid_topic_name(name: &str) -> bool {
    !name.is_empty()
        && name.len() <= TOPIC_NAME_MAX
        && name
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'.' | b'_' | b'-'))
}

#[derive(Debug, Deserialize)]
pub struct CreateTopicRequest {
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct TopicStatusResponse {
    pub status: &'static str,
    pub topic: String,
}

#[derive(Debug, Serialize)]
pub struct BadRequestResponse {
    pub error: &'static str,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct TopicListResponse {
    pub topics: Vec<TopicSummary>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub uptime_sec: u64,
    pub topics: usize,
    pub subscribers: usize,
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub topics: HashMap<String, TopicStats>,
}

fn invalid_name(name: &str) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(BadRequestResponse {
            error: "BAD_REQUEST",
            message: format!("invalid topic name: {name:?}"),
        }),
    )
        .into_response()
}

fn topic_status(status_code: StatusCode, status: &'static str, topic: String) -> Response {
    (status_code, Json(TopicStatusResponse { status, topic })).into_response()
}

pub(crate) async fn create_topic(
    State(state): State<AppState>,
    Json(req): Json<CreateTopicRequest>,
) -> Response {
    if !valid_topic_name(&req.name) {
        return invalid_name(&req.name);
    }
    let result = state.broker.lock().unwrap().create_topic(&req.name);
    match result {
        Ok(()) => topic_status(StatusCode::CREATED, "created", req.name),
        Err(_) => topic_status(StatusCode::CONFLICT, "conflict", req.name),
    }
}

pub(crate) async fn delete_topic(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Response {
    if !valid_topic_name(&name) {
        return invalid_name(&name);
    }
    let result = state.broker.lock().unwrap().delete_topic(&name);
    match result {
        Ok(()) => topic_status(StatusCode::OK, "deleted", name),
        Err(_) => topic_status(StatusCode::NOT_FOUND, "not_found", name),
    }
}

pub(crate) async fn list_topics(State(state): State<AppState>) -> Json<TopicListResponse> {
    let topics = state.broker.lock().unwrap().topic_summaries();
    Json(TopicListResponse { topics })
}

pub(crate) async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let broker = state.broker.lock().unwrap();
    Json(HealthResponse {
        uptime_sec: state.started_at.elapsed().as_secs(),
        topics: broker.topic_count(),
        subscribers: broker.subscription_count(),
    })
}

pub(crate) async fn stats(State(state): State<AppState>) -> Json<StatsResponse> {
    let topics = state.broker.lock().unwrap().stats();
    Json(StatsResponse { topics })
}
