//! Health, scrape and root endpoints

use axum::{
    extract::State,
    http::{header, HeaderValue},
    response::IntoResponse,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::api::types::{Json, MessageResponse};

use super::state::AppState;

/// Prometheus text exposition content type
pub const METRICS_CONTENT_TYPE: &str = "text/plain; version=0.0.4";

/// Health check status
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub timestamp: DateTime<Utc>,
    pub uptime_seconds: u64,
    pub version: String,
}

/// Liveness check - returns 200 while the process is serving
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: HealthStatus::Healthy,
        timestamp: Utc::now(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Render the metrics registry for scraping
pub async fn metrics_handler(State(state): State<AppState>) -> impl IntoResponse {
    (
        [(
            header::CONTENT_TYPE,
            HeaderValue::from_static(METRICS_CONTENT_TYPE),
        )],
        state.metrics.render(),
    )
}

/// GET /
pub async fn root() -> Json<MessageResponse> {
    Json(MessageResponse::new("Todo App API"))
}
