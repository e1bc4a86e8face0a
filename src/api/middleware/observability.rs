//! Per-request timing, metrics and logging
//!
//! Wraps every route except the health and scrape endpoints. Handlers and the
//! panic catcher report internal failures through an [`UnhandledError`]
//! response extension; this middleware logs and counts them once and passes
//! the response through unchanged.
//!
//! Note: no span is created here since `TraceLayer` already opens one per
//! request.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::{Body, HttpBody},
    extract::{ConnectInfo, MatchedPath, State},
    http::{header, HeaderMap, Request},
    middleware::Next,
    response::Response,
};
use sha2::{Digest, Sha256};
use tracing::{error, info};

use crate::api::types::UnhandledError;
use crate::infrastructure::observability::{sanitize_path, MetricsRegistry, RequestSample};

/// Paths served without timing, metrics or request logs
const BYPASS_PATHS: &[&str] = &["/health", "/metrics"];

const UNKNOWN_CLIENT: &str = "unknown";

pub async fn observability_middleware(
    State(metrics): State<Arc<MetricsRegistry>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if BYPASS_PATHS.contains(&request.uri().path()) {
        return next.run(request).await;
    }

    let start = Instant::now();
    let _in_flight = metrics.start_request();

    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let endpoint = endpoint_label(&request);
    let client = client_address(&request);
    let request_id = request_id(&client);

    info!(
        method = %method,
        path = %path,
        client = %client,
        request_id = %request_id,
        headers = %redact_headers(request.headers()),
        "Request started"
    );

    let response = next.run(request).await;
    let latency = start.elapsed();
    let status = response.status();

    if let Some(unhandled) = response.extensions().get::<UnhandledError>() {
        metrics.record_exception(unhandled.kind, &endpoint);
        error!(
            method = %method,
            path = %path,
            request_id = %request_id,
            exception_type = unhandled.kind,
            error = ?unhandled.error,
            backtrace = %unhandled.backtrace,
            "Unhandled error while serving request"
        );
    }

    metrics.record_request(&RequestSample {
        method: method.as_str(),
        endpoint: &endpoint,
        status_code: status.as_u16(),
        latency,
        size: response_size(&response),
    });

    info!(
        method = %method,
        path = %path,
        status = %status.as_u16(),
        duration_ms = %latency.as_millis(),
        request_id = %request_id,
        "Request completed"
    );

    response
}

/// Route template when one matched, else the sanitized raw path
fn endpoint_label(request: &Request<Body>) -> String {
    request
        .extensions()
        .get::<MatchedPath>()
        .map(|mp| mp.as_str().to_string())
        .unwrap_or_else(|| sanitize_path(request.uri().path()))
}

fn client_address(request: &Request<Body>) -> String {
    if let Some(ConnectInfo(addr)) = request.extensions().get::<ConnectInfo<SocketAddr>>() {
        return addr.ip().to_string();
    }

    let headers = request.headers();
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty());

    forwarded
        .or_else(|| {
            headers
                .get("x-real-ip")
                .and_then(|v| v.to_str().ok())
                .map(str::trim)
                .filter(|v| !v.is_empty())
        })
        .unwrap_or(UNKNOWN_CLIENT)
        .to_string()
}

/// `<unix-millis>-<4 hex chars of sha256(client)>`; collisions are accepted
fn request_id(client: &str) -> String {
    let digest = Sha256::digest(client.as_bytes());
    format!(
        "{}-{}",
        chrono::Utc::now().timestamp_millis(),
        hex::encode(&digest[..2])
    )
}

fn response_size(response: &Response) -> Option<u64> {
    response
        .headers()
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok())
        .or_else(|| response.body().size_hint().exact())
}

/// Redact sensitive headers for logging
fn redact_headers(headers: &HeaderMap) -> String {
    headers
        .iter()
        .filter(|(name, _)| should_log_header(name.as_str()))
        .map(|(name, value)| {
            let value = if is_sensitive_header(name.as_str()) {
                "[REDACTED]"
            } else {
                value.to_str().unwrap_or("[invalid]")
            };
            format!("{}={}", name.as_str(), value)
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn is_sensitive_header(name: &str) -> bool {
    matches!(
        name,
        "authorization" | "cookie" | "set-cookie" | "proxy-authorization" | "x-auth-token"
    )
}

fn should_log_header(name: &str) -> bool {
    matches!(
        name,
        "content-type"
            | "content-length"
            | "accept"
            | "user-agent"
            | "x-forwarded-for"
            | "x-real-ip"
            | "authorization"
            | "cookie"
    )
}
