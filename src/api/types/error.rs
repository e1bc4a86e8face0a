//! API error type and `{"detail": ...}` error bodies

use std::backtrace::Backtrace;
use std::sync::Arc;

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

/// Body returned for every error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    pub detail: String,
}

/// An internal failure carried to the request pipeline in response
/// extensions. The pipeline logs and counts it; clients never see it.
#[derive(Debug, Clone)]
pub struct UnhandledError {
    /// Exception type label, e.g. `StorageError` or `panic`
    pub kind: &'static str,
    pub error: Arc<anyhow::Error>,
    /// Captured where the 500 was built, regardless of `RUST_BACKTRACE`
    pub backtrace: Arc<Backtrace>,
}

const INTERNAL_ERROR_DETAIL: &str = "Internal server error";
const INVALID_CREDENTIALS_DETAIL: &str = "Could not validate credentials";

/// API error with status code
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub response: ApiErrorResponse,
    /// Add `WWW-Authenticate: Bearer`
    challenge: bool,
    source: Option<UnhandledError>,
}

impl ApiError {
    pub fn new(status: StatusCode, detail: impl Into<String>) -> Self {
        Self {
            status,
            response: ApiErrorResponse {
                detail: detail.into(),
            },
            challenge: false,
            source: None,
        }
    }

    pub fn bad_request(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, detail)
    }

    /// 401 with a bearer challenge
    pub fn unauthorized(detail: impl Into<String>) -> Self {
        Self {
            challenge: true,
            ..Self::new(StatusCode::UNAUTHORIZED, detail)
        }
    }

    /// The single 401 returned for every identity resolution failure
    pub fn invalid_credentials() -> Self {
        Self::unauthorized(INVALID_CREDENTIALS_DETAIL)
    }

    pub fn not_found(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, detail)
    }

    pub fn unprocessable(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, detail)
    }

    /// 500 with a generic body; the error itself goes to the pipeline
    pub fn internal(kind: &'static str, error: impl Into<anyhow::Error>) -> Self {
        Self {
            source: Some(UnhandledError {
                kind,
                error: Arc::new(error.into()),
                backtrace: Arc::new(Backtrace::force_capture()),
            }),
            ..Self::new(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_DETAIL)
        }
    }

    pub fn detail(&self) -> &str {
        &self.response.detail
    }

    pub fn unhandled(&self) -> Option<&UnhandledError> {
        self.source.as_ref()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut response = (self.status, Json(self.response)).into_response();

        if self.challenge {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }

        if let Some(source) = self.source {
            response.extensions_mut().insert(source);
        }

        response
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::NotFound { message } => Self::not_found(message),
            DomainError::Validation { message } => Self::unprocessable(message),
            DomainError::Conflict { message } => Self::bad_request(message),
            other @ (DomainError::Configuration { .. }
            | DomainError::Storage { .. }
            | DomainError::Internal { .. }) => Self::internal(other.kind(), other),
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.status.as_u16(), self.response.detail)
    }
}

impl std::error::Error for ApiError {}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_error_body_shape() {
        let response = ApiError::not_found("Task not found").into_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(response.headers().get(header::WWW_AUTHENTICATE).is_none());
        assert_eq!(
            body_json(response).await,
            serde_json::json!({"detail": "Task not found"})
        );
    }

    #[test]
    fn test_unauthorized_adds_challenge() {
        let response = ApiError::invalid_credentials().into_response();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.headers().get(header::WWW_AUTHENTICATE).unwrap(),
            "Bearer"
        );
    }

    #[tokio::test]
    async fn test_internal_hides_error_and_attaches_it() {
        let err = ApiError::internal("StorageError", anyhow::anyhow!("connection reset"));
        assert_eq!(err.unhandled().map(|u| u.kind), Some("StorageError"));

        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let unhandled = response.extensions().get::<UnhandledError>().unwrap();
        assert_eq!(unhandled.kind, "StorageError");
        assert!(unhandled.error.to_string().contains("connection reset"));
        assert_eq!(
            unhandled.backtrace.status(),
            std::backtrace::BacktraceStatus::Captured
        );

        let body = body_json(response).await;
        assert_eq!(body["detail"], "Internal server error");
        assert!(!body.to_string().contains("connection reset"));
    }

    #[test]
    fn test_domain_error_conversion() {
        let cases = [
            (DomainError::not_found("x"), StatusCode::NOT_FOUND),
            (DomainError::validation("x"), StatusCode::UNPROCESSABLE_ENTITY),
            (DomainError::conflict("x"), StatusCode::BAD_REQUEST),
            (DomainError::storage("x"), StatusCode::INTERNAL_SERVER_ERROR),
            (DomainError::internal("x"), StatusCode::INTERNAL_SERVER_ERROR),
            (
                DomainError::configuration("x"),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (domain_err, status) in cases {
            assert_eq!(ApiError::from(domain_err).status, status);
        }
    }

    #[test]
    fn test_client_errors_keep_message() {
        let err = ApiError::from(DomainError::conflict("Email already registered"));
        assert_eq!(err.detail(), "Email already registered");
        assert!(err.unhandled().is_none());
    }

    #[test]
    fn test_storage_error_kind_is_preserved() {
        let err = ApiError::from(DomainError::storage("pool timed out"));

        assert_eq!(err.detail(), "Internal server error");
        assert_eq!(err.unhandled().map(|u| u.kind), Some("StorageError"));
    }
}
