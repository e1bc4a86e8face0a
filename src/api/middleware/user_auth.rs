//! User authentication using JWT bearer tokens

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap},
};
use tracing::debug;

use crate::api::state::AppState;
use crate::api::types::ApiError;
use crate::domain::user::User;

/// Extractor that requires a valid JWT token for an active user
///
/// Only the `Authorization: Bearer <jwt_token>` header is accepted.
#[derive(Debug, Clone)]
pub struct RequireUser(pub User);

impl FromRequestParts<AppState> for RequireUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        resolve_identity(&parts.headers, state).await.map(RequireUser)
    }
}

/// Turn the bearer token in `headers` into the current user.
///
/// Every failure short of a storage error yields the same 401 so callers
/// cannot tell an unknown account from a bad token.
pub async fn resolve_identity(headers: &HeaderMap, state: &AppState) -> Result<User, ApiError> {
    let token = extract_bearer_token(headers).ok_or_else(ApiError::invalid_credentials)?;

    let subject = state.tokens.verify(token).map_err(|e| {
        debug!(error = %e, "Rejected bearer token");
        ApiError::invalid_credentials()
    })?;

    match state.users.resolve_subject(&subject).await? {
        Some(user) => Ok(user),
        None => {
            debug!("Token subject does not resolve to an active user");
            Err(ApiError::invalid_credentials())
        }
    }
}

/// Extract the token from an `Authorization: Bearer` header
pub fn extract_bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();

    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}
