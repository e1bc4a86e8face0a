//! Authentication API endpoints
//!
//! Registration and password login issuing JWT bearer tokens.

use axum::{extract::State, routing::post, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::user::User;
use crate::infrastructure::user::RegisterRequest;

const LOGIN_FAILED_DETAIL: &str = "Incorrect email or password";

/// Create the authentication router
pub fn create_auth_router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
}

/// Email and password, used for both registration and login
#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

/// User response (safe to expose)
#[derive(Debug, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: i64,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id().value(),
            email: user.email().to_string(),
            created_at: user.created_at(),
        }
    }
}

/// POST /auth/register
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<CredentialsRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = state
        .users
        .register(RegisterRequest {
            email: request.email,
            password: request.password,
        })
        .await?;

    info!(user_id = %user.id(), "User registered");
    Ok(Json(UserResponse::from(&user)))
}

/// POST /auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<CredentialsRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let user = state
        .users
        .authenticate(&request.email, &request.password)
        .await?
        .ok_or_else(|| ApiError::unauthorized(LOGIN_FAILED_DETAIL))?;

    let access_token = state
        .tokens
        .issue(user.email(), None)
        .map_err(|e| ApiError::internal("TokenError", e))?;

    info!(user_id = %user.id(), "User logged in");
    Ok(Json(TokenResponse {
        access_token,
        token_type: "bearer".to_string(),
    }))
}
