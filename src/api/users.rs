//! Current user endpoint

use axum::{routing::get, Router};

use crate::api::auth::UserResponse;
use crate::api::middleware::RequireUser;
use crate::api::state::AppState;
use crate::api::types::Json;

pub fn create_users_router() -> Router<AppState> {
    Router::new().route("/me", get(get_current_user))
}

/// GET /users/me
pub async fn get_current_user(RequireUser(user): RequireUser) -> Json<UserResponse> {
    Json(UserResponse::from(&user))
}
