//! Category endpoints

use axum::{
    extract::State,
    routing::{get, MethodRouter},
    Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::api::middleware::RequireUser;
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::Category;
use crate::infrastructure::category::CreateCategoryRequest;

pub fn create_categories_router() -> Router<AppState> {
    Router::new().route("/", collection())
}

/// Also mounted at `/categories/`
pub fn collection() -> MethodRouter<AppState> {
    get(list_categories).post(create_category)
}

#[derive(Debug, Deserialize)]
pub struct CategoryCreate {
    pub name: String,
    #[serde(default)]
    pub color: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CategoryResponse {
    pub id: i64,
    pub name: String,
    pub color: String,
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
}

impl From<Category> for CategoryResponse {
    fn from(category: Category) -> Self {
        Self {
            id: category.id.value(),
            name: category.name,
            color: category.color,
            user_id: category.user_id.value(),
            created_at: category.created_at,
        }
    }
}

/// POST /categories
pub async fn create_category(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Json(request): Json<CategoryCreate>,
) -> Result<Json<CategoryResponse>, ApiError> {
    let category = state
        .categories
        .create(
            user.id(),
            CreateCategoryRequest {
                name: request.name,
                color: request.color,
            },
        )
        .await?;

    Ok(Json(category.into()))
}

/// GET /categories
pub async fn list_categories(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> Result<Json<Vec<CategoryResponse>>, ApiError> {
    let categories = state.categories.list(user.id()).await?;
    Ok(Json(categories.into_iter().map(Into::into).collect()))
}
