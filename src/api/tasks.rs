//! Task endpoints
//!
//! Every route is scoped to the authenticated user. Another user's task is
//! reported exactly like a missing one.

use axum::{
    extract::State,
    routing::{get, patch, MethodRouter},
    Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::api::middleware::RequireUser;
use crate::api::state::AppState;
use crate::api::types::{double_option, ApiError, Json, MessageResponse, Path, Query};
use crate::domain::category::CategoryId;
use crate::domain::task::{TaskChanges, TaskFilter, TaskPriority};
use crate::domain::{Task, TaskId, TaskStats};
use crate::infrastructure::task::CreateTaskRequest;

pub fn create_tasks_router() -> Router<AppState> {
    Router::new()
        .route("/", collection())
        .route("/stats", get(task_stats))
        .route(
            "/{task_id}",
            get(get_task).put(update_task).delete(delete_task),
        )
        .route("/{task_id}/complete", patch(complete_task))
}

/// List and create. Also mounted at `/tasks/`, the URL the web client uses.
pub fn collection() -> MethodRouter<AppState> {
    get(list_tasks).post(create_task)
}

#[derive(Debug, Deserialize)]
pub struct TaskCreate {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category_id: Option<i64>,
    #[serde(default)]
    pub priority: Option<TaskPriority>,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
}

/// Partial update. An absent field is left alone, an explicit `null`
/// clears a nullable field.
#[derive(Debug, Default, Deserialize)]
pub struct TaskUpdate {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    #[serde(default)]
    pub completed: Option<bool>,
    #[serde(default)]
    pub priority: Option<TaskPriority>,
    #[serde(default, deserialize_with = "double_option")]
    pub due_date: Option<Option<DateTime<Utc>>>,
    #[serde(default, deserialize_with = "double_option")]
    pub category_id: Option<Option<i64>>,
}

impl From<TaskUpdate> for TaskChanges {
    fn from(update: TaskUpdate) -> Self {
        Self {
            title: update.title,
            description: update.description,
            completed: update.completed,
            priority: update.priority,
            due_date: update.due_date,
            category_id: update.category_id.map(|id| id.map(CategoryId::new)),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct TaskQuery {
    pub completed: Option<bool>,
    pub category_id: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TaskResponse {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
    pub priority: TaskPriority,
    pub due_date: Option<DateTime<Utc>>,
    pub user_id: i64,
    pub category_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<Task> for TaskResponse {
    fn from(task: Task) -> Self {
        Self {
            id: task.id.value(),
            title: task.title,
            description: task.description,
            completed: task.completed,
            priority: task.priority,
            due_date: task.due_date,
            user_id: task.user_id.value(),
            category_id: task.category_id.map(|id| id.value()),
            created_at: task.created_at,
            updated_at: task.updated_at,
        }
    }
}

/// POST /tasks
pub async fn create_task(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Json(request): Json<TaskCreate>,
) -> Result<Json<TaskResponse>, ApiError> {
    let task = state
        .tasks
        .create(
            user.id(),
            CreateTaskRequest {
                title: request.title,
                description: request.description,
                category_id: request.category_id.map(CategoryId::new),
                priority: request.priority,
                due_date: request.due_date,
            },
        )
        .await?;

    Ok(Json(task.into()))
}

/// GET /tasks
pub async fn list_tasks(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Query(query): Query<TaskQuery>,
) -> Result<Json<Vec<TaskResponse>>, ApiError> {
    let filter = TaskFilter {
        completed: query.completed,
        category_id: query.category_id.map(CategoryId::new),
    };

    let tasks = state.tasks.list(user.id(), filter).await?;
    Ok(Json(tasks.into_iter().map(Into::into).collect()))
}

/// GET /tasks/stats
pub async fn task_stats(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> Result<Json<TaskStats>, ApiError> {
    Ok(Json(state.tasks.stats(user.id()).await?))
}

/// GET /tasks/{task_id}
pub async fn get_task(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(task_id): Path<i64>,
) -> Result<Json<TaskResponse>, ApiError> {
    let task = state.tasks.get(user.id(), TaskId::new(task_id)).await?;
    Ok(Json(task.into()))
}

/// PUT /tasks/{task_id}
pub async fn update_task(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(task_id): Path<i64>,
    Json(update): Json<TaskUpdate>,
) -> Result<Json<TaskResponse>, ApiError> {
    let task = state
        .tasks
        .update(user.id(), TaskId::new(task_id), update.into())
        .await?;

    Ok(Json(task.into()))
}

/// PATCH /tasks/{task_id}/complete
pub async fn complete_task(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(task_id): Path<i64>,
) -> Result<Json<TaskResponse>, ApiError> {
    let task = state.tasks.complete(user.id(), TaskId::new(task_id)).await?;
    Ok(Json(task.into()))
}

/// DELETE /tasks/{task_id}
pub async fn delete_task(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(task_id): Path<i64>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.tasks.delete(user.id(), TaskId::new(task_id)).await?;
    Ok(Json(MessageResponse::new("Task deleted successfully")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_distinguishes_null_from_absent() {
        let update: TaskUpdate =
            serde_json::from_str(r#"{"description": null, "category_id": 3}"#).unwrap();
        let changes = TaskChanges::from(update);

        assert_eq!(changes.description, Some(None));
        assert_eq!(changes.category_id, Some(Some(CategoryId::new(3))));
        assert!(changes.title.is_none());
        assert!(changes.due_date.is_none());
    }

    #[test]
    fn test_unknown_priority_is_rejected() {
        let result = serde_json::from_str::<TaskCreate>(r#"{"title": "a", "priority": "urgent"}"#);
        assert!(result.is_err());
    }
}
