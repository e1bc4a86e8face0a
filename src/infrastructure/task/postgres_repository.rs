//! PostgreSQL task repository implementation

use async_trait::async_trait;
use sqlx::{PgPool, Row};

use crate::domain::category::CategoryId;
use crate::domain::task::{NewTask, Task, TaskFilter, TaskId, TaskPriority, TaskRepository};
use crate::domain::user::UserId;
use crate::domain::DomainError;

const TASK_COLUMNS: &str = "id, title, description, completed, priority, due_date, user_id, \
                            category_id, created_at, updated_at";

#[derive(Debug, Clone)]
pub struct PostgresTaskRepository {
    pool: PgPool,
}

impl PostgresTaskRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TaskRepository for PostgresTaskRepository {
    async fn create(&self, task: NewTask) -> Result<Task, DomainError> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO tasks (title, description, priority, due_date, user_id, category_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}
            "#,
            TASK_COLUMNS
        ))
        .bind(&task.title)
        .bind(&task.description)
        .bind(task.priority.as_str())
        .bind(task.due_date)
        .bind(task.user_id.value())
        .bind(task.category_id.map(|c| c.value()))
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to create task: {}", e)))?;

        row_to_task(&row)
    }

    async fn get(&self, user_id: UserId, id: TaskId) -> Result<Option<Task>, DomainError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM tasks WHERE id = $1 AND user_id = $2",
            TASK_COLUMNS
        ))
        .bind(id.value())
        .bind(user_id.value())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to get task: {}", e)))?;

        row.as_ref().map(row_to_task).transpose()
    }

    async fn list(&self, user_id: UserId, filter: TaskFilter) -> Result<Vec<Task>, DomainError> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {} FROM tasks
            WHERE user_id = $1
              AND ($2::BOOLEAN IS NULL OR completed = $2)
              AND ($3::BIGINT IS NULL OR category_id = $3)
            ORDER BY id
            "#,
            TASK_COLUMNS
        ))
        .bind(user_id.value())
        .bind(filter.completed)
        .bind(filter.category_id.map(|c| c.value()))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to list tasks: {}", e)))?;

        rows.iter().map(row_to_task).collect()
    }

    async fn update(&self, task: &Task) -> Result<Task, DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE tasks
            SET title = $3, description = $4, completed = $5, priority = $6,
                due_date = $7, category_id = $8, updated_at = $9
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(task.id.value())
        .bind(task.user_id.value())
        .bind(&task.title)
        .bind(&task.description)
        .bind(task.completed)
        .bind(task.priority.as_str())
        .bind(task.due_date)
        .bind(task.category_id.map(|c| c.value()))
        .bind(task.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to update task: {}", e)))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::not_found("Task not found"));
        }

        Ok(task.clone())
    }

    async fn delete(&self, user_id: UserId, id: TaskId) -> Result<bool, DomainError> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1 AND user_id = $2")
            .bind(id.value())
            .bind(user_id.value())
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to delete task: {}", e)))?;

        Ok(result.rows_affected() > 0)
    }

    async fn count(&self, user_id: UserId, completed: Option<bool>) -> Result<usize, DomainError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM tasks WHERE user_id = $1 AND ($2::BOOLEAN IS NULL OR completed = $2)",
        )
        .bind(user_id.value())
        .bind(completed)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to count tasks: {}", e)))?;

        Ok(count as usize)
    }

    async fn list_all(&self) -> Result<Vec<Task>, DomainError> {
        let rows = sqlx::query(&format!("SELECT {} FROM tasks ORDER BY id", TASK_COLUMNS))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to list tasks: {}", e)))?;

        rows.iter().map(row_to_task).collect()
    }
}

fn row_to_task(row: &sqlx::postgres::PgRow) -> Result<Task, DomainError> {
    let decode = |e: sqlx::Error| DomainError::storage(format!("Invalid task row: {}", e));

    let priority: String = row.try_get("priority").map_err(decode)?;
    let priority = priority
        .parse::<TaskPriority>()
        .map_err(DomainError::storage)?;
    let category_id: Option<i64> = row.try_get("category_id").map_err(decode)?;

    Ok(Task {
        id: TaskId::new(row.try_get("id").map_err(decode)?),
        title: row.try_get("title").map_err(decode)?,
        description: row.try_get("description").map_err(decode)?,
        completed: row.try_get("completed").map_err(decode)?,
        priority,
        due_date: row.try_get("due_date").map_err(decode)?,
        user_id: UserId::new(row.try_get("user_id").map_err(decode)?),
        category_id: category_id.map(CategoryId::new),
        created_at: row.try_get("created_at").map_err(decode)?,
        updated_at: row.try_get("updated_at").map_err(decode)?,
    })
}
