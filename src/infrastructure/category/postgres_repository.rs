//! PostgreSQL category repository implementation

use async_trait::async_trait;
use sqlx::{PgPool, Row};

use crate::domain::category::{Category, CategoryId, CategoryRepository, NewCategory};
use crate::domain::user::UserId;
use crate::domain::DomainError;

const CATEGORY_COLUMNS: &str = "id, name, color, user_id, created_at";

#[derive(Debug, Clone)]
pub struct PostgresCategoryRepository {
    pool: PgPool,
}

impl PostgresCategoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CategoryRepository for PostgresCategoryRepository {
    async fn create(&self, category: NewCategory) -> Result<Category, DomainError> {
        let row = sqlx::query(&format!(
            "INSERT INTO categories (name, color, user_id) VALUES ($1, $2, $3) RETURNING {}",
            CATEGORY_COLUMNS
        ))
        .bind(&category.name)
        .bind(&category.color)
        .bind(category.user_id.value())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to create category: {}", e)))?;

        row_to_category(&row)
    }

    async fn get(&self, user_id: UserId, id: CategoryId) -> Result<Option<Category>, DomainError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM categories WHERE id = $1 AND user_id = $2",
            CATEGORY_COLUMNS
        ))
        .bind(id.value())
        .bind(user_id.value())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to get category: {}", e)))?;

        row.as_ref().map(row_to_category).transpose()
    }

    async fn list(&self, user_id: UserId) -> Result<Vec<Category>, DomainError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM categories WHERE user_id = $1 ORDER BY id",
            CATEGORY_COLUMNS
        ))
        .bind(user_id.value())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to list categories: {}", e)))?;

        rows.iter().map(row_to_category).collect()
    }

    async fn list_all(&self) -> Result<Vec<Category>, DomainError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM categories ORDER BY id",
            CATEGORY_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to list categories: {}", e)))?;

        rows.iter().map(row_to_category).collect()
    }
}

fn row_to_category(row: &sqlx::postgres::PgRow) -> Result<Category, DomainError> {
    let decode = |e: sqlx::Error| DomainError::storage(format!("Invalid category row: {}", e));

    Ok(Category {
        id: CategoryId::new(row.try_get("id").map_err(decode)?),
        name: row.try_get("name").map_err(decode)?,
        color: row.try_get("color").map_err(decode)?,
        user_id: UserId::new(row.try_get("user_id").map_err(decode)?),
        created_at: row.try_get("created_at").map_err(decode)?,
    })
}
