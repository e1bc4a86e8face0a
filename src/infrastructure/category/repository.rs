//! In-memory category repository implementation

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::category::{Category, CategoryId, CategoryRepository, NewCategory};
use crate::domain::user::UserId;
use crate::domain::DomainError;

#[derive(Debug, Default)]
struct CategoryTable {
    categories: BTreeMap<i64, Category>,
    next_id: i64,
}

/// In-memory implementation of CategoryRepository
#[derive(Debug, Default)]
pub struct InMemoryCategoryRepository {
    table: Arc<RwLock<CategoryTable>>,
}

impl InMemoryCategoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CategoryRepository for InMemoryCategoryRepository {
    async fn create(&self, category: NewCategory) -> Result<Category, DomainError> {
        let mut table = self.table.write().await;

        table.next_id += 1;
        let id = table.next_id;
        let created = Category::new(CategoryId::new(id), category);
        table.categories.insert(id, created.clone());

        Ok(created)
    }

    async fn get(&self, user_id: UserId, id: CategoryId) -> Result<Option<Category>, DomainError> {
        let table = self.table.read().await;

        Ok(table
            .categories
            .get(&id.value())
            .filter(|c| c.is_owned_by(user_id))
            .cloned())
    }

    async fn list(&self, user_id: UserId) -> Result<Vec<Category>, DomainError> {
        let table = self.table.read().await;

        Ok(table
            .categories
            .values()
            .filter(|c| c.is_owned_by(user_id))
            .cloned()
            .collect())
    }

    async fn list_all(&self) -> Result<Vec<Category>, DomainError> {
        let table = self.table.read().await;
        Ok(table.categories.values().cloned().collect())
    }
}
