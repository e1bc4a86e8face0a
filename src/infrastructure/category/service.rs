//! Category service

use std::sync::Arc;

use crate::domain::category::{
    validate_category_name, validate_color, Category, CategoryId, CategoryRepository,
    NewCategory, DEFAULT_CATEGORY_COLOR,
};
use crate::domain::user::UserId;
use crate::domain::DomainError;

#[derive(Debug, Clone)]
pub struct CreateCategoryRequest {
    pub name: String,
    pub color: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CategoryService {
    repository: Arc<dyn CategoryRepository>,
}

impl CategoryService {
    pub fn new(repository: Arc<dyn CategoryRepository>) -> Self {
        Self { repository }
    }

    pub async fn create(
        &self,
        owner: UserId,
        request: CreateCategoryRequest,
    ) -> Result<Category, DomainError> {
        let name = validate_category_name(&request.name)
            .map_err(|e| DomainError::validation(e.to_string()))?;
        let color = validate_color(request.color.as_deref().unwrap_or(DEFAULT_CATEGORY_COLOR))
            .map_err(|e| DomainError::validation(e.to_string()))?;

        self.repository
            .create(NewCategory {
                name,
                color,
                user_id: owner,
            })
            .await
    }

    pub async fn list(&self, owner: UserId) -> Result<Vec<Category>, DomainError> {
        self.repository.list(owner).await
    }

    /// Fetch a category owned by `owner`; a foreign category is not found
    pub async fn get(&self, owner: UserId, id: CategoryId) -> Result<Category, DomainError> {
        self.repository
            .get(owner, id)
            .await?
            .ok_or_else(|| DomainError::not_found("Category not found"))
    }

    pub async fn list_all(&self) -> Result<Vec<Category>, DomainError> {
        self.repository.list_all().await
    }
}
