use async_trait::async_trait;
use std::fmt::Debug;

use super::entity::{Category, CategoryId, NewCategory};
use crate::domain::user::UserId;
use crate::domain::DomainError;

/// Repository trait for category storage
///
/// All lookups are scoped to the owning user.
#[async_trait]
pub trait CategoryRepository: Send + Sync + Debug {
    async fn create(&self, category: NewCategory) -> Result<Category, DomainError>;

    /// Get a category only if it belongs to `user_id`
    async fn get(&self, user_id: UserId, id: CategoryId) -> Result<Option<Category>, DomainError>;

    /// List a user's categories ordered by ID
    async fn list(&self, user_id: UserId) -> Result<Vec<Category>, DomainError>;

    /// List every category in the store, for operator inspection
    async fn list_all(&self) -> Result<Vec<Category>, DomainError>;
}
