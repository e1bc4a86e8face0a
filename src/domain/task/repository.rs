//! Task repository trait

use async_trait::async_trait;
use std::fmt::Debug;

use super::entity::{NewTask, Task, TaskFilter, TaskId};
use crate::domain::user::UserId;
use crate::domain::DomainError;

/// Repository trait for task storage
///
/// Reads and deletes take the owner's ID so that one user can never reach
/// another user's tasks.
#[async_trait]
pub trait TaskRepository: Send + Sync + Debug {
    async fn create(&self, task: NewTask) -> Result<Task, DomainError>;

    async fn get(&self, user_id: UserId, id: TaskId) -> Result<Option<Task>, DomainError>;

    /// List a user's tasks matching `filter`, ordered by ID
    async fn list(&self, user_id: UserId, filter: TaskFilter) -> Result<Vec<Task>, DomainError>;

    async fn update(&self, task: &Task) -> Result<Task, DomainError>;

    async fn delete(&self, user_id: UserId, id: TaskId) -> Result<bool, DomainError>;

    /// Count a user's tasks, optionally by completion state
    async fn count(&self, user_id: UserId, completed: Option<bool>) -> Result<usize, DomainError>;

    /// List every task in the store, for operator inspection
    async fn list_all(&self) -> Result<Vec<Task>, DomainError>;
}
