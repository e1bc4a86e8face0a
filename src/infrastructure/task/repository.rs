//! In-memory task repository implementation

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::task::{NewTask, Task, TaskFilter, TaskId, TaskRepository};
use crate::domain::user::UserId;
use crate::domain::DomainError;

#[derive(Debug, Default)]
struct TaskTable {
    tasks: BTreeMap<i64, Task>,
    next_id: i64,
}

/// In-memory implementation of TaskRepository
#[derive(Debug, Default)]
pub struct InMemoryTaskRepository {
    table: Arc<RwLock<TaskTable>>,
}

impl InMemoryTaskRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TaskRepository for InMemoryTaskRepository {
    async fn create(&self, task: NewTask) -> Result<Task, DomainError> {
        let mut table = self.table.write().await;

        table.next_id += 1;
        let id = table.next_id;
        let created = Task::new(TaskId::new(id), task);
        table.tasks.insert(id, created.clone());

        Ok(created)
    }

    async fn get(&self, user_id: UserId, id: TaskId) -> Result<Option<Task>, DomainError> {
        let table = self.table.read().await;

        Ok(table
            .tasks
            .get(&id.value())
            .filter(|t| t.is_owned_by(user_id))
            .cloned())
    }

    async fn list(&self, user_id: UserId, filter: TaskFilter) -> Result<Vec<Task>, DomainError> {
        let table = self.table.read().await;

        Ok(table
            .tasks
            .values()
            .filter(|t| t.is_owned_by(user_id) && filter.matches(t))
            .cloned()
            .collect())
    }

    async fn update(&self, task: &Task) -> Result<Task, DomainError> {
        let mut table = self.table.write().await;

        match table.tasks.get_mut(&task.id.value()) {
            Some(stored) if stored.is_owned_by(task.user_id) => {
                *stored = task.clone();
                Ok(task.clone())
            }
            _ => Err(DomainError::not_found("Task not found")),
        }
    }

    async fn delete(&self, user_id: UserId, id: TaskId) -> Result<bool, DomainError> {
        let mut table = self.table.write().await;

        let owned = table
            .tasks
            .get(&id.value())
            .is_some_and(|t| t.is_owned_by(user_id));

        if owned {
            table.tasks.remove(&id.value());
        }

        Ok(owned)
    }

    async fn count(&self, user_id: UserId, completed: Option<bool>) -> Result<usize, DomainError> {
        let table = self.table.read().await;

        Ok(table
            .tasks
            .values()
            .filter(|t| t.is_owned_by(user_id))
            .filter(|t| completed.is_none_or(|c| t.completed == c))
            .count())
    }

    async fn list_all(&self) -> Result<Vec<Task>, DomainError> {
        let table = self.table.read().await;
        Ok(table.tasks.values().cloned().collect())
    }
}
