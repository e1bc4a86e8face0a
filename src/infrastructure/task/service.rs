//! Task service
//!
//! Enforces owner scoping and category checks, and counts task creation
//! and completion in the metrics registry.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::domain::category::{CategoryId, CategoryRepository};
use crate::domain::task::{
    validate_title, NewTask, Task, TaskChanges, TaskFilter, TaskId, TaskPriority, TaskRepository,
    TaskStats,
};
use crate::domain::user::UserId;
use crate::domain::DomainError;
use crate::infrastructure::observability::MetricsRegistry;

#[derive(Debug, Clone)]
pub struct CreateTaskRequest {
    pub title: String,
    pub description: Option<String>,
    pub category_id: Option<CategoryId>,
    pub priority: Option<TaskPriority>,
    pub due_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct TaskService {
    tasks: Arc<dyn TaskRepository>,
    categories: Arc<dyn CategoryRepository>,
    metrics: Arc<MetricsRegistry>,
}

fn task_not_found() -> DomainError {
    DomainError::not_found("Task not found")
}

impl TaskService {
    pub fn new(
        tasks: Arc<dyn TaskRepository>,
        categories: Arc<dyn CategoryRepository>,
        metrics: Arc<MetricsRegistry>,
    ) -> Self {
        Self {
            tasks,
            categories,
            metrics,
        }
    }

    async fn ensure_category(&self, owner: UserId, id: CategoryId) -> Result<(), DomainError> {
        match self.categories.get(owner, id).await? {
            Some(_) => Ok(()),
            None => Err(DomainError::not_found("Category not found")),
        }
    }

    pub async fn create(
        &self,
        owner: UserId,
        request: CreateTaskRequest,
    ) -> Result<Task, DomainError> {
        let title =
            validate_title(&request.title).map_err(|e| DomainError::validation(e.to_string()))?;

        if let Some(category_id) = request.category_id {
            self.ensure_category(owner, category_id).await?;
        }

        let task = self
            .tasks
            .create(NewTask {
                title,
                description: request.description,
                priority: request.priority.unwrap_or_default(),
                due_date: request.due_date,
                user_id: owner,
                category_id: request.category_id,
            })
            .await?;

        self.metrics.record_task_created();
        debug!(task_id = %task.id, user_id = %owner, "Task created");

        Ok(task)
    }

    pub async fn list(&self, owner: UserId, filter: TaskFilter) -> Result<Vec<Task>, DomainError> {
        self.tasks.list(owner, filter).await
    }

    pub async fn get(&self, owner: UserId, id: TaskId) -> Result<Task, DomainError> {
        self.tasks.get(owner, id).await?.ok_or_else(task_not_found)
    }

    /// Apply a partial update; absent fields are left untouched
    pub async fn update(
        &self,
        owner: UserId,
        id: TaskId,
        mut changes: TaskChanges,
    ) -> Result<Task, DomainError> {
        let mut task = self.get(owner, id).await?;

        changes.title = changes
            .title
            .map(|title| validate_title(&title))
            .transpose()
            .map_err(|e| DomainError::validation(e.to_string()))?;

        if let Some(Some(category_id)) = changes.category_id {
            self.ensure_category(owner, category_id).await?;
        }

        let completed = task.apply(changes);
        let task = self.tasks.update(&task).await?;

        if completed {
            self.metrics.record_task_completed();
        }

        Ok(task)
    }

    /// Mark a task completed; completing twice only counts once
    pub async fn complete(&self, owner: UserId, id: TaskId) -> Result<Task, DomainError> {
        let mut task = self.get(owner, id).await?;

        let completed = task.complete();
        let task = self.tasks.update(&task).await?;

        if completed {
            self.metrics.record_task_completed();
        }

        Ok(task)
    }

    pub async fn delete(&self, owner: UserId, id: TaskId) -> Result<(), DomainError> {
        if self.tasks.delete(owner, id).await? {
            debug!(task_id = %id, user_id = %owner, "Task deleted");
            Ok(())
        } else {
            Err(task_not_found())
        }
    }

    pub async fn stats(&self, owner: UserId) -> Result<TaskStats, DomainError> {
        let total = self.tasks.count(owner, None).await?;
        let completed = self.tasks.count(owner, Some(true)).await?;

        Ok(TaskStats::new(total, completed))
    }

    pub async fn list_all(&self) -> Result<Vec<Task>, DomainError> {
        self.tasks.list_all().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::category::NewCategory;
    use crate::domain::task::FailingTaskRepository;
    use crate::infrastructure::category::InMemoryCategoryRepository;
    use crate::infrastructure::observability::metric_value;
    use crate::infrastructure::task::InMemoryTaskRepository;

    struct Fixture {
        service: TaskService,
        categories: Arc<InMemoryCategoryRepository>,
        metrics: Arc<MetricsRegistry>,
    }

    fn fixture() -> Fixture {
        let categories = Arc::new(InMemoryCategoryRepository::new());
        let metrics = Arc::new(MetricsRegistry::new().unwrap());
        let service = TaskService::new(
            Arc::new(InMemoryTaskRepository::new()),
            categories.clone(),
            metrics.clone(),
        );

        Fixture {
            service,
            categories,
            metrics,
        }
    }

    fn request(title: &str) -> CreateTaskRequest {
        CreateTaskRequest {
            title: title.to_string(),
            description: None,
            category_id: None,
            priority: None,
            due_date: None,
        }
    }

    fn alice() -> UserId {
        UserId::new(1)
    }

    fn bob() -> UserId {
        UserId::new(2)
    }

    #[tokio::test]
    async fn test_create_counts_and_defaults() {
        let f = fixture();

        let task = f.service.create(alice(), request("  Buy milk ")).await.unwrap();

        assert_eq!(task.title, "Buy milk");
        assert_eq!(task.priority, TaskPriority::Medium);
        assert!(!task.completed);
        assert_eq!(
            metric_value(&f.metrics.render(), "tasks_created_total", &[]),
            1.0
        );
    }

    #[tokio::test]
    async fn test_create_rejects_empty_title() {
        let f = fixture();

        let result = f.service.create(alice(), request("   ")).await;
        assert!(matches!(result, Err(DomainError::Validation { .. })));
    }

    #[tokio::test]
    async fn test_create_with_foreign_category() {
        let f = fixture();
        let category = f
            .categories
            .create(NewCategory {
                name: "Bob's".to_string(),
                color: "#667eea".to_string(),
                user_id: bob(),
            })
            .await
            .unwrap();

        let mut req = request("Sneaky");
        req.category_id = Some(category.id);

        match f.service.create(alice(), req).await {
            Err(DomainError::NotFound { message }) => assert_eq!(message, "Category not found"),
            other => panic!("expected not found, got {:?}", other),
        }
        assert_eq!(
            metric_value(&f.metrics.render(), "tasks_created_total", &[]),
            0.0
        );
    }

    #[tokio::test]
    async fn test_foreign_task_is_not_found() {
        let f = fixture();
        let task = f.service.create(alice(), request("Private")).await.unwrap();

        assert!(matches!(
            f.service.get(bob(), task.id).await,
            Err(DomainError::NotFound { .. })
        ));
        assert!(matches!(
            f.service.complete(bob(), task.id).await,
            Err(DomainError::NotFound { .. })
        ));
        assert!(matches!(
            f.service.delete(bob(), task.id).await,
            Err(DomainError::NotFound { .. })
        ));
        assert!(f.service.get(alice(), task.id).await.is_ok());
    }

    #[tokio::test]
    async fn test_complete_counts_only_transitions() {
        let f = fixture();
        let task = f.service.create(alice(), request("Once")).await.unwrap();

        let done = f.service.complete(alice(), task.id).await.unwrap();
        assert!(done.completed);
        assert!(done.updated_at.is_some());

        f.service.complete(alice(), task.id).await.unwrap();
        f.service
            .update(
                alice(),
                task.id,
                TaskChanges {
                    completed: Some(true),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(
            metric_value(&f.metrics.render(), "tasks_completed_total", &[]),
            1.0
        );
    }

    #[tokio::test]
    async fn test_update_partial_fields() {
        let f = fixture();
        let mut req = request("Draft");
        req.description = Some("keep me".to_string());
        let task = f.service.create(alice(), req).await.unwrap();

        let updated = f
            .service
            .update(
                alice(),
                task.id,
                TaskChanges {
                    priority: Some(TaskPriority::High),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.title, "Draft");
        assert_eq!(updated.description.as_deref(), Some("keep me"));
        assert_eq!(updated.priority, TaskPriority::High);

        let result = f
            .service
            .update(
                alice(),
                task.id,
                TaskChanges {
                    title: Some(String::new()),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(result, Err(DomainError::Validation { .. })));
    }

    #[tokio::test]
    async fn test_stats() {
        let f = fixture();
        let a = f.service.create(alice(), request("A")).await.unwrap();
        f.service.create(alice(), request("B")).await.unwrap();
        f.service.create(bob(), request("C")).await.unwrap();
        f.service.complete(alice(), a.id).await.unwrap();

        let stats = f.service.stats(alice()).await.unwrap();
        assert_eq!(stats, TaskStats::new(2, 1));
        assert_eq!(stats.pending_tasks, 1);
    }

    #[tokio::test]
    async fn test_storage_failure_propagates() {
        let service = TaskService::new(
            Arc::new(FailingTaskRepository),
            Arc::new(InMemoryCategoryRepository::new()),
            Arc::new(MetricsRegistry::new().unwrap()),
        );

        let result = service.list(alice(), TaskFilter::default()).await;
        assert!(matches!(result, Err(DomainError::Storage { .. })));
    }
}
