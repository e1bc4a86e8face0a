//! Task domain

mod entity;
mod repository;
mod validation;

pub use entity::{NewTask, Task, TaskChanges, TaskFilter, TaskId, TaskPriority, TaskStats};
pub use repository::TaskRepository;
pub use validation::{validate_title, TaskValidationError};

#[cfg(test)]
pub use repository::mock::FailingTaskRepository;
