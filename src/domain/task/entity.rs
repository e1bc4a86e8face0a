//! Task entity and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::category::CategoryId;
use crate::domain::user::UserId;

/// Task identifier assigned by the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(i64);

impl TaskId {
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    Low,
    #[default]
    Medium,
    High,
}

impl TaskPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl std::str::FromStr for TaskPriority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            other => Err(format!("Unknown priority '{}'", other)),
        }
    }
}

/// Validated task data, before the store assigns an ID
#[derive(Debug, Clone)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub priority: TaskPriority,
    pub due_date: Option<DateTime<Utc>>,
    pub user_id: UserId,
    pub category_id: Option<CategoryId>,
}

/// A partial update. `None` leaves a field untouched; for nullable fields
/// `Some(None)` clears the value.
#[derive(Debug, Clone, Default)]
pub struct TaskChanges {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub completed: Option<bool>,
    pub priority: Option<TaskPriority>,
    pub due_date: Option<Option<DateTime<Utc>>>,
    pub category_id: Option<Option<CategoryId>>,
}

/// Filters accepted when listing tasks
#[derive(Debug, Clone, Copy, Default)]
pub struct TaskFilter {
    pub completed: Option<bool>,
    pub category_id: Option<CategoryId>,
}

impl TaskFilter {
    pub fn matches(&self, task: &Task) -> bool {
        self.completed.is_none_or(|c| task.completed == c)
            && self
                .category_id
                .is_none_or(|id| task.category_id == Some(id))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskStats {
    pub total_tasks: usize,
    pub completed_tasks: usize,
    pub pending_tasks: usize,
}

impl TaskStats {
    pub fn new(total_tasks: usize, completed_tasks: usize) -> Self {
        Self {
            total_tasks,
            completed_tasks,
            pending_tasks: total_tasks.saturating_sub(completed_tasks),
        }
    }
}

/// A user-owned to-do item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
    pub priority: TaskPriority,
    pub due_date: Option<DateTime<Utc>>,
    pub user_id: UserId,
    pub category_id: Option<CategoryId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Task {
    pub fn new(id: TaskId, task: NewTask) -> Self {
        Self {
            id,
            title: task.title,
            description: task.description,
            completed: false,
            priority: task.priority,
            due_date: task.due_date,
            user_id: task.user_id,
            category_id: task.category_id,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    pub fn is_owned_by(&self, user_id: UserId) -> bool {
        self.user_id == user_id
    }

    /// Apply a partial update. Returns true if the task went from pending
    /// to completed.
    pub fn apply(&mut self, changes: TaskChanges) -> bool {
        let was_completed = self.completed;

        if let Some(title) = changes.title {
            self.title = title;
        }
        if let Some(description) = changes.description {
            self.description = description;
        }
        if let Some(completed) = changes.completed {
            self.completed = completed;
        }
        if let Some(priority) = changes.priority {
            self.priority = priority;
        }
        if let Some(due_date) = changes.due_date {
            self.due_date = due_date;
        }
        if let Some(category_id) = changes.category_id {
            self.category_id = category_id;
        }

        self.touch();
        !was_completed && self.completed
    }

    /// Mark the task completed. Returns true if it was pending before.
    pub fn complete(&mut self) -> bool {
        let transitioned = !self.completed;
        self.completed = true;
        self.touch();
        transitioned
    }

    fn touch(&mut self) {
        self.updated_at = Some(Utc::now());
    }
}
