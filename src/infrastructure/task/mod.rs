//! Task infrastructure module

mod postgres_repository;
mod repository;
mod service;

pub use postgres_repository::PostgresTaskRepository;
pub use repository::InMemoryTaskRepository;
pub use service::{CreateTaskRequest, TaskService};
