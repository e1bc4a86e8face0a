//! Domain layer - entities, validation and repository traits

pub mod category;
pub mod error;
pub mod task;
pub mod user;

pub use category::{Category, CategoryId};
pub use error::DomainError;
pub use task::{Task, TaskId, TaskStats};
pub use user::{User, UserId};
