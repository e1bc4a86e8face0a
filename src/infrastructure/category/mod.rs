//! Category infrastructure module

mod postgres_repository;
mod repository;
mod service;

pub use postgres_repository::PostgresCategoryRepository;
pub use repository::InMemoryCategoryRepository;
pub use service::{CategoryService, CreateCategoryRequest};
