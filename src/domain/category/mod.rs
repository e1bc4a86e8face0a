//! Category domain

mod entity;
mod repository;
mod validation;

pub use entity::{Category, CategoryId, NewCategory, DEFAULT_CATEGORY_COLOR};
pub use repository::CategoryRepository;
pub use validation::{validate_category_name, validate_color, CategoryValidationError};
