use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum CategoryValidationError {
    #[error("Category name cannot be empty")]
    EmptyName,

    #[error("Category name exceeds maximum length of {0} characters")]
    NameTooLong(usize),

    #[error("Color must be a hex value like '#667eea'")]
    InvalidColor,
}

const MAX_NAME_LENGTH: usize = 100;

static HEX_COLOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^#[0-9a-fA-F]{6}$").expect("valid color regex"));

/// Trim and check a category name
pub fn validate_category_name(name: &str) -> Result<String, CategoryValidationError> {
    let name = name.trim();

    if name.is_empty() {
        return Err(CategoryValidationError::EmptyName);
    }

    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(CategoryValidationError::NameTooLong(MAX_NAME_LENGTH));
    }

    Ok(name.to_string())
}

pub fn validate_color(color: &str) -> Result<String, CategoryValidationError> {
    if !HEX_COLOR.is_match(color) {
        return Err(CategoryValidationError::InvalidColor);
    }

    Ok(color.to_lowercase())
}
