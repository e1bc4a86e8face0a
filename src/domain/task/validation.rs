use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum TaskValidationError {
    #[error("Title cannot be empty")]
    EmptyTitle,

    #[error("Title too long (maximum {0} characters)")]
    TitleTooLong(usize),
}

const MAX_TITLE_LENGTH: usize = 200;

/// Trim a title and enforce its length bounds
pub fn validate_title(title: &str) -> Result<String, TaskValidationError> {
    let title = title.trim();

    if title.is_empty() {
        return Err(TaskValidationError::EmptyTitle);
    }

    if title.chars().count() > MAX_TITLE_LENGTH {
        return Err(TaskValidationError::TitleTooLong(MAX_TITLE_LENGTH));
    }

    Ok(title.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_is_trimmed() {
        assert_eq!(validate_title("  Buy milk  ").unwrap(), "Buy milk");
    }

    #[test]
    fn test_empty_title() {
        assert_eq!(validate_title(""), Err(TaskValidationError::EmptyTitle));
        assert_eq!(validate_title("   "), Err(TaskValidationError::EmptyTitle));
    }

    #[test]
    fn test_title_length_limit() {
        assert!(validate_title(&"a".repeat(200)).is_ok());
        assert_eq!(
            validate_title(&"a".repeat(201)),
            Err(TaskValidationError::TitleTooLong(200))
        );
    }
}
