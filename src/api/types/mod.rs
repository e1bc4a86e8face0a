//! Shared API types: error responses and extractors

pub mod error;
pub mod extract;

use serde::{Deserialize, Serialize};

pub use error::{ApiError, ApiErrorResponse, UnhandledError};
pub use extract::{double_option, Json, Path, Query};

/// Plain `{"message": ...}` body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
