//! API middleware components

pub mod observability;
pub mod security;
pub mod user_auth;

pub use observability::observability_middleware;
pub use security::security_headers_middleware;
pub use user_auth::{extract_bearer_token, resolve_identity, RequireUser};
