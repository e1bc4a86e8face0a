//! Authentication infrastructure module
//!
//! Signed, time-limited bearer tokens for user authentication.

mod jwt;

pub use jwt::{parse_algorithm, Claims, TokenConfig, TokenError, TokenService};
