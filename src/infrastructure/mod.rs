//! Infrastructure layer - storage, auth and observability implementations

pub mod auth;
pub mod category;
pub mod logging;
pub mod observability;
pub mod storage;
pub mod task;
pub mod user;
