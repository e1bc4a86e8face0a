//! Task Tracker API
//!
//! A personal task-management backend with:
//! - JWT bearer authentication
//! - Users, categories and owner-scoped tasks
//! - In-memory or PostgreSQL storage
//! - Prometheus request metrics and structured logging

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;

use anyhow::Context;
use api::state::{AppState, Repositories};
use crate::config::StorageBackend;
use infrastructure::category::PostgresCategoryRepository;
use infrastructure::storage::{connect, PostgresConfig, PostgresMigrator};
use infrastructure::task::PostgresTaskRepository;
use infrastructure::user::PostgresUserRepository;
use tracing::info;

/// Create the application state for the configured storage backend
pub async fn create_app_state(config: &AppConfig) -> anyhow::Result<AppState> {
    let repositories = create_repositories(config).await?;
    let state = AppState::build(config, repositories)?;

    Ok(state)
}

async fn create_repositories(config: &AppConfig) -> anyhow::Result<Repositories> {
    info!("Storage backend: {:?}", config.storage.backend);

    match config.storage.backend {
        StorageBackend::Memory => Ok(Repositories::in_memory()),
        StorageBackend::Postgres => {
            let url = config
                .storage
                .database_url
                .as_deref()
                .context("storage.database_url is required for the postgres backend")?;

            info!("Connecting to PostgreSQL...");
            let pool = connect(
                &PostgresConfig::new(url).with_max_connections(config.storage.max_connections),
            )
            .await?;
            info!("PostgreSQL connection established");

            PostgresMigrator::new(pool.clone()).run().await?;

            Ok(Repositories {
                users: Arc::new(PostgresUserRepository::new(pool.clone())),
                categories: Arc::new(PostgresCategoryRepository::new(pool.clone())),
                tasks: Arc::new(PostgresTaskRepository::new(pool)),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_app_state_in_memory() {
        let mut config = AppConfig::default();
        config.auth.secret_key = "test-secret".to_string();

        let state = create_app_state(&config).await.unwrap();
        assert!(state.users.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unsupported_algorithm_fails_startup() {
        let mut config = AppConfig::default();
        config.auth.secret_key = "test-secret".to_string();
        config.auth.algorithm = "RS256".to_string();

        assert!(create_app_state(&config).await.is_err());
    }
}
