//! Application state for shared services

use std::sync::Arc;
use std::time::Instant;

use crate::config::AppConfig;
use crate::domain::category::CategoryRepository;
use crate::domain::task::TaskRepository;
use crate::domain::user::UserRepository;
use crate::domain::DomainError;
use crate::infrastructure::auth::{TokenConfig, TokenService};
use crate::infrastructure::category::{CategoryService, InMemoryCategoryRepository};
use crate::infrastructure::observability::MetricsRegistry;
use crate::infrastructure::task::{InMemoryTaskRepository, TaskService};
use crate::infrastructure::user::{Argon2Hasher, InMemoryUserRepository, UserService};

/// The storage backends the services run on
#[derive(Debug, Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub categories: Arc<dyn CategoryRepository>,
    pub tasks: Arc<dyn TaskRepository>,
}

impl Repositories {
    pub fn in_memory() -> Self {
        Self {
            users: Arc::new(InMemoryUserRepository::new()),
            categories: Arc::new(InMemoryCategoryRepository::new()),
            tasks: Arc::new(InMemoryTaskRepository::new()),
        }
    }
}

/// Application state shared by every handler
#[derive(Debug, Clone)]
pub struct AppState {
    pub users: Arc<UserService>,
    pub categories: Arc<CategoryService>,
    pub tasks: Arc<TaskService>,
    pub tokens: Arc<TokenService>,
    pub metrics: Arc<MetricsRegistry>,
    pub started_at: Instant,
}

impl AppState {
    /// Wire the services over `repositories` with a fresh metrics registry
    pub fn build(config: &AppConfig, repositories: Repositories) -> Result<Self, DomainError> {
        let metrics = Arc::new(MetricsRegistry::new()?);

        let token_config = TokenConfig::new(
            config.auth.secret_key.clone(),
            &config.auth.algorithm,
            config.auth.access_token_expire_minutes,
        )?;
        let hasher = Argon2Hasher::with_cost(config.auth.password_hash_cost)?;

        Ok(Self {
            users: Arc::new(UserService::new(repositories.users, Arc::new(hasher))),
            categories: Arc::new(CategoryService::new(repositories.categories.clone())),
            tasks: Arc::new(TaskService::new(
                repositories.tasks,
                repositories.categories,
                metrics.clone(),
            )),
            tokens: Arc::new(TokenService::new(token_config)),
            metrics,
            started_at: Instant::now(),
        })
    }
}
