//! User service for registration and authentication

use std::sync::Arc;

use crate::domain::user::{validate_email, validate_password, NewUser, User, UserRepository};
use crate::domain::DomainError;

use super::password::PasswordHasher;

/// Request for registering a new user
#[derive(Debug, Clone)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
}

/// User service for authentication and management
#[derive(Debug, Clone)]
pub struct UserService {
    repository: Arc<dyn UserRepository>,
    hasher: Arc<dyn PasswordHasher>,
}

impl UserService {
    pub fn new(repository: Arc<dyn UserRepository>, hasher: Arc<dyn PasswordHasher>) -> Self {
        Self { repository, hasher }
    }

    /// Register a new user
    pub async fn register(&self, request: RegisterRequest) -> Result<User, DomainError> {
        let email =
            validate_email(&request.email).map_err(|e| DomainError::validation(e.to_string()))?;
        validate_password(&request.password)
            .map_err(|e| DomainError::validation(e.to_string()))?;

        if self.repository.email_exists(&email).await? {
            return Err(DomainError::conflict("Email already registered"));
        }

        let password_hash = self.hasher.hash(&request.password)?;

        self.repository
            .create(NewUser {
                email,
                password_hash,
            })
            .await
    }

    /// Check credentials. Returns `None` for an unknown email, a wrong
    /// password or an inactive account.
    pub async fn authenticate(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<User>, DomainError> {
        let email = email.trim().to_lowercase();

        let user = match self.repository.get_by_email(&email).await? {
            Some(u) => u,
            None => return Ok(None),
        };

        if !user.is_active() {
            return Ok(None);
        }

        if !self.hasher.verify(password, user.password_hash()) {
            return Ok(None);
        }

        Ok(Some(user))
    }

    /// Resolve a verified token subject to an active user
    pub async fn resolve_subject(&self, subject: &str) -> Result<Option<User>, DomainError> {
        let user = self.repository.get_by_email(subject).await?;
        Ok(user.filter(User::is_active))
    }

    pub async fn list(&self) -> Result<Vec<User>, DomainError> {
        self.repository.list().await
    }
}
