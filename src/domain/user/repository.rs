//! User repository trait

use async_trait::async_trait;
use std::fmt::Debug;

use super::entity::{NewUser, User, UserId};
use crate::domain::DomainError;

/// Repository trait for user storage
#[async_trait]
pub trait UserRepository: Send + Sync + Debug {
    /// Get a user by their ID
    async fn get(&self, id: UserId) -> Result<Option<User>, DomainError>;

    /// Get a user by email, the subject claim carried in access tokens
    async fn get_by_email(&self, email: &str) -> Result<Option<User>, DomainError>;

    /// Create a new user, assigning its ID
    async fn create(&self, user: NewUser) -> Result<User, DomainError>;

    /// Update an existing user
    async fn update(&self, user: &User) -> Result<User, DomainError>;

    /// Delete a user
    async fn delete(&self, id: UserId) -> Result<bool, DomainError>;

    /// List all users ordered by ID
    async fn list(&self) -> Result<Vec<User>, DomainError>;

    /// Check if an email is already registered
    async fn email_exists(&self, email: &str) -> Result<bool, DomainError> {
        Ok(self.get_by_email(email).await?.is_some())
    }
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::collections::BTreeMap;
    use std::sync::Arc;
    use tokio::sync::RwLock;

    /// Mock user repository for testing
    #[derive(Debug, Default)]
    pub struct MockUserRepository {
        users: Arc<RwLock<BTreeMap<i64, User>>>,
        should_fail: Arc<RwLock<bool>>,
    }

    impl MockUserRepository {
        pub fn new() -> Self {
            Self::default()
        }

        /// Set whether operations should fail
        pub async fn set_should_fail(&self, fail: bool) {
            *self.should_fail.write().await = fail;
        }

        async fn check_should_fail(&self) -> Result<(), DomainError> {
            if *self.should_fail.read().await {
                return Err(DomainError::storage("Mock repository configured to fail"));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl UserRepository for MockUserRepository {
        async fn get(&self, id: UserId) -> Result<Option<User>, DomainError> {
            self.check_should_fail().await?;
            Ok(self.users.read().await.get(&id.value()).cloned())
        }

        async fn get_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
            self.check_should_fail().await?;
            let users = self.users.read().await;
            Ok(users.values().find(|u| u.email() == email).cloned())
        }

        async fn create(&self, user: NewUser) -> Result<User, DomainError> {
            self.check_should_fail().await?;
            let mut users = self.users.write().await;

            if users.values().any(|u| u.email() == user.email) {
                return Err(DomainError::conflict("Email already registered"));
            }

            let id = users.keys().next_back().map_or(1, |last| last + 1);
            let created = User::new(UserId::new(id), user.email, user.password_hash);
            users.insert(id, created.clone());
            Ok(created)
        }

        async fn update(&self, user: &User) -> Result<User, DomainError> {
            self.check_should_fail().await?;
            let mut users = self.users.write().await;

            match users.get_mut(&user.id().value()) {
                Some(stored) => {
                    *stored = user.clone();
                    Ok(user.clone())
                }
                None => Err(DomainError::not_found(format!("User '{}' not found", user.id()))),
            }
        }

        async fn delete(&self, id: UserId) -> Result<bool, DomainError> {
            self.check_should_fail().await?;
            Ok(self.users.write().await.remove(&id.value()).is_some())
        }

        async fn list(&self) -> Result<Vec<User>, DomainError> {
            self.check_should_fail().await?;
            Ok(self.users.read().await.values().cloned().collect())
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        fn new_user(email: &str) -> NewUser {
            NewUser {
                email: email.to_string(),
                password_hash: "hashed_password".to_string(),
            }
        }

        #[tokio::test]
        async fn test_create_assigns_sequential_ids() {
            let repo = MockUserRepository::new();

            let first = repo.create(new_user("a@example.com")).await.unwrap();
            let second = repo.create(new_user("b@example.com")).await.unwrap();

            assert_eq!(first.id().value(), 1);
            assert_eq!(second.id().value(), 2);
        }

        #[tokio::test]
        async fn test_email_exists_default_method() {
            let repo = MockUserRepository::new();
            repo.create(new_user("a@example.com")).await.unwrap();

            assert!(repo.email_exists("a@example.com").await.unwrap());
            assert!(!repo.email_exists("b@example.com").await.unwrap());
        }

        #[tokio::test]
        async fn test_should_fail() {
            let repo = MockUserRepository::new();
            repo.set_should_fail(true).await;

            let result = repo.get_by_email("a@example.com").await;
            assert!(matches!(result, Err(DomainError::Storage { .. })));
        }
    }
}
