//! In-memory user repository implementation

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::user::{NewUser, User, UserId, UserRepository};
use crate::domain::DomainError;

#[derive(Debug, Default)]
struct UserTable {
    users: BTreeMap<i64, User>,
    /// Index for email -> user ID lookup
    email_index: HashMap<String, i64>,
    next_id: i64,
}

/// In-memory implementation of UserRepository
#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    table: Arc<RwLock<UserTable>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn get(&self, id: UserId) -> Result<Option<User>, DomainError> {
        let table = self.table.read().await;
        Ok(table.users.get(&id.value()).cloned())
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        let table = self.table.read().await;

        Ok(table
            .email_index
            .get(email)
            .and_then(|id| table.users.get(id))
            .cloned())
    }

    async fn create(&self, user: NewUser) -> Result<User, DomainError> {
        let mut table = self.table.write().await;

        if table.email_index.contains_key(&user.email) {
            return Err(DomainError::conflict("Email already registered"));
        }

        table.next_id += 1;
        let id = table.next_id;
        let created = User::new(UserId::new(id), user.email, user.password_hash);

        table.email_index.insert(created.email().to_string(), id);
        table.users.insert(id, created.clone());

        Ok(created)
    }

    async fn update(&self, user: &User) -> Result<User, DomainError> {
        let mut table = self.table.write().await;
        let id = user.id().value();

        let previous_email = match table.users.get(&id) {
            Some(existing) => existing.email().to_string(),
            None => {
                return Err(DomainError::not_found(format!(
                    "User '{}' not found",
                    user.id()
                )))
            }
        };

        if previous_email != user.email() {
            if table.email_index.contains_key(user.email()) {
                return Err(DomainError::conflict("Email already registered"));
            }
            table.email_index.remove(&previous_email);
            table.email_index.insert(user.email().to_string(), id);
        }

        table.users.insert(id, user.clone());
        Ok(user.clone())
    }

    async fn delete(&self, id: UserId) -> Result<bool, DomainError> {
        let mut table = self.table.write().await;

        match table.users.remove(&id.value()) {
            Some(user) => {
                table.email_index.remove(user.email());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn list(&self) -> Result<Vec<User>, DomainError> {
        let table = self.table.read().await;
        Ok(table.users.values().cloned().collect())
    }
}
