//! User storage with Postgres and in-memory backends.

use std::sync::RwLock;

use chrono::Utc;
use sqlx::PgPool;

use crate::error::DbError;
use crate::repository::{ColumnValues, Repository};
use crate::schema::users::{User, UserPatch};

/// Storage backend for the `users` resource.
///
/// The in-memory variant reproduces the unique-email behavior so route
/// handlers behave identically in tests and local development.
pub enum UserStore {
    Postgres(Repository<User>),
    InMemory(InMemoryUserStore),
}

impl UserStore {
    pub fn postgres(pool: PgPool) -> Self {
        Self::Postgres(Repository::new(pool))
    }

    pub fn in_memory() -> Self {
        Self::InMemory(InMemoryUserStore::new())
    }

    pub async fn find_all(&self) -> Result<Vec<User>, DbError> {
        match self {
            UserStore::Postgres(repo) => repo.find_all().await,
            UserStore::InMemory(store) => Ok(store.find_all()),
        }
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<User>, DbError> {
        match self {
            UserStore::Postgres(repo) => repo.find_by_id(id).await,
            UserStore::InMemory(store) => Ok(store.find_by_id(id)),
        }
    }

    /// Insert a new user with a generated id and fresh timestamps.
    pub async fn insert(&self, name: &str, email: &str) -> Result<User, DbError> {
        let now = Utc::now();
        let user = User {
            id: forgekit_core::new_id(),
            name: name.to_string(),
            email: email.to_string(),
            created_at: now,
            updated_at: now,
        };
        match self {
            UserStore::Postgres(repo) => {
                let values = ColumnValues::new()
                    .set("id", user.id.as_str())
                    .set("name", user.name.as_str())
                    .set("email", user.email.as_str())
                    .set("created_at", user.created_at)
                    .set("updated_at", user.updated_at);
                repo.insert_one(&values).await
            }
            UserStore::InMemory(store) => store.insert(user),
        }
    }

    /// Apply a partial update; `None` when no row matched. `updated_at` is
    /// always refreshed.
    pub async fn update(&self, id: &str, patch: UserPatch) -> Result<Option<User>, DbError> {
        match self {
            UserStore::Postgres(repo) => {
                let mut values = ColumnValues::new();
                if let Some(name) = &patch.name {
                    values = values.set("name", name.as_str());
                }
                if let Some(email) = &patch.email {
                    values = values.set("email", email.as_str());
                }
                values = values.set("updated_at", Utc::now());
                repo.update_by_id(id, &values).await
            }
            UserStore::InMemory(store) => store.update(id, patch),
        }
    }

    /// Delete by id and return the removed row; `None` when no row matched.
    pub async fn delete(&self, id: &str) -> Result<Option<User>, DbError> {
        match self {
            UserStore::Postgres(repo) => repo.delete_by_id(id).await,
            UserStore::InMemory(store) => Ok(store.delete(id)),
        }
    }
}

/// In-memory user store for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    rows: RwLock<Vec<User>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn find_all(&self) -> Vec<User> {
        self.rows.read().unwrap().clone()
    }

    fn find_by_id(&self, id: &str) -> Option<User> {
        self.rows.read().unwrap().iter().find(|u| u.id == id).cloned()
    }

    fn insert(&self, user: User) -> Result<User, DbError> {
        let mut rows = self.rows.write().unwrap();
        if rows.iter().any(|u| u.email == user.email) {
            return Err(DbError::UniqueViolation {
                constraint: "users_email_key".to_string(),
            });
        }
        rows.push(user.clone());
        Ok(user)
    }

    fn update(&self, id: &str, patch: UserPatch) -> Result<Option<User>, DbError> {
        let mut rows = self.rows.write().unwrap();
        if let Some(email) = &patch.email {
            if rows.iter().any(|u| u.email == *email && u.id != id) {
                return Err(DbError::UniqueViolation {
                    constraint: "users_email_key".to_string(),
                });
            }
        }
        let Some(user) = rows.iter_mut().find(|u| u.id == id) else {
            return Ok(None);
        };
        if let Some(name) = patch.name {
            user.name = name;
        }
        if let Some(email) = patch.email {
            user.email = email;
        }
        user.updated_at = Utc::now();
        Ok(Some(user.clone()))
    }

    fn delete(&self, id: &str) -> Option<User> {
        let mut rows = self.rows.write().unwrap();
        let index = rows.iter().position(|u| u.id == id)?;
        Some(rows.remove(index))
    }
}
