//! Storage accessor
//!
//! [`TodoStore`] is the seam between the request handlers and the storage
//! backend. Two implementations ship:
//!
//! - [`PgStore`]: PostgreSQL through a shared sqlx pool (production)
//! - [`MemoryStore`]: in-process maps, for tests and throwaway local runs
//!
//! Backends report uniqueness violations as [`StoreError::Conflict`]; every
//! other failure is [`StoreError::Database`].

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{
    todo::{CreateTodo, Todo, UpdateTodo},
    user::{CreateUser, User},
};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Storage failure
#[derive(Debug, Clone, thiserror::Error)]
pub enum StoreError {
    /// A uniqueness constraint rejected the write
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Backend unreachable or returned an unexpected error
    #[error("Database error: {0}")]
    Database(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                match db_err.constraint() {
                    Some(c) if c.contains("username") => {
                        StoreError::Conflict("Username already exists".to_string())
                    }
                    Some(c) => StoreError::Conflict(format!("Constraint violation: {}", c)),
                    None => StoreError::Conflict(db_err.message().to_string()),
                }
            }
            other => StoreError::Database(other.to_string()),
        }
    }
}

/// Lookups and writes for user and todo records
#[async_trait]
pub trait TodoStore: Send + Sync {
    /// Inserts a user; `Conflict` if the username is taken
    async fn create_user(&self, data: CreateUser) -> Result<User, StoreError>;

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;

    async fn create_todo(&self, data: CreateTodo) -> Result<Todo, StoreError>;

    async fn find_todo(&self, id: Uuid) -> Result<Option<Todo>, StoreError>;

    /// A user's todos, oldest first
    async fn list_todos(&self, user_id: Uuid) -> Result<Vec<Todo>, StoreError>;

    /// `None` if no todo has this id
    async fn update_todo(&self, id: Uuid, data: UpdateTodo) -> Result<Option<Todo>, StoreError>;

    /// `false` if the todo is absent or owned by someone else
    async fn delete_todo(&self, user_id: Uuid, id: Uuid) -> Result<bool, StoreError>;

    /// Removes all of a user's todos and returns how many were removed
    async fn delete_todos_for_user(&self, user_id: Uuid) -> Result<u64, StoreError>;

    /// Cheap connectivity probe for health checks
    async fn ping(&self) -> Result<(), StoreError>;

    /// Releases backend resources during shutdown
    async fn close(&self) {}
}
