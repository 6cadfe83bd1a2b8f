//! PostgreSQL backend

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use super::{StoreError, TodoStore};
use crate::db::{
    migrations::run_migrations,
    pool::{close_pool, create_pool, health_check, DatabaseConfig},
};
use crate::models::{
    todo::{CreateTodo, Todo, UpdateTodo},
    user::{CreateUser, User},
};

/// [`TodoStore`] over a shared PostgreSQL pool
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Wraps an existing pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Opens a pool, applies pending migrations and returns the store
    pub async fn connect(config: DatabaseConfig) -> Result<Self, StoreError> {
        let pool = create_pool(config).await?;
        run_migrations(&pool)
            .await
            .map_err(|e| StoreError::Database(format!("Migration failed: {}", e)))?;

        Ok(Self::new(pool))
    }
}

#[async_trait]
impl TodoStore for PgStore {
    async fn create_user(&self, data: CreateUser) -> Result<User, StoreError> {
        let user = User::create(&self.pool, data).await?;
        debug!(user_id = %user.id, "Inserted user");
        Ok(user)
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(User::find_by_id(&self.pool, id).await?)
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        Ok(User::find_by_username(&self.pool, username).await?)
    }

    async fn create_todo(&self, data: CreateTodo) -> Result<Todo, StoreError> {
        let todo = Todo::create(&self.pool, data).await?;
        debug!(user_id = %todo.user_id, todo_id = %todo.id, "Inserted todo");
        Ok(todo)
    }

    async fn find_todo(&self, id: Uuid) -> Result<Option<Todo>, StoreError> {
        Ok(Todo::find_by_id(&self.pool, id).await?)
    }

    async fn list_todos(&self, user_id: Uuid) -> Result<Vec<Todo>, StoreError> {
        Ok(Todo::list_by_user(&self.pool, user_id).await?)
    }

    async fn update_todo(&self, id: Uuid, data: UpdateTodo) -> Result<Option<Todo>, StoreError> {
        Ok(Todo::update(&self.pool, id, data).await?)
    }

    async fn delete_todo(&self, user_id: Uuid, id: Uuid) -> Result<bool, StoreError> {
        Ok(Todo::delete_owned(&self.pool, user_id, id).await?)
    }

    async fn delete_todos_for_user(&self, user_id: Uuid) -> Result<u64, StoreError> {
        let removed = Todo::delete_all_for_user(&self.pool, user_id).await?;
        debug!(user_id = %user_id, removed, "Cleared todos");
        Ok(removed)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(health_check(&self.pool).await?)
    }

    async fn close(&self) {
        close_pool(&self.pool).await;
    }
}
