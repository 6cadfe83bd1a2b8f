/// Todo model and database operations
///
/// A todo belongs to exactly one user and is only reachable through that
/// user's id. Listing is ordered oldest first.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE todos (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     title TEXT NOT NULL,
///     done BOOLEAN NOT NULL DEFAULT FALSE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
///
/// CREATE INDEX idx_todos_user_created ON todos (user_id, created_at);
/// ```
///
/// # Example
///
/// ```no_run
/// use tasky_shared::models::todo::{CreateTodo, Todo};
/// use sqlx::PgPool;
/// use uuid::Uuid;
///
/// # async fn example(pool: PgPool, user_id: Uuid) -> Result<(), sqlx::Error> {
/// let todo = Todo::create(&pool, CreateTodo {
///     user_id,
///     title: "buy milk".to_string(),
///     done: false,
/// }).await?;
///
/// let all = Todo::list_by_user(&pool, user_id).await?;
/// assert!(all.iter().any(|t| t.id == todo.id));
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// A single user-owned work item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Todo {
    pub id: Uuid,

    /// Owning user
    pub user_id: Uuid,

    pub title: String,

    /// Completion flag
    pub done: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a todo
#[derive(Debug, Clone)]
pub struct CreateTodo {
    pub user_id: Uuid,
    pub title: String,
    pub done: bool,
}

/// Input for updating a todo; `None` leaves a field unchanged
#[derive(Debug, Clone, Default)]
pub struct UpdateTodo {
    pub title: Option<String>,
    pub done: Option<bool>,
}

impl Todo {
    pub async fn create(pool: &PgPool, data: CreateTodo) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Todo>(
            r#"
            INSERT INTO todos (user_id, title, done)
            VALUES ($1, $2, $3)
            RETURNING id, user_id, title, done, created_at, updated_at
            "#,
        )
        .bind(data.user_id)
        .bind(data.title)
        .bind(data.done)
        .fetch_one(pool)
        .await
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Todo>(
            r#"
            SELECT id, user_id, title, done, created_at, updated_at
            FROM todos
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Lists a user's todos, oldest first
    pub async fn list_by_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Todo>(
            r#"
            SELECT id, user_id, title, done, created_at, updated_at
            FROM todos
            WHERE user_id = $1
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    /// Applies the present fields and bumps `updated_at`
    ///
    /// Returns `None` if no todo has this id.
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateTodo,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Todo>(
            r#"
            UPDATE todos
            SET title = COALESCE($2, title),
                done = COALESCE($3, done),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, user_id, title, done, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(data.title)
        .bind(data.done)
        .fetch_optional(pool)
        .await
    }

    /// Deletes one todo, but only if `user_id` owns it
    pub async fn delete_owned(pool: &PgPool, user_id: Uuid, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM todos WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Deletes every todo owned by `user_id`, returning how many went
    pub async fn delete_all_for_user(pool: &PgPool, user_id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM todos WHERE user_id = $1")
            .bind(user_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected())
    }
}
