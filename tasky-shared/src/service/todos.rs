//! Per-user task operations
//!
//! Every operation is scoped by a user id or a todo id; a todo is only ever
//! listed, created or deleted through its owner's id.

use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::error::{TaskyError, TaskyResult};
use crate::models::todo::{CreateTodo, Todo, UpdateTodo};
use crate::store::TodoStore;

/// Longest accepted title, in characters
pub const MAX_TITLE_CHARS: u64 = 500;

/// Fields for a new todo
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct NewTodo {
    #[serde(default)]
    #[validate(length(min = 1, max = MAX_TITLE_CHARS, message = "Title must be 1 to 500 characters"))]
    pub title: String,

    #[serde(default)]
    pub done: bool,
}

impl NewTodo {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            done: false,
        }
    }
}

/// Changes to an existing todo, addressed by id
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct TodoChanges {
    pub id: Uuid,

    #[serde(default)]
    #[validate(length(min = 1, max = MAX_TITLE_CHARS, message = "Title must be 1 to 500 characters"))]
    pub title: Option<String>,

    #[serde(default)]
    pub done: Option<bool>,
}

/// Outcome of a delete
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Deleted {
    pub deleted: u64,
}

fn trimmed(title: String) -> String {
    let trimmed = title.trim();
    if trimmed.len() == title.len() {
        title
    } else {
        trimmed.to_string()
    }
}

async fn require_user(store: &dyn TodoStore, user_id: Uuid) -> TaskyResult<()> {
    match store.find_user_by_id(user_id).await? {
        Some(_) => Ok(()),
        None => Err(TaskyError::NotFound(format!("User {} not found", user_id))),
    }
}

/// Lists a user's todos, oldest first
///
/// # Errors
///
/// `NotFound` when the user does not exist.
pub async fn get_todos(store: &dyn TodoStore, user_id: Uuid) -> TaskyResult<Vec<Todo>> {
    require_user(store, user_id).await?;
    Ok(store.list_todos(user_id).await?)
}

/// Fetches one todo
///
/// # Errors
///
/// `NotFound` when no todo has this id.
pub async fn get_todo(store: &dyn TodoStore, todo_id: Uuid) -> TaskyResult<Todo> {
    store
        .find_todo(todo_id)
        .await?
        .ok_or_else(|| TaskyError::NotFound(format!("Todo {} not found", todo_id)))
}

/// Creates a todo for a user
///
/// # Errors
///
/// - `InvalidInput` when the title is missing, blank or too long
/// - `NotFound` when the user does not exist
pub async fn add_todo(store: &dyn TodoStore, user_id: Uuid, fields: NewTodo) -> TaskyResult<Todo> {
    let fields = NewTodo {
        title: trimmed(fields.title),
        done: fields.done,
    };
    fields.validate()?;
    require_user(store, user_id).await?;

    let todo = store
        .create_todo(CreateTodo {
            user_id,
            title: fields.title,
            done: fields.done,
        })
        .await?;

    info!(user_id = %user_id, todo_id = %todo.id, "Todo added");
    Ok(todo)
}

/// Applies changes to a todo
///
/// Absent fields are left as they are.
///
/// # Errors
///
/// - `InvalidInput` when a supplied title is blank or too long
/// - `NotFound` when no todo has this id
pub async fn update_todo(store: &dyn TodoStore, changes: TodoChanges) -> TaskyResult<Todo> {
    let changes = TodoChanges {
        title: changes.title.map(trimmed),
        ..changes
    };
    changes.validate()?;

    let todo = store
        .update_todo(
            changes.id,
            UpdateTodo {
                title: changes.title,
                done: changes.done,
            },
        )
        .await?
        .ok_or_else(|| TaskyError::NotFound(format!("Todo {} not found", changes.id)))?;

    info!(todo_id = %todo.id, done = todo.done, "Todo updated");
    Ok(todo)
}

/// Deletes one of a user's todos
///
/// # Errors
///
/// `NotFound` when the todo does not exist or belongs to someone else.
pub async fn delete_todo(store: &dyn TodoStore, user_id: Uuid, todo_id: Uuid) -> TaskyResult<Deleted> {
    if !store.delete_todo(user_id, todo_id).await? {
        return Err(TaskyError::NotFound(format!("Todo {} not found", todo_id)));
    }

    info!(user_id = %user_id, todo_id = %todo_id, "Todo deleted");
    Ok(Deleted { deleted: 1 })
}

/// Deletes all of a user's todos
///
/// Clearing an empty list succeeds with `deleted: 0`.
pub async fn clear_all(store: &dyn TodoStore, user_id: Uuid) -> TaskyResult<Deleted> {
    let deleted = store.delete_todos_for_user(user_id).await?;

    info!(user_id = %user_id, deleted, "Todos cleared");
    Ok(Deleted { deleted })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::auth::{sign_up, Credentials};
    use crate::store::MemoryStore;

    async fn account(store: &MemoryStore, name: &str) -> Uuid {
        sign_up(store, Credentials::new(name, "x")).await.unwrap().id
    }

    #[tokio::test]
    async fn test_added_todo_is_listed_only_for_its_owner() {
        let store = MemoryStore::new();
        let alice = account(&store, "alice").await;
        let bob = account(&store, "bob").await;

        let todo = add_todo(&store, alice, NewTodo::titled("buy milk")).await.unwrap();
        assert_eq!(todo.user_id, alice);
        assert_eq!(todo.title, "buy milk");
        assert!(!todo.done);

        assert_eq!(get_todos(&store, alice).await.unwrap(), vec![todo.clone()]);
        assert!(get_todos(&store, bob).await.unwrap().iter().all(|t| t.id != todo.id));
    }

    #[tokio::test]
    async fn test_get_todos_for_unknown_user() {
        let store = MemoryStore::new();
        let err = get_todos(&store, Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, TaskyError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_add_todo_validation() {
        let store = MemoryStore::new();
        let alice = account(&store, "alice").await;

        let err = add_todo(&store, alice, NewTodo::default()).await.unwrap_err();
        assert!(matches!(err, TaskyError::InvalidInput(_)));

        let err = add_todo(&store, alice, NewTodo::titled("   ")).await.unwrap_err();
        assert!(matches!(err, TaskyError::InvalidInput(_)));

        let long = "x".repeat(MAX_TITLE_CHARS as usize + 1);
        let err = add_todo(&store, alice, NewTodo::titled(long)).await.unwrap_err();
        assert!(matches!(err, TaskyError::InvalidInput(_)));

        let longest = "é".repeat(MAX_TITLE_CHARS as usize);
        let todo = add_todo(&store, alice, NewTodo::titled(longest.clone())).await.unwrap();
        assert_eq!(todo.title, longest);

        let todo = add_todo(&store, alice, NewTodo::titled("  padded  ")).await.unwrap();
        assert_eq!(todo.title, "padded");
    }

    #[tokio::test]
    async fn test_add_todo_for_unknown_user() {
        let store = MemoryStore::new();
        let err = add_todo(&store, Uuid::new_v4(), NewTodo::titled("orphan"))
            .await
            .unwrap_err();
        assert!(matches!(err, TaskyError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_update_todo() {
        let store = MemoryStore::new();
        let alice = account(&store, "alice").await;
        let todo = add_todo(&store, alice, NewTodo::titled("buy milk")).await.unwrap();

        let updated = update_todo(
            &store,
            TodoChanges {
                id: todo.id,
                title: None,
                done: Some(true),
            },
        )
        .await
        .unwrap();
        assert!(updated.done);
        assert_eq!(updated.title, "buy milk");

        let renamed = update_todo(
            &store,
            TodoChanges {
                id: todo.id,
                title: Some("buy oat milk".to_string()),
                done: None,
            },
        )
        .await
        .unwrap();
        assert!(renamed.done);
        assert_eq!(renamed.title, "buy oat milk");
        assert_eq!(get_todo(&store, todo.id).await.unwrap(), renamed);
    }

    #[tokio::test]
    async fn test_update_unknown_or_invalid() {
        let store = MemoryStore::new();
        let alice = account(&store, "alice").await;
        let todo = add_todo(&store, alice, NewTodo::titled("buy milk")).await.unwrap();

        let err = update_todo(
            &store,
            TodoChanges {
                id: Uuid::new_v4(),
                title: None,
                done: Some(true),
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, TaskyError::NotFound(_)));

        let err = update_todo(
            &store,
            TodoChanges {
                id: todo.id,
                title: Some(" ".to_string()),
                done: None,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, TaskyError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_deleted_todo_is_not_found() {
        let store = MemoryStore::new();
        let alice = account(&store, "alice").await;
        let todo = add_todo(&store, alice, NewTodo::titled("buy milk")).await.unwrap();

        assert_eq!(
            delete_todo(&store, alice, todo.id).await.unwrap(),
            Deleted { deleted: 1 }
        );

        let err = get_todo(&store, todo.id).await.unwrap_err();
        assert!(matches!(err, TaskyError::NotFound(_)));

        let err = delete_todo(&store, alice, todo.id).await.unwrap_err();
        assert!(matches!(err, TaskyError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_delete_todo_of_another_user() {
        let store = MemoryStore::new();
        let alice = account(&store, "alice").await;
        let bob = account(&store, "bob").await;
        let todo = add_todo(&store, alice, NewTodo::titled("buy milk")).await.unwrap();

        let err = delete_todo(&store, bob, todo.id).await.unwrap_err();
        assert!(matches!(err, TaskyError::NotFound(_)));
        assert!(get_todo(&store, todo.id).await.is_ok());
    }

    #[tokio::test]
    async fn test_clear_all_leaves_other_users_alone() {
        let store = MemoryStore::new();
        let alice = account(&store, "alice").await;
        let bob = account(&store, "bob").await;
        add_todo(&store, alice, NewTodo::titled("a1")).await.unwrap();
        add_todo(&store, alice, NewTodo::titled("a2")).await.unwrap();
        let bobs = add_todo(&store, bob, NewTodo::titled("b1")).await.unwrap();

        assert_eq!(clear_all(&store, alice).await.unwrap(), Deleted { deleted: 2 });
        assert!(get_todos(&store, alice).await.unwrap().is_empty());
        assert_eq!(get_todos(&store, bob).await.unwrap(), vec![bobs]);

        assert_eq!(clear_all(&store, alice).await.unwrap(), Deleted { deleted: 0 });
    }
}
