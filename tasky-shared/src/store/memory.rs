//! In-process backend
//!
//! Keeps everything in maps behind one `RwLock`. Data lives as long as the
//! store; nothing is persisted.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{StoreError, TodoStore};
use crate::models::{
    todo::{CreateTodo, Todo, UpdateTodo},
    user::{CreateUser, User},
};

#[derive(Debug, Default)]
struct State {
    users: HashMap<Uuid, User>,
    /// Insertion order, which is also creation order
    todos: Vec<Todo>,
}

/// [`TodoStore`] held entirely in memory
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TodoStore for MemoryStore {
    async fn create_user(&self, data: CreateUser) -> Result<User, StoreError> {
        let mut state = self.state.write().await;

        if state.users.values().any(|u| u.username == data.username) {
            return Err(StoreError::Conflict("Username already exists".to_string()));
        }

        let user = User {
            id: Uuid::new_v4(),
            username: data.username,
            password_hash: data.password_hash,
            created_at: Utc::now(),
        };
        state.users.insert(user.id, user.clone());

        Ok(user)
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(self.state.read().await.users.get(&id).cloned())
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let state = self.state.read().await;
        Ok(state.users.values().find(|u| u.username == username).cloned())
    }

    async fn create_todo(&self, data: CreateTodo) -> Result<Todo, StoreError> {
        let mut state = self.state.write().await;

        // Mirrors the foreign key on todos.user_id
        if !state.users.contains_key(&data.user_id) {
            return Err(StoreError::Database(format!(
                "User {} does not exist",
                data.user_id
            )));
        }

        let now = Utc::now();
        let todo = Todo {
            id: Uuid::new_v4(),
            user_id: data.user_id,
            title: data.title,
            done: data.done,
            created_at: now,
            updated_at: now,
        };
        state.todos.push(todo.clone());

        Ok(todo)
    }

    async fn find_todo(&self, id: Uuid) -> Result<Option<Todo>, StoreError> {
        let state = self.state.read().await;
        Ok(state.todos.iter().find(|t| t.id == id).cloned())
    }

    async fn list_todos(&self, user_id: Uuid) -> Result<Vec<Todo>, StoreError> {
        let state = self.state.read().await;
        Ok(state
            .todos
            .iter()
            .filter(|t| t.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn update_todo(&self, id: Uuid, data: UpdateTodo) -> Result<Option<Todo>, StoreError> {
        let mut state = self.state.write().await;

        let Some(todo) = state.todos.iter_mut().find(|t| t.id == id) else {
            return Ok(None);
        };

        if let Some(title) = data.title {
            todo.title = title;
        }
        if let Some(done) = data.done {
            todo.done = done;
        }
        todo.updated_at = Utc::now();

        Ok(Some(todo.clone()))
    }

    async fn delete_todo(&self, user_id: Uuid, id: Uuid) -> Result<bool, StoreError> {
        let mut state = self.state.write().await;
        let before = state.todos.len();
        state.todos.retain(|t| !(t.id == id && t.user_id == user_id));

        Ok(state.todos.len() < before)
    }

    async fn delete_todos_for_user(&self, user_id: Uuid) -> Result<u64, StoreError> {
        let mut state = self.state.write().await;
        let before = state.todos.len();
        state.todos.retain(|t| t.user_id != user_id);

        Ok((before - state.todos.len()) as u64)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn user(store: &MemoryStore, name: &str) -> User {
        store
            .create_user(CreateUser {
                username: name.to_string(),
                password_hash: "hash".to_string(),
            })
            .await
            .unwrap()
    }

    async fn todo(store: &MemoryStore, user_id: Uuid, title: &str) -> Todo {
        store
            .create_todo(CreateTodo {
                user_id,
                title: title.to_string(),
                done: false,
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_duplicate_username_conflicts() {
        let store = MemoryStore::new();
        user(&store, "alice").await;

        let err = store
            .create_user(CreateUser {
                username: "alice".to_string(),
                password_hash: "other".to_string(),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, StoreError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_find_user() {
        let store = MemoryStore::new();
        let alice = user(&store, "alice").await;

        assert_eq!(store.find_user_by_id(alice.id).await.unwrap(), Some(alice.clone()));
        assert_eq!(
            store.find_user_by_username("alice").await.unwrap().map(|u| u.id),
            Some(alice.id)
        );
        assert!(store.find_user_by_username("Alice").await.unwrap().is_none());
        assert!(store.find_user_by_id(Uuid::new_v4()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_todo_for_unknown_user_is_rejected() {
        let store = MemoryStore::new();
        let err = store
            .create_todo(CreateTodo {
                user_id: Uuid::new_v4(),
                title: "orphan".to_string(),
                done: false,
            })
            .await
            .unwrap_err();

        assert!(matches!(err, StoreError::Database(_)));
    }

    #[tokio::test]
    async fn test_list_keeps_creation_order() {
        let store = MemoryStore::new();
        let alice = user(&store, "alice").await;
        let first = todo(&store, alice.id, "first").await;
        let second = todo(&store, alice.id, "second").await;
        let third = todo(&store, alice.id, "third").await;

        let ids: Vec<Uuid> = store
            .list_todos(alice.id)
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.id)
            .collect();

        assert_eq!(ids, vec![first.id, second.id, third.id]);
    }

    #[tokio::test]
    async fn test_update_applies_only_present_fields() {
        let store = MemoryStore::new();
        let alice = user(&store, "alice").await;
        let original = todo(&store, alice.id, "buy milk").await;

        let updated = store
            .update_todo(
                original.id,
                UpdateTodo {
                    done: Some(true),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.title, "buy milk");
        assert!(updated.done);
        assert!(updated.updated_at >= original.updated_at);
        assert_eq!(updated.created_at, original.created_at);

        assert!(store
            .update_todo(Uuid::new_v4(), UpdateTodo::default())
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_delete_requires_ownership() {
        let store = MemoryStore::new();
        let alice = user(&store, "alice").await;
        let bob = user(&store, "bob").await;
        let item = todo(&store, alice.id, "buy milk").await;

        assert!(!store.delete_todo(bob.id, item.id).await.unwrap());
        assert!(store.find_todo(item.id).await.unwrap().is_some());

        assert!(store.delete_todo(alice.id, item.id).await.unwrap());
        assert!(store.find_todo(item.id).await.unwrap().is_none());
        assert!(!store.delete_todo(alice.id, item.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_all_is_scoped_to_user() {
        let store = MemoryStore::new();
        let alice = user(&store, "alice").await;
        let bob = user(&store, "bob").await;
        todo(&store, alice.id, "a1").await;
        todo(&store, alice.id, "a2").await;
        let kept = todo(&store, bob.id, "b1").await;

        assert_eq!(store.delete_todos_for_user(alice.id).await.unwrap(), 2);
        assert!(store.list_todos(alice.id).await.unwrap().is_empty());
        assert_eq!(store.list_todos(bob.id).await.unwrap(), vec![kept]);
        assert_eq!(store.delete_todos_for_user(alice.id).await.unwrap(), 0);
    }
}
