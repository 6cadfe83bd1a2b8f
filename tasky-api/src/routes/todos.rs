/// Todo endpoints
///
/// All endpoints require a session. A `:userid` path segment must match the
/// session's user (`403` otherwise); a todo addressed only by its id must
/// belong to the session's user (`404` otherwise).
///
/// # Endpoints
///
/// - `GET    /todos/:userid`     - List a user's todos
/// - `DELETE /todos/:userid`     - Delete all of a user's todos
/// - `GET    /todo/:id`          - Fetch one todo
/// - `POST   /todo/:userid`      - Add a todo
/// - `PUT    /todo`              - Update a todo (id in body)
/// - `DELETE /todo/:userid/:id`  - Delete one todo

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::{ApiJson, ApiPath, Session},
};
use axum::{extract::State, Json};
use tasky_shared::{
    models::todo::Todo,
    service::todos::{self, Deleted, NewTodo, TodoChanges},
};
use uuid::Uuid;

/// Fetches a todo and hides it unless the session owns it
async fn owned_todo(state: &AppState, session: &Session, todo_id: Uuid) -> ApiResult<Todo> {
    let todo = todos::get_todo(state.store(), todo_id).await?;

    if todo.user_id != session.user_id() {
        return Err(ApiError::NotFound(format!("Todo {} not found", todo_id)));
    }
    Ok(todo)
}

/// List a user's todos, oldest first
///
/// # Response
///
/// ```json
/// [
///   {
///     "id": "uuid",
///     "user_id": "uuid",
///     "title": "buy milk",
///     "done": false,
///     "created_at": "2025-01-01T00:00:00Z",
///     "updated_at": "2025-01-01T00:00:00Z"
///   }
/// ]
/// ```
pub async fn get_todos(
    State(state): State<AppState>,
    session: Session,
    ApiPath(user_id): ApiPath<Uuid>,
) -> ApiResult<Json<Vec<Todo>>> {
    session.require_owner(user_id)?;

    let todos = todos::get_todos(state.store(), user_id).await?;
    Ok(Json(todos))
}

/// Fetch one todo
pub async fn get_todo(
    State(state): State<AppState>,
    session: Session,
    ApiPath(todo_id): ApiPath<Uuid>,
) -> ApiResult<Json<Todo>> {
    let todo = owned_todo(&state, &session, todo_id).await?;
    Ok(Json(todo))
}

/// Add a todo
///
/// # Endpoint
///
/// ```text
/// POST /todo/:userid
/// Content-Type: application/json
///
/// { "title": "buy milk" }
/// ```
///
/// `done` may be supplied and defaults to `false`.
///
/// # Errors
///
/// - `403 Forbidden`: `:userid` is not the session user
/// - `422 Unprocessable Entity`: Title missing, blank or longer than 500 characters
pub async fn add_todo(
    State(state): State<AppState>,
    session: Session,
    ApiPath(user_id): ApiPath<Uuid>,
    ApiJson(fields): ApiJson<NewTodo>,
) -> ApiResult<Json<Todo>> {
    session.require_owner(user_id)?;

    let todo = todos::add_todo(state.store(), user_id, fields).await?;
    Ok(Json(todo))
}

/// Update a todo
///
/// # Endpoint
///
/// ```text
/// PUT /todo
/// Content-Type: application/json
///
/// { "id": "uuid", "done": true }
/// ```
///
/// Omitted fields keep their current value.
pub async fn update_todo(
    State(state): State<AppState>,
    session: Session,
    ApiJson(changes): ApiJson<TodoChanges>,
) -> ApiResult<Json<Todo>> {
    owned_todo(&state, &session, changes.id).await?;

    let todo = todos::update_todo(state.store(), changes).await?;
    Ok(Json(todo))
}

/// Delete one todo
///
/// # Response
///
/// ```json
/// { "deleted": 1 }
/// ```
pub async fn delete_todo(
    State(state): State<AppState>,
    session: Session,
    ApiPath((user_id, todo_id)): ApiPath<(Uuid, Uuid)>,
) -> ApiResult<Json<Deleted>> {
    session.require_owner(user_id)?;

    let deleted = todos::delete_todo(state.store(), user_id, todo_id).await?;
    Ok(Json(deleted))
}

/// Delete all of a user's todos
///
/// # Response
///
/// ```json
/// { "deleted": 2 }
/// ```
pub async fn clear_all(
    State(state): State<AppState>,
    session: Session,
    ApiPath(user_id): ApiPath<Uuid>,
) -> ApiResult<Json<Deleted>> {
    session.require_owner(user_id)?;

    let deleted = todos::clear_all(state.store(), user_id).await?;
    Ok(Json(deleted))
}
