/// Signup and login endpoints
///
/// # Endpoints
///
/// - `POST /signup` - Create an account
/// - `POST /login` - Verify credentials and start a session

use crate::{app::AppState, error::ApiResult, extract::ApiJson};
use axum::{
    extract::State,
    http::header,
    response::{AppendHeaders, IntoResponse},
    Json,
};
use tasky_shared::{
    auth::session,
    models::user::User,
    service::auth::{self, AuthToken, Credentials},
};

/// Register a new user
///
/// # Endpoint
///
/// ```text
/// POST /signup
/// Content-Type: application/json
///
/// { "username": "alice", "password": "x" }
/// ```
///
/// `user` and `pass` are accepted in place of `username` and `password`.
///
/// # Response
///
/// ```json
/// { "id": "uuid", "username": "alice", "created_at": "2025-01-01T00:00:00Z" }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Body is not valid JSON
/// - `409 Conflict`: Username already exists
/// - `422 Unprocessable Entity`: Username or password missing
pub async fn signup(
    State(state): State<AppState>,
    ApiJson(credentials): ApiJson<Credentials>,
) -> ApiResult<Json<User>> {
    let user = auth::sign_up(state.store(), credentials).await?;
    Ok(Json(user))
}

/// Login and get a session token
///
/// The token is returned in the body and stored in the `token` cookie, which
/// the todo page reads.
///
/// # Response
///
/// ```json
/// {
///   "token": "eyJ...",
///   "user_id": "uuid",
///   "username": "alice",
///   "expires_at": "2025-01-02T00:00:00Z"
/// }
/// ```
///
/// # Errors
///
/// - `401 Unauthorized`: Unknown username or wrong password
/// - `422 Unprocessable Entity`: Username or password missing
pub async fn login(
    State(state): State<AppState>,
    ApiJson(credentials): ApiJson<Credentials>,
) -> ApiResult<impl IntoResponse> {
    let token: AuthToken = auth::login(state.store(), &state.signer, credentials).await?;

    let cookie = session::session_cookie(
        &token.token,
        state.signer.ttl().num_seconds(),
        state.config.session.secure_cookies,
    );

    Ok((AppendHeaders([(header::SET_COOKIE, cookie)]), Json(token)))
}
