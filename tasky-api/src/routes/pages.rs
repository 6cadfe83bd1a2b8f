/// HTML pages
///
/// - `GET /` serves `login.html` from the assets directory
/// - `GET /todo` serves `todo.html` to a browser holding a valid session
///   cookie and redirects everyone else to `/`
///
/// `todo.html` may contain `{{user_id}}` and `{{username}}` placeholders,
/// filled from the session.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::State,
    http::{header, HeaderMap},
    response::{Html, IntoResponse, Redirect, Response},
};
use std::path::Path;
use tasky_shared::auth::session::{self, AuthContext, SESSION_COOKIE};

async fn read_page(dir: &Path, name: &str) -> ApiResult<String> {
    let path = dir.join(name);

    tokio::fs::read_to_string(&path)
        .await
        .map_err(|e| ApiError::InternalError(format!("Failed to read {}: {}", path.display(), e)))
}

fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn render(template: &str, user: &AuthContext) -> String {
    template
        .replace("{{user_id}}", &user.user_id.to_string())
        .replace("{{username}}", &escape_html(&user.username))
}

/// Login page
pub async fn login_page(State(state): State<AppState>) -> ApiResult<Html<String>> {
    let page = read_page(&state.config.api.assets_dir, "login.html").await?;
    Ok(Html(page))
}

/// Todo page, gated on the session cookie
pub async fn todo_page(State(state): State<AppState>, headers: HeaderMap) -> ApiResult<Response> {
    let user = headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|cookies| session::cookie_value(cookies, SESSION_COOKIE))
        .and_then(|token| state.signer.verify(token).ok())
        .map(AuthContext::from);

    let Some(user) = user else {
        tracing::debug!("No valid session cookie, redirecting to login");
        return Ok(Redirect::to("/").into_response());
    };

    let page = read_page(&state.config.api.assets_dir, "todo.html").await?;
    Ok(Html(render(&page, &user)).into_response())
}
