/// HTTP route handlers
///
/// Thin adapters: each handler extracts the session and request values,
/// calls one `tasky_shared::service` function and wraps the result.
///
/// - `health`: Health check endpoint
/// - `auth`: Signup and login
/// - `todos`: Per-user todo JSON endpoints
/// - `pages`: Login and todo HTML pages

pub mod health;
pub mod auth;
pub mod todos;
pub mod pages;
