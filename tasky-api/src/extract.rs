/// Request extractors
///
/// - [`Session`]: the authenticated user, from a Bearer header or the
///   `token` cookie
/// - [`ApiJson`] / [`ApiPath`]: `Json` and `Path` whose rejections render as
///   [`ApiError::BadRequest`] instead of axum's plain-text bodies

use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts},
    http::{header, request::Parts},
};
use tasky_shared::auth::session::{self, AuthContext};
use uuid::Uuid;

use crate::{app::AppState, error::ApiError};

/// The user a request is acting as
#[derive(Debug, Clone)]
pub struct Session(pub AuthContext);

impl Session {
    pub fn user_id(&self) -> Uuid {
        self.0.user_id
    }

    /// Rejects the request unless the session belongs to `user_id`
    pub fn require_owner(&self, user_id: Uuid) -> Result<(), ApiError> {
        if self.0.owns(user_id) {
            Ok(())
        } else {
            tracing::warn!(
                session_user = %self.0.user_id,
                requested_user = %user_id,
                "Session user does not match path user"
            );
            Err(ApiError::Forbidden(
                "Cannot access another user's todos".to_string(),
            ))
        }
    }
}

#[async_trait]
impl FromRequestParts<AppState> for Session {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let authorization = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok());
        let cookies = parts
            .headers
            .get(header::COOKIE)
            .and_then(|v| v.to_str().ok());

        let context = session::authenticate(&state.signer, authorization, cookies)?;
        Ok(Session(context))
    }
}

/// `Json` with JSON error rejections
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// `Path` with JSON error rejections
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct ApiPath<T>(pub T);
