/// Authenticated-user context and session credential handling
///
/// A session token reaches the server either as an `Authorization: Bearer`
/// header (API clients) or as the `token` cookie set at login (the browser
/// pages). Both are accepted; a Bearer header wins when both are present.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::jwt::{Claims, JwtError, SessionSigner};

/// Name of the cookie carrying the session token
pub const SESSION_COOKIE: &str = "token";

/// The authenticated user behind a request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthContext {
    pub user_id: Uuid,
    pub username: String,
}

impl From<Claims> for AuthContext {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.sub,
            username: claims.username,
        }
    }
}

impl AuthContext {
    /// Whether this session may act on behalf of `user_id`
    pub fn owns(&self, user_id: Uuid) -> bool {
        self.user_id == user_id
    }
}

/// Why a request carried no usable session
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Missing session credentials")]
    MissingCredentials,

    #[error("Invalid authorization header: {0}")]
    InvalidFormat(String),

    #[error("Invalid session token: {0}")]
    InvalidToken(#[from] JwtError),
}

/// Picks the session token out of the raw `Authorization` and `Cookie`
/// header values
pub fn extract_token<'a>(
    authorization: Option<&'a str>,
    cookie_header: Option<&'a str>,
) -> Result<&'a str, SessionError> {
    // Other schemes (Basic, Digest) are left to the cookie
    if let Some(token) = authorization.and_then(|value| value.strip_prefix("Bearer ")) {
        let token = token.trim();
        if token.is_empty() {
            return Err(SessionError::InvalidFormat("Empty Bearer token".to_string()));
        }
        return Ok(token);
    }

    cookie_header
        .and_then(|header| cookie_value(header, SESSION_COOKIE))
        .ok_or(SessionError::MissingCredentials)
}

/// Resolves the raw header values into an authenticated user
pub fn authenticate(
    signer: &SessionSigner,
    authorization: Option<&str>,
    cookie_header: Option<&str>,
) -> Result<AuthContext, SessionError> {
    let token = extract_token(authorization, cookie_header)?;
    let claims = signer.verify(token)?;

    Ok(claims.into())
}

/// Looks up one cookie in a `Cookie` header value
pub fn cookie_value<'a>(header: &'a str, name: &str) -> Option<&'a str> {
    header
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim())
        .filter(|value| !value.is_empty())
}

/// Builds the `Set-Cookie` value that stores a session token
pub fn session_cookie(token: &str, max_age_seconds: i64, secure: bool) -> String {
    let mut cookie = format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        SESSION_COOKIE, token, max_age_seconds
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    #[test]
    fn test_extract_token_prefers_bearer_header() {
        let token = extract_token(Some("Bearer abc.def.ghi"), Some("token=zzz")).unwrap();
        assert_eq!(token, "abc.def.ghi");
    }

    #[test]
    fn test_extract_token_falls_back_to_cookie() {
        let token = extract_token(None, Some("theme=dark; token=abc.def.ghi; lang=en")).unwrap();
        assert_eq!(token, "abc.def.ghi");
    }

    #[test]
    fn test_extract_token_missing() {
        assert!(matches!(
            extract_token(None, None),
            Err(SessionError::MissingCredentials)
        ));
        assert!(matches!(
            extract_token(None, Some("theme=dark")),
            Err(SessionError::MissingCredentials)
        ));
        assert!(matches!(
            extract_token(None, Some("token=")),
            Err(SessionError::MissingCredentials)
        ));
    }

    #[test]
    fn test_extract_token_other_schemes_use_cookie() {
        let token = extract_token(Some("Basic dXNlcjpwYXNz"), Some("token=abc.def.ghi")).unwrap();
        assert_eq!(token, "abc.def.ghi");

        assert!(matches!(
            extract_token(Some("Basic dXNlcjpwYXNz"), None),
            Err(SessionError::MissingCredentials)
        ));
    }

    #[test]
    fn test_extract_token_rejects_empty_bearer() {
        assert!(matches!(
            extract_token(Some("Bearer   "), None),
            Err(SessionError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_authenticate_round_trip() {
        let signer = SessionSigner::new(SECRET, Duration::hours(1));
        let user_id = Uuid::new_v4();
        let issued = signer.issue(user_id, "alice").unwrap();

        let cookie = format!("token={}", issued.token);
        let ctx = authenticate(&signer, None, Some(&cookie)).unwrap();

        assert_eq!(ctx.user_id, user_id);
        assert_eq!(ctx.username, "alice");
        assert!(ctx.owns(user_id));
        assert!(!ctx.owns(Uuid::new_v4()));
    }

    #[test]
    fn test_authenticate_rejects_tampered_token() {
        let signer = SessionSigner::new(SECRET, Duration::hours(1));
        let issued = signer.issue(Uuid::new_v4(), "alice").unwrap();
        let tampered = format!("Bearer {}x", issued.token);

        assert!(matches!(
            authenticate(&signer, Some(&tampered), None),
            Err(SessionError::InvalidToken(_))
        ));
    }

    #[test]
    fn test_session_cookie_attributes() {
        let cookie = session_cookie("abc", 3600, false);
        assert_eq!(cookie, "token=abc; Path=/; HttpOnly; SameSite=Lax; Max-Age=3600");

        let cookie = session_cookie("abc", 60, true);
        assert!(cookie.ends_with("; Secure"));
    }
}
