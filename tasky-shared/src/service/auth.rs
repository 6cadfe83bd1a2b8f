//! Signup and login

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::auth::{jwt::SessionSigner, password};
use crate::error::{TaskyError, TaskyResult};
use crate::models::user::{CreateUser, User};
use crate::store::TodoStore;

/// Longest accepted username, in characters
pub const MAX_USERNAME_CHARS: u64 = 64;

/// Longest accepted password, in characters
pub const MAX_PASSWORD_CHARS: usize = 1024;

/// Username and password as submitted by the login/signup forms
///
/// `user` and `pass` are accepted as short aliases.
#[derive(Clone, Deserialize, Validate)]
pub struct Credentials {
    #[serde(default, alias = "user")]
    #[validate(length(min = 1, max = MAX_USERNAME_CHARS, message = "Username must be 1 to 64 characters"))]
    pub username: String,

    #[serde(default, alias = "pass")]
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    fn trimmed(mut self) -> Self {
        self.username = self.username.trim().to_string();
        self
    }

    /// Trims the username and validates both fields for a new account
    fn validated(self) -> TaskyResult<Self> {
        let credentials = self.trimmed();

        let mut errors = match credentials.validate() {
            Ok(()) => ValidationErrors::new(),
            Err(errors) => errors,
        };
        if credentials.password.chars().count() > MAX_PASSWORD_CHARS {
            errors.add(
                "password",
                ValidationError::new("length")
                    .with_message("Password must be at most 1024 characters".into()),
            );
        }

        if errors.is_empty() {
            Ok(credentials)
        } else {
            Err(errors.into())
        }
    }

    /// Whether these could ever match an account
    fn plausible(&self) -> bool {
        let username_chars = self.username.chars().count() as u64;
        let password_chars = self.password.chars().count();

        (1..=MAX_USERNAME_CHARS).contains(&username_chars)
            && (1..=MAX_PASSWORD_CHARS).contains(&password_chars)
    }
}

/// Token handed back by a successful login
#[derive(Debug, Clone, Serialize)]
pub struct AuthToken {
    pub token: String,
    pub user_id: Uuid,
    pub username: String,
    pub expires_at: DateTime<Utc>,
}

/// Creates an account
///
/// # Errors
///
/// - `InvalidInput` when username or password is missing or too long
/// - `Conflict` when the username is already taken
pub async fn sign_up(store: &dyn TodoStore, credentials: Credentials) -> TaskyResult<User> {
    let credentials = credentials.validated()?;

    if store
        .find_user_by_username(&credentials.username)
        .await?
        .is_some()
    {
        return Err(TaskyError::Conflict("Username already exists".to_string()));
    }

    let password_hash = password::hash_password(&credentials.password)?;

    // The unique constraint still catches a concurrent signup that slipped
    // past the lookup above.
    let user = store
        .create_user(CreateUser {
            username: credentials.username,
            password_hash,
        })
        .await?;

    info!(user_id = %user.id, username = %user.username, "User signed up");
    Ok(user)
}

/// Verifies credentials and issues a session token
///
/// # Errors
///
/// `Unauthorized` when the username is unknown, the password is wrong or
/// either field is empty or too long; every case produces the same message.
pub async fn login(
    store: &dyn TodoStore,
    signer: &SessionSigner,
    credentials: Credentials,
) -> TaskyResult<AuthToken> {
    let credentials = credentials.trimmed();
    let rejected = || TaskyError::Unauthorized("Invalid username or password".to_string());

    if !credentials.plausible() {
        warn!("Login with empty or oversized credentials");
        return Err(rejected());
    }

    let Some(user) = store.find_user_by_username(&credentials.username).await? else {
        warn!(username = %credentials.username, "Login for unknown user");
        return Err(rejected());
    };

    if !password::verify_password(&credentials.password, &user.password_hash)? {
        warn!(user_id = %user.id, "Login with wrong password");
        return Err(rejected());
    }

    let issued = signer.issue(user.id, &user.username)?;
    info!(user_id = %user.id, "User logged in");

    Ok(AuthToken {
        token: issued.token,
        user_id: user.id,
        username: user.username,
        expires_at: issued.claims.expires_at(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use chrono::Duration;

    fn signer() -> SessionSigner {
        SessionSigner::new("test-secret-key-at-least-32-bytes-long", Duration::hours(24))
    }

    #[tokio::test]
    async fn test_sign_up_then_login() {
        let store = MemoryStore::new();

        let user = sign_up(&store, Credentials::new("alice", "x")).await.unwrap();
        assert_eq!(user.username, "alice");
        assert!(user.password_hash.starts_with("$argon2id$"));

        let token = login(&store, &signer(), Credentials::new("alice", "x"))
            .await
            .unwrap();
        assert_eq!(token.user_id, user.id);
        assert_eq!(token.username, "alice");
        assert!(token.expires_at > Utc::now());

        let claims = signer().verify(&token.token).unwrap();
        assert_eq!(claims.sub, user.id);
    }

    #[tokio::test]
    async fn test_sign_up_trims_username() {
        let store = MemoryStore::new();
        let user = sign_up(&store, Credentials::new("  alice ", "x")).await.unwrap();
        assert_eq!(user.username, "alice");

        assert!(login(&store, &signer(), Credentials::new("alice", "x")).await.is_ok());
    }

    #[tokio::test]
    async fn test_duplicate_sign_up_conflicts() {
        let store = MemoryStore::new();
        sign_up(&store, Credentials::new("alice", "x")).await.unwrap();

        let err = sign_up(&store, Credentials::new("alice", "y")).await.unwrap_err();
        assert!(matches!(err, TaskyError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_sign_up_requires_fields() {
        let store = MemoryStore::new();

        let err = sign_up(&store, Credentials::new("", "x")).await.unwrap_err();
        match err {
            TaskyError::InvalidInput(fields) => {
                assert_eq!(fields.len(), 1);
                assert_eq!(fields[0].field, "username");
            }
            other => panic!("expected InvalidInput, got {:?}", other),
        }

        let err = sign_up(&store, Credentials::new("   ", "")).await.unwrap_err();
        match err {
            TaskyError::InvalidInput(fields) => {
                let names: Vec<&str> = fields.iter().map(|f| f.field.as_str()).collect();
                assert_eq!(names, vec!["password", "username"]);
            }
            other => panic!("expected InvalidInput, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_login_rejects_bad_credentials() {
        let store = MemoryStore::new();
        sign_up(&store, Credentials::new("alice", "x")).await.unwrap();

        let wrong_password = login(&store, &signer(), Credentials::new("alice", "y"))
            .await
            .unwrap_err();
        let unknown_user = login(&store, &signer(), Credentials::new("mallory", "x"))
            .await
            .unwrap_err();

        let expected = match wrong_password {
            TaskyError::Unauthorized(message) => message,
            other => panic!("expected Unauthorized, got {:?}", other),
        };
        let long_username = "a".repeat(MAX_USERNAME_CHARS as usize + 1);
        let others = vec![
            unknown_user,
            login(&store, &signer(), Credentials::new("alice", ""))
                .await
                .unwrap_err(),
            login(&store, &signer(), Credentials::new("", "x"))
                .await
                .unwrap_err(),
            login(&store, &signer(), Credentials::new(long_username, "x"))
                .await
                .unwrap_err(),
        ];

        for err in others {
            match err {
                TaskyError::Unauthorized(message) => assert_eq!(message, expected),
                other => panic!("expected Unauthorized, got {:?}", other),
            }
        }
    }

    #[tokio::test]
    async fn test_sign_up_password_messages() {
        let store = MemoryStore::new();

        let messages = |err: TaskyError| match err {
            TaskyError::InvalidInput(fields) => fields
                .into_iter()
                .filter(|f| f.field == "password")
                .map(|f| f.message)
                .collect::<Vec<_>>(),
            other => panic!("expected InvalidInput, got {:?}", other),
        };

        let empty = sign_up(&store, Credentials::new("alice", "")).await.unwrap_err();
        assert_eq!(messages(empty), vec!["Password is required".to_string()]);

        let long = "x".repeat(MAX_PASSWORD_CHARS + 1);
        let too_long = sign_up(&store, Credentials::new("alice", long)).await.unwrap_err();
        assert_eq!(
            messages(too_long),
            vec!["Password must be at most 1024 characters".to_string()]
        );

        let longest = "x".repeat(MAX_PASSWORD_CHARS);
        assert!(sign_up(&store, Credentials::new("alice", longest)).await.is_ok());
    }

    #[test]
    fn test_credentials_accept_short_aliases() {
        let creds: Credentials = serde_json::from_str(r#"{"user":"alice","pass":"x"}"#).unwrap();
        assert_eq!(creds.username, "alice");
        assert_eq!(creds.password, "x");

        let debug = format!("{:?}", creds);
        assert!(!debug.contains("\"x\""));
    }
}
