/// Session tokens
///
/// A session token is an HS256-signed JWT issued on login. It identifies the
/// user (`sub`) and carries the username so pages can greet the user without
/// a storage round-trip.
///
/// # Claims
///
/// - `sub`: user ID
/// - `username`: username at issue time
/// - `iss`: always `"tasky"`
/// - `iat` / `nbf` / `exp`: Unix timestamps
///
/// # Example
///
/// ```
/// use tasky_shared::auth::jwt::SessionSigner;
/// use chrono::Duration;
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let signer = SessionSigner::new("your-secret-key-at-least-32-bytes", Duration::hours(24));
/// let user_id = Uuid::new_v4();
///
/// let issued = signer.issue(user_id, "alice")?;
/// let claims = signer.verify(&issued.token)?;
/// assert_eq!(claims.sub, user_id);
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Issuer claim stamped on every token
pub const ISSUER: &str = "tasky";

/// Error type for JWT operations
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    /// Failed to create token
    #[error("Failed to create token: {0}")]
    CreateError(String),

    /// Signature, format or claim check failed
    #[error("Failed to validate token: {0}")]
    ValidationError(String),

    /// Token has expired
    #[error("Token has expired")]
    Expired,

    /// Token was signed by someone else
    #[error("Invalid issuer")]
    InvalidIssuer,
}

/// JWT claims carried by a session token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - User ID
    pub sub: Uuid,

    /// Username at issue time
    pub username: String,

    /// Issuer - always "tasky"
    pub iss: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Not before (Unix timestamp)
    pub nbf: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    /// Creates claims valid from now for `ttl`
    pub fn new(user_id: Uuid, username: impl Into<String>, ttl: Duration) -> Self {
        let now = Utc::now();

        Self {
            sub: user_id,
            username: username.into(),
            iss: ISSUER.to_string(),
            iat: now.timestamp(),
            nbf: now.timestamp(),
            exp: (now + ttl).timestamp(),
        }
    }

    /// Expiration as a timestamp
    pub fn expires_at(&self) -> DateTime<Utc> {
        Utc.timestamp_opt(self.exp, 0)
            .single()
            .unwrap_or_else(Utc::now)
    }
}

/// A freshly signed token together with its claims
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub claims: Claims,
}

/// Signs and validates session tokens with one shared secret
///
/// Cheap to clone; constructed once from configuration and shared by all
/// requests.
#[derive(Clone)]
pub struct SessionSigner {
    secret: String,
    ttl: Duration,
}

impl std::fmt::Debug for SessionSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionSigner")
            .field("secret", &"<redacted>")
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl SessionSigner {
    /// Creates a signer
    ///
    /// The secret should be at least 32 bytes; configuration enforces this.
    pub fn new(secret: impl Into<String>, ttl: Duration) -> Self {
        Self {
            secret: secret.into(),
            ttl,
        }
    }

    /// Token lifetime
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issues a token for a user
    pub fn issue(&self, user_id: Uuid, username: &str) -> Result<IssuedToken, JwtError> {
        let claims = Claims::new(user_id, username, self.ttl);
        let token = create_token(&claims, &self.secret)?;

        Ok(IssuedToken { token, claims })
    }

    /// Validates a token and returns its claims
    pub fn verify(&self, token: &str) -> Result<Claims, JwtError> {
        validate_token(token, &self.secret)
    }
}

/// Signs claims with HS256
pub fn create_token(claims: &Claims, secret: &str) -> Result<String, JwtError> {
    let header = Header::new(Algorithm::HS256);
    let key = EncodingKey::from_secret(secret.as_bytes());

    encode(&header, claims, &key)
        .map_err(|e| JwtError::CreateError(format!("Token encoding failed: {}", e)))
}

/// Validates signature, issuer, `exp` and `nbf`, then returns the claims
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, JwtError> {
    let key = DecodingKey::from_secret(secret.as_bytes());

    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[ISSUER]);
    validation.validate_exp = true;
    validation.validate_nbf = true;
    validation.leeway = 0;

    let data = decode::<Claims>(token, &key, &validation).map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::Expired,
        jsonwebtoken::errors::ErrorKind::InvalidIssuer => JwtError::InvalidIssuer,
        _ => JwtError::ValidationError(format!("Token validation failed: {}", e)),
    })?;

    Ok(data.claims)
}
