/// Authentication primitives
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and verification
/// - [`jwt`]: Session token signing and validation
/// - [`session`]: Authenticated-user context and credential extraction
///
/// # Example
///
/// ```
/// use tasky_shared::auth::password::{hash_password, verify_password};
/// use tasky_shared::auth::jwt::SessionSigner;
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("user_password")?;
/// assert!(verify_password("user_password", &hash)?);
///
/// let signer = SessionSigner::new("a-secret-that-is-at-least-32-bytes!!", chrono::Duration::hours(1));
/// let issued = signer.issue(Uuid::new_v4(), "alice")?;
/// assert!(signer.verify(&issued.token).is_ok());
/// # Ok(())
/// # }
/// ```

pub mod jwt;
pub mod password;
pub mod session;
