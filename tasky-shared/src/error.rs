/// Domain error taxonomy
///
/// Every service function returns `Result<T, TaskyError>`. The HTTP layer maps
/// each variant onto a status code; nothing in this crate knows about HTTP.
///
/// | Variant        | Meaning                                   |
/// |----------------|-------------------------------------------|
/// | `InvalidInput` | malformed or missing request fields       |
/// | `Unauthorized` | bad credentials or missing session        |
/// | `NotFound`     | unknown user or task id                   |
/// | `Conflict`     | duplicate signup                          |
/// | `Internal`     | storage unreachable or unexpected failure |

use serde::{Deserialize, Serialize};

use crate::auth::{jwt::JwtError, password::PasswordError};
use crate::store::StoreError;

/// Result alias for service operations
pub type TaskyResult<T> = Result<T, TaskyError>;

/// A single field that failed validation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Field that failed validation
    pub field: String,

    /// Error message
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Error returned by the authentication and task handlers
#[derive(Debug, thiserror::Error)]
pub enum TaskyError {
    #[error("Invalid input: {} field(s) failed validation", .0.len())]
    InvalidInput(Vec<FieldError>),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl TaskyError {
    /// Shorthand for a single-field validation failure
    pub fn invalid(field: &str, message: &str) -> Self {
        TaskyError::InvalidInput(vec![FieldError::new(field, message)])
    }
}

impl From<validator::ValidationErrors> for TaskyError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut details: Vec<FieldError> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |error| FieldError {
                    field: field.to_string(),
                    message: error
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| "Validation failed".to_string()),
                })
            })
            .collect();

        // HashMap iteration order is unstable
        details.sort_by(|a, b| a.field.cmp(&b.field));
        TaskyError::InvalidInput(details)
    }
}

impl From<StoreError> for TaskyError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(msg) => TaskyError::Conflict(msg),
            StoreError::Database(msg) => TaskyError::Internal(format!("Storage error: {}", msg)),
        }
    }
}

impl From<PasswordError> for TaskyError {
    fn from(err: PasswordError) -> Self {
        TaskyError::Internal(format!("Password operation failed: {}", err))
    }
}

impl From<JwtError> for TaskyError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::CreateError(msg) => TaskyError::Internal(msg),
            JwtError::Expired => TaskyError::Unauthorized("Session expired".to_string()),
            other => TaskyError::Unauthorized(format!("Invalid session: {}", other)),
        }
    }
}
