//! Domain error type shared by every booking operation.

use thiserror::Error;

/// Failure of a booking operation.
///
/// Every variant carries a user-facing message; callers decide how to surface it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Court disabled: {0}")]
    Disabled(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

pub type DomainResult<T> = Result<T, DomainError>;

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        DomainError::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        DomainError::NotFound(msg.into())
    }

    pub fn storage(err: impl std::fmt::Display) -> Self {
        DomainError::Storage(err.to_string())
    }
}

impl From<validator::ValidationErrors> for DomainError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut messages: Vec<String> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |e| {
                    e.message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("Invalid value for {}", field))
                })
            })
            .collect();
        messages.sort();

        let message = match messages.len() {
            0 => "Invalid input".to_string(),
            1 => messages.remove(0),
            _ => messages.join("; "),
        };

        DomainError::Validation(message)
    }
}

impl From<validator::ValidationError> for DomainError {
    fn from(error: validator::ValidationError) -> Self {
        DomainError::Validation(
            error
                .message
                .map(|m| m.to_string())
                .unwrap_or_else(|| error.code.to_string()),
        )
    }
}
