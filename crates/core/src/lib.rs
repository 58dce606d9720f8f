//! Shared primitives for all Rust crates in Roleward.

#![forbid(unsafe_code)]

/// Identity primitives shared across services.
pub mod auth;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use auth::{ConnectedIdentity, IdentitySource};

/// Result type used across Roleward crates.
pub type AppResult<T> = Result<T, AppError>;

/// A validated non-empty UTF-8 string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NonEmptyString(String);

impl NonEmptyString {
    /// Creates a validated non-empty string.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(AppError::Validation(
                "value must not be empty or whitespace".to_owned(),
            ));
        }

        Ok(Self(value))
    }

    /// Returns the underlying string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<NonEmptyString> for String {
    fn from(value: NonEmptyString) -> Self {
        value.0
    }
}

/// Common application error categories.
#[derive(Debug, Error)]
pub enum AppError {
    /// Credential or identity problem while establishing a session.
    #[error("authentication error: {0}")]
    Authentication(String),

    /// Actor lacks the rights to mutate a protected resource.
    #[error("authorization error: {0}")]
    Authorization(String),

    /// Attempted mutation of an immutable system role.
    #[error("protected role: {0}")]
    ProtectedRole(String),

    /// Role deletion blocked by active assignments.
    #[error("role in use: {0}")]
    RoleInUse(String),

    /// Role identifier collision on create.
    #[error("duplicate role: {0}")]
    DuplicateRole(String),

    /// Referenced permission is not part of the catalog.
    #[error("unknown permission: {0}")]
    UnknownPermission(String),

    /// Invalid input or violated invariant.
    #[error("validation error: {0}")]
    Validation(String),

    /// Requested resource does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Internal unexpected error.
    #[error("internal error: {0}")]
    Internal(String),
}
