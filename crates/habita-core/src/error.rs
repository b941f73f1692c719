//! Error types for the habita backend.

use thiserror::Error;

use crate::identity::IdentityError;

#[derive(Debug, Error)]
pub enum HabitaError {
    /// Missing or malformed input. Always surfaced as a bad request
    /// with a cause-specific message.
    #[error("validation error: {message}")]
    Validation { message: String },

    /// A business-rule conflict (email already confirmed, document
    /// already registered, unknown reference value).
    #[error("conflict: {message}")]
    Conflict { message: String },

    #[error("entity not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    /// The external identity provider rejected (or absorbed) a call.
    #[error("identity provider: {0}")]
    Identity(#[from] IdentityError),

    #[error("database error: {0}")]
    Database(String),

    /// Anything unexpected. Never carries caller-visible detail.
    #[error("internal error: {0}")]
    Internal(String),
}

impl HabitaError {
    pub fn validation(message: impl Into<String>) -> Self {
        HabitaError::Validation {
            message: message.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        HabitaError::Conflict {
            message: message.into(),
        }
    }
}

pub type HabitaResult<T> = Result<T, HabitaError>;
