//! Error types for the session store

use api::ApiError;
use common::error::StorageError;
use thiserror::Error;

/// Error returned by session operations
#[derive(Error, Debug)]
pub enum AuthError {
    /// Input rejected before any request was sent
    #[error("Validation error: {0}")]
    Validation(String),

    /// The backend call failed
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The session could not be written to durable storage
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl AuthError {
    /// Message suitable for showing to the user, if the failure carried one
    pub fn detail(&self) -> Option<&str> {
        match self {
            AuthError::Validation(message) => Some(message),
            AuthError::Api(err) => err.detail(),
            AuthError::Storage(_) => None,
        }
    }
}

/// Type alias for Result with AuthError
pub type AuthResult<T> = Result<T, AuthError>;
