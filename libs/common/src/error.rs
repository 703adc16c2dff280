//! Custom error types for the common library
//!
//! This module defines the error types shared by every crate that touches
//! the durable client storage.

use thiserror::Error;

/// Custom error type for durable storage operations
#[derive(Error, Debug)]
pub enum StorageError {
    /// Error occurred while reading or writing the backing file
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored value could not be encoded or decoded
    #[error("Storage serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A writer panicked while holding the storage lock
    #[error("Storage lock poisoned")]
    Poisoned,
}

/// Type alias for Result with StorageError
pub type StorageResult<T> = Result<T, StorageError>;
