//! Error types for the Blob Store.

use thiserror::Error;

pub type StorageResult<T> = Result<T, StorageError>;

/// Errors raised by a [`crate::backend::StorageBackend`] implementation.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("blob not found: {0}")]
    NotFound(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("backend error: {0}")]
    Backend(String),
}

impl From<StorageError> for teledrop_core::Error {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(key) => teledrop_core::Error::NotFound(key),
            StorageError::Io(io_err) => teledrop_core::Error::Io(io_err),
            StorageError::Backend(msg) => teledrop_core::Error::Storage(msg),
        }
    }
}
