//! Error types for the admin interface.

use std::fmt;

use thiserror::Error;

/// Errors reported by an [`Accessor`](crate::Accessor) or
/// [`Searcher`](crate::Searcher).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// No record exists for the primary key.
    #[error("not found")]
    NotFound,

    /// The primary key is malformed for this store.
    #[error("invalid id")]
    InvalidId,

    /// Any other failure, including validation of submitted values.
    #[error("{0}")]
    Other(String),
}

impl StoreError {
    /// Wraps any displayable error as [`StoreError::Other`].
    pub fn other(err: impl fmt::Display) -> Self {
        Self::Other(err.to_string())
    }
}

/// Result type alias for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Admin-specific errors.
#[derive(Debug, Error)]
pub enum AdminError {
    /// Record not found.
    #[error("object not found")]
    NotFound,

    /// Malformed primary key.
    #[error("invalid id")]
    InvalidId,

    /// Backing store failure, carrying the store's message.
    #[error("{0}")]
    Store(String),

    /// Permission denied.
    #[error("permission denied")]
    PermissionDenied,

    /// Model not registered.
    #[error("model not registered: {0}")]
    ModelNotRegistered(String),

    /// A model with the same case-insensitive name is already registered.
    #[error("model already registered: {0}")]
    DuplicateModel(String),

    /// Submitted action is not known for this view.
    #[error("unknown action: {0}")]
    UnknownAction(String),

    /// Route table could not be built.
    #[error("routing error: {0}")]
    Router(#[from] crudmin_router::RouterError),
}

impl From<StoreError> for AdminError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => Self::NotFound,
            StoreError::InvalidId => Self::InvalidId,
            StoreError::Other(message) => Self::Store(message),
        }
    }
}

/// Result type alias for admin operations.
pub type Result<T> = std::result::Result<T, AdminError>;
