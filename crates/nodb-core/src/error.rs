//! Error types module
//!
//! All store operations report failures through [`StoreError`]. Commands and queries
//! never swallow these; only the data migrator may, when told to continue after errors.

use std::fmt::{Display, Formatter, Result as FmtResult};
use thiserror::Error;

/// Store operation errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid storage path: {0}")]
    InvalidPath(String),

    #[error("Item already exists: {0}")]
    AlreadyExists(String),

    #[error("Item not found: {0}")]
    NotFound(String),

    #[error("Serialization failed: {0}")]
    Serialization(String),

    #[error("Failed to deserialize {key}: {reason}")]
    Deserialization { key: String, reason: String },

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Store has been disposed: {0}")]
    Disposed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Payload-free classification of a [`StoreError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreErrorKind {
    InvalidArgument,
    InvalidPath,
    AlreadyExists,
    NotFound,
    Serialization,
    Deserialization,
    Cancelled,
    Disposed,
    Io,
    Config,
}

impl StoreError {
    pub fn kind(&self) -> StoreErrorKind {
        match self {
            StoreError::InvalidArgument(_) => StoreErrorKind::InvalidArgument,
            StoreError::InvalidPath(_) => StoreErrorKind::InvalidPath,
            StoreError::AlreadyExists(_) => StoreErrorKind::AlreadyExists,
            StoreError::NotFound(_) => StoreErrorKind::NotFound,
            StoreError::Serialization(_) => StoreErrorKind::Serialization,
            StoreError::Deserialization { .. } => StoreErrorKind::Deserialization,
            StoreError::Cancelled => StoreErrorKind::Cancelled,
            StoreError::Disposed(_) => StoreErrorKind::Disposed,
            StoreError::Io(_) => StoreErrorKind::Io,
            StoreError::Config(_) => StoreErrorKind::Config,
        }
    }

    /// Build an `InvalidArgument` error for a missing required value.
    pub fn missing(name: &str) -> Self {
        StoreError::InvalidArgument(format!("{} must be provided", name))
    }
}

impl Display for StoreErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let name = match self {
            StoreErrorKind::InvalidArgument => "invalid_argument",
            StoreErrorKind::InvalidPath => "invalid_path",
            StoreErrorKind::AlreadyExists => "already_exists",
            StoreErrorKind::NotFound => "not_found",
            StoreErrorKind::Serialization => "serialization",
            StoreErrorKind::Deserialization => "deserialization",
            StoreErrorKind::Cancelled => "cancelled",
            StoreErrorKind::Disposed => "disposed",
            StoreErrorKind::Io => "io",
            StoreErrorKind::Config => "config",
        };
        write!(f, "{}", name)
    }
}
