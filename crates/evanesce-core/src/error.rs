use thiserror::Error;

/// Result type for operations against a backing engine.
pub type Result<T> = std::result::Result<T, StorageError>;

/// Rejected input. Each variant corresponds to one request field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("invalid content: {0}")]
    Content(String),
    #[error("invalid expiresIn: {0}")]
    ExpiresIn(String),
    #[error("invalid maxViews: {0}")]
    MaxViews(String),
    #[error("invalid id: {0}")]
    Id(String),
}

impl ValidationError {
    /// Name of the offending field as it appears on the wire.
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::Content(_) => "content",
            ValidationError::ExpiresIn(_) => "expiresIn",
            ValidationError::MaxViews(_) => "maxViews",
            ValidationError::Id(_) => "id",
        }
    }
}

#[derive(Debug, Clone, Error)]
pub enum StorageError {
    #[error("paste id already exists: {0}")]
    Conflict(String),
    #[error("storage backend unavailable: {0}")]
    Unavailable(String),
    #[error("storage operation timed out: {0}")]
    Timeout(String),
    #[error("stored data is invalid: {0}")]
    InvalidData(String),
    #[error("storage operation failed: {0}")]
    Operation(String),
}

/// Errors surfaced by a [`PasteStore`](crate::PasteStore).
///
/// Storage failures render as a generic message; the backend detail is kept
/// as the error source so it can be logged without reaching the caller.
#[derive(Debug, Clone, Error)]
pub enum PasteError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("internal error")]
    Storage(#[source] StorageError),
}

impl From<StorageError> for PasteError {
    fn from(value: StorageError) -> Self {
        Self::Storage(value)
    }
}
