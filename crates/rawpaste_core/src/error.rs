//! Application error types for core storage and domain logic.
use thiserror::Error;

/// Storage-level error type shared by the snippet store.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] redb::Error),

    #[error("Storage error: {0}")]
    StorageMessage(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] bincode::Error),
}

impl From<redb::DatabaseError> for AppError {
    fn from(value: redb::DatabaseError) -> Self {
        Self::Database(value.into())
    }
}

impl From<redb::TransactionError> for AppError {
    fn from(value: redb::TransactionError) -> Self {
        Self::Database(value.into())
    }
}

impl From<redb::TableError> for AppError {
    fn from(value: redb::TableError) -> Self {
        Self::Database(value.into())
    }
}

impl From<redb::StorageError> for AppError {
    fn from(value: redb::StorageError) -> Self {
        Self::Database(value.into())
    }
}

impl From<redb::CommitError> for AppError {
    fn from(value: redb::CommitError) -> Self {
        Self::Database(value.into())
    }
}

/// Outcomes of gateway operations other than success.
///
/// Every variant is surfaced to the caller; the gateway never retries a
/// store failure or hides a denial.
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Authentication required")]
    Unauthenticated,

    #[error("Snippet content is empty")]
    EmptyContent,

    #[error("Snippet quota of {limit} reached")]
    QuotaExceeded { limit: usize },

    #[error("Could not allocate a unique identifier after {attempts} attempts; try again later")]
    AllocationExhausted { attempts: usize },

    #[error("Not found")]
    NotFound,

    #[error("Snippet is private")]
    Forbidden,

    #[error("Snippet belongs to another owner")]
    NotOwner,

    #[error(transparent)]
    StoreFailure(#[from] AppError),
}
