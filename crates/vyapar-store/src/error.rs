//! # Store Error Types
//!
//! One error enum for every adapter. Backend drivers speak their own error
//! languages (sqlx, redis); everything is funneled into [`StoreError`] so
//! the caller sees one surface regardless of the active provider.
//!
//! Backend error text is propagated verbatim inside [`StoreError::Backend`]
//! rather than re-worded, so a support log line always shows what the
//! driver actually said.

use thiserror::Error;
use vyapar_core::error::LedgerError;

/// Errors from the storage layer.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The active backend failed. Message text comes straight from the
    /// driver.
    #[error("backend error: {0}")]
    Backend(String),

    /// A stored payload failed to decode into its domain type.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Provider profile problems: unreadable file, unknown provider name,
    /// missing connection settings.
    #[error("configuration error: {0}")]
    Config(String),

    /// A record id that should exist does not.
    #[error("record not found: {collection}/{id}")]
    NotFound { collection: String, id: String },

    /// Stock-ledger rule violation, rejected before any write.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// The document committed but the follow-up inventory pass did not
    /// finish. `updated` of `total` item writes landed; the document stands
    /// and the remaining items need a manual stock correction.
    #[error("document saved, but only {updated} of {total} inventory updates applied")]
    PartialInventoryUpdate { updated: usize, total: usize },
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::Backend(err.to_string())
    }
}

impl From<redis::RedisError> for StoreError {
    fn from(err: redis::RedisError) -> Self {
        StoreError::Backend(err.to_string())
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
