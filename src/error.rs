//! Error taxonomy for data entry operations.

use thiserror::Error;

use crate::store::StoreError;

/// Why a data entry operation failed.
///
/// Each variant maps to exactly one response status.
#[derive(Error, Debug)]
pub enum DataEntryError {
    /// Missing or malformed identifier or payload.
    #[error("{0}")]
    Validation(String),

    /// A document with the same primary key already exists.
    #[error("{0}")]
    Conflict(String),

    /// No matching document.
    #[error("{0}")]
    NotFound(String),

    /// Connectivity or driver failure in the store.
    #[error("database error: {0}")]
    Store(String),
}

impl DataEntryError {
    /// Response status for this error.
    pub fn status(&self) -> u16 {
        match self {
            DataEntryError::Validation(_) => 400,
            DataEntryError::NotFound(_) => 404,
            DataEntryError::Conflict(_) => 409,
            DataEntryError::Store(_) => 500,
        }
    }
}

impl From<StoreError> for DataEntryError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::MalformedKey(..) => {
                DataEntryError::Validation(format!("invalid id format: {}", e))
            }
            StoreError::Conflict(_) => DataEntryError::Conflict(format!("duplicate key error: {}", e)),
            StoreError::Backend(_) | StoreError::Serialization(_) => {
                DataEntryError::Store(e.to_string())
            }
        }
    }
}
