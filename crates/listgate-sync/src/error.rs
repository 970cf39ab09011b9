//! Reconciliation error types.

use thiserror::Error;

use listgate_store::StoreError;

/// Error raised while reconciling entities against the store.
#[derive(Debug, Error)]
pub enum SyncError {
    /// A batch element or the batch itself had the wrong JSON shape.
    #[error("invalid batch: {message}")]
    InvalidBatch { message: String },

    /// The entity lacks a required control field.
    #[error("entity is missing required field '{field}'")]
    MissingRequired { field: String },

    /// A control field is present but has the wrong type.
    #[error("entity field '{field}' must be {expected}")]
    InvalidField { field: String, expected: &'static str },

    /// `Keys` names a field the entity does not carry.
    #[error("'Keys' lists field '{field}' which is absent from the entity")]
    MissingProjected { field: String },

    /// A store call failed hard (anything but a confirmed not-found).
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A per-entity failure, wrapped with the serialized entity so the
    /// caller can tell which record broke the batch.
    #[error("processing failed for entity {entity}: {source}")]
    Entity {
        entity: String,
        #[source]
        source: Box<SyncError>,
    },
}

impl SyncError {
    pub fn invalid_batch(message: impl Into<String>) -> Self {
        SyncError::InvalidBatch {
            message: message.into(),
        }
    }
}

/// Result type for reconciliation operations.
pub type SyncResult<T> = Result<T, SyncError>;
