//! Store client error types.
//!
//! The one classification that matters to callers is "the store
//! confirmed the item does not exist" versus everything else: a
//! confirmed miss sends the reconciler down the create path, any other
//! failure is terminal for the entity being processed.

use thiserror::Error;

/// Error that can occur while talking to the remote store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Credential exchange did not yield a usable token.
    #[error("authentication failed: {detail}")]
    AuthenticationFailed { detail: String },

    /// The store confirmed the item does not exist. Recoverable: the
    /// caller proceeds as if no remote item was found.
    #[error("item {id} not found in list '{list}'")]
    ItemNotFound { list: String, id: String },

    /// The store answered with a non-success status.
    #[error("remote call failed with status {status}: {body}")]
    RemoteCall { status: u16, body: String },

    /// The request never completed (connect, timeout, TLS, ...).
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The store answered 2xx but the body was not what we expect.
    #[error("invalid response from store: {message}")]
    InvalidResponse { message: String },

    /// The client was built from an unusable configuration.
    #[error("invalid store configuration: {message}")]
    InvalidConfiguration { message: String },
}

impl StoreError {
    /// True when the error is a confirmed "item does not exist".
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::ItemNotFound { .. })
    }

    pub(crate) fn invalid_response(message: impl Into<String>) -> Self {
        StoreError::InvalidResponse {
            message: message.into(),
        }
    }
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
