//! Error types for the list gateway API.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use listgate_store::StoreError;
use listgate_sync::SyncError;

/// RFC 7807 problem details response body.
#[derive(Debug, Clone, Serialize)]
pub struct ProblemDetails {
    /// URI identifying the problem type.
    #[serde(rename = "type")]
    pub problem_type: String,
    /// Short human-readable summary.
    pub title: String,
    /// HTTP status code.
    pub status: u16,
    /// Detailed explanation for this occurrence.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Error type for the list gateway API.
#[derive(Debug, thiserror::Error)]
pub enum ApiListsError {
    /// Request body is not a valid entity batch.
    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    /// The store rejected our credentials or the token exchange failed.
    #[error("Store authentication failed")]
    Authentication(#[source] StoreError),

    /// An entity in the batch failed to reconcile.
    #[error("Batch processing failed: {0}")]
    Batch(#[from] SyncError),

    /// A read against the store failed.
    #[error("Store request failed: {0}")]
    Store(#[from] StoreError),
}

impl ApiListsError {
    /// Classify a connection-phase failure. Bad credentials are a
    /// deployment problem and get their own problem type.
    pub fn from_connect(err: StoreError) -> Self {
        match err {
            e @ StoreError::AuthenticationFailed { .. } => ApiListsError::Authentication(e),
            e => ApiListsError::Store(e),
        }
    }
}

impl IntoResponse for ApiListsError {
    fn into_response(self) -> Response {
        let (status, problem) = match &self {
            ApiListsError::InvalidBody(msg) => (
                StatusCode::BAD_REQUEST,
                ProblemDetails {
                    problem_type: "https://listgate.io/problems/invalid-batch".to_string(),
                    title: "Invalid Batch".to_string(),
                    status: 400,
                    detail: Some(msg.clone()),
                },
            ),
            ApiListsError::Authentication(source) => {
                tracing::error!(error = %source, "store authentication failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ProblemDetails {
                        problem_type: "https://listgate.io/problems/store-authentication"
                            .to_string(),
                        title: "Store Authentication Failed".to_string(),
                        status: 500,
                        detail: Some(
                            "The gateway could not authenticate against the remote store"
                                .to_string(),
                        ),
                    },
                )
            }
            ApiListsError::Batch(err) => {
                tracing::error!(error = %err, "batch processing failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ProblemDetails {
                        problem_type: "https://listgate.io/problems/batch-failed".to_string(),
                        title: "Batch Processing Failed".to_string(),
                        status: 500,
                        detail: Some(err.to_string()),
                    },
                )
            }
            ApiListsError::Store(err) => {
                tracing::error!(error = %err, "store request failed");
                (
                    StatusCode::BAD_GATEWAY,
                    ProblemDetails {
                        problem_type: "https://listgate.io/problems/store-unavailable".to_string(),
                        title: "Store Request Failed".to_string(),
                        status: 502,
                        detail: Some(err.to_string()),
                    },
                )
            }
        };

        (status, Json(problem)).into_response()
    }
}
