//! Error types for webhook handling and forwarding.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

/// Failures that end a `/webhook` request.
///
/// Response bodies are fixed strings; secrets, digests and parser detail
/// only ever reach the logs.
#[derive(Debug, Error)]
pub enum WebhookError {
    /// No configured sender produced the supplied signature.
    #[error("Invalid signature")]
    Unauthenticated,

    /// The authenticated body is not valid JSON.
    #[error("Malformed webhook body: {0}")]
    MalformedBody(#[from] serde_json::Error),

    /// Anything else that went wrong while handling the request.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for WebhookError {
    fn into_response(self) -> Response {
        match self {
            Self::Unauthenticated => (StatusCode::UNAUTHORIZED, "Invalid signature").into_response(),
            Self::MalformedBody(ref e) => {
                error!(error = %e, line = e.line(), column = e.column(), "webhook_body_malformed");
                (StatusCode::INTERNAL_SERVER_ERROR, "Server error").into_response()
            }
            Self::Internal(ref detail) => {
                error!(detail = %detail, "webhook_handler_error");
                (StatusCode::INTERNAL_SERVER_ERROR, "Server error").into_response()
            }
        }
    }
}

/// Failures of a single outbound forward call.
#[derive(Debug, Error)]
pub enum ForwardError {
    /// The shared HTTP client could not be constructed.
    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// The event could not be serialized for the outbound body.
    #[error("Failed to serialize event: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The forwarding target did not answer within the configured bound.
    #[error("Forward timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    /// Connection, TLS or protocol failure while sending.
    #[error("Forward request failed: {0}")]
    Request(#[source] reqwest::Error),

    /// The target answered but its body could not be read.
    #[error("Failed to read forward response: {0}")]
    ReadBody(#[source] reqwest::Error),
}
