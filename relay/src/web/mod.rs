//! Web server module for handling inbound Zoom webhooks.
//!
//! Routes:
//! - `GET /`: plain-text liveness check
//! - `GET /health`: JSON health check with the active sender count
//! - `POST /webhook`: signature check, URL validation, forwarding

pub mod handlers;
pub mod signature;

use std::any::Any;

use axum::{
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};

use crate::error::WebhookError;

pub use handlers::{
    health, index, zoom_webhook, AppState, HealthResponse, UrlValidationResponse,
    SIGNATURE_HEADER, TIMESTAMP_HEADER, URL_VALIDATION_EVENT,
};
pub use signature::{compute_signature, encrypt_plain_token, verify_zoom_signature};

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/webhook", post(zoom_webhook))
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Turn a handler panic into the same generic 500 as any other failure.
fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };

    WebhookError::Internal(format!("handler panicked: {}", detail)).into_response()
}
