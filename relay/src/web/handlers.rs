//! Webhook endpoint handlers.
//!
//! `/webhook` does, in order:
//! 1. Identify the sender whose secret signed the raw body
//! 2. Answer `endpoint.url_validation` challenges directly
//! 3. Dispatch every other event to the sender's forwarding target
//! 4. Return immediately; the forward outcome is only logged

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::error::WebhookError;
use crate::forward::Forwarder;
use crate::registry::SenderRegistry;
use crate::web::signature::encrypt_plain_token;
use crate::Config;

/// Header carrying the request timestamp that is part of the signing string.
pub const TIMESTAMP_HEADER: &str = "x-zm-request-timestamp";

/// Header carrying the `v0=<hex>` signature.
pub const SIGNATURE_HEADER: &str = "x-zm-signature";

/// Event type Zoom uses to prove endpoint ownership.
pub const URL_VALIDATION_EVENT: &str = "endpoint.url_validation";

/// Body returned by `GET /`.
pub const STATUS_MESSAGE: &str = "Zoom webhook server is running. POST to /webhook";

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<SenderRegistry>,
    pub forwarder: Forwarder,
}

impl AppState {
    pub fn new(config: Config, forwarder: Forwarder) -> Self {
        Self {
            registry: Arc::new(SenderRegistry::new(config.senders)),
            forwarder,
        }
    }
}

// =============================================================================
// Liveness
// =============================================================================

/// Plain-text liveness check.
pub async fn index() -> &'static str {
    STATUS_MESSAGE
}

/// Health check response.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub senders: usize,
}

/// Health check endpoint.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        senders: state.registry.len(),
    })
}

// =============================================================================
// Zoom Webhook
// =============================================================================

/// Answer to an `endpoint.url_validation` challenge.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UrlValidationResponse {
    pub plain_token: String,
    pub encrypted_token: String,
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

/// Zoom webhook endpoint.
///
/// The body is taken as raw bytes so the signature is checked against
/// exactly what was sent; JSON parsing happens only after a sender matched.
pub async fn zoom_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, WebhookError> {
    let timestamp = header_str(&headers, TIMESTAMP_HEADER).unwrap_or("");
    let signature = header_str(&headers, SIGNATURE_HEADER).unwrap_or("");

    info!(
        body_length = body.len(),
        has_timestamp = !timestamp.is_empty(),
        has_signature = !signature.is_empty(),
        "webhook_received"
    );

    let sender = match state.registry.match_signature(timestamp, &body, signature) {
        Some(sender) => sender,
        None => {
            warn!(
                senders_tried = state.registry.len(),
                signature_length = signature.len(),
                "signature_rejected"
            );
            return Err(WebhookError::Unauthenticated);
        }
    };

    info!(sender = %sender.name, "signature_matched");

    let event: Value = serde_json::from_slice(&body)?;
    let event_type = event.get("event").and_then(Value::as_str).unwrap_or("");

    if event_type == URL_VALIDATION_EVENT {
        let plain_token = event
            .pointer("/payload/plainToken")
            .and_then(Value::as_str)
            .unwrap_or("")
            .to_string();

        let encrypted_token = encrypt_plain_token(sender.secret(), &plain_token);

        info!(
            sender = %sender.name,
            plain_token_length = plain_token.len(),
            "url_validation_answered"
        );

        return Ok(Json(UrlValidationResponse {
            plain_token,
            encrypted_token,
        })
        .into_response());
    }

    info!(
        sender = %sender.name,
        event_type = %event_type,
        "forward_dispatched"
    );

    // Detached: the forward logs its own outcome and never changes this response.
    drop(state.forwarder.dispatch(sender, event));

    Ok((StatusCode::OK, "OK").into_response())
}
