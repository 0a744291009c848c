//! Outbound forwarding of verified events.
//!
//! Forwarding is best-effort: the caller that sent the webhook never sees
//! the outcome. [`Forwarder::dispatch`] detaches the call onto the runtime
//! and the spawned task logs what happened; the returned handle lets tests
//! observe the same outcome.

use std::time::Duration;

use reqwest::{header::CONTENT_TYPE, Client};
use serde_json::Value;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::error::ForwardError;
use crate::registry::SenderRegistration;

/// Longest downstream response body echoed into the logs.
const LOGGED_BODY_CHARS: usize = 512;

/// What happened to one forwarded event.
#[derive(Debug)]
pub enum ForwardReport {
    /// The target answered with a 2xx status.
    Delivered { status: u16, body: String },
    /// The target answered with any other status.
    Rejected { status: u16, body: String },
    /// No usable answer was received.
    Failed(ForwardError),
}

impl ForwardReport {
    pub fn is_delivered(&self) -> bool {
        matches!(self, Self::Delivered { .. })
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Delivered { status, .. } | Self::Rejected { status, .. } => Some(*status),
            Self::Failed(_) => None,
        }
    }
}

/// Shared HTTP client for posting events to forwarding targets.
#[derive(Clone)]
pub struct Forwarder {
    client: Client,
    timeout: Duration,
}

impl Forwarder {
    /// Create a forwarder whose calls are bounded by `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, ForwardError> {
        let client = Client::builder()
            .pool_max_idle_per_host(16)
            .build()
            .map_err(ForwardError::Client)?;

        Ok(Self { client, timeout })
    }

    /// Detach a forward onto the runtime.
    ///
    /// The spawned task logs its own outcome. Dropping the handle does not
    /// cancel it.
    pub fn dispatch(&self, sender: &SenderRegistration, event: Value) -> JoinHandle<ForwardReport> {
        let forwarder = self.clone();
        let sender = sender.clone();

        tokio::spawn(async move { forwarder.forward(&sender, &event).await })
    }

    /// POST `event` as JSON to the sender's forwarding target and log the result.
    pub async fn forward(&self, sender: &SenderRegistration, event: &Value) -> ForwardReport {
        let target = &sender.forward_target;

        info!(
            sender = %sender.name,
            target_host = target.host_str().unwrap_or(""),
            timeout_ms = self.timeout.as_millis() as u64,
            "forward_starting"
        );

        let report = match self.send(sender, event).await {
            Ok((status, body)) if (200..300).contains(&status) => {
                ForwardReport::Delivered { status, body }
            }
            Ok((status, body)) => ForwardReport::Rejected { status, body },
            Err(e) => ForwardReport::Failed(e),
        };

        match &report {
            ForwardReport::Delivered { status, body } => info!(
                sender = %sender.name,
                status_code = status,
                response_body = %truncate(body),
                "forward_delivered"
            ),
            ForwardReport::Rejected { status, body } => warn!(
                sender = %sender.name,
                status_code = status,
                response_body = %truncate(body),
                "forward_rejected"
            ),
            ForwardReport::Failed(e) => error!(
                sender = %sender.name,
                target_host = target.host_str().unwrap_or(""),
                error = %e,
                "forward_failed"
            ),
        }

        report
    }

    async fn send(
        &self,
        sender: &SenderRegistration,
        event: &Value,
    ) -> Result<(u16, String), ForwardError> {
        let body = serde_json::to_vec(event)?;

        let response = self
            .client
            .post(sender.forward_target.clone())
            .timeout(self.timeout)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| self.classify(e, ForwardError::Request))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| self.classify(e, ForwardError::ReadBody))?;

        Ok((status, text))
    }

    fn classify(
        &self,
        e: reqwest::Error,
        otherwise: fn(reqwest::Error) -> ForwardError,
    ) -> ForwardError {
        if e.is_timeout() {
            ForwardError::Timeout {
                timeout_ms: self.timeout.as_millis() as u64,
            }
        } else {
            otherwise(e)
        }
    }
}

fn truncate(body: &str) -> String {
    body.chars().take(LOGGED_BODY_CHARS).collect()
}
