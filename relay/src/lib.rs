//! Zoom webhook relay.
//!
//! Receives Zoom webhooks, works out which rep's app sent them by checking
//! the signature against every configured secret, answers URL validation
//! challenges, and forwards all other events to that rep's automation hook.
//!
//! ## Flow
//!
//! ```text
//! Zoom → POST /webhook → signature match → url_validation? → reply
//!                                        └→ Forwarder::dispatch → rep's hook
//! ```

pub mod config;
pub mod error;
pub mod forward;
pub mod registry;
pub mod web;

// Re-export commonly used types
pub use config::Config;
pub use error::{ForwardError, WebhookError};
pub use forward::{ForwardReport, Forwarder};
pub use registry::{RegistrationError, SenderRegistration, SenderRegistry};
pub use web::{router, AppState};
