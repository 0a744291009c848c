//! Sender registry.
//!
//! Each sender ("rep") owns one Zoom webhook secret and one forwarding
//! target. The registry is built once at startup and only read afterwards;
//! handlers share it behind an `Arc`.

use std::fmt;

use thiserror::Error;
use tracing::warn;
use url::Url;

use crate::web::signature::verify_zoom_signature;

/// Why a configured sender was left out of the active set.
#[derive(Debug, Error, PartialEq)]
pub enum RegistrationError {
    #[error("missing webhook secret")]
    MissingSecret,

    #[error("missing forwarding target")]
    MissingTarget,

    #[error("invalid forwarding target: {0}")]
    InvalidTarget(#[from] url::ParseError),

    #[error("unsupported forwarding target scheme '{0}'")]
    UnsupportedScheme(String),
}

/// One active sender: a name, its shared secret and where its events go.
#[derive(Clone)]
pub struct SenderRegistration {
    pub name: String,
    secret: String,
    pub forward_target: Url,
}

impl SenderRegistration {
    /// Validate raw configuration values into a registration.
    ///
    /// Blank values count as missing.
    pub fn new(
        name: impl Into<String>,
        secret: Option<String>,
        forward_target: Option<String>,
    ) -> Result<Self, RegistrationError> {
        let secret = secret
            .filter(|s| !s.trim().is_empty())
            .ok_or(RegistrationError::MissingSecret)?;
        let target = forward_target
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or(RegistrationError::MissingTarget)?;

        let forward_target = Url::parse(&target)?;
        if !matches!(forward_target.scheme(), "http" | "https") {
            return Err(RegistrationError::UnsupportedScheme(
                forward_target.scheme().to_string(),
            ));
        }

        Ok(Self {
            name: name.into(),
            secret,
            forward_target,
        })
    }

    pub fn secret(&self) -> &str {
        &self.secret
    }

    /// Whether this sender's secret produces `signature` for the request.
    pub fn signed(&self, timestamp: &str, raw_body: &[u8], signature: &str) -> bool {
        verify_zoom_signature(&self.secret, timestamp, raw_body, signature)
    }
}

impl fmt::Debug for SenderRegistration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SenderRegistration")
            .field("name", &self.name)
            .field("secret", &"<redacted>")
            .field("forward_target", &self.forward_target.as_str())
            .finish()
    }
}

/// Immutable, ordered set of active senders.
#[derive(Debug, Clone, Default)]
pub struct SenderRegistry {
    senders: Vec<SenderRegistration>,
}

impl SenderRegistry {
    /// Build the registry, keeping configuration order.
    ///
    /// Senders sharing a secret are a configuration mistake: they are kept,
    /// but only the first of them can ever match.
    pub fn new(senders: Vec<SenderRegistration>) -> Self {
        for (i, later) in senders.iter().enumerate() {
            if let Some(earlier) = senders[..i].iter().find(|s| s.secret == later.secret) {
                warn!(
                    sender = %later.name,
                    shadowed_by = %earlier.name,
                    "sender_secret_shared"
                );
            }
        }

        if senders.is_empty() {
            warn!("no_active_senders");
        }

        Self { senders }
    }

    pub fn len(&self) -> usize {
        self.senders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.senders.is_empty()
    }

    /// Find the sender whose secret produced `signature`.
    ///
    /// Senders are tried in configuration order and the first match wins.
    pub fn match_signature(
        &self,
        timestamp: &str,
        raw_body: &[u8],
        signature: &str,
    ) -> Option<&SenderRegistration> {
        if signature.is_empty() {
            return None;
        }

        self.senders
            .iter()
            .find(|sender| sender.signed(timestamp, raw_body, signature))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::web::signature::compute_signature;

    fn sender(name: &str, secret: &str) -> SenderRegistration {
        SenderRegistration::new(
            name,
            Some(secret.to_string()),
            Some(format!("https://hooks.example.com/{}", name)),
        )
        .unwrap()
    }

    #[test]
    fn test_registration_requires_secret_and_target() {
        assert_eq!(
            SenderRegistration::new("a", None, Some("https://x.test".into())).unwrap_err(),
            RegistrationError::MissingSecret
        );
        assert_eq!(
            SenderRegistration::new("a", Some("  ".into()), Some("https://x.test".into()))
                .unwrap_err(),
            RegistrationError::MissingSecret
        );
        assert_eq!(
            SenderRegistration::new("a", Some("s".into()), None).unwrap_err(),
            RegistrationError::MissingTarget
        );
        assert_eq!(
            SenderRegistration::new("a", Some("s".into()), Some("".into())).unwrap_err(),
            RegistrationError::MissingTarget
        );
    }

    #[test]
    fn test_registration_rejects_bad_targets() {
        assert!(matches!(
            SenderRegistration::new("a", Some("s".into()), Some("not a url".into())),
            Err(RegistrationError::InvalidTarget(_))
        ));
        assert_eq!(
            SenderRegistration::new("a", Some("s".into()), Some("ftp://x.test/hook".into()))
                .unwrap_err(),
            RegistrationError::UnsupportedScheme("ftp".to_string())
        );
    }

    #[test]
    fn test_debug_redacts_secret() {
        let rendered = format!("{:?}", sender("alice", "super-secret-value"));
        assert!(rendered.contains("alice"));
        assert!(!rendered.contains("super-secret-value"));
    }

    #[test]
    fn test_match_signature_picks_signing_sender() {
        let registry = SenderRegistry::new(vec![
            sender("alice", "alice-secret"),
            sender("bob", "bob-secret"),
            sender("carol", "carol-secret"),
        ]);
        let body = br#"{"event":"meeting.started"}"#;

        for name in ["alice", "bob", "carol"] {
            let signature =
                compute_signature(&format!("{}-secret", name), "1700000000", body);
            let matched = registry.match_signature("1700000000", body, &signature).unwrap();
            assert_eq!(matched.name, name);
        }
    }

    #[test]
    fn test_match_signature_none() {
        let registry = SenderRegistry::new(vec![sender("alice", "alice-secret")]);
        let body = br#"{"event":"meeting.started"}"#;
        let signature = compute_signature("unknown-secret", "1", body);

        assert!(registry.match_signature("1", body, &signature).is_none());
        assert!(registry.match_signature("1", body, "").is_none());
        assert!(registry.match_signature("1", body, "v0=deadbeef").is_none());
    }

    #[test]
    fn test_match_signature_first_wins_on_shared_secret() {
        let registry = SenderRegistry::new(vec![
            sender("first", "shared"),
            sender("second", "shared"),
        ]);
        let signature = compute_signature("shared", "1", b"{}");

        assert_eq!(registry.match_signature("1", b"{}", &signature).unwrap().name, "first");
    }

    #[test]
    fn test_empty_registry_matches_nothing() {
        let registry = SenderRegistry::new(Vec::new());
        let signature = compute_signature("anything", "1", b"{}");

        assert!(registry.is_empty());
        assert!(registry.match_signature("1", b"{}", &signature).is_none());
    }
}
