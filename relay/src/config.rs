//! Configuration module for environment variable parsing.
//!
//! Everything is read once at startup. Senders come from two places:
//! - `ZOOM_WEBHOOK_SECRET_TOKEN` / `ZAPIER_HOOK_URL`: the single default sender
//! - `SENDERS=alice,bob` plus `ZOOM_SECRET_<NAME>` / `ZAPIER_URL_<NAME>` per name

use std::env;
use tracing::warn;

use crate::registry::SenderRegistration;

/// Name given to the sender configured through the unsuffixed variables.
pub const DEFAULT_SENDER: &str = "default";

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Port for the web server to listen on
    pub port: u16,

    /// Upper bound for one outbound forward call, in milliseconds
    pub forward_timeout_ms: u64,

    /// Active senders in configuration order
    pub senders: Vec<SenderRegistration>,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Config {
            port: lookup("PORT")
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(10000),

            forward_timeout_ms: lookup("FORWARD_TIMEOUT_MS")
                .and_then(|v| v.trim().parse().ok())
                .filter(|ms| *ms > 0)
                .unwrap_or(10_000),

            senders: load_senders(&lookup),
        }
    }
}

/// Collect active senders, logging every configured one that was left out.
fn load_senders<F>(lookup: &F) -> Vec<SenderRegistration>
where
    F: Fn(&str) -> Option<String>,
{
    let mut candidates = vec![(
        DEFAULT_SENDER.to_string(),
        lookup("ZOOM_WEBHOOK_SECRET_TOKEN"),
        lookup("ZAPIER_HOOK_URL"),
    )];

    for name in parse_csv(lookup("SENDERS")) {
        let key = env_key(&name);
        let secret = lookup(&format!("ZOOM_SECRET_{}", key));
        let target = lookup(&format!("ZAPIER_URL_{}", key));
        candidates.push((name, secret, target));
    }

    let mut senders: Vec<SenderRegistration> = Vec::new();

    for (name, secret, target) in candidates {
        // The default sender is optional; only complain when half-configured.
        if name == DEFAULT_SENDER && secret.is_none() && target.is_none() {
            continue;
        }

        if senders.iter().any(|s| s.name == name) {
            warn!(sender = %name, "sender_duplicate_name");
            continue;
        }

        match SenderRegistration::new(name.clone(), secret, target) {
            Ok(sender) => senders.push(sender),
            Err(e) => warn!(sender = %name, reason = %e, "sender_excluded"),
        }
    }

    senders
}

/// Environment variable suffix for a sender name: `east-coast` → `EAST_COAST`.
fn env_key(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect()
}

/// Parse a comma-separated list of strings.
fn parse_csv(raw: Option<String>) -> Vec<String> {
    raw.map(|raw| {
        raw.split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    })
    .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    fn names(config: &Config) -> Vec<&str> {
        config.senders.iter().map(|s| s.name.as_str()).collect()
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]);
        assert_eq!(config.port, 10000);
        assert_eq!(config.forward_timeout_ms, 10_000);
        assert!(config.senders.is_empty());
    }

    #[test]
    fn test_invalid_numbers_fall_back() {
        let config = config_from(&[("PORT", "http"), ("FORWARD_TIMEOUT_MS", "0")]);
        assert_eq!(config.port, 10000);
        assert_eq!(config.forward_timeout_ms, 10_000);

        let config = config_from(&[("PORT", "8080"), ("FORWARD_TIMEOUT_MS", "2500")]);
        assert_eq!(config.port, 8080);
        assert_eq!(config.forward_timeout_ms, 2500);
    }

    #[test]
    fn test_default_sender() {
        let config = config_from(&[
            ("ZOOM_WEBHOOK_SECRET_TOKEN", "zoom-secret"),
            ("ZAPIER_HOOK_URL", "https://hooks.zapier.com/hooks/catch/1/abc/"),
        ]);
        assert_eq!(names(&config), vec![DEFAULT_SENDER]);
        assert_eq!(config.senders[0].secret(), "zoom-secret");
    }

    #[test]
    fn test_named_senders_keep_order() {
        let config = config_from(&[
            ("ZOOM_WEBHOOK_SECRET_TOKEN", "zoom-secret"),
            ("ZAPIER_HOOK_URL", "https://hooks.zapier.com/hooks/catch/1/abc/"),
            ("SENDERS", "bob, east-coast ,alice"),
            ("ZOOM_SECRET_BOB", "bob-secret"),
            ("ZAPIER_URL_BOB", "https://hooks.zapier.com/hooks/catch/1/bob/"),
            ("ZOOM_SECRET_EAST_COAST", "east-secret"),
            ("ZAPIER_URL_EAST_COAST", "https://hooks.zapier.com/hooks/catch/1/east/"),
            ("ZOOM_SECRET_ALICE", "alice-secret"),
            ("ZAPIER_URL_ALICE", "https://hooks.zapier.com/hooks/catch/1/alice/"),
        ]);
        assert_eq!(names(&config), vec!["default", "bob", "east-coast", "alice"]);
    }

    #[test]
    fn test_incomplete_senders_excluded() {
        let config = config_from(&[
            ("ZOOM_WEBHOOK_SECRET_TOKEN", "zoom-secret"),
            ("SENDERS", "alice,bob,carol"),
            ("ZOOM_SECRET_ALICE", "alice-secret"),
            ("ZAPIER_URL_BOB", "https://hooks.zapier.com/hooks/catch/1/bob/"),
            ("ZOOM_SECRET_CAROL", "carol-secret"),
            ("ZAPIER_URL_CAROL", "https://hooks.zapier.com/hooks/catch/1/carol/"),
        ]);
        assert_eq!(names(&config), vec!["carol"]);
    }

    #[test]
    fn test_duplicate_names_keep_first() {
        let config = config_from(&[
            ("SENDERS", "alice,alice"),
            ("ZOOM_SECRET_ALICE", "alice-secret"),
            ("ZAPIER_URL_ALICE", "https://hooks.zapier.com/hooks/catch/1/alice/"),
        ]);
        assert_eq!(names(&config), vec!["alice"]);
    }

    #[test]
    fn test_env_key() {
        assert_eq!(env_key("alice"), "ALICE");
        assert_eq!(env_key("east-coast.2"), "EAST_COAST_2");
    }

    #[test]
    fn test_parse_csv() {
        assert_eq!(
            parse_csv(Some("foo, bar,, baz".to_string())),
            vec!["foo".to_string(), "bar".to_string(), "baz".to_string()]
        );
        assert!(parse_csv(None).is_empty());
    }
}
