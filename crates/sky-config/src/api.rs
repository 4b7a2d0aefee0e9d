//! Remote service connection settings.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Username that marks anonymous access.
pub const ANONYMOUS: &str = "anonymous";

fn default_base_url() -> String {
    "https://www.swift.psu.edu/api/v1.2".to_string()
}

const fn default_timeout_secs() -> u64 {
    120
}

fn default_username() -> String {
    ANONYMOUS.to_string()
}

fn default_keyring_service() -> String {
    "skyplan".to_string()
}

const fn default_clock_correct() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
    /// Base URL every endpoint path is appended to.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Account name; `anonymous` needs no secret.
    #[serde(default = "default_username")]
    pub username: String,

    /// Shared secret for the account. Empty means "look it up in the OS
    /// secret store".
    #[serde(default)]
    pub shared_secret: String,

    /// Service name under which secrets are stored in the OS keychain.
    #[serde(default = "default_keyring_service")]
    pub keyring_service: String,

    /// Whether fetched times are clock corrected automatically.
    #[serde(default = "default_clock_correct")]
    pub clock_correct: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            username: default_username(),
            shared_secret: String::new(),
            keyring_service: default_keyring_service(),
            clock_correct: default_clock_correct(),
        }
    }
}

impl ApiConfig {
    pub fn is_anonymous(&self) -> bool {
        self.username == ANONYMOUS
    }

    pub fn has_secret(&self) -> bool {
        !self.shared_secret.is_empty()
    }

    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Full URL of an endpoint path such as `/swift/saa`.
    pub fn endpoint_url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults_are_anonymous_with_correction() {
        let config = ApiConfig::default();
        assert!(config.is_anonymous());
        assert!(!config.has_secret());
        assert!(config.clock_correct);
        assert_eq!(config.timeout(), Duration::from_secs(120));
    }

    #[test]
    fn endpoint_url_joins_with_one_slash() {
        let mut config = ApiConfig::default();
        config.base_url = "http://localhost:8000/api/".to_string();
        assert_eq!(
            config.endpoint_url("/swift/saa"),
            "http://localhost:8000/api/swift/saa"
        );
        assert_eq!(config.endpoint_url("resolve"), "http://localhost:8000/api/resolve");
    }
}
