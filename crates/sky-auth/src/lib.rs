//! # sky-auth
//!
//! Credentials for the observation-planning service.
//!
//! Unauthenticated queries use the `anonymous`/`anonymous` sentinel. Named
//! accounts need a shared secret, taken from configuration when present and
//! otherwise from an optional [`SecretStore`] (the OS keychain via `keyring`).
//! A failing or absent store is never fatal on its own: resolution degrades to
//! [`AuthError::SecretRequired`] so the caller can ask for the secret.

pub mod credentials;
pub mod error;
pub mod store;

pub use credentials::Credentials;
pub use error::AuthError;
pub use store::{KeyringStore, SecretStore};

use sky_config::ApiConfig;

/// Resolve the credentials to send with requests.
///
/// Priority: anonymous sentinel → configured secret → secret store. A secret
/// given in configuration is remembered in the store for later runs.
///
/// # Errors
///
/// Returns [`AuthError::SecretRequired`] when a named account has no secret
/// in configuration and none can be loaded from the store.
pub fn resolve(
    config: &ApiConfig,
    store: Option<&dyn SecretStore>,
) -> Result<Credentials, AuthError> {
    if config.is_anonymous() {
        return Ok(Credentials::anonymous());
    }
    let username = config.username.as_str();

    if config.has_secret() {
        if let Some(store) = store {
            if let Err(error) = store.store(username, &config.shared_secret) {
                tracing::warn!(%error, username, "could not remember shared secret");
            }
        }
        return Ok(Credentials::new(username, config.shared_secret.as_str()));
    }

    let stored = match store.map(|store| store.load(username)) {
        Some(Ok(secret)) => secret,
        Some(Err(error)) => {
            tracing::warn!(%error, username, "secret store unavailable");
            None
        }
        None => None,
    };

    stored
        .map(|secret| Credentials::new(username, secret))
        .ok_or_else(|| AuthError::SecretRequired {
            username: username.to_string(),
        })
}
