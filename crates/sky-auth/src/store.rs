//! Secret storage backends.

use crate::error::AuthError;

/// Somewhere shared secrets can be kept between runs.
pub trait SecretStore {
    /// Look up the secret for `username`. `Ok(None)` means nothing is stored.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::KeyringError` when the backend itself fails.
    fn load(&self, username: &str) -> Result<Option<String>, AuthError>;

    /// # Errors
    ///
    /// Returns `AuthError::KeyringError` when the backend rejects the write.
    fn store(&self, username: &str, secret: &str) -> Result<(), AuthError>;

    /// Remove a stored secret. Removing a missing entry is not an error.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::KeyringError` when the backend itself fails.
    fn delete(&self, username: &str) -> Result<(), AuthError>;
}

/// OS keychain store, one entry per username under a fixed service name.
#[derive(Debug, Clone)]
pub struct KeyringStore {
    service: String,
}

impl KeyringStore {
    #[must_use]
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    #[must_use]
    pub fn service(&self) -> &str {
        &self.service
    }

    fn entry(&self, username: &str) -> Result<keyring::Entry, AuthError> {
        keyring::Entry::new(&self.service, username)
            .map_err(|e| AuthError::KeyringError(e.to_string()))
    }
}

impl SecretStore for KeyringStore {
    fn load(&self, username: &str) -> Result<Option<String>, AuthError> {
        match self.entry(username)?.get_password() {
            Ok(secret) if secret.is_empty() => Ok(None),
            Ok(secret) => Ok(Some(secret)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(AuthError::KeyringError(e.to_string())),
        }
    }

    fn store(&self, username: &str, secret: &str) -> Result<(), AuthError> {
        self.entry(username)?
            .set_password(secret)
            .map_err(|e| AuthError::KeyringError(e.to_string()))
    }

    fn delete(&self, username: &str) -> Result<(), AuthError> {
        match self.entry(username)?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(AuthError::KeyringError(e.to_string())),
        }
    }
}
