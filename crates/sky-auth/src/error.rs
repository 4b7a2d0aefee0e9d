use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("no shared secret for '{username}': pass one explicitly or store it with `sky auth store`")]
    SecretRequired { username: String },

    #[error("keyring error: {0}")]
    KeyringError(String),
}
