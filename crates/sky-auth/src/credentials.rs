use std::fmt;

use sky_config::ANONYMOUS;

/// Username and shared secret sent as HTTP basic auth with every request.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    username: String,
    secret: String,
}

impl Credentials {
    #[must_use]
    pub fn new(username: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            secret: secret.into(),
        }
    }

    /// The sentinel accepted by the service for unauthenticated queries.
    #[must_use]
    pub fn anonymous() -> Self {
        Self::new(ANONYMOUS, ANONYMOUS)
    }

    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    #[must_use]
    pub fn secret(&self) -> &str {
        &self.secret
    }

    #[must_use]
    pub fn is_anonymous(&self) -> bool {
        self.username == ANONYMOUS
    }
}

impl Default for Credentials {
    fn default() -> Self {
        Self::anonymous()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("secret", &"[redacted]")
            .finish()
    }
}
