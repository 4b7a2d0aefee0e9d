//! Client error types.

use thiserror::Error;

/// Errors raised by the client itself.
///
/// Problems with a particular request (validation, non-200 answers, malformed
/// bodies, service-side rejection) are recorded on the entity's status
/// instead; these variants surface through transports, collaborators and
/// invariant failures.
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with a non-success status code.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code returned by the service.
        status: u16,
        /// Response body or reason.
        message: String,
    },

    /// A response body did not match the expected schema.
    #[error("parse error: {0}")]
    Parse(String),

    /// An entity's request parameters could not be projected onto a query
    /// string.
    #[error("query error: {0}")]
    Query(String),

    /// A request was rejected by validation or by the service.
    #[error("{entity} rejected: {}", errors.join(" "))]
    Rejected { entity: String, errors: Vec<String> },

    /// A target name could not be turned into coordinates.
    #[error("could not resolve '{name}': {reason}")]
    Resolve { name: String, reason: String },

    /// Filesystem error while writing downloads.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Auth(#[from] sky_auth::AuthError),

    #[error(transparent)]
    Config(#[from] sky_config::ConfigError),

    #[error(transparent)]
    Core(#[from] sky_core::CoreError),
}
