//! Request status and its error/warning channel.
//!
//! Every entity owns one [`Status`]. Validation and fetch problems are
//! recorded here instead of being raised, so the common path is checking
//! `status.is_accepted()` after a fetch.

use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Processing state of a request.
///
/// ```text
/// pending → accepted
///         → rejected
///         → queued → processing → accepted
///                               → rejected
/// ```
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema,
)]
pub enum RequestState {
    #[default]
    Pending,
    Accepted,
    Rejected,
    Queued,
    Processing,
}

impl RequestState {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Accepted => "Accepted",
            Self::Rejected => "Rejected",
            Self::Queued => "Queued",
            Self::Processing => "Processing",
        }
    }
}

impl fmt::Display for RequestState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status of one entity's request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Status {
    #[serde(rename = "status", default)]
    pub state: RequestState,
    /// Identifier assigned by the service to a submitted request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub too_id: Option<u64>,
    /// Job number for queued requests.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jobnumber: Option<u64>,
    #[serde(default)]
    pub errors: Vec<String>,
    #[serde(default)]
    pub warnings: Vec<String>,
    /// HTTP code of the last non-200 response, if any.
    #[serde(skip)]
    pub http_code: Option<u16>,
}

impl Status {
    /// Record an error message once.
    pub fn error(&mut self, message: impl Into<String>) {
        push_unique(&mut self.errors, message.into());
    }

    /// Record a warning message once.
    pub fn warning(&mut self, message: impl Into<String>) {
        push_unique(&mut self.warnings, message.into());
    }

    /// Record an error and mark the request rejected.
    pub fn reject(&mut self, message: impl Into<String>) {
        self.error(message);
        self.state = RequestState::Rejected;
    }

    /// Reset to a fresh pending status.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Fold in the status the service returned with a response.
    ///
    /// Without a server status a successful response means accepted.
    pub fn absorb(&mut self, server: Option<Self>) {
        let Some(server) = server else {
            self.state = RequestState::Accepted;
            return;
        };
        self.state = match server.state {
            RequestState::Pending => RequestState::Accepted,
            state => state,
        };
        self.too_id = server.too_id.or(self.too_id);
        self.jobnumber = server.jobnumber.or(self.jobnumber);
        for error in server.errors {
            self.error(error);
        }
        for warning in server.warnings {
            self.warning(warning);
        }
    }

    #[must_use]
    pub fn is_accepted(&self) -> bool {
        self.state == RequestState::Accepted
    }

    #[must_use]
    pub fn is_rejected(&self) -> bool {
        self.state == RequestState::Rejected
    }

    /// False while the service is still working on a queued request.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        !matches!(
            self.state,
            RequestState::Queued | RequestState::Processing
        )
    }
}

impl PartialEq<RequestState> for Status {
    fn eq(&self, other: &RequestState) -> bool {
        self.state == *other
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_rejected() && !self.errors.is_empty() {
            write!(
                f,
                "Rejected with the following error(s): {}",
                self.errors.join(" ")
            )
        } else {
            f.write_str(self.state.as_str())
        }
    }
}

fn push_unique(messages: &mut Vec<String>, message: String) {
    if !messages.contains(&message) {
        messages.push(message);
    }
}
