//! HTTP transport.
//!
//! The lifecycle driver only needs "GET this URL with these query pairs and
//! credentials". [`Transport`] is that seam; [`HttpTransport`] is the
//! production implementation on reqwest's blocking client, and tests swap in
//! stubs.

use std::time::Duration;

use serde_json::Value;
use sky_auth::Credentials;

use crate::error::ClientError;

/// A GET request ready to send.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub url: String,
    /// Query pairs in order; list parameters appear once per element.
    pub query: Vec<(String, String)>,
    pub credentials: Credentials,
}

/// Status code and raw body of a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    #[must_use]
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: body.into(),
        }
    }

    #[must_use]
    pub const fn is_ok(&self) -> bool {
        self.status == 200
    }
}

/// Sends one request and returns the raw response.
pub trait Transport: Send + Sync {
    /// # Errors
    ///
    /// Returns [`ClientError::Http`] when no response could be obtained.
    /// Non-200 responses are returned, not raised.
    fn get(&self, request: &HttpRequest) -> Result<HttpResponse, ClientError>;
}

/// Blocking reqwest transport with basic auth and a bounded timeout.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: reqwest::blocking::Client,
}

impl HttpTransport {
    /// # Errors
    ///
    /// Returns [`ClientError::Http`] if the underlying client cannot be built
    /// (for example when no TLS backend is available).
    pub fn new(timeout: Duration) -> Result<Self, ClientError> {
        let http = reqwest::blocking::Client::builder()
            .user_agent(concat!("skyplan/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;
        Ok(Self { http })
    }
}

impl Transport for HttpTransport {
    fn get(&self, request: &HttpRequest) -> Result<HttpResponse, ClientError> {
        let response = self
            .http
            .get(&request.url)
            .query(&request.query)
            .basic_auth(
                request.credentials.username(),
                Some(request.credentials.secret()),
            )
            .send()?;
        let status = response.status().as_u16();
        let body = response.text()?;
        Ok(HttpResponse { status, body })
    }
}

/// Flatten a serialized request schema into query pairs.
///
/// Absent (`null`) fields are omitted and arrays become one pair per element,
/// so `{"targetid": [1, 2], "ra": null}` projects to `targetid=1&targetid=2`.
///
/// # Errors
///
/// Returns [`ClientError::Query`] when the value is not an object or holds
/// nested objects, which have no query-string form.
pub fn query_pairs(params: &Value) -> Result<Vec<(String, String)>, ClientError> {
    let Value::Object(fields) = params else {
        return Err(ClientError::Query(format!(
            "request parameters must be an object, got {params}"
        )));
    };

    let mut pairs = Vec::new();
    for (key, value) in fields {
        match value {
            Value::Null => {}
            Value::Array(items) => {
                for item in items {
                    if let Some(text) = scalar(key, item)? {
                        pairs.push((key.clone(), text));
                    }
                }
            }
            other => {
                if let Some(text) = scalar(key, other)? {
                    pairs.push((key.clone(), text));
                }
            }
        }
    }
    Ok(pairs)
}

fn scalar(key: &str, value: &Value) -> Result<Option<String>, ClientError> {
    match value {
        Value::Null => Ok(None),
        Value::String(text) => Ok(Some(text.clone())),
        Value::Bool(flag) => Ok(Some(flag.to_string())),
        Value::Number(number) => Ok(Some(number.to_string())),
        Value::Array(_) | Value::Object(_) => Err(ClientError::Query(format!(
            "parameter '{key}' is nested and cannot be sent as a query string"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn nulls_are_dropped_and_lists_repeated() {
        let mut projected = query_pairs(&json!({
            "begin": "2024-01-01T00:00:00",
            "ra": null,
            "targetid": [10, 20],
            "bat": false
        }))
        .unwrap();
        projected.sort();
        assert_eq!(
            projected,
            pairs(&[
                ("bat", "false"),
                ("begin", "2024-01-01T00:00:00"),
                ("targetid", "10"),
                ("targetid", "20"),
            ])
        );
    }

    #[test]
    fn nested_objects_are_rejected() {
        let err = query_pairs(&json!({"window": {"begin": 1}})).unwrap_err();
        assert!(matches!(err, ClientError::Query(_)));
        assert!(query_pairs(&json!([1, 2])).is_err());
    }

    #[test]
    fn empty_list_contributes_nothing() {
        assert!(query_pairs(&json!({"met": []})).unwrap().is_empty());
    }
}
