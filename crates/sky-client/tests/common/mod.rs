//! Shared stub transport for client integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use chrono::{NaiveDate, NaiveDateTime};
use sky_client::{Client, ClientError, HttpRequest, HttpResponse, Transport};
use sky_config::ApiConfig;

/// Answers requests by endpoint suffix and records every request it sees.
#[derive(Default)]
pub struct StubTransport {
    routes: Vec<(String, HttpResponse)>,
    calls: Arc<Mutex<Vec<HttpRequest>>>,
}

impl StubTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(mut self, endpoint: &str, response: HttpResponse) -> Self {
        self.routes.push((endpoint.to_string(), response));
        self
    }

    /// Handle on the request log that survives moving the stub into a client.
    pub fn calls(&self) -> Arc<Mutex<Vec<HttpRequest>>> {
        Arc::clone(&self.calls)
    }
}

impl Transport for StubTransport {
    fn get(&self, request: &HttpRequest) -> Result<HttpResponse, ClientError> {
        self.calls.lock().unwrap().push(request.clone());
        let response = self
            .routes
            .iter()
            .find(|(endpoint, _)| request.url.ends_with(endpoint.as_str()))
            .map_or_else(
                || HttpResponse {
                    status: 404,
                    body: format!("no route for {}", request.url),
                },
                |(_, response)| response.clone(),
            );
        Ok(response)
    }
}

/// A transport whose every request fails before reaching the service.
pub struct DownTransport;

impl Transport for DownTransport {
    fn get(&self, _request: &HttpRequest) -> Result<HttpResponse, ClientError> {
        Err(ClientError::Parse("connection refused".to_string()))
    }
}

pub fn client(transport: impl Transport + 'static) -> Client {
    Client::builder(ApiConfig::default())
        .transport(transport)
        .build()
        .unwrap()
}

pub fn at(day: u32, hour: u32, minute: u32, second: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, day)
        .unwrap()
        .and_hms_opt(hour, minute, second)
        .unwrap()
}

/// Query values recorded for `key`, in order.
pub fn param<'a>(request: &'a HttpRequest, key: &str) -> Vec<&'a str> {
    request
        .query
        .iter()
        .filter(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
        .collect()
}

pub const SAA_BODY: &str = r#"{
    "entries": [
        {"begin": "2024-01-01T03:00:00", "end": "2024-01-01T03:15:00"}
    ]
}"#;

/// Corrections for the two SAA_BODY times with a UTCF of -25 s.
pub const CLOCK_BODY: &str = r#"{
    "entries": [
        {"met": 725770800.0, "utcf": -25.0, "isutc": false},
        {"met": 725771700.0, "utcf": -25.0, "isutc": false}
    ]
}"#;
