//! Fetch lifecycle against a stub transport: validation, transport and
//! parse failures, server status, target resolution and clock correction.

mod common;

use pretty_assertions::assert_eq;
use sky_client::entities::{ObservationQuery, Resolve, SaaQuery, VisibilityQuery};
use sky_client::{ClientError, FetchOutcome, HttpResponse, Resolver};
use sky_core::{Coordinates, RequestState, TimeRange};

use common::{CLOCK_BODY, DownTransport, SAA_BODY, StubTransport, at, client, param};

// ---------------------------------------------------------------------------
// Happy path
// ---------------------------------------------------------------------------

#[test]
fn saa_day_is_fetched_and_corrected_to_universal_time() {
    let stub = StubTransport::new()
        .route("/swift/saa", HttpResponse::ok(SAA_BODY))
        .route("/swift/clock", HttpResponse::ok(CLOCK_BODY));
    let calls = stub.calls();
    let client = client(stub);

    let mut saa = SaaQuery::new(at(1, 0, 0, 0));
    let outcome = client.fetch(&mut saa).unwrap();

    assert_eq!(outcome, FetchOutcome::Populated);
    assert_eq!(saa.status.state, RequestState::Accepted);
    assert!(saa.status.errors.is_empty());
    assert_eq!(saa.entries.len(), 1);

    let passage = &saa.entries[0];
    assert!(passage.begin.is_universal());
    assert_eq!(passage.begin.universal_time(), Some(at(1, 2, 59, 35)));
    assert_eq!(passage.begin.spacecraft_time(), Some(at(1, 3, 0, 0)));
    assert_eq!(passage.end.universal_time(), Some(at(1, 3, 14, 35)));

    let calls = calls.lock().unwrap();
    assert_eq!(calls.len(), 2);
    assert!(calls[0].url.ends_with("/swift/saa"));
    assert_eq!(param(&calls[0], "begin"), vec!["2024-01-01T00:00:00"]);
    assert_eq!(param(&calls[0], "end"), vec!["2024-01-02T00:00:00"]);
    assert!(calls[1].url.ends_with("/swift/clock"));
    assert_eq!(
        param(&calls[1], "swifttime"),
        vec!["2024-01-01T03:00:00", "2024-01-01T03:15:00"]
    );
}

#[test]
fn correction_disabled_leaves_spacecraft_times() {
    let stub = StubTransport::new().route("/swift/saa", HttpResponse::ok(SAA_BODY));
    let calls = stub.calls();
    let client = sky_client::Client::builder(sky_config::ApiConfig::default())
        .transport(stub)
        .clock_correct(false)
        .build()
        .unwrap();

    let mut saa = SaaQuery::new(at(1, 0, 0, 0));
    client.fetch_accepted(&mut saa).unwrap();

    let begin = &saa.entries[0].begin;
    assert!(!begin.is_universal());
    assert_eq!(begin.universal_time(), None);
    assert_eq!(calls.lock().unwrap().len(), 1);
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

#[test]
fn half_coordinate_pair_is_rejected_without_a_request() {
    let stub = StubTransport::new();
    let calls = stub.calls();
    let client = client(stub);

    let mut query = ObservationQuery::default();
    query.ra = Some(10.0);
    let outcome = client.fetch(&mut query).unwrap();

    assert_eq!(outcome, FetchOutcome::Rejected);
    assert!(query.status == RequestState::Rejected);
    assert_eq!(
        query.status.errors,
        vec!["Both RA and Dec must be provided or neither.".to_string()]
    );
    assert!(calls.lock().unwrap().is_empty());
}

#[test]
fn fetch_accepted_turns_rejection_into_an_error() {
    let client = client(StubTransport::new());
    let mut saa = SaaQuery::default();

    let error = client.fetch_accepted(&mut saa).unwrap_err();
    match error {
        ClientError::Rejected { entity, errors } => {
            assert_eq!(entity, "SAA");
            assert_eq!(errors, vec!["Begin time must be provided.".to_string()]);
        }
        other => panic!("expected a rejection, got {other:?}"),
    }
}

#[test]
fn unrepresentable_length_is_rejected_without_a_request() {
    let stub = StubTransport::new();
    let calls = stub.calls();
    let client = client(stub);

    let mut saa = SaaQuery::with_range(TimeRange::starting(at(1, 0, 0, 0)).with_length_days(1e12));
    assert_eq!(client.fetch(&mut saa).unwrap(), FetchOutcome::Rejected);
    assert_eq!(saa.status.errors.len(), 1);
    assert!(saa.status.errors[0].contains("out of range"), "{:?}", saa.status.errors);
    assert!(calls.lock().unwrap().is_empty());
}

// ---------------------------------------------------------------------------
// Transport and response failures
// ---------------------------------------------------------------------------

#[test]
fn non_success_response_records_http_code() {
    let stub = StubTransport::new().route(
        "/swift/saa",
        HttpResponse {
            status: 503,
            body: "maintenance".to_string(),
        },
    );
    let client = client(stub);

    let mut saa = SaaQuery::new(at(1, 0, 0, 0));
    assert_eq!(client.fetch(&mut saa).unwrap(), FetchOutcome::Rejected);
    assert_eq!(saa.status.http_code, Some(503));
    assert_eq!(saa.status.errors, vec!["API error (503): maintenance".to_string()]);
    assert!(saa.entries.is_empty());
}

#[test]
fn malformed_body_is_a_validation_rejection() {
    let stub = StubTransport::new().route("/swift/saa", HttpResponse::ok("<html>oops</html>"));
    let client = client(stub);

    let mut saa = SaaQuery::new(at(1, 0, 0, 0));
    assert_eq!(client.fetch(&mut saa).unwrap(), FetchOutcome::Rejected);
    assert_eq!(saa.status.errors.len(), 1);
    assert!(
        saa.status.errors[0].starts_with("Error validating response:"),
        "{:?}",
        saa.status.errors
    );
}

#[test]
fn unrepresentable_met_in_body_is_a_validation_rejection() {
    let body = r#"{"entries": [
        {"begin": {"met": 1e15, "utcf": 0.0, "isutc": false}, "end": "2024-01-01T00:00:00"}
    ]}"#;
    let stub = StubTransport::new().route("/swift/saa", HttpResponse::ok(body));
    let calls = stub.calls();
    let client = client(stub);

    let mut saa = SaaQuery::new(at(1, 0, 0, 0));
    assert_eq!(client.fetch(&mut saa).unwrap(), FetchOutcome::Rejected);
    assert!(
        saa.status.errors[0].starts_with("Error validating response:"),
        "{:?}",
        saa.status.errors
    );
    assert!(saa.entries.is_empty());
    assert_eq!(calls.lock().unwrap().len(), 1);
}

#[test]
fn unreachable_service_rejects() {
    let client = client(DownTransport);

    let mut saa = SaaQuery::new(at(1, 0, 0, 0));
    assert_eq!(client.fetch(&mut saa).unwrap(), FetchOutcome::Rejected);
    assert!(saa.status.errors[0].contains("connection refused"));
}

#[test]
fn server_rejection_skips_correction() {
    let body = r#"{
        "entries": [],
        "status": {"status": "Rejected", "errors": ["Begin time is too far in the future."]}
    }"#;
    let stub = StubTransport::new()
        .route("/swift/saa", HttpResponse::ok(body))
        .route("/swift/clock", HttpResponse::ok(CLOCK_BODY));
    let calls = stub.calls();
    let client = client(stub);

    let mut saa = SaaQuery::new(at(1, 0, 0, 0));
    assert_eq!(client.fetch(&mut saa).unwrap(), FetchOutcome::Rejected);
    assert_eq!(
        saa.status.errors,
        vec!["Begin time is too far in the future.".to_string()]
    );
    assert_eq!(calls.lock().unwrap().len(), 1);
}

#[test]
fn server_warnings_are_kept_on_success() {
    let body = r#"{
        "entries": [],
        "status": {"status": "Accepted", "warnings": ["Data after 2024-01-01 is preliminary."]}
    }"#;
    let client = client(StubTransport::new().route("/swift/saa", HttpResponse::ok(body)));

    let mut saa = SaaQuery::new(at(1, 0, 0, 0));
    assert_eq!(client.fetch(&mut saa).unwrap(), FetchOutcome::Populated);
    assert_eq!(
        saa.status.warnings,
        vec!["Data after 2024-01-01 is preliminary.".to_string()]
    );
}

// ---------------------------------------------------------------------------
// Target resolution
// ---------------------------------------------------------------------------

const VISIBILITY_BODY: &str = r#"{
    "windows": [
        {"begin": "2024-01-01T01:00:00", "end": "2024-01-01T01:40:00"}
    ]
}"#;

#[test]
fn named_target_is_resolved_through_the_service() {
    let stub = StubTransport::new()
        .route(
            "/resolve",
            HttpResponse::ok(r#"{"ra": 83.63, "dec": 22.01, "resolver": "Simbad"}"#),
        )
        .route("/swift/visquery", HttpResponse::ok(VISIBILITY_BODY));
    let calls = stub.calls();
    let client = sky_client::Client::builder(sky_config::ApiConfig::default())
        .transport(stub)
        .clock_correct(false)
        .build()
        .unwrap();

    let mut query =
        VisibilityQuery::named("Crab", TimeRange::between(at(1, 0, 0, 0), at(2, 0, 0, 0)));
    assert_eq!(client.fetch(&mut query).unwrap(), FetchOutcome::Populated);
    assert_eq!(query.ra, Some(83.63));
    assert_eq!(query.dec, Some(22.01));
    assert_eq!(query.windows.len(), 1);

    let calls = calls.lock().unwrap();
    assert_eq!(calls.len(), 2);
    assert_eq!(param(&calls[0], "name"), vec!["Crab"]);
    assert_eq!(param(&calls[1], "ra"), vec!["83.63"]);
}

#[test]
fn unresolvable_name_rejects_before_the_main_request() {
    let stub = StubTransport::new().route(
        "/resolve",
        HttpResponse::ok(r#"{"status": {"status": "Rejected", "errors": ["Could not resolve name."]}}"#),
    );
    let calls = stub.calls();
    let client = client(stub);

    let mut query =
        VisibilityQuery::named("Nowhere", TimeRange::between(at(1, 0, 0, 0), at(2, 0, 0, 0)));
    assert_eq!(client.fetch(&mut query).unwrap(), FetchOutcome::Rejected);
    assert_eq!(query.status.errors.len(), 1);
    assert!(query.status.errors[0].contains("Could not resolve name."));
    assert_eq!(calls.lock().unwrap().len(), 1);
}

struct Catalog;

impl Resolver for Catalog {
    fn resolve(&self, name: &str) -> Result<Coordinates, ClientError> {
        match name {
            "Vela" => Ok(Coordinates { ra: 128.84, dec: -45.18 }),
            _ => Err(ClientError::Resolve {
                name: name.to_string(),
                reason: "not in catalog".to_string(),
            }),
        }
    }
}

#[test]
fn custom_resolver_replaces_the_service_lookup() {
    let stub = StubTransport::new().route(
        "/swift/obsquery",
        HttpResponse::ok(r#"{"entries": []}"#),
    );
    let calls = stub.calls();
    let client = sky_client::Client::builder(sky_config::ApiConfig::default())
        .transport(stub)
        .resolver(Catalog)
        .build()
        .unwrap();

    let mut query = ObservationQuery::named("Vela");
    assert_eq!(client.fetch(&mut query).unwrap(), FetchOutcome::Populated);
    assert_eq!(query.ra, Some(128.84));

    let calls = calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    assert!(calls[0].url.ends_with("/swift/obsquery"));
}

#[test]
fn client_resolves_names_directly() {
    let client = client(StubTransport::new().route(
        "/resolve",
        HttpResponse::ok(r#"{"ra": 10.6847, "dec": 41.269}"#),
    ));
    let coordinates = Resolver::resolve(&client, "M31").unwrap();
    assert_eq!(coordinates, Coordinates { ra: 10.6847, dec: 41.269 });

    let mut resolve = Resolve::new("M31");
    client.fetch_accepted(&mut resolve).unwrap();
    assert_eq!(resolve.coordinates(), Some(coordinates));
}
