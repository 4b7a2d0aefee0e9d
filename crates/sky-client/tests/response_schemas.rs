//! Response bodies checked against the JSON Schemas generated from the
//! response types, and serialized entities checked against their own.

mod common;

use schemars::schema_for;
use sky_client::entities::clock::ClockResponse;
use sky_client::entities::data::DataResponse;
use sky_client::entities::observations::ObservationResponse;
use sky_client::entities::plans::PlanResponse;
use sky_client::entities::resolve::ResolveResponse;
use sky_client::entities::saa::SaaResponse;
use sky_client::entities::visibility::VisibilityResponse;
use sky_client::entities::SaaPassage;
use sky_core::{Status, TimeValue};

use common::{CLOCK_BODY, SAA_BODY, at};

fn validate_against_schema(
    schema: &serde_json::Value,
    instance: &serde_json::Value,
) -> Vec<String> {
    let validator = jsonschema::validator_for(schema).expect("schema should be valid");
    validator
        .iter_errors(instance)
        .map(|e| format!("{e}"))
        .collect()
}

macro_rules! body_matches_schema {
    ($name:ident, $ty:ty, $body:expr) => {
        #[test]
        fn $name() {
            let schema = serde_json::to_value(schema_for!($ty)).unwrap();
            let instance: serde_json::Value = serde_json::from_str($body).unwrap();
            let errors = validate_against_schema(&schema, &instance);
            assert!(
                errors.is_empty(),
                "schema validation failed for {}: {:?}",
                stringify!($ty),
                errors
            );
            let _: $ty = serde_json::from_value(instance).unwrap();
        }
    };
}

body_matches_schema!(saa_body, SaaResponse, SAA_BODY);
body_matches_schema!(clock_body, ClockResponse, CLOCK_BODY);

body_matches_schema!(
    visibility_body,
    VisibilityResponse,
    r#"{"windows": [{"begin": "2024-01-01T01:00:00", "end": "2024-01-01T01:40:00"}]}"#
);

body_matches_schema!(
    resolve_body,
    ResolveResponse,
    r#"{"name": "M31", "ra": 10.6847, "dec": 41.269, "resolver": "Simbad",
        "status": {"status": "Accepted", "errors": [], "warnings": []}}"#
);

body_matches_schema!(
    observation_body,
    ObservationResponse,
    r#"{
        "entries": [
            {"begin": "2024-01-01T03:00:00", "settle": "2024-01-01T03:04:10", "end": "2024-01-01T03:30:00",
             "ra": 83.63, "dec": 22.01, "roll": 251.2, "targname": "Crab", "targetid": 12345,
             "seg": 1, "obsnum": 12345001, "obstype": "AT", "bat": 0, "xrt": 7, "uvot": 12325,
             "fom": 100, "sunha": -3.5, "ra_point": 83.62, "dec_point": 22.02, "comment": ""}
        ],
        "afstmax": "2024-01-01T04:00:00"
    }"#
);

body_matches_schema!(
    plan_body,
    PlanResponse,
    r#"{
        "entries": [
            {"begin": "2024-01-02T00:00:00", "end": "2024-01-02T00:25:00", "targname": "Crab",
             "ra": 83.63, "dec": 22.01, "roll": 250.0, "targetid": 12345, "seg": 2,
             "obsnum": 12345002, "bat": 0, "xrt": 7, "uvot": 12325, "fom": 120.5,
             "comment": "", "timetarg": 1, "takodb": "tako"}
        ],
        "ppstmax": "2024-01-05T00:00:00"
    }"#
);

body_matches_schema!(
    data_body,
    DataResponse,
    r#"{
        "obsid": "00012345001",
        "entries": [
            {"filename": "sw00012345001sao.fits.gz", "path": "00012345001/auxil",
             "url": "https://example.org/c", "quicklook": false, "type": "Attitude"}
        ]
    }"#
);

#[test]
fn wrong_shape_fails_the_schema() {
    let schema = serde_json::to_value(schema_for!(SaaResponse)).unwrap();
    let instance = serde_json::json!({"entries": "none"});
    assert!(!validate_against_schema(&schema, &instance).is_empty());
    assert!(serde_json::from_value::<SaaResponse>(instance).is_err());
}

#[test]
fn resolved_time_values_match_their_schema() {
    let passage = SaaPassage {
        begin: TimeValue::spacecraft(at(1, 3, 0, 0)).with_offset(-25.0),
        end: TimeValue::spacecraft(at(1, 3, 15, 0)),
    };
    let schema = serde_json::to_value(schema_for!(SaaPassage)).unwrap();
    let instance = serde_json::to_value(&passage).unwrap();
    let errors = validate_against_schema(&schema, &instance);
    assert!(errors.is_empty(), "{errors:?}");

    let recovered: SaaPassage = serde_json::from_value(instance).unwrap();
    assert_eq!(recovered.begin.universal_time(), Some(at(1, 2, 59, 35)));
}

#[test]
fn status_schema_accepts_server_status() {
    let schema = serde_json::to_value(schema_for!(Status)).unwrap();
    let instance = serde_json::json!({
        "status": "Queued",
        "jobnumber": 42,
        "errors": [],
        "warnings": ["Queued behind 3 jobs."]
    });
    assert!(validate_against_schema(&schema, &instance).is_empty());
}
