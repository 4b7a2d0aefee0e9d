//! `/swift/clock`: the clock-correction service.
//!
//! Given MET values, spacecraft times or universal times, the service answers
//! with one `{met, utcf, isutc}` entry per input, in input order. Each entry
//! becomes a fully resolved [`TimeValue`].

use chrono::NaiveDateTime;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use sky_core::{CoreError, CorrectionBatch, Status, TimeBasis, TimeValue};

use crate::entity::{Entity, Fetchable, Validatable};

/// Request for clock corrections.
///
/// Not clock correctable itself: its entries are the correction output and
/// are never walked.
#[derive(Debug, Clone, Serialize)]
pub struct Clock {
    pub met: Vec<f64>,
    pub swifttime: Vec<NaiveDateTime>,
    pub utctime: Vec<NaiveDateTime>,
    pub entries: Vec<TimeValue>,
    pub status: Status,
}

#[derive(Debug, Serialize)]
pub struct ClockParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub met: Option<Vec<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub swifttime: Option<Vec<NaiveDateTime>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub utctime: Option<Vec<NaiveDateTime>>,
}

/// One corrected time as the service reports it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ClockEntry {
    pub met: f64,
    pub utcf: f64,
    pub isutc: bool,
}

impl ClockEntry {
    /// # Errors
    ///
    /// Returns [`CoreError::OutOfRange`] when the entry does not map to a
    /// calendar time.
    pub fn to_time_value(self) -> Result<TimeValue, CoreError> {
        TimeValue::try_from_met(self.met, Some(self.utcf), TimeBasis::from_universal(self.isutc))
    }
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ClockResponse {
    #[serde(default)]
    pub entries: Vec<ClockEntry>,
    #[serde(default)]
    pub status: Option<Status>,
}

impl Clock {
    fn empty() -> Self {
        Self {
            met: Vec::new(),
            swifttime: Vec::new(),
            utctime: Vec::new(),
            entries: Vec::new(),
            status: Status::default(),
        }
    }

    #[must_use]
    pub fn from_met(met: Vec<f64>) -> Self {
        Self { met, ..Self::empty() }
    }

    #[must_use]
    pub fn from_spacecraft(times: Vec<NaiveDateTime>) -> Self {
        Self {
            swifttime: times,
            ..Self::empty()
        }
    }

    #[must_use]
    pub fn from_universal(times: Vec<NaiveDateTime>) -> Self {
        Self {
            utctime: times,
            ..Self::empty()
        }
    }

    #[must_use]
    pub fn from_batch(batch: CorrectionBatch) -> Self {
        match batch {
            CorrectionBatch::Met(met) => Self::from_met(met),
            CorrectionBatch::Spacecraft(times) => Self::from_spacecraft(times),
            CorrectionBatch::Universal(times) => Self::from_universal(times),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn into_entries(self) -> Vec<TimeValue> {
        self.entries
    }

    /// Present every entry in universal time.
    pub fn to_universal_time(&mut self) {
        self.rebase(TimeBasis::Universal);
    }

    /// Present every entry in spacecraft time.
    pub fn to_spacecraft_time(&mut self) {
        self.rebase(TimeBasis::Spacecraft);
    }

    fn rebase(&mut self, basis: TimeBasis) {
        for entry in &mut self.entries {
            *entry = entry.rebased(basis);
        }
    }

    fn input_count(&self) -> usize {
        [
            self.met.is_empty(),
            self.swifttime.is_empty(),
            self.utctime.is_empty(),
        ]
        .iter()
        .filter(|empty| !**empty)
        .count()
    }
}

impl Fetchable for Clock {
    const NAME: &'static str = "Clock";
    const ENDPOINT: &'static str = "/swift/clock";

    type Query = ClockParams;
    type Response = ClockResponse;

    fn status(&self) -> &Status {
        &self.status
    }

    fn status_mut(&mut self) -> &mut Status {
        &mut self.status
    }

    fn query(&self) -> ClockParams {
        ClockParams {
            met: non_empty(&self.met),
            swifttime: non_empty(&self.swifttime),
            utctime: non_empty(&self.utctime),
        }
    }

    fn populate(&mut self, response: ClockResponse) -> Option<Status> {
        match response
            .entries
            .into_iter()
            .map(ClockEntry::to_time_value)
            .collect::<Result<Vec<_>, _>>()
        {
            Ok(entries) => {
                self.entries = entries;
                response.status
            }
            Err(error) => {
                self.entries.clear();
                let mut status = response.status.unwrap_or_default();
                status.reject(format!("Error validating response: {error}"));
                Some(status)
            }
        }
    }
}

impl Validatable for Clock {
    fn validate(&mut self) -> Vec<String> {
        if self.input_count() == 1 {
            Vec::new()
        } else {
            vec!["Exactly one of 'met', 'swifttime' or 'utctime' must be provided.".to_string()]
        }
    }
}

impl Entity for Clock {}

fn non_empty<T: Clone>(items: &[T]) -> Option<Vec<T>> {
    (!items.is_empty()).then(|| items.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    const FIXTURE: &str = r#"{
        "met": [725846400.0],
        "entries": [{"met": 725846400.0, "utcf": -24.5, "isutc": false}],
        "status": {"status": "Accepted", "errors": [], "warnings": []}
    }"#;

    #[test]
    fn requires_exactly_one_input_list() {
        let mut clock = Clock::from_met(Vec::new());
        assert_eq!(clock.validate().len(), 1);

        let mut both = Clock::from_met(vec![1.0]);
        both.utctime.push(
            NaiveDate::from_ymd_opt(2024, 1, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
        );
        assert_eq!(both.validate().len(), 1);

        assert!(Clock::from_met(vec![1.0]).validate().is_empty());
    }

    #[test]
    fn query_only_carries_the_given_list() {
        let json = serde_json::to_value(Clock::from_met(vec![1.0, 2.0]).query()).unwrap();
        assert_eq!(json, serde_json::json!({"met": [1.0, 2.0]}));
    }

    #[test]
    fn entries_become_resolved_time_values() {
        let mut clock = Clock::from_met(vec![725_846_400.0]);
        let response: ClockResponse = serde_json::from_str(FIXTURE).unwrap();
        let status = clock.populate(response);
        assert!(status.is_some());
        assert_eq!(clock.len(), 1);

        let entry = &clock.entries[0];
        assert_eq!(entry.met(), Some(725_846_400.0));
        assert_eq!(entry.offset(), Some(-24.5));
        assert!(entry.universal_time().is_some());

        clock.to_universal_time();
        assert!(clock.entries[0].is_universal());
        clock.to_spacecraft_time();
        assert!(!clock.entries[0].is_universal());
        assert_eq!(clock.entries[0].met(), Some(725_846_400.0));
    }

    #[test]
    fn unrepresentable_entry_rejects_the_response() {
        let mut clock = Clock::from_met(vec![1e15]);
        let response: ClockResponse = serde_json::from_str(
            r#"{"entries": [{"met": 1e15, "utcf": 0.0, "isutc": false}]}"#,
        )
        .unwrap();
        let status = clock.populate(response).unwrap();
        assert!(status.is_rejected());
        assert!(status.errors[0].starts_with("Error validating response:"));
        assert!(clock.is_empty());
    }
}
