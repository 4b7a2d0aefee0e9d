//! `/swift/planquery`: the pre-planned science timeline.
//!
//! Same constraints as the as-flown timeline, but entries are planned
//! pointings without a settle time and may still change.

use std::collections::BTreeMap;

use chrono::{NaiveDateTime, TimeDelta};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use sky_core::correction::ClockState;
use sky_core::{
    ClockCorrectable, Coordinates, CoreError, Status, TimeRange, TimeValue, time_fields,
};

use super::observations::DEFAULT_RADIUS;
use super::paired;
use crate::entity::{Entity, Fetchable, Resolvable, Validatable};

/// One planned pointing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PlannedPointing {
    pub begin: TimeValue,
    pub end: TimeValue,
    #[serde(default)]
    pub targname: Option<String>,
    #[serde(default)]
    pub ra: Option<f64>,
    #[serde(default)]
    pub dec: Option<f64>,
    #[serde(default)]
    pub roll: Option<f64>,
    #[serde(default)]
    pub targetid: Option<u64>,
    #[serde(default)]
    pub seg: Option<u32>,
    #[serde(default)]
    pub obsnum: Option<u64>,
    #[serde(default)]
    pub bat: Option<i64>,
    #[serde(default)]
    pub xrt: Option<i64>,
    #[serde(default)]
    pub uvot: Option<i64>,
    #[serde(default)]
    pub fom: Option<f64>,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub timetarg: Option<i64>,
    #[serde(default)]
    pub takodb: Option<String>,
}

time_fields!(PlannedPointing { begin, end });

impl PlannedPointing {
    /// Planned time on target, slew included.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::IncompatibleTimeBasis`] for mixed, uncorrected
    /// bases.
    pub fn exposure(&self) -> Result<TimeDelta, CoreError> {
        self.end.since(&self.begin)
    }

    #[must_use]
    pub fn obsid(&self) -> Option<String> {
        self.obsnum.map(|obsnum| format!("{obsnum:011}"))
    }
}

/// Planned timeline around a position, for targets, or for a time range.
#[derive(Debug, Clone, Serialize)]
pub struct PlanQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub ra: Option<f64>,
    pub dec: Option<f64>,
    /// Search radius in degrees.
    pub radius: f64,
    #[serde(flatten)]
    pub range: TimeRange,
    pub targetid: Vec<u64>,
    pub obsnum: Option<u64>,
    pub entries: Vec<PlannedPointing>,
    /// Last time the plan is valid for.
    pub ppstmax: Option<TimeValue>,
    pub status: Status,
    #[serde(skip)]
    clock: ClockState,
}

time_fields!(PlanQuery { entries, ppstmax });

impl Default for PlanQuery {
    fn default() -> Self {
        Self {
            name: None,
            ra: None,
            dec: None,
            radius: DEFAULT_RADIUS,
            range: TimeRange::default(),
            targetid: Vec::new(),
            obsnum: None,
            entries: Vec::new(),
            ppstmax: None,
            status: Status::default(),
            clock: ClockState::default(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PlanParams {
    pub ra: Option<f64>,
    pub dec: Option<f64>,
    pub radius: f64,
    pub begin: Option<NaiveDateTime>,
    pub end: Option<NaiveDateTime>,
    pub targetid: Vec<u64>,
    pub obsnum: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct PlanResponse {
    #[serde(default)]
    pub entries: Vec<PlannedPointing>,
    #[serde(default)]
    pub ppstmax: Option<TimeValue>,
    #[serde(default)]
    pub status: Option<Status>,
}

impl PlanQuery {
    #[must_use]
    pub fn around(coordinates: Coordinates) -> Self {
        Self {
            ra: Some(coordinates.ra),
            dec: Some(coordinates.dec),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn for_targets(targetid: Vec<u64>) -> Self {
        Self {
            targetid,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_range(mut self, range: TimeRange) -> Self {
        self.range = range;
        self
    }

    #[must_use]
    pub const fn with_radius(mut self, radius: f64) -> Self {
        self.radius = radius;
        self
    }

    /// Planned pointings grouped by observation number.
    #[must_use]
    pub fn by_obsnum(&self) -> BTreeMap<u64, Vec<PlannedPointing>> {
        let mut grouped: BTreeMap<u64, Vec<PlannedPointing>> = BTreeMap::new();
        for pointing in &self.entries {
            if let Some(obsnum) = pointing.obsnum {
                grouped.entry(obsnum).or_default().push(pointing.clone());
            }
        }
        grouped
    }
}

impl Fetchable for PlanQuery {
    const NAME: &'static str = "PlanQuery";
    const ENDPOINT: &'static str = "/swift/planquery";

    type Query = PlanParams;
    type Response = PlanResponse;

    fn status(&self) -> &Status {
        &self.status
    }

    fn status_mut(&mut self) -> &mut Status {
        &mut self.status
    }

    fn query(&self) -> PlanParams {
        PlanParams {
            ra: self.ra,
            dec: self.dec,
            radius: self.radius,
            begin: self.range.begin,
            end: self.range.end,
            targetid: self.targetid.clone(),
            obsnum: self.obsnum,
        }
    }

    fn populate(&mut self, response: PlanResponse) -> Option<Status> {
        self.entries = response.entries;
        self.ppstmax = response.ppstmax;
        self.clock.corrected = false;
        response.status
    }
}

impl Validatable for PlanQuery {
    fn validate(&mut self) -> Vec<String> {
        let mut violations = Coordinates::check_pair(self.ra, self.dec);
        if !(self.radius.is_finite() && self.radius > 0.0) {
            violations.push(format!("Radius must be positive, got {}.", self.radius));
        }
        violations.extend(self.range.normalize(false));
        violations
    }
}

impl Resolvable for PlanQuery {
    fn target_name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn coordinates(&self) -> Option<Coordinates> {
        paired(self.ra, self.dec)
    }

    fn set_coordinates(&mut self, coordinates: Coordinates) {
        self.ra = Some(coordinates.ra);
        self.dec = Some(coordinates.dec);
    }
}

impl ClockCorrectable for PlanQuery {
    fn clock_state(&self) -> &ClockState {
        &self.clock
    }

    fn clock_state_mut(&mut self) -> &mut ClockState {
        &mut self.clock
    }
}

impl Entity for PlanQuery {
    fn as_clock_correctable(&mut self) -> Option<&mut dyn ClockCorrectable> {
        Some(self)
    }

    fn as_resolvable(&mut self) -> Option<&mut dyn Resolvable> {
        Some(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const FIXTURE: &str = r#"{
        "entries": [
            {"begin": "2024-01-01T00:00:00", "end": "2024-01-01T00:25:00",
             "targname": "Crab", "ra": 83.63, "dec": 22.01, "obsnum": 3000100002, "fom": 120.5},
            {"begin": "2024-01-01T02:00:00", "end": "2024-01-01T02:10:00",
             "targname": "Crab", "ra": 83.63, "dec": 22.01, "obsnum": 3000100002},
            {"begin": "2024-01-01T04:00:00", "end": "2024-01-01T04:05:00", "targname": "Slot"}
        ],
        "ppstmax": "2024-01-03T00:00:00"
    }"#;

    fn populated() -> PlanQuery {
        let mut query = PlanQuery::default();
        let response: PlanResponse = serde_json::from_str(FIXTURE).unwrap();
        query.populate(response);
        query
    }

    #[test]
    fn pointings_group_by_obsnum() {
        let query = populated();
        let grouped = query.by_obsnum();
        assert_eq!(grouped.len(), 1);
        let crab = &grouped[&3_000_100_002];
        assert_eq!(crab.len(), 2);
        assert_eq!(crab[0].obsid().as_deref(), Some("03000100002"));
        assert_eq!(crab[0].exposure().unwrap(), TimeDelta::minutes(25));
    }

    #[test]
    fn ppstmax_is_walked_after_entries() {
        let query = populated();
        assert_eq!(sky_core::walker::count(&query), 7);
        assert_eq!(PlanQuery::TIME_FIELDS, &["entries", "ppstmax"]);
    }

    #[test]
    fn validation_matches_the_as_flown_query() {
        let mut query = PlanQuery {
            dec: Some(-5.0),
            radius: 0.0,
            ..PlanQuery::default()
        };
        assert_eq!(
            query.validate(),
            vec![
                "Both RA and Dec must be provided or neither.".to_string(),
                "Radius must be positive, got 0.".to_string(),
            ]
        );
    }
}
