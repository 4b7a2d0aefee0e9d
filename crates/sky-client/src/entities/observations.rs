//! `/swift/obsquery`: the as-flown timeline.
//!
//! The service returns one [`Snapshot`] per continuous pointing. Snapshots
//! sharing an observation number are summarized as an [`Observation`].

use std::collections::BTreeMap;

use chrono::{NaiveDateTime, TimeDelta};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use sky_core::correction::ClockState;
use sky_core::{
    ClockCorrectable, Coordinates, CoreError, Status, TimeRange, TimeValue, time_fields,
};

use super::paired;
use crate::entity::{Entity, Fetchable, Resolvable, Validatable};

/// Default search radius: 11.8 arcminutes, in degrees.
pub const DEFAULT_RADIUS: f64 = 11.8 / 60.0;

/// One continuous pointing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Snapshot {
    /// Slew start.
    pub begin: TimeValue,
    /// Slew end; exposure starts here.
    pub settle: TimeValue,
    pub end: TimeValue,
    /// Target position.
    pub ra: f64,
    pub dec: f64,
    #[serde(default)]
    pub roll: Option<f64>,
    #[serde(default)]
    pub targname: Option<String>,
    #[serde(default)]
    pub targetid: Option<u64>,
    #[serde(default)]
    pub seg: Option<u32>,
    #[serde(default)]
    pub obsnum: Option<u64>,
    #[serde(default)]
    pub obstype: Option<String>,
    #[serde(default)]
    pub targettype: Option<String>,
    /// Instrument modes.
    #[serde(default)]
    pub bat: Option<i64>,
    #[serde(default)]
    pub xrt: Option<i64>,
    #[serde(default)]
    pub uvot: Option<i64>,
    /// Figure of merit.
    #[serde(default)]
    pub fom: Option<i64>,
    #[serde(default)]
    pub sunha: Option<f64>,
    /// Actual pointing, which may differ from the target position.
    #[serde(default)]
    pub ra_point: Option<f64>,
    #[serde(default)]
    pub dec_point: Option<f64>,
    #[serde(default)]
    pub comment: Option<String>,
}

time_fields!(Snapshot { begin, settle, end });

impl Snapshot {
    /// Time on target.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::IncompatibleTimeBasis`] for mixed, uncorrected
    /// bases.
    pub fn exposure(&self) -> Result<TimeDelta, CoreError> {
        self.end.since(&self.settle)
    }

    /// Time spent slewing onto the target.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::IncompatibleTimeBasis`] for mixed, uncorrected
    /// bases.
    pub fn slew_time(&self) -> Result<TimeDelta, CoreError> {
        self.settle.since(&self.begin)
    }

    /// Observation id in the archive's 11-digit form.
    #[must_use]
    pub fn obsid(&self) -> Option<String> {
        self.obsnum.map(|obsnum| format!("{obsnum:011}"))
    }
}

/// All snapshots of one observation number.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Observation {
    pub obsnum: u64,
    pub snapshots: Vec<Snapshot>,
}

impl Observation {
    #[must_use]
    pub fn begin(&self) -> Option<&TimeValue> {
        self.snapshots.first().map(|snapshot| &snapshot.begin)
    }

    #[must_use]
    pub fn end(&self) -> Option<&TimeValue> {
        self.snapshots.last().map(|snapshot| &snapshot.end)
    }

    #[must_use]
    pub fn targname(&self) -> Option<&str> {
        self.snapshots.first()?.targname.as_deref()
    }

    /// Total exposure over all snapshots.
    ///
    /// # Errors
    ///
    /// Propagates [`CoreError::IncompatibleTimeBasis`] from any snapshot.
    pub fn exposure(&self) -> Result<TimeDelta, CoreError> {
        self.snapshots
            .iter()
            .try_fold(TimeDelta::zero(), |total, s| Ok(total + s.exposure()?))
    }

    /// Total slew time over all snapshots.
    ///
    /// # Errors
    ///
    /// Propagates [`CoreError::IncompatibleTimeBasis`] from any snapshot.
    pub fn slew_time(&self) -> Result<TimeDelta, CoreError> {
        self.snapshots
            .iter()
            .try_fold(TimeDelta::zero(), |total, s| Ok(total + s.slew_time()?))
    }

    #[must_use]
    pub fn obsid(&self) -> String {
        format!("{:011}", self.obsnum)
    }
}

/// As-flown timeline around a position, for targets, or for a time range.
#[derive(Debug, Clone, Serialize)]
pub struct ObservationQuery {
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
    pub entries: Vec<Snapshot>,
    /// Last time covered by the as-flown timeline.
    pub afstmax: Option<TimeValue>,
    pub status: Status,
    #[serde(skip)]
    clock: ClockState,
}

time_fields!(ObservationQuery { entries, afstmax });

impl Default for ObservationQuery {
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
            afstmax: None,
            status: Status::default(),
            clock: ClockState::default(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ObservationParams {
    pub ra: Option<f64>,
    pub dec: Option<f64>,
    pub radius: f64,
    pub begin: Option<NaiveDateTime>,
    pub end: Option<NaiveDateTime>,
    pub targetid: Vec<u64>,
    pub obsnum: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ObservationResponse {
    #[serde(default)]
    pub entries: Vec<Snapshot>,
    #[serde(default)]
    pub afstmax: Option<TimeValue>,
    #[serde(default)]
    pub status: Option<Status>,
}

impl ObservationQuery {
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

    /// Snapshots grouped by observation number, in obsnum order. Snapshots
    /// without an observation number are left out.
    #[must_use]
    pub fn observations(&self) -> BTreeMap<u64, Observation> {
        let mut grouped: BTreeMap<u64, Observation> = BTreeMap::new();
        for snapshot in &self.entries {
            let Some(obsnum) = snapshot.obsnum else {
                continue;
            };
            grouped
                .entry(obsnum)
                .or_insert_with(|| Observation {
                    obsnum,
                    snapshots: Vec::new(),
                })
                .snapshots
                .push(snapshot.clone());
        }
        grouped
    }
}

impl Fetchable for ObservationQuery {
    const NAME: &'static str = "ObsQuery";
    const ENDPOINT: &'static str = "/swift/obsquery";

    type Query = ObservationParams;
    type Response = ObservationResponse;

    fn status(&self) -> &Status {
        &self.status
    }

    fn status_mut(&mut self) -> &mut Status {
        &mut self.status
    }

    fn query(&self) -> ObservationParams {
        ObservationParams {
            ra: self.ra,
            dec: self.dec,
            radius: self.radius,
            begin: self.range.begin,
            end: self.range.end,
            targetid: self.targetid.clone(),
            obsnum: self.obsnum,
        }
    }

    fn populate(&mut self, response: ObservationResponse) -> Option<Status> {
        self.entries = response.entries;
        self.afstmax = response.afstmax;
        self.clock.corrected = false;
        response.status
    }
}

impl Validatable for ObservationQuery {
    fn validate(&mut self) -> Vec<String> {
        let mut violations = Coordinates::check_pair(self.ra, self.dec);
        if !(self.radius.is_finite() && self.radius > 0.0) {
            violations.push(format!("Radius must be positive, got {}.", self.radius));
        }
        violations.extend(self.range.normalize(false));
        violations
    }
}

impl Resolvable for ObservationQuery {
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

impl ClockCorrectable for ObservationQuery {
    fn clock_state(&self) -> &ClockState {
        &self.clock
    }

    fn clock_state_mut(&mut self) -> &mut ClockState {
        &mut self.clock
    }
}

impl Entity for ObservationQuery {
    fn as_clock_correctable(&mut self) -> Option<&mut dyn ClockCorrectable> {
        Some(self)
    }

    fn as_resolvable(&mut self) -> Option<&mut dyn Resolvable> {
        Some(self)
    }
}
