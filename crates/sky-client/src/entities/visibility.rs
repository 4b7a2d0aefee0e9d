//! `/swift/visquery`: windows during which a sky position is observable.

use chrono::{NaiveDateTime, TimeDelta};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use sky_core::correction::ClockState;
use sky_core::{
    ClockCorrectable, Coordinates, CoreError, Status, TimeRange, TimeValue, time_fields,
};

use super::paired;
use crate::entity::{Entity, Fetchable, Resolvable, Validatable};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct VisibilityWindow {
    pub begin: TimeValue,
    pub end: TimeValue,
}

time_fields!(VisibilityWindow { begin, end });

impl VisibilityWindow {
    /// # Errors
    ///
    /// Returns [`CoreError::IncompatibleTimeBasis`] if the two ends were left
    /// in different bases without offsets.
    pub fn duration(&self) -> Result<TimeDelta, CoreError> {
        self.end.since(&self.begin)
    }
}

/// Visibility of a position (or named target) over a time range.
#[derive(Debug, Clone, Default, Serialize)]
pub struct VisibilityQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub ra: Option<f64>,
    pub dec: Option<f64>,
    #[serde(flatten)]
    pub range: TimeRange,
    /// Ask for high time resolution windows.
    pub hires: bool,
    pub windows: Vec<VisibilityWindow>,
    pub status: Status,
    #[serde(skip)]
    clock: ClockState,
}

time_fields!(VisibilityQuery { windows });

#[derive(Debug, Serialize)]
pub struct VisibilityParams {
    pub ra: Option<f64>,
    pub dec: Option<f64>,
    pub begin: Option<NaiveDateTime>,
    pub end: Option<NaiveDateTime>,
    pub hires: bool,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct VisibilityResponse {
    #[serde(default)]
    pub windows: Vec<VisibilityWindow>,
    #[serde(default)]
    pub status: Option<Status>,
}

impl VisibilityQuery {
    #[must_use]
    pub fn at(coordinates: Coordinates, range: TimeRange) -> Self {
        Self {
            ra: Some(coordinates.ra),
            dec: Some(coordinates.dec),
            range,
            ..Self::default()
        }
    }

    /// Query a named target; coordinates are resolved before validation.
    #[must_use]
    pub fn named(name: impl Into<String>, range: TimeRange) -> Self {
        Self {
            name: Some(name.into()),
            range,
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn hires(mut self, hires: bool) -> Self {
        self.hires = hires;
        self
    }

    /// Sum of all window durations.
    ///
    /// # Errors
    ///
    /// Propagates [`CoreError::IncompatibleTimeBasis`] from any window.
    pub fn total_visible(&self) -> Result<TimeDelta, CoreError> {
        self.windows
            .iter()
            .try_fold(TimeDelta::zero(), |total, window| Ok(total + window.duration()?))
    }
}

impl Fetchable for VisibilityQuery {
    const NAME: &'static str = "VisQuery";
    const ENDPOINT: &'static str = "/swift/visquery";

    type Query = VisibilityParams;
    type Response = VisibilityResponse;

    fn status(&self) -> &Status {
        &self.status
    }

    fn status_mut(&mut self) -> &mut Status {
        &mut self.status
    }

    fn query(&self) -> VisibilityParams {
        VisibilityParams {
            ra: self.ra,
            dec: self.dec,
            begin: self.range.begin,
            end: self.range.end,
            hires: self.hires,
        }
    }

    fn populate(&mut self, response: VisibilityResponse) -> Option<Status> {
        self.windows = response.windows;
        self.clock.corrected = false;
        response.status
    }
}

impl Validatable for VisibilityQuery {
    fn validate(&mut self) -> Vec<String> {
        let mut violations = Coordinates::check_required(self.ra, self.dec);
        violations.extend(self.range.normalize(true));
        violations
    }
}

impl Resolvable for VisibilityQuery {
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

impl ClockCorrectable for VisibilityQuery {
    fn clock_state(&self) -> &ClockState {
        &self.clock
    }

    fn clock_state_mut(&mut self) -> &mut ClockState {
        &mut self.clock
    }
}

impl Entity for VisibilityQuery {
    fn as_clock_correctable(&mut self) -> Option<&mut dyn ClockCorrectable> {
        Some(self)
    }

    fn as_resolvable(&mut self) -> Option<&mut dyn Resolvable> {
        Some(self)
    }
}
