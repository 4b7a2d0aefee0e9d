//! `/swift/saa`: South Atlantic Anomaly passages.

use chrono::{NaiveDateTime, TimeDelta};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use sky_core::correction::ClockState;
use sky_core::{ClockCorrectable, CoreError, Status, TimeRange, TimeValue, time_fields};

use crate::entity::{Entity, Fetchable, Validatable};

/// Length used when neither `end` nor `length` is given, in days.
pub const DEFAULT_LENGTH_DAYS: f64 = 1.0;

/// One passage through the SAA.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SaaPassage {
    pub begin: TimeValue,
    pub end: TimeValue,
}

time_fields!(SaaPassage { begin, end });

impl SaaPassage {
    /// # Errors
    ///
    /// Returns [`CoreError::IncompatibleTimeBasis`] if the two ends were left
    /// in different bases without offsets.
    pub fn duration(&self) -> Result<TimeDelta, CoreError> {
        self.end.since(&self.begin)
    }
}

/// SAA passages over a time range, optionally using the BAT SAA polygon.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SaaQuery {
    #[serde(flatten)]
    pub range: TimeRange,
    pub bat: bool,
    pub entries: Vec<SaaPassage>,
    pub status: Status,
    #[serde(skip)]
    clock: ClockState,
}

time_fields!(SaaQuery { entries });

#[derive(Debug, Serialize)]
pub struct SaaParams {
    pub begin: Option<NaiveDateTime>,
    pub end: Option<NaiveDateTime>,
    pub bat: bool,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct SaaResponse {
    #[serde(default)]
    pub entries: Vec<SaaPassage>,
    #[serde(default)]
    pub status: Option<Status>,
}

impl SaaQuery {
    #[must_use]
    pub fn new(begin: NaiveDateTime) -> Self {
        Self {
            range: TimeRange::starting(begin),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_range(range: TimeRange) -> Self {
        Self {
            range,
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn bat(mut self, bat: bool) -> Self {
        self.bat = bat;
        self
    }
}

impl Fetchable for SaaQuery {
    const NAME: &'static str = "SAA";
    const ENDPOINT: &'static str = "/swift/saa";

    type Query = SaaParams;
    type Response = SaaResponse;

    fn status(&self) -> &Status {
        &self.status
    }

    fn status_mut(&mut self) -> &mut Status {
        &mut self.status
    }

    fn query(&self) -> SaaParams {
        SaaParams {
            begin: self.range.begin,
            end: self.range.end,
            bat: self.bat,
        }
    }

    fn populate(&mut self, response: SaaResponse) -> Option<Status> {
        self.entries = response.entries;
        self.clock.corrected = false;
        response.status
    }
}

impl Validatable for SaaQuery {
    fn validate(&mut self) -> Vec<String> {
        if self.range.begin.is_some() && self.range.end.is_none() && self.range.length.is_none() {
            self.range.length = Some(DEFAULT_LENGTH_DAYS);
        }
        self.range.normalize(true)
    }
}

impl ClockCorrectable for SaaQuery {
    fn clock_state(&self) -> &ClockState {
        &self.clock
    }

    fn clock_state_mut(&mut self) -> &mut ClockState {
        &mut self.clock
    }
}

impl Entity for SaaQuery {
    fn as_clock_correctable(&mut self) -> Option<&mut dyn ClockCorrectable> {
        Some(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn jan(day: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, day)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    #[test]
    fn missing_end_defaults_to_one_day() {
        let mut saa = SaaQuery::new(jan(1));
        assert!(saa.validate().is_empty());
        assert_eq!(saa.range.end, Some(jan(2)));
    }

    #[test]
    fn missing_begin_is_rejected() {
        let mut saa = SaaQuery::default();
        assert_eq!(saa.validate(), vec!["Begin time must be provided.".to_string()]);
    }

    #[test]
    fn query_carries_range_and_flag() {
        let mut saa = SaaQuery::with_range(TimeRange::between(jan(1), jan(3))).bat(true);
        assert!(saa.validate().is_empty());
        let json = serde_json::to_value(saa.query()).unwrap();
        assert_eq!(json["begin"], "2024-01-01T00:00:00");
        assert_eq!(json["end"], "2024-01-03T00:00:00");
        assert_eq!(json["bat"], true);
    }

    #[test]
    fn passage_duration() {
        let passage: SaaPassage = serde_json::from_str(
            r#"{"begin": "2024-01-01T01:00:00", "end": "2024-01-01T01:12:30"}"#,
        )
        .unwrap();
        assert_eq!(passage.duration().unwrap(), TimeDelta::seconds(750));
    }
}
