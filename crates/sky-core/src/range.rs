//! Time range and sky coordinate constraints shared by request entities.

use chrono::{NaiveDateTime, TimeDelta};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::errors::CoreError;
use crate::time::{as_seconds, try_seconds};

const SECONDS_PER_DAY: f64 = 86_400.0;

pub const COORDINATE_PAIR: &str = "Both RA and Dec must be provided or neither.";
pub const COORDINATES_REQUIRED: &str = "Both RA and Dec must be provided.";

/// A requested period given as begin plus either end or length (days).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TimeRange {
    pub begin: Option<NaiveDateTime>,
    pub end: Option<NaiveDateTime>,
    /// Length in days. Never sent to the service; it only derives `end`.
    pub length: Option<f64>,
}

impl TimeRange {
    #[must_use]
    pub const fn starting(begin: NaiveDateTime) -> Self {
        Self {
            begin: Some(begin),
            end: None,
            length: None,
        }
    }

    #[must_use]
    pub const fn between(begin: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self {
            begin: Some(begin),
            end: Some(end),
            length: None,
        }
    }

    #[must_use]
    pub const fn with_length_days(mut self, length: f64) -> Self {
        self.length = Some(length);
        self
    }

    /// Check the range and fill in whichever of `end`/`length` is derivable.
    ///
    /// With `required`, a begin time and one of end or length must be present.
    /// Returns one message per violated constraint.
    pub fn normalize(&mut self, required: bool) -> Vec<String> {
        let Some(begin) = self.begin else {
            if required {
                return vec!["Begin time must be provided.".to_string()];
            }
            return Vec::new();
        };

        let mut violations = Vec::new();
        if let Some(length) = self.length {
            if !length.is_finite() || length < 0.0 {
                return vec![format!("Length must be a non-negative number of days, got {length}.")];
            }
            let Some(derived) = days(length).and_then(|delta| begin.checked_add_signed(delta))
            else {
                return vec![format!("Length of {length} days is out of range.")];
            };
            match self.end {
                Some(end) if end != derived => {
                    violations.push("Only one of 'end' or 'length' should be provided.".to_string());
                }
                _ => self.end = Some(derived),
            }
        }

        match self.end {
            Some(end) if end < begin => {
                violations.push("End time cannot be before begin time.".to_string());
            }
            Some(end) => self.length = Some(as_seconds(end - begin) / SECONDS_PER_DAY),
            None if required => {
                violations.push("Either 'end' or 'length' must be provided.".to_string());
            }
            None => {}
        }
        violations
    }

    /// Duration of a normalized range.
    #[must_use]
    pub fn duration(&self) -> Option<TimeDelta> {
        Some(self.end? - self.begin?)
    }
}

fn days(length: f64) -> Option<TimeDelta> {
    try_seconds(length * SECONDS_PER_DAY)
}

/// J2000 right ascension and declination in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Coordinates {
    pub ra: f64,
    pub dec: f64,
}

impl Coordinates {
    /// # Errors
    ///
    /// Returns [`CoreError::Validation`] when either angle is out of range.
    pub fn new(ra: f64, dec: f64) -> Result<Self, CoreError> {
        let violations = check_ranges(ra, dec);
        if let Some(first) = violations.into_iter().next() {
            return Err(CoreError::Validation(first));
        }
        Ok(Self { ra, dec })
    }

    /// Validate an optional RA/Dec pair: both or neither, each in range.
    pub fn check_pair(ra: Option<f64>, dec: Option<f64>) -> Vec<String> {
        match (ra, dec) {
            (Some(ra), Some(dec)) => check_ranges(ra, dec),
            (None, None) => Vec::new(),
            _ => vec![COORDINATE_PAIR.to_string()],
        }
    }

    /// Validate a mandatory RA/Dec pair.
    pub fn check_required(ra: Option<f64>, dec: Option<f64>) -> Vec<String> {
        match (ra, dec) {
            (Some(ra), Some(dec)) => check_ranges(ra, dec),
            _ => vec![COORDINATES_REQUIRED.to_string()],
        }
    }
}

fn check_ranges(ra: f64, dec: f64) -> Vec<String> {
    let mut violations = Vec::new();
    if !(0.0..360.0).contains(&ra) {
        violations.push(format!("RA must be in [0, 360) degrees, got {ra}."));
    }
    if !(-90.0..=90.0).contains(&dec) {
        violations.push(format!("Dec must be in [-90, 90] degrees, got {dec}."));
    }
    violations
}
