//! Dual-basis time values.
//!
//! A [`TimeValue`] carries one directly assigned ("native") time in either
//! spacecraft or universal basis, plus an optional correction offset (UTCF).
//! The opposite basis and the mission-elapsed time (MET) are derived on
//! demand and cached:
//!
//! ```text
//! universal  = spacecraft + offset
//! spacecraft = universal  - offset
//! met        = seconds(spacecraft - 2001-01-01T00:00:00)
//! ```
//!
//! Without an offset, the basis opposite to the native one is absent. That is
//! the normal state of a value that has not been clock corrected yet.

use std::borrow::Cow;
use std::fmt;
use std::ops::{Add, Sub};
use std::sync::OnceLock;

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use schemars::{JsonSchema, Schema, SchemaGenerator, json_schema};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::errors::CoreError;

/// Start of mission-elapsed time.
///
/// # Panics
///
/// Never in practice: the epoch is a valid calendar date.
#[must_use]
pub fn met_epoch() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2001, 1, 1)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .expect("MET epoch is a valid date")
}

/// Convert fractional seconds to a duration with microsecond precision.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn seconds(value: f64) -> TimeDelta {
    TimeDelta::microseconds((value * 1_000_000.0).round() as i64)
}

/// Like [`seconds`], but `None` for values that are not finite or do not
/// fit a duration.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
pub fn try_seconds(value: f64) -> Option<TimeDelta> {
    let micros = (value * 1_000_000.0).round();
    if !micros.is_finite() || micros.abs() >= i64::MAX as f64 {
        return None;
    }
    Some(TimeDelta::microseconds(micros as i64))
}

/// Shift a time by fractional seconds, `None` past the calendar range.
#[must_use]
pub fn shift(time: NaiveDateTime, value: f64) -> Option<NaiveDateTime> {
    time.checked_add_signed(try_seconds(value)?)
}

/// Convert a duration to fractional seconds.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn as_seconds(delta: TimeDelta) -> f64 {
    delta
        .num_microseconds()
        .map_or_else(|| delta.num_seconds() as f64, |us| us as f64 / 1_000_000.0)
}

// ---------------------------------------------------------------------------
// TimeBasis
// ---------------------------------------------------------------------------

/// Which clock a native time value was read from.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum TimeBasis {
    /// Onboard clock, uncorrected for drift and leap seconds. The service
    /// reports times in this basis unless told otherwise.
    #[default]
    Spacecraft,
    /// Spacecraft time adjusted by the correction offset.
    Universal,
}

impl TimeBasis {
    #[must_use]
    pub const fn from_universal(is_universal: bool) -> Self {
        if is_universal {
            Self::Universal
        } else {
            Self::Spacecraft
        }
    }

    #[must_use]
    pub const fn is_universal(self) -> bool {
        matches!(self, Self::Universal)
    }

    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Spacecraft => Self::Universal,
            Self::Universal => Self::Spacecraft,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Spacecraft => "spacecraft",
            Self::Universal => "universal",
        }
    }
}

impl fmt::Display for TimeBasis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// TimeValue
// ---------------------------------------------------------------------------

/// A naive time in one native basis with lazily derived counterparts.
///
/// Derived fields live in explicit cache cells. They are only invalidated by
/// [`set_basis`](Self::set_basis), [`set_offset`](Self::set_offset) and
/// [`invalidate`](Self::invalidate).
#[derive(Debug, Clone)]
pub struct TimeValue {
    native: NaiveDateTime,
    basis: TimeBasis,
    offset: Option<f64>,
    spacecraft: OnceLock<NaiveDateTime>,
    universal: OnceLock<NaiveDateTime>,
}

impl TimeValue {
    /// Create a value read directly in `basis`, with no correction offset.
    #[must_use]
    pub const fn new(native: NaiveDateTime, basis: TimeBasis) -> Self {
        Self {
            native,
            basis,
            offset: None,
            spacecraft: OnceLock::new(),
            universal: OnceLock::new(),
        }
    }

    /// A spacecraft-clock reading.
    #[must_use]
    pub const fn spacecraft(native: NaiveDateTime) -> Self {
        Self::new(native, TimeBasis::Spacecraft)
    }

    /// A universal time.
    #[must_use]
    pub const fn universal(native: NaiveDateTime) -> Self {
        Self::new(native, TimeBasis::Universal)
    }

    /// Attach a correction offset (seconds to add to spacecraft time).
    #[must_use]
    pub fn with_offset(mut self, offset: f64) -> Self {
        self.set_offset(Some(offset));
        self
    }

    /// Build a value from mission-elapsed seconds.
    ///
    /// MET always anchors spacecraft time. With a universal basis and a known
    /// offset the native value becomes `spacecraft + offset`; with a universal
    /// basis and no offset the uncorrected spacecraft time is taken as is.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::OutOfRange`] when the MET or the offset lands
    /// outside the representable calendar range.
    pub fn try_from_met(met: f64, offset: Option<f64>, basis: TimeBasis) -> Result<Self, CoreError> {
        let spacecraft = shift(met_epoch(), met)
            .ok_or_else(|| CoreError::OutOfRange(format!("MET {met} is not a representable time")))?;
        let native = match (basis, offset) {
            (TimeBasis::Universal, Some(offset)) => shift(spacecraft, offset).ok_or_else(|| {
                CoreError::OutOfRange(format!("offset {offset} moves MET {met} out of range"))
            })?,
            _ => spacecraft,
        };
        Ok(Self {
            native,
            basis,
            offset,
            spacecraft: OnceLock::new(),
            universal: OnceLock::new(),
        })
    }

    /// The directly assigned time, which is also the default display time.
    #[must_use]
    pub const fn native(&self) -> NaiveDateTime {
        self.native
    }

    #[must_use]
    pub const fn basis(&self) -> TimeBasis {
        self.basis
    }

    #[must_use]
    pub const fn is_universal(&self) -> bool {
        self.basis.is_universal()
    }

    /// Correction offset in seconds, if known.
    #[must_use]
    pub const fn offset(&self) -> Option<f64> {
        self.offset
    }

    /// Reinterpret the native time in another basis.
    ///
    /// Always allowed; both cached derived fields are reset so they are
    /// recomputed under the new basis.
    pub fn set_basis(&mut self, basis: TimeBasis) {
        self.basis = basis;
        self.invalidate();
    }

    /// Replace the correction offset, resetting derived fields.
    pub fn set_offset(&mut self, offset: Option<f64>) {
        self.offset = offset;
        self.invalidate();
    }

    /// Drop both cached derived times.
    pub fn invalidate(&mut self) {
        self.spacecraft.take();
        self.universal.take();
    }

    /// Spacecraft time, derived from universal time and the offset when the
    /// native basis is universal.
    #[must_use]
    pub fn spacecraft_time(&self) -> Option<NaiveDateTime> {
        match self.basis {
            TimeBasis::Spacecraft => Some(self.native),
            TimeBasis::Universal => cached(&self.spacecraft, || {
                self.offset.and_then(|offset| shift(self.native, -offset))
            }),
        }
    }

    /// Universal time, derived from spacecraft time and the offset when the
    /// native basis is spacecraft.
    #[must_use]
    pub fn universal_time(&self) -> Option<NaiveDateTime> {
        match self.basis {
            TimeBasis::Universal => Some(self.native),
            TimeBasis::Spacecraft => cached(&self.universal, || {
                self.offset.and_then(|offset| shift(self.native, offset))
            }),
        }
    }

    /// The time in the requested basis, if resolvable.
    #[must_use]
    pub fn time_in(&self, basis: TimeBasis) -> Option<NaiveDateTime> {
        match basis {
            TimeBasis::Spacecraft => self.spacecraft_time(),
            TimeBasis::Universal => self.universal_time(),
        }
    }

    /// Mission-elapsed seconds, defined once spacecraft time is resolvable.
    #[must_use]
    pub fn met(&self) -> Option<f64> {
        self.spacecraft_time()
            .map(|spacecraft| as_seconds(spacecraft - met_epoch()))
    }

    /// An equivalent value whose native (display) basis is `basis`.
    ///
    /// Values without an offset cannot bridge bases and are returned unchanged.
    #[must_use]
    pub fn rebased(&self, basis: TimeBasis) -> Self {
        if basis == self.basis {
            return self.clone();
        }
        match (self.met(), self.offset) {
            (Some(met), Some(offset)) => Self::try_from_met(met, Some(offset), basis)
                .unwrap_or_else(|_| self.clone()),
            _ => self.clone(),
        }
    }

    /// Duration from `earlier` to `self`.
    ///
    /// Values in the same basis subtract their native times. Values in
    /// different bases are compared through their universal times, which
    /// both must be able to resolve.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::IncompatibleTimeBasis`] when the bases differ and
    /// either value lacks a resolvable universal time.
    pub fn since(&self, earlier: &Self) -> Result<TimeDelta, CoreError> {
        if self.basis == earlier.basis {
            return Ok(self.native - earlier.native);
        }
        match (self.universal_time(), earlier.universal_time()) {
            (Some(left), Some(right)) => Ok(left - right),
            _ => Err(CoreError::IncompatibleTimeBasis {
                left: self.basis,
                right: earlier.basis,
            }),
        }
    }
}

fn cached(
    cell: &OnceLock<NaiveDateTime>,
    derive: impl FnOnce() -> Option<NaiveDateTime>,
) -> Option<NaiveDateTime> {
    if let Some(value) = cell.get() {
        return Some(*value);
    }
    let value = derive()?;
    Some(*cell.get_or_init(|| value))
}

impl PartialEq for TimeValue {
    fn eq(&self, other: &Self) -> bool {
        self.native == other.native && self.basis == other.basis && self.offset == other.offset
    }
}

/// Shifting a time keeps its basis but drops the correction offset: the
/// shifted instant has not been corrected and must be re-queried.
impl Add<TimeDelta> for &TimeValue {
    type Output = TimeValue;

    fn add(self, rhs: TimeDelta) -> TimeValue {
        TimeValue::new(self.native + rhs, self.basis)
    }
}

impl Add<TimeDelta> for TimeValue {
    type Output = Self;

    fn add(self, rhs: TimeDelta) -> Self {
        &self + rhs
    }
}

impl Sub<TimeDelta> for &TimeValue {
    type Output = TimeValue;

    fn sub(self, rhs: TimeDelta) -> TimeValue {
        TimeValue::new(self.native - rhs, self.basis)
    }
}

impl Sub<TimeDelta> for TimeValue {
    type Output = Self;

    fn sub(self, rhs: TimeDelta) -> Self {
        &self - rhs
    }
}

impl fmt::Display for TimeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({})",
            self.native.format("%Y-%m-%d %H:%M:%S%.f"),
            self.basis
        )
    }
}

// ---------------------------------------------------------------------------
// Wire format
// ---------------------------------------------------------------------------

/// Fully resolved form, also accepted on input.
#[derive(Serialize, Deserialize)]
struct ResolvedWire {
    #[serde(default)]
    met: Option<f64>,
    #[serde(default)]
    swifttime: Option<NaiveDateTime>,
    #[serde(default)]
    utctime: Option<NaiveDateTime>,
    #[serde(default)]
    utcf: Option<f64>,
    #[serde(default)]
    isutc: bool,
}

/// The service sends bare naive datetimes; resolved values travel as objects.
#[derive(Deserialize)]
#[serde(untagged)]
enum TimeWire {
    Plain(NaiveDateTime),
    Resolved(ResolvedWire),
}

impl Serialize for TimeValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        ResolvedWire {
            met: self.met(),
            swifttime: self.spacecraft_time(),
            utctime: self.universal_time(),
            utcf: self.offset,
            isutc: self.is_universal(),
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for TimeValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match TimeWire::deserialize(deserializer)? {
            TimeWire::Plain(native) => Ok(Self::spacecraft(native)),
            TimeWire::Resolved(wire) => {
                let basis = TimeBasis::from_universal(wire.isutc);
                let native = if wire.isutc {
                    wire.utctime
                } else {
                    wire.swifttime
                };
                match (native, wire.met) {
                    (Some(native), _) => {
                        let mut value = Self::new(native, basis);
                        value.offset = wire.utcf;
                        Ok(value)
                    }
                    (None, Some(met)) => Self::try_from_met(met, wire.utcf, basis)
                        .map_err(serde::de::Error::custom),
                    (None, None) => Err(serde::de::Error::custom(format!(
                        "time value needs a {basis} time or a MET"
                    ))),
                }
            }
        }
    }
}

impl JsonSchema for TimeValue {
    fn schema_name() -> Cow<'static, str> {
        "TimeValue".into()
    }

    fn json_schema(_generator: &mut SchemaGenerator) -> Schema {
        json_schema!({
            "description": "Naive datetime string (spacecraft basis) or a resolved time object",
            "anyOf": [
                { "type": "string" },
                {
                    "type": "object",
                    "properties": {
                        "met": { "type": ["number", "null"] },
                        "swifttime": { "type": ["string", "null"] },
                        "utctime": { "type": ["string", "null"] },
                        "utcf": { "type": ["number", "null"] },
                        "isutc": { "type": "boolean" }
                    }
                }
            ]
        })
    }
}
