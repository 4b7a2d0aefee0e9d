//! Clock correction.
//!
//! An entity that carries time fields implements [`ClockCorrectable`]. One
//! correction pass collects every embedded time with the walker, submits them
//! as a single [`CorrectionBatch`] to a [`CorrectionService`], writes the
//! resolved values back in place and rebases the entity to universal time.
//!
//! ```text
//! Uncorrected ──correct_clocks──▶ Corrected
//!      ▲ │                          ▲ │
//!      └─┘ rebase (values with      └─┘ to_universal_time /
//!          an offset only)              to_spacecraft_time
//! ```

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::errors::CoreError;
use crate::time::{TimeBasis, TimeValue};
use crate::walker::{self, TimeGraph};

/// Inputs submitted together for correction, all in one representation.
#[derive(Debug, Clone, PartialEq)]
pub enum CorrectionBatch {
    /// Mission-elapsed seconds.
    Met(Vec<f64>),
    /// Spacecraft-clock readings.
    Spacecraft(Vec<NaiveDateTime>),
    /// Universal times.
    Universal(Vec<NaiveDateTime>),
}

impl CorrectionBatch {
    /// Build a batch from collected values, reading each one in `basis`.
    ///
    /// A value that cannot resolve `basis` is submitted at face value, since
    /// the owning entity declares that all of its times are in `basis`.
    #[must_use]
    pub fn from_values(basis: TimeBasis, values: &[TimeValue]) -> Self {
        let times = values
            .iter()
            .map(|value| value.time_in(basis).unwrap_or_else(|| value.native()))
            .collect();
        match basis {
            TimeBasis::Spacecraft => Self::Spacecraft(times),
            TimeBasis::Universal => Self::Universal(times),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Met(values) => values.len(),
            Self::Spacecraft(values) | Self::Universal(values) => values.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Basis of the submitted times; `None` for MET input.
    #[must_use]
    pub const fn basis(&self) -> Option<TimeBasis> {
        match self {
            Self::Met(_) => None,
            Self::Spacecraft(_) => Some(TimeBasis::Spacecraft),
            Self::Universal(_) => Some(TimeBasis::Universal),
        }
    }
}

/// Remote capability that resolves a batch of times.
pub trait CorrectionService {
    /// Return one fully resolved value (MET, both bases, offset) per input, in
    /// input order.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::CorrectionFailed`] when the service cannot correct
    /// the batch.
    fn correct(&self, batch: &CorrectionBatch) -> Result<Vec<TimeValue>, CoreError>;
}

/// Per-entity correction bookkeeping.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClockState {
    /// Basis the service reported this entity's times in.
    pub native_basis: TimeBasis,
    /// Set once a correction pass has replaced the entity's times.
    pub corrected: bool,
}

impl ClockState {
    #[must_use]
    pub const fn with_basis(native_basis: TimeBasis) -> Self {
        Self {
            native_basis,
            corrected: false,
        }
    }
}

/// Capability of entities that carry time fields.
pub trait ClockCorrectable: TimeGraph {
    fn clock_state(&self) -> &ClockState;

    fn clock_state_mut(&mut self) -> &mut ClockState;

    fn native_basis(&self) -> TimeBasis {
        self.clock_state().native_basis
    }

    fn is_corrected(&self) -> bool {
        self.clock_state().corrected
    }

    /// Correct every embedded time with one request to `service`.
    ///
    /// A second call is a no-op. An entity without time values is left alone.
    ///
    /// # Errors
    ///
    /// Propagates service failures, and returns [`CoreError::GraphMismatch`]
    /// if the service answers with a different number of values.
    fn correct_clocks(&mut self, service: &dyn CorrectionService) -> Result<(), CoreError> {
        correct(self, service)
    }

    /// Present every time that carries an offset in universal basis.
    fn to_universal_time(&mut self) {
        rebase(self, TimeBasis::Universal);
    }

    /// Present every time that carries an offset in spacecraft basis.
    fn to_spacecraft_time(&mut self) {
        rebase(self, TimeBasis::Spacecraft);
    }

    /// Stamp the declared native basis on freshly parsed, uncorrected times.
    fn adopt_native_basis(&mut self) {
        if self.is_corrected() {
            return;
        }
        let basis = self.native_basis();
        walker::for_each_mut(self, |value| {
            if value.offset().is_none() && value.basis() != basis {
                value.set_basis(basis);
            }
        });
    }
}

fn correct<T: ClockCorrectable + ?Sized>(
    target: &mut T,
    service: &dyn CorrectionService,
) -> Result<(), CoreError> {
    if target.is_corrected() {
        return Ok(());
    }
    let values = walker::collect(&*target);
    if values.is_empty() {
        return Ok(());
    }

    let batch = CorrectionBatch::from_values(target.native_basis(), &values);
    let corrected = service.correct(&batch)?;
    walker::replace(target, corrected)?;
    target.clock_state_mut().corrected = true;

    rebase(target, TimeBasis::Universal);
    Ok(())
}

fn rebase<T: ClockCorrectable + ?Sized>(target: &mut T, basis: TimeBasis) {
    walker::for_each_mut(target, |value| *value = value.rebased(basis));
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    const UTCF: f64 = -12.5;

    fn at(hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    /// Resolves spacecraft times with a fixed offset.
    struct FixedOffset {
        calls: Cell<usize>,
    }

    impl CorrectionService for FixedOffset {
        fn correct(&self, batch: &CorrectionBatch) -> Result<Vec<TimeValue>, CoreError> {
            self.calls.set(self.calls.get() + 1);
            let CorrectionBatch::Spacecraft(times) = batch else {
                return Err(CoreError::CorrectionFailed("expected spacecraft times".into()));
            };
            Ok(times
                .iter()
                .map(|time| TimeValue::spacecraft(*time).with_offset(UTCF))
                .collect())
        }
    }

    struct Dropping;

    impl CorrectionService for Dropping {
        fn correct(&self, _batch: &CorrectionBatch) -> Result<Vec<TimeValue>, CoreError> {
            Ok(Vec::new())
        }
    }

    struct Window {
        begin: TimeValue,
        end: TimeValue,
        clock: ClockState,
    }

    crate::time_fields!(Window { begin, end });

    impl ClockCorrectable for Window {
        fn clock_state(&self) -> &ClockState {
            &self.clock
        }

        fn clock_state_mut(&mut self) -> &mut ClockState {
            &mut self.clock
        }
    }

    fn window() -> Window {
        Window {
            begin: TimeValue::spacecraft(at(1)),
            end: TimeValue::spacecraft(at(2)),
            clock: ClockState::default(),
        }
    }

    #[test]
    fn batch_reads_values_in_requested_basis() {
        let values = vec![
            TimeValue::universal(at(3)).with_offset(60.0),
            TimeValue::spacecraft(at(4)),
        ];
        let batch = CorrectionBatch::from_values(TimeBasis::Spacecraft, &values);
        assert_eq!(
            batch,
            CorrectionBatch::Spacecraft(vec![at(3) - chrono::TimeDelta::minutes(1), at(4)])
        );
        assert_eq!(batch.basis(), Some(TimeBasis::Spacecraft));
        assert_eq!(CorrectionBatch::Met(vec![1.0]).basis(), None);
    }

    #[test]
    fn correction_resolves_and_rebases_to_universal() {
        let service = FixedOffset {
            calls: Cell::new(0),
        };
        let mut entity = window();
        entity.correct_clocks(&service).unwrap();

        assert!(entity.is_corrected());
        assert!(entity.begin.is_universal());
        assert_eq!(entity.begin.offset(), Some(UTCF));
        assert_eq!(entity.begin.spacecraft_time(), Some(at(1)));
        assert_eq!(
            entity.begin.universal_time(),
            Some(at(1) + crate::time::seconds(UTCF))
        );
    }

    #[test]
    fn second_correction_is_a_no_op() {
        let service = FixedOffset {
            calls: Cell::new(0),
        };
        let mut entity = window();
        entity.correct_clocks(&service).unwrap();
        let first = walker::collect(&entity);
        entity.correct_clocks(&service).unwrap();

        assert_eq!(service.calls.get(), 1);
        assert_eq!(walker::collect(&entity), first);
    }

    #[test]
    fn rebasing_switches_display_without_service() {
        let service = FixedOffset {
            calls: Cell::new(0),
        };
        let mut entity = window();
        entity.correct_clocks(&service).unwrap();

        entity.to_spacecraft_time();
        assert!(!entity.end.is_universal());
        assert_eq!(entity.end.native(), at(2));
        entity.to_universal_time();
        assert!(entity.end.is_universal());
        assert_eq!(service.calls.get(), 1);
    }

    #[test]
    fn rebasing_uncorrected_values_leaves_universal_absent() {
        let mut entity = window();
        entity.to_universal_time();
        assert!(!entity.begin.is_universal());
        assert!(entity.begin.universal_time().is_none());
    }

    #[test]
    fn short_service_answer_is_a_graph_mismatch() {
        let mut entity = window();
        let err = entity.correct_clocks(&Dropping).unwrap_err();
        assert!(matches!(
            err,
            CoreError::GraphMismatch {
                expected: 2,
                found: 0
            }
        ));
        assert!(!entity.is_corrected());
    }

    #[test]
    fn adopt_native_basis_stamps_uncorrected_values() {
        let mut entity = window();
        entity.clock.native_basis = TimeBasis::Universal;
        entity.adopt_native_basis();
        assert!(entity.begin.is_universal());
        assert_eq!(entity.begin.native(), at(1));
    }
}
