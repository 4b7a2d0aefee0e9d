//! Cross-cutting error types for skyplan.
//!
//! Validation problems found while driving a fetch are normally recorded on
//! the entity's [`Status`](crate::Status) rather than raised. The variants
//! here are the ones that callers receive as hard failures.

use thiserror::Error;

use crate::time::TimeBasis;

/// Errors that can be raised by the core time and correction machinery.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Input failed a structural constraint.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Arithmetic between two time values whose bases differ, where at least
    /// one of them has no correction offset to bridge the bases.
    #[error(
        "Incompatible time basis: cannot subtract a {right} time from a {left} time without a correction offset"
    )]
    IncompatibleTimeBasis { left: TimeBasis, right: TimeBasis },

    /// The number of replacement values differs from the number of time
    /// slots found in the graph.
    #[error("Time graph mismatch: graph holds {expected} time values but {found} replacements were supplied")]
    GraphMismatch { expected: usize, found: usize },

    /// A time computed from seconds falls outside the calendar range.
    #[error("Time out of range: {0}")]
    OutOfRange(String),

    /// The correction service could not correct a batch.
    #[error("Clock correction failed: {0}")]
    CorrectionFailed(String),
}
