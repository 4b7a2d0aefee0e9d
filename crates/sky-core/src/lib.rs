//! # sky-core
//!
//! Core types for skyplan, the observation-planning service client.
//!
//! This crate provides the pieces every endpoint entity shares:
//! - [`TimeValue`](time::TimeValue): a time held in spacecraft or universal
//!   basis with lazily derived counterparts and mission-elapsed time
//! - the [`TimeGraph`](walker::TimeGraph) walker that collects and replaces
//!   every time value embedded in an entity
//! - clock correction orchestration ([`ClockCorrectable`](correction::ClockCorrectable))
//! - request status and its error/warning channel
//! - time range and sky coordinate validation
//! - cross-cutting error types

pub mod correction;
pub mod errors;
pub mod range;
pub mod status;
pub mod time;
pub mod walker;

pub use correction::{ClockCorrectable, ClockState, CorrectionBatch, CorrectionService};
pub use errors::CoreError;
pub use range::{Coordinates, TimeRange};
pub use status::{RequestState, Status};
pub use time::{TimeBasis, TimeValue};
pub use walker::TimeGraph;
