//! Endpoint entities.

pub mod clock;
pub mod data;
pub mod observations;
pub mod plans;
pub mod resolve;
pub mod saa;
pub mod visibility;

pub use clock::Clock;
pub use data::{DataFile, DataQuery};
pub use observations::{Observation, ObservationQuery, Snapshot};
pub use plans::{PlanQuery, PlannedPointing};
pub use resolve::Resolve;
pub use saa::{SaaPassage, SaaQuery};
pub use visibility::{VisibilityQuery, VisibilityWindow};

use sky_core::Coordinates;

/// Pair optional RA/Dec fields into coordinates when both are present.
fn paired(ra: Option<f64>, dec: Option<f64>) -> Option<Coordinates> {
    Some(Coordinates { ra: ra?, dec: dec? })
}
