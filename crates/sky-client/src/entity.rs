//! Capability traits for request entities.
//!
//! An entity is a typed request/response object. What the lifecycle driver
//! may do with it is declared through capabilities:
//!
//! | capability          | meaning                                        |
//! |---------------------|------------------------------------------------|
//! | [`Fetchable`]       | has an endpoint, a query projection and a response schema |
//! | [`Validatable`]     | checks its own parameters before any network call |
//! | [`ClockCorrectable`]| carries time fields that can be clock corrected |
//! | [`Resolvable`]      | can turn a target name into coordinates        |
//!
//! [`Entity`] ties them together and exposes the optional ones through
//! `as_*` accessors the driver checks at run time.

use serde::Serialize;
use serde::de::DeserializeOwned;
use sky_core::{ClockCorrectable, Coordinates, Status};

use crate::error::ClientError;

/// How a fetch ended on the status-channel path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The response was parsed and copied into the entity.
    Populated,
    /// Validation, transport, parsing or the service rejected the request;
    /// details are on the entity's status.
    Rejected,
}

impl FetchOutcome {
    #[must_use]
    pub const fn is_populated(self) -> bool {
        matches!(self, Self::Populated)
    }
}

pub trait Fetchable {
    /// Human-readable entity name used in logs and errors.
    const NAME: &'static str;

    /// Endpoint path appended to the configured base URL.
    const ENDPOINT: &'static str;

    /// Request schema; serialized and projected onto the query string.
    type Query: Serialize;

    /// Response schema the body is parsed into.
    type Response: DeserializeOwned;

    fn status(&self) -> &Status;

    fn status_mut(&mut self) -> &mut Status;

    /// Project the current fields onto the request schema.
    fn query(&self) -> Self::Query;

    /// Copy a parsed response into the entity, returning the status the
    /// service sent along with it (if any).
    fn populate(&mut self, response: Self::Response) -> Option<Status>;

    /// Runs after population and clock correction.
    fn post_process(&mut self) -> Result<(), ClientError> {
        Ok(())
    }
}

pub trait Validatable {
    /// Check parameters, normalizing derivable ones in place.
    ///
    /// Returns one message per violated constraint; empty means valid.
    fn validate(&mut self) -> Vec<String>;
}

/// Entities whose target may be given by name instead of coordinates.
pub trait Resolvable {
    fn target_name(&self) -> Option<&str>;

    fn coordinates(&self) -> Option<Coordinates>;

    fn set_coordinates(&mut self, coordinates: Coordinates);

    /// True when a name is set and coordinates still need to be looked up.
    fn needs_resolution(&self) -> bool {
        self.target_name().is_some_and(|name| !name.trim().is_empty())
            && self.coordinates().is_none()
    }
}

/// Turns a target name into coordinates.
pub trait Resolver {
    /// # Errors
    ///
    /// Returns [`ClientError::Resolve`] when the name is unknown, or any
    /// transport error the lookup hit.
    fn resolve(&self, name: &str) -> Result<Coordinates, ClientError>;
}

/// A fetchable, validatable entity with optional capabilities.
pub trait Entity: Fetchable + Validatable {
    fn as_clock_correctable(&mut self) -> Option<&mut dyn ClockCorrectable> {
        None
    }

    fn as_resolvable(&mut self) -> Option<&mut dyn Resolvable> {
        None
    }
}
