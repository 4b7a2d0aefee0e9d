//! `/resolve`: target name to coordinates.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use sky_core::{Coordinates, Status};

use super::paired;
use crate::entity::{Entity, Fetchable, Validatable};

#[derive(Debug, Clone, Default, Serialize)]
pub struct Resolve {
    pub name: String,
    pub ra: Option<f64>,
    pub dec: Option<f64>,
    /// Which catalog service answered.
    pub resolver: Option<String>,
    pub status: Status,
}

#[derive(Debug, Serialize)]
pub struct ResolveParams {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ResolveResponse {
    #[serde(default)]
    pub ra: Option<f64>,
    #[serde(default)]
    pub dec: Option<f64>,
    #[serde(default)]
    pub resolver: Option<String>,
    #[serde(default)]
    pub status: Option<Status>,
}

impl Resolve {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn coordinates(&self) -> Option<Coordinates> {
        paired(self.ra, self.dec)
    }
}

impl Fetchable for Resolve {
    const NAME: &'static str = "Resolve";
    const ENDPOINT: &'static str = "/resolve";

    type Query = ResolveParams;
    type Response = ResolveResponse;

    fn status(&self) -> &Status {
        &self.status
    }

    fn status_mut(&mut self) -> &mut Status {
        &mut self.status
    }

    fn query(&self) -> ResolveParams {
        ResolveParams {
            name: self.name.trim().to_string(),
        }
    }

    fn populate(&mut self, response: ResolveResponse) -> Option<Status> {
        self.ra = response.ra;
        self.dec = response.dec;
        self.resolver = response.resolver;
        response.status
    }
}

impl Validatable for Resolve {
    fn validate(&mut self) -> Vec<String> {
        if self.name.trim().is_empty() {
            vec!["Name must be provided.".to_string()]
        } else {
            Vec::new()
        }
    }
}

impl Entity for Resolve {}
