//! # sky-client
//!
//! Typed request entities for the observation-planning service and the
//! lifecycle that drives them:
//!
//! ```text
//! Constructed → [Resolving] → Validating → {Rejected | Fetching} → {Populated | Rejected}
//! ```
//!
//! Each entity validates its own parameters, is fetched with a single GET,
//! has the parsed response copied into it, gets its times clock corrected
//! (when it carries any and the client has correction enabled) and finally
//! runs its own post-processing hook. Problems along the way land on the
//! entity's [`Status`](sky_core::Status); `fetch` only returns `Err` for
//! misuse and invariant failures.
//!
//! ```no_run
//! use chrono::NaiveDate;
//! use sky_client::{Client, entities::SaaQuery};
//! use sky_config::SkyConfig;
//!
//! let config = SkyConfig::load().expect("config");
//! let client = Client::from_config(&config, None).expect("client");
//! let begin = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
//! let mut saa = SaaQuery::new(begin);
//! client.fetch(&mut saa).expect("fetch");
//! for passage in &saa.entries {
//!     println!("{} → {}", passage.begin, passage.end);
//! }
//! ```

pub mod download;
pub mod entities;
pub mod entity;
pub mod error;
pub mod transport;

pub use download::{DownloadReport, Downloader, HttpDownloader, destination_under, write_atomically};
pub use entity::{Entity, Fetchable, FetchOutcome, Resolvable, Resolver, Validatable};
pub use error::ClientError;
pub use transport::{HttpRequest, HttpResponse, HttpTransport, Transport};

use sky_auth::{Credentials, SecretStore};
use sky_config::{ApiConfig, SkyConfig};
use sky_core::{CoreError, CorrectionBatch, CorrectionService, Coordinates, TimeValue};
use tracing::{debug, warn};

use crate::entities::{Clock, Resolve};

// ── Client ─────────────────────────────────────────────────────────

/// Drives entities through the fetch lifecycle against one service.
pub struct Client {
    config: ApiConfig,
    credentials: Credentials,
    transport: Box<dyn Transport>,
    resolver: Option<Box<dyn Resolver + Send + Sync>>,
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("base_url", &self.config.base_url)
            .field("credentials", &self.credentials)
            .field("clock_correct", &self.config.clock_correct)
            .field("custom_resolver", &self.resolver.is_some())
            .finish_non_exhaustive()
    }
}

impl Client {
    #[must_use]
    pub fn builder(config: ApiConfig) -> ClientBuilder {
        ClientBuilder {
            config,
            credentials: None,
            transport: None,
            resolver: None,
        }
    }

    /// Build a client from loaded configuration, resolving credentials
    /// through `store` when the configured account needs a secret.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Auth`] when a named account has no secret, and
    /// [`ClientError::Http`] when the HTTP client cannot be built.
    pub fn from_config(
        config: &SkyConfig,
        store: Option<&dyn SecretStore>,
    ) -> Result<Self, ClientError> {
        let credentials = sky_auth::resolve(&config.api, store)?;
        Self::builder(config.api.clone())
            .credentials(credentials)
            .build()
    }

    #[must_use]
    pub const fn config(&self) -> &ApiConfig {
        &self.config
    }

    #[must_use]
    pub const fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Run `entity` through the whole lifecycle.
    ///
    /// Re-entrant: a second call validates and fetches again with the
    /// entity's current fields. Status messages accumulate until the caller
    /// clears them.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Query`] if the request schema cannot be put on
    /// a query string, [`ClientError::Core`] for time-graph invariant
    /// failures during clock correction, and whatever the entity's
    /// post-processing hook raises.
    pub fn fetch<E: Entity>(&self, entity: &mut E) -> Result<FetchOutcome, ClientError> {
        if let Err(error) = self.resolve_target(entity) {
            entity.status_mut().reject(error.to_string());
            return Ok(FetchOutcome::Rejected);
        }

        let violations = entity.validate();
        if !violations.is_empty() {
            debug!(entity = E::NAME, count = violations.len(), "validation failed");
            for violation in violations {
                entity.status_mut().reject(violation);
            }
            return Ok(FetchOutcome::Rejected);
        }

        let params = serde_json::to_value(entity.query())
            .map_err(|e| ClientError::Query(e.to_string()))?;
        let request = HttpRequest {
            url: self.config.endpoint_url(E::ENDPOINT),
            query: transport::query_pairs(&params)?,
            credentials: self.credentials.clone(),
        };
        debug!(entity = E::NAME, url = %request.url, params = request.query.len(), "fetching");

        let response = match self.transport.get(&request) {
            Ok(response) => response,
            Err(error) => {
                warn!(entity = E::NAME, %error, "request failed");
                entity.status_mut().reject(error.to_string());
                return Ok(FetchOutcome::Rejected);
            }
        };
        if !response.is_ok() {
            let status = entity.status_mut();
            status.http_code = Some(response.status);
            status.reject(
                ClientError::Api {
                    status: response.status,
                    message: response.body,
                }
                .to_string(),
            );
            return Ok(FetchOutcome::Rejected);
        }

        let parsed: E::Response = match serde_json::from_str(&response.body) {
            Ok(parsed) => parsed,
            Err(error) => {
                entity
                    .status_mut()
                    .reject(format!("Error validating response: {error}"));
                return Ok(FetchOutcome::Rejected);
            }
        };
        let server_status = entity.populate(parsed);
        entity.status_mut().absorb(server_status);
        if entity.status().is_rejected() {
            return Ok(FetchOutcome::Rejected);
        }

        if let Some(warning) = self.correct_entity(entity)? {
            entity.status_mut().warning(warning);
        }
        entity.post_process()?;
        Ok(FetchOutcome::Populated)
    }

    /// Like [`fetch`](Self::fetch), but a rejection becomes an error.
    ///
    /// # Errors
    ///
    /// Everything [`fetch`](Self::fetch) returns, plus
    /// [`ClientError::Rejected`] carrying the entity's error messages.
    pub fn fetch_accepted<E: Entity>(&self, entity: &mut E) -> Result<(), ClientError> {
        match self.fetch(entity)? {
            FetchOutcome::Populated => Ok(()),
            FetchOutcome::Rejected => Err(ClientError::Rejected {
                entity: E::NAME.to_string(),
                errors: entity.status().errors.clone(),
            }),
        }
    }

    fn resolve_target<E: Entity>(&self, entity: &mut E) -> Result<(), ClientError> {
        let Some(target) = entity.as_resolvable() else {
            return Ok(());
        };
        if !target.needs_resolution() {
            return Ok(());
        }
        let name = target.target_name().unwrap_or_default().to_string();
        let coordinates = match &self.resolver {
            Some(resolver) => resolver.resolve(&name)?,
            None => Resolver::resolve(self, &name)?,
        };
        debug!(%name, ra = coordinates.ra, dec = coordinates.dec, "resolved target");
        target.set_coordinates(coordinates);
        Ok(())
    }

    /// Stamp native basis and, when enabled, correct clocks. A failure of
    /// the correction service is returned as a warning message.
    fn correct_entity<E: Entity>(&self, entity: &mut E) -> Result<Option<String>, ClientError> {
        let Some(correctable) = entity.as_clock_correctable() else {
            return Ok(None);
        };
        correctable.adopt_native_basis();
        if !self.config.clock_correct {
            return Ok(None);
        }
        match correctable.correct_clocks(self) {
            Ok(()) => Ok(None),
            Err(CoreError::CorrectionFailed(reason)) => {
                warn!(entity = E::NAME, %reason, "clock correction failed");
                Ok(Some(format!("Clock correction failed: {reason}")))
            }
            Err(error) => Err(error.into()),
        }
    }
}

impl CorrectionService for Client {
    fn correct(&self, batch: &CorrectionBatch) -> Result<Vec<TimeValue>, CoreError> {
        let mut clock = Clock::from_batch(batch.clone());
        match self.fetch(&mut clock) {
            Ok(FetchOutcome::Populated) => Ok(clock.into_entries()),
            Ok(FetchOutcome::Rejected) => Err(CoreError::CorrectionFailed(
                clock.status.errors.join(" "),
            )),
            Err(error) => Err(CoreError::CorrectionFailed(error.to_string())),
        }
    }
}

/// Name resolution through the service's own `/resolve` endpoint.
impl Resolver for Client {
    fn resolve(&self, name: &str) -> Result<Coordinates, ClientError> {
        let mut resolve = Resolve::new(name);
        let outcome = self.fetch(&mut resolve)?;
        match (outcome, resolve.coordinates()) {
            (FetchOutcome::Populated, Some(coordinates)) => Ok(coordinates),
            _ => Err(ClientError::Resolve {
                name: name.to_string(),
                reason: if resolve.status.errors.is_empty() {
                    "no coordinates returned".to_string()
                } else {
                    resolve.status.errors.join(" ")
                },
            }),
        }
    }
}

// ── Builder ────────────────────────────────────────────────────────

/// Assembles a [`Client`]; anything not set falls back to configuration.
pub struct ClientBuilder {
    config: ApiConfig,
    credentials: Option<Credentials>,
    transport: Option<Box<dyn Transport>>,
    resolver: Option<Box<dyn Resolver + Send + Sync>>,
}

impl ClientBuilder {
    #[must_use]
    pub fn credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    #[must_use]
    pub fn transport(mut self, transport: impl Transport + 'static) -> Self {
        self.transport = Some(Box::new(transport));
        self
    }

    /// Resolve target names with `resolver` instead of the service.
    #[must_use]
    pub fn resolver(mut self, resolver: impl Resolver + Send + Sync + 'static) -> Self {
        self.resolver = Some(Box::new(resolver));
        self
    }

    #[must_use]
    pub const fn clock_correct(mut self, enabled: bool) -> Self {
        self.config.clock_correct = enabled;
        self
    }

    /// # Errors
    ///
    /// Returns [`ClientError::Http`] when no transport was supplied and the
    /// default HTTP transport cannot be built.
    pub fn build(self) -> Result<Client, ClientError> {
        let transport = match self.transport {
            Some(transport) => transport,
            None => Box::new(HttpTransport::new(self.config.timeout())?),
        };
        Ok(Client {
            credentials: self.credentials.unwrap_or_default(),
            config: self.config,
            transport,
            resolver: self.resolver,
        })
    }
}
