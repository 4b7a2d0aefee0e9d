//! # sky-config
//!
//! Layered configuration loading for skyplan using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`SKY_*` prefix, `__` as separator)
//! 2. Project-level `.skyplan/config.toml`
//! 3. User-level `~/.config/skyplan/config.toml`
//! 4. Built-in defaults
//!
//! # Environment Variable Mapping
//!
//! Figment maps `SKY_API__BASE_URL` -> `api.base_url`, `SKY_DOWNLOAD__CLOBBER`
//! -> `download.clobber`, etc.
//!
//! # Usage
//!
//! ```no_run
//! use sky_config::SkyConfig;
//!
//! let config = SkyConfig::load_with_dotenv().expect("config");
//! println!("service: {}", config.api.base_url);
//! ```

mod api;
mod download;
mod error;

pub use api::{ANONYMOUS, ApiConfig};
pub use download::DownloadConfig;
pub use error::ConfigError;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SkyConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub download: DownloadConfig,
}

impl SkyConfig {
    /// Load configuration from all sources (TOML files + environment variables).
    ///
    /// Does NOT call `dotenvy`; use [`Self::load_with_dotenv`] for `.env` support.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Figment`] when a source cannot be parsed, and
    /// [`ConfigError::InvalidValue`] when the merged values are unusable.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_figment(&Self::figment())
    }

    /// Load configuration with `.env` file support.
    ///
    /// # Errors
    ///
    /// Same as [`Self::load`].
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        Self::load_dotenv_from_workspace();
        Self::load()
    }

    /// Extract and validate a configuration from an arbitrary figment.
    ///
    /// # Errors
    ///
    /// Same as [`Self::load`].
    pub fn from_figment(figment: &Figment) -> Result<Self, ConfigError> {
        let config: Self = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Build the figment provider chain.
    pub fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                figment = figment.merge(Toml::file(global_path));
            }
        }

        let local_path = PathBuf::from(".skyplan/config.toml");
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        figment.merge(Env::prefixed("SKY_").split("__"))
    }

    /// Check cross-field constraints figment cannot express.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let base_url = &self.api.base_url;
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ConfigError::InvalidValue {
                field: "api.base_url".to_string(),
                reason: format!("'{base_url}' is not an http(s) URL"),
            });
        }
        if self.api.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "api.timeout_secs".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }

    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("skyplan").join("config.toml"))
    }

    /// Load `.env` from the workspace root, falling back to the current
    /// directory. Silently does nothing if no `.env` is found.
    fn load_dotenv_from_workspace() {
        if let Ok(manifest_dir) = std::env::var("CARGO_MANIFEST_DIR") {
            let mut dir = PathBuf::from(manifest_dir);
            // crate -> crates/ -> workspace root
            for _ in 0..3 {
                let env_path = dir.join(".env");
                if env_path.exists() {
                    let _ = dotenvy::from_path(&env_path);
                    return;
                }
                if !dir.pop() {
                    break;
                }
            }
        }

        let _ = dotenvy::dotenv();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn default_config_is_valid() {
        let config = SkyConfig::default();
        assert!(config.validate().is_ok());
        assert!(config.api.is_anonymous());
        assert!(!config.download.clobber);
    }

    #[test]
    fn figment_builds_without_files() {
        let config: SkyConfig = SkyConfig::figment()
            .extract()
            .expect("should extract defaults");
        assert_eq!(config.api.timeout_secs, 120);
        assert_eq!(config.api.keyring_service, "skyplan");
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let mut config = SkyConfig::default();
        config.api.timeout_secs = 0;
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref field, .. } if field == "api.timeout_secs"));
    }
}
