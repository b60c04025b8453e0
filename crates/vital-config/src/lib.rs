//! # vital-config
//!
//! Layered configuration loading for the vitals session using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`VITALS_*` prefix, `__` as separator)
//! 2. Project-level `.vitals/config.toml`
//! 3. User-level `~/.config/vitals/config.toml`
//! 4. Built-in defaults
//!
//! # Environment Variable Mapping
//!
//! Figment maps `VITALS_API__LICENSE_KEY` -> `api.license_key`,
//! `VITALS_SESSION__MEASUREMENT_TIMEOUT_SECS` -> `session.measurement_timeout_secs`, etc.
//!
//! # Usage
//!
//! ```no_run
//! use vital_config::VitalsConfig;
//!
//! let config = VitalsConfig::load_with_dotenv().expect("config");
//! if config.api.is_configured() {
//!     println!("token endpoint: {}", config.api.token_url());
//! }
//! ```

mod api;
mod backend;
mod engine;
mod error;
mod session;
mod storage;

pub use api::ApiConfig;
pub use backend::BackendConfig;
pub use engine::EngineConfig;
pub use error::ConfigError;
pub use session::SessionConfig;
pub use storage::StorageConfig;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct VitalsConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

impl VitalsConfig {
    /// Load configuration from all sources (TOML files + environment variables).
    ///
    /// Does NOT call `dotenvy` -- use [`Self::load_with_dotenv`] for `.env` loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Figment` if a source fails to parse or extract.
    pub fn load() -> Result<Self, ConfigError> {
        Self::figment().extract().map_err(ConfigError::from)
    }

    /// Load configuration after reading `.env` from the current directory.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Figment` if a source fails to parse or extract.
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::load()
    }

    /// Build the figment provider chain.
    ///
    /// Public so tests can inspect the figment or layer extra providers.
    #[must_use]
    pub fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Layer 1: User-global config
        if let Some(global_path) = Self::global_config_path()
            && global_path.exists()
        {
            figment = figment.merge(Toml::file(global_path));
        }

        // Layer 2: Project-local config
        let local_path = PathBuf::from(".vitals/config.toml");
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        // Layer 3: Environment variables (highest priority)
        figment.merge(Env::prefixed("VITALS_").split("__"))
    }

    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("vitals").join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_loads() {
        let config = VitalsConfig::default();
        assert!(!config.api.is_configured());
        assert!(!config.backend.is_configured());
        assert_eq!(config.engine.app_path, "/vendor/measurement");
        assert_eq!(config.session.warning_burst_limit, 5);
    }

    #[test]
    fn figment_builds_without_files() {
        figment::Jail::expect_with(|_jail| {
            let config: VitalsConfig = VitalsConfig::figment().extract()?;
            assert!(!config.api.is_configured());
            assert_eq!(config.session.redirect_delay_ms, 2000);
            Ok(())
        });
    }
}
