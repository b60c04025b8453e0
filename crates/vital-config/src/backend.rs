//! Persistence backend configuration.

use serde::{Deserialize, Serialize};

const fn default_timeout_secs() -> u64 {
    15
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BackendConfig {
    /// Base URL of the persistence service; records are posted to `{base_url}/measurements`.
    #[serde(default)]
    pub base_url: String,

    /// Bearer token for the persistence service, if it requires one.
    #[serde(default)]
    pub api_token: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            api_token: String::new(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl BackendConfig {
    #[must_use]
    pub fn is_configured(&self) -> bool {
        !self.base_url.is_empty()
    }

    #[must_use]
    pub fn measurements_url(&self) -> String {
        format!("{}/measurements", self.base_url.trim_end_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_not_configured() {
        let config = BackendConfig::default();
        assert!(!config.is_configured());
        assert_eq!(config.timeout_secs, 15);
    }

    #[test]
    fn measurements_url_strips_trailing_slash() {
        let config = BackendConfig {
            base_url: "https://portal.test/api/".into(),
            ..Default::default()
        };
        assert_eq!(config.measurements_url(), "https://portal.test/api/measurements");
    }
}
