//! Vendor API credentials used for token acquisition and engine settings.

use serde::{Deserialize, Serialize};

use crate::ConfigError;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ApiConfig {
    /// Vendor API host, without scheme (e.g. `api.vendor.example`).
    #[serde(default)]
    pub host: String,

    /// License key sent to the token endpoint.
    #[serde(default)]
    pub license_key: String,

    /// Study identifier, sent to the token endpoint and the engine settings.
    #[serde(default)]
    pub study_id: String,
}

impl ApiConfig {
    /// Check if all three required fields are set.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.missing_fields().is_empty()
    }

    /// Names of the required fields that are empty.
    #[must_use]
    pub fn missing_fields(&self) -> Vec<String> {
        [
            ("host", &self.host),
            ("license_key", &self.license_key),
            ("study_id", &self.study_id),
        ]
        .into_iter()
        .filter(|(_, value)| value.is_empty())
        .map(|(name, _)| name.to_string())
        .collect()
    }

    /// Return `self` if configured, otherwise a `NotConfigured` error.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NotConfigured` if any required field is empty, or
    /// `ConfigError::InvalidValue` if the host carries a URL scheme.
    pub fn require(&self) -> Result<&Self, ConfigError> {
        let missing = self.missing_fields();
        if !missing.is_empty() {
            return Err(ConfigError::NotConfigured {
                section: "api".into(),
                missing,
            });
        }
        if self.host.contains("://") {
            return Err(ConfigError::InvalidValue {
                field: "api.host".into(),
                reason: "expected a bare host name without scheme".into(),
            });
        }
        Ok(self)
    }

    /// Token endpoint URL derived from the host.
    #[must_use]
    pub fn token_url(&self) -> String {
        format!("https://{}/v2/auth/token", self.host.trim_end_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn configured() -> ApiConfig {
        ApiConfig {
            host: "api.vendor.test".into(),
            license_key: "lic-123".into(),
            study_id: "study-9".into(),
        }
    }

    #[test]
    fn default_is_not_configured() {
        assert!(!ApiConfig::default().is_configured());
        assert!(matches!(
            ApiConfig::default().require(),
            Err(ConfigError::NotConfigured { .. })
        ));
    }

    #[test]
    fn not_configured_without_study() {
        let config = ApiConfig {
            study_id: String::new(),
            ..configured()
        };
        assert!(!config.is_configured());
    }

    #[test]
    fn missing_fields_are_named_in_error() {
        let config = ApiConfig {
            license_key: String::new(),
            study_id: String::new(),
            ..configured()
        };
        assert_eq!(config.missing_fields(), vec!["license_key", "study_id"]);

        let message = config.require().unwrap_err().to_string();
        assert_eq!(
            message,
            "[api] is missing license_key, study_id; set it in .vitals/config.toml or as VITALS_API__<FIELD>"
        );
    }

    #[test]
    fn host_with_scheme_is_rejected() {
        let config = ApiConfig {
            host: "https://api.vendor.test".into(),
            ..configured()
        };
        let err = config.require().unwrap_err();
        assert!(err.to_string().contains("api.host"));
    }

    #[test]
    fn token_url_uses_v2_path() {
        assert_eq!(
            configured().token_url(),
            "https://api.vendor.test/v2/auth/token"
        );
    }
}
