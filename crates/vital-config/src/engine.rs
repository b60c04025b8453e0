//! Measurement engine settings passed through to the vendor `init` call.

use serde::{Deserialize, Serialize};

fn default_app_path() -> String {
    String::from("/vendor/measurement")
}

fn default_facing_mode() -> String {
    String::from("user")
}

const fn enabled() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EngineConfig {
    /// Distribution path the vendor module is loaded from.
    #[serde(default = "default_app_path")]
    pub app_path: String,

    #[serde(default = "default_facing_mode")]
    pub camera_facing_mode: String,

    #[serde(default = "enabled")]
    pub camera_auto_start: bool,

    /// The controller starts measuring explicitly, so this stays off by default.
    #[serde(default)]
    pub measurement_auto_start: bool,

    #[serde(default = "enabled")]
    pub check_constraints: bool,

    /// Low SNR is surfaced as a transient warning instead of cancelling.
    #[serde(default)]
    pub cancel_when_low_snr: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            app_path: default_app_path(),
            camera_facing_mode: default_facing_mode(),
            camera_auto_start: true,
            measurement_auto_start: false,
            check_constraints: true,
            cancel_when_low_snr: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_engine_contract() {
        let config = EngineConfig::default();
        assert_eq!(config.camera_facing_mode, "user");
        assert!(config.camera_auto_start);
        assert!(!config.measurement_auto_start);
        assert!(config.check_constraints);
        assert!(!config.cancel_when_low_snr);
    }
}
