//! Session controller tuning.

use serde::{Deserialize, Serialize};
use std::time::Duration;

const fn default_measurement_timeout_secs() -> u64 {
    180
}

const fn default_redirect_delay_ms() -> u64 {
    2000
}

const fn default_burst_window_ms() -> u64 {
    2000
}

const fn default_burst_limit() -> u32 {
    5
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SessionConfig {
    /// Upper bound on an active measurement. `0` disables the timeout.
    #[serde(default = "default_measurement_timeout_secs")]
    pub measurement_timeout_secs: u64,

    /// Pause between the save confirmation and navigating away.
    #[serde(default = "default_redirect_delay_ms")]
    pub redirect_delay_ms: u64,

    /// Movement warnings closer together than this count as one burst.
    #[serde(default = "default_burst_window_ms")]
    pub warning_burst_window_ms: u64,

    /// Burst length that escalates into a full restart.
    #[serde(default = "default_burst_limit")]
    pub warning_burst_limit: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            measurement_timeout_secs: default_measurement_timeout_secs(),
            redirect_delay_ms: default_redirect_delay_ms(),
            warning_burst_window_ms: default_burst_window_ms(),
            warning_burst_limit: default_burst_limit(),
        }
    }
}

impl SessionConfig {
    #[must_use]
    pub const fn measurement_timeout(&self) -> Option<Duration> {
        if self.measurement_timeout_secs == 0 {
            None
        } else {
            Some(Duration::from_secs(self.measurement_timeout_secs))
        }
    }

    #[must_use]
    pub const fn redirect_delay(&self) -> Duration {
        Duration::from_millis(self.redirect_delay_ms)
    }

    #[must_use]
    pub const fn warning_burst_window(&self) -> Duration {
        Duration::from_millis(self.warning_burst_window_ms)
    }
}
