//! Audit entries emitted along the measurement lifecycle.
//!
//! Each action can carry a structured `detail` blob; the typed detail structs
//! below cover the shapes the session controller produces.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    SessionStarted,
    BootstrapFailed,
    MeasurementBlocked,
    MeasurementTimedOut,
    SessionRestarted,
    MeasurementCompleted,
    MeasurementSaved,
    MeasurementSaveFailed,
}

impl AuditAction {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SessionStarted => "session_started",
            Self::BootstrapFailed => "bootstrap_failed",
            Self::MeasurementBlocked => "measurement_blocked",
            Self::MeasurementTimedOut => "measurement_timed_out",
            Self::SessionRestarted => "session_restarted",
            Self::MeasurementCompleted => "measurement_completed",
            Self::MeasurementSaved => "measurement_saved",
            Self::MeasurementSaveFailed => "measurement_save_failed",
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One append-only audit event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AuditEvent {
    pub action: AuditAction,
    pub user_id: Option<String>,
    pub detail: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

impl AuditEvent {
    #[must_use]
    pub fn new(action: AuditAction, user_id: Option<String>) -> Self {
        Self {
            action,
            user_id,
            detail: None,
            created_at: Utc::now(),
        }
    }

    /// Attach a typed detail payload. Serialization failures leave `detail` empty.
    #[must_use]
    pub fn with_detail<T: Serialize>(mut self, detail: &T) -> Self {
        self.detail = serde_json::to_value(detail).ok();
        self
    }
}

/// Detail for [`AuditAction::MeasurementBlocked`] and [`AuditAction::BootstrapFailed`].
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct BlockedDetail {
    pub code: Option<String>,
    pub title: String,
    pub message: String,
    pub recoverable: bool,
}

/// Detail for [`AuditAction::MeasurementSaved`].
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct SavedDetail {
    pub measurement_id: String,
}

/// Detail for [`AuditAction::MeasurementSaveFailed`].
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct SaveFailedDetail {
    pub reason: String,
}

/// Detail for [`AuditAction::SessionRestarted`].
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct RestartDetail {
    pub reason: String,
}
