//! Events delivered by the vendor engine.
//!
//! Consumed immediately by the controller and never stored. The serde shape is
//! the one used by replay scripts:
//!
//! ```text
//! {"type":"lifecycle","name":"MEASUREMENT_STARTED"}
//! {"type":"error","code":"MEASUREMENT_LOW_SNR","message":"low snr"}
//! {"type":"result","status_id":"SUCCESS","points":{"HR_BPM":{"value":72}}}
//! ```

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Lifecycle event fired once the engine begins collecting frames.
pub const MEASUREMENT_STARTED: &str = "MEASUREMENT_STARTED";

/// Result status the engine reports for an incomplete measurement.
pub const STATUS_PARTIAL: &str = "PARTIAL";

/// One vendor point, as found in the result bag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Point {
    #[serde(default)]
    pub value: serde_json::Value,
}

impl Point {
    #[must_use]
    pub fn new(value: impl Into<serde_json::Value>) -> Self {
        Self {
            value: value.into(),
        }
    }
}

/// Sparse key-value bag of vendor points.
pub type Points = HashMap<String, Point>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultEvent {
    pub status_id: String,
    #[serde(default)]
    pub points: Points,
    /// Set when the subject failed the vendor's anti-spoofing check.
    #[serde(default)]
    pub liveness_error: Option<String>,
}

impl ResultEvent {
    #[must_use]
    pub fn is_partial(&self) -> bool {
        self.status_id == STATUS_PARTIAL
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEvent {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub message: String,
}

impl ErrorEvent {
    #[must_use]
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }

    /// No code and no message: nothing to classify.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.code.trim().is_empty() && self.message.trim().is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LifecycleEvent {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum VendorEvent {
    Result(ResultEvent),
    Error(ErrorEvent),
    Lifecycle(LifecycleEvent),
}

impl VendorEvent {
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Result(_) => "result",
            Self::Error(_) => "error",
            Self::Lifecycle(_) => "lifecycle",
        }
    }
}
