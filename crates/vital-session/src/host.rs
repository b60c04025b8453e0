//! The UI shell hosting a measurement screen.

use serde::{Deserialize, Serialize};
use vital_core::AuditEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationLevel {
    Success,
    Error,
}

/// A toast-style message shown outside the measurement view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub level: NotificationLevel,
    pub title: String,
    pub message: String,
}

impl Notification {
    #[must_use]
    pub fn success(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Success,
            title: title.into(),
            message: message.into(),
        }
    }

    #[must_use]
    pub fn error(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Error,
            title: title.into(),
            message: message.into(),
        }
    }
}

/// Notifications, navigation and the audit sink.
pub trait SessionHost: Send + Sync {
    fn notify(&self, notification: Notification);

    /// Leave the measurement screen once the result is saved.
    fn navigate_away(&self);

    fn audit(&self, event: AuditEvent);
}

/// Host that only logs. Audit events go to the `vitals::audit` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingHost;

impl SessionHost for TracingHost {
    fn notify(&self, notification: Notification) {
        match notification.level {
            NotificationLevel::Success => {
                tracing::info!(title = %notification.title, "{}", notification.message);
            }
            NotificationLevel::Error => {
                tracing::error!(title = %notification.title, "{}", notification.message);
            }
        }
    }

    fn navigate_away(&self) {
        tracing::info!("leaving measurement screen");
    }

    fn audit(&self, event: AuditEvent) {
        let detail = event
            .detail
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_default();
        tracing::info!(
            target: "vitals::audit",
            action = %event.action,
            user_id = event.user_id.as_deref().unwrap_or("-"),
            %detail,
            "audit"
        );
    }
}
