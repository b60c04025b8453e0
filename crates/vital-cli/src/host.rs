use vital_core::AuditEvent;
use vital_session::{Notification, NotificationLevel, SessionHost, TracingHost};

/// Prints notifications to stderr; audit and navigation go to tracing.
pub struct ConsoleHost {
    quiet: bool,
}

impl ConsoleHost {
    pub const fn new(quiet: bool) -> Self {
        Self { quiet }
    }
}

impl SessionHost for ConsoleHost {
    fn notify(&self, notification: Notification) {
        if self.quiet {
            return;
        }
        let tag = match notification.level {
            NotificationLevel::Success => "ok",
            NotificationLevel::Error => "error",
        };
        eprintln!("[{tag}] {}: {}", notification.title, notification.message);
    }

    fn navigate_away(&self) {
        TracingHost.navigate_away();
    }

    fn audit(&self, event: AuditEvent) {
        TracingHost.audit(event);
    }
}
