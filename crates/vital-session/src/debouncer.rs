//! Throttled on-screen warnings and the movement burst counter.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// The warning currently on screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Warning {
    pub message: String,
    #[serde(skip)]
    pub ttl: Duration,
}

/// Shows at most one warning at a time and clears it after its TTL.
///
/// A new warning replaces the current one and reschedules the clear. The burst
/// counter is separate: [`WarningDebouncer::register_burst`] reports how many
/// warnings arrived back-to-back and leaves the restart decision to the caller.
pub struct WarningDebouncer {
    current: Arc<watch::Sender<Option<Warning>>>,
    clear_task: Option<JoinHandle<()>>,
    warning_count: u32,
    last_warning_at: Option<Instant>,
    burst_window: Duration,
}

impl WarningDebouncer {
    #[must_use]
    pub fn new(current: Arc<watch::Sender<Option<Warning>>>, burst_window: Duration) -> Self {
        Self {
            current,
            clear_task: None,
            warning_count: 0,
            last_warning_at: None,
            burst_window,
        }
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Option<Warning>> {
        self.current.subscribe()
    }

    /// Display `message` for `ttl`, replacing any warning already on screen.
    pub fn show(&mut self, message: &str, ttl: Duration) {
        if let Some(task) = self.clear_task.take() {
            task.abort();
        }
        self.current.send_replace(Some(Warning {
            message: message.to_string(),
            ttl,
        }));

        let current = Arc::clone(&self.current);
        self.clear_task = Some(tokio::spawn(async move {
            tokio::time::sleep(ttl).await;
            current.send_replace(None);
        }));
    }

    /// Count a warning towards the current burst and return the burst length.
    ///
    /// The count restarts at 1 when more than the burst window has passed
    /// since the previous counted warning.
    pub fn register_burst(&mut self, now: Instant) -> u32 {
        self.warning_count = match self.last_warning_at {
            Some(last) if now.saturating_duration_since(last) <= self.burst_window => {
                self.warning_count.saturating_add(1)
            }
            _ => 1,
        };
        self.last_warning_at = Some(now);
        self.warning_count
    }

    /// Remove the current warning immediately.
    pub fn clear(&mut self) {
        if let Some(task) = self.clear_task.take() {
            task.abort();
        }
        self.current.send_replace(None);
    }

    #[must_use]
    pub const fn warning_count(&self) -> u32 {
        self.warning_count
    }

    #[must_use]
    pub fn current(&self) -> Option<Warning> {
        self.current.borrow().clone()
    }
}

impl Drop for WarningDebouncer {
    fn drop(&mut self) {
        if let Some(task) = self.clear_task.take() {
            task.abort();
        }
    }
}
