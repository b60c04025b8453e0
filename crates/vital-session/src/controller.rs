//! The measurement session state machine.
//!
//! One [`SessionController`] drives one engine instance from bootstrap to a
//! terminal phase. Vendor events arrive on a single channel and are handled
//! strictly one at a time, so the guard flags need no locking; they exist
//! because the engine legitimately calls back after the session has ended.
//!
//! A restart never rewinds a controller: it tears the engine down and exits
//! with [`ControllerExit::Restart`], and the screen builds a fresh one.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tokio::sync::{mpsc, watch};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use vital_core::{AuditAction, AuditEvent, BlockedDetail, Phase, RestartDetail};

use crate::adapter::SdkAdapter;
use crate::bootstrap::{Bootstrapped, SessionDeps, bootstrap};
use crate::classifier::{Disposition, ErrorDialog, WarningSpec, classify, incomplete_measurement};
use crate::debouncer::{Warning, WarningDebouncer};
use crate::error::BootstrapError;
use crate::event::{ErrorEvent, LifecycleEvent, MEASUREMENT_STARTED, ResultEvent, VendorEvent};
use crate::mapper::map_points;
use crate::persister::{PersistOutcome, ResultPersister};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Completion {
    Saved { measurement_id: String },
    SaveFailed { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "phase", content = "detail", rename_all = "snake_case")]
pub enum SessionPhase {
    Idle,
    Initializing,
    Active,
    Error(ErrorDialog),
    Completed(Completion),
}

impl SessionPhase {
    #[must_use]
    pub const fn kind(&self) -> Phase {
        match self {
            Self::Idle => Phase::Idle,
            Self::Initializing => Phase::Initializing,
            Self::Active => Phase::Active,
            Self::Error(_) => Phase::Error,
            Self::Completed(_) => Phase::Completed,
        }
    }

    /// The dialog on screen, if any.
    #[must_use]
    pub const fn dialog(&self) -> Option<&ErrorDialog> {
        match self {
            Self::Error(dialog) => Some(dialog),
            _ => None,
        }
    }

    /// A retry action is offered only from a recoverable error.
    #[must_use]
    pub const fn can_retry(&self) -> bool {
        matches!(self, Self::Error(dialog) if dialog.recoverable)
    }
}

/// Published after every state change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSnapshot {
    pub phase: SessionPhase,
    pub has_result: bool,
    pub is_redirecting: bool,
    pub is_restarting: bool,
    pub measurement_started: bool,
    pub warning_count: u32,
}

impl Default for SessionSnapshot {
    fn default() -> Self {
        Self {
            phase: SessionPhase::Idle,
            has_result: false,
            is_redirecting: false,
            is_restarting: false,
            measurement_started: false,
            warning_count: 0,
        }
    }
}

/// Watch channels shared by every controller of one screen.
#[derive(Clone)]
pub struct SessionChannels {
    pub snapshot: Arc<watch::Sender<SessionSnapshot>>,
    pub warning: Arc<watch::Sender<Option<Warning>>>,
}

impl Default for SessionChannels {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionChannels {
    #[must_use]
    pub fn new() -> Self {
        let (snapshot, _) = watch::channel(SessionSnapshot::default());
        let (warning, _) = watch::channel(None);
        Self {
            snapshot: Arc::new(snapshot),
            warning: Arc::new(warning),
        }
    }

    #[must_use]
    pub fn snapshots(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshot.subscribe()
    }

    #[must_use]
    pub fn warnings(&self) -> watch::Receiver<Option<Warning>> {
        self.warning.subscribe()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserCommand {
    Retry,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControllerExit {
    /// Engine torn down; build a fresh controller.
    Restart { reason: String },
    /// Result saved and the host navigated away.
    Completed,
    /// The screen was left.
    Disposed,
}

#[derive(Debug)]
struct SessionState {
    phase: SessionPhase,
    has_result: bool,
    is_redirecting: bool,
    is_restarting: bool,
    measurement_started: bool,
}

enum Step {
    Unmount,
    Event(VendorEvent),
    EngineGone,
    Command(UserCommand),
    CommandsClosed,
    Timeout,
}

pub struct SessionController {
    deps: SessionDeps,
    channels: SessionChannels,
    cancel: CancellationToken,
    state: SessionState,
    debouncer: WarningDebouncer,
    persister: ResultPersister,
    burst_limit: u32,
    adapter: Option<SdkAdapter>,
    events: Option<mpsc::UnboundedReceiver<VendorEvent>>,
    deadline: Option<Instant>,
    pending_exit: Option<ControllerExit>,
}

impl SessionController {
    #[must_use]
    pub fn new(deps: SessionDeps, channels: SessionChannels, cancel: CancellationToken) -> Self {
        let session = &deps.config.session;
        let debouncer =
            WarningDebouncer::new(Arc::clone(&channels.warning), session.warning_burst_window());
        let persister = ResultPersister::new(
            Arc::clone(&deps.store),
            Arc::clone(&deps.host),
            session.redirect_delay(),
        );
        let burst_limit = session.warning_burst_limit.max(1);

        let mut controller = Self {
            deps,
            channels,
            cancel,
            state: SessionState {
                phase: SessionPhase::Idle,
                has_result: false,
                is_redirecting: false,
                is_restarting: false,
                measurement_started: false,
            },
            debouncer,
            persister,
            burst_limit,
            adapter: None,
            events: None,
            deadline: None,
            pending_exit: None,
        };
        controller.debouncer.clear();
        controller.publish();
        controller
    }

    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            phase: self.state.phase.clone(),
            has_result: self.state.has_result,
            is_redirecting: self.state.is_redirecting,
            is_restarting: self.state.is_restarting,
            measurement_started: self.state.measurement_started,
            warning_count: self.debouncer.warning_count(),
        }
    }

    #[must_use]
    pub const fn phase(&self) -> &SessionPhase {
        &self.state.phase
    }

    /// Exit decided by the last handled event, if any.
    #[must_use]
    pub const fn pending_exit(&self) -> Option<&ControllerExit> {
        self.pending_exit.as_ref()
    }

    /// Run until the session exits: bootstrap, then the event loop.
    pub async fn run(mut self, commands: &mut mpsc::UnboundedReceiver<UserCommand>) -> ControllerExit {
        self.start().await;

        let mut commands_open = true;
        loop {
            if let Some(exit) = self.pending_exit.take() {
                self.dispose().await;
                return exit;
            }

            let deadline = self.deadline;
            let step = tokio::select! {
                biased;
                () = self.cancel.cancelled() => Step::Unmount,
                event = next_event(&mut self.events) => event.map_or(Step::EngineGone, Step::Event),
                command = commands.recv(), if commands_open => {
                    command.map_or(Step::CommandsClosed, Step::Command)
                }
                () = tokio::time::sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    Step::Timeout
                }
            };

            match step {
                Step::Unmount => {
                    self.dispose().await;
                    return ControllerExit::Disposed;
                }
                Step::Event(event) => self.handle_event(event).await,
                Step::EngineGone => {
                    tracing::debug!("engine event channel closed");
                    self.events = None;
                }
                Step::Command(UserCommand::Retry) => {
                    self.retry().await;
                }
                Step::CommandsClosed => commands_open = false,
                Step::Timeout => self.on_timeout().await,
            }
        }
    }

    /// Bootstrap the engine. Failures end in a non-recoverable dialog;
    /// cancellation ends silently.
    pub async fn start(&mut self) {
        if !self.set_phase(SessionPhase::Initializing) {
            return;
        }

        match bootstrap(&self.deps, &self.cancel).await {
            Ok(Bootstrapped { adapter, events }) => {
                self.adapter = Some(adapter);
                self.events = Some(events);
                self.set_phase(SessionPhase::Active);
                self.deadline = self
                    .deps
                    .config
                    .session
                    .measurement_timeout()
                    .map(|timeout| Instant::now() + timeout);
                self.audit(AuditEvent::new(AuditAction::SessionStarted, self.user_id()));
            }
            Err(BootstrapError::Canceled) => {
                tracing::debug!("bootstrap canceled, screen left");
            }
            Err(error) => {
                tracing::error!(%error, "measurement bootstrap failed");
                self.enter_error(
                    ErrorDialog::fatal_bootstrap(error.to_string()),
                    AuditAction::BootstrapFailed,
                );
            }
        }
    }

    /// Dispatch one vendor event. Events after a terminal phase are dropped.
    pub async fn handle_event(&mut self, event: VendorEvent) {
        if self.state.phase.kind().is_terminal() {
            tracing::debug!(
                kind = event.kind(),
                phase = %self.state.phase.kind(),
                "vendor event after terminal phase dropped"
            );
            return;
        }
        match event {
            VendorEvent::Result(result) => self.on_vendor_result(result).await,
            VendorEvent::Error(error) => self.on_vendor_error(error).await,
            VendorEvent::Lifecycle(lifecycle) => self.on_lifecycle(&lifecycle),
        }
    }

    pub async fn on_vendor_result(&mut self, event: ResultEvent) {
        if self.state.has_result || self.state.is_redirecting {
            tracing::debug!(status_id = %event.status_id, "result after session end ignored");
            return;
        }

        if event.is_partial() || event.liveness_error.is_some() {
            tracing::warn!(
                status_id = %event.status_id,
                liveness_error = ?event.liveness_error,
                "incomplete measurement"
            );
            self.freeze().await;
            self.enter_error(incomplete_measurement(), AuditAction::MeasurementBlocked);
            return;
        }

        self.state.has_result = true;
        self.state.is_redirecting = true;
        self.deadline = None;
        self.debouncer.clear();
        self.publish();

        let record = map_points(&event.points, &self.deps.identity.user_id, Utc::now());
        tracing::info!(
            metrics = record.populated_metrics(),
            user_id = %record.user_id,
            "measurement result mapped"
        );

        let outcome = self.persister.persist(&record, &self.cancel).await;
        self.audit(
            AuditEvent::new(AuditAction::MeasurementCompleted, self.user_id())
                .with_detail(&serde_json::json!({ "status_id": event.status_id })),
        );

        match outcome {
            PersistOutcome::Saved { measurement_id } => {
                self.set_phase(SessionPhase::Completed(Completion::Saved { measurement_id }));
                self.teardown().await;
                self.pending_exit = Some(ControllerExit::Completed);
            }
            PersistOutcome::Failed { reason } => {
                self.freeze().await;
                self.set_phase(SessionPhase::Completed(Completion::SaveFailed { reason }));
            }
        }
    }

    pub async fn on_vendor_error(&mut self, event: ErrorEvent) {
        if self.state.has_result || self.state.is_redirecting {
            tracing::debug!(code = %event.code, "error after session end ignored");
            return;
        }

        let Some(disposition) = classify(&event) else {
            tracing::debug!("empty vendor error ignored");
            return;
        };
        tracing::debug!(
            code = %event.code,
            disposition = disposition.name(),
            "vendor error classified"
        );

        match disposition {
            Disposition::TechnicalReconnect(warning) => {
                if self.state.measurement_started {
                    self.show(warning);
                } else {
                    tracing::debug!(message = %event.message, "connection noise before measurement start");
                }
            }
            Disposition::TransientWarning(warning) => self.show(warning),
            Disposition::DebouncedWarning(warning) => {
                self.show(warning);
                let count = self.debouncer.register_burst(Instant::now());
                self.publish();
                if count >= self.burst_limit {
                    tracing::warn!(warning_count = count, "warning burst, restarting session");
                    self.request_restart("repeated movement warnings").await;
                }
            }
            Disposition::BlockingError(dialog) => {
                tracing::warn!(code = ?dialog.code, recoverable = dialog.recoverable, "blocking vendor error");
                self.freeze().await;
                self.enter_error(dialog, AuditAction::MeasurementBlocked);
            }
            Disposition::SilentRestart => {
                self.request_restart(&format!("engine reported {}", event.code)).await;
            }
        }
    }

    pub fn on_lifecycle(&mut self, event: &LifecycleEvent) {
        if event.name == MEASUREMENT_STARTED {
            if !self.state.measurement_started {
                tracing::info!("measurement started");
                self.state.measurement_started = true;
                self.publish();
            }
        } else {
            tracing::debug!(name = %event.name, "lifecycle event");
        }
    }

    /// User retry from a recoverable error. Returns whether a restart began.
    pub async fn retry(&mut self) -> bool {
        if !self.state.phase.can_retry() {
            tracing::debug!(phase = %self.state.phase.kind(), "retry not available");
            return false;
        }
        self.request_restart("user retry").await
    }

    /// Tear the engine down and exit with [`ControllerExit::Restart`].
    ///
    /// A second request while one is in progress is a no-op.
    pub async fn request_restart(&mut self, reason: &str) -> bool {
        if self.state.is_restarting {
            tracing::debug!(reason, "restart already in progress");
            return false;
        }
        self.state.is_restarting = true;
        self.deadline = None;
        self.publish();

        tracing::info!(reason, "restarting measurement session");
        self.audit(
            AuditEvent::new(AuditAction::SessionRestarted, self.user_id()).with_detail(
                &RestartDetail {
                    reason: reason.to_string(),
                },
            ),
        );
        self.teardown().await;
        self.pending_exit = Some(ControllerExit::Restart {
            reason: reason.to_string(),
        });
        true
    }

    /// Unconditional teardown on unmount. Idempotent.
    pub async fn dispose(&mut self) {
        self.teardown().await;
        self.deadline = None;
        self.debouncer.clear();
    }

    async fn on_timeout(&mut self) {
        self.deadline = None;
        if self.state.phase != SessionPhase::Active || self.state.has_result {
            return;
        }
        tracing::warn!("measurement timed out");
        self.freeze().await;
        self.enter_error(ErrorDialog::timed_out(), AuditAction::MeasurementTimedOut);
    }

    /// Detach callbacks first, then destroy the engine.
    async fn teardown(&mut self) {
        if let Some(mut adapter) = self.adapter.take() {
            adapter.detach();
            adapter.destroy().await;
        }
        self.events = None;
    }

    async fn freeze(&mut self) {
        if let Some(adapter) = self.adapter.as_mut()
            && let Err(error) = adapter.freeze().await
        {
            tracing::warn!(%error, "engine freeze failed");
        }
    }

    fn show(&mut self, warning: WarningSpec) {
        self.debouncer.show(warning.message, warning.ttl);
    }

    fn enter_error(&mut self, dialog: ErrorDialog, action: AuditAction) {
        let detail = BlockedDetail {
            code: dialog.code.clone(),
            title: dialog.title.clone(),
            message: dialog.message.clone(),
            recoverable: dialog.recoverable,
        };
        if self.set_phase(SessionPhase::Error(dialog)) {
            self.deadline = None;
            self.debouncer.clear();
            self.audit(AuditEvent::new(action, self.user_id()).with_detail(&detail));
        }
    }

    fn set_phase(&mut self, next: SessionPhase) -> bool {
        let from = self.state.phase.kind();
        if let Err(error) = from.transition(next.kind()) {
            tracing::warn!(%error, "phase transition rejected");
            return false;
        }
        tracing::info!(from = %from, to = %next.kind(), "session phase changed");
        self.state.phase = next;
        self.publish();
        true
    }

    fn publish(&self) {
        self.channels.snapshot.send_replace(self.snapshot());
    }

    fn audit(&self, event: AuditEvent) {
        self.deps.host.audit(event);
    }

    fn user_id(&self) -> Option<String> {
        Some(self.deps.identity.user_id.clone())
    }
}

async fn next_event(events: &mut Option<mpsc::UnboundedReceiver<VendorEvent>>) -> Option<VendorEvent> {
    match events {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}
