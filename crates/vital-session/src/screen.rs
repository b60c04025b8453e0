//! Lifetime of one mounted measurement screen.
//!
//! The screen owns a sequence of controllers. Each restart discards the
//! current controller, whose engine has already been destroyed, and builds a
//! fresh one from `Idle`, which reacquires the camera through a new engine.

use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;

use crate::bootstrap::SessionDeps;
use crate::controller::{
    ControllerExit, SessionChannels, SessionController, SessionSnapshot, UserCommand,
};
use crate::debouncer::Warning;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenOutcome {
    /// A result was saved.
    Completed { restarts: u32 },
    /// The screen was left.
    Unmounted { restarts: u32 },
    /// Restarts kept coming past the configured cap.
    RestartLimit { restarts: u32 },
}

/// UI side of a running screen.
#[derive(Clone)]
pub struct ScreenHandle {
    commands: mpsc::UnboundedSender<UserCommand>,
    cancel: CancellationToken,
    channels: SessionChannels,
}

impl ScreenHandle {
    /// Press the retry action of the current dialog.
    pub fn retry(&self) {
        if self.commands.send(UserCommand::Retry).is_err() {
            tracing::debug!("retry after screen shutdown ignored");
        }
    }

    /// Leave the screen: cancels any bootstrap step in flight and destroys the engine.
    pub fn unmount(&self) {
        self.cancel.cancel();
    }

    #[must_use]
    pub fn snapshots(&self) -> watch::Receiver<SessionSnapshot> {
        self.channels.snapshots()
    }

    #[must_use]
    pub fn warnings(&self) -> watch::Receiver<Option<Warning>> {
        self.channels.warnings()
    }
}

pub struct MeasurementScreen {
    deps: SessionDeps,
    channels: SessionChannels,
    cancel: CancellationToken,
    commands: mpsc::UnboundedReceiver<UserCommand>,
    max_restarts: Option<u32>,
}

impl MeasurementScreen {
    #[must_use]
    pub fn new(deps: SessionDeps) -> (Self, ScreenHandle) {
        let (tx, rx) = mpsc::unbounded_channel();
        let channels = SessionChannels::new();
        let cancel = CancellationToken::new();
        let handle = ScreenHandle {
            commands: tx,
            cancel: cancel.clone(),
            channels: channels.clone(),
        };
        (
            Self {
                deps,
                channels,
                cancel,
                commands: rx,
                max_restarts: None,
            },
            handle,
        )
    }

    /// Stop after `limit` restarts instead of restarting forever.
    #[must_use]
    pub const fn with_max_restarts(mut self, limit: u32) -> Self {
        self.max_restarts = Some(limit);
        self
    }

    pub async fn run(mut self) -> ScreenOutcome {
        let mut restarts = 0u32;
        loop {
            let controller = SessionController::new(
                self.deps.clone(),
                self.channels.clone(),
                self.cancel.child_token(),
            );
            match controller.run(&mut self.commands).await {
                ControllerExit::Completed => return ScreenOutcome::Completed { restarts },
                ControllerExit::Disposed => return ScreenOutcome::Unmounted { restarts },
                ControllerExit::Restart { reason } => {
                    if self.max_restarts.is_some_and(|limit| restarts >= limit) {
                        tracing::warn!(restarts, %reason, "restart limit reached");
                        return ScreenOutcome::RestartLimit { restarts };
                    }
                    restarts += 1;
                    tracing::info!(restarts, %reason, "rebuilding measurement controller");
                }
            }
        }
    }
}
