//! Contract of the vendor measurement engine.
//!
//! The engine is a closed module loaded from a distribution path. It exposes
//! `init`, `start`, `cancel(destroy)`, `stop` and `destroy`, and reports back
//! through callbacks. Here the callbacks are an [`EngineSink`]: every
//! callback becomes a [`VendorEvent`] on a single channel, so the controller
//! handles them strictly one at a time.

use async_trait::async_trait;
use serde::Serialize;
use tokio::sync::mpsc;

use vital_auth::SessionToken;
use vital_config::{ApiConfig, EngineConfig};
use vital_core::Profile;

use crate::error::EngineError;
use crate::event::{ErrorEvent, LifecycleEvent, ResultEvent, VendorEvent};

/// Handle of the rendering surface the engine draws the camera preview into.
pub const DEFAULT_CONTAINER: &str = "vitals-measurement";

#[async_trait]
pub trait VendorEngine: Send {
    /// Install the callback sink. Replaces any previous sink.
    fn attach(&mut self, sink: EngineSink);

    /// Remove the callback sink; no callback may fire afterwards.
    fn detach(&mut self);

    async fn init(&mut self, config: &EngineInitConfig) -> Result<(), EngineError>;

    async fn start(&mut self) -> Result<(), EngineError>;

    /// `cancel(false)` pauses and keeps the instance; `cancel(true)` prepares teardown.
    async fn cancel(&mut self, destroy: bool) -> Result<(), EngineError>;

    async fn stop(&mut self) -> Result<(), EngineError>;

    async fn destroy(&mut self) -> Result<(), EngineError>;
}

/// Loads the vendor module and constructs one engine instance.
#[async_trait]
pub trait EngineLoader: Send + Sync {
    async fn load(&self, app_path: &str) -> Result<Box<dyn VendorEngine>, EngineError>;
}

/// Callback side of the engine: pushes events onto the controller's channel.
///
/// Sends after the controller is gone are dropped silently.
#[derive(Debug, Clone)]
pub struct EngineSink {
    tx: mpsc::UnboundedSender<VendorEvent>,
}

impl EngineSink {
    pub(crate) const fn new(tx: mpsc::UnboundedSender<VendorEvent>) -> Self {
        Self { tx }
    }

    pub fn result(&self, event: ResultEvent) {
        self.emit(VendorEvent::Result(event));
    }

    pub fn error(&self, event: ErrorEvent) {
        self.emit(VendorEvent::Error(event));
    }

    pub fn lifecycle(&self, name: impl Into<String>) {
        self.emit(VendorEvent::Lifecycle(LifecycleEvent { name: name.into() }));
    }

    pub fn emit(&self, event: VendorEvent) {
        if self.tx.send(event).is_err() {
            tracing::debug!("vendor callback after controller shutdown dropped");
        }
    }
}

/// Configuration handed to `VendorEngine::init`, serialized in the vendor's camelCase shape.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineInitConfig {
    pub container: String,
    pub app_path: String,
    pub settings: EngineSettings,
    pub profile: Profile,
    pub config: CameraConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineSettings {
    pub token: String,
    pub refresh_token: String,
    pub study_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CameraConfig {
    pub camera_facing_mode: String,
    pub camera_auto_start: bool,
    pub measurement_auto_start: bool,
    pub check_constraints: bool,
    #[serde(rename = "cancelWhenLowSNR")]
    pub cancel_when_low_snr: bool,
}

impl EngineInitConfig {
    #[must_use]
    pub fn new(
        container: &str,
        engine: &EngineConfig,
        api: &ApiConfig,
        token: &SessionToken,
        profile: Profile,
    ) -> Self {
        Self {
            container: container.to_string(),
            app_path: engine.app_path.clone(),
            settings: EngineSettings {
                token: token.token.clone(),
                refresh_token: token.refresh_token.clone(),
                study_id: api.study_id.clone(),
            },
            profile,
            config: CameraConfig {
                camera_facing_mode: engine.camera_facing_mode.clone(),
                camera_auto_start: engine.camera_auto_start,
                measurement_auto_start: engine.measurement_auto_start,
                check_constraints: engine.check_constraints,
                cancel_when_low_snr: engine.cancel_when_low_snr,
            },
        }
    }
}
