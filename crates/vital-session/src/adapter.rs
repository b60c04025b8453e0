//! Facade over exactly one vendor engine instance.

use tokio::sync::mpsc;

use crate::engine::{EngineInitConfig, EngineSink, VendorEngine};
use crate::error::EngineError;
use crate::event::VendorEvent;

/// Owns one engine and the channel its callbacks feed.
///
/// `freeze` pauses the engine and keeps it; `destroy` is irrevocable. After
/// `destroy` every operation is a no-op, so a new adapter can be built safely.
pub struct SdkAdapter {
    engine: Option<Box<dyn VendorEngine>>,
    attached: bool,
}

impl SdkAdapter {
    /// Wire the engine's callbacks to a fresh channel and return its receiver.
    #[must_use]
    pub fn new(mut engine: Box<dyn VendorEngine>) -> (Self, mpsc::UnboundedReceiver<VendorEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        engine.attach(EngineSink::new(tx));
        (
            Self {
                engine: Some(engine),
                attached: true,
            },
            rx,
        )
    }

    /// # Errors
    ///
    /// Returns the engine's error, or an error if the adapter was destroyed.
    pub async fn init(&mut self, config: &EngineInitConfig) -> Result<(), EngineError> {
        self.engine_mut("init")?.init(config).await
    }

    /// # Errors
    ///
    /// Returns the engine's error, or an error if the adapter was destroyed.
    pub async fn start(&mut self) -> Result<(), EngineError> {
        self.engine_mut("start")?.start().await
    }

    /// Gracefully pause the engine, keeping the instance for a later retry or teardown.
    ///
    /// # Errors
    ///
    /// Returns the engine's error. Freezing a destroyed adapter is a no-op.
    pub async fn freeze(&mut self) -> Result<(), EngineError> {
        match self.engine.as_mut() {
            Some(engine) => engine.cancel(false).await,
            None => Ok(()),
        }
    }

    /// Stop delivering callbacks. Idempotent.
    pub fn detach(&mut self) {
        if self.attached
            && let Some(engine) = self.engine.as_mut()
        {
            engine.detach();
        }
        self.attached = false;
    }

    /// Cancel with teardown, then destroy. Errors are logged, never returned:
    /// the instance is released regardless.
    pub async fn destroy(&mut self) {
        self.detach();
        let Some(mut engine) = self.engine.take() else {
            return;
        };
        if let Err(error) = engine.cancel(true).await {
            tracing::warn!(%error, "engine cancel before destroy failed");
        }
        if let Err(error) = engine.destroy().await {
            tracing::warn!(%error, "engine destroy failed");
        }
        tracing::debug!("measurement engine destroyed");
    }

    #[must_use]
    pub const fn is_destroyed(&self) -> bool {
        self.engine.is_none()
    }

    fn engine_mut(&mut self, operation: &'static str) -> Result<&mut Box<dyn VendorEngine>, EngineError> {
        self.engine
            .as_mut()
            .ok_or_else(|| EngineError::new(operation, "adapter already destroyed"))
    }
}

impl Drop for SdkAdapter {
    fn drop(&mut self) {
        if self.engine.is_some() {
            self.detach();
            tracing::warn!("measurement adapter dropped without destroy");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scripted::{EngineCall, ScriptedEngine};

    #[tokio::test]
    async fn destroy_cancels_then_destroys_once() {
        let engine = ScriptedEngine::new(Vec::new());
        let log = engine.call_log();
        let (mut adapter, _rx) = SdkAdapter::new(Box::new(engine));

        adapter.freeze().await.unwrap();
        adapter.destroy().await;
        adapter.destroy().await;

        assert!(adapter.is_destroyed());
        assert_eq!(
            log.calls(),
            vec![
                EngineCall::Attach,
                EngineCall::Cancel { destroy: false },
                EngineCall::Detach,
                EngineCall::Cancel { destroy: true },
                EngineCall::Destroy,
            ]
        );
    }

    #[tokio::test]
    async fn operations_after_destroy_fail_or_noop() {
        let (mut adapter, _rx) = SdkAdapter::new(Box::new(ScriptedEngine::new(Vec::new())));
        adapter.destroy().await;

        assert!(adapter.start().await.is_err());
        assert!(adapter.freeze().await.is_ok());
    }
}
