//! A scripted stand-in for the vendor engine.
//!
//! [`ScriptedEngine`] records every call made on it and, once started, plays a
//! list of [`ScriptStep`]s into its sink. It backs the `vitals replay` command
//! and the controller tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;

use crate::engine::{EngineInitConfig, EngineLoader, EngineSink, VendorEngine};
use crate::error::EngineError;
use crate::event::VendorEvent;

/// One scripted vendor event, emitted `after_ms` after the previous step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptStep {
    #[serde(default)]
    pub after_ms: u64,
    pub event: VendorEvent,
}

impl ScriptStep {
    #[must_use]
    pub const fn new(after_ms: u64, event: VendorEvent) -> Self {
        Self { after_ms, event }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum EngineCall {
    /// Recorded on the loader timeline only, when a load begins.
    Load,
    Attach,
    Detach,
    Init(serde_json::Value),
    Start,
    Cancel { destroy: bool },
    Stop,
    Destroy,
}

/// Shared, append-only log of engine calls.
#[derive(Debug, Clone, Default)]
pub struct EngineCallLog(Arc<Mutex<Vec<EngineCall>>>);

impl EngineCallLog {
    fn push(&self, call: EngineCall) {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).push(call);
    }

    #[must_use]
    pub fn calls(&self) -> Vec<EngineCall> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    #[must_use]
    pub fn contains(&self, call: &EngineCall) -> bool {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(call)
    }
}

/// Calls across every engine a loader has handed out, in the order they
/// happened, tagged with the engine's load index.
#[derive(Debug, Clone, Default)]
pub struct LoaderTimeline(Arc<Mutex<Vec<(usize, EngineCall)>>>);

impl LoaderTimeline {
    fn push(&self, engine: usize, call: EngineCall) {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((engine, call));
    }

    #[must_use]
    pub fn entries(&self) -> Vec<(usize, EngineCall)> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Index of the first `call` made on engine `engine`.
    #[must_use]
    pub fn position(&self, engine: usize, call: &EngineCall) -> Option<usize> {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .position(|(index, logged)| *index == engine && logged == call)
    }
}

type SharedSink = Arc<Mutex<Option<EngineSink>>>;

pub struct ScriptedEngine {
    steps: Vec<ScriptStep>,
    sink: SharedSink,
    player: Option<JoinHandle<()>>,
    log: EngineCallLog,
    timeline: Option<(usize, LoaderTimeline)>,
    fail_init: Option<String>,
    init_delay: Duration,
}

impl ScriptedEngine {
    #[must_use]
    pub fn new(steps: Vec<ScriptStep>) -> Self {
        Self {
            steps,
            sink: Arc::new(Mutex::new(None)),
            player: None,
            log: EngineCallLog::default(),
            timeline: None,
            fail_init: None,
            init_delay: Duration::ZERO,
        }
    }

    /// Make `init` fail with `message`.
    #[must_use]
    pub fn with_init_failure(mut self, message: impl Into<String>) -> Self {
        self.fail_init = Some(message.into());
        self
    }

    /// Hold `init` for `delay` before it resolves.
    #[must_use]
    pub fn with_init_delay(mut self, delay: Duration) -> Self {
        self.init_delay = delay;
        self
    }

    #[must_use]
    pub fn call_log(&self) -> EngineCallLog {
        self.log.clone()
    }

    fn record(&self, call: EngineCall) {
        if let Some((index, timeline)) = &self.timeline {
            timeline.push(*index, call.clone());
        }
        self.log.push(call);
    }

    fn halt_player(&mut self) {
        if let Some(player) = self.player.take() {
            player.abort();
        }
    }
}

#[async_trait]
impl VendorEngine for ScriptedEngine {
    fn attach(&mut self, sink: EngineSink) {
        self.record(EngineCall::Attach);
        *self.sink.lock().unwrap_or_else(PoisonError::into_inner) = Some(sink);
    }

    fn detach(&mut self) {
        self.record(EngineCall::Detach);
        self.sink.lock().unwrap_or_else(PoisonError::into_inner).take();
        self.halt_player();
    }

    async fn init(&mut self, config: &EngineInitConfig) -> Result<(), EngineError> {
        self.record(EngineCall::Init(
            serde_json::to_value(config).unwrap_or_default(),
        ));
        if !self.init_delay.is_zero() {
            tokio::time::sleep(self.init_delay).await;
        }
        match &self.fail_init {
            Some(message) => Err(EngineError::new("init", message.clone())),
            None => Ok(()),
        }
    }

    async fn start(&mut self) -> Result<(), EngineError> {
        self.record(EngineCall::Start);
        self.halt_player();

        let steps = self.steps.clone();
        let sink = Arc::clone(&self.sink);
        self.player = Some(tokio::spawn(async move {
            for step in steps {
                tokio::time::sleep(Duration::from_millis(step.after_ms)).await;
                let guard = sink.lock().unwrap_or_else(PoisonError::into_inner);
                let Some(sink) = guard.as_ref() else {
                    return;
                };
                sink.emit(step.event);
            }
        }));
        Ok(())
    }

    async fn cancel(&mut self, destroy: bool) -> Result<(), EngineError> {
        self.record(EngineCall::Cancel { destroy });
        self.halt_player();
        Ok(())
    }

    async fn stop(&mut self) -> Result<(), EngineError> {
        self.record(EngineCall::Stop);
        self.halt_player();
        Ok(())
    }

    async fn destroy(&mut self) -> Result<(), EngineError> {
        self.record(EngineCall::Destroy);
        self.halt_player();
        self.sink.lock().unwrap_or_else(PoisonError::into_inner).take();
        Ok(())
    }
}

impl Drop for ScriptedEngine {
    fn drop(&mut self) {
        self.halt_player();
    }
}

/// Hands out one [`ScriptedEngine`] per load.
///
/// Load `n` plays script `n`; loads past the last script replay the last one.
#[derive(Default)]
pub struct ScriptedLoader {
    scripts: Vec<Vec<ScriptStep>>,
    fail_load: Option<String>,
    fail_init: Option<String>,
    init_delay: Duration,
    load_delay: Duration,
    loads: AtomicUsize,
    logs: Mutex<Vec<EngineCallLog>>,
    timeline: LoaderTimeline,
}

impl ScriptedLoader {
    #[must_use]
    pub fn new(scripts: Vec<Vec<ScriptStep>>) -> Self {
        Self {
            scripts,
            ..Self::default()
        }
    }

    /// A loader that plays the same script on every load.
    #[must_use]
    pub fn repeating(steps: Vec<ScriptStep>) -> Self {
        Self::new(vec![steps])
    }

    #[must_use]
    pub fn with_load_failure(mut self, message: impl Into<String>) -> Self {
        self.fail_load = Some(message.into());
        self
    }

    #[must_use]
    pub fn with_init_failure(mut self, message: impl Into<String>) -> Self {
        self.fail_init = Some(message.into());
        self
    }

    /// Hold every engine's `init` for `delay`.
    #[must_use]
    pub fn with_init_delay(mut self, delay: Duration) -> Self {
        self.init_delay = delay;
        self
    }

    /// Hold every `load` for `delay` before an engine is built.
    #[must_use]
    pub fn with_load_delay(mut self, delay: Duration) -> Self {
        self.load_delay = delay;
        self
    }

    #[must_use]
    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }

    /// Call logs of every engine handed out so far, in load order.
    #[must_use]
    pub fn call_logs(&self) -> Vec<EngineCallLog> {
        self.logs.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Load and engine calls of every engine, in one ordered log.
    #[must_use]
    pub fn timeline(&self) -> LoaderTimeline {
        self.timeline.clone()
    }
}

#[async_trait]
impl EngineLoader for ScriptedLoader {
    async fn load(&self, app_path: &str) -> Result<Box<dyn VendorEngine>, EngineError> {
        let attempt = self.loads.fetch_add(1, Ordering::SeqCst);
        self.timeline.push(attempt, EngineCall::Load);
        if !self.load_delay.is_zero() {
            tokio::time::sleep(self.load_delay).await;
        }
        if let Some(message) = &self.fail_load {
            return Err(EngineError::new("load", format!("{app_path}: {message}")));
        }

        let steps = self
            .scripts
            .get(attempt)
            .or_else(|| self.scripts.last())
            .cloned()
            .unwrap_or_default();
        let mut engine = ScriptedEngine::new(steps).with_init_delay(self.init_delay);
        engine.timeline = Some((attempt, self.timeline.clone()));
        if let Some(message) = &self.fail_init {
            engine = engine.with_init_failure(message.clone());
        }
        self.logs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(engine.call_log());
        tracing::debug!(attempt, app_path, "scripted engine loaded");
        Ok(Box::new(engine))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{ErrorEvent, LifecycleEvent};
    use tokio::sync::mpsc;

    fn lifecycle(name: &str) -> VendorEvent {
        VendorEvent::Lifecycle(LifecycleEvent { name: name.into() })
    }

    #[tokio::test(start_paused = true)]
    async fn plays_steps_with_relative_delays() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut engine = ScriptedEngine::new(vec![
            ScriptStep::new(100, lifecycle("A")),
            ScriptStep::new(100, VendorEvent::Error(ErrorEvent::new("X", "y"))),
        ]);
        engine.attach(EngineSink::new(tx));
        engine.start().await.unwrap();

        let started = tokio::time::Instant::now();
        assert_eq!(rx.recv().await.unwrap(), lifecycle("A"));
        assert_eq!(rx.recv().await.unwrap().kind(), "error");
        assert_eq!(started.elapsed(), Duration::from_millis(200));
    }

    #[tokio::test(start_paused = true)]
    async fn detach_silences_pending_steps() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut engine = ScriptedEngine::new(vec![ScriptStep::new(50, lifecycle("LATE"))]);
        engine.attach(EngineSink::new(tx));
        engine.start().await.unwrap();
        engine.detach();

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn loader_cycles_scripts_and_counts_loads() {
        let loader = ScriptedLoader::new(vec![vec![], vec![ScriptStep::new(0, lifecycle("B"))]]);
        for _ in 0..3 {
            loader.load("/vendor").await.unwrap();
        }
        assert_eq!(loader.load_count(), 3);
        assert_eq!(loader.call_logs().len(), 3);
    }

    #[tokio::test]
    async fn timeline_orders_calls_across_engines() {
        let loader = ScriptedLoader::default();
        let mut first = loader.load("/vendor").await.unwrap();
        first.destroy().await.unwrap();
        let _second = loader.load("/vendor").await.unwrap();

        let timeline = loader.timeline();
        assert_eq!(
            timeline.entries(),
            vec![
                (0, EngineCall::Load),
                (0, EngineCall::Destroy),
                (1, EngineCall::Load),
            ]
        );
        assert_eq!(timeline.position(1, &EngineCall::Load), Some(2));
        assert_eq!(loader.call_logs()[0].calls(), vec![EngineCall::Destroy]);
    }

    #[tokio::test]
    async fn loader_failure_is_reported() {
        let loader = ScriptedLoader::default().with_load_failure("missing bundle");
        let Err(error) = loader.load("/vendor").await else {
            panic!("expected load failure");
        };
        assert_eq!(error.operation, "load");
        assert!(error.message.contains("missing bundle"));
    }
}
