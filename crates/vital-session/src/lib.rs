//! # vital-session
//!
//! Controller for a live, camera-based vital-signs measurement.
//!
//! The vendor engine is driven through [`SdkAdapter`], which funnels the
//! engine's result, error and lifecycle callbacks into one channel of
//! [`VendorEvent`]s. [`SessionController`] consumes that channel sequentially:
//! errors are classified into a closed set of [`Disposition`]s, noisy warnings
//! are throttled by the [`WarningDebouncer`], repeated transient failures
//! escalate into a full restart, and a successful result is mapped into the
//! canonical record and saved exactly once by the [`ResultPersister`].
//!
//! [`MeasurementScreen`] supervises controller lifetimes: a restart discards the
//! controller and its engine and builds fresh ones.

pub mod adapter;
pub mod bootstrap;
pub mod classifier;
pub mod controller;
pub mod debouncer;
pub mod engine;
pub mod error;
pub mod event;
pub mod host;
pub mod mapper;
pub mod persister;
pub mod profile_store;
pub mod screen;
pub mod scripted;

pub use adapter::SdkAdapter;
pub use bootstrap::{Bootstrapped, SessionDeps, bootstrap};
pub use classifier::{Disposition, ErrorDialog, classify};
pub use controller::{
    Completion, ControllerExit, SessionChannels, SessionController, SessionPhase, SessionSnapshot,
    UserCommand,
};
pub use debouncer::{Warning, WarningDebouncer};
pub use engine::{EngineInitConfig, EngineLoader, EngineSink, VendorEngine};
pub use error::{BootstrapError, EngineError, PersistError, ProfileStoreError};
pub use event::{ErrorEvent, LifecycleEvent, Point, Points, ResultEvent, VendorEvent};
pub use host::{Notification, NotificationLevel, SessionHost, TracingHost};
pub use mapper::map_points;
pub use persister::{
    HttpMeasurementStore, MeasurementStore, PersistOutcome, ResultPersister, SavedMeasurement,
};
pub use profile_store::{DEFAULT_PROFILE_KEY, FileProfileStore, ProfileSource};
pub use screen::{MeasurementScreen, ScreenHandle, ScreenOutcome};
pub use scripted::{
    EngineCall, EngineCallLog, LoaderTimeline, ScriptStep, ScriptedEngine, ScriptedLoader,
};
