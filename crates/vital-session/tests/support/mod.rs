//! Shared fakes for the session scenario tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use vital_auth::{AuthError, SessionToken, TokenProvider};
use vital_config::{ApiConfig, VitalsConfig};
use vital_core::{
    AuditAction, AuditEvent, DiabetesStatus, MeasurementRecord, Profile, Sex, UserIdentity,
};
use vital_session::event::{LifecycleEvent, MEASUREMENT_STARTED};
use vital_session::{
    ErrorEvent, MeasurementStore, Notification, PersistError, Point, ProfileSource,
    ProfileStoreError, ResultEvent, SavedMeasurement, ScriptStep, ScriptedLoader, SessionDeps,
    SessionHost, VendorEvent,
};

pub const USER_ID: &str = "usr-0001";

// ---------------------------------------------------------------------------
// Host
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct RecordingHost {
    notifications: Mutex<Vec<Notification>>,
    audits: Mutex<Vec<AuditEvent>>,
    navigations: AtomicUsize,
}

impl RecordingHost {
    pub fn notifications(&self) -> Vec<Notification> {
        self.notifications.lock().unwrap().clone()
    }

    pub fn audit_actions(&self) -> Vec<AuditAction> {
        self.audits.lock().unwrap().iter().map(|e| e.action).collect()
    }

    pub fn audits(&self) -> Vec<AuditEvent> {
        self.audits.lock().unwrap().clone()
    }

    pub fn navigations(&self) -> usize {
        self.navigations.load(Ordering::SeqCst)
    }
}

impl SessionHost for RecordingHost {
    fn notify(&self, notification: Notification) {
        self.notifications.lock().unwrap().push(notification);
    }

    fn navigate_away(&self) {
        self.navigations.fetch_add(1, Ordering::SeqCst);
    }

    fn audit(&self, event: AuditEvent) {
        self.audits.lock().unwrap().push(event);
    }
}

// ---------------------------------------------------------------------------
// Measurement store
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct MemoryStore {
    saved: Mutex<Vec<MeasurementRecord>>,
    reject: Option<String>,
}

impl MemoryStore {
    pub fn rejecting(detail: &str) -> Self {
        Self {
            reject: Some(detail.to_string()),
            ..Self::default()
        }
    }

    pub fn saved(&self) -> Vec<MeasurementRecord> {
        self.saved.lock().unwrap().clone()
    }
}

#[async_trait]
impl MeasurementStore for MemoryStore {
    async fn save(&self, record: &MeasurementRecord) -> Result<SavedMeasurement, PersistError> {
        self.saved.lock().unwrap().push(record.clone());
        match &self.reject {
            Some(detail) => Err(PersistError::Rejected {
                status: 422,
                detail: detail.clone(),
            }),
            None => Ok(SavedMeasurement {
                id: format!("msr-{}", self.saved.lock().unwrap().len()),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Token provider
// ---------------------------------------------------------------------------

pub struct StaticTokens {
    delay: Duration,
    fail: bool,
    calls: AtomicUsize,
}

impl StaticTokens {
    pub fn ok() -> Self {
        Self {
            delay: Duration::ZERO,
            fail: false,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::ok()
        }
    }

    pub fn slow(delay: Duration) -> Self {
        Self {
            delay,
            ..Self::ok()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TokenProvider for StaticTokens {
    async fn fetch_token(&self, _api: &ApiConfig) -> Result<SessionToken, AuthError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        if self.fail {
            return Err(AuthError::Api {
                status: 401,
                message: "invalid license".into(),
            });
        }
        Ok(SessionToken {
            token: "opaque-token".into(),
            refresh_token: "opaque-refresh".into(),
        })
    }
}

// ---------------------------------------------------------------------------
// Profile source
// ---------------------------------------------------------------------------

pub struct StaticProfile(pub Option<Profile>);

impl ProfileSource for StaticProfile {
    fn load(&self, _key: &str) -> Result<Option<Profile>, ProfileStoreError> {
        Ok(self.0.clone())
    }
}

pub fn profile() -> Profile {
    Profile {
        age: 38,
        sex: Sex::Female,
        height_cm: 165,
        weight_kg: 60,
        diabetes_status: DiabetesStatus::None,
        smoking: false,
        bp_medication: false,
    }
}

// ---------------------------------------------------------------------------
// Wiring
// ---------------------------------------------------------------------------

pub fn config() -> VitalsConfig {
    let mut config = VitalsConfig::default();
    config.api = ApiConfig {
        host: "api.vendor.test".into(),
        license_key: "lic-123".into(),
        study_id: "study-9".into(),
    };
    config
}

pub struct Harness {
    pub host: Arc<RecordingHost>,
    pub store: Arc<MemoryStore>,
    pub tokens: Arc<StaticTokens>,
    pub loader: Arc<ScriptedLoader>,
    pub deps: SessionDeps,
}

impl Harness {
    pub fn new(loader: ScriptedLoader) -> Self {
        Self::with(config(), Some(profile()), StaticTokens::ok(), loader, MemoryStore::default())
    }

    pub fn with(
        config: VitalsConfig,
        profile: Option<Profile>,
        tokens: StaticTokens,
        loader: ScriptedLoader,
        store: MemoryStore,
    ) -> Self {
        let host = Arc::new(RecordingHost::default());
        let store = Arc::new(store);
        let tokens = Arc::new(tokens);
        let loader = Arc::new(loader);
        let deps = SessionDeps {
            config: Arc::new(config),
            identity: UserIdentity::new(USER_ID),
            profile_key: "health_profile".into(),
            profiles: Arc::new(StaticProfile(profile)),
            tokens: tokens.clone(),
            engines: loader.clone(),
            store: store.clone(),
            host: host.clone(),
        };
        Self {
            host,
            store,
            tokens,
            loader,
            deps,
        }
    }
}

// ---------------------------------------------------------------------------
// Script builders
// ---------------------------------------------------------------------------

pub fn started(after_ms: u64) -> ScriptStep {
    ScriptStep::new(
        after_ms,
        VendorEvent::Lifecycle(LifecycleEvent {
            name: MEASUREMENT_STARTED.into(),
        }),
    )
}

pub fn error(after_ms: u64, code: &str, message: &str) -> ScriptStep {
    ScriptStep::new(after_ms, VendorEvent::Error(ErrorEvent::new(code, message)))
}

pub fn result(after_ms: u64, status_id: &str) -> ScriptStep {
    ScriptStep::new(
        after_ms,
        VendorEvent::Result(ResultEvent {
            status_id: status_id.into(),
            points: [
                ("HR_BPM".to_string(), Point::new(68)),
                ("HRV_SDNN".to_string(), Point::new(45.2)),
                ("IHB_COUNT".to_string(), Point::new("1")),
            ]
            .into_iter()
            .collect(),
            liveness_error: None,
        }),
    )
}
