use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};

use anyhow::Context;
use async_trait::async_trait;
use serde::Serialize;
use vital_auth::{AuthError, SessionToken, TokenClient, TokenProvider};
use vital_config::{ApiConfig, VitalsConfig};
use vital_core::{MeasurementRecord, UserIdentity};
use vital_session::{
    FileProfileStore, HttpMeasurementStore, MeasurementScreen, MeasurementStore, PersistError,
    SavedMeasurement, ScreenOutcome, ScriptStep, ScriptedLoader, SessionDeps, SessionPhase,
    SessionSnapshot,
};

use crate::cli::GlobalFlags;
use crate::cli::root_commands::ReplayArgs;
use crate::host::ConsoleHost;
use crate::output::output;

#[derive(Serialize)]
struct ReplayResponse {
    outcome: &'static str,
    restarts: u32,
    session: SessionSnapshot,
    #[serde(skip_serializing_if = "Option::is_none")]
    record: Option<MeasurementRecord>,
}

/// Handle `vitals replay`.
pub async fn handle(
    args: &ReplayArgs,
    mut config: VitalsConfig,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let steps = read_script(&args.script)?;
    tracing::debug!(steps = steps.len(), script = %args.script.display(), "replay script loaded");

    if let Some(timeout) = args.timeout_secs {
        config.session.measurement_timeout_secs = timeout;
    }

    let dry_run_store = Arc::new(DryRunStore::default());
    let tokens: Arc<dyn TokenProvider>;
    let store: Arc<dyn MeasurementStore>;
    if args.dry_run {
        if !config.api.is_configured() {
            config.api = offline_api();
        }
        tokens = Arc::new(OfflineTokens);
        store = dry_run_store.clone();
    } else {
        let http = HttpMeasurementStore::new(&config.backend)
            .context("replay without --dry-run needs a configured backend")?;
        tokens = Arc::new(TokenClient::new());
        store = Arc::new(http);
    }

    let deps = SessionDeps {
        profiles: Arc::new(FileProfileStore::from_config(&config.storage)?),
        config: Arc::new(config),
        identity: UserIdentity::new(args.user.clone()),
        profile_key: args.profile_key.clone(),
        tokens,
        engines: Arc::new(ScriptedLoader::repeating(steps)),
        store,
        host: Arc::new(ConsoleHost::new(flags.quiet)),
    };

    let (screen, handle) = MeasurementScreen::new(deps);
    let screen = screen.with_max_restarts(args.max_restarts);

    let mut warnings = handle.warnings();
    let quiet = flags.quiet;
    let warning_printer = tokio::spawn(async move {
        while warnings.changed().await.is_ok() {
            if let Some(warning) = warnings.borrow_and_update().as_ref()
                && !quiet
            {
                eprintln!("[warning] {}", warning.message);
            }
        }
    });

    // A dialog waits for user input that a replay never gives: leave the screen.
    let watcher = {
        let handle = handle.clone();
        let mut snapshots = handle.snapshots();
        tokio::spawn(async move {
            if snapshots.wait_for(awaits_user).await.is_ok() {
                handle.unmount();
            }
        })
    };

    let outcome = screen.run().await;
    watcher.abort();
    warning_printer.abort();

    let (outcome, restarts) = match outcome {
        ScreenOutcome::Completed { restarts } => ("completed", restarts),
        ScreenOutcome::Unmounted { restarts } => ("stopped", restarts),
        ScreenOutcome::RestartLimit { restarts } => ("restart_limit", restarts),
    };
    let session = handle.snapshots().borrow().clone();

    output(
        &ReplayResponse {
            outcome,
            restarts,
            session,
            record: dry_run_store.take(),
        },
        flags.format,
    )
}

fn read_script(path: &Path) -> anyhow::Result<Vec<ScriptStep>> {
    serde_jsonlines::json_lines(path)
        .with_context(|| format!("failed to open replay script {}", path.display()))?
        .collect::<std::io::Result<Vec<ScriptStep>>>()
        .with_context(|| format!("invalid replay script {}", path.display()))
}

const fn awaits_user(snapshot: &SessionSnapshot) -> bool {
    matches!(
        snapshot.phase,
        SessionPhase::Error(_) | SessionPhase::Completed(_)
    )
}

fn offline_api() -> ApiConfig {
    ApiConfig {
        host: "replay.invalid".into(),
        license_key: "replay".into(),
        study_id: "replay".into(),
    }
}

/// Token source for dry runs; the scripted engine never checks it.
struct OfflineTokens;

#[async_trait]
impl TokenProvider for OfflineTokens {
    async fn fetch_token(&self, _api: &ApiConfig) -> Result<SessionToken, AuthError> {
        Ok(SessionToken {
            token: "replay-token".into(),
            refresh_token: "replay-refresh".into(),
        })
    }
}

/// Keeps the saved record for printing.
#[derive(Default)]
struct DryRunStore {
    record: Mutex<Option<MeasurementRecord>>,
}

impl DryRunStore {
    fn take(&self) -> Option<MeasurementRecord> {
        self.record
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }
}

#[async_trait]
impl MeasurementStore for DryRunStore {
    async fn save(&self, record: &MeasurementRecord) -> Result<SavedMeasurement, PersistError> {
        *self.record.lock().unwrap_or_else(PoisonError::into_inner) = Some(record.clone());
        Ok(SavedMeasurement {
            id: "dry-run".into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use vital_session::VendorEvent;

    #[test]
    fn reads_jsonl_script() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("session.jsonl");
        std::fs::write(
            &path,
            concat!(
                r#"{"after_ms": 0, "event": {"type": "lifecycle", "name": "MEASUREMENT_STARTED"}}"#,
                "\n",
                r#"{"after_ms": 800, "event": {"type": "error", "code": "MEASUREMENT_LOW_SNR", "message": "low"}}"#,
                "\n",
                r#"{"event": {"type": "result", "status_id": "SUCCESS", "points": {"HR_BPM": {"value": 70}}}}"#,
                "\n",
            ),
        )
        .unwrap();

        let steps = read_script(&path).unwrap();
        assert_eq!(steps.len(), 3);
        assert_eq!(steps[1].after_ms, 800);
        assert_eq!(steps[2].after_ms, 0);
        assert!(matches!(steps[2].event, VendorEvent::Result(_)));
    }

    #[test]
    fn malformed_line_is_an_error() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("bad.jsonl");
        std::fs::write(&path, "{\"event\": {\"type\": \"bogus\"}}\n").unwrap();
        assert!(read_script(&path).is_err());
    }

    #[test]
    fn dialogs_and_completion_end_the_replay() {
        let mut snapshot = SessionSnapshot::default();
        assert!(!awaits_user(&snapshot));
        snapshot.phase = SessionPhase::Active;
        assert!(!awaits_user(&snapshot));
        snapshot.phase = SessionPhase::Error(vital_session::ErrorDialog::timed_out());
        assert!(awaits_user(&snapshot));
    }

    #[tokio::test]
    async fn dry_run_store_keeps_last_record() {
        let store = DryRunStore::default();
        let record = MeasurementRecord::empty("u".into(), chrono::Utc::now());
        let saved = store.save(&record).await.unwrap();
        assert_eq!(saved.id, "dry-run");
        assert_eq!(store.take(), Some(record));
        assert_eq!(store.take(), None);
    }
}
