//! One-shot persistence of the canonical record.
//!
//! Exactly one write per completed measurement. A failed write is reported to
//! the user and audited but never retried: it points at the backend or the
//! data, not at a flaky device.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use vital_config::BackendConfig;
use vital_core::{AuditAction, AuditEvent, MeasurementRecord, SaveFailedDetail, SavedDetail};

use crate::error::PersistError;
use crate::host::{Notification, SessionHost};

/// Backend acknowledgement of a stored record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedMeasurement {
    pub id: String,
}

#[async_trait]
pub trait MeasurementStore: Send + Sync {
    async fn save(&self, record: &MeasurementRecord) -> Result<SavedMeasurement, PersistError>;
}

/// `POST {base_url}/measurements` with the record as JSON body.
pub struct HttpMeasurementStore {
    http: reqwest::Client,
    url: String,
    api_token: Option<String>,
}

impl HttpMeasurementStore {
    /// # Errors
    ///
    /// Returns an error if no backend URL is configured or the HTTP client
    /// cannot be built.
    pub fn new(config: &BackendConfig) -> Result<Self, PersistError> {
        if !config.is_configured() {
            return Err(PersistError::Other("backend.base_url is not configured".into()));
        }
        let http = reqwest::Client::builder()
            .user_agent("vitals/0.1")
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            http,
            url: config.measurements_url(),
            api_token: Some(config.api_token.clone()).filter(|t| !t.is_empty()),
        })
    }
}

#[async_trait]
impl MeasurementStore for HttpMeasurementStore {
    async fn save(&self, record: &MeasurementRecord) -> Result<SavedMeasurement, PersistError> {
        tracing::debug!(url = %self.url, user_id = %record.user_id, "posting measurement");

        let mut request = self.http.post(&self.url).json(record);
        if let Some(token) = &self.api_token {
            request = request.bearer_auth(token);
        }
        let resp = request.send().await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(PersistError::Rejected {
                status: status.as_u16(),
                detail: error_detail(&body),
            });
        }

        let body: serde_json::Value = resp.json().await?;
        parse_saved(&body)
    }
}

/// Pull `detail` out of a `{detail: string}` error body, else the raw body.
fn error_detail(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v["detail"].as_str().map(str::to_string))
        .unwrap_or_else(|| body.trim().to_string())
}

fn parse_saved(body: &serde_json::Value) -> Result<SavedMeasurement, PersistError> {
    let id = match &body["id"] {
        serde_json::Value::String(id) if !id.is_empty() => id.clone(),
        serde_json::Value::Number(id) => id.to_string(),
        _ => return Err(PersistError::MalformedResponse("missing 'id'".into())),
    };
    Ok(SavedMeasurement { id })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistOutcome {
    Saved { measurement_id: String },
    Failed { reason: String },
}

pub struct ResultPersister {
    store: Arc<dyn MeasurementStore>,
    host: Arc<dyn SessionHost>,
    redirect_delay: Duration,
}

impl ResultPersister {
    #[must_use]
    pub fn new(
        store: Arc<dyn MeasurementStore>,
        host: Arc<dyn SessionHost>,
        redirect_delay: Duration,
    ) -> Self {
        Self {
            store,
            host,
            redirect_delay,
        }
    }

    /// Write `record` once, tell the user, and navigate away after the
    /// redirect delay on success. Leaving the screen during the delay skips
    /// the navigation.
    pub async fn persist(
        &self,
        record: &MeasurementRecord,
        cancel: &CancellationToken,
    ) -> PersistOutcome {
        let user_id = Some(record.user_id.clone());
        match self.store.save(record).await {
            Ok(saved) => {
                tracing::info!(measurement_id = %saved.id, "measurement saved");
                self.host.notify(Notification::success(
                    "Measurement saved",
                    "Your results have been recorded.",
                ));
                self.host.audit(
                    AuditEvent::new(AuditAction::MeasurementSaved, user_id).with_detail(
                        &SavedDetail {
                            measurement_id: saved.id.clone(),
                        },
                    ),
                );

                tokio::select! {
                    () = cancel.cancelled() => {
                        tracing::debug!("screen left during redirect delay");
                    }
                    () = tokio::time::sleep(self.redirect_delay) => self.host.navigate_away(),
                }
                PersistOutcome::Saved {
                    measurement_id: saved.id,
                }
            }
            Err(error) => {
                let reason = error.to_string();
                tracing::error!(%error, "saving measurement failed");
                self.host.notify(Notification::error(
                    "Could not save measurement",
                    reason.clone(),
                ));
                self.host.audit(
                    AuditEvent::new(AuditAction::MeasurementSaveFailed, user_id).with_detail(
                        &SaveFailedDetail {
                            reason: reason.clone(),
                        },
                    ),
                );
                PersistOutcome::Failed { reason }
            }
        }
    }
}
