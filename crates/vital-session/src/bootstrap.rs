//! Session bootstrap: profile, configuration, token, engine.
//!
//! Each asynchronous step races the screen's cancellation token, and the token
//! is checked again once the step resumes, so leaving the screen mid-bootstrap
//! causes no further side effects. An engine that was already wrapped in an
//! adapter is destroyed on the way out.

use std::future::Future;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use vital_auth::TokenProvider;
use vital_config::VitalsConfig;
use vital_core::UserIdentity;

use crate::adapter::SdkAdapter;
use crate::engine::{DEFAULT_CONTAINER, EngineInitConfig, EngineLoader};
use crate::error::BootstrapError;
use crate::event::VendorEvent;
use crate::host::SessionHost;
use crate::persister::MeasurementStore;
use crate::profile_store::ProfileSource;

/// Everything a controller needs from the outside world.
///
/// Cheap to clone; a restart hands the same dependencies to the next
/// controller.
#[derive(Clone)]
pub struct SessionDeps {
    pub config: Arc<VitalsConfig>,
    pub identity: UserIdentity,
    pub profile_key: String,
    pub profiles: Arc<dyn ProfileSource>,
    pub tokens: Arc<dyn TokenProvider>,
    pub engines: Arc<dyn EngineLoader>,
    pub store: Arc<dyn MeasurementStore>,
    pub host: Arc<dyn SessionHost>,
}

/// A started engine, ready for the controller's event loop.
pub struct Bootstrapped {
    pub adapter: SdkAdapter,
    pub events: mpsc::UnboundedReceiver<VendorEvent>,
}

/// Run the bootstrap sequence.
///
/// # Errors
///
/// Returns the first failing step, or [`BootstrapError::Canceled`] if `cancel`
/// fired while a step was in flight.
pub async fn bootstrap(
    deps: &SessionDeps,
    cancel: &CancellationToken,
) -> Result<Bootstrapped, BootstrapError> {
    let profile = deps
        .profiles
        .load(&deps.profile_key)?
        .ok_or(BootstrapError::ProfileNotFound)?;
    profile.validate()?;

    let api = deps.config.api.require()?;

    let token = until_canceled(cancel, deps.tokens.fetch_token(api)).await??;
    token.ensure_fresh(Utc::now())?;
    tracing::debug!(expires_at = ?token.expires_at(), "engine token acquired");

    let app_path = &deps.config.engine.app_path;
    let engine = until_canceled(cancel, deps.engines.load(app_path))
        .await?
        .map_err(BootstrapError::ModuleLoad)?;
    let (mut adapter, events) = SdkAdapter::new(engine);

    let init_config = EngineInitConfig::new(
        DEFAULT_CONTAINER,
        &deps.config.engine,
        api,
        &token,
        profile,
    );
    let init = until_canceled(cancel, adapter.init(&init_config)).await;
    if let Err(error) = flatten(init, BootstrapError::EngineInit) {
        adapter.destroy().await;
        return Err(error);
    }

    let start = until_canceled(cancel, adapter.start()).await;
    if let Err(error) = flatten(start, BootstrapError::EngineStart) {
        adapter.destroy().await;
        return Err(error);
    }

    Ok(Bootstrapped { adapter, events })
}

/// Await `fut` unless `cancel` fires first; a token canceled while `fut`
/// completed still wins.
async fn until_canceled<F: Future>(
    cancel: &CancellationToken,
    fut: F,
) -> Result<F::Output, BootstrapError> {
    let output = tokio::select! {
        biased;
        () = cancel.cancelled() => return Err(BootstrapError::Canceled),
        output = fut => output,
    };
    if cancel.is_cancelled() {
        return Err(BootstrapError::Canceled);
    }
    Ok(output)
}

fn flatten<E>(
    result: Result<Result<(), E>, BootstrapError>,
    wrap: impl FnOnce(E) -> BootstrapError,
) -> Result<(), BootstrapError> {
    result?.map_err(wrap)
}
