//! Error types for the session crate.
//!
//! Vendor-originating failures never surface as these types: they are
//! classified and handled inside the controller. These errors cover the
//! bootstrap sequence, the engine contract and the persistence boundary.

use std::path::PathBuf;

use thiserror::Error;
use vital_auth::AuthError;
use vital_config::ConfigError;
use vital_core::CoreError;

/// A call into the vendor engine failed.
#[derive(Debug, Error)]
#[error("engine {operation} failed: {message}")]
pub struct EngineError {
    pub operation: &'static str,
    pub message: String,
}

impl EngineError {
    #[must_use]
    pub fn new(operation: &'static str, message: impl Into<String>) -> Self {
        Self {
            operation,
            message: message.into(),
        }
    }
}

/// One failing step of the session bootstrap.
///
/// Every variant except [`BootstrapError::Canceled`] ends the session in a
/// non-recoverable error dialog.
#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("profile not found")]
    ProfileNotFound,

    #[error("invalid profile: {0}")]
    InvalidProfile(#[from] CoreError),

    #[error(transparent)]
    ProfileStore(#[from] ProfileStoreError),

    #[error(transparent)]
    NotConfigured(#[from] ConfigError),

    #[error("token acquisition failed: {0}")]
    Token(#[from] AuthError),

    #[error("failed to load measurement module: {0}")]
    ModuleLoad(#[source] EngineError),

    #[error("engine initialization failed: {0}")]
    EngineInit(#[source] EngineError),

    #[error("engine start failed: {0}")]
    EngineStart(#[source] EngineError),

    /// The screen was left while a bootstrap step was in flight.
    #[error("bootstrap canceled")]
    Canceled,
}

#[derive(Debug, Error)]
pub enum ProfileStoreError {
    #[error("failed to access profile at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("stored profile is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid profile key '{0}': use letters, digits, '-' or '_'")]
    InvalidKey(String),

    #[error("no profile directory available on this platform")]
    NoProfileDir,
}

/// The single outbound write of a measurement record failed.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered with a non-success status.
    #[error("backend rejected measurement ({status}): {detail}")]
    Rejected { status: u16, detail: String },

    #[error("malformed backend response: {0}")]
    MalformedResponse(String),

    #[error("{0}")]
    Other(String),
}
