//! Client-local storage of the questionnaire profile.
//!
//! Profiles are JSON files named `{key}.json` in the profile directory. The
//! questionnaire writes one; the measurement session reads it once at start.

use std::path::{Path, PathBuf};

use vital_config::StorageConfig;
use vital_core::Profile;

use crate::error::ProfileStoreError;

/// Key the questionnaire stores its answers under.
pub const DEFAULT_PROFILE_KEY: &str = "health_profile";

/// Read side of the profile store, as seen by the session bootstrap.
pub trait ProfileSource: Send + Sync {
    /// `Ok(None)` when nothing is stored under `key`.
    fn load(&self, key: &str) -> Result<Option<Profile>, ProfileStoreError>;
}

#[derive(Debug, Clone)]
pub struct FileProfileStore {
    dir: PathBuf,
}

impl FileProfileStore {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// # Errors
    ///
    /// Returns `NoProfileDir` when no directory is configured and the platform
    /// has no data directory.
    pub fn from_config(config: &StorageConfig) -> Result<Self, ProfileStoreError> {
        config
            .profile_dir()
            .map(Self::new)
            .ok_or(ProfileStoreError::NoProfileDir)
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// # Errors
    ///
    /// Returns `InvalidKey` for keys outside `[A-Za-z0-9_-]`.
    pub fn path_for(&self, key: &str) -> Result<PathBuf, ProfileStoreError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(ProfileStoreError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }

    /// Store `profile` under `key`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns an error for an invalid key or if the file cannot be written.
    pub fn save(&self, key: &str, profile: &Profile) -> Result<PathBuf, ProfileStoreError> {
        let path = self.path_for(key)?;
        std::fs::create_dir_all(&self.dir).map_err(|source| ProfileStoreError::Io {
            path: self.dir.clone(),
            source,
        })?;
        let json = serde_json::to_string_pretty(profile)?;
        std::fs::write(&path, json).map_err(|source| ProfileStoreError::Io {
            path: path.clone(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "profile saved");
        Ok(path)
    }
}

impl ProfileSource for FileProfileStore {
    fn load(&self, key: &str) -> Result<Option<Profile>, ProfileStoreError> {
        let path = self.path_for(key)?;
        let raw = match std::fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(ProfileStoreError::Io { path, source }),
        };
        Ok(Some(serde_json::from_str(&raw)?))
    }
}
