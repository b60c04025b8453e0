//! Client-local storage locations.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct StorageConfig {
    /// Directory holding stored questionnaire profiles. Empty means the
    /// platform data directory (`~/.local/share/vitals/profiles` on Linux).
    #[serde(default)]
    pub profile_dir: String,
}

impl StorageConfig {
    /// Resolve the profile directory, falling back to the platform data dir.
    #[must_use]
    pub fn profile_dir(&self) -> Option<PathBuf> {
        if self.profile_dir.is_empty() {
            dirs::data_dir().map(|p| p.join("vitals").join("profiles"))
        } else {
            Some(PathBuf::from(&self.profile_dir))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_dir_wins() {
        let config = StorageConfig {
            profile_dir: "/tmp/vitals-profiles".into(),
        };
        assert_eq!(
            config.profile_dir(),
            Some(PathBuf::from("/tmp/vitals-profiles"))
        );
    }
}
