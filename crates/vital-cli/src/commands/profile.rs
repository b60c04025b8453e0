use std::path::Path;

use anyhow::Context;
use serde::Serialize;
use vital_config::VitalsConfig;
use vital_core::Profile;
use vital_session::{FileProfileStore, ProfileSource};

use crate::cli::{GlobalFlags, ProfileCommands};
use crate::output::output;

#[derive(Serialize)]
struct ProfileSetResponse {
    key: String,
    path: String,
    profile: Profile,
}

/// Handle `vitals profile`.
pub fn handle(
    action: &ProfileCommands,
    config: &VitalsConfig,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let store = FileProfileStore::from_config(&config.storage)?;
    match action {
        ProfileCommands::Set { file, key } => {
            let profile = read_profile(file)?;
            let path = store.save(key, &profile)?;
            output(
                &ProfileSetResponse {
                    key: key.clone(),
                    path: path.display().to_string(),
                    profile,
                },
                flags.format,
            )
        }
        ProfileCommands::Show { key } => {
            let profile = store
                .load(key)?
                .with_context(|| format!("no profile stored under '{key}'"))?;
            output(&profile, flags.format)
        }
    }
}

/// Parse and validate a questionnaire profile file.
fn read_profile(path: &Path) -> anyhow::Result<Profile> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read profile file {}", path.display()))?;
    let profile: Profile = serde_json::from_str(&raw)
        .with_context(|| format!("{} is not a valid profile", path.display()))?;
    profile.validate()?;
    Ok(profile)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &Path, body: &str) -> std::path::PathBuf {
        let path = dir.join("profile.json");
        std::fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn reads_valid_profile() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = write(
            tmp.path(),
            r#"{"age": 40, "sex": "male", "height_cm": 180, "weight_kg": 82,
                "diabetes_status": "none", "smoking": false, "bp_medication": false}"#,
        );
        assert_eq!(read_profile(&path).unwrap().age, 40);
    }

    #[test]
    fn rejects_out_of_range_profile() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = write(
            tmp.path(),
            r#"{"age": 12, "sex": "female", "height_cm": 150, "weight_kg": 40,
                "diabetes_status": "pre", "smoking": false, "bp_medication": false}"#,
        );
        let err = read_profile(&path).unwrap_err();
        assert!(err.to_string().contains("age"));
    }
}
