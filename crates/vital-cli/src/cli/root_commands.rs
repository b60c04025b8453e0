use std::path::PathBuf;

use clap::{Args, Subcommand};
use vital_session::DEFAULT_PROFILE_KEY;

/// Top-level command tree.
#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// Drive a measurement session from a recorded JSONL script of vendor events.
    Replay(ReplayArgs),
    /// Questionnaire profile storage.
    Profile {
        #[command(subcommand)]
        action: ProfileCommands,
    },
    /// Map a raw vendor points file into a measurement record.
    Map(MapArgs),
    /// Print the JSON schema of the measurement record.
    Schema,
}

#[derive(Clone, Debug, Args)]
pub struct ReplayArgs {
    /// JSONL file, one `{"after_ms": .., "event": {..}}` per line.
    pub script: PathBuf,
    /// Stored profile to measure with.
    #[arg(long, default_value = DEFAULT_PROFILE_KEY)]
    pub profile_key: String,
    /// User the record is saved for.
    #[arg(long, default_value = "local-user")]
    pub user: String,
    /// Keep the record in memory and print it instead of saving it.
    #[arg(long)]
    pub dry_run: bool,
    /// Give up after this many restarts.
    #[arg(long, default_value_t = 3)]
    pub max_restarts: u32,
    /// Override the measurement timeout in seconds (0 disables it).
    #[arg(long)]
    pub timeout_secs: Option<u64>,
}

#[derive(Clone, Debug, Subcommand)]
pub enum ProfileCommands {
    /// Store a profile from a JSON file.
    Set {
        file: PathBuf,
        #[arg(long, default_value = DEFAULT_PROFILE_KEY)]
        key: String,
    },
    /// Print a stored profile.
    Show {
        #[arg(long, default_value = DEFAULT_PROFILE_KEY)]
        key: String,
    },
}

#[derive(Clone, Debug, Args)]
pub struct MapArgs {
    /// JSON object of vendor points, `{"HR_BPM": {"value": 72}, ...}`.
    pub points: PathBuf,
    /// User id written into the record.
    #[arg(long, default_value = "local-user")]
    pub user: String,
}
