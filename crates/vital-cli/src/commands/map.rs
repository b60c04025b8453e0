use std::path::Path;

use anyhow::Context;
use chrono::Utc;
use vital_core::MeasurementRecord;
use vital_session::{Points, map_points};

use crate::cli::GlobalFlags;
use crate::cli::root_commands::MapArgs;
use crate::output::output;

/// Handle `vitals map`.
pub fn handle(args: &MapArgs, flags: &GlobalFlags) -> anyhow::Result<()> {
    let record = map_file(&args.points, &args.user)?;
    output(&record, flags.format)
}

fn map_file(path: &Path, user: &str) -> anyhow::Result<MeasurementRecord> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read points file {}", path.display()))?;
    let points: Points = serde_json::from_str(&raw)
        .with_context(|| format!("{} is not a JSON object of vendor points", path.display()))?;
    Ok(map_points(&points, user, Utc::now()))
}
