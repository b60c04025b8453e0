use schemars::schema_for;
use vital_core::MeasurementRecord;

use crate::cli::GlobalFlags;
use crate::output::output;

/// Handle `vitals schema`.
pub fn handle(flags: &GlobalFlags) -> anyhow::Result<()> {
    output(&schema_for!(MeasurementRecord), flags.format)
}
