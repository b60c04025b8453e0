use vital_config::VitalsConfig;

use crate::cli::{Commands, GlobalFlags};

pub mod map;
pub mod profile;
pub mod replay;
pub mod schema;

/// Dispatch commands that need the loaded configuration.
pub async fn dispatch(
    command: Commands,
    config: VitalsConfig,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match command {
        Commands::Replay(args) => replay::handle(&args, config, flags).await,
        Commands::Profile { action } => profile::handle(&action, &config, flags),
        Commands::Map(_) | Commands::Schema => {
            unreachable!("map/schema are pre-dispatched in main")
        }
    }
}
