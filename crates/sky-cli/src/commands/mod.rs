pub mod auth;
pub mod clock;
pub mod data;
pub mod observations;
pub mod planning;
pub mod schema;

use sky_client::{Client, Entity};
use sky_config::SkyConfig;

use crate::bootstrap;
use crate::cli::{Commands, GlobalFlags};

/// Route a parsed command to its handler.
pub fn dispatch(command: Commands, config: &SkyConfig, flags: &GlobalFlags) -> anyhow::Result<()> {
    match command {
        Commands::Clock(args) => clock::handle(&args, &bootstrap::client(config)?, flags),
        Commands::Saa(args) => planning::saa(&args, &bootstrap::client(config)?, flags),
        Commands::Visibility(args) => {
            planning::visibility(&args, &bootstrap::client(config)?, flags)
        }
        Commands::Plan(args) => observations::plan(&args, &bootstrap::client(config)?, flags),
        Commands::Resolve(args) => planning::resolve(&args, &bootstrap::client(config)?, flags),
        Commands::Observations(args) => {
            observations::handle(&args, &bootstrap::client(config)?, flags)
        }
        Commands::Data(args) => data::handle(&args, &bootstrap::client(config)?, config, flags),
        Commands::Auth { action } => auth::handle(&action, config, flags),
        Commands::Schema(args) => schema::handle(&args, flags),
    }
}

/// Fetch `entity`, failing with its status errors when rejected. Warnings
/// are logged and stay on the entity's status.
pub fn fetch<E: Entity>(client: &Client, entity: &mut E) -> anyhow::Result<()> {
    client.fetch_accepted(entity)?;
    for warning in &entity.status().warnings {
        tracing::warn!(entity = E::NAME, "{warning}");
    }
    Ok(())
}
