use anyhow::Context;
use sky_auth::KeyringStore;
use sky_client::Client;
use sky_config::SkyConfig;

use crate::cli::GlobalFlags;

/// Load layered configuration (after `.env`) and apply command-line overrides.
pub fn load_config(flags: &GlobalFlags) -> anyhow::Result<SkyConfig> {
    let mut config = SkyConfig::load_with_dotenv().context("failed to load configuration")?;
    if let Some(base_url) = &flags.base_url {
        config.api.base_url.clone_from(base_url);
    }
    if flags.no_correct {
        config.api.clock_correct = false;
    }
    if flags.quiet {
        config.download.quiet = true;
    }
    config.validate().context("invalid configuration")?;
    Ok(config)
}

/// Client for `config`, with named-account secrets looked up in the keychain.
pub fn client(config: &SkyConfig) -> anyhow::Result<Client> {
    let store = KeyringStore::new(config.api.keyring_service.as_str());
    Client::from_config(config, Some(&store)).context("failed to create service client")
}
