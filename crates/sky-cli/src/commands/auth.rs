use serde::Serialize;
use sky_auth::{KeyringStore, SecretStore};
use sky_config::SkyConfig;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::AuthCommands;
use crate::output::output;

#[derive(Serialize)]
struct AuthStoreResponse<'a> {
    username: &'a str,
    stored: bool,
}

#[derive(Serialize)]
struct AuthDeleteResponse<'a> {
    username: &'a str,
    cleared: bool,
}

#[derive(Serialize)]
struct AuthStatusResponse {
    username: String,
    anonymous: bool,
    secret_source: Option<&'static str>,
    note: Option<String>,
}

/// Handle `sky auth <subcommand>`.
pub fn handle(action: &AuthCommands, config: &SkyConfig, flags: &GlobalFlags) -> anyhow::Result<()> {
    let store = KeyringStore::new(config.api.keyring_service.as_str());
    match action {
        AuthCommands::Store(args) => {
            let username = args.username.as_deref().unwrap_or(&config.api.username);
            if username == sky_config::ANONYMOUS {
                anyhow::bail!("the anonymous account has no secret to store; pass --username");
            }
            store.store(username, &args.secret)?;
            output(&AuthStoreResponse { username, stored: true }, flags.format)
        }
        AuthCommands::Delete(args) => {
            let username = args.username.as_deref().unwrap_or(&config.api.username);
            store.delete(username)?;
            output(&AuthDeleteResponse { username, cleared: true }, flags.format)
        }
        AuthCommands::Status => output(&status(config, &store), flags.format),
    }
}

fn status(config: &SkyConfig, store: &dyn SecretStore) -> AuthStatusResponse {
    let username = config.api.username.clone();
    if config.api.is_anonymous() {
        return AuthStatusResponse {
            username,
            anonymous: true,
            secret_source: None,
            note: None,
        };
    }
    if config.api.has_secret() {
        return AuthStatusResponse {
            username,
            anonymous: false,
            secret_source: Some("config"),
            note: None,
        };
    }
    match store.load(&username) {
        Ok(Some(_)) => AuthStatusResponse {
            username,
            anonymous: false,
            secret_source: Some("keyring"),
            note: None,
        },
        Ok(None) => AuthStatusResponse {
            username,
            anonymous: false,
            secret_source: None,
            note: Some("no secret stored; run 'sky auth store <secret>' or set SKY_API__SHARED_SECRET".into()),
        },
        Err(error) => AuthStatusResponse {
            username,
            anonymous: false,
            secret_source: None,
            note: Some(error.to_string()),
        },
    }
}
