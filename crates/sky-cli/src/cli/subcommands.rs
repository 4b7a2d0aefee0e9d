use clap::{Args, Subcommand};

/// Credential commands.
#[derive(Clone, Debug, Subcommand)]
pub enum AuthCommands {
    /// Remember a shared secret in the OS keychain.
    Store(AuthStoreArgs),
    /// Forget a stored shared secret.
    Delete(AuthUserArgs),
    /// Show which credentials requests would use.
    Status,
}

#[derive(Clone, Debug, Args)]
pub struct AuthStoreArgs {
    /// Shared secret for the account
    pub secret: String,
    /// Account name (defaults to the configured username)
    #[arg(long)]
    pub username: Option<String>,
}

#[derive(Clone, Debug, Args)]
pub struct AuthUserArgs {
    /// Account name (defaults to the configured username)
    #[arg(long)]
    pub username: Option<String>,
}
