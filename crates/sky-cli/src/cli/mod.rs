use clap::Parser;

pub mod global;
pub mod parse;
pub mod root_commands;
pub mod subcommands;

pub use global::{GlobalFlags, OutputFormat};
pub use root_commands::Commands;

/// Top-level CLI parser for the `sky` binary.
#[derive(Debug, Parser)]
#[command(name = "sky", version, about = "Observation-planning service client")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format: json, raw
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Quiet mode (errors only, no progress bars)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose mode (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Service base URL (overrides configuration)
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Skip clock correction of returned times
    #[arg(long, global = true)]
    pub no_correct: bool,
}

impl Cli {
    /// Extract ergonomic global flags struct for command handlers.
    #[must_use]
    pub fn global_flags(&self) -> GlobalFlags {
        GlobalFlags {
            format: self.format,
            quiet: self.quiet,
            base_url: self.base_url.clone(),
            no_correct: self.no_correct,
        }
    }
}
