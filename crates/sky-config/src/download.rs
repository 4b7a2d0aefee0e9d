//! Data download settings.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

fn default_outdir() -> PathBuf {
    PathBuf::from(".")
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DownloadConfig {
    /// Directory downloaded files are written under.
    #[serde(default = "default_outdir")]
    pub outdir: PathBuf,

    /// Overwrite files that already exist.
    #[serde(default)]
    pub clobber: bool,

    /// Suppress progress bars.
    #[serde(default)]
    pub quiet: bool,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            outdir: default_outdir(),
            clobber: false,
            quiet: false,
        }
    }
}
