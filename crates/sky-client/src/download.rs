//! Download collaborator for data file listings.

use std::fs::{self, File};
use std::path::{Component, Path, PathBuf};
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use tempfile::NamedTempFile;

use crate::error::ClientError;

/// Fetches one remote file to a local path.
pub trait Downloader {
    /// Write the body at `url` to `destination`, creating parent
    /// directories. Returns the number of bytes written.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Http`]/[`ClientError::Api`] for transport
    /// failures and [`ClientError::Io`] when the file cannot be written.
    fn download(&self, url: &str, destination: &Path) -> Result<u64, ClientError>;
}

/// What a download run did, file by file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DownloadReport {
    pub downloaded: Vec<PathBuf>,
    /// Files left alone because they already existed.
    pub skipped: Vec<PathBuf>,
    /// Listed files whose path would land outside the output directory.
    pub refused: Vec<String>,
    /// The file whose download failed and stopped the run.
    pub failed: Option<PathBuf>,
}

impl DownloadReport {
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failed.is_none() && self.refused.is_empty()
    }
}

/// Place `path/filename` under `outdir`.
///
/// `None` unless `path` is relative with plain components only and
/// `filename` is a single plain component.
#[must_use]
pub fn destination_under(outdir: &Path, path: &str, filename: &str) -> Option<PathBuf> {
    let plain = |text: &str| {
        Path::new(text)
            .components()
            .all(|component| matches!(component, Component::Normal(_)))
    };
    let name = Path::new(filename);
    if !plain(path) || !plain(filename) || name.components().count() != 1 {
        return None;
    }
    let destination = outdir.join(path).join(name);
    destination.starts_with(outdir).then_some(destination)
}

/// Write `destination` through a sibling temporary file that only replaces
/// it once `fill` succeeds. A failed write leaves any existing file as it was.
///
/// # Errors
///
/// Returns whatever `fill` returns, or [`ClientError::Io`] when the
/// temporary file cannot be created or moved into place.
pub fn write_atomically(
    destination: &Path,
    fill: impl FnOnce(&mut File) -> Result<u64, ClientError>,
) -> Result<u64, ClientError> {
    let parent = destination
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(parent)?;
    let mut staged = NamedTempFile::new_in(parent)?;
    let written = fill(staged.as_file_mut())?;
    staged.persist(destination).map_err(|error| error.error)?;
    Ok(written)
}

#[derive(Debug, Clone)]
pub struct HttpDownloader {
    http: reqwest::blocking::Client,
}

impl HttpDownloader {
    /// # Errors
    ///
    /// Returns [`ClientError::Http`] if the underlying client cannot be built.
    pub fn new(timeout: Duration) -> Result<Self, ClientError> {
        let http = reqwest::blocking::Client::builder()
            .user_agent(concat!("skyplan/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;
        Ok(Self { http })
    }
}

impl Downloader for HttpDownloader {
    fn download(&self, url: &str, destination: &Path) -> Result<u64, ClientError> {
        let mut response = self.http.get(url).send()?;
        if !response.status().is_success() {
            return Err(ClientError::Api {
                status: response.status().as_u16(),
                message: format!("download of {url} failed"),
            });
        }
        write_atomically(destination, |file| Ok(response.copy_to(file)?))
    }
}

/// A file-count progress bar, or nothing when quiet.
pub(crate) fn progress_bar(total: usize, quiet: bool) -> Option<ProgressBar> {
    if quiet {
        return None;
    }
    let bar = ProgressBar::new(total as u64);
    bar.set_style(
        ProgressStyle::with_template("{wide_bar:.cyan/blue} {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    bar.set_message("Downloading files");
    Some(bar)
}
