//! `/swift/data`: archive file listings for one observation, and download.

use globset::{Glob, GlobSet, GlobSetBuilder};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use sky_config::DownloadConfig;
use sky_core::Status;
use tracing::{debug, warn};

use crate::download::{self, DownloadReport, Downloader};
use crate::entity::{Entity, Fetchable, Validatable};
use crate::error::ClientError;

/// One archived file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct DataFile {
    pub filename: String,
    /// Directory relative to the observation root.
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub quicklook: bool,
    /// Short description of the file's contents.
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
}

impl DataFile {
    /// `path/filename`, the string match patterns are tested against.
    #[must_use]
    pub fn relative_path(&self) -> String {
        if self.path.is_empty() {
            self.filename.clone()
        } else {
            format!("{}/{}", self.path.trim_end_matches('/'), self.filename)
        }
    }
}

/// Data products of one observation, selected by instrument.
#[derive(Debug, Clone, Serialize)]
pub struct DataQuery {
    /// 11-digit observation id.
    pub obsid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub targetid: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub segment: Option<u32>,
    pub auxil: bool,
    pub bat: bool,
    pub xrt: bool,
    pub uvot: bool,
    pub log: bool,
    pub tdrss: bool,
    /// Only search quicklook data.
    pub quicklook: bool,
    /// Use the UK or Italian data centre instead of the US one.
    pub uksdc: bool,
    pub itsdc: bool,
    pub subthresh: bool,
    /// Glob patterns on `path/filename`; files matching none are dropped.
    pub patterns: Vec<String>,
    pub entries: Vec<DataFile>,
    pub status: Status,
}

impl Default for DataQuery {
    fn default() -> Self {
        Self {
            obsid: None,
            targetid: None,
            segment: None,
            auxil: true,
            bat: false,
            xrt: false,
            uvot: false,
            log: false,
            tdrss: false,
            quicklook: false,
            uksdc: false,
            itsdc: false,
            subthresh: false,
            patterns: Vec::new(),
            entries: Vec::new(),
            status: Status::default(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DataParams {
    pub obsid: Option<String>,
    pub auxil: bool,
    pub bat: Option<bool>,
    pub xrt: Option<bool>,
    pub uvot: Option<bool>,
    pub log: Option<bool>,
    pub tdrss: Option<bool>,
    pub quicklook: bool,
    pub uksdc: Option<bool>,
    pub itsdc: Option<bool>,
    pub subthresh: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct DataResponse {
    #[serde(default)]
    pub obsid: Option<String>,
    #[serde(default)]
    pub entries: Vec<DataFile>,
    #[serde(default)]
    pub status: Option<Status>,
}

impl DataQuery {
    #[must_use]
    pub fn new(obsid: impl Into<String>) -> Self {
        Self {
            obsid: Some(obsid.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn for_segment(targetid: u64, segment: u32) -> Self {
        Self {
            targetid: Some(targetid),
            segment: Some(segment),
            ..Self::default()
        }
    }

    /// Select every instrument and the auxiliary files.
    #[must_use]
    pub const fn all(mut self) -> Self {
        self.auxil = true;
        self.bat = true;
        self.xrt = true;
        self.uvot = true;
        self.log = true;
        self.tdrss = true;
        self
    }

    #[must_use]
    pub fn matching(mut self, pattern: impl Into<String>) -> Self {
        self.patterns.push(pattern.into());
        self
    }

    fn match_set(&self) -> Result<Option<GlobSet>, ClientError> {
        if self.patterns.is_empty() {
            return Ok(None);
        }
        let mut builder = GlobSetBuilder::new();
        for pattern in &self.patterns {
            let glob = Glob::new(pattern).map_err(|e| {
                ClientError::Query(format!("invalid match pattern '{pattern}': {e}"))
            })?;
            builder.add(glob);
        }
        builder
            .build()
            .map(Some)
            .map_err(|e| ClientError::Query(e.to_string()))
    }

    /// Download every listed file under `options.outdir`.
    ///
    /// Existing files are skipped with a warning unless `options.clobber`.
    /// Entries whose path would leave `outdir` are refused with an error.
    /// An empty listing rejects the request; the first failed file is
    /// recorded as an error and stops the run.
    pub fn download(
        &mut self,
        downloader: &dyn Downloader,
        options: &DownloadConfig,
    ) -> DownloadReport {
        let mut report = DownloadReport::default();
        if self.entries.is_empty() {
            let obsid = self.obsid.as_deref().unwrap_or("this observation");
            self.status.reject(format!("No data found for {obsid}."));
            return report;
        }

        let outdir = std::path::absolute(&options.outdir).unwrap_or_else(|_| options.outdir.clone());
        let bar = download::progress_bar(self.entries.len(), options.quiet);
        for file in &self.entries {
            let Some(destination) = download::destination_under(&outdir, &file.path, &file.filename)
            else {
                warn!(
                    path = %file.path,
                    file = %file.filename,
                    "refusing to write outside the output directory"
                );
                self.status.error(format!(
                    "Refusing to download {} outside {}.",
                    file.relative_path(),
                    outdir.display()
                ));
                report.refused.push(file.relative_path());
                if let Some(bar) = &bar {
                    bar.inc(1);
                }
                continue;
            };
            if destination.exists() && !options.clobber {
                if !options.quiet {
                    warn!(path = %destination.display(), "file exists and not overwritten");
                }
                self.status.warning(format!(
                    "{} exists and not overwritten (set clobber to override this).",
                    file.filename
                ));
                report.skipped.push(destination);
            } else {
                let result = match &file.url {
                    Some(url) => downloader.download(url, &destination),
                    None => Err(ClientError::Query(format!("{} has no URL", file.filename))),
                };
                match result {
                    Ok(bytes) => {
                        debug!(path = %destination.display(), bytes, "downloaded");
                        report.downloaded.push(destination);
                    }
                    Err(error) => {
                        warn!(%error, file = %file.filename, "download failed");
                        self.status
                            .error(format!("Error downloading {}", file.filename));
                        report.failed = Some(destination);
                        break;
                    }
                }
            }
            if let Some(bar) = &bar {
                bar.inc(1);
            }
        }
        if let Some(bar) = bar {
            if report.is_complete() {
                bar.finish_and_clear();
            } else {
                bar.abandon_with_message("download failed");
            }
        }
        report
    }
}

impl Fetchable for DataQuery {
    const NAME: &'static str = "Data";
    const ENDPOINT: &'static str = "/swift/data";

    type Query = DataParams;
    type Response = DataResponse;

    fn status(&self) -> &Status {
        &self.status
    }

    fn status_mut(&mut self) -> &mut Status {
        &mut self.status
    }

    fn query(&self) -> DataParams {
        let flag = |selected: bool| selected.then_some(true);
        DataParams {
            obsid: self.obsid.clone(),
            auxil: self.auxil,
            bat: flag(self.bat),
            xrt: flag(self.xrt),
            uvot: flag(self.uvot),
            log: flag(self.log),
            tdrss: flag(self.tdrss),
            quicklook: self.quicklook,
            uksdc: flag(self.uksdc),
            itsdc: flag(self.itsdc),
            subthresh: flag(self.subthresh),
        }
    }

    fn populate(&mut self, response: DataResponse) -> Option<Status> {
        if response.obsid.is_some() {
            self.obsid = response.obsid;
        }
        self.entries = response.entries;
        response.status
    }

    fn post_process(&mut self) -> Result<(), ClientError> {
        let Some(matcher) = self.match_set()? else {
            return Ok(());
        };
        let before = self.entries.len();
        self.entries
            .retain(|file| matcher.is_match(file.relative_path()));
        debug!(kept = self.entries.len(), dropped = before - self.entries.len(), "filtered data files");
        Ok(())
    }
}

impl Validatable for DataQuery {
    fn validate(&mut self) -> Vec<String> {
        let mut violations = Vec::new();
        match (self.targetid, self.segment) {
            (Some(targetid), Some(segment)) if self.obsid.is_none() => {
                self.obsid = Some(format!("{targetid:08}{segment:03}"));
            }
            (Some(_), None) | (None, Some(_)) if self.obsid.is_none() => {
                violations.push("Both target ID and segment must be provided.".to_string());
            }
            _ => {}
        }
        match self.obsid.as_deref().map(str::trim) {
            None if violations.is_empty() => {
                violations.push("Observation ID must be provided.".to_string());
            }
            Some(obsid) if obsid.len() != 11 || !obsid.bytes().all(|b| b.is_ascii_digit()) => {
                violations.push(format!("Observation ID must be 11 digits, got '{obsid}'."));
            }
            _ => {}
        }
        if self.uksdc && self.itsdc {
            violations.push("Only one of 'uksdc' or 'itsdc' may be selected.".to_string());
        }
        if let Err(error) = self.match_set() {
            violations.push(error.to_string());
        }
        violations
    }
}

impl Entity for DataQuery {}
