//! `sky data`.

use anyhow::bail;
use serde::Serialize;
use sky_client::entities::{DataFile, DataQuery};
use sky_client::{Client, DownloadReport, HttpDownloader};
use sky_config::SkyConfig;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::DataArgs;
use crate::commands::fetch;
use crate::output::output;

#[derive(Serialize)]
struct DataListing<'a> {
    obsid: Option<&'a str>,
    entries: &'a [DataFile],
    #[serde(skip_serializing_if = "Option::is_none")]
    download: Option<DownloadReport>,
}

fn build_query(args: &DataArgs) -> DataQuery {
    let mut query = match (&args.obsid, args.targetid, args.segment) {
        (Some(obsid), _, _) => DataQuery::new(obsid.as_str()),
        (None, Some(targetid), Some(segment)) => DataQuery::for_segment(targetid, segment),
        _ => DataQuery::default(),
    };
    if args.all {
        query = query.all();
    }
    query.bat |= args.bat;
    query.xrt |= args.xrt;
    query.uvot |= args.uvot;
    query.log |= args.log;
    query.tdrss |= args.tdrss;
    query.auxil = !args.no_auxil;
    query.quicklook = args.quicklook;
    query.uksdc = args.uksdc;
    query.itsdc = args.itsdc;
    query.subthresh = args.subthresh;
    query.patterns.clone_from(&args.patterns);
    query
}

pub fn handle(
    args: &DataArgs,
    client: &Client,
    config: &SkyConfig,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let mut query = build_query(args);
    fetch(client, &mut query)?;

    let download = if args.download {
        let mut options = config.download.clone();
        if let Some(outdir) = &args.outdir {
            options.outdir.clone_from(outdir);
        }
        options.clobber |= args.clobber;

        let downloader = HttpDownloader::new(config.api.timeout())?;
        let report = query.download(&downloader, &options);
        if !report.is_complete() || query.status.is_rejected() {
            bail!("{}", query.status.errors.join(" "));
        }
        for warning in &query.status.warnings {
            tracing::warn!("{warning}");
        }
        Some(report)
    } else {
        None
    };

    output(
        &DataListing {
            obsid: query.obsid.as_deref(),
            entries: &query.entries,
            download,
        },
        flags.format,
    )
}
