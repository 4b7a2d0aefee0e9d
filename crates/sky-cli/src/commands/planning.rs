//! `sky saa`, `sky visibility` and `sky resolve`.

use serde::Serialize;
use sky_client::Client;
use sky_client::entities::{Resolve, SaaQuery, VisibilityQuery};
use sky_core::time::as_seconds;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::{ResolveArgs, SaaArgs, VisibilityArgs};
use crate::commands::fetch;
use crate::output::output;

pub fn saa(args: &SaaArgs, client: &Client, flags: &GlobalFlags) -> anyhow::Result<()> {
    let mut query = SaaQuery::with_range(args.range.to_range()).bat(args.bat);
    fetch(client, &mut query)?;
    output(&query, flags.format)
}

#[derive(Serialize)]
struct VisibilityResponse<'a> {
    #[serde(flatten)]
    query: &'a VisibilityQuery,
    total_visible_secs: Option<f64>,
}

pub fn visibility(args: &VisibilityArgs, client: &Client, flags: &GlobalFlags) -> anyhow::Result<()> {
    let mut query = VisibilityQuery::default().hires(args.hires);
    query.range = args.range.to_range();
    query.name.clone_from(&args.target.name);
    query.ra = args.target.ra;
    query.dec = args.target.dec;
    fetch(client, &mut query)?;

    let total_visible_secs = query.total_visible().ok().map(as_seconds);
    output(
        &VisibilityResponse {
            query: &query,
            total_visible_secs,
        },
        flags.format,
    )
}

pub fn resolve(args: &ResolveArgs, client: &Client, flags: &GlobalFlags) -> anyhow::Result<()> {
    let mut resolve = Resolve::new(args.name.as_str());
    fetch(client, &mut resolve)?;
    output(&resolve, flags.format)
}
