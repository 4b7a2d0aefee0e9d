//! `sky observations` and `sky plan`.

use serde::Serialize;
use sky_client::Client;
use sky_client::entities::{Observation, ObservationQuery, PlanQuery, PlannedPointing};
use sky_core::TimeValue;
use sky_core::time::as_seconds;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::ObservationArgs;
use crate::commands::fetch;
use crate::output::output;

#[derive(Serialize)]
struct ObservationSummary {
    obsid: String,
    targname: Option<String>,
    begin: Option<TimeValue>,
    end: Option<TimeValue>,
    snapshots: usize,
    exposure_secs: f64,
    slew_secs: f64,
}

impl ObservationSummary {
    fn from_observation(observation: &Observation) -> anyhow::Result<Self> {
        Ok(Self {
            obsid: observation.obsid(),
            targname: observation.targname().map(str::to_string),
            begin: observation.begin().cloned(),
            end: observation.end().cloned(),
            snapshots: observation.snapshots.len(),
            exposure_secs: as_seconds(observation.exposure()?),
            slew_secs: as_seconds(observation.slew_time()?),
        })
    }
}

#[derive(Serialize)]
struct PlanSummary {
    obsid: String,
    targname: Option<String>,
    begin: Option<TimeValue>,
    end: Option<TimeValue>,
    pointings: usize,
    exposure_secs: f64,
}

impl PlanSummary {
    fn from_pointings(obsnum: u64, pointings: &[PlannedPointing]) -> anyhow::Result<Self> {
        let exposure = pointings
            .iter()
            .try_fold(chrono::TimeDelta::zero(), |total, pointing| {
                Ok::<_, sky_core::CoreError>(total + pointing.exposure()?)
            })?;
        Ok(Self {
            obsid: format!("{obsnum:011}"),
            targname: pointings.first().and_then(|p| p.targname.clone()),
            begin: pointings.first().map(|p| p.begin.clone()),
            end: pointings.last().map(|p| p.end.clone()),
            pointings: pointings.len(),
            exposure_secs: as_seconds(exposure),
        })
    }
}

pub fn handle(args: &ObservationArgs, client: &Client, flags: &GlobalFlags) -> anyhow::Result<()> {
    let mut query = ObservationQuery::for_targets(args.targetid.clone()).with_range(args.range.to_range());
    query.name.clone_from(&args.target.name);
    query.ra = args.target.ra;
    query.dec = args.target.dec;
    query.obsnum = args.obsnum;
    if let Some(radius) = args.radius {
        query = query.with_radius(radius);
    }
    fetch(client, &mut query)?;

    if args.summary {
        let summaries = query
            .observations()
            .values()
            .map(ObservationSummary::from_observation)
            .collect::<anyhow::Result<Vec<_>>>()?;
        return output(&summaries, flags.format);
    }
    output(&query, flags.format)
}

pub fn plan(args: &ObservationArgs, client: &Client, flags: &GlobalFlags) -> anyhow::Result<()> {
    let mut query = PlanQuery::for_targets(args.targetid.clone()).with_range(args.range.to_range());
    query.name.clone_from(&args.target.name);
    query.ra = args.target.ra;
    query.dec = args.target.dec;
    query.obsnum = args.obsnum;
    if let Some(radius) = args.radius {
        query = query.with_radius(radius);
    }
    fetch(client, &mut query)?;

    if args.summary {
        let summaries = query
            .by_obsnum()
            .iter()
            .map(|(obsnum, pointings)| PlanSummary::from_pointings(*obsnum, pointings))
            .collect::<anyhow::Result<Vec<_>>>()?;
        return output(&summaries, flags.format);
    }
    output(&query, flags.format)
}
