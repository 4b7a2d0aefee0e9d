use std::path::PathBuf;

use chrono::NaiveDateTime;
use clap::{ArgGroup, Args, Subcommand, ValueEnum};
use sky_core::TimeRange;

use crate::cli::parse::parse_time;
use crate::cli::subcommands::AuthCommands;

/// Top-level command tree.
#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// Convert between MET, spacecraft time and universal time.
    Clock(ClockArgs),
    /// South Atlantic Anomaly passages.
    Saa(SaaArgs),
    /// Visibility windows of a position or named target.
    Visibility(VisibilityArgs),
    /// As-flown observation timeline.
    Observations(ObservationArgs),
    /// Pre-planned observation timeline.
    Plan(ObservationArgs),
    /// Resolve a target name to coordinates.
    Resolve(ResolveArgs),
    /// List (and optionally download) archived data for an observation.
    Data(DataArgs),
    /// Print the JSON Schema of a response type.
    Schema(SchemaArgs),
    /// Stored credentials.
    Auth {
        #[command(subcommand)]
        action: AuthCommands,
    },
}

/// Time range shared by the planning queries.
#[derive(Clone, Debug, Args)]
pub struct RangeArgs {
    /// Range start (YYYY-MM-DD[THH:MM[:SS]])
    #[arg(long, value_parser = parse_time)]
    pub begin: Option<NaiveDateTime>,
    /// Range end
    #[arg(long, value_parser = parse_time, conflicts_with = "length")]
    pub end: Option<NaiveDateTime>,
    /// Range length in days
    #[arg(long)]
    pub length: Option<f64>,
}

impl RangeArgs {
    #[must_use]
    pub const fn to_range(&self) -> TimeRange {
        TimeRange {
            begin: self.begin,
            end: self.end,
            length: self.length,
        }
    }
}

/// A sky position or a target name to resolve.
#[derive(Clone, Debug, Args)]
pub struct TargetArgs {
    /// Right ascension in degrees
    #[arg(long, allow_negative_numbers = true)]
    pub ra: Option<f64>,
    /// Declination in degrees
    #[arg(long, allow_negative_numbers = true)]
    pub dec: Option<f64>,
    /// Target name, resolved to coordinates before the query
    #[arg(long, conflicts_with_all = ["ra", "dec"])]
    pub name: Option<String>,
}

#[derive(Clone, Debug, Args)]
#[command(group(ArgGroup::new("input").required(true).args(["met", "swifttime", "utctime"])))]
pub struct ClockArgs {
    /// Mission-elapsed seconds
    #[arg(long, num_args = 1..)]
    pub met: Vec<f64>,
    /// Spacecraft-clock times
    #[arg(long, num_args = 1.., value_parser = parse_time)]
    pub swifttime: Vec<NaiveDateTime>,
    /// Universal times
    #[arg(long, num_args = 1.., value_parser = parse_time)]
    pub utctime: Vec<NaiveDateTime>,
    /// Present results in spacecraft time instead of universal time
    #[arg(long)]
    pub spacecraft: bool,
}

#[derive(Clone, Debug, Args)]
pub struct SaaArgs {
    #[command(flatten)]
    pub range: RangeArgs,
    /// Use the BAT SAA polygon
    #[arg(long)]
    pub bat: bool,
}

#[derive(Clone, Debug, Args)]
pub struct VisibilityArgs {
    #[command(flatten)]
    pub target: TargetArgs,
    #[command(flatten)]
    pub range: RangeArgs,
    /// High time resolution windows
    #[arg(long)]
    pub hires: bool,
}

#[derive(Clone, Debug, Args)]
pub struct ObservationArgs {
    #[command(flatten)]
    pub target: TargetArgs,
    #[command(flatten)]
    pub range: RangeArgs,
    /// Search radius in degrees
    #[arg(long)]
    pub radius: Option<f64>,
    /// Target IDs
    #[arg(long, num_args = 1..)]
    pub targetid: Vec<u64>,
    /// Observation number
    #[arg(long)]
    pub obsnum: Option<u64>,
    /// Print one summary per observation instead of every entry
    #[arg(long)]
    pub summary: bool,
}

#[derive(Clone, Debug, Args)]
pub struct ResolveArgs {
    /// Target name
    pub name: String,
}

#[derive(Clone, Debug, Args)]
pub struct DataArgs {
    /// 11-digit observation ID
    #[arg(conflicts_with_all = ["targetid", "segment"])]
    pub obsid: Option<String>,
    /// Target ID (with --segment)
    #[arg(long, requires = "segment")]
    pub targetid: Option<u64>,
    /// Segment number (with --targetid)
    #[arg(long, requires = "targetid")]
    pub segment: Option<u32>,
    /// Every instrument
    #[arg(long)]
    pub all: bool,
    #[arg(long)]
    pub bat: bool,
    #[arg(long)]
    pub xrt: bool,
    #[arg(long)]
    pub uvot: bool,
    #[arg(long)]
    pub log: bool,
    #[arg(long)]
    pub tdrss: bool,
    /// Leave out auxiliary files
    #[arg(long)]
    pub no_auxil: bool,
    /// Search quicklook data only
    #[arg(long)]
    pub quicklook: bool,
    /// Use the UK data centre
    #[arg(long, conflicts_with = "itsdc")]
    pub uksdc: bool,
    /// Use the Italian data centre
    #[arg(long)]
    pub itsdc: bool,
    /// Include BAT sub-threshold triggers
    #[arg(long)]
    pub subthresh: bool,
    /// Keep only files whose path/filename matches a glob
    #[arg(long = "match", value_name = "GLOB")]
    pub patterns: Vec<String>,
    /// Download the listed files
    #[arg(long)]
    pub download: bool,
    /// Download directory (overrides configuration)
    #[arg(long, requires = "download")]
    pub outdir: Option<PathBuf>,
    /// Overwrite existing files
    #[arg(long, requires = "download")]
    pub clobber: bool,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum SchemaType {
    Clock,
    Saa,
    Visibility,
    Observations,
    Plan,
    Resolve,
    Data,
    Status,
}

#[derive(Clone, Debug, Args)]
pub struct SchemaArgs {
    /// Response type
    pub type_name: SchemaType,
}
