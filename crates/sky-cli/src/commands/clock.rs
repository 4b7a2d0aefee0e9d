use sky_client::Client;
use sky_client::entities::Clock;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::ClockArgs;
use crate::commands::fetch;
use crate::output::output;

/// Handle `sky clock`.
pub fn handle(args: &ClockArgs, client: &Client, flags: &GlobalFlags) -> anyhow::Result<()> {
    let mut clock = if !args.met.is_empty() {
        Clock::from_met(args.met.clone())
    } else if !args.swifttime.is_empty() {
        Clock::from_spacecraft(args.swifttime.clone())
    } else {
        Clock::from_universal(args.utctime.clone())
    };
    fetch(client, &mut clock)?;

    if args.spacecraft {
        clock.to_spacecraft_time();
    } else {
        clock.to_universal_time();
    }
    output(&clock.entries, flags.format)
}
