use schemars::{Schema, schema_for};
use sky_client::entities::clock::ClockResponse;
use sky_client::entities::data::DataResponse;
use sky_client::entities::observations::ObservationResponse;
use sky_client::entities::plans::PlanResponse;
use sky_client::entities::resolve::ResolveResponse;
use sky_client::entities::saa::SaaResponse;
use sky_client::entities::visibility::VisibilityResponse;
use sky_core::Status;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::{SchemaArgs, SchemaType};
use crate::output::output;

fn schema_of(type_name: SchemaType) -> Schema {
    match type_name {
        SchemaType::Clock => schema_for!(ClockResponse),
        SchemaType::Saa => schema_for!(SaaResponse),
        SchemaType::Visibility => schema_for!(VisibilityResponse),
        SchemaType::Observations => schema_for!(ObservationResponse),
        SchemaType::Plan => schema_for!(PlanResponse),
        SchemaType::Resolve => schema_for!(ResolveResponse),
        SchemaType::Data => schema_for!(DataResponse),
        SchemaType::Status => schema_for!(Status),
    }
}

/// Handle `sky schema`.
pub fn handle(args: &SchemaArgs, flags: &GlobalFlags) -> anyhow::Result<()> {
    output(&schema_of(args.type_name), flags.format)
}
