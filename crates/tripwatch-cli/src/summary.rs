//! # Summary Subcommand
//!
//! One-shot fleet summary over the currently active trips, with the same
//! filters as the live board.

use anyhow::Result;
use clap::Args;

use tripwatch_core::Timestamp;
use tripwatch_query::{reduce, FleetSummary, TripQuery};

use crate::render;
use crate::{Context, FilterArgs};

/// Arguments for the `tripwatch summary` subcommand.
#[derive(Args, Debug, Default)]
pub struct SummaryArgs {
    #[command(flatten)]
    pub filter: FilterArgs,
}

/// Execute the summary subcommand.
pub async fn run_summary(args: &SummaryArgs, ctx: &Context) -> Result<u8> {
    let params = args.filter.merge(ctx.config.view.query_params());
    let query = TripQuery::from_params(&params);
    let summary = fleet_summary(ctx, &query, Timestamp::now()).await?;
    ctx.emit(&summary, || format!("{}\n", render::summary_cards(&summary)))?;
    Ok(0)
}

async fn fleet_summary(ctx: &Context, query: &TripQuery, now: Timestamp) -> Result<FleetSummary> {
    let trips = ctx.source.list_active_trips().await?;
    tracing::debug!(fetched = trips.len(), "summarizing active trips");
    let matching = reduce(&trips, query, now);
    Ok(FleetSummary::of(matching.iter().copied()))
}
