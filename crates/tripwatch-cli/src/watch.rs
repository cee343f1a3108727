//! # Watch Subcommand
//!
//! Live trip board. Starts the refresh controller, redraws the board after
//! every refresh (successful or not) and stops on Ctrl-C.
//!
//! With `--once` a single refresh is performed and its board printed; a
//! failed refresh is then an error.

use std::future::Future;

use anyhow::{bail, Result};
use clap::Args;
use tokio::sync::broadcast::error::RecvError;

use tripwatch_monitor::{RefreshController, RefreshEvent, RefreshOutcome, TripViewModel};
use tripwatch_query::TripQuery;

use crate::render;
use crate::{Context, FilterArgs};

/// Arguments for the `tripwatch watch` subcommand.
#[derive(Args, Debug, Default)]
pub struct WatchArgs {
    #[command(flatten)]
    pub filter: FilterArgs,

    /// Page of the board to show (1-based).
    #[arg(long, default_value_t = 1)]
    pub page: usize,

    /// Refresh once, print the board and exit.
    #[arg(long)]
    pub once: bool,

    /// Exit after this many refreshes.
    #[arg(long)]
    pub refreshes: Option<usize>,
}

/// Execute the watch subcommand.
pub async fn run_watch(args: &WatchArgs, ctx: &Context) -> Result<u8> {
    let controller = RefreshController::new(ctx.source.clone(), ctx.config.refresh_config());
    let query = TripQuery::from_params(&args.filter.merge(ctx.config.view.query_params()));

    if args.once {
        controller.load_warehouses().await;
        return match controller.refresh_now().await {
            RefreshOutcome::Failed { error } => bail!("refresh failed: {error}"),
            _ => {
                show(ctx, &controller.view(&query, args.page, ctx.config.view.page_size))?;
                Ok(0)
            }
        };
    }

    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("cannot listen for Ctrl-C: {e}");
            std::future::pending::<()>().await;
        }
    };
    watch_until(ctx, &controller, &query, args, ctrl_c).await?;
    Ok(0)
}

/// Redraw on every refresh until `shutdown` resolves or `--refreshes` is
/// reached. Returns the number of refreshes seen.
async fn watch_until(
    ctx: &Context,
    controller: &RefreshController,
    query: &TripQuery,
    args: &WatchArgs,
    shutdown: impl Future<Output = ()>,
) -> Result<usize> {
    let page_size = ctx.config.view.page_size;
    let mut events = controller.subscribe();
    let handle = controller.start()?;
    tracing::info!(
        source = ctx.source.source_name(),
        period_secs = controller.config().period.as_secs(),
        "watching trips"
    );

    tokio::pin!(shutdown);
    let mut seen = 0usize;
    loop {
        tokio::select! {
            _ = &mut shutdown => {
                tracing::info!("interrupted");
                break;
            }
            event = events.recv() => match event {
                Ok(RefreshEvent::Refreshed { .. } | RefreshEvent::Failed { .. }) => {
                    show(ctx, &controller.view(query, args.page, page_size))?;
                    seen += 1;
                    if args.refreshes.is_some_and(|max| seen >= max) {
                        break;
                    }
                }
                Ok(RefreshEvent::CommandApplied { .. }) => {}
                Ok(RefreshEvent::Stopped) | Err(RecvError::Closed) => break,
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "board redraw fell behind");
                }
            },
        }
    }

    handle.shutdown().await;
    Ok(seen)
}

fn show(ctx: &Context, vm: &TripViewModel) -> Result<()> {
    ctx.emit(vm, || render::board(vm))
}
