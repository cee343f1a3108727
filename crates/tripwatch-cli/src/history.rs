//! # History Subcommand
//!
//! Server-paged trip history. Filtering and pagination happen at the
//! source; a page past the end is clamped to the last page.

use std::sync::Arc;

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use tripwatch_monitor::{BoardSnapshot, HistoryView, TripRow};
use tripwatch_query::Pagination;

use crate::render;
use crate::{Context, FilterArgs};

/// Arguments for the `tripwatch history` subcommand.
#[derive(Args, Debug)]
pub struct HistoryArgs {
    #[command(flatten)]
    pub filter: FilterArgs,

    /// Page to show (1-based).
    #[arg(long, default_value_t = 1)]
    pub page: usize,

    /// Rows per page. Defaults to `view.page_size` from the config.
    #[arg(long)]
    pub page_size: Option<usize>,
}

#[derive(Debug, Serialize)]
struct HistoryPage {
    rows: Vec<TripRow>,
    pagination: Pagination,
}

/// Execute the history subcommand.
pub async fn run_history(args: &HistoryArgs, ctx: &Context) -> Result<u8> {
    let page = load(args, ctx).await?;
    ctx.emit(&page, || render::history(&page.rows, &page.pagination))?;
    Ok(0)
}

async fn load(args: &HistoryArgs, ctx: &Context) -> Result<HistoryPage> {
    let page_size = args.page_size.unwrap_or(ctx.config.view.page_size).max(1);
    let mut view = HistoryView::new(ctx.source.clone(), page_size);
    view.set_filter(args.filter.merge(ctx.config.view.query_params()));
    view.load_page(args.page).await?;

    // Warehouse names are cosmetic; a failed lookup falls back to ids.
    let warehouses = match ctx.source.lookup_warehouses().await {
        Ok(w) => w,
        Err(e) => {
            tracing::warn!("warehouse lookup failed: {e}");
            Vec::new()
        }
    };
    let names = BoardSnapshot {
        warehouses: Arc::new(warehouses),
        ..BoardSnapshot::default()
    };

    Ok(HistoryPage {
        rows: view.items().iter().map(|t| TripRow::new(t, &names)).collect(),
        pagination: *view.pagination(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    use tripwatch_client::{InMemoryTripSource, Warehouse};
    use tripwatch_core::{DispatcherId, Money, StopId, StoreId, Timestamp, TripId, VehicleId, WarehouseId};
    use tripwatch_state::{Trip, TripPlan};

    use crate::config::CliConfig;
    use crate::render::OutputFormat;

    fn finished(n: usize) -> Trip {
        let mut t = Trip::plan(TripPlan {
            id: TripId::new(format!("TRP-{n:03}")),
            warehouse_id: WarehouseId::new("WH-1"),
            dispatcher_id: DispatcherId::new("D-1"),
            dispatcher_name: "Budi".into(),
            vehicle_id: VehicleId::new("B 1 AA"),
            total_value: Money::ZERO,
        });
        t.add_stop(StopId::new("S-1"), StoreId::new("ST-1"), "Toko").unwrap();
        t.dispatch(Timestamp::now()).unwrap();
        t.deliver_stop(&StopId::new("S-1"), Timestamp::now()).unwrap();
        t
    }

    fn context(count: usize) -> Context {
        let source = InMemoryTripSource::new((0..count).map(finished).collect()).with_warehouses(vec![Warehouse {
            id: WarehouseId::new("WH-1"),
            name: "Cikarang".into(),
        }]);
        Context {
            config: CliConfig::default(),
            source: Arc::new(source),
            output: OutputFormat::Table,
        }
    }

    fn args(page: usize) -> HistoryArgs {
        HistoryArgs {
            filter: FilterArgs::default(),
            page,
            page_size: Some(4),
        }
    }

    #[tokio::test]
    async fn loads_page_with_warehouse_names() {
        let ctx = context(10);
        let page = load(&args(2), &ctx).await.unwrap();
        assert_eq!(page.rows.len(), 4);
        assert_eq!(page.pagination.current_page(), 2);
        assert_eq!(page.pagination.total(), 10);
        assert!(page.rows.iter().all(|r| r.warehouse == "Cikarang"));
    }

    #[tokio::test]
    async fn page_past_end_is_clamped() {
        let ctx = context(10);
        let page = load(&args(9), &ctx).await.unwrap();
        assert_eq!(page.pagination.current_page(), 3);
        assert_eq!(page.rows.len(), 2);
    }

    #[tokio::test]
    async fn unknown_status_yields_empty_page() {
        let ctx = context(3);
        let mut a = args(1);
        a.filter.status = Some("Lost".into());
        let page = load(&a, &ctx).await.unwrap();
        assert!(page.rows.is_empty());
        assert_eq!(page.pagination.total_pages(), 1);
    }
}
