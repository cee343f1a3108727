//! Read-only view models for trip tables.
//!
//! A [`TripViewModel`] is everything a presentation layer needs to draw a
//! monitoring page: the summary cards, one page of rows, the page buttons
//! and the staleness indicator. It is built from a [`BoardSnapshot`] and
//! holds no references into it.

use serde::Serialize;

use tripwatch_client::Warehouse;
use tripwatch_core::{Money, Timestamp, TripId, VehicleId};
use tripwatch_query::{paginate, reduce, FleetSummary, Pagination, TripProgress, TripQuery};
use tripwatch_state::{BadgeVariant, Trip, TripStatus};

use crate::board::BoardSnapshot;
use crate::staleness::{time_ago, Elapsed};

/// One table row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TripRow {
    pub trip_id: TripId,
    pub dispatcher: String,
    pub vehicle: VehicleId,
    pub warehouse: String,
    pub status: TripStatus,
    pub status_label: &'static str,
    pub badge: BadgeVariant,
    pub progress: TripProgress,
    pub departure_at: Option<Timestamp>,
    pub total_value: Money,
    /// Store of the stop currently in transit.
    pub current_stop: Option<String>,
}

impl TripRow {
    pub fn new(trip: &Trip, snapshot: &BoardSnapshot) -> Self {
        Self {
            trip_id: trip.id.clone(),
            dispatcher: trip.dispatcher_name.clone(),
            vehicle: trip.vehicle_id.clone(),
            warehouse: snapshot.warehouse_name(&trip.warehouse_id).to_string(),
            status: trip.status,
            status_label: trip.status.label(),
            badge: trip.status.badge(),
            progress: TripProgress::of(trip),
            departure_at: trip.departure_at,
            total_value: trip.total_value,
            current_stop: trip.in_transit_stop().map(|s| s.store_name.clone()),
        }
    }

    /// `completed/total`, e.g. `7/12`.
    pub fn stops_label(&self) -> String {
        format!("{}/{}", self.progress.completed, self.progress.total)
    }
}

/// A rendered page of the board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TripViewModel {
    /// Aggregates over every trip matching the query, not just this page.
    pub summary: FleetSummary,
    pub rows: Vec<TripRow>,
    pub pagination: Pagination,
    pub page_buttons: Vec<usize>,
    /// Warehouse options for the filter.
    pub warehouses: Vec<Warehouse>,
    pub last_refreshed_at: Option<Timestamp>,
    pub staleness: Option<Elapsed>,
    /// Whether a fetch was in flight when the view was built.
    pub is_fetching: bool,
    pub last_error: Option<String>,
}

impl TripViewModel {
    pub fn build(
        snapshot: &BoardSnapshot,
        query: &TripQuery,
        page: usize,
        page_size: usize,
        now: Timestamp,
    ) -> Self {
        let reduced = reduce(&snapshot.trips, query, now);
        let mut pagination = Pagination::new(reduced.len(), page_size, page);
        let rows = paginate(&reduced, &mut pagination)
            .iter()
            .map(|t| TripRow::new(t, snapshot))
            .collect();
        Self {
            summary: FleetSummary::of(reduced.iter().copied()),
            rows,
            page_buttons: pagination.window().collect(),
            pagination,
            warehouses: snapshot.warehouses.to_vec(),
            last_refreshed_at: snapshot.last_refreshed_at,
            staleness: snapshot.last_refreshed_at.map(|at| time_ago(at, now)),
            is_fetching: false,
            last_error: snapshot.last_error.clone(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tripwatch_core::{DispatcherId, StopId, StoreId, WarehouseId};
    use tripwatch_query::QueryParams;
    use tripwatch_state::TripPlan;

    fn now() -> Timestamp {
        Timestamp::parse("2026-01-15T10:00:00Z").unwrap()
    }

    fn trip(n: usize) -> Trip {
        let mut trip = Trip::plan(TripPlan {
            id: TripId::new(format!("TRP-{n:02}")),
            warehouse_id: WarehouseId::new("WH-1"),
            dispatcher_id: DispatcherId::new("D-1"),
            dispatcher_name: format!("Dispatcher {n}"),
            vehicle_id: VehicleId::new(format!("B {n} AA")),
            total_value: Money::from_minor(1_000),
        });
        for s in 0..4 {
            trip.add_stop(StopId::new(format!("S-{s}")), StoreId::new("ST"), format!("Store {s}"))
                .unwrap();
        }
        let departed = Timestamp::from_epoch_secs(now().epoch_secs() - 3_600 + n as i64).unwrap();
        trip.dispatch(departed).unwrap();
        trip
    }

    fn snapshot(count: usize) -> BoardSnapshot {
        BoardSnapshot {
            trips: Arc::new((0..count).map(trip).collect()),
            warehouses: Arc::new(vec![Warehouse {
                id: WarehouseId::new("WH-1"),
                name: "Cikarang".into(),
            }]),
            last_refreshed_at: Some(Timestamp::from_epoch_secs(now().epoch_secs() - 240).unwrap()),
            last_error: None,
        }
    }

    #[test]
    fn builds_page_with_summary_over_all_matches() {
        let snap = snapshot(23);
        let vm = TripViewModel::build(&snap, &TripQuery::default(), 3, 10, now());
        assert_eq!(vm.rows.len(), 3);
        assert_eq!(vm.summary.trip_count, 23);
        assert_eq!(vm.summary.total_value, Money::from_minor(23_000));
        assert_eq!(vm.page_buttons, vec![1, 2, 3]);
        assert_eq!(vm.warehouses.len(), 1);
        assert!(!vm.is_fetching);
        assert_eq!(vm.staleness.map(|e| e.to_string()).as_deref(), Some("4m ago"));
        let row = &vm.rows[0];
        assert_eq!(row.warehouse, "Cikarang");
        assert_eq!(row.status_label, "In Progress");
        assert_eq!(row.badge, BadgeVariant::Info);
        assert_eq!(row.current_stop.as_deref(), Some("Store 0"));
        assert_eq!(row.stops_label(), "0/4");
    }

    #[test]
    fn page_is_clamped_when_query_narrows() {
        let snap = snapshot(23);
        let query = TripQuery::from_params(&QueryParams {
            search: Some("TRP-1".into()),
            ..QueryParams::default()
        });
        let vm = TripViewModel::build(&snap, &query, 3, 10, now());
        // TRP-10 .. TRP-19
        assert_eq!(vm.pagination.total(), 10);
        assert_eq!(vm.pagination.current_page(), 1);
        assert_eq!(vm.rows.len(), 10);
    }

    #[test]
    fn empty_board_has_no_staleness() {
        let vm = TripViewModel::build(&BoardSnapshot::default(), &TripQuery::default(), 1, 10, now());
        assert!(vm.is_empty());
        assert!(vm.staleness.is_none());
        assert_eq!(vm.summary.overall_progress, 0);
        assert_eq!(vm.page_buttons, vec![1]);
    }
}
