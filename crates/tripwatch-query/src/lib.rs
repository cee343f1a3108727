//! # tripwatch-query: Trip Views
//!
//! The reducer every trip table runs: filter, then sort, then paginate.
//! Monitoring, history and the CLI all parameterize the same functions
//! with a [`TripQuery`] and a [`Pagination`] instead of carrying their own
//! copies of the logic.
//!
//! - **Progress** (`progress.rs`): per-trip progress and success rates,
//!   fleet-wide aggregation.
//! - **Filter** (`filter.rs`): search, status, date range, warehouse.
//! - **Sort** (`sort.rs`): sort keys and direction.
//! - **Pagination** (`pagination.rs`): page bounds and the button window.
//!
//! Nothing here performs I/O or mutates a trip.

pub mod filter;
pub mod pagination;
pub mod progress;
pub mod sort;

pub use filter::{matches_search, DateRange, QueryParams, StatusFilter, TripQuery};
pub use pagination::{Pagination, DEFAULT_PAGE_SIZE, PAGE_WINDOW};
pub use progress::{
    average_success_rate, overall_progress, progress_percent, success_rate, FleetSummary,
    TripProgress,
};
pub use sort::{sort_trips, SortDirection, SortKey, SortOrder};

use tripwatch_core::Timestamp;
use tripwatch_state::Trip;

/// Filter and sort a trip collection. `now` anchors the date-range filter.
pub fn reduce<'a>(trips: &'a [Trip], query: &TripQuery, now: Timestamp) -> Vec<&'a Trip> {
    let mut matched: Vec<&Trip> = trips.iter().filter(|t| query.matches(t, now)).collect();
    sort_trips(&mut matched, query.sort);
    matched
}

/// Update `pagination` with the reduced count and return the current page.
pub fn paginate<'r, 'a>(reduced: &'r [&'a Trip], pagination: &mut Pagination) -> &'r [&'a Trip] {
    pagination.set_total(reduced.len());
    pagination.slice(reduced)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::fixtures::trip_with;
    use tripwatch_core::{Timestamp, WarehouseId};
    use tripwatch_state::{StopStatus, TripStatus};

    fn board() -> Vec<Trip> {
        (0..23)
            .map(|n| {
                let mut t = trip_with(&format!("TRP-{n:03}"), &[StopStatus::InTransit]);
                t.departure_at = Some(Timestamp::from_epoch_secs(1_768_000_000 + n * 60).unwrap());
                if n % 2 == 0 {
                    t.warehouse_id = WarehouseId::new("WH-2");
                }
                t
            })
            .collect()
    }

    fn now() -> Timestamp {
        Timestamp::from_epoch_secs(1_768_000_000 + 3_600).unwrap()
    }

    #[test]
    fn reduce_then_paginate() {
        let trips = board();
        let reduced = reduce(&trips, &TripQuery::default(), now());
        assert_eq!(reduced.len(), 23);
        assert_eq!(reduced[0].id.as_str(), "TRP-022");

        let mut pagination = Pagination::new(0, 10, 3);
        let page = paginate(&reduced, &mut pagination);
        assert_eq!(pagination.current_page(), 3);
        assert_eq!(page.len(), 3);
        assert_eq!(page[2].id.as_str(), "TRP-000");
    }

    #[test]
    fn narrowing_filter_reclamps_page() {
        let trips = board();
        let mut pagination = Pagination::new(23, 10, 3);
        let query = TripQuery::default().with_warehouse(WarehouseId::new("WH-2"));
        let reduced = reduce(&trips, &query, now());
        assert_eq!(reduced.len(), 12);
        let page = paginate(&reduced, &mut pagination);
        assert_eq!(pagination.current_page(), 2);
        assert_eq!(page.len(), 2);
    }

    #[test]
    fn unmatched_status_gives_empty_view() {
        let trips = board();
        let query = TripQuery::from_params(&QueryParams {
            status: Some("Teleported".into()),
            ..QueryParams::default()
        });
        let reduced = reduce(&trips, &query, now());
        let mut pagination = Pagination::default();
        assert!(paginate(&reduced, &mut pagination).is_empty());
        assert_eq!(pagination.total(), 0);
        assert_eq!(pagination.total_pages(), 1);
    }

    #[test]
    fn status_filter_applies() {
        let mut trips = board();
        trips[4].status = TripStatus::Cancelled;
        let query = TripQuery::default().with_status(TripStatus::Cancelled);
        let reduced = reduce(&trips, &query, now());
        assert_eq!(reduced.len(), 1);
        assert_eq!(reduced[0].id.as_str(), "TRP-004");
    }
}
