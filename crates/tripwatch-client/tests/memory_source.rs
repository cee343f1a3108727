//! InMemoryTripSource serves the seeded collection through the shared
//! reducer, and its failure switch behaves like a down backend.

use tripwatch_client::{InMemoryTripSource, ListTripsRequest, SourceError, TripSource, Warehouse};
use tripwatch_core::{DispatcherId, Money, StopId, StoreId, Timestamp, TripId, VehicleId, WarehouseId};
use tripwatch_query::QueryParams;
use tripwatch_state::{Trip, TripPlan, TripStatus};

fn trip(n: usize, dispatched: bool) -> Trip {
    let mut trip = Trip::plan(TripPlan {
        id: TripId::new(format!("TRP-{n:02}")),
        warehouse_id: WarehouseId::new("WH-1"),
        dispatcher_id: DispatcherId::new("D-1"),
        dispatcher_name: if n % 3 == 0 { "Sari".into() } else { "Budi".into() },
        vehicle_id: VehicleId::new("B 1 AA"),
        total_value: Money::from_minor(100),
    });
    trip.add_stop(StopId::new("S-1"), StoreId::new("ST-1"), "Toko").unwrap();
    if dispatched {
        trip.dispatch(Timestamp::now()).unwrap();
    }
    trip
}

fn seeded() -> InMemoryTripSource {
    InMemoryTripSource::new((0..12).map(|n| trip(n, n % 2 == 0)).collect()).with_warehouses(vec![
        Warehouse {
            id: WarehouseId::new("WH-1"),
            name: "Cikarang".into(),
        },
    ])
}

#[tokio::test]
async fn active_trips_are_in_progress_only() {
    let source = seeded();
    let active = source.list_active_trips().await.unwrap();
    assert_eq!(active.len(), 6);
    assert!(active.iter().all(|t| t.status == TripStatus::InProgress));
    assert_eq!(source.active_fetch_count(), 1);
}

#[tokio::test]
async fn list_trips_filters_and_pages() {
    let source = seeded();
    let request = ListTripsRequest::new(
        QueryParams {
            search: Some("sari".into()),
            ..QueryParams::default()
        },
        1,
        3,
    );
    let page = source.list_trips(&request).await.unwrap();
    assert_eq!(page.total_count, 4);
    assert_eq!(page.items.len(), 3);

    let past_end = ListTripsRequest::new(QueryParams::default(), 9, 10);
    let page = source.list_trips(&past_end).await.unwrap();
    assert!(page.items.is_empty());
    assert_eq!(page.total_count, 12);
}

#[tokio::test]
async fn failure_switch() {
    let source = seeded();
    source.fail_with("backend down");
    let err = source.lookup_warehouses().await.unwrap_err();
    assert!(matches!(err, SourceError::Unavailable { .. }));
    source.recover();
    assert_eq!(source.lookup_warehouses().await.unwrap().len(), 1);
}
