//! Contract tests for HttpTripSource against a wiremock server.
//!
//! | Method | Path | Test |
//! |--------|------|------|
//! | GET | `/api/v1/trips` | `list_trips_*` |
//! | GET | `/api/v1/trips/active` | `list_active_*` |
//! | GET | `/api/v1/warehouses` | `lookup_warehouses_*` |

use tripwatch_client::{HttpTripSource, ListTripsRequest, SourceConfig, SourceError, TripSource};
use tripwatch_query::QueryParams;
use tripwatch_state::{StopStatus, TripStatus};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn source(server: &MockServer) -> HttpTripSource {
    let config = SourceConfig::new(&server.uri())
        .unwrap()
        .with_token("test-token")
        .with_timeout_secs(5);
    HttpTripSource::new(config).unwrap()
}

fn trip_json(id: &str) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "warehouseId": "WH-1",
        "dispatcherId": "D-1",
        "dispatcherName": "Budi Santoso",
        "vehicleId": "B 1234 XY",
        "status": "InProgress",
        "departureAt": "2026-01-15T08:00:00+07:00",
        "stops": [
            {"id": "S-1", "storeId": "ST-1", "storeName": "Toko Maju", "status": "Delivered",
             "deliveredAt": "2026-01-15T01:30:00Z"},
            {"id": "S-2", "storeId": "ST-2", "storeName": "Warung Sari", "status": "InTransit"}
        ],
        "totalValue": 450000,
        "routeHint": "ignored by the client"
    })
}

// ── GET /api/v1/trips/active ─────────────────────────────────────────

#[tokio::test]
async fn list_active_sends_bearer_and_parses_trips() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/trips/active"))
        .and(header("Authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            trip_json("TRP-1"),
            trip_json("TRP-2")
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let trips = source(&server).list_active_trips().await.unwrap();
    assert_eq!(trips.len(), 2);
    assert_eq!(trips[0].status, TripStatus::InProgress);
    assert_eq!(trips[0].stops[1].status, StopStatus::InTransit);
    assert_eq!(
        trips[0].departure_at.unwrap().to_iso8601(),
        "2026-01-15T01:00:00Z"
    );
}

#[tokio::test]
async fn list_active_maps_server_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/trips/active"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .expect(1)
        .mount(&server)
        .await;

    let err = source(&server).list_active_trips().await.unwrap_err();
    match err {
        SourceError::Api {
            endpoint,
            status,
            body,
        } => {
            assert_eq!(endpoint, "GET /trips/active");
            assert_eq!(status, 503);
            assert_eq!(body, "maintenance");
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn list_active_rejects_malformed_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/trips/active"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"unexpected": true})))
        .mount(&server)
        .await;

    let err = source(&server).list_active_trips().await.unwrap_err();
    assert!(matches!(err, SourceError::Deserialization { .. }));
}

// ── GET /api/v1/trips ────────────────────────────────────────────────

#[tokio::test]
async fn list_trips_sends_filters_as_query() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/trips"))
        .and(query_param("search", "budi"))
        .and(query_param("status", "Completed"))
        .and(query_param("dateRange", "week"))
        .and(query_param("warehouseId", "WH-1"))
        .and(query_param("page", "2"))
        .and(query_param("size", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "items": [trip_json("TRP-11")],
            "totalCount": 11
        })))
        .expect(1)
        .mount(&server)
        .await;

    let request = ListTripsRequest::new(
        QueryParams {
            search: Some("budi".into()),
            status: Some("Completed".into()),
            date_range: Some("week".into()),
            warehouse_id: Some("WH-1".into()),
            sort: None,
        },
        2,
        10,
    );
    let page = source(&server).list_trips(&request).await.unwrap();
    assert_eq!(page.total_count, 11);
    assert_eq!(page.items[0].id.as_str(), "TRP-11");
}

// ── GET /api/v1/warehouses ───────────────────────────────────────────

#[tokio::test]
async fn lookup_warehouses_parses_list() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/warehouses"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            {"id": "WH-1", "name": "Cikarang"},
            {"id": "WH-2"}
        ])))
        .mount(&server)
        .await;

    let warehouses = source(&server).lookup_warehouses().await.unwrap();
    assert_eq!(warehouses.len(), 2);
    assert_eq!(warehouses[0].name, "Cikarang");
    assert_eq!(warehouses[1].name, "");
}

#[tokio::test]
async fn lookup_warehouses_unauthorized() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/warehouses"))
        .respond_with(ResponseTemplate::new(401).set_body_string("bad token"))
        .mount(&server)
        .await;

    let err = source(&server).lookup_warehouses().await.unwrap_err();
    assert_eq!(err.status(), Some(401));
}
