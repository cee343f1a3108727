//! # tripwatch-client: Trip Data Sources
//!
//! Everything the monitor reads comes through the [`TripSource`] trait:
//!
//! - **HTTP** ([`HttpTripSource`]): the backend trips API over reqwest,
//!   with bearer auth, timeouts and retry on transport errors.
//! - **In-memory** ([`InMemoryTripSource`]): a seeded collection served
//!   through the same filter and pagination code as the views, for tests
//!   and offline demos.
//!
//! ## API Path Convention
//!
//! | Method | Path | Operation |
//! |--------|------|-----------|
//! | GET | `/api/v1/trips?search&status&dateRange&warehouseId&page&size` | filtered, paginated trips |
//! | GET | `/api/v1/trips/active` | trips currently in progress |
//! | GET | `/api/v1/warehouses` | warehouse lookup |
//!
//! Payloads are camelCase JSON. Unknown fields are ignored.

pub mod config;
pub mod error;
pub mod http;
pub mod memory;
pub mod retry;

pub use config::{ConfigError, SourceConfig};
pub use error::SourceError;
pub use http::HttpTripSource;
pub use memory::InMemoryTripSource;
pub use retry::RetryPolicy;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use tripwatch_core::WarehouseId;
use tripwatch_query::{QueryParams, DEFAULT_PAGE_SIZE};
use tripwatch_state::Trip;

/// A warehouse as listed by the lookup endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Warehouse {
    pub id: WarehouseId,
    #[serde(default)]
    pub name: String,
}

/// A filtered page request for historical trip views.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListTripsRequest {
    pub filter: QueryParams,
    /// 1-based page number.
    pub page: usize,
    pub size: usize,
}

impl Default for ListTripsRequest {
    fn default() -> Self {
        Self {
            filter: QueryParams::default(),
            page: 1,
            size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl ListTripsRequest {
    pub fn new(filter: QueryParams, page: usize, size: usize) -> Self {
        Self {
            filter,
            page: page.max(1),
            size: size.max(1),
        }
    }

    /// Query-string pairs in API order. Absent filters are omitted.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let f = &self.filter;
        let mut pairs = Vec::with_capacity(6);
        if let Some(search) = f.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            pairs.push(("search", search.to_string()));
        }
        if let Some(status) = &f.status {
            pairs.push(("status", status.clone()));
        }
        if let Some(range) = &f.date_range {
            pairs.push(("dateRange", range.clone()));
        }
        if let Some(warehouse) = &f.warehouse_id {
            pairs.push(("warehouseId", warehouse.clone()));
        }
        pairs.push(("page", self.page.to_string()));
        pairs.push(("size", self.size.to_string()));
        pairs
    }
}

/// One page of trips plus the total number of matches on the server.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripPage {
    #[serde(default)]
    pub items: Vec<Trip>,
    #[serde(default)]
    pub total_count: usize,
}

/// Supplier of trip data. Implementations must be cheap to share across
/// tasks; the monitor holds one behind an `Arc`.
#[async_trait]
pub trait TripSource: Send + Sync {
    /// Filtered, paginated trips for historical views.
    async fn list_trips(&self, request: &ListTripsRequest) -> Result<TripPage, SourceError>;

    /// Trips currently in progress, for the live board.
    async fn list_active_trips(&self) -> Result<Vec<Trip>, SourceError>;

    /// Warehouse lookup for filter menus and labels.
    async fn lookup_warehouses(&self) -> Result<Vec<Warehouse>, SourceError>;

    /// Short name used in logs.
    fn source_name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_pairs_skip_absent_filters() {
        let req = ListTripsRequest::new(
            QueryParams {
                search: Some("  ".into()),
                status: Some("Completed".into()),
                ..QueryParams::default()
            },
            0,
            25,
        );
        assert_eq!(
            req.query_pairs(),
            vec![
                ("status", "Completed".to_string()),
                ("page", "1".to_string()),
                ("size", "25".to_string()),
            ]
        );
    }

    #[test]
    fn page_deserializes_with_defaults() {
        let page: TripPage = serde_json::from_str(r#"{"totalCount": 3}"#).unwrap();
        assert!(page.items.is_empty());
        assert_eq!(page.total_count, 3);
    }
}
