//! In-memory [`TripSource`] for tests and offline demos.
//!
//! Serves a seeded trip collection through the same reducer and pagination
//! the views use. It can be told to fail or to respond slowly, which is how
//! the monitor's failure and coalescing behavior is exercised.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::RwLock;

use tripwatch_core::{Timestamp, TripId};
use tripwatch_query::{reduce, Pagination, TripQuery};
use tripwatch_state::{Trip, TripStatus};

use crate::error::SourceError;
use crate::{ListTripsRequest, TripPage, TripSource, Warehouse};

#[derive(Debug, Default)]
pub struct InMemoryTripSource {
    trips: RwLock<Vec<Trip>>,
    warehouses: RwLock<Vec<Warehouse>>,
    failure: RwLock<Option<String>>,
    latency: RwLock<Option<Duration>>,
    active_fetches: AtomicUsize,
}

impl InMemoryTripSource {
    pub fn new(trips: Vec<Trip>) -> Self {
        Self {
            trips: RwLock::new(trips),
            ..Self::default()
        }
    }

    pub fn with_warehouses(self, warehouses: Vec<Warehouse>) -> Self {
        *self.warehouses.write() = warehouses;
        self
    }

    /// Replace the served collection.
    pub fn set_trips(&self, trips: Vec<Trip>) {
        *self.trips.write() = trips;
    }

    /// Mutate one served trip in place. Returns `false` if it is unknown.
    pub fn update_trip(&self, id: &TripId, f: impl FnOnce(&mut Trip)) -> bool {
        let mut trips = self.trips.write();
        match trips.iter_mut().find(|t| &t.id == id) {
            Some(trip) => {
                f(trip);
                true
            }
            None => false,
        }
    }

    /// Make every subsequent call fail with `reason`.
    pub fn fail_with(&self, reason: impl Into<String>) {
        *self.failure.write() = Some(reason.into());
    }

    /// Undo [`fail_with`](Self::fail_with).
    pub fn recover(&self) {
        *self.failure.write() = None;
    }

    /// Delay every response by `latency`.
    pub fn set_latency(&self, latency: Option<Duration>) {
        *self.latency.write() = latency;
    }

    /// Number of `list_active_trips` calls served so far.
    pub fn active_fetch_count(&self) -> usize {
        self.active_fetches.load(Ordering::SeqCst)
    }

    async fn respond(&self) -> Result<(), SourceError> {
        let latency = *self.latency.read();
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
        match self.failure.read().clone() {
            Some(reason) => Err(SourceError::Unavailable {
                source_name: self.source_name().to_string(),
                reason,
            }),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl TripSource for InMemoryTripSource {
    async fn list_trips(&self, request: &ListTripsRequest) -> Result<TripPage, SourceError> {
        self.respond().await?;
        let query = TripQuery::from_params(&request.filter);
        let trips = self.trips.read();
        let reduced = reduce(&trips, &query, Timestamp::now());
        let pagination = Pagination::new(reduced.len(), request.size, request.page);
        // A page past the end is empty, as a server would answer.
        let items = if request.page > pagination.total_pages() {
            Vec::new()
        } else {
            pagination.slice(&reduced).iter().map(|t| (*t).clone()).collect()
        };
        Ok(TripPage {
            items,
            total_count: reduced.len(),
        })
    }

    async fn list_active_trips(&self) -> Result<Vec<Trip>, SourceError> {
        self.active_fetches.fetch_add(1, Ordering::SeqCst);
        self.respond().await?;
        Ok(self
            .trips
            .read()
            .iter()
            .filter(|t| t.status == TripStatus::InProgress)
            .cloned()
            .collect())
    }

    async fn lookup_warehouses(&self) -> Result<Vec<Warehouse>, SourceError> {
        self.respond().await?;
        Ok(self.warehouses.read().clone())
    }

    fn source_name(&self) -> &str {
        "in-memory"
    }
}
