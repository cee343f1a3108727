//! The in-memory trip collection a controller owns.
//!
//! The board is replaced wholesale on every successful refresh. Readers
//! take a [`BoardSnapshot`], which shares the trip vector through an `Arc`
//! and never blocks the writer.

use std::sync::Arc;

use tripwatch_client::Warehouse;
use tripwatch_core::{Timestamp, TripId, WarehouseId};
use tripwatch_state::Trip;

#[derive(Debug, Default)]
pub(crate) struct Board {
    trips: Arc<Vec<Trip>>,
    warehouses: Arc<Vec<Warehouse>>,
    last_refreshed_at: Option<Timestamp>,
    last_error: Option<String>,
}

impl Board {
    pub(crate) fn replace(&mut self, trips: Vec<Trip>, at: Timestamp) {
        self.trips = Arc::new(trips);
        self.last_refreshed_at = Some(at);
        self.last_error = None;
    }

    /// Keep the previous trips and timestamp; only remember the error.
    pub(crate) fn record_failure(&mut self, error: String) {
        self.last_error = Some(error);
    }

    pub(crate) fn set_warehouses(&mut self, warehouses: Vec<Warehouse>) {
        self.warehouses = Arc::new(warehouses);
    }

    /// Mutable access to one trip, copying the vector if a snapshot still
    /// shares it.
    pub(crate) fn trip_mut(&mut self, id: &TripId) -> Option<&mut Trip> {
        let index = self.trips.iter().position(|t| &t.id == id)?;
        Arc::make_mut(&mut self.trips).get_mut(index)
    }

    pub(crate) fn snapshot(&self) -> BoardSnapshot {
        BoardSnapshot {
            trips: Arc::clone(&self.trips),
            warehouses: Arc::clone(&self.warehouses),
            last_refreshed_at: self.last_refreshed_at,
            last_error: self.last_error.clone(),
        }
    }
}

/// Immutable view of the board at one instant.
#[derive(Debug, Clone, Default)]
pub struct BoardSnapshot {
    pub trips: Arc<Vec<Trip>>,
    pub warehouses: Arc<Vec<Warehouse>>,
    /// Time of the last successful refresh.
    pub last_refreshed_at: Option<Timestamp>,
    /// Error of the most recent refresh, cleared by the next success.
    pub last_error: Option<String>,
}

impl BoardSnapshot {
    pub fn trip(&self, id: &TripId) -> Option<&Trip> {
        self.trips.iter().find(|t| &t.id == id)
    }

    /// Warehouse display name, falling back to the id.
    pub fn warehouse_name<'a>(&'a self, id: &'a WarehouseId) -> &'a str {
        self.warehouses
            .iter()
            .find(|w| &w.id == id && !w.name.is_empty())
            .map_or(id.as_str(), |w| w.name.as_str())
    }
}
