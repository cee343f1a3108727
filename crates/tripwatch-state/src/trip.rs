//! # Trip and Stop
//!
//! A trip is a dispatcher's planned run over an ordered sequence of stops.
//! The order of `stops` is the planned visitation order and is significant:
//! the lifecycle always advances the first `Pending` stop.
//!
//! Stop counts (`completed`, `delivered`, …) are derived on demand from the
//! stop statuses and never stored, so they cannot diverge.

use serde::{Deserialize, Serialize};

use tripwatch_core::{DispatcherId, Money, StopId, StoreId, Timestamp, TripId, VehicleId, WarehouseId};

use crate::lifecycle::{LifecycleError, TransitionRecord};
use crate::status::{StopStatus, TripStatus};

/// One store visit within a trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stop {
    pub id: StopId,
    pub store_id: StoreId,
    /// Display name of the store.
    #[serde(default)]
    pub store_name: String,
    pub status: StopStatus,
    /// Set only when the stop becomes `Delivered`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivered_at: Option<Timestamp>,
    /// Set only when the stop becomes `Failed`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,
}

impl Stop {
    /// A stop that has not been visited yet.
    pub fn pending(id: StopId, store_id: StoreId, store_name: impl Into<String>) -> Self {
        Self {
            id,
            store_id,
            store_name: store_name.into(),
            status: StopStatus::Pending,
            delivered_at: None,
            failure_reason: None,
        }
    }

    /// Whether the stop reached `Delivered` or `Failed`.
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

/// Header fields of a trip supplied by the planning collaborator.
#[derive(Debug, Clone)]
pub struct TripPlan {
    pub id: TripId,
    pub warehouse_id: WarehouseId,
    pub dispatcher_id: DispatcherId,
    pub dispatcher_name: String,
    pub vehicle_id: VehicleId,
    pub total_value: Money,
}

/// A delivery trip with its stops and transition history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trip {
    pub id: TripId,
    pub warehouse_id: WarehouseId,
    pub dispatcher_id: DispatcherId,
    /// Display name of the dispatcher; searched by free-text queries.
    #[serde(default)]
    pub dispatcher_name: String,
    pub vehicle_id: VehicleId,
    pub status: TripStatus,
    /// Set when the trip becomes `InProgress`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub departure_at: Option<Timestamp>,
    /// Set when the trip becomes `Completed` or `Cancelled`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<Timestamp>,
    pub stops: Vec<Stop>,
    /// Sum of the constituent order values, computed upstream.
    #[serde(default)]
    pub total_value: Money,
    /// Transitions applied locally, oldest first.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub transitions: Vec<TransitionRecord>,
}

impl Trip {
    /// A new trip in `Created` with no stops yet.
    pub fn plan(plan: TripPlan) -> Self {
        Self {
            id: plan.id,
            warehouse_id: plan.warehouse_id,
            dispatcher_id: plan.dispatcher_id,
            dispatcher_name: plan.dispatcher_name,
            vehicle_id: plan.vehicle_id,
            status: TripStatus::Created,
            departure_at: None,
            completed_at: None,
            stops: Vec::new(),
            total_value: plan.total_value,
            transitions: Vec::new(),
        }
    }

    /// Append a pending stop. Only allowed while the trip is `Created`.
    pub fn add_stop(
        &mut self,
        id: StopId,
        store_id: StoreId,
        store_name: impl Into<String>,
    ) -> Result<(), LifecycleError> {
        self.require_stops_editable()?;
        if self.stop_index(&id).is_some() {
            return Err(LifecycleError::DuplicateStop {
                trip_id: self.id.to_string(),
                stop_id: id.to_string(),
            });
        }
        self.stops.push(Stop::pending(id, store_id, store_name));
        Ok(())
    }

    /// Remove a stop. Only allowed while the trip is `Created`.
    pub fn remove_stop(&mut self, id: &StopId) -> Result<Stop, LifecycleError> {
        self.require_stops_editable()?;
        let index = self.require_stop_index(id)?;
        Ok(self.stops.remove(index))
    }

    fn require_stops_editable(&self) -> Result<(), LifecycleError> {
        if self.status != TripStatus::Created {
            return Err(LifecycleError::StopsFrozen {
                trip_id: self.id.to_string(),
                status: self.status,
            });
        }
        Ok(())
    }

    // ── Derived counts ───────────────────────────────────────────────

    /// Number of stops.
    pub fn total_stop_count(&self) -> usize {
        self.stops.len()
    }

    /// Stops in `Delivered` or `Failed`.
    pub fn completed_stop_count(&self) -> usize {
        self.stops.iter().filter(|s| s.is_terminal()).count()
    }

    /// Stops in `Delivered`.
    pub fn delivered_stop_count(&self) -> usize {
        self.count_with(StopStatus::Delivered)
    }

    /// Stops in `Failed`.
    pub fn failed_stop_count(&self) -> usize {
        self.count_with(StopStatus::Failed)
    }

    /// Stops in `Pending`.
    pub fn pending_stop_count(&self) -> usize {
        self.count_with(StopStatus::Pending)
    }

    fn count_with(&self, status: StopStatus) -> usize {
        self.stops.iter().filter(|s| s.status == status).count()
    }

    /// Whether every stop is terminal. Vacuously true for a trip without stops.
    pub fn all_stops_terminal(&self) -> bool {
        self.stops.iter().all(Stop::is_terminal)
    }

    // ── Lookup ───────────────────────────────────────────────────────

    /// The stop currently `InTransit`, if any.
    pub fn in_transit_stop(&self) -> Option<&Stop> {
        self.stops.iter().find(|s| s.status == StopStatus::InTransit)
    }

    /// The next stop to visit: the first `Pending` stop in planned order.
    pub fn next_pending_stop(&self) -> Option<&Stop> {
        self.stops.iter().find(|s| s.status == StopStatus::Pending)
    }

    /// Look up a stop by id.
    pub fn stop(&self, id: &StopId) -> Option<&Stop> {
        self.stops.iter().find(|s| &s.id == id)
    }

    pub(crate) fn stop_index(&self, id: &StopId) -> Option<usize> {
        self.stops.iter().position(|s| &s.id == id)
    }

    pub(crate) fn require_stop_index(&self, id: &StopId) -> Result<usize, LifecycleError> {
        self.stop_index(id).ok_or_else(|| LifecycleError::StopNotFound {
            trip_id: self.id.to_string(),
            stop_id: id.to_string(),
        })
    }

    /// Whether the trip is `Completed` or `Cancelled`.
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Check the structural invariants of a trip, typically one received
    /// from the upstream API.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::InvariantViolation`] naming the first
    /// violated rule.
    pub fn check_invariants(&self) -> Result<(), LifecycleError> {
        let violation = |rule: &str| {
            Err(LifecycleError::InvariantViolation {
                trip_id: self.id.to_string(),
                rule: rule.to_string(),
            })
        };

        if self.status != TripStatus::Created && self.stops.is_empty() {
            return violation("a dispatched trip must have stops");
        }
        if self.stops.iter().filter(|s| s.status == StopStatus::InTransit).count() > 1 {
            return violation("at most one stop may be in transit");
        }
        if self.status == TripStatus::Completed && !self.all_stops_terminal() {
            return violation("a completed trip must have every stop terminal");
        }
        if self.status == TripStatus::Created && self.stops.iter().any(|s| s.status != StopStatus::Pending) {
            return violation("an undispatched trip must have only pending stops");
        }
        if self
            .stops
            .iter()
            .any(|s| s.delivered_at.is_some() != (s.status == StopStatus::Delivered))
        {
            return violation("deliveredAt is set exactly when a stop is delivered");
        }
        let mut seen = std::collections::HashSet::new();
        if !self.stops.iter().all(|s| seen.insert(&s.id)) {
            return violation("stop ids must be unique within a trip");
        }
        Ok(())
    }
}
