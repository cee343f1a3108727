//! # Trip Lifecycle
//!
//! Status-changing commands on a [`Trip`]. Every command is validated in
//! full before anything is mutated, so a rejected command leaves the trip
//! exactly as it was.
//!
//! ## Trip edges
//!
//! | Edge | Command | Guard |
//! |------|---------|-------|
//! | Created → InProgress | [`Trip::dispatch`] | stops non-empty |
//! | InProgress → Completed | [`Trip::complete`] | every stop terminal |
//! | Created, InProgress → Cancelled | [`Trip::cancel`] | no stop delivered |
//!
//! ## Stop edges (trip must be `InProgress`)
//!
//! | Edge | Command | Guard |
//! |------|---------|-------|
//! | Pending → InTransit | [`Trip::start_stop`] | no other stop in transit |
//! | InTransit → Delivered | [`Trip::deliver_stop`] |: |
//! | InTransit → Failed | [`Trip::fail_stop`] |: |
//!
//! ## Cascade
//!
//! Resolving a stop (Delivered or Failed) moves the next `Pending` stop to
//! `InTransit`, or completes the trip when no stop is left open. The
//! cascade is part of the same command and is reported in the returned
//! [`TransitionOutcome`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

use tripwatch_core::{StopId, Timestamp};

use crate::status::{StopStatus, TripStatus};
use crate::trip::Trip;

// ─── Errors ──────────────────────────────────────────────────────────

/// Errors raised by lifecycle commands. None of them mutate the trip.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LifecycleError {
    /// The requested edge does not exist in the state machine.
    #[error("invalid state transition for {subject}: {from} -> {to}")]
    InvalidStateTransition {
        /// `trip <id>` or `stop <id>`.
        subject: String,
        /// Current status.
        from: String,
        /// Requested status.
        to: String,
    },

    /// A trip cannot be dispatched without stops.
    #[error("trip {trip_id} has no stops")]
    EmptyTrip { trip_id: String },

    /// Stop commands require the trip to be in progress.
    #[error("trip {trip_id} is {status}, stop commands require InProgress")]
    TripNotInProgress { trip_id: String, status: TripStatus },

    /// Only one stop may be in transit at a time.
    #[error("stop {in_transit} of trip {trip_id} is already in transit")]
    AnotherStopInTransit { trip_id: String, in_transit: String },

    /// A trip completes only when every stop is terminal.
    #[error("trip {trip_id} still has {remaining} open stop(s)")]
    IncompleteStops { trip_id: String, remaining: usize },

    /// A trip with a delivered stop cannot be cancelled.
    #[error("trip {trip_id} has {delivered} delivered stop(s) and cannot be cancelled")]
    DeliveredStopsPresent { trip_id: String, delivered: usize },

    /// The stop is not part of the trip.
    #[error("stop {stop_id} not found in trip {trip_id}")]
    StopNotFound { trip_id: String, stop_id: String },

    /// Stop membership is fixed once the trip leaves `Created`.
    #[error("stops of trip {trip_id} are fixed while {status}")]
    StopsFrozen { trip_id: String, status: TripStatus },

    /// A stop with the same id is already planned.
    #[error("stop {stop_id} is already part of trip {trip_id}")]
    DuplicateStop { trip_id: String, stop_id: String },

    /// A trip violates a structural rule.
    #[error("trip {trip_id} violates invariant: {rule}")]
    InvariantViolation { trip_id: String, rule: String },
}

// ─── Transition records ──────────────────────────────────────────────

/// A single status change of a trip or one of its stops.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "subject", rename_all = "camelCase")]
pub enum StatusChange {
    #[serde(rename_all = "camelCase")]
    Trip { from: TripStatus, to: TripStatus },
    #[serde(rename_all = "camelCase")]
    Stop {
        stop_id: StopId,
        from: StopStatus,
        to: StopStatus,
    },
}

/// Audit entry for an applied status change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionRecord {
    #[serde(flatten)]
    pub change: StatusChange,
    pub at: Timestamp,
}

/// Everything one command changed, in application order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TransitionOutcome {
    pub changes: Vec<StatusChange>,
}

impl TransitionOutcome {
    /// Whether the command (directly or by cascade) completed the trip.
    pub fn completed_trip(&self) -> bool {
        self.changes.iter().any(|c| {
            matches!(
                c,
                StatusChange::Trip {
                    to: TripStatus::Completed,
                    ..
                }
            )
        })
    }

    /// The stop that the command moved to `InTransit`, if any.
    pub fn advanced_stop(&self) -> Option<&StopId> {
        self.changes.iter().find_map(|c| match c {
            StatusChange::Stop {
                stop_id,
                to: StopStatus::InTransit,
                ..
            } => Some(stop_id),
            _ => None,
        })
    }
}

// ─── Commands ────────────────────────────────────────────────────────

/// A status-changing command, from a dispatcher action or remote state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum TripCommand {
    Dispatch,
    Complete,
    Cancel,
    StartStop { stop_id: StopId },
    DeliverStop { stop_id: StopId },
    FailStop {
        stop_id: StopId,
        #[serde(default)]
        reason: Option<String>,
    },
}

impl Trip {
    /// Apply a command at the given instant.
    pub fn apply(&mut self, command: TripCommand, at: Timestamp) -> Result<TransitionOutcome, LifecycleError> {
        match command {
            TripCommand::Dispatch => self.dispatch(at),
            TripCommand::Complete => self.complete(at),
            TripCommand::Cancel => self.cancel(at),
            TripCommand::StartStop { stop_id } => self.start_stop(&stop_id, at),
            TripCommand::DeliverStop { stop_id } => self.deliver_stop(&stop_id, at),
            TripCommand::FailStop { stop_id, reason } => self.fail_stop(&stop_id, reason, at),
        }
    }

    /// Request an arbitrary trip edge. Unknown edges fail with
    /// [`LifecycleError::InvalidStateTransition`].
    pub fn transition(&mut self, to: TripStatus, at: Timestamp) -> Result<TransitionOutcome, LifecycleError> {
        self.require_trip_edge(to)?;
        match to {
            TripStatus::InProgress => self.dispatch(at),
            TripStatus::Completed => self.complete(at),
            TripStatus::Cancelled => self.cancel(at),
            // No edge leads back to Created; require_trip_edge rejected it.
            TripStatus::Created => Err(self.trip_edge_error(to)),
        }
    }

    /// Request an arbitrary stop edge. Unknown edges (including any attempt
    /// to leave a terminal status) fail with
    /// [`LifecycleError::InvalidStateTransition`].
    pub fn transition_stop(
        &mut self,
        stop_id: &StopId,
        to: StopStatus,
        at: Timestamp,
    ) -> Result<TransitionOutcome, LifecycleError> {
        let index = self.require_stop_index(stop_id)?;
        self.require_stop_edge(index, to)?;
        match to {
            StopStatus::InTransit => self.start_stop(stop_id, at),
            StopStatus::Delivered => self.deliver_stop(stop_id, at),
            StopStatus::Failed => self.fail_stop(stop_id, None, at),
            // No edge leads back to Pending; require_stop_edge rejected it.
            StopStatus::Pending => Err(self.stop_edge_error(index, to)),
        }
    }

    /// `Created → InProgress`. The first pending stop goes `InTransit`.
    pub fn dispatch(&mut self, at: Timestamp) -> Result<TransitionOutcome, LifecycleError> {
        self.require_trip_edge(TripStatus::InProgress)?;
        let first = self
            .stops
            .iter()
            .position(|s| s.status == StopStatus::Pending)
            .ok_or_else(|| LifecycleError::EmptyTrip {
                trip_id: self.id.to_string(),
            })?;

        let mut outcome = TransitionOutcome::default();
        self.set_trip_status(TripStatus::InProgress, at, &mut outcome);
        self.departure_at = Some(at);
        self.set_stop_status(first, StopStatus::InTransit, at, &mut outcome);
        tracing::debug!(trip_id = %self.id, stop_id = %self.stops[first].id, "trip dispatched");
        Ok(outcome)
    }

    /// `InProgress → Completed`. Every stop must be terminal.
    pub fn complete(&mut self, at: Timestamp) -> Result<TransitionOutcome, LifecycleError> {
        self.require_trip_edge(TripStatus::Completed)?;
        let remaining = self.total_stop_count() - self.completed_stop_count();
        if remaining > 0 {
            return Err(LifecycleError::IncompleteStops {
                trip_id: self.id.to_string(),
                remaining,
            });
        }
        let mut outcome = TransitionOutcome::default();
        self.finish(at, &mut outcome);
        Ok(outcome)
    }

    /// `Created | InProgress → Cancelled`, allowed while no stop is delivered.
    /// Stop statuses are left as they are.
    pub fn cancel(&mut self, at: Timestamp) -> Result<TransitionOutcome, LifecycleError> {
        self.require_trip_edge(TripStatus::Cancelled)?;
        let delivered = self.delivered_stop_count();
        if delivered > 0 {
            return Err(LifecycleError::DeliveredStopsPresent {
                trip_id: self.id.to_string(),
                delivered,
            });
        }
        let mut outcome = TransitionOutcome::default();
        self.set_trip_status(TripStatus::Cancelled, at, &mut outcome);
        self.completed_at = Some(at);
        tracing::debug!(trip_id = %self.id, "trip cancelled");
        Ok(outcome)
    }

    /// `Pending → InTransit` for one stop.
    pub fn start_stop(&mut self, stop_id: &StopId, at: Timestamp) -> Result<TransitionOutcome, LifecycleError> {
        let index = self.require_stop_index(stop_id)?;
        self.require_stop_edge(index, StopStatus::InTransit)?;
        self.require_in_progress()?;
        if let Some(other) = self.in_transit_stop() {
            return Err(LifecycleError::AnotherStopInTransit {
                trip_id: self.id.to_string(),
                in_transit: other.id.to_string(),
            });
        }
        let mut outcome = TransitionOutcome::default();
        self.set_stop_status(index, StopStatus::InTransit, at, &mut outcome);
        Ok(outcome)
    }

    /// `InTransit → Delivered`, then cascade.
    pub fn deliver_stop(&mut self, stop_id: &StopId, at: Timestamp) -> Result<TransitionOutcome, LifecycleError> {
        let index = self.require_stop_index(stop_id)?;
        self.require_stop_edge(index, StopStatus::Delivered)?;
        self.require_in_progress()?;

        let mut outcome = TransitionOutcome::default();
        self.set_stop_status(index, StopStatus::Delivered, at, &mut outcome);
        self.stops[index].delivered_at = Some(at);
        self.advance(at, &mut outcome);
        Ok(outcome)
    }

    /// `InTransit → Failed`, then cascade.
    pub fn fail_stop(
        &mut self,
        stop_id: &StopId,
        reason: Option<String>,
        at: Timestamp,
    ) -> Result<TransitionOutcome, LifecycleError> {
        let index = self.require_stop_index(stop_id)?;
        self.require_stop_edge(index, StopStatus::Failed)?;
        self.require_in_progress()?;

        let mut outcome = TransitionOutcome::default();
        self.set_stop_status(index, StopStatus::Failed, at, &mut outcome);
        self.stops[index].failure_reason = reason;
        self.advance(at, &mut outcome);
        Ok(outcome)
    }

    // ── internals ────────────────────────────────────────────────────

    /// Re-evaluate the trip after a stop resolution.
    fn advance(&mut self, at: Timestamp, outcome: &mut TransitionOutcome) {
        if self.in_transit_stop().is_some() {
            return;
        }
        match self.stops.iter().position(|s| s.status == StopStatus::Pending) {
            Some(next) => self.set_stop_status(next, StopStatus::InTransit, at, outcome),
            None if self.all_stops_terminal() => self.finish(at, outcome),
            None => {}
        }
    }

    fn finish(&mut self, at: Timestamp, outcome: &mut TransitionOutcome) {
        self.set_trip_status(TripStatus::Completed, at, outcome);
        self.completed_at = Some(at);
        tracing::debug!(
            trip_id = %self.id,
            delivered = self.delivered_stop_count(),
            failed = self.failed_stop_count(),
            "trip completed"
        );
    }

    fn set_trip_status(&mut self, to: TripStatus, at: Timestamp, outcome: &mut TransitionOutcome) {
        let change = StatusChange::Trip { from: self.status, to };
        self.status = to;
        self.record(change, at, outcome);
    }

    fn set_stop_status(&mut self, index: usize, to: StopStatus, at: Timestamp, outcome: &mut TransitionOutcome) {
        let stop = &mut self.stops[index];
        let change = StatusChange::Stop {
            stop_id: stop.id.clone(),
            from: stop.status,
            to,
        };
        stop.status = to;
        tracing::debug!(trip_id = %self.id, stop_id = %stop.id, %to, "stop status changed");
        self.record(change, at, outcome);
    }

    fn record(&mut self, change: StatusChange, at: Timestamp, outcome: &mut TransitionOutcome) {
        self.transitions.push(TransitionRecord {
            change: change.clone(),
            at,
        });
        outcome.changes.push(change);
    }

    fn require_in_progress(&self) -> Result<(), LifecycleError> {
        if self.status != TripStatus::InProgress {
            return Err(LifecycleError::TripNotInProgress {
                trip_id: self.id.to_string(),
                status: self.status,
            });
        }
        Ok(())
    }

    fn require_trip_edge(&self, to: TripStatus) -> Result<(), LifecycleError> {
        if self.status.can_transition_to(to) {
            Ok(())
        } else {
            Err(self.trip_edge_error(to))
        }
    }

    fn trip_edge_error(&self, to: TripStatus) -> LifecycleError {
        LifecycleError::InvalidStateTransition {
            subject: format!("trip {}", self.id),
            from: self.status.to_string(),
            to: to.to_string(),
        }
    }

    fn require_stop_edge(&self, index: usize, to: StopStatus) -> Result<(), LifecycleError> {
        if self.stops[index].status.can_transition_to(to) {
            Ok(())
        } else {
            Err(self.stop_edge_error(index, to))
        }
    }

    fn stop_edge_error(&self, index: usize, to: StopStatus) -> LifecycleError {
        let stop = &self.stops[index];
        LifecycleError::InvalidStateTransition {
            subject: format!("stop {}", stop.id),
            from: stop.status.to_string(),
            to: to.to_string(),
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────
