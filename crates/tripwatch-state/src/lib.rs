//! # tripwatch-state: Trip and Stop Lifecycle
//!
//! The state machines of a delivery trip and its stops, kept in one place
//! so every surface (CLI, monitor, integration tests) applies the same
//! rules.
//!
//! - **Status** (`status.rs`): `TripStatus` and `StopStatus` with their
//!   edges, wire names, labels and badge variants.
//!
//! - **Trip** (`trip.rs`): the `Trip`/`Stop` aggregate, stop planning
//!   while `Created`, derived counts, structural invariant checks.
//!
//! - **Lifecycle** (`lifecycle.rs`): dispatch, stop start/deliver/fail,
//!   completion and cancellation, with the resolution cascade and the
//!   transition audit log.
//!
//! ## Design
//!
//! Trip state is data received from the upstream API, so statuses are
//! runtime enums rather than typestate. Every command validates the whole
//! change before touching the trip; a rejected command is a no-op.

pub mod lifecycle;
pub mod status;
pub mod trip;

pub use lifecycle::{LifecycleError, StatusChange, TransitionOutcome, TransitionRecord, TripCommand};
pub use status::{BadgeVariant, StopStatus, TripStatus};
pub use trip::{Stop, Trip, TripPlan};
