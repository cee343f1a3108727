//! # tripwatch-core: Foundational Types
//!
//! Leaf crate of the tripwatch workspace. Every other crate depends on it;
//! it depends on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Newtype wrappers for identifiers.** `TripId`, `StopId`, `StoreId`,
//!    `WarehouseId`, `DispatcherId`, `VehicleId`. You cannot pass a
//!    `VehicleId` where a `TripId` is expected.
//!
//! 2. **UTC-only timestamps.** `Timestamp` is always UTC, truncated to
//!    seconds, rendered as `YYYY-MM-DDTHH:MM:SSZ`.
//!
//! 3. **Integer money.** `Money` carries minor units. No floats for amounts.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `tripwatch-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod error;
pub mod identity;
pub mod money;
pub mod temporal;

pub use error::CoreError;
pub use identity::{DispatcherId, StopId, StoreId, TripId, VehicleId, WarehouseId};
pub use money::Money;
pub use temporal::Timestamp;
