//! # Identifier Newtypes
//!
//! Every reference a Trip carries is a distinct type. The upstream API hands
//! out opaque string identifiers (e.g. `TRP-1042`), so the wrappers hold
//! strings rather than UUIDs; locally generated ids use UUID v4 text.
//!
//! Identifiers serialize transparently as plain JSON strings.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::CoreError;

macro_rules! string_identifier {
    ($(#[$meta:meta])* $name:ident, $kind:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wrap an identifier issued by the upstream system.
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Wrap an identifier, rejecting empty or whitespace-only input.
            pub fn parse(value: &str) -> Result<Self, CoreError> {
                let trimmed = value.trim();
                if trimmed.is_empty() {
                    return Err(CoreError::InvalidIdentifier {
                        kind: $kind,
                        value: value.to_string(),
                    });
                }
                Ok(Self(trimmed.to_string()))
            }

            /// Generate a fresh random identifier.
            pub fn generate() -> Self {
                Self(Uuid::new_v4().to_string())
            }

            /// Access the identifier text.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.pad(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self::new(value)
            }
        }
    };
}

string_identifier!(
    /// Unique identifier of a delivery trip.
    TripId,
    "trip"
);

string_identifier!(
    /// Unique identifier of a stop within a trip.
    StopId,
    "stop"
);

string_identifier!(
    /// Reference to the store visited at a stop.
    StoreId,
    "store"
);

string_identifier!(
    /// Reference to the warehouse a trip departs from.
    WarehouseId,
    "warehouse"
);

string_identifier!(
    /// Reference to the dispatcher executing a trip.
    DispatcherId,
    "dispatcher"
);

string_identifier!(
    /// Reference to the vehicle assigned to a trip (plate or fleet number).
    VehicleId,
    "vehicle"
);
