//! # Trip and Stop Status
//!
//! Closed enumerations for trip and stop status. Every display mapping is an
//! exhaustive `match`: adding a status forces every label, badge and wire
//! name to be decided at compile time. There is no default label.
//!
//! ```text
//! Trip:  Created ──▶ InProgress ──▶ Completed
//!           │            │
//!           └────────────┴──▶ Cancelled
//!
//! Stop:  Pending ──▶ InTransit ──▶ Delivered
//!                        │
//!                        └──▶ Failed
//! ```

use serde::{Deserialize, Serialize};

/// Visual variant a presentation layer uses for a status badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BadgeVariant {
    Neutral,
    Info,
    Success,
    Warning,
    Danger,
}

// ─── Trip Status ─────────────────────────────────────────────────────

/// Lifecycle status of a trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TripStatus {
    /// Planned, not yet dispatched. Stops may still change.
    Created,
    /// Dispatched; the dispatcher is working through the stops.
    InProgress,
    /// Every stop reached a terminal status (terminal).
    Completed,
    /// Abandoned before any delivery (terminal).
    Cancelled,
}

impl TripStatus {
    /// All trip statuses in lifecycle order.
    pub const ALL: [TripStatus; 4] = [
        Self::Created,
        Self::InProgress,
        Self::Completed,
        Self::Cancelled,
    ];

    /// Wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "Created",
            Self::InProgress => "InProgress",
            Self::Completed => "Completed",
            Self::Cancelled => "Cancelled",
        }
    }

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Created => "Created",
            Self::InProgress => "In Progress",
            Self::Completed => "Completed",
            Self::Cancelled => "Cancelled",
        }
    }

    /// Badge variant for the status.
    pub fn badge(&self) -> BadgeVariant {
        match self {
            Self::Created => BadgeVariant::Neutral,
            Self::InProgress => BadgeVariant::Info,
            Self::Completed => BadgeVariant::Success,
            Self::Cancelled => BadgeVariant::Danger,
        }
    }

    /// Parse a status name. Case, spaces, underscores and dashes are ignored,
    /// so `"InProgress"`, `"in_progress"` and `"In Progress"` are equivalent.
    pub fn from_name(name: &str) -> Option<Self> {
        match normalize(name).as_str() {
            "created" => Some(Self::Created),
            "inprogress" => Some(Self::InProgress),
            "completed" => Some(Self::Completed),
            "cancelled" | "canceled" => Some(Self::Cancelled),
            _ => None,
        }
    }

    /// Whether no further transition is possible.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    /// Target statuses reachable in one step.
    pub fn valid_transitions(&self) -> &'static [TripStatus] {
        match self {
            Self::Created => &[Self::InProgress, Self::Cancelled],
            Self::InProgress => &[Self::Completed, Self::Cancelled],
            Self::Completed | Self::Cancelled => &[],
        }
    }

    /// Whether `self → to` is an edge of the trip machine.
    pub fn can_transition_to(&self, to: TripStatus) -> bool {
        self.valid_transitions().contains(&to)
    }
}

impl std::fmt::Display for TripStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─── Stop Status ─────────────────────────────────────────────────────

/// Delivery status of a single stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StopStatus {
    /// Not yet visited.
    Pending,
    /// The dispatcher is on the way to this store.
    InTransit,
    /// Goods handed over (terminal).
    Delivered,
    /// Visit attempted, delivery did not happen (terminal).
    Failed,
}

impl StopStatus {
    /// All stop statuses in lifecycle order.
    pub const ALL: [StopStatus; 4] = [
        Self::Pending,
        Self::InTransit,
        Self::Delivered,
        Self::Failed,
    ];

    /// Wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::InTransit => "InTransit",
            Self::Delivered => "Delivered",
            Self::Failed => "Failed",
        }
    }

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::InTransit => "In Transit",
            Self::Delivered => "Delivered",
            Self::Failed => "Failed",
        }
    }

    /// Badge variant for the status.
    pub fn badge(&self) -> BadgeVariant {
        match self {
            Self::Pending => BadgeVariant::Neutral,
            Self::InTransit => BadgeVariant::Warning,
            Self::Delivered => BadgeVariant::Success,
            Self::Failed => BadgeVariant::Danger,
        }
    }

    /// Parse a status name, ignoring case, spaces, underscores and dashes.
    pub fn from_name(name: &str) -> Option<Self> {
        match normalize(name).as_str() {
            "pending" => Some(Self::Pending),
            "intransit" => Some(Self::InTransit),
            "delivered" => Some(Self::Delivered),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }

    /// `Delivered` and `Failed` never revert.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Delivered | Self::Failed)
    }

    /// Target statuses reachable in one step.
    pub fn valid_transitions(&self) -> &'static [StopStatus] {
        match self {
            Self::Pending => &[Self::InTransit],
            Self::InTransit => &[Self::Delivered, Self::Failed],
            Self::Delivered | Self::Failed => &[],
        }
    }

    /// Whether `self → to` is an edge of the stop machine.
    pub fn can_transition_to(&self, to: StopStatus) -> bool {
        self.valid_transitions().contains(&to)
    }
}

impl std::fmt::Display for StopStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| !matches!(c, ' ' | '_' | '-'))
        .flat_map(char::to_lowercase)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trip_names_round_trip() {
        for status in TripStatus::ALL {
            assert_eq!(TripStatus::from_name(status.as_str()), Some(status));
            assert_eq!(TripStatus::from_name(status.label()), Some(status));
        }
        assert_eq!(TripStatus::from_name("in_progress"), Some(TripStatus::InProgress));
        assert_eq!(TripStatus::from_name("Archived"), None);
    }

    #[test]
    fn stop_names_round_trip() {
        for status in StopStatus::ALL {
            assert_eq!(StopStatus::from_name(status.as_str()), Some(status));
            assert_eq!(StopStatus::from_name(status.label()), Some(status));
        }
        assert_eq!(StopStatus::from_name("in-transit"), Some(StopStatus::InTransit));
        assert_eq!(StopStatus::from_name(""), None);
    }

    #[test]
    fn terminal_states_have_no_exits() {
        for status in TripStatus::ALL {
            assert_eq!(status.is_terminal(), status.valid_transitions().is_empty());
        }
        for status in StopStatus::ALL {
            assert_eq!(status.is_terminal(), status.valid_transitions().is_empty());
        }
    }

    #[test]
    fn labels_and_badges() {
        assert_eq!(TripStatus::InProgress.label(), "In Progress");
        assert_eq!(TripStatus::Cancelled.badge(), BadgeVariant::Danger);
        assert_eq!(StopStatus::InTransit.label(), "In Transit");
        assert_eq!(StopStatus::Delivered.badge(), BadgeVariant::Success);
    }

    #[test]
    fn serde_uses_wire_names() {
        assert_eq!(
            serde_json::to_string(&TripStatus::InProgress).unwrap(),
            "\"InProgress\""
        );
        let s: StopStatus = serde_json::from_str("\"Failed\"").unwrap();
        assert_eq!(s, StopStatus::Failed);
    }
}
