//! # Trip Ordering
//!
//! Sort keys for trip tables. Sorting is stable, so trips comparing equal
//! keep their upstream order. Trips that have not departed always sort
//! after departed ones, whichever direction is requested.

use std::cmp::Ordering;

use tripwatch_state::Trip;

use crate::progress::progress_percent;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    #[default]
    DepartureAt,
    Id,
    Dispatcher,
    Vehicle,
    Status,
    Progress,
    TotalValue,
}

impl SortKey {
    pub const ALL: [SortKey; 7] = [
        Self::DepartureAt,
        Self::Id,
        Self::Dispatcher,
        Self::Vehicle,
        Self::Status,
        Self::Progress,
        Self::TotalValue,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DepartureAt => "departure",
            Self::Id => "id",
            Self::Dispatcher => "dispatcher",
            Self::Vehicle => "vehicle",
            Self::Status => "status",
            Self::Progress => "progress",
            Self::TotalValue => "value",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim().to_ascii_lowercase();
        match name.as_str() {
            "departureat" | "departure_at" => Some(Self::DepartureAt),
            "totalvalue" | "total_value" => Some(Self::TotalValue),
            _ => Self::ALL.into_iter().find(|k| k.as_str() == name),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

/// A sort key with its direction. Defaults to most recent departure first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SortOrder {
    pub key: SortKey,
    pub direction: SortDirection,
}

impl SortOrder {
    pub fn new(key: SortKey, direction: SortDirection) -> Self {
        Self { key, direction }
    }

    /// Parse `key`, `key:asc` or `key:desc`. A bare key sorts ascending,
    /// except `departure` which keeps the default descending order.
    /// Unrecognized input falls back to the default order.
    pub fn parse(raw: &str) -> Self {
        let (key, dir) = match raw.split_once(':') {
            Some((k, d)) => (k, Some(d)),
            None => (raw, None),
        };
        let Some(key) = SortKey::from_name(key) else {
            return Self::default();
        };
        let direction = match dir.map(|d| d.trim().to_ascii_lowercase()).as_deref() {
            Some("asc") => SortDirection::Asc,
            Some("desc") => SortDirection::Desc,
            Some(_) => return Self::default(),
            None if key == SortKey::DepartureAt => SortDirection::Desc,
            None => SortDirection::Asc,
        };
        Self { key, direction }
    }

    /// Compare two trips under this order.
    pub fn compare(&self, a: &Trip, b: &Trip) -> Ordering {
        if self.key == SortKey::DepartureAt {
            return match (a.departure_at, b.departure_at) {
                (Some(x), Some(y)) => self.directed(x.cmp(&y)),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            };
        }
        let ord = match self.key {
            SortKey::Id => a.id.as_str().cmp(b.id.as_str()),
            SortKey::Dispatcher => a
                .dispatcher_name
                .to_lowercase()
                .cmp(&b.dispatcher_name.to_lowercase()),
            SortKey::Vehicle => a.vehicle_id.as_str().cmp(b.vehicle_id.as_str()),
            SortKey::Status => a.status.cmp(&b.status),
            SortKey::Progress => progress_percent(a).cmp(&progress_percent(b)),
            SortKey::TotalValue => a.total_value.cmp(&b.total_value),
            SortKey::DepartureAt => Ordering::Equal,
        };
        self.directed(ord)
    }

    fn directed(&self, ord: Ordering) -> Ordering {
        match self.direction {
            SortDirection::Asc => ord,
            SortDirection::Desc => ord.reverse(),
        }
    }
}

impl std::fmt::Display for SortOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let dir = match self.direction {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        };
        write!(f, "{}:{dir}", self.key.as_str())
    }
}

/// Stable in-place sort of trip references.
pub fn sort_trips(trips: &mut [&Trip], order: SortOrder) {
    trips.sort_by(|a, b| order.compare(a, b));
}
