//! # Trip Filters
//!
//! Predicates applied, in order, by every trip view: free-text search,
//! status, departure date range and warehouse. Raw filter input from a
//! query string or config file goes through [`TripQuery::from_params`],
//! which never fails. Names it does not recognize become filters that
//! match nothing, so a bad parameter yields an empty view, not an error.

use chrono::Duration;
use serde::{Deserialize, Serialize};

use tripwatch_core::{Timestamp, WarehouseId};
use tripwatch_state::{Trip, TripStatus};

use crate::sort::SortOrder;

/// Status predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Only(TripStatus),
    /// The requested status name was not recognized.
    Unmatched,
}

impl StatusFilter {
    /// Parse a status filter name. Blank and `"all"` select every status.
    pub fn parse(name: &str) -> Self {
        let name = name.trim();
        if name.is_empty() || name.eq_ignore_ascii_case("all") {
            return Self::All;
        }
        TripStatus::from_name(name).map_or(Self::Unmatched, Self::Only)
    }

    pub fn matches(&self, status: TripStatus) -> bool {
        match self {
            Self::All => true,
            Self::Only(wanted) => *wanted == status,
            Self::Unmatched => false,
        }
    }

    /// Wire name for query strings. `None` for `All`.
    pub fn as_param(&self) -> Option<&'static str> {
        match self {
            Self::All => None,
            Self::Only(status) => Some(status.as_str()),
            Self::Unmatched => Some("unmatched"),
        }
    }
}

/// Departure date predicate relative to the evaluation instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DateRange {
    #[default]
    All,
    /// Same UTC calendar date as now.
    Today,
    /// Departed no more than 7 days before now.
    Week,
    /// Departed no more than 30 days before now.
    Month,
    /// The requested range name was not recognized.
    Unmatched,
}

impl DateRange {
    pub fn parse(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "" | "all" => Self::All,
            "today" => Self::Today,
            "week" => Self::Week,
            "month" => Self::Month,
            _ => Self::Unmatched,
        }
    }

    pub fn as_param(&self) -> Option<&'static str> {
        match self {
            Self::All => None,
            Self::Today => Some("today"),
            Self::Week => Some("week"),
            Self::Month => Some("month"),
            Self::Unmatched => Some("unmatched"),
        }
    }

    /// Whether a departure instant falls in the range. Trips that have not
    /// departed match only [`DateRange::All`]. Departures later than `now`
    /// are inside `Week` and `Month`.
    pub fn matches(&self, departure_at: Option<Timestamp>, now: Timestamp) -> bool {
        match (self, departure_at) {
            (Self::All, _) => true,
            (Self::Unmatched, _) | (_, None) => false,
            (Self::Today, Some(d)) => d.as_datetime().date_naive() == now.as_datetime().date_naive(),
            (Self::Week, Some(d)) => d.duration_until(&now) <= Duration::days(7),
            (Self::Month, Some(d)) => d.duration_until(&now) <= Duration::days(30),
        }
    }
}

/// Raw, unvalidated filter input as it arrives from a URL or config file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QueryParams {
    pub search: Option<String>,
    pub status: Option<String>,
    pub date_range: Option<String>,
    pub warehouse_id: Option<String>,
    pub sort: Option<String>,
}

/// A validated trip query: the filter predicates plus the sort order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TripQuery {
    /// Free-text needle, trimmed. Empty matches everything.
    pub search: String,
    pub status: StatusFilter,
    pub date_range: DateRange,
    pub warehouse: Option<WarehouseId>,
    pub sort: SortOrder,
}

impl TripQuery {
    /// Build a query from raw parameters. Never fails.
    pub fn from_params(params: &QueryParams) -> Self {
        Self {
            search: params.search.as_deref().unwrap_or_default().trim().to_string(),
            status: params.status.as_deref().map_or(StatusFilter::All, StatusFilter::parse),
            date_range: params.date_range.as_deref().map_or(DateRange::All, DateRange::parse),
            warehouse: params
                .warehouse_id
                .as_deref()
                .and_then(|w| WarehouseId::parse(w).ok()),
            sort: params.sort.as_deref().map_or_else(SortOrder::default, SortOrder::parse),
        }
    }

    /// The query rendered back to raw parameters, e.g. for an upstream request.
    pub fn to_params(&self) -> QueryParams {
        QueryParams {
            search: (!self.search.is_empty()).then(|| self.search.clone()),
            status: self.status.as_param().map(str::to_string),
            date_range: self.date_range.as_param().map(str::to_string),
            warehouse_id: self.warehouse.as_ref().map(ToString::to_string),
            sort: (self.sort != SortOrder::default()).then(|| self.sort.to_string()),
        }
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = search.into().trim().to_string();
        self
    }

    pub fn with_status(mut self, status: TripStatus) -> Self {
        self.status = StatusFilter::Only(status);
        self
    }

    pub fn with_date_range(mut self, range: DateRange) -> Self {
        self.date_range = range;
        self
    }

    pub fn with_warehouse(mut self, warehouse: WarehouseId) -> Self {
        self.warehouse = Some(warehouse);
        self
    }

    pub fn with_sort(mut self, sort: SortOrder) -> Self {
        self.sort = sort;
        self
    }

    /// Whether a trip passes every predicate.
    pub fn matches(&self, trip: &Trip, now: Timestamp) -> bool {
        matches_search(trip, &self.search)
            && self.status.matches(trip.status)
            && self.date_range.matches(trip.departure_at, now)
            && self.warehouse.as_ref().map_or(true, |w| *w == trip.warehouse_id)
    }
}

/// Case-insensitive substring match on dispatcher name, vehicle id and
/// trip id. A blank needle matches every trip.
pub fn matches_search(trip: &Trip, needle: &str) -> bool {
    let needle = needle.trim();
    if needle.is_empty() {
        return true;
    }
    let needle = needle.to_lowercase();
    [
        trip.dispatcher_name.as_str(),
        trip.vehicle_id.as_str(),
        trip.id.as_str(),
    ]
    .iter()
    .any(|field| field.to_lowercase().contains(&needle))
}
