//! # Progress Aggregation
//!
//! Per-trip and fleet-wide completion metrics. Everything here is a pure
//! function of the stop statuses; nothing is cached.
//!
//! Percentages are rounded to the nearest integer, half-up, in exact
//! integer arithmetic. `Failed` stops count toward completion but never
//! toward success.

use serde::Serialize;

use tripwatch_core::Money;
use tripwatch_state::{StopStatus, Trip, TripStatus};

/// `round(100 * part / whole)`, half-up. Zero when `whole` is zero.
fn percent(part: u64, whole: u64) -> u8 {
    if whole == 0 {
        return 0;
    }
    let rounded = (200 * part + whole) / (2 * whole);
    rounded.min(100) as u8
}

/// Share of stops that reached `Delivered` or `Failed`.
pub fn progress_percent(trip: &Trip) -> u8 {
    percent(trip.completed_stop_count() as u64, trip.total_stop_count() as u64)
}

/// Share of stops that reached `Delivered`.
pub fn success_rate(trip: &Trip) -> u8 {
    percent(trip.delivered_stop_count() as u64, trip.total_stop_count() as u64)
}

/// Completed stops over all stops across the collection.
pub fn overall_progress<'a, I>(trips: I) -> u8
where
    I: IntoIterator<Item = &'a Trip>,
{
    let (completed, total) = trips.into_iter().fold((0u64, 0u64), |(c, t), trip| {
        (
            c + trip.completed_stop_count() as u64,
            t + trip.total_stop_count() as u64,
        )
    });
    percent(completed, total)
}

/// Mean of the per-trip success rates, rounded half-up. Zero for an empty
/// collection. Each trip weighs the same regardless of its stop count.
pub fn average_success_rate<'a, I>(trips: I) -> u8
where
    I: IntoIterator<Item = &'a Trip>,
{
    let (sum, count) = trips
        .into_iter()
        .fold((0u64, 0u64), |(s, n), trip| (s + u64::from(success_rate(trip)), n + 1));
    if count == 0 {
        return 0;
    }
    ((2 * sum + count) / (2 * count)).min(100) as u8
}

/// Stop breakdown and percentages of one trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TripProgress {
    pub total: usize,
    pub completed: usize,
    pub delivered: usize,
    pub failed: usize,
    pub in_transit: usize,
    pub pending: usize,
    pub progress_percent: u8,
    pub success_rate: u8,
}

impl TripProgress {
    pub fn of(trip: &Trip) -> Self {
        let mut p = Self {
            total: trip.total_stop_count(),
            completed: 0,
            delivered: 0,
            failed: 0,
            in_transit: 0,
            pending: 0,
            progress_percent: progress_percent(trip),
            success_rate: success_rate(trip),
        };
        for stop in &trip.stops {
            match stop.status {
                StopStatus::Pending => p.pending += 1,
                StopStatus::InTransit => p.in_transit += 1,
                StopStatus::Delivered => p.delivered += 1,
                StopStatus::Failed => p.failed += 1,
            }
        }
        p.completed = p.delivered + p.failed;
        p
    }
}

/// Summary of a trip collection, as shown above the monitoring table.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FleetSummary {
    pub trip_count: usize,
    pub created: usize,
    pub in_progress: usize,
    pub completed: usize,
    pub cancelled: usize,
    pub total_stops: usize,
    pub completed_stops: usize,
    pub delivered_stops: usize,
    pub failed_stops: usize,
    pub overall_progress: u8,
    pub average_success_rate: u8,
    pub total_value: Money,
}

impl FleetSummary {
    pub fn of<'a, I>(trips: I) -> Self
    where
        I: IntoIterator<Item = &'a Trip>,
        I::IntoIter: Clone,
    {
        let iter = trips.into_iter();
        let mut summary = Self {
            overall_progress: overall_progress(iter.clone()),
            average_success_rate: average_success_rate(iter.clone()),
            total_value: iter.clone().map(|t| t.total_value).sum(),
            ..Self::default()
        };
        for trip in iter {
            summary.trip_count += 1;
            match trip.status {
                TripStatus::Created => summary.created += 1,
                TripStatus::InProgress => summary.in_progress += 1,
                TripStatus::Completed => summary.completed += 1,
                TripStatus::Cancelled => summary.cancelled += 1,
            }
            summary.total_stops += trip.total_stop_count();
            summary.completed_stops += trip.completed_stop_count();
            summary.delivered_stops += trip.delivered_stop_count();
            summary.failed_stops += trip.failed_stop_count();
        }
        summary
    }
}
