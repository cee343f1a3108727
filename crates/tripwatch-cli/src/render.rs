//! Plain-text rendering of view models.

use std::fmt::Write as _;

use tripwatch_core::Timestamp;
use tripwatch_query::{FleetSummary, Pagination};
use tripwatch_monitor::{TripRow, TripViewModel};
use tripwatch_state::Trip;

/// Output format selected with `--output`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

pub fn summary_cards(summary: &FleetSummary) -> String {
    format!(
        "trips {}  in progress {}  completed {}  cancelled {}  |  stops {}/{}  progress {}%  success {}%  |  value {}",
        summary.trip_count,
        summary.in_progress,
        summary.completed,
        summary.cancelled,
        summary.completed_stops,
        summary.total_stops,
        summary.overall_progress,
        summary.average_success_rate,
        summary.total_value,
    )
}

fn departure(at: Option<Timestamp>) -> String {
    at.map_or_else(|| "-".to_string(), |t| t.to_iso8601())
}

fn row_line(row: &TripRow) -> String {
    format!(
        "{:<12} {:<18} {:<12} {:<14} {:<12} {:>6} {:>5}% {:>5}%  {:<20} {}",
        row.trip_id,
        truncate(&row.dispatcher, 18),
        row.vehicle,
        truncate(&row.warehouse, 14),
        row.status_label,
        row.stops_label(),
        row.progress.progress_percent,
        row.progress.success_rate,
        departure(row.departure_at),
        row.current_stop.as_deref().unwrap_or("-"),
    )
}

fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        s.to_string()
    } else {
        let mut out: String = s.chars().take(width.saturating_sub(1)).collect();
        out.push('…');
        out
    }
}

fn table(out: &mut String, rows: &[TripRow]) {
    let _ = writeln!(
        out,
        "{:<12} {:<18} {:<12} {:<14} {:<12} {:>6} {:>6} {:>6}  {:<20} {}",
        "TRIP", "DISPATCHER", "VEHICLE", "WAREHOUSE", "STATUS", "STOPS", "PROG", "OK", "DEPARTED", "CURRENT STOP"
    );
    if rows.is_empty() {
        let _ = writeln!(out, "(no trips match)");
    }
    for row in rows {
        let _ = writeln!(out, "{}", row_line(row));
    }
}

fn pager(out: &mut String, p: &Pagination) {
    let buttons: Vec<String> = p
        .window()
        .map(|n| {
            if n == p.current_page() {
                format!("[{n}]")
            } else {
                n.to_string()
            }
        })
        .collect();
    let _ = writeln!(
        out,
        "page {} of {} ({} trips)  {}",
        p.current_page(),
        p.total_pages(),
        p.total(),
        buttons.join(" ")
    );
}

/// Full monitoring page: summary, table, pager and freshness line.
pub fn board(vm: &TripViewModel) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", summary_cards(&vm.summary));
    table(&mut out, &vm.rows);
    pager(&mut out, &vm.pagination);
    match (&vm.staleness, &vm.last_error) {
        (Some(age), None) => {
            let _ = writeln!(out, "updated {age}");
        }
        (Some(age), Some(err)) => {
            let _ = writeln!(out, "updated {age} (last refresh failed: {err})");
        }
        (None, Some(err)) => {
            let _ = writeln!(out, "not loaded yet (last refresh failed: {err})");
        }
        (None, None) => {
            let _ = writeln!(out, "not loaded yet");
        }
    }
    if vm.is_fetching {
        let _ = writeln!(out, "refreshing...");
    }
    out
}

/// One server-side page of history.
pub fn history(rows: &[TripRow], pagination: &Pagination) -> String {
    let mut out = String::new();
    table(&mut out, rows);
    pager(&mut out, pagination);
    out
}

/// Stop-by-stop detail of one trip.
pub fn trip_detail(trip: &Trip) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} {} ({})  dispatcher {}  vehicle {}  value {}",
        trip.id,
        trip.status.label(),
        trip.warehouse_id,
        trip.dispatcher_name,
        trip.vehicle_id,
        trip.total_value
    );
    for (n, stop) in trip.stops.iter().enumerate() {
        let mut line = format!("  {:>2}. {:<10} {:<24} {}", n + 1, stop.id, stop.store_name, stop.status.label());
        if let Some(at) = stop.delivered_at {
            let _ = write!(line, " at {at}");
        }
        if let Some(reason) = &stop.failure_reason {
            let _ = write!(line, " ({reason})");
        }
        let _ = writeln!(out, "{line}");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_marks_cut_text() {
        assert_eq!(truncate("Budi", 18), "Budi");
        assert_eq!(truncate("Gudang Cikarang Timur", 8), "Gudang …");
    }

    #[test]
    fn empty_board_renders_placeholders() {
        let snapshot = tripwatch_monitor::BoardSnapshot::default();
        let vm = TripViewModel::build(
            &snapshot,
            &tripwatch_query::TripQuery::default(),
            1,
            10,
            Timestamp::now(),
        );
        let text = board(&vm);
        assert!(text.contains("(no trips match)"));
        assert!(text.contains("page 1 of 1 (0 trips)  [1]"));
        assert!(text.ends_with("not loaded yet\n"));
    }

    #[test]
    fn pager_marks_current_page() {
        let text = history(&[], &Pagination::new(95, 10, 4));
        assert!(text.contains("page 4 of 10 (95 trips)  2 3 [4] 5 6"));
    }
}
