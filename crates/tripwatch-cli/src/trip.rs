//! # Trip Subcommand
//!
//! Lifecycle commands against a single trip stored as a local JSON file.
//! Each command loads the file, applies the change through the trip state
//! machine and writes the file back only if the change succeeded.
//!
//! ## Subcommands
//!
//! - `create`: Write a new trip file in `Created`.
//! - `add-stop` / `remove-stop`: Edit the stop list before dispatch.
//! - `dispatch`: Created → InProgress, first stop goes in transit.
//! - `start`: Put a pending stop in transit.
//! - `deliver` / `fail`: Close the in-transit stop.
//! - `complete` / `cancel`: Close the trip.
//! - `show`: Print the trip and its stops.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Subcommand};

use tripwatch_core::{DispatcherId, Money, StopId, StoreId, Timestamp, TripId, VehicleId, WarehouseId};
use tripwatch_state::{StatusChange, TransitionOutcome, Trip, TripCommand, TripPlan};

use crate::render::{self, OutputFormat};

/// Arguments for the `tripwatch trip` subcommand.
#[derive(Args, Debug)]
pub struct TripArgs {
    /// Trip JSON file.
    #[arg(long)]
    pub file: PathBuf,

    /// Instant to record for the change (RFC 3339). Defaults to now.
    #[arg(long, global = true)]
    pub at: Option<String>,

    #[command(subcommand)]
    pub command: TripAction,
}

#[derive(Subcommand, Debug)]
pub enum TripAction {
    /// Create a new trip file in Created.
    Create {
        #[arg(long)]
        id: String,
        #[arg(long)]
        warehouse: String,
        #[arg(long)]
        dispatcher: String,
        /// Dispatcher display name.
        #[arg(long, default_value = "")]
        dispatcher_name: String,
        #[arg(long)]
        vehicle: String,
        /// Total order value in minor units.
        #[arg(long, default_value_t = 0)]
        value: i64,
    },

    /// Append a pending stop (Created trips only).
    AddStop {
        #[arg(long)]
        id: String,
        #[arg(long)]
        store: String,
        /// Store display name.
        #[arg(long, default_value = "")]
        name: String,
    },

    /// Remove a stop (Created trips only).
    RemoveStop {
        #[arg(long)]
        id: String,
    },

    /// Dispatch the trip (Created → InProgress).
    Dispatch,

    /// Put a pending stop in transit.
    Start {
        #[arg(long)]
        stop: String,
    },

    /// Mark the in-transit stop delivered.
    Deliver {
        #[arg(long)]
        stop: String,
    },

    /// Mark the in-transit stop failed.
    Fail {
        #[arg(long)]
        stop: String,
        #[arg(long)]
        reason: Option<String>,
    },

    /// Complete the trip (all stops must be Delivered or Failed).
    Complete,

    /// Cancel the trip (no stop may be Delivered).
    Cancel,

    /// Show the trip.
    Show,
}

/// Execute the trip subcommand.
pub fn run_trip(args: &TripArgs, output: OutputFormat) -> Result<u8> {
    let at = match &args.at {
        Some(raw) => Timestamp::parse_lenient(raw).with_context(|| format!("invalid --at value {raw:?}"))?,
        None => Timestamp::now(),
    };

    let command = match &args.command {
        TripAction::Create {
            id,
            warehouse,
            dispatcher,
            dispatcher_name,
            vehicle,
            value,
        } => {
            let plan = TripPlan {
                id: TripId::parse(id).context("invalid trip id")?,
                warehouse_id: WarehouseId::parse(warehouse).context("invalid warehouse id")?,
                dispatcher_id: DispatcherId::parse(dispatcher).context("invalid dispatcher id")?,
                dispatcher_name: dispatcher_name.clone(),
                vehicle_id: VehicleId::parse(vehicle).context("invalid vehicle id")?,
                total_value: Money::from_minor(*value),
            };
            return cmd_create(&args.file, plan);
        }
        TripAction::AddStop { id, store, name } => {
            let id = StopId::parse(id).context("invalid stop id")?;
            let store = StoreId::parse(store).context("invalid store id")?;
            return cmd_add_stop(&args.file, id, store, name);
        }
        TripAction::RemoveStop { id } => return cmd_remove_stop(&args.file, &StopId::new(id.as_str())),
        TripAction::Show => return cmd_show(&args.file, output),
        TripAction::Dispatch => TripCommand::Dispatch,
        TripAction::Complete => TripCommand::Complete,
        TripAction::Cancel => TripCommand::Cancel,
        TripAction::Start { stop } => TripCommand::StartStop {
            stop_id: StopId::new(stop.as_str()),
        },
        TripAction::Deliver { stop } => TripCommand::DeliverStop {
            stop_id: StopId::new(stop.as_str()),
        },
        TripAction::Fail { stop, reason } => TripCommand::FailStop {
            stop_id: StopId::new(stop.as_str()),
            reason: reason.clone(),
        },
    };
    cmd_apply(&args.file, command, at)
}

fn cmd_create(path: &Path, plan: TripPlan) -> Result<u8> {
    if path.exists() {
        bail!("trip file already exists: {}", path.display());
    }
    let trip = Trip::plan(plan);
    save(path, &trip)?;
    println!("OK: created trip {} in {}", trip.id, trip.status);
    Ok(0)
}

fn cmd_add_stop(path: &Path, id: StopId, store: StoreId, name: &str) -> Result<u8> {
    let mut trip = load(path)?;
    trip.add_stop(id, store, name)?;
    save(path, &trip)?;
    println!("OK: trip {} now has {} stops", trip.id, trip.stops.len());
    Ok(0)
}

fn cmd_remove_stop(path: &Path, id: &StopId) -> Result<u8> {
    let mut trip = load(path)?;
    let removed = trip.remove_stop(id)?;
    save(path, &trip)?;
    println!("OK: removed stop {} from trip {}", removed.id, trip.id);
    Ok(0)
}

fn cmd_show(path: &Path, output: OutputFormat) -> Result<u8> {
    let trip = load(path)?;
    match output {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&trip)?),
        OutputFormat::Table => print!("{}", render::trip_detail(&trip)),
    }
    Ok(0)
}

fn cmd_apply(path: &Path, command: TripCommand, at: Timestamp) -> Result<u8> {
    let mut trip = load(path)?;
    tracing::debug!(trip_id = %trip.id, ?command, "applying command");
    let outcome = trip.apply(command, at)?;
    save(path, &trip)?;
    report(&trip, &outcome);
    Ok(0)
}

fn load(path: &Path) -> Result<Trip> {
    if !path.exists() {
        bail!("trip file not found: {}", path.display());
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read trip file {}", path.display()))?;
    let trip: Trip = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse trip file {}", path.display()))?;
    trip.check_invariants()
        .with_context(|| format!("trip file {} is inconsistent", path.display()))?;
    Ok(trip)
}

fn save(path: &Path, trip: &Trip) -> Result<()> {
    let json = serde_json::to_string_pretty(trip)?;
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, json).with_context(|| format!("failed to write {}", tmp.display()))?;
    std::fs::rename(&tmp, path).with_context(|| format!("failed to replace {}", path.display()))?;
    Ok(())
}

fn report(trip: &Trip, outcome: &TransitionOutcome) {
    for change in &outcome.changes {
        match change {
            StatusChange::Trip { from, to } => println!("OK: trip {} {from} → {to}", trip.id),
            StatusChange::Stop { stop_id, from, to } => {
                println!("OK: stop {stop_id} {} → {}", from.as_str(), to.as_str())
            }
        }
    }
}
