//! # tripwatch-cli: Command-Line Trip Monitoring
//!
//! Provides the `tripwatch` binary:
//!
//! - `tripwatch watch`: live board, refreshed on the configured period.
//! - `tripwatch summary`: one-shot fleet summary of active trips.
//! - `tripwatch history`: server-paged trip history.
//! - `tripwatch trip`: lifecycle commands on a local trip JSON file.
//!
//! ```bash
//! tripwatch --config tripwatch.yaml watch --status InProgress
//! tripwatch --seed demo-trips.json summary --output json
//! tripwatch trip --file TRP-0042.json deliver --stop S-3
//! ```
//!
//! Trips come from the HTTP API unless `--seed` names a JSON file, in which
//! case an in-memory source serves it.

pub mod config;
pub mod history;
pub mod render;
pub mod summary;
pub mod trip;
pub mod watch;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context as _, Result};
use clap::Args;
use serde::Deserialize;

use tripwatch_client::{HttpTripSource, InMemoryTripSource, TripSource, Warehouse};
use tripwatch_query::QueryParams;
use tripwatch_state::Trip;

use crate::config::CliConfig;
use crate::render::OutputFormat;

/// Shared state for async subcommands.
pub struct Context {
    pub config: CliConfig,
    pub source: Arc<dyn TripSource>,
    pub output: OutputFormat,
}

impl Context {
    pub fn new(config: CliConfig, seed: Option<&Path>, output: OutputFormat) -> Result<Self> {
        let source = build_source(&config, seed)?;
        Ok(Self {
            config,
            source,
            output,
        })
    }

    /// Print a serializable value as JSON, or the given text for tables.
    pub fn emit<T: serde::Serialize>(&self, value: &T, table: impl FnOnce() -> String) -> Result<()> {
        match self.output {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
            OutputFormat::Table => print!("{}", table()),
        }
        Ok(())
    }
}

/// Filter flags shared by the view subcommands. Each one overrides the
/// matching `view` key of the config file.
#[derive(Args, Debug, Clone, Default)]
pub struct FilterArgs {
    /// Free-text search over dispatcher, vehicle and trip id.
    #[arg(long)]
    pub search: Option<String>,
    /// Trip status (Created, InProgress, Completed, Cancelled, All).
    #[arg(long)]
    pub status: Option<String>,
    /// Departure range (today, week, month, all).
    #[arg(long)]
    pub date_range: Option<String>,
    /// Warehouse id.
    #[arg(long)]
    pub warehouse: Option<String>,
    /// Sort order, e.g. `departure:desc`, `progress`, `value:asc`.
    #[arg(long)]
    pub sort: Option<String>,
}

impl FilterArgs {
    pub fn merge(&self, base: QueryParams) -> QueryParams {
        QueryParams {
            search: self.search.clone().or(base.search),
            status: self.status.clone().or(base.status),
            date_range: self.date_range.clone().or(base.date_range),
            warehouse_id: self.warehouse.clone().or(base.warehouse_id),
            sort: self.sort.clone().or(base.sort),
        }
    }
}

/// Contents of a `--seed` file.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SeedFile {
    trips: Vec<Trip>,
    warehouses: Vec<Warehouse>,
}

/// HTTP source from configuration, or an in-memory one seeded from a file.
pub fn build_source(config: &CliConfig, seed: Option<&Path>) -> Result<Arc<dyn TripSource>> {
    if let Some(path) = seed {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading seed file {}", path.display()))?;
        let seed: SeedFile = serde_json::from_str(&raw)
            .with_context(|| format!("parsing seed file {}", path.display()))?;
        for trip in &seed.trips {
            if let Err(e) = trip.check_invariants() {
                tracing::warn!("seed file: {e}");
            }
        }
        tracing::info!(trips = seed.trips.len(), path = %path.display(), "serving seeded trips");
        let source = InMemoryTripSource::new(seed.trips).with_warehouses(seed.warehouses);
        return Ok(Arc::new(source));
    }
    let source_config = config.source_config()?;
    tracing::debug!(?source_config, "using trips API");
    Ok(Arc::new(HttpTripSource::new(source_config)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_config_view() {
        let flags = FilterArgs {
            status: Some("Completed".into()),
            ..FilterArgs::default()
        };
        let base = QueryParams {
            status: Some("InProgress".into()),
            warehouse_id: Some("WH-1".into()),
            ..QueryParams::default()
        };
        let merged = flags.merge(base);
        assert_eq!(merged.status.as_deref(), Some("Completed"));
        assert_eq!(merged.warehouse_id.as_deref(), Some("WH-1"));
    }

    #[tokio::test]
    async fn seed_file_feeds_in_memory_source() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("seed.json");
        std::fs::write(
            &path,
            r#"{"trips": [{"id": "TRP-1", "warehouseId": "WH-1", "dispatcherId": "D-1",
                "vehicleId": "B 1 AA", "status": "InProgress",
                "stops": [{"id": "S-1", "storeId": "ST-1", "status": "InTransit"}]}],
               "warehouses": [{"id": "WH-1", "name": "Cikarang"}]}"#,
        )
        .unwrap();
        let source = build_source(&CliConfig::default(), Some(&path)).unwrap();
        assert_eq!(source.source_name(), "in-memory");
        assert_eq!(source.list_active_trips().await.unwrap().len(), 1);
        assert_eq!(source.lookup_warehouses().await.unwrap()[0].name, "Cikarang");
    }

    #[test]
    fn missing_seed_file_is_an_error() {
        let err = build_source(&CliConfig::default(), Some(Path::new("/nonexistent/seed.json")))
            .err()
            .unwrap();
        assert!(format!("{err:#}").contains("reading seed file"));
    }
}
