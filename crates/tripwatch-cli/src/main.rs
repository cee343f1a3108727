//! # tripwatch CLI entry point
//!
//! Parses command-line arguments, sets up logging and the async runtime,
//! and dispatches to subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use tripwatch_cli::config::CliConfig;
use tripwatch_cli::history::{run_history, HistoryArgs};
use tripwatch_cli::render::OutputFormat;
use tripwatch_cli::summary::{run_summary, SummaryArgs};
use tripwatch_cli::trip::{run_trip, TripArgs};
use tripwatch_cli::watch::{run_watch, WatchArgs};
use tripwatch_cli::Context;

/// tripwatch: delivery trip monitoring
///
/// Live board of in-progress delivery trips, fleet summary, paged trip
/// history, and trip lifecycle commands on local trip files.
#[derive(Parser, Debug)]
#[command(name = "tripwatch", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    log_json: bool,

    /// Path to YAML configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Serve trips from this JSON file instead of the trips API.
    #[arg(long, global = true)]
    seed: Option<PathBuf>,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Table, global = true)]
    output: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Live board of active trips, refreshed periodically.
    Watch(WatchArgs),

    /// One-shot fleet summary of active trips.
    Summary(SummaryArgs),

    /// Server-paged trip history.
    History(HistoryArgs),

    /// Lifecycle commands on a local trip file.
    Trip(TripArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.log_json);
    tracing::debug!("tripwatch CLI v{} starting", env!("CARGO_PKG_VERSION"));

    match run(cli) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}

/// `RUST_LOG` wins over `-v` when set.
fn init_tracing(verbose: u8, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| match verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    });

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn run(cli: Cli) -> Result<u8> {
    // Trip file commands need neither config nor runtime.
    if let Commands::Trip(args) = &cli.command {
        return run_trip(args, cli.output);
    }

    let config = CliConfig::load(cli.config.as_deref())?;
    let runtime = tokio::runtime::Builder::new_multi_thread().enable_all().build()?;
    runtime.block_on(async {
        let ctx = Context::new(config, cli.seed.as_deref(), cli.output)?;
        match &cli.command {
            Commands::Watch(args) => run_watch(args, &ctx).await,
            Commands::Summary(args) => run_summary(args, &ctx).await,
            Commands::History(args) => run_history(args, &ctx).await,
            Commands::Trip(args) => run_trip(args, ctx.output),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tripwatch_cli::trip::TripAction;

    #[test]
    fn cli_parse_watch_with_filters() {
        let cli = Cli::try_parse_from([
            "tripwatch",
            "watch",
            "--status",
            "InProgress",
            "--warehouse",
            "WH-1",
            "--sort",
            "progress:asc",
            "--page",
            "2",
        ])
        .unwrap();
        if let Commands::Watch(args) = cli.command {
            assert_eq!(args.filter.status.as_deref(), Some("InProgress"));
            assert_eq!(args.filter.warehouse.as_deref(), Some("WH-1"));
            assert_eq!(args.filter.sort.as_deref(), Some("progress:asc"));
            assert_eq!(args.page, 2);
            assert!(!args.once);
        } else {
            panic!("expected watch");
        }
    }

    #[test]
    fn cli_parse_watch_once() {
        let cli = Cli::try_parse_from(["tripwatch", "watch", "--once"]).unwrap();
        if let Commands::Watch(args) = cli.command {
            assert!(args.once);
            assert_eq!(args.page, 1);
            assert!(args.refreshes.is_none());
        } else {
            panic!("expected watch");
        }
    }

    #[test]
    fn cli_parse_summary_json_output() {
        let cli = Cli::try_parse_from(["tripwatch", "summary", "--output", "json", "--date-range", "today"])
            .unwrap();
        assert_eq!(cli.output, OutputFormat::Json);
        if let Commands::Summary(args) = cli.command {
            assert_eq!(args.filter.date_range.as_deref(), Some("today"));
        } else {
            panic!("expected summary");
        }
    }

    #[test]
    fn cli_parse_history_paging() {
        let cli = Cli::try_parse_from(["tripwatch", "history", "--page", "4", "--page-size", "25"]).unwrap();
        if let Commands::History(args) = cli.command {
            assert_eq!(args.page, 4);
            assert_eq!(args.page_size, Some(25));
        } else {
            panic!("expected history");
        }
    }

    #[test]
    fn cli_parse_trip_fail_with_reason() {
        let cli = Cli::try_parse_from([
            "tripwatch",
            "trip",
            "--file",
            "TRP-1.json",
            "fail",
            "--stop",
            "S-3",
            "--reason",
            "store closed",
        ])
        .unwrap();
        if let Commands::Trip(args) = cli.command {
            assert_eq!(args.file, PathBuf::from("TRP-1.json"));
            match args.command {
                TripAction::Fail { stop, reason } => {
                    assert_eq!(stop, "S-3");
                    assert_eq!(reason.as_deref(), Some("store closed"));
                }
                other => panic!("unexpected action {other:?}"),
            }
        } else {
            panic!("expected trip");
        }
    }

    #[test]
    fn cli_parse_trip_create_and_at() {
        let cli = Cli::try_parse_from([
            "tripwatch",
            "trip",
            "--file",
            "t.json",
            "create",
            "--id",
            "TRP-9",
            "--warehouse",
            "WH-1",
            "--dispatcher",
            "D-1",
            "--vehicle",
            "B 1 AA",
            "--at",
            "2026-03-02T08:00:00Z",
        ])
        .unwrap();
        if let Commands::Trip(args) = cli.command {
            assert_eq!(args.at.as_deref(), Some("2026-03-02T08:00:00Z"));
            assert!(matches!(args.command, TripAction::Create { value: 0, .. }));
        } else {
            panic!("expected trip");
        }
    }

    #[test]
    fn cli_parse_verbose_levels() {
        let cli0 = Cli::try_parse_from(["tripwatch", "summary"]).unwrap();
        assert_eq!(cli0.verbose, 0);

        let cli2 = Cli::try_parse_from(["tripwatch", "-vv", "summary"]).unwrap();
        assert_eq!(cli2.verbose, 2);
    }

    #[test]
    fn cli_parse_global_options() {
        let cli = Cli::try_parse_from([
            "tripwatch",
            "summary",
            "--config",
            "tripwatch.yaml",
            "--seed",
            "trips.json",
            "--log-json",
        ])
        .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("tripwatch.yaml")));
        assert_eq!(cli.seed, Some(PathBuf::from("trips.json")));
        assert!(cli.log_json);
    }

    #[test]
    fn cli_parse_invalid_output_errors() {
        assert!(Cli::try_parse_from(["tripwatch", "--output", "xml", "summary"]).is_err());
    }

    #[test]
    fn cli_parse_no_subcommand_errors() {
        assert!(Cli::try_parse_from(["tripwatch"]).is_err());
    }
}
