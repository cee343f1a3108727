//! # tripwatch-monitor: Live Trip Monitoring
//!
//! - **Controller** (`controller.rs`): [`RefreshController`] polls a
//!   [`TripSource`](tripwatch_client::TripSource) on a timer, coalesces
//!   overlapping triggers, survives fetch failures and applies lifecycle
//!   commands to the board.
//! - **Board** (`board.rs`): the owned trip collection and its snapshots.
//! - **View** (`view.rs`): [`TripViewModel`] for one page of a table.
//! - **History** (`history.rs`): server-paged [`HistoryView`].
//! - **Staleness** (`staleness.rs`): `"4m ago"` rendering.
//!
//! ## Concurrency
//!
//! The controller is the single writer of its board. Refresh replacement
//! and lifecycle commands take the same lock; readers work on an
//! `Arc`-shared snapshot and never block a refresh.

pub mod board;
pub mod controller;
pub mod error;
pub mod history;
pub mod staleness;
pub mod view;

pub use board::BoardSnapshot;
pub use controller::{
    MonitorHandle, RefreshConfig, RefreshController, RefreshEvent, RefreshOutcome,
    DEFAULT_REFRESH_PERIOD,
};
pub use error::MonitorError;
pub use history::HistoryView;
pub use staleness::{time_ago, Elapsed};
pub use view::{TripRow, TripViewModel};
