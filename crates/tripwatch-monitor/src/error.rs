//! Monitor error types.

use tripwatch_client::SourceError;
use tripwatch_state::LifecycleError;

#[derive(Debug, thiserror::Error)]
pub enum MonitorError {
    /// A lifecycle command was rejected. The board is unchanged.
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),

    #[error("trip {trip_id} is not on the board")]
    TripNotFound { trip_id: String },

    /// A history fetch failed.
    #[error(transparent)]
    Source(#[from] SourceError),

    #[error("refresh controller is already running")]
    AlreadyStarted,

    #[error("refresh controller has been torn down")]
    TornDown,
}
