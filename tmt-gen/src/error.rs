//! Error types for tmt-gen
//!
//! Only failures that end a run live here. Degraded lookups and per-track
//! computation problems are absorbed where they happen and never reach
//! this type.

use crate::http::FetchError;
use thiserror::Error;

/// Run-level error
#[derive(Debug, Error)]
pub enum GenError {
    /// Map search failed; the run is aborted
    #[error("Map discovery failed: {0}")]
    Discovery(#[from] FetchError),

    /// Writing the report failed
    #[error("Output error: {0}")]
    Output(#[from] std::io::Error),

    /// Report serialization failed
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Result type for run-level operations
pub type GenResult<T> = Result<T, GenError>;
