//! # tmt-gen
//!
//! Medal time generator for trackmania.exchange tracks.
//!
//! Finds an author's tracks by name prefix, pulls each track's author time
//! and leaderboard from trackmania.io, and computes a blended medal time.
//!
//! # Modules
//! - **http** - Gateway trait and the reqwest implementation
//! - **discovery** - Map search with legacy fallbacks
//! - **leaderboard** - trackmania.io leaderboard, TMX replay diagnostics
//! - **author_time** - Author time resolution
//! - **medal** - Medal time calculation (pure)
//! - **report** - Output records and the JSON report
//! - **pipeline** - Run orchestration

// Lets `http/mock.rs` name the crate the same way the integration tests do
#[cfg(test)]
extern crate self as tmt_gen;

pub mod author_time;
pub mod coerce;
pub mod discovery;
pub mod endpoints;
pub mod error;
pub mod http;
pub mod leaderboard;
pub mod medal;
pub mod pipeline;
pub mod report;
pub mod types;

pub use author_time::AuthorTimeResolver;
pub use discovery::MapDiscovery;
pub use endpoints::Endpoints;
pub use error::{GenError, GenResult};
pub use http::{FetchError, FetchResult, HttpGateway, ReqwestGateway};
pub use leaderboard::LeaderboardFetcher;
pub use pipeline::{MedalPipeline, PipelineOptions};
pub use report::{MapEntry, Report, ResultAssembler};
pub use types::{LeaderboardSnapshot, MedalComputation, Method, RankingSource, Record, Track};
