//! Leaderboard fetching
//!
//! # Sources
//! - **tmio** - trackmania.io leaderboard keyed by map uid. The only source
//!   used for medal computation.
//! - **tmx_replays** - trackmania.exchange `/api/replays`, then the legacy
//!   `get_replays` endpoint when the first yields nothing. Diagnostics only.
//!
//! The sources differ in coverage and update latency. Results are never
//! merged: one run computes every track from the same source.

pub mod tmio;
pub mod tmx_replays;

pub use tmio::TmioClient;
pub use tmx_replays::{LegacyReplays, ReplaySearch};

use crate::coerce;
use crate::endpoints::Endpoints;
use crate::http::{FetchResult, HttpGateway};
use crate::medal::TOP_N;
use crate::types::{LeaderboardSnapshot, RankingSource};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

/// A trackmania.exchange replay source keyed by numeric track id
#[async_trait]
pub trait ReplayProvider: Send + Sync {
    /// Source tag for snapshots built from this provider
    fn source(&self) -> RankingSource;

    /// Raw replay items for a track
    async fn replays(&self, gateway: &dyn HttpGateway, track_id: i64) -> FetchResult<Vec<Value>>;
}

/// Fetches ranked times per track
pub struct LeaderboardFetcher {
    gateway: Arc<dyn HttpGateway>,
    tmio: TmioClient,
    replay_providers: Vec<Box<dyn ReplayProvider>>,
}

impl LeaderboardFetcher {
    /// # Arguments
    /// * `gateway` - Shared HTTP gateway
    /// * `endpoints` - Base URLs
    /// * `leaderboard_length` - TMIO entries per track, clamped to [1, 200]
    pub fn new(gateway: Arc<dyn HttpGateway>, endpoints: &Endpoints, leaderboard_length: usize) -> Self {
        let tmio = TmioClient::new(gateway.clone(), endpoints.clone(), leaderboard_length);
        let replay_providers: Vec<Box<dyn ReplayProvider>> = vec![
            Box::new(ReplaySearch::new(endpoints.clone())),
            Box::new(LegacyReplays::new(endpoints.clone())),
        ];

        Self {
            gateway,
            tmio,
            replay_providers,
        }
    }

    /// TMIO entries requested per track
    pub fn leaderboard_length(&self) -> usize {
        self.tmio.length()
    }

    /// Canonical snapshot for medal computation (trackmania.io only)
    ///
    /// Never fails: a lookup error is logged and yields an empty snapshot.
    pub async fn fetch_canonical(&self, uid: &str) -> LeaderboardSnapshot {
        match self.tmio.leaderboard(uid).await {
            Ok(times) => {
                LeaderboardSnapshot::from_times(RankingSource::Tmio, times, self.tmio.length())
            }
            Err(e) => {
                warn!(uid = %uid, error = %e, "TMIO leaderboard unavailable, using empty snapshot");
                LeaderboardSnapshot::empty(RankingSource::Tmio)
            }
        }
    }

    /// Diagnostic snapshot from trackmania.exchange replays
    ///
    /// Providers are tried in order; the next one runs only when the previous
    /// returned no replays. Times are taken from positions 1..=20.
    ///
    /// # Errors
    /// The first provider error
    pub async fn fetch_diagnostic(&self, track_id: i64) -> FetchResult<LeaderboardSnapshot> {
        for provider in &self.replay_providers {
            let replays = provider.replays(self.gateway.as_ref(), track_id).await?;
            if replays.is_empty() {
                debug!(track_id, source = %provider.source(), "No replays, trying next provider");
                continue;
            }

            let times = top_times_from_replays(&replays);
            return Ok(LeaderboardSnapshot::from_times(provider.source(), times, TOP_N));
        }

        Ok(LeaderboardSnapshot::empty(RankingSource::TmxReplays))
    }
}

/// `ReplayTime` of every replay ranked 1..=20
///
/// Replays with a missing or non-numeric `Position` or `ReplayTime` are
/// skipped.
pub fn top_times_from_replays(replays: &[Value]) -> Vec<i64> {
    replays
        .iter()
        .filter(|r| {
            r.get("Position")
                .and_then(coerce::as_i64)
                .is_some_and(|pos| (1..=TOP_N as i64).contains(&pos))
        })
        .filter_map(|r| r.get("ReplayTime").and_then(coerce::as_i64))
        .collect()
}
