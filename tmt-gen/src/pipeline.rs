//! Run orchestration
//!
//! ```text
//! MapDiscovery ──► tracks ──┬─► AuthorTimeResolver ─┐
//!   (sequential)            └─► LeaderboardFetcher ─┴─► medal::compute ─► ResultAssembler
//!                                 (per track, `workers` at a time)
//! ```
//!
//! Discovery errors abort the run. Everything after discovery degrades per
//! track and never fails the run. Output order is discovery order.

use crate::author_time::AuthorTimeResolver;
use crate::discovery::MapDiscovery;
use crate::endpoints::Endpoints;
use crate::error::GenResult;
use crate::http::HttpGateway;
use crate::leaderboard::{LeaderboardFetcher, TmioClient};
use crate::medal;
use crate::report::{MapEntry, Report, ResultAssembler};
use crate::types::{LeaderboardSnapshot, Track};
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use tmt_common::race_time::{format_race_time, format_race_time_opt};
use tracing::{debug, info, warn};

/// Upper bound on concurrent per-track fetches
pub const MAX_WORKERS: usize = 16;

/// Pipeline tuning
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineOptions {
    /// Discovery result cap
    pub max_maps: usize,
    /// Tracks processed concurrently, clamped to [1, 16]
    pub workers: usize,
    /// TMIO leaderboard entries per track
    pub leaderboard_length: usize,
    /// Also compute from TMX replays and log the comparison
    pub diagnose: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            max_maps: tmt_common::config::DEFAULT_MAX_MAPS,
            workers: tmt_common::config::DEFAULT_WORKERS,
            leaderboard_length: tmt_common::config::DEFAULT_LEADERBOARD_LENGTH,
            diagnose: false,
        }
    }
}

/// Discovery → per-track computation → report
pub struct MedalPipeline {
    discovery: MapDiscovery,
    resolver: AuthorTimeResolver,
    fetcher: LeaderboardFetcher,
    assembler: ResultAssembler,
    options: PipelineOptions,
}

impl MedalPipeline {
    /// Wire all components onto one gateway
    pub fn new(gateway: Arc<dyn HttpGateway>, endpoints: Endpoints, options: PipelineOptions) -> Self {
        let discovery = MapDiscovery::new(gateway.clone(), &endpoints);
        let fetcher = LeaderboardFetcher::new(gateway.clone(), &endpoints, options.leaderboard_length);
        let resolver = AuthorTimeResolver::new(TmioClient::new(
            gateway,
            endpoints.clone(),
            options.leaderboard_length,
        ));
        let assembler = ResultAssembler::new(endpoints, fetcher.leaderboard_length());

        let options = PipelineOptions {
            workers: options.workers.clamp(1, MAX_WORKERS),
            ..options
        };

        Self {
            discovery,
            resolver,
            fetcher,
            assembler,
            options,
        }
    }

    /// Effective worker count
    pub fn workers(&self) -> usize {
        self.options.workers
    }

    /// Run for one author and prefix
    ///
    /// # Errors
    /// [`crate::GenError::Discovery`] when map search fails
    pub async fn run(&self, author: &str, prefix: &str) -> GenResult<Report> {
        let tracks = self
            .discovery
            .discover(author, prefix, self.options.max_maps)
            .await?;
        let discovered = tracks.len();

        let maps: Vec<MapEntry> = stream::iter(tracks)
            .map(|track| self.process_track(track))
            .buffered(self.options.workers)
            .filter_map(|entry| async move { entry })
            .collect()
            .await;

        info!(
            author = %author,
            prefix = %prefix,
            discovered,
            computed = maps.len(),
            "Run complete"
        );
        Ok(Report::new(author, prefix, maps))
    }

    /// Compute one track; `None` when it has no uid
    async fn process_track(&self, track: Track) -> Option<MapEntry> {
        let Some(uid) = track.uid.clone() else {
            info!(track = %track.label(), "Skipping track without uid");
            return None;
        };

        let (author_time_ms, snapshot) = tokio::join!(
            self.resolver.resolve(&track),
            self.fetcher.fetch_canonical(&uid)
        );

        let computation = medal::compute(author_time_ms, &snapshot.times());
        info!(
            track = %track.label(),
            source = %snapshot.source,
            records = computation.records_count,
            author_time = %format_race_time(computation.author_time_ms),
            wr = %format_race_time(computation.wr_time_ms),
            time_a = %format_race_time_opt(computation.time_a_ms),
            medal = %format_race_time(computation.medal_time_ms),
            method = %computation.method,
            "Computed medal time"
        );

        if self.options.diagnose {
            self.diagnose(&track, author_time_ms, &snapshot, computation.medal_time_ms)
                .await;
        }

        Some(self.assembler.assemble(&track, &uid, computation))
    }

    /// Log the TMX-derived computation next to the canonical one
    async fn diagnose(
        &self,
        track: &Track,
        author_time_ms: i64,
        canonical: &LeaderboardSnapshot,
        canonical_medal_ms: i64,
    ) {
        let Some(track_id) = track.track_id else {
            debug!(track = %track.label(), "No TMX id, skipping diagnostics");
            return;
        };

        match self.fetcher.fetch_diagnostic(track_id).await {
            Ok(snapshot) => {
                let tmx = medal::compute(author_time_ms, &snapshot.times());
                info!(
                    track = %track.label(),
                    source = %snapshot.source,
                    records = tmx.records_count,
                    replay_count = ?track.replay_count,
                    first_divergence = ?snapshot.first_divergence(canonical),
                    tmx_medal = %format_race_time(tmx.medal_time_ms),
                    tmio_medal = %format_race_time(canonical_medal_ms),
                    delta_ms = tmx.medal_time_ms - canonical_medal_ms,
                    "Diagnostic comparison"
                );
            }
            Err(e) => warn!(track = %track.label(), error = %e, "TMX replay diagnostics failed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::mock::MockGateway;
    use crate::GenError;
    use serde_json::json;

    const MAPS: &str = "https://trackmania.exchange/api/maps";

    fn pipeline(gateway: MockGateway, workers: usize) -> MedalPipeline {
        MedalPipeline::new(
            Arc::new(gateway),
            Endpoints::default(),
            PipelineOptions {
                workers,
                ..PipelineOptions::default()
            },
        )
    }

    #[test]
    fn test_workers_clamped() {
        assert_eq!(pipeline(MockGateway::new(), 0).workers(), 1);
        assert_eq!(pipeline(MockGateway::new(), 8).workers(), 8);
        assert_eq!(pipeline(MockGateway::new(), 64).workers(), MAX_WORKERS);
    }

    #[tokio::test]
    async fn test_discovery_error_aborts_run() {
        let result = pipeline(MockGateway::new().status(MAPS, &[], 500), 4)
            .run("Mapper", "Winter")
            .await;
        assert!(matches!(result, Err(GenError::Discovery(_))));
    }

    #[tokio::test]
    async fn test_tmio_outage_degrades() {
        // Only the search answers; every TMIO lookup is a 404
        let gateway = MockGateway::new().json(
            MAPS,
            &[],
            json!({"Results": [
                {"MapId": 1, "MapUid": "U1", "Name": "Winter 01", "Uploader": {"Name": "Mapper"},
                 "Medals": {"Author": 60000}}
            ], "More": false}),
        );

        let report = pipeline(gateway, 2).run("Mapper", "Winter").await.unwrap();
        assert_eq!(report.maps.len(), 1);
        let entry = &report.maps[0];
        assert_eq!(entry.author_time_ms, 60000);
        assert_eq!(entry.records_count, 0);
        assert_eq!(entry.computed.medal_time_ms, 60000);
    }
}
