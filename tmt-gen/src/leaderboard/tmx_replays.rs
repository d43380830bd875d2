//! trackmania.exchange replay providers
//!
//! Both return raw replay items; [`super::top_times_from_replays`] turns them
//! into ranked times.

use super::ReplayProvider;
use crate::coerce;
use crate::discovery::MAX_PAGES;
use crate::endpoints::Endpoints;
use crate::http::{params, FetchResult, HttpGateway, QueryParams};
use crate::types::RankingSource;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashSet;
use tracing::{debug, warn};

/// Replays requested per page from `/api/replays`
pub const REPLAYS_PAGE_SIZE: usize = 200;

/// Replays requested from the legacy endpoint
pub const LEGACY_REPLAYS_AMOUNT: usize = 25;

// ============================================================================
// /api/replays (cursor paginated)
// ============================================================================

/// Best replay per user, cursor paginated on `ReplayId`
pub struct ReplaySearch {
    endpoints: Endpoints,
}

impl ReplaySearch {
    pub fn new(endpoints: Endpoints) -> Self {
        Self { endpoints }
    }

    fn page_params(track_id: i64, after: Option<i64>) -> QueryParams {
        let mut query = params([
            ("mapId", track_id.to_string()),
            ("count", REPLAYS_PAGE_SIZE.to_string()),
            ("best", "1".to_string()),
        ]);
        if let Some(after) = after {
            query.push(("after".to_string(), after.to_string()));
        }
        query
    }
}

#[async_trait]
impl ReplayProvider for ReplaySearch {
    fn source(&self) -> RankingSource {
        RankingSource::TmxReplays
    }

    async fn replays(&self, gateway: &dyn HttpGateway, track_id: i64) -> FetchResult<Vec<Value>> {
        let url = self.endpoints.tmx_replays();
        let mut collected = Vec::new();
        let mut after: Option<i64> = None;
        let mut seen_cursors = HashSet::new();

        for page in 1..=MAX_PAGES {
            let body = gateway
                .get_json(&url, &Self::page_params(track_id, after))
                .await?;

            let results = coerce::items(&body, &["Results"]);
            if results.is_empty() {
                break;
            }
            collected.extend(results.iter().cloned());

            if body.get("More") != Some(&Value::Bool(true)) {
                break;
            }

            let cursor = results
                .last()
                .and_then(|item| item.get("ReplayId"))
                .and_then(coerce::as_i64);
            let Some(cursor) = cursor else {
                debug!(track_id, page, "Replay page without usable cursor, keeping partial results");
                break;
            };

            if !seen_cursors.insert(cursor) {
                warn!(track_id, cursor, "Replay cursor repeated, stopping");
                break;
            }
            after = Some(cursor);

            if page == MAX_PAGES {
                warn!(track_id, pages = MAX_PAGES, "Replay page cap reached");
            }
        }

        debug!(track_id, replays = collected.len(), "TMX replays fetched");
        Ok(collected)
    }
}

// ============================================================================
// get_replays (legacy, single request)
// ============================================================================

/// Legacy top replays endpoint
///
/// Answers a bare JSON array; any other shape counts as no replays.
pub struct LegacyReplays {
    endpoints: Endpoints,
    amount: usize,
}

impl LegacyReplays {
    pub fn new(endpoints: Endpoints) -> Self {
        Self {
            endpoints,
            amount: LEGACY_REPLAYS_AMOUNT,
        }
    }
}

#[async_trait]
impl ReplayProvider for LegacyReplays {
    fn source(&self) -> RankingSource {
        RankingSource::TmxLegacyReplays
    }

    async fn replays(&self, gateway: &dyn HttpGateway, track_id: i64) -> FetchResult<Vec<Value>> {
        let url = self.endpoints.tmx_legacy_replays(track_id);
        let body = gateway
            .get_json(&url, &params([("amount", self.amount.to_string())]))
            .await?;

        match body {
            Value::Array(items) => Ok(items),
            _ => {
                debug!(track_id, "Legacy replays answered a non-array body");
                Ok(Vec::new())
            }
        }
    }
}
