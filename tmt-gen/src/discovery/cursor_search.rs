//! TMX v2 map search (cursor pagination)
//!
//! `GET /api/maps?fields=..&name=<prefix>&count=<n>[&after=<MapId>]`
//!
//! Responses are `{ Results: [...], More: bool }`. The cursor for the next
//! page is the last item's `MapId` (older payloads: `TrackId`).

use super::{SearchQuery, SearchStrategy, MAX_PAGES};
use crate::coerce;
use crate::http::{FetchResult, HttpGateway, QueryParams};
use crate::types::Track;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashSet;
use tracing::{debug, warn};

/// Fields requested from the v2 API
pub const SEARCH_FIELDS: &str = "MapId,MapUid,Name,Uploader.Name,Medals.Author,ReplayCount";

/// Primary search strategy
pub struct CursorSearch {
    url: String,
}

impl CursorSearch {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    fn page_params(&self, query: &SearchQuery, after: Option<i64>) -> QueryParams {
        let mut params = vec![
            ("fields".to_string(), SEARCH_FIELDS.to_string()),
            ("name".to_string(), query.prefix.clone()),
            ("count".to_string(), query.page_size.to_string()),
        ];
        if let Some(after) = after {
            params.push(("after".to_string(), after.to_string()));
        }
        params
    }

    /// Fetch every page, returning the raw items in provider order
    async fn collect(&self, gateway: &dyn HttpGateway, query: &SearchQuery) -> FetchResult<Vec<Value>> {
        let mut collected = Vec::new();
        let mut after: Option<i64> = None;
        let mut seen_cursors = HashSet::new();

        for page in 1..=MAX_PAGES {
            let body = gateway
                .get_json(&self.url, &self.page_params(query, after))
                .await?;

            let results = coerce::items(&body, &["Results", "results"]);
            if results.is_empty() {
                debug!(page, "Empty page, search complete");
                break;
            }
            collected.extend(results.iter().cloned());

            let cursor = results
                .last()
                .and_then(Value::as_object)
                .and_then(|item| coerce::first_present(item, &["MapId", "TrackId"]))
                .and_then(coerce::as_i64);

            let Some(cursor) = cursor else {
                debug!(page, "No usable cursor on last item, stopping");
                break;
            };

            if !seen_cursors.insert(cursor) {
                warn!(page, cursor, "Search returned a cursor it already served, stopping");
                break;
            }
            after = Some(cursor);

            if body.get("More") == Some(&Value::Bool(false)) {
                break;
            }

            if page == MAX_PAGES {
                warn!(pages = MAX_PAGES, "Search page cap reached, results may be incomplete");
            }
        }

        Ok(collected)
    }
}

#[async_trait]
impl SearchStrategy for CursorSearch {
    fn name(&self) -> &'static str {
        "tmx-v2-cursor"
    }

    async fn search(
        &self,
        gateway: &dyn HttpGateway,
        query: &SearchQuery,
    ) -> FetchResult<Vec<Track>> {
        let collected = self.collect(gateway, query).await?;
        let total = collected.len();

        let tracks: Vec<Track> = collected
            .iter()
            .filter_map(Track::from_search_item)
            .filter(|track| query.track_matches(track))
            .collect();

        debug!(fetched = total, matched = tracks.len(), "Filtered v2 search results");
        Ok(tracks)
    }
}
