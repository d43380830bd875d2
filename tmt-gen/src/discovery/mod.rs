//! Map discovery
//!
//! Finds the tracks of one author whose name starts with a prefix.
//!
//! # Architecture
//! Discovery runs an ordered chain of [`SearchStrategy`] implementations and
//! returns the first non-empty result:
//! 1. **cursor_search** - TMX v2 `/api/maps`, cursor paginated
//! 2. **legacy_search** (`length`) - legacy `mapsearch2`, page numbered
//! 3. **legacy_search** (`count`) - same endpoint, other page-size spelling
//!
//! Only an empty result moves on to the next strategy. A request error ends
//! discovery immediately.
//!
//! Server-side filtering is advisory; every strategy applies the exact
//! client-side match itself.

pub mod cursor_search;
pub mod legacy_search;

pub use cursor_search::CursorSearch;
pub use legacy_search::LegacySearch;

use crate::endpoints::Endpoints;
use crate::http::{FetchResult, HttpGateway};
use crate::types::Track;
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Hard cap on pages fetched by any single pagination loop
pub const MAX_PAGES: usize = 200;

/// Largest page size the search APIs accept
pub const MAX_PAGE_SIZE: usize = 100;

/// Search parameters shared by all strategies
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    /// Author name, matched case-insensitively and exactly
    pub author: String,
    /// Name prefix, matched case-insensitively
    pub prefix: String,
    /// Requested page size, within [1, 100]
    pub page_size: usize,
}

impl SearchQuery {
    /// Build a query; the page size is the result cap clamped to [1, 100]
    pub fn new(author: impl Into<String>, prefix: impl Into<String>, max_results: usize) -> Self {
        Self {
            author: author.into(),
            prefix: prefix.into(),
            page_size: max_results.clamp(1, MAX_PAGE_SIZE),
        }
    }

    /// Whether `name` starts with the prefix, ignoring case
    pub fn name_matches(&self, name: &str) -> bool {
        !name.is_empty() && name.to_lowercase().starts_with(&self.prefix.to_lowercase())
    }

    /// Whether `name` equals the author, ignoring case
    pub fn author_matches(&self, name: &str) -> bool {
        name.to_lowercase() == self.author.to_lowercase()
    }

    /// Name prefix matches and the uploader or a co-author is the author
    pub fn track_matches(&self, track: &Track) -> bool {
        self.name_matches(&track.name)
            && (self.author_matches(&track.author)
                || track.co_authors.iter().any(|a| self.author_matches(a)))
    }
}

/// One way of searching for tracks
#[async_trait]
pub trait SearchStrategy: Send + Sync {
    /// Strategy name for logs
    fn name(&self) -> &'static str;

    /// Run the search and return the tracks passing the client-side filter
    ///
    /// # Errors
    /// Any gateway error; callers treat it as fatal
    async fn search(&self, gateway: &dyn HttpGateway, query: &SearchQuery)
        -> FetchResult<Vec<Track>>;
}

/// Ordered search chain
pub struct MapDiscovery {
    gateway: Arc<dyn HttpGateway>,
    strategies: Vec<Box<dyn SearchStrategy>>,
}

impl MapDiscovery {
    /// Standard chain: v2 cursor search, then legacy `length`, then legacy `count`
    pub fn new(gateway: Arc<dyn HttpGateway>, endpoints: &Endpoints) -> Self {
        let strategies: Vec<Box<dyn SearchStrategy>> = vec![
            Box::new(CursorSearch::new(endpoints.tmx_map_search())),
            Box::new(LegacySearch::new(endpoints.tmx_legacy_search(), "length")),
            Box::new(LegacySearch::new(endpoints.tmx_legacy_search(), "count")),
        ];
        Self::with_strategies(gateway, strategies)
    }

    /// Custom chain
    pub fn with_strategies(
        gateway: Arc<dyn HttpGateway>,
        strategies: Vec<Box<dyn SearchStrategy>>,
    ) -> Self {
        Self {
            gateway,
            strategies,
        }
    }

    /// Strategy names in the order they are tried
    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// Find matching tracks
    ///
    /// # Arguments
    /// * `author` - Author name (uploader or listed co-author)
    /// * `prefix` - Track name prefix
    /// * `max_results` - Result cap (at least 1); also the requested page size
    ///   (clamped to [1, 100])
    ///
    /// # Returns
    /// Matching tracks in provider order, duplicates removed, at most
    /// `max_results` long. Empty when no strategy found anything.
    ///
    /// # Errors
    /// The first gateway error from any strategy
    pub async fn discover(
        &self,
        author: &str,
        prefix: &str,
        max_results: usize,
    ) -> FetchResult<Vec<Track>> {
        if max_results == 0 {
            warn!("Result cap of 0 requested, using 1");
        }
        let max_results = max_results.max(1);
        let query = SearchQuery::new(author, prefix, max_results);

        for strategy in &self.strategies {
            debug!(strategy = strategy.name(), author = %author, prefix = %prefix, "Searching");

            let tracks = strategy.search(self.gateway.as_ref(), &query).await?;
            if tracks.is_empty() {
                info!(strategy = strategy.name(), "No matching tracks, trying next search");
                continue;
            }

            let tracks = dedup_and_cap(tracks, max_results);
            info!(
                strategy = strategy.name(),
                count = tracks.len(),
                "Discovered tracks"
            );
            return Ok(tracks);
        }

        info!(author = %author, prefix = %prefix, "No tracks found by any search");
        Ok(Vec::new())
    }
}

/// Drop repeated tracks (same id, else same uid) and apply the cap
fn dedup_and_cap(tracks: Vec<Track>, cap: usize) -> Vec<Track> {
    let mut seen_ids = HashSet::new();
    let mut seen_uids = HashSet::new();

    tracks
        .into_iter()
        .filter(|t| match (t.track_id, t.uid.as_ref()) {
            (Some(id), _) => seen_ids.insert(id),
            (None, Some(uid)) => seen_uids.insert(uid.clone()),
            (None, None) => true,
        })
        .take(cap)
        .collect()
}
