//! trackmania.io client
//!
//! Two lookups keyed by map uid:
//! - `GET /api/leaderboard/map/{uid}?offset=0&length=L` → `{ tops: [{ time }] }`
//! - `GET /api/map/{uid}` → `{ authorScore }`
//!
//! The client reports errors as-is; callers decide how to degrade.

use crate::coerce;
use crate::endpoints::Endpoints;
use crate::http::{params, FetchResult, HttpGateway};
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

/// Default number of leaderboard entries requested
pub const DEFAULT_LEADERBOARD_LENGTH: usize = 20;

/// Largest `length` the leaderboard endpoint accepts
pub const MAX_LEADERBOARD_LENGTH: usize = 200;

/// trackmania.io lookups
#[derive(Clone)]
pub struct TmioClient {
    gateway: Arc<dyn HttpGateway>,
    endpoints: Endpoints,
    length: usize,
}

impl TmioClient {
    /// # Arguments
    /// * `gateway` - Shared HTTP gateway
    /// * `endpoints` - Base URLs
    /// * `length` - Leaderboard entries per lookup, clamped to [1, 200]
    pub fn new(gateway: Arc<dyn HttpGateway>, endpoints: Endpoints, length: usize) -> Self {
        Self {
            gateway,
            endpoints,
            length: clamp_length(length),
        }
    }

    /// Entries requested per leaderboard lookup
    pub fn length(&self) -> usize {
        self.length
    }

    /// Top leaderboard times for a map
    ///
    /// Entries without a numeric `time` are skipped. A body without a `tops`
    /// array yields an empty list.
    pub async fn leaderboard(&self, uid: &str) -> FetchResult<Vec<i64>> {
        let url = self.endpoints.tmio_leaderboard(uid);
        let query = params([
            ("offset", "0".to_string()),
            ("length", self.length.to_string()),
        ]);

        let body = self.gateway.get_json(&url, &query).await?;
        let times = leaderboard_times(&body);

        debug!(uid = %uid, entries = times.len(), "TMIO leaderboard fetched");
        Ok(times)
    }

    /// Author medal time (`authorScore`) for a map
    ///
    /// `Ok(None)` when the field is missing or non-numeric.
    pub async fn author_score(&self, uid: &str) -> FetchResult<Option<i64>> {
        let url = self.endpoints.tmio_map(uid);
        let body = self.gateway.get_json(&url, &[]).await?;
        Ok(body.get("authorScore").and_then(coerce::as_i64))
    }
}

/// Clamp a requested leaderboard length to what the endpoint accepts
pub fn clamp_length(length: usize) -> usize {
    length.clamp(1, MAX_LEADERBOARD_LENGTH)
}

fn leaderboard_times(body: &Value) -> Vec<i64> {
    body.get("tops")
        .and_then(Value::as_array)
        .map(|tops| {
            tops.iter()
                .filter_map(|entry| entry.get("time"))
                .filter_map(coerce::as_i64)
                .collect()
        })
        .unwrap_or_default()
}
