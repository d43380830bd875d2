//! Author time resolution

use crate::leaderboard::TmioClient;
use crate::types::Track;
use tracing::{debug, warn};

/// Resolves the author (target) time of a track
///
/// # Priority
/// 1. trackmania.io `authorScore` for the track uid
/// 2. The time embedded in the search record (`AuthorTime`, else `Medals.Author`)
/// 3. `0`
pub struct AuthorTimeResolver {
    tmio: TmioClient,
}

impl AuthorTimeResolver {
    pub fn new(tmio: TmioClient) -> Self {
        Self { tmio }
    }

    /// Author time in milliseconds
    ///
    /// **Returns `0` when no source has a usable value.** Zero is a sentinel
    /// for "unknown", not an instant finish; the medal calculator then
    /// degrades to the WR. Zero or negative provider values count as missing,
    /// and a failed trackmania.io lookup is logged and skipped.
    pub async fn resolve(&self, track: &Track) -> i64 {
        if let Some(uid) = track.uid.as_deref() {
            match self.tmio.author_score(uid).await {
                Ok(Some(score)) if score > 0 => {
                    debug!(uid = %uid, author_time_ms = score, "Author time from TMIO");
                    return score;
                }
                Ok(_) => debug!(uid = %uid, "TMIO has no author time"),
                Err(e) => warn!(uid = %uid, error = %e, "TMIO map lookup failed"),
            }
        }

        match track.author_time_ms.filter(|t| *t > 0) {
            Some(time) => time,
            None => {
                debug!(track = %track.label(), "No author time available, using 0");
                0
            }
        }
    }
}
