//! Result assembly and report output
//!
//! One [`MapEntry`] per computed track, collected into a [`Report`] that is
//! written as pretty-printed JSON. Field names are the published output
//! format and must not change.

use crate::endpoints::Endpoints;
use crate::error::GenResult;
use crate::types::{MedalComputation, Method, Track};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use tracing::info;

/// `--out` value meaning standard output
pub const STDOUT_TARGET: &str = "-";

/// Which ranking source the computation used
pub const SOURCE_PREFERENCE: &str = "tmio";

/// Computed times for one track
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComputedTimes {
    #[serde(rename = "timeA_ms")]
    pub time_a_ms: Option<i64>,
    #[serde(rename = "timeB_ms")]
    pub time_b_ms: i64,
    #[serde(rename = "medalTime_ms")]
    pub medal_time_ms: i64,
    pub method: Method,
}

/// Where the numbers came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceLinks {
    pub tmx_map_url: Option<String>,
    pub tmio_leaderboard_url: String,
    pub tmio_map_url: String,
    pub api_search: String,
    pub source_preference: &'static str,
}

/// Output record for one track
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MapEntry {
    #[serde(rename = "trackId")]
    pub track_id: Option<i64>,
    pub uid: String,
    pub name: String,
    pub author: Option<String>,
    #[serde(rename = "authorTime_ms")]
    pub author_time_ms: i64,
    #[serde(rename = "wrTime_ms")]
    pub wr_time_ms: i64,
    #[serde(rename = "recordsCount")]
    pub records_count: usize,
    pub computed: ComputedTimes,
    pub source: SourceLinks,
}

/// Builds [`MapEntry`] records
#[derive(Debug, Clone)]
pub struct ResultAssembler {
    endpoints: Endpoints,
    leaderboard_length: usize,
}

impl ResultAssembler {
    /// # Arguments
    /// * `endpoints` - Base URLs used for the source links
    /// * `leaderboard_length` - TMIO `length` shown in the leaderboard link
    pub fn new(endpoints: Endpoints, leaderboard_length: usize) -> Self {
        Self {
            endpoints,
            leaderboard_length,
        }
    }

    /// Combine a track, its uid and its computation into an output record
    pub fn assemble(&self, track: &Track, uid: &str, computation: MedalComputation) -> MapEntry {
        let source = SourceLinks {
            tmx_map_url: track.track_id.map(|id| self.endpoints.tmx_map_page(id)),
            tmio_leaderboard_url: format!(
                "{}?offset=0&length={}",
                self.endpoints.tmio_leaderboard(uid),
                self.leaderboard_length
            ),
            tmio_map_url: self.endpoints.tmio_map(uid),
            api_search: self.endpoints.tmx_map_search(),
            source_preference: SOURCE_PREFERENCE,
        };

        MapEntry {
            track_id: track.track_id,
            uid: uid.to_string(),
            name: track.name.clone(),
            author: Some(track.author.clone()).filter(|a| !a.is_empty()),
            author_time_ms: computation.author_time_ms,
            wr_time_ms: computation.wr_time_ms,
            records_count: computation.records_count,
            computed: ComputedTimes {
                time_a_ms: computation.time_a_ms,
                time_b_ms: computation.time_b_ms,
                medal_time_ms: computation.medal_time_ms,
                method: computation.method,
            },
            source,
        }
    }
}

/// Report document
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    pub author: String,
    pub prefix: String,
    pub generated_at: String,
    pub maps: Vec<MapEntry>,
}

impl Report {
    /// Report stamped with the current UTC time
    pub fn new(author: impl Into<String>, prefix: impl Into<String>, maps: Vec<MapEntry>) -> Self {
        Self::generated_at(author, prefix, maps, Utc::now())
    }

    /// Report stamped with a given time
    pub fn generated_at(
        author: impl Into<String>,
        prefix: impl Into<String>,
        maps: Vec<MapEntry>,
        at: DateTime<Utc>,
    ) -> Self {
        Self {
            author: author.into(),
            prefix: prefix.into(),
            generated_at: at.to_rfc3339_opts(SecondsFormat::Micros, true),
            maps,
        }
    }
}

/// Pretty-printed JSON (2-space indent, non-ASCII kept) with a trailing newline
pub fn render(report: &Report) -> GenResult<String> {
    let mut json = serde_json::to_string_pretty(report)?;
    json.push('\n');
    Ok(json)
}

/// Write the report to stdout (`-`) or to a file
pub fn write_report(report: &Report, out: &str) -> GenResult<()> {
    let json = render(report)?;

    if out == STDOUT_TARGET {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        handle.write_all(json.as_bytes())?;
        handle.flush()?;
    } else {
        let path = Path::new(out);
        let mut writer = BufWriter::new(File::create(path)?);
        writer.write_all(json.as_bytes())?;
        writer.flush()?;
        info!(path = %path.display(), maps = report.maps.len(), "Report written");
    }

    Ok(())
}
