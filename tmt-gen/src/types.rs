//! Core types shared across discovery, ranking and computation
//!
//! # Data flow
//! - [`Track`] is produced by discovery and never modified afterwards
//! - [`LeaderboardSnapshot`] holds the ranked times for one track from one source
//! - [`MedalComputation`] is produced fresh per track by the calculator

use crate::coerce;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt;

// ============================================================================
// Track
// ============================================================================

/// A track returned by map search
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    /// TMX numeric identifier (`MapId`, older `TrackID`/`TrackId`)
    pub track_id: Option<i64>,
    /// Game-wide unique identifier (`MapUid`, older `TrackUID`)
    pub uid: Option<String>,
    /// Display name
    pub name: String,
    /// Uploader name (`Username`, or `Uploader.Name` on the v2 API)
    pub author: String,
    /// Co-author names listed under `Authors`
    pub co_authors: Vec<String>,
    /// Author medal time embedded in the search record
    ///
    /// Read from `AuthorTime` when that field is present, else from
    /// `Medals.Author`. A present but non-numeric value gives `None`.
    pub author_time_ms: Option<i64>,
    /// Replay count reported by the search API
    pub replay_count: Option<i64>,
}

impl Track {
    /// Build a track from a search result item
    ///
    /// Returns `None` when the item is not a JSON object.
    pub fn from_search_item(item: &Value) -> Option<Self> {
        let obj = item.as_object()?;

        let track_id = coerce::first_present(obj, &["MapId", "TrackID", "TrackId"])
            .and_then(coerce::as_i64);

        let uid = coerce::first_present(obj, &["MapUid", "TrackUID"])
            .and_then(Value::as_str)
            .map(str::to_string);

        let name = coerce::first_present(obj, &["Name", "TrackName"])
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        let author = coerce::str_field(obj, "Username")
            .or_else(|| coerce::nested_str(obj, "Uploader", "Name"))
            .unwrap_or_default()
            .to_string();

        Some(Self {
            track_id,
            uid,
            name,
            author,
            co_authors: co_author_names(obj),
            author_time_ms: embedded_author_time(obj),
            replay_count: coerce::int_field(obj, "ReplayCount"),
        })
    }

    /// Label for log lines
    pub fn label(&self) -> String {
        match self.track_id {
            Some(id) => format!("{} ({})", self.name, id),
            None => self.name.clone(),
        }
    }
}

/// Names listed in `Authors`, each either `{User: {Name}}` or `{Name}`
pub(crate) fn co_author_names(obj: &Map<String, Value>) -> Vec<String> {
    let Some(authors) = obj.get("Authors").and_then(Value::as_array) else {
        return Vec::new();
    };

    authors
        .iter()
        .filter_map(Value::as_object)
        .filter_map(|a| match a.get("User") {
            Some(Value::Object(user)) => user.get("Name").and_then(Value::as_str),
            _ => a.get("Name").and_then(Value::as_str),
        })
        .map(str::to_string)
        .collect()
}

/// `AuthorTime` (legacy) when present, else `Medals.Author`
fn embedded_author_time(obj: &Map<String, Value>) -> Option<i64> {
    match obj.get("AuthorTime") {
        Some(value) if !value.is_null() => coerce::as_i64(value),
        _ => obj
            .get("Medals")
            .and_then(Value::as_object)
            .and_then(|medals| medals.get("Author"))
            .and_then(coerce::as_i64),
    }
}

// ============================================================================
// Leaderboard
// ============================================================================

/// Provider a snapshot was taken from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankingSource {
    /// trackmania.exchange `/api/replays` (best per user)
    TmxReplays,
    /// trackmania.exchange legacy `get_replays`
    TmxLegacyReplays,
    /// trackmania.io leaderboard
    Tmio,
}

impl RankingSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            RankingSource::TmxReplays => "tmx",
            RankingSource::TmxLegacyReplays => "tmx-legacy",
            RankingSource::Tmio => "tmio",
        }
    }
}

impl fmt::Display for RankingSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single ranked completion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Record {
    /// 1-indexed rank
    pub position: u32,
    /// Completion time (ms)
    pub time_ms: i64,
}

/// Ranked times for one track from one source, ascending by time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaderboardSnapshot {
    pub source: RankingSource,
    records: Vec<Record>,
}

impl LeaderboardSnapshot {
    /// Empty snapshot
    pub fn empty(source: RankingSource) -> Self {
        Self {
            source,
            records: Vec::new(),
        }
    }

    /// Build from raw times: negatives dropped, sorted ascending, capped
    pub fn from_times(source: RankingSource, mut times: Vec<i64>, cap: usize) -> Self {
        times.retain(|t| *t >= 0);
        times.sort_unstable();
        times.truncate(cap);

        let records = times
            .into_iter()
            .enumerate()
            .map(|(i, time_ms)| Record {
                position: i as u32 + 1,
                time_ms,
            })
            .collect();

        Self { source, records }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn times(&self) -> Vec<i64> {
        self.records.iter().map(|r| r.time_ms).collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// First position where the two snapshots hold different times
    ///
    /// Only positions present in both are compared.
    pub fn first_divergence(&self, other: &LeaderboardSnapshot) -> Option<u32> {
        self.records
            .iter()
            .zip(&other.records)
            .find(|(ours, theirs)| ours.time_ms != theirs.time_ms)
            .map(|(ours, _)| ours.position)
    }
}

// ============================================================================
// Computation output
// ============================================================================

/// How a medal time was derived
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Method {
    /// Fewer than 20 ranked times: blend only
    TimeB,
    /// 20 or more ranked times: lower of weighted average and blend
    MinTimeATimeB,
    /// Computation failed; zero-filled result
    Error(String),
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Method::TimeB => f.write_str("Time_B"),
            Method::MinTimeATimeB => f.write_str("min(Time_A,Time_B)"),
            Method::Error(msg) => write!(f, "Error: {}", msg),
        }
    }
}

impl Serialize for Method {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Result of the medal time calculation for one track
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MedalComputation {
    #[serde(rename = "authorTime_ms")]
    pub author_time_ms: i64,
    #[serde(rename = "wrTime_ms")]
    pub wr_time_ms: i64,
    #[serde(rename = "recordsCount")]
    pub records_count: usize,
    #[serde(rename = "timeA_ms")]
    pub time_a_ms: Option<i64>,
    #[serde(rename = "timeB_ms")]
    pub time_b_ms: i64,
    #[serde(rename = "medalTime_ms")]
    pub medal_time_ms: i64,
    pub method: Method,
}

impl MedalComputation {
    /// Zero-filled result tagged with the failure
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            author_time_ms: 0,
            wr_time_ms: 0,
            records_count: 0,
            time_a_ms: None,
            time_b_ms: 0,
            medal_time_ms: 0,
            method: Method::Error(message.into()),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self.method, Method::Error(_))
    }
}
