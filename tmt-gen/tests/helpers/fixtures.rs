//! Provider payload builders

use serde_json::{json, Value};

pub const MAPS: &str = "https://trackmania.exchange/api/maps";
pub const LEGACY_SEARCH: &str = "https://trackmania.exchange/mapsearch2/search";
pub const TMX_REPLAYS: &str = "https://trackmania.exchange/api/replays";
pub const TMIO: &str = "https://trackmania.io/api";

/// v2 search item
pub fn search_item(id: i64, uid: Option<&str>, name: &str, author: &str) -> Value {
    let mut item = json!({
        "MapId": id,
        "Name": name,
        "Uploader": {"Name": author},
        "Medals": {"Author": 60_000},
        "ReplayCount": 3
    });
    if let Some(uid) = uid {
        item["MapUid"] = json!(uid);
    }
    item
}

/// Final v2 search page
pub fn search_page(items: Vec<Value>) -> Value {
    json!({"Results": items, "More": false})
}

/// trackmania.io leaderboard body
pub fn tmio_leaderboard(times: &[i64]) -> Value {
    let tops: Vec<Value> = times.iter().map(|t| json!({"time": t})).collect();
    json!({ "tops": tops })
}

/// trackmania.io map body
pub fn tmio_map(author_score: i64) -> Value {
    json!({ "authorScore": author_score })
}

pub fn leaderboard_url(uid: &str) -> String {
    format!("{}/leaderboard/map/{}", TMIO, uid)
}

pub fn map_url(uid: &str) -> String {
    format!("{}/map/{}", TMIO, uid)
}
