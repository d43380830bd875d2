//! Provider endpoints
//!
//! The two services are addressed through [`Endpoints`] so every client
//! builds its URLs from the same base pair.

/// trackmania.exchange base URL
pub const TMX_BASE_URL: &str = "https://trackmania.exchange";
/// trackmania.io base URL
pub const TMIO_BASE_URL: &str = "https://trackmania.io";

/// Base URLs for both services
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub tmx_base: String,
    pub tmio_base: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            tmx_base: TMX_BASE_URL.to_string(),
            tmio_base: TMIO_BASE_URL.to_string(),
        }
    }
}

impl Endpoints {
    /// TMX v2 map search (cursor paginated)
    pub fn tmx_map_search(&self) -> String {
        format!("{}/api/maps", self.tmx_base)
    }

    /// TMX legacy map search (page numbered)
    pub fn tmx_legacy_search(&self) -> String {
        format!("{}/mapsearch2/search", self.tmx_base)
    }

    /// TMX replays (cursor paginated, best per user)
    pub fn tmx_replays(&self) -> String {
        format!("{}/api/replays", self.tmx_base)
    }

    /// TMX legacy top replays for one map
    pub fn tmx_legacy_replays(&self, track_id: i64) -> String {
        format!("{}/api/replays/get_replays/{}", self.tmx_base, track_id)
    }

    /// Public TMX page for a map
    pub fn tmx_map_page(&self, track_id: i64) -> String {
        format!("{}/maps/{}", self.tmx_base, track_id)
    }

    /// trackmania.io leaderboard for a map uid
    pub fn tmio_leaderboard(&self, uid: &str) -> String {
        format!("{}/api/leaderboard/map/{}", self.tmio_base, uid)
    }

    /// trackmania.io map info for a map uid
    pub fn tmio_map(&self, uid: &str) -> String {
        format!("{}/api/map/{}", self.tmio_base, uid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_urls() {
        let endpoints = Endpoints::default();
        assert_eq!(endpoints.tmx_map_search(), "https://trackmania.exchange/api/maps");
        assert_eq!(
            endpoints.tmx_legacy_replays(42),
            "https://trackmania.exchange/api/replays/get_replays/42"
        );
        assert_eq!(
            endpoints.tmio_leaderboard("UID"),
            "https://trackmania.io/api/leaderboard/map/UID"
        );
        assert_eq!(endpoints.tmio_map("UID"), "https://trackmania.io/api/map/UID");
    }

    #[test]
    fn test_replay_and_page_urls() {
        let endpoints = Endpoints::default();
        assert_eq!(endpoints.tmx_replays(), "https://trackmania.exchange/api/replays");
        assert_eq!(endpoints.tmx_map_page(7), "https://trackmania.exchange/maps/7");
    }
}
