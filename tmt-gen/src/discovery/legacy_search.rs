//! TMX legacy map search (page numbers)
//!
//! `GET /mapsearch2/search?api=on&author=<a>&<name-param>=<prefix>&page=<n>&<size-param>=<n>`
//!
//! Responses are `{ results: [...], totalItemCount: int }`. The endpoint has
//! accepted different spellings over time, so each search tries the name
//! filter as `name`, `mapname` and `trackname` in turn and stops at the first
//! spelling that produces a match. The page-size spelling (`length` or
//! `count`) is fixed per strategy instance.

use super::{SearchQuery, SearchStrategy, MAX_PAGES};
use crate::coerce;
use crate::http::{FetchResult, HttpGateway, QueryParams};
use crate::types::Track;
use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, warn};

/// Name filter spellings, in the order they are tried
pub const NAME_PARAMS: [&str; 3] = ["name", "mapname", "trackname"];

/// Legacy search strategy
pub struct LegacySearch {
    url: String,
    page_size_param: &'static str,
}

impl LegacySearch {
    /// # Arguments
    /// * `url` - Legacy search endpoint
    /// * `page_size_param` - Page size parameter spelling (`length` or `count`)
    pub fn new(url: impl Into<String>, page_size_param: &'static str) -> Self {
        Self {
            url: url.into(),
            page_size_param,
        }
    }

    fn page_params(&self, query: &SearchQuery, name_param: &str, page: usize) -> QueryParams {
        vec![
            ("api".to_string(), "on".to_string()),
            ("author".to_string(), query.author.clone()),
            (name_param.to_string(), query.prefix.clone()),
            ("page".to_string(), page.to_string()),
            (self.page_size_param.to_string(), query.page_size.to_string()),
        ]
    }

    /// Page through results for one name spelling, keeping matches
    async fn search_with(
        &self,
        gateway: &dyn HttpGateway,
        query: &SearchQuery,
        name_param: &str,
    ) -> FetchResult<Vec<Track>> {
        let mut matched = Vec::new();

        for page in 1..=MAX_PAGES {
            let body = gateway
                .get_json(&self.url, &self.page_params(query, name_param, page))
                .await?;

            let results = coerce::items(&body, &["results"]);
            if results.is_empty() {
                break;
            }

            matched.extend(
                results
                    .iter()
                    .filter(|item| legacy_item_matches(item, query))
                    .filter_map(Track::from_search_item),
            );

            let total = body.get("totalItemCount").and_then(Value::as_i64);
            if let Some(total) = total {
                if matched.len() as i64 >= total {
                    break;
                }
            }

            if page == MAX_PAGES {
                warn!(
                    name_param,
                    pages = MAX_PAGES,
                    "Legacy search page cap reached, results may be incomplete"
                );
            }
        }

        debug!(
            name_param,
            size_param = self.page_size_param,
            matched = matched.len(),
            "Legacy search finished"
        );
        Ok(matched)
    }
}

/// Legacy items need a non-empty `Name` and `Username`; only the uploader counts
fn legacy_item_matches(item: &Value, query: &SearchQuery) -> bool {
    let Some(obj) = item.as_object() else {
        return false;
    };
    match (coerce::str_field(obj, "Name"), coerce::str_field(obj, "Username")) {
        (Some(name), Some(username)) => query.name_matches(name) && query.author_matches(username),
        _ => false,
    }
}

#[async_trait]
impl SearchStrategy for LegacySearch {
    fn name(&self) -> &'static str {
        match self.page_size_param {
            "length" => "tmx-legacy-length",
            "count" => "tmx-legacy-count",
            _ => "tmx-legacy",
        }
    }

    async fn search(
        &self,
        gateway: &dyn HttpGateway,
        query: &SearchQuery,
    ) -> FetchResult<Vec<Track>> {
        for name_param in NAME_PARAMS {
            let matched = self.search_with(gateway, query, name_param).await?;
            if !matched.is_empty() {
                return Ok(matched);
            }
        }
        Ok(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::mock::MockGateway;
    use serde_json::json;

    const URL: &str = "http://tmx/mapsearch2/search";

    fn query() -> SearchQuery {
        SearchQuery::new("Mapper", "Winter", 25)
    }

    #[tokio::test]
    async fn test_tries_name_spellings_in_order() {
        let gateway = MockGateway::new()
            .json(URL, &[], json!({"results": [], "totalItemCount": 0}))
            .json(
                URL,
                &[("mapname", "Winter"), ("page", "1")],
                json!({
                    "results": [{"TrackID": 5, "Name": "Winter 05", "Username": "Mapper"}],
                    "totalItemCount": 1
                }),
            );

        let tracks = LegacySearch::new(URL, "length")
            .search(&gateway, &query())
            .await
            .unwrap();
        assert_eq!(tracks.len(), 1);

        let spellings: Vec<String> = gateway
            .requests()
            .iter()
            .filter_map(|(_, params)| {
                params
                    .iter()
                    .find(|(k, _)| NAME_PARAMS.contains(&k.as_str()))
                    .map(|(k, _)| k.clone())
            })
            .collect();
        assert_eq!(spellings, vec!["name", "mapname"]);
    }

    #[tokio::test]
    async fn test_page_size_spelling() {
        let gateway = MockGateway::new().json(URL, &[], json!({"results": []}));

        LegacySearch::new(URL, "count")
            .search(&gateway, &query())
            .await
            .unwrap();

        let requests = gateway.requests();
        let (_, params) = &requests[0];
        assert!(params.contains(&("count".to_string(), "25".to_string())));
        assert!(params.contains(&("api".to_string(), "on".to_string())));
        assert!(params.contains(&("author".to_string(), "Mapper".to_string())));
        assert!(!params.iter().any(|(k, _)| k == "length"));
    }

    #[tokio::test]
    async fn test_pages_until_total_reached() {
        let page = |n: i64| {
            json!({
                "results": [{"TrackID": n, "Name": format!("Winter {}", n), "Username": "mapper"}],
                "totalItemCount": 2
            })
        };
        let gateway = MockGateway::new()
            .json(URL, &[("page", "1")], page(1))
            .json(URL, &[("page", "2")], page(2))
            .json(URL, &[("page", "3")], page(3));

        let tracks = LegacySearch::new(URL, "length")
            .search(&gateway, &query())
            .await
            .unwrap();
        assert_eq!(tracks.len(), 2);
        assert_eq!(gateway.count(URL), 2);
    }

    #[tokio::test]
    async fn test_filters_on_username_only() {
        let gateway = MockGateway::new()
            .json(
                URL,
                &[("page", "1")],
                json!({
                    "results": [
                        {"TrackID": 1, "Name": "Winter 01", "Username": "Other"},
                        {"TrackID": 2, "Name": "Winter 02"},
                        {"TrackID": 3, "Name": "Autumn", "Username": "Mapper"},
                        {"TrackID": 4, "Name": "WINTER 04", "Username": "MAPPER"}
                    ],
                    "totalItemCount": 4
                }),
            )
            .json(URL, &[("page", "2")], json!({"results": [], "totalItemCount": 4}));

        let tracks = LegacySearch::new(URL, "length")
            .search(&gateway, &query())
            .await
            .unwrap();
        let ids: Vec<_> = tracks.iter().map(|t| t.track_id.unwrap()).collect();
        assert_eq!(ids, vec![4]);
    }

    #[tokio::test]
    async fn test_error_propagates() {
        let gateway = MockGateway::new().status(URL, &[], 500);
        let result = LegacySearch::new(URL, "length").search(&gateway, &query()).await;
        assert!(result.is_err());
        assert_eq!(gateway.count(URL), 1);
    }
}
