//! Scripted gateway for tests
//!
//! Compiled into the library's unit tests and included by the integration
//! test helpers, so both share one route table implementation.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;
use tmt_gen::http::{FetchError, FetchResult, HttpGateway, QueryParams};

/// Canned response for a route
#[derive(Debug, Clone)]
pub enum Reply {
    Json(Value),
    Status(u16),
}

struct Route {
    url: String,
    params: QueryParams,
    reply: Reply,
}

/// Gateway answering from a route table
///
/// A route matches when the URL is equal and every route parameter is
/// present in the request; the match with the most parameters wins.
/// Unmatched requests answer 404. Per-URL delays reorder completions.
#[derive(Default)]
pub struct MockGateway {
    routes: Vec<Route>,
    delays: HashMap<String, Duration>,
    requests: Mutex<Vec<(String, QueryParams)>>,
}

impl MockGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(mut self, url: &str, params: &[(&str, &str)], reply: Reply) -> Self {
        self.routes.push(Route {
            url: url.to_string(),
            params: params
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            reply,
        });
        self
    }

    pub fn json(self, url: &str, params: &[(&str, &str)], body: Value) -> Self {
        self.route(url, params, Reply::Json(body))
    }

    pub fn status(self, url: &str, params: &[(&str, &str)], status: u16) -> Self {
        self.route(url, params, Reply::Status(status))
    }

    /// Delay every answer for `url`
    pub fn delay(mut self, url: &str, delay: Duration) -> Self {
        self.delays.insert(url.to_string(), delay);
        self
    }

    /// All requests seen so far, in issue order
    pub fn requests(&self) -> Vec<(String, QueryParams)> {
        self.requests.lock().unwrap().clone()
    }

    /// Number of requests made to `url`
    pub fn count(&self, url: &str) -> usize {
        self.requests().iter().filter(|(u, _)| u == url).count()
    }

    /// Number of requests whose URL starts with `prefix`
    pub fn count_prefix(&self, prefix: &str) -> usize {
        self.requests()
            .iter()
            .filter(|(u, _)| u.starts_with(prefix))
            .count()
    }
}

#[async_trait]
impl HttpGateway for MockGateway {
    async fn get_json(&self, url: &str, params: &[(String, String)]) -> FetchResult<Value> {
        self.requests
            .lock()
            .unwrap()
            .push((url.to_string(), params.to_vec()));

        if let Some(delay) = self.delays.get(url) {
            tokio::time::sleep(*delay).await;
        }

        let matched = self
            .routes
            .iter()
            .filter(|r| r.url == url && r.params.iter().all(|p| params.contains(p)))
            .max_by_key(|r| r.params.len());

        match matched.map(|r| &r.reply) {
            Some(Reply::Json(body)) => Ok(body.clone()),
            Some(Reply::Status(status)) => Err(FetchError::Status {
                status: *status,
                url: url.to_string(),
            }),
            None => Err(FetchError::Status {
                status: 404,
                url: url.to_string(),
            }),
        }
    }
}
