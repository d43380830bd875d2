//! HTTP gateway shared by every provider client
//!
//! All fetch logic talks to the network through the [`HttpGateway`] trait so
//! it can be exercised against scripted fakes. [`ReqwestGateway`] is the
//! production implementation:
//! - User-Agent header on every request (both map services ask for one)
//! - Fixed per-request timeout, no automatic retry
//! - Non-2xx status is an error
//! - One client-side rate limiter shared by all concurrent callers

use async_trait::async_trait;
use governor::{Quota, RateLimiter};
use reqwest::Client;
use serde_json::Value;
use std::num::NonZeroU32;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Query string parameters, in request order
pub type QueryParams = Vec<(String, String)>;

/// Build query parameters from string pairs
pub fn params<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> QueryParams
where
    K: Into<String>,
    V: Into<String>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

/// Gateway errors
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out: {url}")]
    Timeout { url: String },

    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Client configuration error: {0}")]
    Config(String),
}

/// Result type for gateway operations
pub type FetchResult<T> = Result<T, FetchError>;

/// Issues GET requests and returns parsed JSON bodies
#[async_trait]
pub trait HttpGateway: Send + Sync {
    /// GET `url` with `params` appended as a query string
    ///
    /// # Errors
    /// - Transport failure or timeout
    /// - Non-success status
    /// - Body is not valid JSON
    async fn get_json(&self, url: &str, params: &[(String, String)]) -> FetchResult<Value>;
}

type DirectRateLimiter = RateLimiter<
    governor::state::direct::NotKeyed,
    governor::state::InMemoryState,
    governor::clock::DefaultClock,
>;

/// reqwest-backed gateway with User-Agent, timeout and rate limiting
pub struct ReqwestGateway {
    /// HTTP client with configured timeout and User-Agent
    client: Client,
    /// User-Agent string sent with every request
    user_agent: String,
    /// Shared token bucket across all requests issued through this gateway
    rate_limiter: DirectRateLimiter,
}

impl ReqwestGateway {
    /// Default per-request timeout
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

    /// Create a gateway
    ///
    /// # Arguments
    /// * `user_agent` - Identification header value
    /// * `timeout` - Total per-request timeout
    /// * `requests_per_second` - Client-side rate limit (0 is treated as 1)
    pub fn new(
        user_agent: impl Into<String>,
        timeout: Duration,
        requests_per_second: u32,
    ) -> FetchResult<Self> {
        let user_agent = user_agent.into();

        let client = Client::builder()
            .user_agent(user_agent.clone())
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Config(e.to_string()))?;

        let per_second = NonZeroU32::new(requests_per_second).unwrap_or(NonZeroU32::MIN);
        let rate_limiter = RateLimiter::direct(Quota::per_second(per_second));

        Ok(Self {
            client,
            user_agent,
            rate_limiter,
        })
    }

    /// User-Agent sent with each request
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }
}

#[async_trait]
impl HttpGateway for ReqwestGateway {
    async fn get_json(&self, url: &str, params: &[(String, String)]) -> FetchResult<Value> {
        self.rate_limiter.until_ready().await;

        debug!(url = %url, params = ?params, "GET");

        let response = self
            .client
            .get(url)
            .query(params)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    FetchError::Timeout {
                        url: url.to_string(),
                    }
                } else {
                    FetchError::Network(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| FetchError::Parse(format!("{}: {}", url, e)))
    }
}

#[cfg(test)]
pub mod mock;
