use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_LANGUAGE};
use std::sync::Arc;
use std::time::Duration;
use log::{info, warn, error};

use crate::error::Result;
use crate::rate_limiter::RateLimiter;

/// Anything that turns a query into raw result-page HTML.
///
/// `None` means the search failed; the failure has already been logged.
pub trait WebSearch {
    fn search(&self, query: &str) -> Option<String>;
}

/// Search through a scraping proxy: GET `{api_url}?api_key=..&url=<engine url>`.
pub struct SearchEngine {
    client: Client,
    api_url: String,
    api_key: String,
    engine_url: String,
    limiter: Arc<dyn RateLimiter>,
}

impl SearchEngine {
    pub fn new(
        api_url: impl Into<String>,
        api_key: impl Into<String>,
        engine_url: impl Into<String>,
        timeout: Duration,
        limiter: Arc<dyn RateLimiter>,
    ) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));

        let client = Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()?;

        Ok(SearchEngine {
            client,
            api_url: api_url.into(),
            api_key: api_key.into(),
            engine_url: engine_url.into(),
            limiter,
        })
    }

    /// The search-engine URL handed to the proxy for `query`.
    pub fn target_url(&self, query: &str) -> String {
        format!("{}?q={}", self.engine_url, urlencoding::encode(query))
    }
}

impl WebSearch for SearchEngine {
    fn search(&self, query: &str) -> Option<String> {
        self.limiter.acquire();

        let target = self.target_url(query);
        info!("Performing search for: '{}'", query);

        let request = self
            .client
            .get(&self.api_url)
            .query(&[("api_key", self.api_key.as_str()), ("url", target.as_str())]);

        match request.send() {
            Ok(resp) => {
                if !resp.status().is_success() {
                    warn!("Search failed with status: {}", resp.status());
                    return None;
                }

                match resp.text() {
                    Ok(html) => Some(html),
                    Err(e) => {
                        error!("Failed to read search response: {}", e);
                        None
                    }
                }
            }
            Err(e) if e.is_timeout() => {
                warn!("Search for '{}' timed out: {}", query, e);
                None
            }
            Err(e) => {
                error!("Error during web search: {}", e);
                None
            }
        }
    }
}
