//! HTTP page fetcher backed by reqwest.
//!
//! Mirrors what a browser `fetch(url)` gives a navigation manager: a plain
//! GET, redirects followed, the final URL and status reported, and the body
//! left unread until somebody asks for it.

use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info, warn};
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};

use crate::fetch::{FetchError, PageData, PageFetcher, PageResponse};

pub const DEFAULT_USER_AGENT: &str = concat!("spa-nav/", env!("CARGO_PKG_VERSION"));
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Client settings for [`HttpFetcher`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOptions {
    pub user_agent: String,
    pub timeout: Duration,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(options: &FetchOptions) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("text/html,application/xhtml+xml;q=0.9,*/*;q=0.8"),
        );

        let client = reqwest::Client::builder()
            .user_agent(options.user_agent.as_str())
            .timeout(options.timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| FetchError::Config(e.to_string()))?;

        info!(
            "HTTP fetcher ready: user_agent={}, timeout={:?}",
            options.user_agent, options.timeout
        );
        Ok(Self { client })
    }

    /// Wraps an already configured client.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    fn name(&self) -> &str {
        "http"
    }

    async fn fetch(&self, url: &str) -> Result<PageResponse, FetchError> {
        debug!("GET {}", url);

        let response = self.client.get(url).send().await.map_err(|e| {
            warn!("Fetch of {} failed: {}", url, e);
            FetchError::Network(e.to_string())
        })?;

        let status = response.status().as_u16();
        let final_url = response.url().to_string();
        if final_url != url {
            debug!("{} redirected to {}", url, final_url);
        }
        debug!("Response for {}: HTTP {}", final_url, status);

        let page_data = PageData::deferred(async move {
            response
                .text()
                .await
                .map_err(|e| FetchError::Body(e.to_string()))
        });

        Ok(PageResponse {
            url: final_url,
            status,
            page_data,
        })
    }
}
