use std::fmt;
use std::future::Future;

use async_trait::async_trait;
use futures::future::{BoxFuture, FutureExt, Shared};

/// Errors that can occur while fetching a page.
///
/// Cloneable because a page body is shared between every `loaded` listener,
/// and each of them may observe the same read failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// Fetcher misconfigured (bad user agent, client build failure).
    Config(String),
    /// Network-level failure (timeout, DNS, connection refused).
    Network(String),
    /// The response arrived but its body could not be read.
    Body(String),
    /// No async runtime was available to run the request on.
    Runtime(String),
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::Config(msg) => write!(f, "fetch config error: {msg}"),
            FetchError::Network(msg) => write!(f, "network error: {msg}"),
            FetchError::Body(msg) => write!(f, "body read error: {msg}"),
            FetchError::Runtime(msg) => write!(f, "runtime error: {msg}"),
        }
    }
}

impl std::error::Error for FetchError {}

/// Deferred text of a response body.
///
/// The body is read at most once; every clone awaits the same read.
#[derive(Clone)]
pub struct PageData {
    inner: Shared<BoxFuture<'static, Result<String, FetchError>>>,
}

impl PageData {
    /// A body whose text is already known.
    pub fn ready(text: impl Into<String>) -> Self {
        let text = text.into();
        Self::deferred(async move { Ok(text) })
    }

    /// A body read lazily by `future` on first await.
    pub fn deferred<F>(future: F) -> Self
    where
        F: Future<Output = Result<String, FetchError>> + Send + 'static,
    {
        Self {
            inner: future.boxed().shared(),
        }
    }

    /// Resolves the body text.
    pub async fn text(&self) -> Result<String, FetchError> {
        self.inner.clone().await
    }
}

impl fmt::Debug for PageData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PageData")
            .field("resolved", &self.inner.peek().is_some())
            .finish()
    }
}

/// A settled page request.
#[derive(Debug, Clone)]
pub struct PageResponse {
    /// Final URL after redirects.
    pub url: String,
    pub status: u16,
    pub page_data: PageData,
}

#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Returns the name of the fetcher.
    fn name(&self) -> &str;

    /// Fetches `url`. Any HTTP status counts as a response; only transport
    /// failures are errors.
    async fn fetch(&self, url: &str) -> Result<PageResponse, FetchError>;
}
