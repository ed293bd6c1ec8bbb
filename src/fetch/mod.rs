pub mod fetcher;
pub mod http;

pub use fetcher::{FetchError, PageData, PageFetcher, PageResponse};
pub use http::{FetchOptions, HttpFetcher};
