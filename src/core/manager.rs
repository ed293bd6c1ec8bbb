//! # Navigation Manager
//!
//! Turns link activations and history traversals into page loads, and
//! reports their progress as events.
//!
//! ```text
//!          load_current_page(url)          outcome for url, still current
//!   Idle ─────────────────────────▶ Loading ─────────────────────────▶ Idle (loaded | failed)
//!                                    │
//!                                    │ load_current_page(other)
//!                                    ▼
//!                              Loading(other)   outcome for url arrives → discarded
//! ```
//!
//! Fetches run on spawned tokio tasks. Each one reports back as a
//! [`FetchOutcome`] message on the manager's own channel; the host feeds
//! those into [`NavigationManager::on_page_loaded`] through
//! [`settle_next`](NavigationManager::settle_next) or
//! [`drain_settled`](NavigationManager::drain_settled). The pair
//! `current_page_url` + `is_loading` decides whether an outcome is still
//! wanted.

use std::sync::Arc;

use log::{debug, info, warn};
use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::core::config::Settings;
use crate::core::emitter::{Emitter, EventKind, ListenerId, LoadFailure, LoadedPage, NavEvent};
use crate::core::history::{History, HistoryState, PopStateEvent, first_state, href_state};
use crate::core::link::ClickEvent;
use crate::core::selector::Selector;
use crate::fetch::{FetchError, PageFetcher, PageResponse};

/// A settled fetch, addressed by the URL that was requested.
#[derive(Debug)]
pub struct FetchOutcome {
    pub url: String,
    pub result: Result<PageResponse, FetchError>,
}

pub struct NavigationManager {
    /// `None` when the host has no history facility.
    history: Option<Box<dyn History>>,
    fetcher: Arc<dyn PageFetcher>,
    settings: Settings,
    selector: Selector,
    emitter: Emitter,
    outcome_tx: UnboundedSender<FetchOutcome>,
    outcome_rx: UnboundedReceiver<FetchOutcome>,
    initialized: bool,
    loading_urls: Vec<String>,
    current_page_url: Option<String>,
    is_loading: bool,
}

impl std::fmt::Debug for NavigationManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NavigationManager")
            .field("initialized", &self.initialized)
            .field("fetcher", &self.fetcher.name())
            .field("settings", &self.settings)
            .field("loading_urls", &self.loading_urls)
            .field("current_page_url", &self.current_page_url)
            .field("is_loading", &self.is_loading)
            .finish()
    }
}

impl NavigationManager {
    /// Builds a manager. Without a history facility the manager stays
    /// uninitialized and every operation is a no-op.
    pub fn new(
        history: Option<Box<dyn History>>,
        fetcher: Arc<dyn PageFetcher>,
        settings: Settings,
    ) -> Self {
        let (outcome_tx, outcome_rx) = mpsc::unbounded_channel();
        let mut manager = Self {
            history,
            fetcher,
            selector: Selector::anchors(),
            settings,
            emitter: Emitter::new(),
            outcome_tx,
            outcome_rx,
            initialized: false,
            loading_urls: Vec::new(),
            current_page_url: None,
            is_loading: false,
        };

        if manager.history.is_none() {
            warn!("No history facility available; navigation manager disabled");
            return manager;
        }

        manager.init();
        manager
    }

    fn init(&mut self) {
        self.selector = match Selector::parse(&self.settings.links_selector) {
            Ok(selector) => selector,
            Err(e) => {
                warn!(
                    "Invalid links selector '{}' ({}); falling back to 'a'",
                    self.settings.links_selector, e
                );
                Selector::anchors()
            }
        };

        let Some(history) = self.history.as_mut() else {
            return;
        };
        let href = history.location().href;
        history.replace_state(first_state(&href), &href);

        self.initialized = true;
        info!(
            "Manager ready at {} (listen_links={}, selector='{}', click={}, fetcher={})",
            href,
            self.settings.listen_links,
            self.selector,
            self.settings.click_event.as_str(),
            self.fetcher.name()
        );
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// The selector clicks are filtered with after fallback.
    pub fn selector(&self) -> &Selector {
        &self.selector
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn current_page_url(&self) -> Option<&str> {
        self.current_page_url.as_deref()
    }

    /// URLs with a fetch in flight, oldest first.
    pub fn loading_urls(&self) -> &[String] {
        &self.loading_urls
    }

    // ========================================================================
    // Events
    // ========================================================================

    pub fn on<F>(&mut self, kind: EventKind, listener: F) -> ListenerId
    where
        F: FnMut(&NavEvent<'_>) + 'static,
    {
        self.emitter.on(kind, listener)
    }

    pub fn off(&mut self, id: ListenerId) -> bool {
        self.emitter.off(id)
    }

    // ========================================================================
    // Page loading
    // ========================================================================

    /// Makes `url` the page the manager wants and starts loading it.
    pub fn load_current_page(&mut self, url: &str) {
        if !self.initialized {
            return;
        }

        self.is_loading = true;
        self.current_page_url = Some(url.to_string());

        self.emitter.emit(&NavEvent::Loading(url));

        self.load_page(url);
    }

    /// Starts a fetch for `url` unless one is already in flight. Returns
    /// whether a fetch was started.
    pub fn load_page(&mut self, url: &str) -> bool {
        if !self.initialized {
            return false;
        }
        if self.loading_urls.iter().any(|u| u == url) {
            debug!("Already loading {}, not fetching again", url);
            return false;
        }

        self.loading_urls.push(url.to_string());

        match Handle::try_current() {
            Ok(handle) => {
                let fetcher = self.fetcher.clone();
                let tx = self.outcome_tx.clone();
                let url = url.to_string();
                debug!("Spawning fetch for {} via {}", url, fetcher.name());
                handle.spawn(async move {
                    let fetch = {
                        let url = url.clone();
                        tokio::spawn(async move { fetcher.fetch(&url).await })
                    };
                    // A panicking fetcher still settles its URL.
                    let result = match fetch.await {
                        Ok(result) => result,
                        Err(e) => {
                            warn!("Fetch task for {} ended abnormally: {}", url, e);
                            Err(FetchError::Runtime(e.to_string()))
                        }
                    };
                    if tx.send(FetchOutcome { url, result }).is_err() {
                        debug!("Fetch settled after the manager was dropped");
                    }
                });
            }
            Err(e) => {
                warn!("Cannot fetch {}: no async runtime ({})", url, e);
                self.on_page_loaded(FetchOutcome {
                    url: url.to_string(),
                    result: Err(FetchError::Runtime(e.to_string())),
                });
            }
        }
        true
    }

    /// Completion handler for a settled fetch.
    ///
    /// The outcome only counts if it is for the page still wanted and that
    /// page has not already been delivered; anything else is dropped.
    pub fn on_page_loaded(&mut self, outcome: FetchOutcome) {
        let FetchOutcome { url, result } = outcome;

        if let Some(pos) = self.loading_urls.iter().position(|u| *u == url) {
            self.loading_urls.remove(pos);
        }

        let is_current = self.is_loading && self.current_page_url.as_deref() == Some(url.as_str());
        if !is_current {
            match &result {
                Ok(response) => debug!(
                    "Discarding stale response for {} (HTTP {})",
                    url, response.status
                ),
                Err(e) => debug!("Discarding stale failure for {}: {}", url, e),
            }
            return;
        }

        self.is_loading = false;

        match result {
            Ok(response) => {
                info!("Loaded {} (HTTP {})", response.url, response.status);
                let page = LoadedPage {
                    page_data: response.page_data,
                    status: response.status,
                    url: response.url,
                };
                self.emitter.emit(&NavEvent::Loaded(&page));
            }
            Err(error) => {
                warn!("Failed to load {}: {}", url, error);
                let failure = LoadFailure { url, error };
                self.emitter.emit(&NavEvent::Failed(&failure));
            }
        }
    }

    /// Waits for the next fetch to settle and handles it. Returns false at
    /// once when nothing is in flight.
    pub async fn settle_next(&mut self) -> bool {
        if self.loading_urls.is_empty() {
            return false;
        }
        match self.outcome_rx.recv().await {
            Some(outcome) => {
                self.on_page_loaded(outcome);
                true
            }
            None => false,
        }
    }

    /// Handles every outcome that has already arrived, without waiting.
    pub fn drain_settled(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(outcome) = self.outcome_rx.try_recv() {
            self.on_page_loaded(outcome);
            handled += 1;
        }
        handled
    }

    // ========================================================================
    // History
    // ========================================================================

    /// Pushes a history entry. Does not load anything.
    pub fn push_state(&mut self, state: HistoryState, url: &str) {
        if !self.initialized {
            return;
        }
        if let Some(history) = self.history.as_mut() {
            history.push_state(state, url);
        }
    }

    /// Replaces the current entry, optionally merging `state` over the
    /// existing state (new keys win).
    pub fn replace_state(&mut self, state: HistoryState, url: &str, merge: bool) {
        if !self.initialized {
            return;
        }
        let Some(history) = self.history.as_mut() else {
            return;
        };

        let state = if merge {
            let mut merged = history.state().unwrap_or_default();
            merged.extend(state);
            merged
        } else {
            state
        };
        history.replace_state(state, url);
    }

    /// Navigates to `href` unless `pathname` is the page already shown.
    /// Returns whether a navigation was started.
    pub fn goto_href(&mut self, href: &str, pathname: &str) -> bool {
        if !self.initialized {
            return false;
        }
        let Some(history) = self.history.as_ref() else {
            return false;
        };
        if pathname == history.location().pathname {
            debug!("Already on {}, ignoring navigation to {}", pathname, href);
            return false;
        }

        self.push_state(href_state(href), href);
        self.load_current_page(href);
        true
    }

    /// True when `url` starts with the current `protocol//hostname[:port]`
    /// and the origin ends there.
    pub fn is_same_origin(&self, url: &str) -> bool {
        let Some(history) = self.history.as_ref() else {
            return false;
        };
        if url.is_empty() {
            return false;
        }
        let origin = history.location().origin();
        match url.strip_prefix(origin.as_str()) {
            Some(rest) => rest.is_empty() || rest.starts_with(['/', '?', '#']),
            None => false,
        }
    }

    // ========================================================================
    // DOM notifications
    // ========================================================================

    /// Document-level click listener: applies `listen_links`, the
    /// configured event kind and the link selector before
    /// [`on_link_click`](Self::on_link_click).
    pub fn handle_document_click(&mut self, event: &ClickEvent) -> bool {
        if !self.initialized || !self.settings.listen_links {
            return false;
        }
        if event.kind != self.settings.click_event {
            return false;
        }
        if !self.selector.matches(&event.current_target) {
            debug!(
                "<{}> does not match '{}', ignoring click",
                event.current_target.tag_name(),
                self.selector
            );
            return false;
        }
        self.on_link_click(event)
    }

    /// Intercepts a link activation when it can be served in place.
    /// Returns whether the click was intercepted.
    pub fn on_link_click(&mut self, event: &ClickEvent) -> bool {
        if !self.initialized || event.default_prevented() {
            return false;
        }

        let element = &event.current_target;
        let Some(raw) = element.href_attribute().filter(|h| !h.is_empty()) else {
            return false;
        };
        if raw.trim_start().to_ascii_lowercase().starts_with("mailto:") {
            return false;
        }
        let Some(href) = element.href() else {
            return false;
        };
        if !self.is_same_origin(&href) {
            debug!("{} is cross-origin, leaving it to the host", href);
            return false;
        }
        if element.target().is_some() {
            return false;
        }

        event.prevent_default();

        let pathname = element.pathname();
        self.goto_href(&href, &pathname);
        true
    }

    /// Handles a history traversal.
    pub fn on_pop_state(&mut self, event: &PopStateEvent) {
        if !self.initialized || event.state().is_none() {
            return;
        }

        self.emitter.emit(&NavEvent::PopState(event));

        if event.default_prevented() {
            debug!("popState prevented by a listener");
            return;
        }

        if let Some(href) = event.href() {
            self.load_current_page(href);
        }
    }
}
