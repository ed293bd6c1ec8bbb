//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::oneshot;

use crate::core::emitter::{EventKind, LoadFailure, LoadedPage, NavEvent};
use crate::core::manager::NavigationManager;
use crate::fetch::{FetchError, PageData, PageFetcher, PageResponse};

// ============================================================================
// Fetchers
// ============================================================================

/// Answers every request at once with the same status and body (or error).
pub struct StaticFetcher {
    status: u16,
    body: String,
    error: Option<FetchError>,
    calls: AtomicUsize,
}

impl StaticFetcher {
    pub fn new(status: u16, body: &str) -> Self {
        Self {
            status,
            body: body.to_string(),
            error: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn ok(body: &str) -> Self {
        Self::new(200, body)
    }

    pub fn failing(error: FetchError) -> Self {
        Self {
            error: Some(error),
            ..Self::new(0, "")
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PageFetcher for StaticFetcher {
    fn name(&self) -> &str {
        "static"
    }

    async fn fetch(&self, url: &str) -> Result<PageResponse, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = &self.error {
            return Err(error.clone());
        }
        Ok(PageResponse {
            url: url.to_string(),
            status: self.status,
            page_data: PageData::ready(self.body.clone()),
        })
    }
}

/// Panics inside `fetch`, as a buggy fetcher would.
pub struct PanickingFetcher;

#[async_trait]
impl PageFetcher for PanickingFetcher {
    fn name(&self) -> &str {
        "panicking"
    }

    async fn fetch(&self, url: &str) -> Result<PageResponse, FetchError> {
        panic!("fetcher blew up on {url}");
    }
}

type GateMap = Arc<Mutex<HashMap<String, oneshot::Receiver<(u16, String)>>>>;

/// Holds each request until the test releases its gate.
pub struct GatedFetcher {
    gates: GateMap,
    calls: Arc<AtomicUsize>,
}

/// Test-side handle for opening gates.
pub struct Gates {
    gates: GateMap,
}

/// Releases one pending request. Dropping it fails the request.
pub struct Gate {
    tx: oneshot::Sender<(u16, String)>,
}

#[derive(Clone)]
pub struct CallCounter(Arc<AtomicUsize>);

impl CallCounter {
    pub fn get(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

impl GatedFetcher {
    pub fn new() -> (Self, Gates) {
        let gates: GateMap = Arc::new(Mutex::new(HashMap::new()));
        (
            Self {
                gates: gates.clone(),
                calls: Arc::new(AtomicUsize::new(0)),
            },
            Gates { gates },
        )
    }

    pub fn call_counter(&self) -> CallCounter {
        CallCounter(self.calls.clone())
    }
}

impl Gates {
    pub fn open(&self, url: &str) -> Gate {
        let (tx, rx) = oneshot::channel();
        self.gates.lock().unwrap().insert(url.to_string(), rx);
        Gate { tx }
    }
}

impl Gate {
    pub fn respond(self, status: u16, body: &str) {
        let _ = self.tx.send((status, body.to_string()));
    }
}

#[async_trait]
impl PageFetcher for GatedFetcher {
    fn name(&self) -> &str {
        "gated"
    }

    async fn fetch(&self, url: &str) -> Result<PageResponse, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let rx = self.gates.lock().unwrap().remove(url);
        let Some(rx) = rx else {
            return Err(FetchError::Network(format!("no gate for {url}")));
        };
        match rx.await {
            Ok((status, body)) => Ok(PageResponse {
                url: url.to_string(),
                status,
                page_data: PageData::ready(body),
            }),
            Err(_) => Err(FetchError::Network("gate closed".to_string())),
        }
    }
}

// ============================================================================
// Event recording
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Seen {
    Loading(String),
    Loaded(String),
    PopState,
    Failed(String),
}

/// Records everything a manager emits.
#[derive(Default)]
pub struct EventLog {
    seen: Rc<RefCell<Vec<Seen>>>,
    pages: Rc<RefCell<Vec<LoadedPage>>>,
    failures: Rc<RefCell<Vec<LoadFailure>>>,
}

impl EventLog {
    pub fn attach(manager: &mut NavigationManager) -> Self {
        let log = Self::default();
        for kind in [
            EventKind::Loading,
            EventKind::Loaded,
            EventKind::PopState,
            EventKind::Failed,
        ] {
            let seen = log.seen.clone();
            let pages = log.pages.clone();
            let failures = log.failures.clone();
            manager.on(kind, move |event| match event {
                NavEvent::Loading(url) => seen.borrow_mut().push(Seen::Loading(url.to_string())),
                NavEvent::Loaded(page) => {
                    seen.borrow_mut().push(Seen::Loaded(page.url.clone()));
                    pages.borrow_mut().push((*page).clone());
                }
                NavEvent::PopState(_) => seen.borrow_mut().push(Seen::PopState),
                NavEvent::Failed(failure) => {
                    seen.borrow_mut().push(Seen::Failed(failure.url.clone()));
                    failures.borrow_mut().push((*failure).clone());
                }
            });
        }
        log
    }

    pub fn is_empty(&self) -> bool {
        self.seen.borrow().is_empty()
    }

    pub fn kinds(&self) -> Vec<Seen> {
        self.seen.borrow().clone()
    }

    pub fn loading(&self) -> Vec<String> {
        self.seen
            .borrow()
            .iter()
            .filter_map(|s| match s {
                Seen::Loading(url) => Some(url.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn loaded_urls(&self) -> Vec<String> {
        self.pages.borrow().iter().map(|p| p.url.clone()).collect()
    }

    pub fn loaded_pages(&self) -> Vec<LoadedPage> {
        self.pages.borrow().clone()
    }

    pub fn failures(&self) -> Vec<LoadFailure> {
        self.failures.borrow().clone()
    }
}
