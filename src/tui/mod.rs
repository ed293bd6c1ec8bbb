//! # TUI Host
//!
//! The ratatui-specific layer. It plays the part of the host page: it owns
//! the history stack, forwards link activations and traversals to the
//! [`NavigationManager`], and swaps in the page body whenever `loaded`
//! fires.
//!
//! This is the only module that knows about ratatui and crossterm.
//!
//! ## Event Flow
//!
//! Manager listeners run inside manager calls, so they only post a
//! [`HostNotice`] on a channel. The loop drains that channel after every
//! batch of input and settled fetch, the same way background results come
//! back to it. Reading a page body is async too; a body is shown only if no
//! newer navigation started while it was being read.
//!
//! ## Redraw Strategy
//!
//! - **Loading**: draws every ~80ms so the spinner animates.
//! - **Idle**: sleeps up to 500ms, only redraws on events or terminal resize.

mod component;
mod components;
mod event;
pub mod page;
mod ui;

use log::{debug, info, warn};
use std::io::{self, stdout};
use std::sync::{Arc, mpsc};
use std::time::{Duration, Instant};

use crossterm::cursor::{Hide, Show};
use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::execute;

use crate::core::config::ResolvedConfig;
use crate::core::emitter::{EventKind, LoadFailure, LoadedPage, NavEvent};
use crate::core::history::{History, MemoryHistory};
use crate::core::link::ClickEvent;
use crate::core::manager::NavigationManager;
use crate::fetch::{FetchError, HttpFetcher};
use crate::tui::component::EventHandler;
use crate::tui::components::{LinkListEvent, LinkListState, PageViewState};
use crate::tui::event::{TuiEvent, poll_event_immediate, poll_event_timeout};
use crate::tui::page::PageDocument;

/// What manager listeners tell the loop.
#[derive(Debug)]
pub enum HostNotice {
    Loading(String),
    Loaded(LoadedPage),
    PopState(Option<String>),
    Failed(LoadFailure),
    /// A page body finished reading.
    Body {
        url: String,
        status: u16,
        body: Result<String, FetchError>,
    },
}

/// TUI-specific presentation state
pub struct TuiState {
    // Persistent component states
    pub page_view: PageViewState,
    pub link_list: LinkListState,
    pub document: Option<PageDocument>,
    /// URL in the title bar: the requested one while loading, then the final one
    pub location: String,
    /// Shown next to the location (HTTP status, errors)
    pub status_message: String,
    /// One-off message in the bottom line, cleared by the next key
    pub notice: Option<String>,
    pub error: Option<String>,
    pub is_loading: bool,
    /// URL whose body is being read; any other body that arrives is stale
    pub pending_body: Option<String>,
}

impl TuiState {
    pub fn new(location: &str) -> Self {
        Self {
            page_view: PageViewState::new(),
            link_list: LinkListState::default(),
            document: None,
            location: location.to_string(),
            status_message: String::new(),
            notice: None,
            error: None,
            is_loading: false,
            pending_body: None,
        }
    }

    pub fn show_document(&mut self, document: PageDocument) {
        self.page_view.reset();
        self.link_list.reset(document.links.len());
        self.document = Some(document);
        self.error = None;
    }

    /// Applies a notice. Returns the page whose body should be read next.
    pub fn on_notice(&mut self, notice: HostNotice) -> Option<LoadedPage> {
        match notice {
            HostNotice::Loading(url) => {
                self.is_loading = true;
                self.location = url;
                self.status_message.clear();
                self.pending_body = None;
                None
            }
            HostNotice::Loaded(page) => {
                self.is_loading = false;
                self.location = page.url.clone();
                self.pending_body = Some(page.url.clone());
                Some(page)
            }
            HostNotice::PopState(href) => {
                if let Some(href) = href {
                    debug!("History traversal to {}", href);
                }
                None
            }
            HostNotice::Failed(failure) => {
                self.is_loading = false;
                self.pending_body = None;
                self.status_message = failure.error.to_string();
                if self.document.is_none() {
                    self.error = Some(format!("Could not load {}: {}", failure.url, failure.error));
                }
                None
            }
            HostNotice::Body { url, status, body } => {
                if self.pending_body.as_deref() != Some(url.as_str()) {
                    debug!("Dropping body of {} (superseded)", url);
                    return None;
                }
                self.pending_body = None;
                match body {
                    Ok(html) => {
                        self.status_message = if status == 200 {
                            String::new()
                        } else {
                            format!("HTTP {status}")
                        };
                        self.show_document(PageDocument::parse(&html, &url));
                    }
                    Err(e) => {
                        warn!("Failed to read body of {}: {}", url, e);
                        self.status_message = e.to_string();
                    }
                }
                None
            }
        }
    }
}

struct TerminalModeGuard;

impl TerminalModeGuard {
    fn new() -> io::Result<Self> {
        execute!(stdout(), EnableMouseCapture, Hide)?;
        info!("Terminal modes enabled (mouse capture, hidden cursor)");
        Ok(Self)
    }
}

impl Drop for TerminalModeGuard {
    fn drop(&mut self) {
        let _ = execute!(stdout(), DisableMouseCapture, Show);
    }
}

/// Registers listeners that forward every manager event to the loop.
fn attach_notices(manager: &mut NavigationManager, tx: &mpsc::Sender<HostNotice>) {
    for kind in [
        EventKind::Loading,
        EventKind::Loaded,
        EventKind::PopState,
        EventKind::Failed,
    ] {
        let tx = tx.clone();
        manager.on(kind, move |event| {
            let notice = match event {
                NavEvent::Loading(url) => HostNotice::Loading(url.to_string()),
                NavEvent::Loaded(page) => HostNotice::Loaded((*page).clone()),
                NavEvent::PopState(pop) => HostNotice::PopState(pop.href().map(String::from)),
                NavEvent::Failed(failure) => HostNotice::Failed((*failure).clone()),
            };
            if tx.send(notice).is_err() {
                warn!("Failed to post {} notice: receiver dropped", kind.name());
            }
        });
    }
}

fn spawn_body_read(page: LoadedPage, tx: mpsc::Sender<HostNotice>) {
    debug!("Spawning body read for {}", page.url);
    tokio::spawn(async move {
        let body = page.page_data.text().await;
        let notice = HostNotice::Body {
            url: page.url,
            status: page.status,
            body,
        };
        if tx.send(notice).is_err() {
            warn!("Failed to send page body: receiver dropped");
        }
    });
}

/// Activates the selected link the way a click on it would.
fn follow_link(manager: &mut NavigationManager, tui: &mut TuiState, index: usize) {
    let Some(link) = tui.document.as_ref().and_then(|doc| doc.links.get(index)) else {
        return;
    };
    let event = ClickEvent::new(manager.settings().click_event, link.clone());
    if manager.handle_document_click(&event) {
        return;
    }
    let href = link
        .href()
        .unwrap_or_else(|| link.href_attribute().unwrap_or_default().to_string());
    info!("Link {} not intercepted", href);
    tui.notice = Some(format!("{href} is not handled here"));
}

pub fn run(config: ResolvedConfig) -> io::Result<()> {
    let fetcher = HttpFetcher::new(&config.fetch).map_err(|e| io::Error::other(e.to_string()))?;
    let history =
        MemoryHistory::new(&config.start_url).map_err(|e| io::Error::other(e.to_string()))?;

    let (tx, rx) = mpsc::channel();
    let mut manager = NavigationManager::new(
        Some(Box::new(history.clone())),
        Arc::new(fetcher),
        config.settings.clone(),
    );
    attach_notices(&mut manager, &tx);

    let mut tui = TuiState::new(&config.start_url);
    let start_href = history.location().href;
    manager.load_current_page(&start_href);

    let mut terminal = ratatui::init();
    let _terminal_mode_guard = TerminalModeGuard::new();

    let start_time = Instant::now();
    let mut needs_redraw = true; // Force first frame

    loop {
        if tui.is_loading {
            needs_redraw = true;
        }

        if needs_redraw {
            let spinner_frame = (start_time.elapsed().as_secs_f32() * 12.0) as usize;
            terminal.draw(|f| ui::draw_ui(f, &mut tui, spinner_frame))?;
            needs_redraw = false;
        }

        let timeout = if tui.is_loading {
            Duration::from_millis(80)
        } else {
            Duration::from_millis(500)
        };
        let first_event = poll_event_timeout(timeout);

        let mut should_quit = false;
        if first_event.is_some() {
            needs_redraw = true;
        }
        for event in first_event
            .into_iter()
            .chain(std::iter::from_fn(poll_event_immediate))
        {
            if event != TuiEvent::Resize {
                tui.notice = None;
            }
            match event {
                TuiEvent::Quit => {
                    should_quit = true;
                    break;
                }
                TuiEvent::Resize => {}
                TuiEvent::Back => match history.back() {
                    Some(pop) => manager.on_pop_state(&pop),
                    None => tui.notice = Some("No previous page".to_string()),
                },
                TuiEvent::Forward => match history.forward() {
                    Some(pop) => manager.on_pop_state(&pop),
                    None => tui.notice = Some("No next page".to_string()),
                },
                TuiEvent::Reload => {
                    let href = history.location().href;
                    manager.load_current_page(&href);
                }
                TuiEvent::ScrollUp
                | TuiEvent::ScrollDown
                | TuiEvent::ScrollPageUp
                | TuiEvent::ScrollPageDown => {
                    tui.page_view.handle_event(&event);
                }
                TuiEvent::LinkUp | TuiEvent::LinkDown | TuiEvent::Follow => {
                    if let Some(LinkListEvent::Follow(index)) = tui.link_list.handle_event(&event) {
                        follow_link(&mut manager, &mut tui, index);
                    }
                }
            }
        }

        if should_quit {
            break;
        }

        // Settled fetches, then everything the listeners posted
        if manager.drain_settled() > 0 {
            needs_redraw = true;
        }
        while let Ok(notice) = rx.try_recv() {
            needs_redraw = true;
            if let Some(page) = tui.on_notice(notice) {
                spawn_body_read(page, tx.clone());
            }
        }
    }

    info!("Exiting at {}", history.location().href);
    ratatui::restore();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::PageData;

    fn loaded(url: &str) -> LoadedPage {
        LoadedPage {
            page_data: PageData::ready(""),
            status: 200,
            url: url.to_string(),
        }
    }

    fn body(url: &str, status: u16, html: &str) -> HostNotice {
        HostNotice::Body {
            url: url.to_string(),
            status,
            body: Ok(html.to_string()),
        }
    }

    #[test]
    fn test_loading_then_loaded_then_body() {
        let mut tui = TuiState::new("https://app.test/");
        assert!(tui.on_notice(HostNotice::Loading("https://app.test/a".into())).is_none());
        assert!(tui.is_loading);
        assert_eq!(tui.location, "https://app.test/a");

        let page = tui.on_notice(HostNotice::Loaded(loaded("https://app.test/a"))).unwrap();
        assert_eq!(page.url, "https://app.test/a");
        assert!(!tui.is_loading);

        tui.on_notice(body("https://app.test/a", 200, r#"<a href="/b">b</a>"#));
        let doc = tui.document.as_ref().unwrap();
        assert_eq!(doc.links.len(), 1);
        assert_eq!(tui.link_list.selected(), Some(0));
        assert!(tui.status_message.is_empty());
    }

    #[test]
    fn test_superseded_body_is_dropped() {
        let mut tui = TuiState::new("https://app.test/");
        tui.on_notice(HostNotice::Loading("https://app.test/a".into()));
        tui.on_notice(HostNotice::Loaded(loaded("https://app.test/a")));
        tui.on_notice(HostNotice::Loading("https://app.test/b".into()));

        tui.on_notice(body("https://app.test/a", 200, "old"));
        assert!(tui.document.is_none());
        assert!(tui.is_loading);
    }

    #[test]
    fn test_non_200_status_is_shown() {
        let mut tui = TuiState::new("https://app.test/");
        tui.on_notice(HostNotice::Loaded(loaded("https://app.test/missing")));
        tui.on_notice(body("https://app.test/missing", 404, "<p>Not here</p>"));
        assert_eq!(tui.status_message, "HTTP 404");
        assert_eq!(tui.document.as_ref().unwrap().lines, vec!["Not here"]);
    }

    #[test]
    fn test_failure_without_document_sets_error() {
        let mut tui = TuiState::new("https://app.test/");
        tui.on_notice(HostNotice::Loading("https://app.test/".into()));
        tui.on_notice(HostNotice::Failed(LoadFailure {
            url: "https://app.test/".into(),
            error: FetchError::Network("connection refused".into()),
        }));
        assert!(!tui.is_loading);
        assert_eq!(tui.status_message, "network error: connection refused");
        assert!(tui.error.as_deref().unwrap().contains("connection refused"));
    }

    #[test]
    fn test_follow_link_reports_external_links() {
        use crate::core::config::Settings;
        use crate::test_support::StaticFetcher;

        let history = MemoryHistory::new("https://app.test/").unwrap();
        let mut manager = NavigationManager::new(
            Some(Box::new(history.clone())),
            Arc::new(StaticFetcher::ok("")),
            Settings::default(),
        );
        let mut tui = TuiState::new("https://app.test/");
        tui.show_document(PageDocument::parse(
            r#"<a href="https://elsewhere.test/x">out</a>"#,
            "https://app.test/",
        ));

        follow_link(&mut manager, &mut tui, 0);
        assert_eq!(
            tui.notice.as_deref(),
            Some("https://elsewhere.test/x is not handled here")
        );
        assert_eq!(history.len(), 1);
    }
}
