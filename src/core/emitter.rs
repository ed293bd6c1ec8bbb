//! # Event Emitter
//!
//! A listener registry keyed by event kind. The manager owns one and emits
//! through it; hosts subscribe with [`Emitter::on`].
//!
//! Listeners run synchronously, in registration order, on the thread that
//! emits.

use std::fmt;

use crate::core::history::PopStateEvent;
use crate::fetch::{FetchError, PageData};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Loading,
    Loaded,
    PopState,
    Failed,
}

impl EventKind {
    pub fn name(&self) -> &'static str {
        match self {
            EventKind::Loading => "loading",
            EventKind::Loaded => "loaded",
            EventKind::PopState => "popState",
            EventKind::Failed => "failed",
        }
    }
}

/// Payload of `loaded`.
#[derive(Debug, Clone)]
pub struct LoadedPage {
    pub page_data: PageData,
    pub status: u16,
    /// Final URL the response came from.
    pub url: String,
}

/// Payload of `failed`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadFailure {
    pub url: String,
    pub error: FetchError,
}

pub enum NavEvent<'a> {
    Loading(&'a str),
    Loaded(&'a LoadedPage),
    PopState(&'a PopStateEvent),
    Failed(&'a LoadFailure),
}

impl NavEvent<'_> {
    pub fn kind(&self) -> EventKind {
        match self {
            NavEvent::Loading(_) => EventKind::Loading,
            NavEvent::Loaded(_) => EventKind::Loaded,
            NavEvent::PopState(_) => EventKind::PopState,
            NavEvent::Failed(_) => EventKind::Failed,
        }
    }
}

impl fmt::Debug for NavEvent<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NavEvent::Loading(url) => f.debug_tuple("Loading").field(url).finish(),
            NavEvent::Loaded(page) => f.debug_tuple("Loaded").field(page).finish(),
            NavEvent::PopState(event) => f.debug_tuple("PopState").field(event).finish(),
            NavEvent::Failed(failure) => f.debug_tuple("Failed").field(failure).finish(),
        }
    }
}

pub type Listener = Box<dyn FnMut(&NavEvent<'_>)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

#[derive(Default)]
pub struct Emitter {
    listeners: Vec<(ListenerId, EventKind, Listener)>,
    next_id: u64,
}

impl fmt::Debug for Emitter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Emitter")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl Emitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on<F>(&mut self, kind: EventKind, listener: F) -> ListenerId
    where
        F: FnMut(&NavEvent<'_>) + 'static,
    {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, kind, Box::new(listener)));
        id
    }

    /// Removes a listener. Returns false if it was not registered.
    pub fn off(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_id, _, _)| *listener_id != id);
        self.listeners.len() != before
    }

    /// Calls every listener registered for the event's kind and returns how
    /// many ran.
    pub fn emit(&mut self, event: &NavEvent<'_>) -> usize {
        let kind = event.kind();
        let mut called = 0;
        for (_, listener_kind, listener) in self.listeners.iter_mut() {
            if *listener_kind == kind {
                listener(event);
                called += 1;
            }
        }
        called
    }

    pub fn listener_count(&self, kind: EventKind) -> usize {
        self.listeners.iter().filter(|(_, k, _)| *k == kind).count()
    }
}
