//! # History Facility
//!
//! The navigable-history collaborator the manager drives: the current
//! location, push/replace of a state object plus URL, and the pop-state
//! notification fired when the user traverses the stack.
//!
//! [`MemoryHistory`] is the in-process implementation used by the terminal
//! host and by tests.
//!
//! ```text
//! entries:  [ /  ][ /a ][ /b ]
//!                    ▲
//!                  index        back() → index-1, forward() → index+1
//!                               push_state() drops everything after index
//! ```

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use log::debug;
use reqwest::Url;
use serde_json::{Map, Value};

/// Application-defined state attached to a history entry.
pub type HistoryState = Map<String, Value>;

/// State for a manager-initiated entry: `{"href": href}`.
pub fn href_state(href: &str) -> HistoryState {
    let mut state = HistoryState::new();
    state.insert("href".to_string(), Value::String(href.to_string()));
    state
}

/// State for the synthetic entry written at bootstrap.
pub fn first_state(href: &str) -> HistoryState {
    let mut state = href_state(href);
    state.insert("isFirstState".to_string(), Value::Bool(true));
    state
}

// ============================================================================
// Location
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationError {
    pub input: String,
    pub reason: String,
}

impl fmt::Display for LocationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid location '{}': {}", self.input, self.reason)
    }
}

impl std::error::Error for LocationError {}

/// The parts of the current location the manager compares against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub href: String,
    /// Scheme with its trailing colon, e.g. `https:`.
    pub protocol: String,
    pub hostname: String,
    /// Empty when the port is the scheme's default.
    pub port: String,
    pub pathname: String,
}

impl Location {
    pub fn parse(href: &str) -> Result<Self, LocationError> {
        let url = Url::parse(href).map_err(|e| LocationError {
            input: href.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self::from_url(&url))
    }

    pub fn from_url(url: &Url) -> Self {
        Self {
            href: url.to_string(),
            protocol: format!("{}:", url.scheme()),
            hostname: url.host_str().unwrap_or_default().to_string(),
            port: url.port().map(|p| p.to_string()).unwrap_or_default(),
            pathname: url.path().to_string(),
        }
    }

    /// `protocol//hostname[:port]`
    pub fn origin(&self) -> String {
        let mut origin = format!("{}//{}", self.protocol, self.hostname);
        if !self.port.is_empty() {
            origin.push(':');
            origin.push_str(&self.port);
        }
        origin
    }
}

// ============================================================================
// Pop-state notification
// ============================================================================

/// Fired when the user moves through history. Cancelable by listeners.
#[derive(Debug, Default)]
pub struct PopStateEvent {
    state: Option<HistoryState>,
    default_prevented: Cell<bool>,
}

impl PopStateEvent {
    pub fn new(state: Option<HistoryState>) -> Self {
        Self {
            state,
            default_prevented: Cell::new(false),
        }
    }

    pub fn state(&self) -> Option<&HistoryState> {
        self.state.as_ref()
    }

    /// The `href` recorded in the restored state, if any.
    pub fn href(&self) -> Option<&str> {
        self.state
            .as_ref()
            .and_then(|state| state.get("href"))
            .and_then(Value::as_str)
    }

    pub fn prevent_default(&self) {
        self.default_prevented.set(true);
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented.get()
    }
}

// ============================================================================
// History trait
// ============================================================================

pub trait History {
    fn location(&self) -> Location;

    /// State object of the current entry.
    fn state(&self) -> Option<HistoryState>;

    fn push_state(&mut self, state: HistoryState, url: &str);

    fn replace_state(&mut self, state: HistoryState, url: &str);
}

// ============================================================================
// MemoryHistory
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub location: Location,
    pub state: Option<HistoryState>,
}

#[derive(Debug)]
struct Stack {
    entries: Vec<HistoryEntry>,
    index: usize,
}

/// An in-memory history stack.
///
/// Cloning yields another handle onto the same stack, so the host can keep
/// one for back/forward while the manager owns another.
#[derive(Debug, Clone)]
pub struct MemoryHistory {
    stack: Rc<RefCell<Stack>>,
}

impl MemoryHistory {
    /// Starts a stack with a single stateless entry at `href`.
    pub fn new(href: &str) -> Result<Self, LocationError> {
        let location = Location::parse(href)?;
        Ok(Self {
            stack: Rc::new(RefCell::new(Stack {
                entries: vec![HistoryEntry {
                    location,
                    state: None,
                }],
                index: 0,
            })),
        })
    }

    pub fn len(&self) -> usize {
        self.stack.borrow().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn index(&self) -> usize {
        self.stack.borrow().index
    }

    pub fn entries(&self) -> Vec<HistoryEntry> {
        self.stack.borrow().entries.clone()
    }

    pub fn can_go_back(&self) -> bool {
        self.index() > 0
    }

    pub fn can_go_forward(&self) -> bool {
        let stack = self.stack.borrow();
        stack.index + 1 < stack.entries.len()
    }

    pub fn back(&self) -> Option<PopStateEvent> {
        self.go(-1)
    }

    pub fn forward(&self) -> Option<PopStateEvent> {
        self.go(1)
    }

    /// Moves the cursor by `delta` entries and returns the notification the
    /// traversal fires. `None` when the target is out of range or `delta` is 0.
    pub fn go(&self, delta: isize) -> Option<PopStateEvent> {
        if delta == 0 {
            return None;
        }
        let mut stack = self.stack.borrow_mut();
        let target = stack.index.checked_add_signed(delta)?;
        let entry = stack.entries.get(target)?;
        let event = PopStateEvent::new(entry.state.clone());
        debug!("History traversal {:+} → {}", delta, entry.location.href);
        stack.index = target;
        Some(event)
    }

    /// Resolves `url` against the current entry.
    fn resolve(&self, url: &str) -> Location {
        let stack = self.stack.borrow();
        let current = &stack.entries[stack.index].location;
        Url::parse(&current.href)
            .and_then(|base| base.join(url))
            .map(|resolved| Location::from_url(&resolved))
            .unwrap_or_else(|_| current.clone())
    }
}

impl History for MemoryHistory {
    fn location(&self) -> Location {
        let stack = self.stack.borrow();
        stack.entries[stack.index].location.clone()
    }

    fn state(&self) -> Option<HistoryState> {
        let stack = self.stack.borrow();
        stack.entries[stack.index].state.clone()
    }

    fn push_state(&mut self, state: HistoryState, url: &str) {
        let location = self.resolve(url);
        let mut stack = self.stack.borrow_mut();
        let keep = stack.index + 1;
        stack.entries.truncate(keep);
        stack.entries.push(HistoryEntry {
            location,
            state: Some(state),
        });
        let last = stack.entries.len() - 1;
        stack.index = last;
    }

    fn replace_state(&mut self, state: HistoryState, url: &str) {
        let location = self.resolve(url);
        let mut stack = self.stack.borrow_mut();
        let index = stack.index;
        stack.entries[index] = HistoryEntry {
            location,
            state: Some(state),
        };
    }
}
