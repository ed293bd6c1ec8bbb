//! # Core Navigation Logic
//!
//! Everything the navigation manager needs, independent of any terminal or
//! browser front end.
//!
//! ```text
//!          host (TUI, tests)
//!     clicks |   ^ loading / loaded / popState / failed
//!  popstate  v   |
//!   +-------------------------+      +----------------+
//!   |   NavigationManager     |----->|  PageFetcher   |  (spawned task)
//!   |  (manager.rs)           |<-----|  FetchOutcome  |
//!   +-----------+-------------+      +----------------+
//!               | push / replace
//!               v
//!        History (history.rs)
//! ```
//!
//! ## Modules
//!
//! - [`manager`]: the `NavigationManager` state machine
//! - [`history`]: `History` trait, `Location`, `MemoryHistory`
//! - [`link`]: `LinkElement` and `ClickEvent`, the DOM inputs
//! - [`selector`]: compiled `links_selector`, matched with ancestors
//! - [`emitter`]: listener registry and event payloads
//! - [`config`]: settings, config file, and resolution

pub mod config;
pub mod emitter;
pub mod history;
pub mod link;
pub mod manager;
pub mod selector;

pub use config::{Settings, SettingsOverrides};
pub use emitter::{EventKind, ListenerId, LoadFailure, LoadedPage, NavEvent};
pub use history::{History, HistoryState, Location, MemoryHistory, PopStateEvent};
pub use link::{Ancestor, ClickEvent, ClickEventKind, LinkElement};
pub use manager::{FetchOutcome, NavigationManager};
pub use selector::{Selector, SelectorError};
