//! # TUI Components
//!
//! Components in this directory follow two patterns:
//!
//! ### Stateless Components (Props-Based Rendering)
//!
//! - `TitleBar`: Top status bar showing the page and loading state
//!
//! ### Stateful Components (Event-Driven)
//!
//! Persistent state lives in `TuiState`; a transient wrapper borrows it for
//! one frame:
//! - `PageView` / `PageViewState`: Scrollable page body
//! - `LinkList` / `LinkListState`: Selectable list of the page's links
//!
//! Components receive external data as props (struct fields), never by
//! reaching into the navigation manager.
//!
//! ```text
//! components/
//! ├── mod.rs           (this file)
//! ├── title_bar.rs     (Top status bar)
//! ├── page_view.rs     (Scrollable page body)
//! └── link_list.rs     (Link side panel)
//! ```

mod title_bar;
pub use title_bar::{TitleBar, truncate_to_width};

pub mod link_list;
pub use link_list::{LinkList, LinkListEvent, LinkListState};
pub mod page_view;
pub use page_view::{Notice, PageView, PageViewState};
