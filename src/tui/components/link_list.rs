//! # Link List Component
//!
//! Side panel listing the current page's links. Up/Down moves the
//! selection, Enter asks the host to follow it.
//!
//! Follows the persistent state + transient wrapper pattern:
//! - `LinkListState` lives in `TuiState`
//! - `LinkList` is created each frame with borrowed state

use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Padding};

use crate::core::link::LinkElement;
use crate::tui::component::{Component, EventHandler};
use crate::tui::components::title_bar::truncate_to_width;
use crate::tui::event::TuiEvent;

/// Persistent selection state for the link list.
#[derive(Default)]
pub struct LinkListState {
    pub len: usize,
    pub list_state: ListState,
}

impl LinkListState {
    /// Resets the selection for a page with `len` links.
    pub fn reset(&mut self, len: usize) {
        self.len = len;
        self.list_state = ListState::default();
        if len > 0 {
            self.list_state.select(Some(0));
        }
    }

    pub fn selected(&self) -> Option<usize> {
        self.list_state.selected().filter(|i| *i < self.len)
    }
}

/// Events emitted by the link list.
#[derive(Debug, PartialEq, Eq)]
pub enum LinkListEvent {
    Follow(usize),
}

impl EventHandler for LinkListState {
    type Event = LinkListEvent;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        if self.len == 0 {
            return None;
        }
        let current = self.selected().unwrap_or(0);
        match event {
            TuiEvent::LinkUp => {
                self.list_state.select(Some(current.saturating_sub(1)));
                None
            }
            TuiEvent::LinkDown => {
                self.list_state.select(Some((current + 1).min(self.len - 1)));
                None
            }
            TuiEvent::Follow => Some(LinkListEvent::Follow(current)),
            _ => None,
        }
    }
}

/// Transient render wrapper for the link list.
pub struct LinkList<'a> {
    state: &'a mut LinkListState,
    links: &'a [LinkElement],
}

impl<'a> LinkList<'a> {
    pub fn new(state: &'a mut LinkListState, links: &'a [LinkElement]) -> Self {
        Self { state, links }
    }
}

impl Component for LinkList<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .borders(Borders::LEFT)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(format!(" Links ({}) ", self.links.len()))
            .title_alignment(Alignment::Left)
            .padding(Padding::horizontal(1));

        let inner_width = area.width.saturating_sub(3) as usize;
        let selected = self.state.selected();

        let items: Vec<ListItem> = self
            .links
            .iter()
            .enumerate()
            .map(|(i, link)| {
                let label = if link.text().is_empty() {
                    link.href_attribute().unwrap_or_default()
                } else {
                    link.text()
                };
                let index = format!("[{}] ", i + 1);
                let label = truncate_to_width(label, inner_width.saturating_sub(index.len()));

                let style = if selected == Some(i) {
                    Style::default()
                        .fg(Color::White)
                        .add_modifier(Modifier::BOLD | Modifier::REVERSED)
                } else if link.target().is_some() {
                    Style::default().fg(Color::DarkGray)
                } else {
                    Style::default().fg(Color::Gray)
                };

                ListItem::new(Line::from(vec![
                    Span::styled(index, Style::default().fg(Color::Cyan)),
                    Span::styled(label, style),
                ]))
            })
            .collect();

        let list = List::new(items).block(block);
        frame.render_stateful_widget(list, area, &mut self.state.list_state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn links() -> Vec<LinkElement> {
        vec![
            LinkElement::new("a").with_attribute("href", "/a").with_text("Alpha"),
            LinkElement::new("a").with_attribute("href", "/b"),
        ]
    }

    #[test]
    fn test_selection_moves_and_clamps() {
        let mut state = LinkListState::default();
        state.reset(2);
        assert_eq!(state.selected(), Some(0));

        state.handle_event(&TuiEvent::LinkUp);
        assert_eq!(state.selected(), Some(0));
        state.handle_event(&TuiEvent::LinkDown);
        state.handle_event(&TuiEvent::LinkDown);
        assert_eq!(state.selected(), Some(1));

        assert_eq!(
            state.handle_event(&TuiEvent::Follow),
            Some(LinkListEvent::Follow(1))
        );
    }

    #[test]
    fn test_empty_list_emits_nothing() {
        let mut state = LinkListState::default();
        state.reset(0);
        assert_eq!(state.selected(), None);
        assert_eq!(state.handle_event(&TuiEvent::Follow), None);
    }

    #[test]
    fn test_renders_text_or_href() {
        let links = links();
        let mut state = LinkListState::default();
        state.reset(links.len());
        let mut terminal = Terminal::new(TestBackend::new(30, 4)).unwrap();
        terminal
            .draw(|f| LinkList::new(&mut state, &links).render(f, f.area()))
            .unwrap();

        let text: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect();
        assert!(text.contains("Links (2)"));
        assert!(text.contains("[1] Alpha"));
        assert!(text.contains("[2] /b"));
    }
}
