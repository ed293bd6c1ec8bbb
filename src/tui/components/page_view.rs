//! # PageView Component
//!
//! Scrollable body of the current page.
//!
//! `PageView` is a transient component (created each frame) that wraps
//! `&'a mut PageViewState` (persistent scroll state) and the document to
//! show. The selected link's `[n]` marker is highlighted in the text.

use ratatui::Frame;
use ratatui::buffer::Buffer;
use ratatui::layout::{Position, Rect, Size};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Paragraph, Widget, Wrap};
use tui_scrollview::{ScrollView, ScrollViewState, ScrollbarVisibility};

use crate::tui::component::{Component, EventHandler};
use crate::tui::event::TuiEvent;
use crate::tui::page::PageDocument;

/// Scroll state for the page body. Must be persisted in the parent TuiState.
#[derive(Default)]
pub struct PageViewState {
    pub scroll_state: ScrollViewState,
    /// Total wrapped height of the last render
    pub content_height: u16,
    /// Last known viewport height (for scroll clamping between frames)
    pub viewport_height: u16,
}

impl PageViewState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Back to the top, for a freshly loaded page.
    pub fn reset(&mut self) {
        self.scroll_state = ScrollViewState::default();
        self.content_height = 0;
    }

    fn clamp_scroll(&mut self) {
        let max_offset = self.content_height.saturating_sub(self.viewport_height);
        let current = self.scroll_state.offset();
        if current.y > max_offset {
            self.scroll_state.set_offset(Position {
                x: current.x,
                y: max_offset,
            });
        }
    }
}

impl EventHandler for PageViewState {
    type Event = ();

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        match event {
            TuiEvent::ScrollUp => self.scroll_state.scroll_up(),
            TuiEvent::ScrollDown => self.scroll_state.scroll_down(),
            TuiEvent::ScrollPageUp => self.scroll_state.scroll_page_up(),
            TuiEvent::ScrollPageDown => self.scroll_state.scroll_page_down(),
            _ => {}
        }
        self.clamp_scroll();
        None
    }
}

pub struct PageView<'a> {
    state: &'a mut PageViewState,
    document: &'a PageDocument,
    /// Zero-based index into `document.links`
    selected_link: Option<usize>,
}

impl<'a> PageView<'a> {
    pub fn new(
        state: &'a mut PageViewState,
        document: &'a PageDocument,
        selected_link: Option<usize>,
    ) -> Self {
        Self {
            state,
            document,
            selected_link,
        }
    }

    fn text(&self) -> Text<'a> {
        let marker = self.selected_link.map(|i| format!("[{}]", i + 1));
        let highlight = Style::default()
            .fg(Color::Black)
            .bg(Color::Cyan)
            .add_modifier(Modifier::BOLD);

        let document: &'a PageDocument = self.document;
        let lines = document.lines.iter().map(|line| {
            let Some(marker) = marker.as_deref() else {
                return Line::raw(line.as_str());
            };
            let mut spans = Vec::new();
            let mut rest = line.as_str();
            while let Some(pos) = rest.find(marker) {
                spans.push(Span::raw(&rest[..pos]));
                spans.push(Span::styled(&rest[pos..pos + marker.len()], highlight));
                rest = &rest[pos + marker.len()..];
            }
            spans.push(Span::raw(rest));
            Line::from(spans)
        });
        Text::from(lines.collect::<Vec<_>>())
    }
}

impl Component for PageView<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        // Leave a column for the scrollbar.
        let content_width = area.width.saturating_sub(1);
        let paragraph = Paragraph::new(self.text()).wrap(Wrap { trim: false });
        let content_height = paragraph.line_count(content_width).min(u16::MAX as usize) as u16;

        self.state.content_height = content_height;
        self.state.viewport_height = area.height;
        self.state.clamp_scroll();

        let mut scroll_view = ScrollView::new(Size::new(content_width, content_height))
            .vertical_scrollbar_visibility(ScrollbarVisibility::Automatic)
            .horizontal_scrollbar_visibility(ScrollbarVisibility::Never);
        scroll_view.render_widget(paragraph, Rect::new(0, 0, content_width, content_height));

        frame.render_stateful_widget(scroll_view, area, &mut self.state.scroll_state);
    }
}

/// Placeholder body shown before the first page arrives or after a failure.
pub struct Notice<'a>(pub &'a str);

impl Widget for Notice<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Paragraph::new(self.0)
            .style(Style::default().fg(Color::DarkGray))
            .wrap(Wrap { trim: true })
            .render(area, buf);
    }
}
