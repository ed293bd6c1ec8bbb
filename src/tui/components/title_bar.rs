//! # TitleBar Component
//!
//! Top status bar showing the page being viewed and what the navigator is
//! doing.
//!
//! TitleBar is purely presentational: it receives all data as props and has
//! no internal state.
//!
//! The text changes with state, most important first so narrow terminals
//! still show it:
//!
//! 1. **Loading**: `"⠋ Loading https://app.test/docs"`
//! 2. **Status message**: `"Docs | https://app.test/docs | HTTP 404"`
//! 3. **Default**: `"Docs | https://app.test/docs"`

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::Span;
use unicode_width::UnicodeWidthChar;

use crate::tui::component::Component;

const SPINNER: &[char] = &['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];

pub struct TitleBar {
    /// Document title, if the page had one
    pub title: Option<String>,
    /// URL shown (the requested one while loading)
    pub url: String,
    /// Transient status (e.g. "HTTP 404", "network error: ...")
    pub status_message: String,
    pub is_loading: bool,
    /// Animation frame counter, advanced by the main loop
    pub tick: usize,
}

impl TitleBar {
    pub fn new(
        url: String,
        title: Option<String>,
        status_message: String,
        is_loading: bool,
    ) -> Self {
        Self {
            title,
            url,
            status_message,
            is_loading,
            tick: 0,
        }
    }

    fn text(&self) -> String {
        if self.is_loading {
            let frame = SPINNER[self.tick % SPINNER.len()];
            return format!("{frame} Loading {}", self.url);
        }
        let mut text = match &self.title {
            Some(title) => format!("{title} | {}", self.url),
            None => self.url.clone(),
        };
        if !self.status_message.is_empty() {
            text.push_str(" | ");
            text.push_str(&self.status_message);
        }
        text
    }
}

impl Component for TitleBar {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let text = truncate_to_width(&self.text(), area.width as usize);
        let style = if self.is_loading {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default().fg(Color::Cyan)
        };
        frame.render_widget(Span::styled(text, style), area);
    }
}

/// Truncate to `max_width` terminal columns, ending in "…" when cut.
pub fn truncate_to_width(s: &str, max_width: usize) -> String {
    let total: usize = s.chars().filter_map(|c| c.width()).sum();
    if total <= max_width {
        return s.to_string();
    }
    if max_width == 0 {
        return String::new();
    }

    let mut out = String::new();
    let mut used = 0;
    for c in s.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > max_width - 1 {
            break;
        }
        out.push(c);
        used += w;
    }
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn rendered(title_bar: &mut TitleBar, width: u16) -> String {
        let backend = TestBackend::new(width, 1);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal
            .draw(|f| {
                title_bar.render(f, f.area());
            })
            .unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect::<String>()
    }

    #[test]
    fn test_title_bar_loading() {
        let mut title_bar = TitleBar::new(
            "https://app.test/docs".to_string(),
            Some("Old page".to_string()),
            String::new(),
            true,
        );
        let text = rendered(&mut title_bar, 80);
        assert!(text.contains("Loading https://app.test/docs"));
        assert!(!text.contains("Old page"));
    }

    #[test]
    fn test_title_bar_with_status_message() {
        let mut title_bar = TitleBar::new(
            "https://app.test/missing".to_string(),
            Some("Not Found".to_string()),
            "HTTP 404".to_string(),
            false,
        );
        let text = rendered(&mut title_bar, 80);
        assert!(text.contains("Not Found | https://app.test/missing | HTTP 404"));
    }

    #[test]
    fn test_title_bar_default_no_status() {
        let mut title_bar =
            TitleBar::new("https://app.test/".to_string(), None, String::new(), false);
        let text = rendered(&mut title_bar, 40);
        assert!(text.contains("https://app.test/"));
        assert!(!text.contains('|'));
    }

    #[test]
    fn test_truncate_to_width() {
        assert_eq!(truncate_to_width("short", 10), "short");
        assert_eq!(truncate_to_width("abcdefgh", 5), "abcd…");
        assert_eq!(truncate_to_width("日本語テキスト", 5), "日本…");
        assert_eq!(truncate_to_width("abc", 0), "");
    }
}
