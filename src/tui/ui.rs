use ratatui::Frame;
use ratatui::layout::{Constraint, Layout};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

use crate::tui::TuiState;
use crate::tui::component::Component;
use crate::tui::components::{LinkList, Notice, PageView, TitleBar};

const HELP_TEXT: &str =
    " ↑↓ Link  Enter Follow  ← Back  → Forward  r Reload  PgUp/PgDn Scroll  q Quit ";

pub fn draw_ui(frame: &mut Frame, tui: &mut TuiState, spinner_frame: usize) {
    use Constraint::{Length, Min, Percentage};
    let [title_area, main_area, status_area] =
        Layout::vertical([Length(1), Min(0), Length(1)]).areas(frame.area());

    // Title bar
    let mut title_bar = TitleBar::new(
        tui.location.clone(),
        tui.document.as_ref().and_then(|doc| doc.title.clone()),
        tui.status_message.clone(),
        tui.is_loading,
    );
    title_bar.tick = spinner_frame;
    title_bar.render(frame, title_area);

    // Page + links
    match &tui.document {
        Some(document) => {
            let [page_area, links_area] =
                Layout::horizontal([Min(20), Percentage(30)]).areas(main_area);
            let selected = tui.link_list.selected();
            PageView::new(&mut tui.page_view, document, selected).render(frame, page_area);
            LinkList::new(&mut tui.link_list, &document.links).render(frame, links_area);
        }
        None => {
            let text = match &tui.error {
                Some(error) => error.as_str(),
                None if tui.is_loading => "Loading...",
                None => "Nothing loaded yet.",
            };
            frame.render_widget(Notice(text), main_area);
        }
    }

    // Status line: last notice or key help
    let status = match &tui.notice {
        Some(notice) => Span::styled(notice.as_str(), Style::default().fg(Color::Yellow)),
        None => Span::styled(HELP_TEXT, Style::default().fg(Color::DarkGray)),
    };
    frame.render_widget(Line::from(status), status_area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::page::PageDocument;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn screen(tui: &mut TuiState) -> String {
        let mut terminal = Terminal::new(TestBackend::new(80, 10)).unwrap();
        terminal.draw(|f| draw_ui(f, tui, 0)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[test]
    fn test_draw_loading_screen() {
        let mut tui = TuiState::new("https://app.test/");
        tui.is_loading = true;
        let text = screen(&mut tui);
        assert!(text.contains("Loading https://app.test/"));
        assert!(text.contains("Enter Follow"));
    }

    #[test]
    fn test_draw_document_with_links() {
        let mut tui = TuiState::new("https://app.test/");
        tui.show_document(PageDocument::parse(
            r#"<title>Home</title><p>Go to <a href="/docs">docs</a></p>"#,
            "https://app.test/",
        ));
        tui.notice = Some("https://elsewhere.test/ is not handled here".to_string());

        let text = screen(&mut tui);
        assert!(text.contains("Home | https://app.test/"));
        assert!(text.contains("Go to docs[1]"));
        assert!(text.contains("Links (1)"));
        assert!(text.contains("not handled here"));
    }

    #[test]
    fn test_draw_error_without_document() {
        let mut tui = TuiState::new("https://app.test/");
        tui.error = Some("network error: connection refused".to_string());
        let text = screen(&mut tui);
        assert!(text.contains("connection refused"));
    }
}
