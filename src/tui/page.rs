//! # Page Document
//!
//! Turns fetched markup into what the terminal can show: a title, wrapped
//! text lines, and the page's links as [`LinkElement`]s ready to be handed
//! back to the navigation manager when activated.
//!
//! The markup goes through `scraper`'s HTML5 parser. `<head>`, script and
//! style bodies are skipped, block-level elements start a new line, and each
//! `a[href]` is followed by its `[n]` index in the link list. Every link
//! records the elements it is nested in so `links_selector` can test them.

use scraper::node::Node;
use scraper::{ElementRef, Html, Selector};

use crate::core::link::{Ancestor, LinkElement};

const BLOCK_TAGS: &[&str] = &[
    "article", "blockquote", "br", "div", "footer", "h1", "h2", "h3", "h4", "h5", "h6", "header",
    "hr", "li", "main", "nav", "ol", "p", "pre", "section", "table", "tr", "ul",
];

const SKIPPED_TAGS: &[&str] = &["head", "script", "style", "template", "noscript"];

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageDocument {
    pub title: Option<String>,
    pub lines: Vec<String>,
    pub links: Vec<LinkElement>,
}

impl PageDocument {
    pub fn parse(html: &str, base_url: &str) -> Self {
        let document = Html::parse_document(html);
        let mut builder = Builder::new(base_url);
        builder.walk(document.root_element());
        builder.finish(extract_title(&document))
    }
}

fn extract_title(document: &Html) -> Option<String> {
    let selector = Selector::parse("title").ok()?;
    document
        .select(&selector)
        .map(|el| normalize_whitespace(&el.text().collect::<String>()))
        .find(|title| !title.is_empty())
}

fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn ancestor_of(element: ElementRef<'_>) -> Ancestor {
    element
        .value()
        .attrs()
        .fold(Ancestor::new(element.value().name()), |ancestor, (name, value)| {
            ancestor.with_attribute(name, value)
        })
}

// ============================================================================
// Builder
// ============================================================================

struct Builder {
    base_url: String,
    text: String,
    /// Elements enclosing the node being walked, outermost first.
    ancestors: Vec<Ancestor>,
    links: Vec<LinkElement>,
}

impl Builder {
    fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            text: String::new(),
            ancestors: Vec::new(),
            links: Vec::new(),
        }
    }

    fn walk(&mut self, element: ElementRef<'_>) {
        let name = element.value().name();
        if SKIPPED_TAGS.contains(&name) {
            return;
        }
        let is_block = BLOCK_TAGS.contains(&name);
        let is_link = name == "a" && element.value().attr("href").is_some();

        if is_block {
            self.line_break();
        }

        self.ancestors.push(ancestor_of(element));
        for child in element.children() {
            match child.value() {
                Node::Text(text) => self.push_inline(text),
                Node::Element(_) => {
                    if let Some(child) = ElementRef::wrap(child) {
                        self.walk(child);
                    }
                }
                _ => {}
            }
        }
        self.ancestors.pop();

        if is_link {
            self.push_link(element);
        }
        if is_block {
            self.line_break();
        }
    }

    /// Appends text with runs of whitespace collapsed to one space.
    fn push_inline(&mut self, text: &str) {
        for c in text.chars() {
            if c.is_whitespace() {
                if !self.text.is_empty() && !self.text.ends_with([' ', '\n']) {
                    self.text.push(' ');
                }
            } else {
                self.text.push(c);
            }
        }
    }

    fn line_break(&mut self) {
        while self.text.ends_with(' ') {
            self.text.pop();
        }
        if !self.text.is_empty() && !self.text.ends_with('\n') {
            self.text.push('\n');
        }
    }

    fn push_link(&mut self, element: ElementRef<'_>) {
        let label = normalize_whitespace(&element.text().collect::<String>());
        let link = element
            .value()
            .attrs()
            .fold(LinkElement::new("a"), |link, (name, value)| {
                link.with_attribute(name, value)
            })
            .with_ancestors(self.ancestors.iter().cloned())
            .with_base(&self.base_url)
            .with_text(label);
        self.links.push(link);
        let marker = format!("[{}]", self.links.len());
        self.push_inline(&marker);
    }

    fn finish(self, title: Option<String>) -> PageDocument {
        PageDocument {
            title,
            lines: self
                .text
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(String::from)
                .collect(),
            links: self.links,
        }
    }
}
