//! # Link Elements and Click Events
//!
//! The slice of the DOM the manager looks at when a link is activated: the
//! element's tag, its attributes, the elements it is nested in, and the
//! document URL its `href` resolves against.

use std::cell::Cell;
use std::collections::BTreeMap;

use clap::ValueEnum;
use reqwest::Url;
use serde::{Deserialize, Serialize};

/// Which pointer event activates links.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ClickEventKind {
    #[default]
    Click,
    #[value(name = "touchstart")]
    TouchStart,
}

impl ClickEventKind {
    /// `touchstart` on touch-capable hosts, `click` otherwise.
    pub fn for_host(supports_touch: bool) -> Self {
        if supports_touch {
            ClickEventKind::TouchStart
        } else {
            ClickEventKind::Click
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ClickEventKind::Click => "click",
            ClickEventKind::TouchStart => "touchstart",
        }
    }
}

/// An element enclosing a link, kept so selectors with combinators
/// (`nav a`, `main > a.internal`) can be tested against the link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ancestor {
    tag_name: String,
    attributes: BTreeMap<String, String>,
}

impl Ancestor {
    pub fn new(tag_name: impl Into<String>) -> Self {
        Self {
            tag_name: tag_name.into(),
            attributes: BTreeMap::new(),
        }
    }

    pub fn with_attribute(mut self, name: &str, value: impl Into<String>) -> Self {
        self.attributes.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    pub fn tag_name(&self) -> &str {
        &self.tag_name
    }

    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkElement {
    tag_name: String,
    /// Keys are lowercased.
    attributes: BTreeMap<String, String>,
    /// Outermost first.
    ancestors: Vec<Ancestor>,
    base: Option<Url>,
    text: String,
}

impl LinkElement {
    pub fn new(tag_name: impl Into<String>) -> Self {
        Self {
            tag_name: tag_name.into(),
            attributes: BTreeMap::new(),
            ancestors: Vec::new(),
            base: None,
            text: String::new(),
        }
    }

    /// Nests the element one level deeper: call outermost first.
    pub fn with_ancestor(mut self, ancestor: Ancestor) -> Self {
        self.ancestors.push(ancestor);
        self
    }

    pub fn with_ancestors(mut self, ancestors: impl IntoIterator<Item = Ancestor>) -> Self {
        self.ancestors.extend(ancestors);
        self
    }

    pub fn with_attribute(mut self, name: &str, value: impl Into<String>) -> Self {
        self.attributes.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    /// Document URL that relative hrefs resolve against. Ignored if unparsable.
    pub fn with_base(mut self, base: &str) -> Self {
        self.base = Url::parse(base).ok();
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn tag_name(&self) -> &str {
        &self.tag_name
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn ancestors(&self) -> &[Ancestor] {
        &self.ancestors
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn id(&self) -> Option<&str> {
        self.attribute("id")
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.attribute("class")
            .is_some_and(|classes| classes.split_whitespace().any(|c| c == class))
    }

    /// The raw `href` attribute, as written in the markup.
    pub fn href_attribute(&self) -> Option<&str> {
        self.attribute("href")
    }

    fn resolved(&self) -> Option<Url> {
        let raw = self.href_attribute()?.trim();
        match &self.base {
            Some(base) => base.join(raw).ok(),
            None => Url::parse(raw).ok(),
        }
    }

    /// Absolute URL of the link. Falls back to the raw attribute when it
    /// cannot be resolved.
    pub fn href(&self) -> Option<String> {
        let raw = self.href_attribute()?;
        Some(
            self.resolved()
                .map(|url| url.to_string())
                .unwrap_or_else(|| raw.to_string()),
        )
    }

    /// Path component of the resolved href; empty when unresolvable.
    pub fn pathname(&self) -> String {
        self.resolved()
            .map(|url| url.path().to_string())
            .unwrap_or_default()
    }

    /// The `target` attribute when set to something non-empty.
    pub fn target(&self) -> Option<&str> {
        self.attribute("target").filter(|t| !t.is_empty())
    }
}

/// A cancelable pointer activation on `current_target`.
#[derive(Debug)]
pub struct ClickEvent {
    pub kind: ClickEventKind,
    pub current_target: LinkElement,
    default_prevented: Cell<bool>,
}

impl ClickEvent {
    pub fn new(kind: ClickEventKind, current_target: LinkElement) -> Self {
        Self {
            kind,
            current_target,
            default_prevented: Cell::new(false),
        }
    }

    pub fn click(current_target: LinkElement) -> Self {
        Self::new(ClickEventKind::Click, current_target)
    }

    pub fn prevent_default(&self) {
        self.default_prevented.set(true);
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_href_resolves_against_base() {
        let el = LinkElement::new("a")
            .with_attribute("href", "../guide?x=1#top")
            .with_base("https://example.com/docs/intro/");
        assert_eq!(el.href().as_deref(), Some("https://example.com/docs/guide?x=1#top"));
        assert_eq!(el.pathname(), "/docs/guide");
    }

    #[test]
    fn test_href_without_attribute() {
        let el = LinkElement::new("a").with_base("https://example.com/");
        assert_eq!(el.href(), None);
        assert_eq!(el.pathname(), "");
    }

    #[test]
    fn test_mailto_href_has_no_path_host() {
        let el = LinkElement::new("a")
            .with_attribute("href", "mailto:team@example.com")
            .with_base("https://example.com/");
        assert_eq!(el.href().as_deref(), Some("mailto:team@example.com"));
    }

    #[test]
    fn test_attribute_names_are_case_insensitive() {
        let el = LinkElement::new("a")
            .with_attribute("HREF", "/x")
            .with_attribute("Target", "_blank");
        assert_eq!(el.attribute("href"), Some("/x"));
        assert_eq!(el.target(), Some("_blank"));
    }

    #[test]
    fn test_empty_target_counts_as_absent() {
        let el = LinkElement::new("a").with_attribute("target", "");
        assert_eq!(el.target(), None);
    }

    #[test]
    fn test_has_class() {
        let el = LinkElement::new("a").with_attribute("class", "  nav  primary ");
        assert!(el.has_class("nav"));
        assert!(el.has_class("primary"));
        assert!(!el.has_class("pri"));
    }

    #[test]
    fn test_ancestors_keep_nesting_order() {
        let el = LinkElement::new("a")
            .with_ancestor(Ancestor::new("nav").with_attribute("ID", "top"))
            .with_ancestor(Ancestor::new("ul"));
        let tags: Vec<_> = el.ancestors().iter().map(Ancestor::tag_name).collect();
        assert_eq!(tags, vec!["nav", "ul"]);
        assert_eq!(el.ancestors()[0].attributes().collect::<Vec<_>>(), vec![("id", "top")]);
    }

    #[test]
    fn test_click_event_prevent_default() {
        let event = ClickEvent::click(LinkElement::new("a"));
        assert!(!event.default_prevented());
        event.prevent_default();
        assert!(event.default_prevented());
    }

    #[test]
    fn test_click_event_kind_for_host() {
        assert_eq!(ClickEventKind::for_host(true), ClickEventKind::TouchStart);
        assert_eq!(ClickEventKind::for_host(false), ClickEventKind::Click);
        assert_eq!(ClickEventKind::TouchStart.as_str(), "touchstart");
    }
}
