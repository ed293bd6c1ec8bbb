//! # Link Selector
//!
//! Decides which clicked elements the manager listens to (`links_selector`).
//! Any selector `scraper` accepts works, combinators included: the link and
//! its recorded ancestors are rebuilt as a small document and the compiled
//! selector is tested against the innermost element. Siblings are not
//! recorded, so `+` and `~` never match.

use std::fmt;
use std::str::FromStr;

use scraper::{ElementRef, Html};

use crate::core::link::LinkElement;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectorError {
    Empty,
    Malformed(String),
}

impl fmt::Display for SelectorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectorError::Empty => write!(f, "empty selector"),
            SelectorError::Malformed(msg) => write!(f, "malformed selector: {msg}"),
        }
    }
}

impl std::error::Error for SelectorError {}

/// A compiled selector list.
#[derive(Clone)]
pub struct Selector {
    source: String,
    compiled: scraper::Selector,
}

impl Selector {
    pub fn parse(input: &str) -> Result<Self, SelectorError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(SelectorError::Empty);
        }

        let compiled = scraper::Selector::parse(trimmed)
            .map_err(|e| SelectorError::Malformed(e.to_string()))?;

        Ok(Self {
            source: trimmed.to_string(),
            compiled,
        })
    }

    /// Selector matching any `<a>` element.
    pub fn anchors() -> Self {
        Self {
            source: "a".to_string(),
            compiled: scraper::Selector::parse("a").expect("`a` is a valid selector"),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// True when any selector in the list matches `element`.
    pub fn matches(&self, element: &LinkElement) -> bool {
        let document = Html::parse_document(&nested_markup(element));
        let Some(target) = document
            .root_element()
            .descendants()
            .filter_map(ElementRef::wrap)
            .last()
        else {
            return false;
        };

        // The tree builder drops tags that cannot appear where they were
        // written; such an element never matches.
        target.value().name().eq_ignore_ascii_case(element.tag_name())
            && self.compiled.matches(&target)
    }
}

impl fmt::Debug for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Selector").field(&self.source).finish()
    }
}

impl PartialEq for Selector {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl Eq for Selector {}

impl FromStr for Selector {
    type Err = SelectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Selector::parse(s)
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

// ============================================================================
// Markup
// ============================================================================

/// `<anc1 ...><anc2 ...><link ...></link>` with every ancestor left open.
/// The link is written empty so it is the last element in tree order.
fn nested_markup(element: &LinkElement) -> String {
    let mut markup = String::new();
    for ancestor in element.ancestors() {
        open_tag(&mut markup, ancestor.tag_name(), ancestor.attributes());
    }
    open_tag(&mut markup, element.tag_name(), element.attributes());
    markup.push_str("</");
    markup.push_str(element.tag_name());
    markup.push('>');
    markup
}

fn open_tag<'a>(
    out: &mut String,
    tag: &str,
    attributes: impl Iterator<Item = (&'a str, &'a str)>,
) {
    out.push('<');
    out.push_str(tag);
    for (name, value) in attributes {
        if !is_attribute_name(name) {
            continue;
        }
        out.push(' ');
        out.push_str(name);
        out.push_str("=\"");
        out.push_str(&value.replace('&', "&amp;").replace('"', "&quot;"));
        out.push('"');
    }
    out.push('>');
}

fn is_attribute_name(name: &str) -> bool {
    !name.is_empty()
        && !name
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '"' | '\'' | '>' | '/' | '=' | '<'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::link::Ancestor;

    fn anchor(attrs: &[(&str, &str)]) -> LinkElement {
        attrs
            .iter()
            .fold(LinkElement::new("a"), |el, (k, v)| el.with_attribute(k, *v))
    }

    #[test]
    fn test_tag_selector() {
        let selector = Selector::parse("a").unwrap();
        assert!(selector.matches(&anchor(&[])));
        assert!(selector.matches(&LinkElement::new("A")));
        assert!(!selector.matches(&LinkElement::new("button")));
    }

    #[test]
    fn test_anchors_equals_parsed_tag() {
        assert_eq!(Selector::anchors(), Selector::parse(" a ").unwrap());
        assert_eq!(Selector::anchors().to_string(), "a");
    }

    #[test]
    fn test_class_and_id() {
        let selector = Selector::parse("a.nav#home").unwrap();
        assert!(selector.matches(&anchor(&[("class", "btn nav"), ("id", "home")])));
        assert!(!selector.matches(&anchor(&[("class", "navbar"), ("id", "home")])));
        assert!(!selector.matches(&anchor(&[("class", "nav")])));
    }

    #[test]
    fn test_attribute_operators() {
        let el = anchor(&[("href", "/docs/intro.html?a=1&b=\"2\""), ("data-spa", "")]);
        assert!(Selector::parse("[data-spa]").unwrap().matches(&el));
        assert!(Selector::parse("a[href^='/docs']").unwrap().matches(&el));
        assert!(Selector::parse("a[href$='\"2\"']").unwrap().matches(&el));
        assert!(Selector::parse("a[href*='&b=']").unwrap().matches(&el));
        assert!(!Selector::parse("a[href=intro]").unwrap().matches(&el));
        assert!(!Selector::parse("[data-missing]").unwrap().matches(&el));
    }

    #[test]
    fn test_selector_list() {
        let selector = Selector::parse("a.internal, area, [data-link='a,b']").unwrap();
        assert!(selector.matches(&anchor(&[("class", "internal")])));
        assert!(selector.matches(&LinkElement::new("area")));
        assert!(selector.matches(&LinkElement::new("span").with_attribute("data-link", "a,b")));
        assert!(!selector.matches(&anchor(&[])));
    }

    #[test]
    fn test_universal_selector() {
        let selector = Selector::parse("*[href]").unwrap();
        assert!(selector.matches(&LinkElement::new("div").with_attribute("href", "/x")));
        assert!(!selector.matches(&LinkElement::new("div")));
    }

    #[test]
    fn test_descendant_combinator_checks_ancestors() {
        let selector = Selector::parse("nav a").unwrap();
        let in_nav = anchor(&[("href", "/docs")])
            .with_ancestor(Ancestor::new("nav"))
            .with_ancestor(Ancestor::new("ul"))
            .with_ancestor(Ancestor::new("li"));
        let in_footer = anchor(&[("href", "/x")]).with_ancestor(Ancestor::new("footer"));

        assert!(selector.matches(&in_nav));
        assert!(!selector.matches(&in_footer));
        assert!(!selector.matches(&anchor(&[("href", "/y")])));
    }

    #[test]
    fn test_child_combinator_and_ancestor_attributes() {
        let selector = Selector::parse("main > a.internal, [data-spa-root] a").unwrap();
        let direct = anchor(&[("class", "internal")]).with_ancestor(Ancestor::new("main"));
        let nested = anchor(&[("class", "internal")])
            .with_ancestor(Ancestor::new("main"))
            .with_ancestor(Ancestor::new("div"));
        let rooted = anchor(&[])
            .with_ancestor(Ancestor::new("div").with_attribute("data-spa-root", ""))
            .with_ancestor(Ancestor::new("p"));

        assert!(selector.matches(&direct));
        assert!(!selector.matches(&nested));
        assert!(selector.matches(&rooted));
    }

    #[test]
    fn test_rejects_malformed() {
        assert_eq!(Selector::parse("   "), Err(SelectorError::Empty));
        assert!(matches!(Selector::parse("a,"), Err(SelectorError::Malformed(_))));
        assert!(matches!(Selector::parse("a["), Err(SelectorError::Malformed(_))));
        assert!(matches!(Selector::parse("a."), Err(SelectorError::Malformed(_))));
        assert!(matches!(Selector::parse("a:not-a-pseudo"), Err(SelectorError::Malformed(_))));
    }

    #[test]
    fn test_attribute_names_that_cannot_be_written_are_skipped() {
        let el = LinkElement::new("a")
            .with_attribute("bad name", "x")
            .with_attribute("href", "/ok");
        assert_eq!(nested_markup(&el), r#"<a href="/ok"></a>"#);
        assert!(Selector::parse("a[href]").unwrap().matches(&el));
    }
}
