//! Parsed document model and the parsing bridge.
//!
//! The compiler only ever sees [`ParsedNode`] trees. Any HTML parser can
//! produce them by implementing [`DocumentParser`]; [`ScraperParser`] is the
//! default bridge over `scraper` (html5ever).
//!
//! Text nodes carry character data in escaped source form: entity decoding is
//! the compiler's job and happens exactly once. Because html5ever decodes
//! entities while tokenizing, the scraper bridge escapes the handful of
//! characters the compiler knows how to decode back.

use std::collections::BTreeMap;

use log::debug;
use scraper::{ElementRef, Html, Node};

use crate::{Error, Result};

/// An element with its attributes and ordered children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub tag: String,
    pub attributes: BTreeMap<String, String>,
    pub children: Vec<ParsedNode>,
}

impl Element {
    pub fn new(tag: &str) -> Self {
        Element {
            tag: tag.to_ascii_lowercase(),
            attributes: BTreeMap::new(),
            children: Vec::new(),
        }
    }

    pub fn with_attr(mut self, name: &str, value: &str) -> Self {
        self.attributes.insert(name.to_string(), value.to_string());
        self
    }

    pub fn with_child(mut self, child: ParsedNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_children(mut self, children: impl IntoIterator<Item = ParsedNode>) -> Self {
        self.children.extend(children);
        self
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }
}

/// One node of a parsed document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedNode {
    Element(Element),
    /// Character data, entities not yet decoded.
    Text(String),
    Root(Vec<ParsedNode>),
}

impl ParsedNode {
    pub fn text(content: &str) -> Self {
        ParsedNode::Text(content.to_string())
    }

    pub fn element(tag: &str, children: impl IntoIterator<Item = ParsedNode>) -> Self {
        ParsedNode::Element(Element::new(tag).with_children(children))
    }

    /// Tag name for elements, `None` for text and root nodes.
    pub fn tag(&self) -> Option<&str> {
        match self {
            ParsedNode::Element(el) => Some(&el.tag),
            _ => None,
        }
    }

    pub fn children(&self) -> &[ParsedNode] {
        match self {
            ParsedNode::Element(el) => &el.children,
            ParsedNode::Root(children) => children,
            ParsedNode::Text(_) => &[],
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, ParsedNode::Text(_))
    }
}

impl From<Element> for ParsedNode {
    fn from(el: Element) -> Self {
        ParsedNode::Element(el)
    }
}

/// Options handed to the parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    /// Drop text nodes made only of ASCII whitespace.
    pub ignore_whitespace: bool,
    /// Fail on any error the parser reports instead of recovering.
    pub strict: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            ignore_whitespace: true,
            strict: false,
        }
    }
}

/// The parsing bridge. Implementations must return a [`ParsedNode::Root`].
pub trait DocumentParser: Send + Sync {
    fn parse(&self, html: &str, options: &ParseOptions) -> Result<ParsedNode>;
}

/// html5ever-backed parser (via `scraper`), fragment mode.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScraperParser;

impl ScraperParser {
    pub fn new() -> Self {
        ScraperParser
    }
}

impl DocumentParser for ScraperParser {
    fn parse(&self, html: &str, options: &ParseOptions) -> Result<ParsedNode> {
        let fragment = Html::parse_fragment(html);
        if !fragment.errors.is_empty() {
            debug!("parser reported {} error(s)", fragment.errors.len());
            if options.strict {
                return Err(Error::ParseError(fragment.errors.join("; ")));
            }
        }
        // Fragments are wrapped in a synthetic <html> element.
        let children = convert_children(fragment.root_element(), options);
        Ok(ParsedNode::Root(children))
    }
}

fn convert_children(parent: ElementRef<'_>, options: &ParseOptions) -> Vec<ParsedNode> {
    let mut out = Vec::new();
    for child in parent.children() {
        match child.value() {
            Node::Text(text) => {
                let content: &str = text;
                if options.ignore_whitespace && content.chars().all(|c| c.is_ascii_whitespace()) {
                    continue;
                }
                out.push(ParsedNode::Text(escape_text(content)));
            }
            Node::Element(_) => {
                if let Some(el) = ElementRef::wrap(child) {
                    out.push(convert_element(el, options));
                }
            }
            // comments, doctypes, processing instructions
            _ => {}
        }
    }
    out
}

fn convert_element(el: ElementRef<'_>, options: &ParseOptions) -> ParsedNode {
    let value = el.value();
    let attributes = value
        .attrs()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    ParsedNode::Element(Element {
        tag: value.name().to_ascii_lowercase(),
        attributes,
        children: convert_children(el, options),
    })
}

/// Re-escape the characters that [`crate::compiler::decode_entities`]
/// decodes, so already-decoded text survives one more decoding pass intact.
pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            '\u{a9}' => out.push_str("&copy;"),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(html: &str) -> ParsedNode {
        ScraperParser::new()
            .parse(html, &ParseOptions::default())
            .expect("parse should succeed")
    }

    #[test]
    fn parses_nested_elements_in_order() {
        let root = parse("<div><b>x</b><i>y</i></div><p>z</p>");
        let top = root.children();
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].tag(), Some("div"));
        assert_eq!(top[1].tag(), Some("p"));
        let tags: Vec<_> = top[0].children().iter().filter_map(|n| n.tag()).collect();
        assert_eq!(tags, vec!["b", "i"]);
    }

    #[test]
    fn whitespace_only_text_is_dropped_by_default() {
        let root = parse("<div>\n  <p>a</p>\n  <p>b</p>\n</div>");
        let div = &root.children()[0];
        assert_eq!(div.children().len(), 2);
        assert!(div.children().iter().all(|n| !n.is_text()));
    }

    #[test]
    fn whitespace_kept_when_requested() {
        let opts = ParseOptions {
            ignore_whitespace: false,
            ..Default::default()
        };
        let root = ScraperParser::new().parse("<div> <p>a</p></div>", &opts).unwrap();
        let div = &root.children()[0];
        assert_eq!(div.children()[0], ParsedNode::text(" "));
    }

    #[test]
    fn comments_are_dropped() {
        let root = parse("<div><!-- note -->text</div>");
        assert_eq!(root.children()[0].children(), &[ParsedNode::text("text")]);
    }

    #[test]
    fn text_is_reescaped_for_the_compiler() {
        let root = parse("<p>&amp;lt; &copy; a&lt;b</p>");
        assert_eq!(
            root.children()[0].children(),
            &[ParsedNode::text("&amp;lt; &copy; a&lt;b")]
        );
    }

    #[test]
    fn attributes_are_collected() {
        let root = parse(r#"<img src="a.png" width="10">"#);
        match &root.children()[0] {
            ParsedNode::Element(el) => {
                assert_eq!(el.tag, "img");
                assert_eq!(el.attr("src"), Some("a.png"));
                assert_eq!(el.attr("width"), Some("10"));
                assert_eq!(el.attr("height"), None);
            }
            other => panic!("unexpected node {:?}", other),
        }
    }

    #[test]
    fn strict_mode_fails_on_parser_errors() {
        let opts = ParseOptions {
            strict: true,
            ..Default::default()
        };
        let err = ScraperParser::new()
            .parse("<div>a</span></div>", &opts)
            .unwrap_err();
        assert!(matches!(err, Error::ParseError(_)));
        // lenient mode recovers
        assert!(ScraperParser::new()
            .parse("<div>a</span></div>", &ParseOptions::default())
            .is_ok());
    }

    #[test]
    fn attributes_are_keyed_by_name() {
        let root = parse(r#"<img width="3" src="a.png" alt="x">"#);
        let ParsedNode::Element(img) = &root.children()[0] else {
            panic!("expected element");
        };
        let names: Vec<_> = img.attributes.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["alt", "src", "width"]);
        assert_eq!(img.attr("src"), Some("a.png"));
    }
}
