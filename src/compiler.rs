//! The compile pass: parsed nodes in, widgets out.
//!
//! Every node is classified once. Text nodes become literal text primitives,
//! elements are dispatched on their [`TagKind`], and the root becomes an
//! unstyled container. Elements that fall through to [`TagKind::Block`] are
//! either plain containers (when any child is block-level) or a container
//! holding a single text wrapper, so runs of inline content flow as one
//! paragraph.

use log::debug;

use crate::dom::{Element, ParsedNode};
use crate::style::{ExternalStyleSheet, StyleKey, StyleSheet};
use crate::widget::{Action, ImageId, ImageWidget, TextWidget, Widget};

/// Tags that never force their parent into container rendering.
pub const INLINE_TAGS: [&str; 21] = [
    "b", "font", "i", "em", "big", "strong", "small", "sub", "sup", "u", "ins", "mark", "code",
    "address", "del", "s", "strike", "a", "label", "span", "br",
];

pub fn is_inline_tag(tag: &str) -> bool {
    INLINE_TAGS.contains(&tag)
}

/// How an element is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagKind {
    Image,
    InlineText,
    Anchor,
    LineBreak,
    /// Container, or container wrapping one text primitive.
    Block,
}

impl TagKind {
    pub fn of(tag: &str) -> TagKind {
        match tag {
            "img" => TagKind::Image,
            "font" | "i" | "em" | "b" | "strong" | "big" | "small" | "sub" | "sup" | "mark"
            | "code" | "u" | "ins" | "del" | "s" | "strike" | "span" | "time" | "label" | "h1"
            | "h2" | "h3" | "h4" | "h5" | "h6" => TagKind::InlineText,
            "a" => TagKind::Anchor,
            "br" => TagKind::LineBreak,
            _ => TagKind::Block,
        }
    }
}

/// Decode the six entities the renderer understands.
///
/// Replacement order is fixed and `&amp;` comes late, so `&amp;lt;` decodes
/// to `&lt;` and never to `<`.
pub fn decode_entities(source: &str) -> String {
    source
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&nbsp;", " ")
        .replace("&quot;", "\"")
        .replace("&amp;", "&")
        .replace("&copy;", "\u{a9}")
}

/// Parse a `width`/`height` attribute the way `parseInt` does: optional
/// leading whitespace and `+`, then digits, trailing garbage ignored.
/// Zero, negative, and unparsable values count as absent.
pub fn parse_dimension(raw: &str) -> Option<u32> {
    let s = raw.trim_start();
    let s = s.strip_prefix('+').unwrap_or(s);
    let end = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    s[..end].parse::<u32>().ok().filter(|n| *n > 0)
}

fn has_block_child(children: &[ParsedNode]) -> bool {
    children.iter().any(|child| match child {
        ParsedNode::Text(_) => false,
        ParsedNode::Element(el) => !is_inline_tag(&el.tag),
        ParsedNode::Root(_) => true,
    })
}

/// Walks parsed nodes and emits widgets. Holds the style sheets for the
/// duration of a document and numbers images in document order.
pub struct Compiler<'a> {
    styles: &'a StyleSheet,
    external: &'a ExternalStyleSheet,
    next_image: usize,
}

impl<'a> Compiler<'a> {
    pub fn new(styles: &'a StyleSheet, external: &'a ExternalStyleSheet) -> Self {
        Self {
            styles,
            external,
            next_image: 0,
        }
    }

    /// Number of image primitives emitted so far.
    pub fn image_count(&self) -> usize {
        self.next_image
    }

    pub fn compile(&mut self, nodes: &[ParsedNode]) -> Vec<Widget> {
        nodes.iter().map(|node| self.compile_node(node)).collect()
    }

    fn compile_node(&mut self, node: &ParsedNode) -> Widget {
        match node {
            ParsedNode::Text(content) => Widget::text(decode_entities(content)),
            ParsedNode::Element(el) => self.compile_element(el),
            ParsedNode::Root(children) => Widget::container(Default::default(), self.compile(children)),
        }
    }

    fn compile_element(&mut self, el: &Element) -> Widget {
        let style = self.styles.resolve(&el.tag);
        match TagKind::of(&el.tag) {
            TagKind::Image => {
                let mut style = style;
                let width = el.attr("width").and_then(parse_dimension);
                let height = el.attr("height").and_then(parse_dimension);
                if let Some(w) = width {
                    style = style.with(StyleKey::Width, w as f32);
                }
                if let Some(h) = height {
                    style = style.with(StyleKey::Height, h as f32);
                }
                let uri = el.attr("src").unwrap_or_default().to_string();
                if uri.is_empty() {
                    debug!("img without src");
                }
                let id = ImageId(self.next_image);
                self.next_image += 1;
                Widget::Image(ImageWidget {
                    id,
                    uri,
                    width: width.map(|w| w as f32),
                    height: height.map(|h| h as f32),
                    style,
                })
            }
            TagKind::InlineText => {
                Widget::Text(TextWidget::spans(style, self.compile(&el.children)))
            }
            TagKind::Anchor => {
                let mut text = TextWidget::spans(style, self.compile(&el.children));
                match el.attr("href") {
                    Some(href) => {
                        text.action = Some(Action::OpenUrl {
                            url: href.to_string(),
                        })
                    }
                    None => debug!("anchor without href, no action attached"),
                }
                Widget::Text(text)
            }
            TagKind::LineBreak => Widget::LineBreak,
            TagKind::Block if has_block_child(&el.children) => {
                Widget::container(style, self.compile(&el.children))
            }
            TagKind::Block => {
                let mut spans = Vec::with_capacity(el.children.len() + 1);
                if el.tag == "p" {
                    let indent = self.external.resolve("p").indent() as usize;
                    spans.push(Widget::text(" ".repeat(indent)));
                }
                spans.extend(self.compile(&el.children));
                let wrapper = TextWidget::spans(Default::default(), spans);
                Widget::container(style, vec![Widget::Text(wrapper)])
            }
        }
    }
}

/// Compile `nodes` against the given override sheets.
pub fn compile(
    nodes: &[ParsedNode],
    styles: &StyleSheet,
    external: &ExternalStyleSheet,
) -> Vec<Widget> {
    Compiler::new(styles, external).compile(nodes)
}
