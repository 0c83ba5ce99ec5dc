//! The output widget tree handed to the host's rendering layer.
//!
//! A widget tree is a fresh structure with no references back into the parsed
//! document. Sibling order is significant: hosts use a child's position as its
//! identity.

use std::fmt;

use serde::Serialize;

use crate::platform::UrlOpener;
use crate::style::Style;
use crate::Result;

/// Sequential identifier of an image primitive, in document order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct ImageId(pub usize);

impl fmt::Display for ImageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Behaviour attached to a text primitive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Action {
    OpenUrl { url: String },
}

/// Either a literal run of characters or nested span primitives.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TextContent {
    Literal(String),
    Spans(Vec<Widget>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextWidget {
    pub style: Style,
    pub content: TextContent,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<Action>,
}

impl TextWidget {
    pub fn literal(text: impl Into<String>) -> Self {
        TextWidget {
            style: Style::default(),
            content: TextContent::Literal(text.into()),
            action: None,
        }
    }

    pub fn spans(style: Style, spans: Vec<Widget>) -> Self {
        TextWidget {
            style,
            content: TextContent::Spans(spans),
            action: None,
        }
    }

    pub fn spans_slice(&self) -> &[Widget] {
        match &self.content {
            TextContent::Spans(spans) => spans,
            TextContent::Literal(_) => &[],
        }
    }

    pub fn href(&self) -> Option<&str> {
        match &self.action {
            Some(Action::OpenUrl { url }) => Some(url),
            None => None,
        }
    }

    /// Run the attached action through the host. Returns `false` when the
    /// primitive has nothing to do on activation.
    pub fn activate(&self, opener: &dyn UrlOpener) -> Result<bool> {
        match &self.action {
            Some(Action::OpenUrl { url }) => {
                opener.open_url(url)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageWidget {
    pub id: ImageId,
    pub uri: String,
    /// Display width; the explicit attribute until the image is resolved.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f32>,
    pub style: Style,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ContainerWidget {
    pub style: Style,
    pub children: Vec<Widget>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Widget {
    Text(TextWidget),
    Image(ImageWidget),
    Container(ContainerWidget),
    /// A single newline character primitive.
    LineBreak,
}

impl Widget {
    pub fn text(literal: impl Into<String>) -> Self {
        Widget::Text(TextWidget::literal(literal))
    }

    /// Empty text standing in for content that is not ready to show.
    pub fn placeholder() -> Self {
        Widget::text("")
    }

    pub fn container(style: Style, children: Vec<Widget>) -> Self {
        Widget::Container(ContainerWidget { style, children })
    }

    pub fn style(&self) -> Option<&Style> {
        match self {
            Widget::Text(t) => Some(&t.style),
            Widget::Image(i) => Some(&i.style),
            Widget::Container(c) => Some(&c.style),
            Widget::LineBreak => None,
        }
    }

    /// Direct children: container children or text spans.
    pub fn children(&self) -> &[Widget] {
        match self {
            Widget::Container(c) => &c.children,
            Widget::Text(t) => t.spans_slice(),
            Widget::Image(_) | Widget::LineBreak => &[],
        }
    }

    /// Pre-order traversal.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a Widget)) {
        visit(self);
        for child in self.children() {
            child.walk(visit);
        }
    }

    pub fn images(&self) -> Vec<&ImageWidget> {
        let mut out = Vec::new();
        self.walk(&mut |w| {
            if let Widget::Image(img) = w {
                out.push(img);
            }
        });
        out
    }

    /// Text primitives that carry an action, in document order.
    pub fn links(&self) -> Vec<&TextWidget> {
        let mut out = Vec::new();
        self.walk(&mut |w| {
            if let Widget::Text(t) = w {
                if t.action.is_some() {
                    out.push(t);
                }
            }
        });
        out
    }

    /// Concatenated text content; line breaks become `\n`.
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        self.walk(&mut |w| match w {
            Widget::Text(TextWidget {
                content: TextContent::Literal(s),
                ..
            }) => out.push_str(s),
            Widget::LineBreak => out.push('\n'),
            _ => {}
        });
        out
    }

    fn write_outline(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        let pad = "  ".repeat(depth);
        match self {
            Widget::Container(c) => writeln!(f, "{}container {}", pad, c.style)?,
            Widget::Text(t) => {
                write!(f, "{}text {}", pad, t.style)?;
                if let TextContent::Literal(s) = &t.content {
                    write!(f, " {:?}", s)?;
                }
                if let Some(href) = t.href() {
                    write!(f, " -> {}", href)?;
                }
                writeln!(f)?;
            }
            Widget::Image(img) => {
                let dim = |v: Option<f32>| v.map_or_else(|| "?".to_string(), |v| v.to_string());
                writeln!(
                    f,
                    "{}image {} {} {}x{} {}",
                    pad,
                    img.id,
                    img.uri,
                    dim(img.width),
                    dim(img.height),
                    img.style
                )?;
            }
            Widget::LineBreak => writeln!(f, "{}br", pad)?,
        }
        for child in self.children() {
            child.write_outline(f, depth + 1)?;
        }
        Ok(())
    }
}

/// Indented outline, one primitive per line.
impl fmt::Display for Widget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_outline(f, 0)
    }
}
