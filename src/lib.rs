//! htmlview
//!
//! Renders a restricted subset of HTML into a tree of native widget
//! primitives: containers, styled text spans, line breaks and images.
//!
//! # Features
//!
//! - **Compiler**: deterministic tag dispatch with per-tag default styles that
//!   callers can override through a [`StyleSheet`].
//! - **Image resolution**: images without explicit dimensions are sized from
//!   their natural size and the device scale factor, asynchronously.
//! - **http** (default): a `reqwest`-backed [`platform::NetworkImageSizeSource`].
//!
//! # Example
//!
//! ```
//! use htmlview::{HtmlView, RenderConfig};
//!
//! let view = HtmlView::new(RenderConfig::default());
//! let doc = view.render("<p>Hello <b>world</b></p>");
//! assert_eq!(doc.root().plain_text(), "Hello world");
//! ```

pub mod error;
pub use error::{Error, Result};

pub mod compiler;
pub mod document;
pub mod dom;
pub mod image;
pub mod platform;
pub mod style;
pub mod widget;

pub use compiler::{compile, Compiler};
pub use document::RenderedDocument;
pub use dom::{DocumentParser, Element, ParseOptions, ParsedNode, ScraperParser};
pub use image::{ImageHandle, ImageRequest, ImageResolver, ImageSize, ImageState};
pub use platform::PlatformApi;
pub use style::{ExternalStyle, ExternalStyleSheet, Style, StyleKey, StyleSheet, StyleValue};
pub use widget::{Action, ImageId, Widget};

use log::error;

/// Rendering configuration.
///
/// Defaults render with the built-in tag styles only, drop whitespace-only
/// text and recover from malformed markup.
///
/// ```
/// let cfg = htmlview::RenderConfig::default();
/// assert!(cfg.parse.ignore_whitespace);
/// assert!(cfg.style_sheet.is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Per-tag overrides merged over the built-in styles
    pub style_sheet: StyleSheet,
    /// Non-visual per-tag settings (`textIndent`)
    pub external_style_sheet: ExternalStyleSheet,
    pub parse: ParseOptions,
    /// Timeout for a single remote image lookup in milliseconds
    pub image_timeout_ms: u64,
    /// User agent sent with remote image lookups
    pub user_agent: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            style_sheet: StyleSheet::new(),
            external_style_sheet: ExternalStyleSheet::new(),
            parse: ParseOptions::default(),
            image_timeout_ms: 30000,
            user_agent: format!("htmlview/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Parse, compile and mount HTML documents.
pub struct HtmlView {
    config: RenderConfig,
    parser: Box<dyn DocumentParser>,
    resolver: Option<ImageResolver>,
}

impl HtmlView {
    pub fn new(config: RenderConfig) -> Self {
        Self {
            config,
            parser: Box::new(ScraperParser::new()),
            resolver: None,
        }
    }

    /// Replace the html5ever bridge with another parser.
    pub fn with_parser(mut self, parser: impl DocumentParser + 'static) -> Self {
        self.parser = Box::new(parser);
        self
    }

    pub fn with_image_resolver(mut self, resolver: ImageResolver) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// Resolve images through the platform's size source and scale factor.
    /// Must be called inside a tokio runtime.
    pub fn with_platform(self, platform: &dyn PlatformApi) -> Result<Self> {
        let resolver = ImageResolver::from_platform(platform)?;
        Ok(self.with_image_resolver(resolver))
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn parse(&self, raw_html: &str) -> Result<ParsedNode> {
        self.parser.parse(raw_html.trim(), &self.config.parse)
    }

    /// Compile a parsed document into a single unstyled top-level container.
    pub fn compile(&self, root: &ParsedNode) -> Widget {
        let nodes = match root {
            ParsedNode::Root(children) => children.as_slice(),
            other => std::slice::from_ref(other),
        };
        let children = compile(
            nodes,
            &self.config.style_sheet,
            &self.config.external_style_sheet,
        );
        Widget::container(Style::new(), children)
    }

    pub fn try_render(&self, raw_html: &str) -> Result<RenderedDocument> {
        let root = self.parse(raw_html)?;
        let tree = self.compile(&root);
        Ok(RenderedDocument::mount(tree, self.resolver.as_ref()))
    }

    /// Like [`HtmlView::try_render`], but a failure is logged and yields an
    /// empty document.
    pub fn render(&self, raw_html: &str) -> RenderedDocument {
        match self.try_render(raw_html) {
            Ok(doc) => doc,
            Err(e) => {
                error!("failed to render document: {}", e);
                RenderedDocument::empty()
            }
        }
    }
}

/// One-shot render without image resolution.
pub fn render_html(raw_html: &str, config: RenderConfig) -> RenderedDocument {
    HtmlView::new(config).render(raw_html)
}
