//! End-to-end compile behaviour through the html5ever bridge.

use htmlview::style::{FontWeight, StyleValue};
use htmlview::widget::{TextContent, TextWidget};
use htmlview::{
    ExternalStyle, ExternalStyleSheet, HtmlView, RenderConfig, Style, StyleKey, StyleSheet, Widget,
};

fn render(html: &str) -> Widget {
    render_with(html, RenderConfig::default())
}

fn render_with(html: &str, config: RenderConfig) -> Widget {
    HtmlView::new(config).render(html).root().clone()
}

fn spans(w: &Widget) -> &[Widget] {
    match w {
        Widget::Text(t) => t.spans_slice(),
        other => panic!("expected text, got {:?}", other),
    }
}

fn literal(w: &Widget) -> &str {
    match w {
        Widget::Text(TextWidget {
            content: TextContent::Literal(s),
            ..
        }) => s,
        other => panic!("expected literal, got {:?}", other),
    }
}

#[test]
fn escaped_entity_decodes_once() {
    let root = render("<span>&amp;lt;</span>");
    let span = &root.children()[0];
    assert_eq!(literal(&spans(span)[0]), "&lt;");
}

#[test]
fn nbsp_and_copy_decode() {
    let root = render("<span>a&nbsp;b &copy;</span>");
    assert_eq!(root.plain_text(), "a b ©");
}

#[test]
fn sibling_order_is_preserved() {
    let root = render("<div>one</div><h1>two</h1><p>three</p>");
    let texts: Vec<String> = root.children().iter().map(Widget::plain_text).collect();
    assert_eq!(texts, vec!["one", "two", "three"]);
}

#[test]
fn inline_children_wrap_in_single_text() {
    let root = render("<div>Hello <b>bold</b> and <i>it</i></div>");
    let div = &root.children()[0];
    assert_eq!(div.children().len(), 1);
    let wrapper = &div.children()[0];
    assert!(wrapper.style().map_or(false, Style::is_empty));
    assert_eq!(spans(wrapper).len(), 4);
    assert_eq!(div.plain_text(), "Hello bold and it");
}

#[test]
fn block_child_produces_container_without_wrapper() {
    let root = render("<div>lead<div>inner</div></div>");
    let outer = &root.children()[0];
    assert!(matches!(outer, Widget::Container(_)));
    assert_eq!(outer.children().len(), 2);
    assert_eq!(literal(&outer.children()[0]), "lead");
    assert!(matches!(outer.children()[1], Widget::Container(_)));
}

#[test]
fn paragraph_gets_text_indent() {
    let config = RenderConfig {
        external_style_sheet: ExternalStyleSheet::new().with("p", ExternalStyle::text_indent(2)),
        ..Default::default()
    };
    let root = render_with("<p>Text</p>", config);
    let p = &root.children()[0];
    let wrapper = &p.children()[0];
    assert_eq!(literal(&spans(wrapper)[0]), "  ");
    assert_eq!(literal(&spans(wrapper)[1]), "Text");
}

#[test]
fn default_paragraph_indent_is_empty() {
    let root = render("<p>Text</p>");
    assert_eq!(root.plain_text(), "Text");
}

#[test]
fn override_merges_with_builtin_style() {
    let config = RenderConfig {
        style_sheet: StyleSheet::new().with("h1", Style::new().with(StyleKey::FontSize, 40.0)),
        ..Default::default()
    };
    let root = render_with("<h1>Title</h1>", config);
    let style = root.children()[0].style().expect("h1 style");
    assert_eq!(style.dimension(StyleKey::FontSize), Some(40.0));
    assert_eq!(
        style.get(StyleKey::FontWeight),
        Some(&StyleValue::FontWeight(FontWeight::W500))
    );
}

#[test]
fn anchor_carries_open_url_action() {
    let root = render(r#"<div><a href="https://example.com">go</a></div>"#);
    let links = root.links();
    assert_eq!(links.len(), 1);
    assert_eq!(links[0].href(), Some("https://example.com"));
}

#[test]
fn line_break_and_images_in_order() {
    let root = render(r#"<div>a<br>b<img src="x.png" width="10" height="20"></div>"#);
    assert_eq!(root.plain_text(), "a\nb");
    let images = root.images();
    assert_eq!(images.len(), 1);
    assert_eq!(images[0].uri, "x.png");
    assert_eq!(images[0].style.dimension(StyleKey::Width), Some(10.0));
}

#[test]
fn whitespace_between_blocks_is_dropped_by_default() {
    let root = render("<div>a</div>\n  <div>b</div>");
    assert_eq!(root.children().len(), 2);
}

#[test]
fn keep_whitespace_preserves_text_nodes() {
    let mut config = RenderConfig::default();
    config.parse.ignore_whitespace = false;
    let root = render_with("<div>a</div>\n  <div>b</div>", config);
    assert_eq!(root.children().len(), 3);
    assert_eq!(literal(&root.children()[1]), "\n  ");
}

#[test]
fn strict_mode_renders_empty_document_on_bad_markup() {
    let mut config = RenderConfig::default();
    config.parse.strict = true;
    let view = HtmlView::new(config);
    assert!(view.try_render("<div>a</span></div>").is_err());
    assert!(view.render("<div>a</span></div>").root().children().is_empty());
}
