//! Render a small document and print its widget outline.
//!
//! Run with `cargo run --example render_outline`.

use htmlview::{ExternalStyle, ExternalStyleSheet, HtmlView, RenderConfig, Style, StyleKey, StyleSheet};

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = RenderConfig {
        style_sheet: StyleSheet::new().with("p", Style::new().with(StyleKey::FontSize, 16.0)),
        external_style_sheet: ExternalStyleSheet::new().with("p", ExternalStyle::text_indent(2)),
        ..Default::default()
    };
    let view = HtmlView::new(config);
    let doc = view.try_render(
        r#"
        <h1>Release notes</h1>
        <p>Version <b>0.1</b> ships &amp;lt;p&amp;gt; indentation.<br>See <a href="https://example.com/notes">the notes</a>.</p>
        <blockquote><div>nested</div><code>let x = 1;</code></blockquote>
        "#,
    )?;

    print!("{}", doc.root());
    println!("---");
    println!("{}", doc.root().plain_text());
    Ok(())
}
