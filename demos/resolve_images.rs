//! Resolve image sizes from disk or the network and print the settled tree.
//!
//! Usage: `cargo run --example resolve_images -- <image-uri> [scale]`

use std::time::Duration;

use anyhow::Context;
use htmlview::platform::{DeviceMetrics, NoopPlatform, StaticImageSizeSource};
use htmlview::{HtmlView, RenderConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let uri = args.next();
    let scale: f32 = match args.next() {
        Some(s) => s.parse().context("scale must be a number")?,
        None => 2.0,
    };

    let view = HtmlView::new(RenderConfig::default());
    let view = match uri.as_deref() {
        #[cfg(feature = "http")]
        Some(_) => {
            let source = htmlview::platform::NetworkImageSizeSource::new(10_000, "htmlview-demo")?;
            let resolver = htmlview::ImageResolver::new(std::sync::Arc::new(source), scale)?;
            view.with_image_resolver(resolver)
        }
        _ => {
            let platform = NoopPlatform::new()
                .with_images(StaticImageSizeSource::new().with_size("demo.png", 640, 480))
                .with_metrics(DeviceMetrics::with_scale_factor(scale));
            view.with_platform(&platform)?
        }
    };

    let src = uri.unwrap_or_else(|| "demo.png".to_string());
    let mut doc = view.render(&format!(
        r#"<div>before<img src="{0}"><img src="{0}" width="100"><img src="{0}" width="10" height="10"></div>"#,
        src
    ));

    println!("mounted:");
    for (id, state) in doc.image_states() {
        println!("  {} {:?}", id, state);
    }
    if tokio::time::timeout(Duration::from_secs(10), doc.settle()).await.is_err() {
        println!("timed out waiting for images");
    }
    println!("settled:");
    print!("{}", doc.snapshot());
    Ok(())
}
