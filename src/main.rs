use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context};
use clap::{Parser, ValueEnum};
use log::{info, warn};

use htmlview::platform::{install_device_metrics, DeviceMetrics};
use htmlview::{ExternalStyleSheet, HtmlView, RenderConfig, StyleSheet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Outline,
    Json,
    Text,
}

/// Render restricted HTML into a widget tree.
#[derive(Debug, Parser)]
#[command(name = "htmlview", version)]
struct Cli {
    /// HTML file to render; reads stdin when omitted
    input: Option<PathBuf>,
    /// JSON file with per-tag style overrides
    #[arg(long)]
    styles: Option<PathBuf>,
    /// JSON file with per-tag external styles (textIndent)
    #[arg(long)]
    external_styles: Option<PathBuf>,
    /// Device scale factor used when sizing images
    #[arg(long)]
    scale_factor: Option<f32>,
    /// Look up natural image sizes before printing
    #[arg(long)]
    resolve_images: bool,
    /// Keep whitespace-only text nodes
    #[arg(long)]
    keep_whitespace: bool,
    /// Fail on malformed markup
    #[arg(long)]
    strict: bool,
    #[arg(long, value_enum, default_value_t = Format::Outline)]
    format: Format,
}

fn read_input(path: Option<&PathBuf>) -> anyhow::Result<String> {
    match path {
        Some(p) => std::fs::read_to_string(p).with_context(|| format!("reading {}", p.display())),
        None => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf).context("reading stdin")?;
            Ok(buf)
        }
    }
}

fn build_config(cli: &Cli) -> anyhow::Result<RenderConfig> {
    let mut config = RenderConfig::default();
    if let Some(path) = &cli.styles {
        config.style_sheet = StyleSheet::from_path(path)
            .with_context(|| format!("loading styles from {}", path.display()))?;
    }
    if let Some(path) = &cli.external_styles {
        config.external_style_sheet = ExternalStyleSheet::from_path(path)
            .with_context(|| format!("loading external styles from {}", path.display()))?;
    }
    config.parse.ignore_whitespace = !cli.keep_whitespace;
    config.parse.strict = cli.strict;
    Ok(config)
}

#[cfg(feature = "http")]
fn attach_images(view: HtmlView, config: &RenderConfig) -> anyhow::Result<HtmlView> {
    let platform = htmlview::platform::NetworkPlatform::new(config.image_timeout_ms, &config.user_agent)
        .context("building image fetcher")?;
    Ok(view.with_platform(&platform)?)
}

#[cfg(not(feature = "http"))]
fn attach_images(_view: HtmlView, _config: &RenderConfig) -> anyhow::Result<HtmlView> {
    bail!("--resolve-images needs the `http` feature")
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    if let Some(scale) = cli.scale_factor {
        if !scale.is_finite() || scale <= 0.0 {
            bail!("--scale-factor must be a positive number, got {}", scale);
        }
        install_device_metrics(DeviceMetrics::with_scale_factor(scale))?;
    }

    let html = read_input(cli.input.as_ref())?;
    let config = build_config(&cli)?;
    let timeout = Duration::from_millis(config.image_timeout_ms);

    let mut view = HtmlView::new(config.clone());
    if cli.resolve_images {
        view = attach_images(view, &config)?;
    }

    let mut doc = view.try_render(&html).context("rendering document")?;
    info!("rendered {} image(s)", doc.image_count());
    if cli.resolve_images && doc.image_count() > 0 {
        if tokio::time::timeout(timeout, doc.settle()).await.is_err() {
            warn!("some images did not resolve within {:?}", timeout);
        }
    }

    let tree = doc.snapshot();
    let stdout = io::stdout();
    let mut out = stdout.lock();
    match cli.format {
        Format::Outline => write!(out, "{}", tree)?,
        Format::Json => writeln!(out, "{}", serde_json::to_string_pretty(&tree)?)?,
        Format::Text => writeln!(out, "{}", tree.plain_text())?,
    }
    out.flush()?;
    Ok(())
}
