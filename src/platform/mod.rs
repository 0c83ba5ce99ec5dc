//! Host platform surface: URL opening, image natural-size lookup, and device
//! metrics.
//!
//! These are the capabilities the renderer borrows from its host. Each one is
//! a trait so hosts can plug in their own; the in-memory implementations here
//! keep tests deterministic.

pub mod device;
pub mod image_source;
pub mod linking;
#[cfg(feature = "http")]
pub mod network;

pub use device::{device_scale_factor, install_device_metrics, DeviceMetrics};
pub use image_source::{ImageSizeSource, NaturalSize, StaticImageSizeSource};
pub use linking::{LogUrlOpener, RecordingUrlOpener, UrlOpener};
#[cfg(feature = "http")]
pub use network::NetworkImageSizeSource;

use std::sync::Arc;

/// A small composite trait bundling the capabilities a view needs from its
/// host.
pub trait PlatformApi: Send + Sync {
    fn url_opener(&self) -> Arc<dyn UrlOpener>;
    fn image_size_source(&self) -> Arc<dyn ImageSizeSource>;
    fn device_metrics(&self) -> DeviceMetrics;
}

/// In-memory platform: records opened links, answers image queries from a
/// [`StaticImageSizeSource`], and uses fixed metrics.
pub struct NoopPlatform {
    opener: Arc<RecordingUrlOpener>,
    images: Arc<StaticImageSizeSource>,
    metrics: DeviceMetrics,
}

impl NoopPlatform {
    pub fn new() -> Self {
        NoopPlatform {
            opener: Arc::new(RecordingUrlOpener::new()),
            images: Arc::new(StaticImageSizeSource::new()),
            metrics: DeviceMetrics::default(),
        }
    }

    pub fn with_images(mut self, images: StaticImageSizeSource) -> Self {
        self.images = Arc::new(images);
        self
    }

    pub fn with_metrics(mut self, metrics: DeviceMetrics) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn opener(&self) -> &RecordingUrlOpener {
        &self.opener
    }

    pub fn images(&self) -> &StaticImageSizeSource {
        &self.images
    }
}

impl Default for NoopPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl PlatformApi for NoopPlatform {
    fn url_opener(&self) -> Arc<dyn UrlOpener> {
        self.opener.clone()
    }

    fn image_size_source(&self) -> Arc<dyn ImageSizeSource> {
        self.images.clone()
    }

    fn device_metrics(&self) -> DeviceMetrics {
        self.metrics
    }
}

/// Real host surface: network image lookup, logged links, process-wide
/// device metrics.
#[cfg(feature = "http")]
pub struct NetworkPlatform {
    images: Arc<NetworkImageSizeSource>,
}

#[cfg(feature = "http")]
impl NetworkPlatform {
    pub fn new(timeout_ms: u64, user_agent: &str) -> crate::Result<Self> {
        Ok(Self {
            images: Arc::new(NetworkImageSizeSource::new(timeout_ms, user_agent)?),
        })
    }
}

#[cfg(feature = "http")]
impl PlatformApi for NetworkPlatform {
    fn url_opener(&self) -> Arc<dyn UrlOpener> {
        Arc::new(LogUrlOpener)
    }

    fn image_size_source(&self) -> Arc<dyn ImageSizeSource> {
        self.images.clone()
    }

    fn device_metrics(&self) -> DeviceMetrics {
        DeviceMetrics::current()
    }
}
