//! Image size resolution.
//!
//! Every image primitive goes through a small state machine:
//! `Pending -> Ready(size)` or `Pending -> Failed(reason)`. Images with both
//! explicit dimensions are Ready from the start. The others ask the host's
//! [`ImageSizeSource`] for the natural size on the tokio runtime and divide it
//! by the device scale factor.
//!
//! An [`ImageHandle`] owns its query. Cancelling or dropping the handle clears
//! its alive flag and aborts the task; a result that still arrives afterwards
//! is discarded. The flag is checked and the result published under the same
//! lock that `cancel` takes, so nothing is published once `cancel` returns.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use log::{debug, warn};
use serde::Serialize;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::platform::{ImageSizeSource, NaturalSize, PlatformApi};
use crate::widget::ImageWidget;
use crate::{Error, Result};

/// Display size in logical layout units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ImageSize {
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum ImageState {
    Pending,
    Ready(ImageSize),
    Failed { reason: String },
}

impl ImageState {
    pub fn is_pending(&self) -> bool {
        matches!(self, ImageState::Pending)
    }

    pub fn size(&self) -> Option<ImageSize> {
        match self {
            ImageState::Ready(size) => Some(*size),
            _ => None,
        }
    }
}

/// What the resolver needs to know about one image primitive.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageRequest {
    pub uri: String,
    pub width: Option<f32>,
    pub height: Option<f32>,
}

impl ImageRequest {
    pub fn new(uri: &str) -> Self {
        Self {
            uri: uri.to_string(),
            width: None,
            height: None,
        }
    }

    pub fn with_size(mut self, width: Option<f32>, height: Option<f32>) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    fn explicit_size(&self) -> Option<ImageSize> {
        match (self.width, self.height) {
            (Some(width), Some(height)) => Some(ImageSize { width, height }),
            _ => None,
        }
    }
}

impl From<&ImageWidget> for ImageRequest {
    fn from(img: &ImageWidget) -> Self {
        ImageRequest {
            uri: img.uri.clone(),
            width: img.width,
            height: img.height,
        }
    }
}

/// Display size for an image whose natural size is known.
///
/// Each axis is `natural / scale` unless an explicit attribute gives it.
pub fn display_size(
    natural: NaturalSize,
    width: Option<f32>,
    height: Option<f32>,
    scale: f32,
) -> ImageSize {
    ImageSize {
        width: width.unwrap_or(natural.width as f32 / scale),
        height: height.unwrap_or(natural.height as f32 / scale),
    }
}

fn lock_alive(alive: &Mutex<bool>) -> MutexGuard<'_, bool> {
    alive.lock().unwrap_or_else(PoisonError::into_inner)
}

// Holds the alive lock across the send so `cancel` cannot interleave.
fn publish(alive: &Mutex<bool>, tx: &watch::Sender<ImageState>, next: ImageState, uri: &str) {
    let alive = lock_alive(alive);
    if !*alive {
        debug!("discarding size for torn-down image {}", uri);
        return;
    }
    tx.send_replace(next);
}

/// Owner of one image's readiness state.
pub struct ImageHandle {
    state: watch::Receiver<ImageState>,
    alive: Arc<Mutex<bool>>,
    task: Option<JoinHandle<()>>,
}

impl ImageHandle {
    fn settled_with(state: ImageState) -> Self {
        // sender dropped at once: the value can never change
        let (_tx, rx) = watch::channel(state);
        ImageHandle {
            state: rx,
            alive: Arc::new(Mutex::new(true)),
            task: None,
        }
    }

    pub fn ready(size: ImageSize) -> Self {
        Self::settled_with(ImageState::Ready(size))
    }

    /// Handle for an image that has no size source: Ready when both explicit
    /// dimensions are known, Pending forever otherwise.
    pub fn without_source(request: &ImageRequest) -> Self {
        match request.explicit_size() {
            Some(size) => Self::ready(size),
            None => Self::settled_with(ImageState::Pending),
        }
    }

    pub fn state(&self) -> ImageState {
        self.state.borrow().clone()
    }

    pub fn is_ready(&self) -> bool {
        matches!(*self.state.borrow(), ImageState::Ready(_))
    }

    pub fn is_cancelled(&self) -> bool {
        !*lock_alive(&self.alive)
    }

    /// Wait until the state leaves Pending, the query task goes away, or the
    /// handle is cancelled. Returns the state at that point.
    pub async fn settled(&mut self) -> ImageState {
        loop {
            let current = self.state.borrow_and_update().clone();
            if !current.is_pending() || self.is_cancelled() {
                return current;
            }
            if self.state.changed().await.is_err() {
                return self.state();
            }
        }
    }

    /// Tear the handle down. Any later result is discarded.
    pub fn cancel(&mut self) {
        *lock_alive(&self.alive) = false;
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Drop for ImageHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl fmt::Debug for ImageHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageHandle")
            .field("state", &*self.state.borrow())
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

/// Spawns natural-size queries for image primitives.
#[derive(Clone)]
pub struct ImageResolver {
    source: Arc<dyn ImageSizeSource>,
    scale_factor: f32,
    runtime: Handle,
}

impl ImageResolver {
    /// Resolver bound to the current tokio runtime.
    pub fn new(source: Arc<dyn ImageSizeSource>, scale_factor: f32) -> Result<Self> {
        let runtime = Handle::try_current().map_err(|e| {
            Error::ConfigError(format!("image resolution needs a tokio runtime: {}", e))
        })?;
        Self::with_runtime(source, scale_factor, runtime)
    }

    pub fn with_runtime(
        source: Arc<dyn ImageSizeSource>,
        scale_factor: f32,
        runtime: Handle,
    ) -> Result<Self> {
        if !scale_factor.is_finite() || scale_factor <= 0.0 {
            return Err(Error::ConfigError(format!(
                "scale factor must be a positive number, got {}",
                scale_factor
            )));
        }
        Ok(Self {
            source,
            scale_factor,
            runtime,
        })
    }

    pub fn from_platform(platform: &dyn PlatformApi) -> Result<Self> {
        Self::new(
            platform.image_size_source(),
            platform.device_metrics().scale_factor,
        )
    }

    pub fn scale_factor(&self) -> f32 {
        self.scale_factor
    }

    pub fn resolve(&self, request: ImageRequest) -> ImageHandle {
        if let Some(size) = request.explicit_size() {
            return ImageHandle::ready(size);
        }

        let (tx, rx) = watch::channel(ImageState::Pending);
        let alive = Arc::new(Mutex::new(true));
        let guard = alive.clone();
        let source = self.source.clone();
        let scale = self.scale_factor;

        let task = self.runtime.spawn(async move {
            let next = match source.natural_size(&request.uri).await {
                Ok(natural) => ImageState::Ready(display_size(
                    natural,
                    request.width,
                    request.height,
                    scale,
                )),
                Err(e) => {
                    warn!("image {} failed: {}", request.uri, e);
                    ImageState::Failed {
                        reason: e.to_string(),
                    }
                }
            };
            publish(&guard, &tx, next, &request.uri);
        });

        ImageHandle {
            state: rx,
            alive,
            task: Some(task),
        }
    }
}

impl fmt::Debug for ImageResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageResolver")
            .field("scale_factor", &self.scale_factor)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::StaticImageSizeSource;
    use std::time::Duration;

    fn resolver(source: StaticImageSizeSource, scale: f32) -> ImageResolver {
        ImageResolver::new(Arc::new(source), scale).expect("runtime present")
    }

    #[test]
    fn display_size_divides_by_scale() {
        let s = display_size(NaturalSize::new(300, 150), None, None, 3.0);
        assert_eq!(s, ImageSize { width: 100.0, height: 50.0 });
    }

    #[test]
    fn explicit_axis_wins_over_scaled_natural() {
        let s = display_size(NaturalSize::new(200, 100), Some(50.0), None, 2.0);
        assert_eq!(s, ImageSize { width: 50.0, height: 50.0 });
        let s = display_size(NaturalSize::new(400, 200), None, Some(10.0), 2.0);
        assert_eq!(s, ImageSize { width: 200.0, height: 10.0 });
    }

    #[test]
    fn resolver_requires_a_runtime() {
        let err = ImageResolver::new(Arc::new(StaticImageSizeSource::new()), 1.0).unwrap_err();
        assert!(matches!(err, Error::ConfigError(_)));
    }

    #[tokio::test]
    async fn explicit_size_is_ready_without_query() {
        let source = Arc::new(StaticImageSizeSource::new());
        let r = ImageResolver::new(source.clone(), 2.0).unwrap();
        let handle = r.resolve(ImageRequest::new("x.png").with_size(Some(100.0), Some(50.0)));
        assert_eq!(
            handle.state(),
            ImageState::Ready(ImageSize { width: 100.0, height: 50.0 })
        );
        assert_eq!(source.query_count(), 0);
    }

    #[tokio::test]
    async fn natural_size_resolves_after_query() {
        let r = resolver(
            StaticImageSizeSource::new()
                .with_size("cat.png", 200, 100)
                .with_delay(Duration::from_millis(20)),
            2.0,
        );
        let mut handle = r.resolve(ImageRequest::new("cat.png"));
        assert_eq!(handle.state(), ImageState::Pending);
        let state = handle.settled().await;
        assert_eq!(state, ImageState::Ready(ImageSize { width: 100.0, height: 50.0 }));
        assert!(handle.is_ready());
    }

    #[tokio::test]
    async fn failure_is_terminal() {
        let r = resolver(StaticImageSizeSource::new().with_failure("bad.png", "404"), 1.0);
        let mut handle = r.resolve(ImageRequest::new("bad.png"));
        match handle.settled().await {
            ImageState::Failed { reason } => assert!(reason.contains("404")),
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn hanging_query_stays_pending() {
        let r = resolver(StaticImageSizeSource::new().with_hang("slow.png"), 1.0);
        let mut handle = r.resolve(ImageRequest::new("slow.png"));
        let waited = tokio::time::timeout(Duration::from_millis(50), handle.settled()).await;
        assert!(waited.is_err());
        assert_eq!(handle.state(), ImageState::Pending);
    }

    #[tokio::test]
    async fn cancelled_handle_discards_late_result() {
        let r = resolver(
            StaticImageSizeSource::new()
                .with_size("late.png", 10, 10)
                .with_delay(Duration::from_millis(30)),
            1.0,
        );
        let mut handle = r.resolve(ImageRequest::new("late.png"));
        handle.cancel();
        tokio::time::sleep(Duration::from_millis(80)).await;
        assert!(handle.is_cancelled());
        assert_eq!(handle.state(), ImageState::Pending);
        assert_eq!(handle.settled().await, ImageState::Pending);
    }

    #[test]
    fn result_racing_a_cancel_is_not_published() {
        let (tx, rx) = watch::channel(ImageState::Pending);
        let alive = Arc::new(Mutex::new(true));

        // cancel in progress: the flag is locked when the result arrives
        let mut flag = alive.lock().unwrap();
        let worker = {
            let alive = alive.clone();
            std::thread::spawn(move || {
                let size = ImageSize { width: 1.0, height: 1.0 };
                publish(&alive, &tx, ImageState::Ready(size), "race.png");
            })
        };
        std::thread::sleep(Duration::from_millis(20));
        *flag = false;
        drop(flag);
        worker.join().unwrap();

        assert_eq!(*rx.borrow(), ImageState::Pending);
    }

    #[test]
    fn without_source_only_explicit_sizes_resolve() {
        let h = ImageHandle::without_source(&ImageRequest::new("a").with_size(Some(1.0), Some(2.0)));
        assert!(h.is_ready());
        let h = ImageHandle::without_source(&ImageRequest::new("a").with_size(Some(1.0), None));
        assert_eq!(h.state(), ImageState::Pending);
    }
}
