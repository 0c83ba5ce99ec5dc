//! Natural-size lookup for image URIs.
//!
//! The host's image loader is a black box that reports the intrinsic pixel
//! size of a resource. [`ImageSizeSource`] is that seam; the resolver never
//! cares how bytes are fetched.

use std::collections::HashMap;
use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use base64::Engine as _;
use futures::future::{BoxFuture, FutureExt};
use serde::Serialize;

use crate::{Error, Result};

/// Intrinsic pixel dimensions of an image resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NaturalSize {
    pub width: u32,
    pub height: u32,
}

impl NaturalSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

pub trait ImageSizeSource: Send + Sync {
    /// Report the natural size of `uri`. The future may never complete.
    fn natural_size<'a>(&'a self, uri: &'a str) -> BoxFuture<'a, Result<NaturalSize>>;
}

/// Read dimensions from encoded image bytes (format sniffed from content).
pub fn decode_dimensions(uri: &str, bytes: &[u8]) -> Result<NaturalSize> {
    let reader = image::ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| Error::image(uri, format!("could not read image ({})", e)))?;
    let (width, height) = reader
        .into_dimensions()
        .map_err(|e| Error::image(uri, format!("could not decode image ({})", e)))?;
    Ok(NaturalSize { width, height })
}

/// Decode the payload of a base64 `data:` URL.
pub fn decode_data_url(uri: &str) -> Result<Vec<u8>> {
    let rest = uri
        .strip_prefix("data:")
        .ok_or_else(|| Error::UnsupportedSource(uri.to_string()))?;
    let (metadata, data) = rest
        .split_once(',')
        .ok_or_else(|| Error::image(uri, "invalid data URL: missing comma"))?;
    if !metadata.ends_with(";base64") {
        return Err(Error::UnsupportedSource(format!(
            "data URL encoding '{}'",
            metadata
        )));
    }
    base64::engine::general_purpose::STANDARD
        .decode(data.trim())
        .map_err(|e| Error::image(uri, format!("base64 decode error: {}", e)))
}

#[derive(Debug, Clone)]
enum Entry {
    Size(NaturalSize),
    Fail(String),
    Hang,
}

/// In-memory source with canned answers. URIs without an entry fail.
#[derive(Debug, Default)]
pub struct StaticImageSizeSource {
    entries: HashMap<String, Entry>,
    delay: Option<Duration>,
    queries: AtomicUsize,
}

impl StaticImageSizeSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_size(mut self, uri: &str, width: u32, height: u32) -> Self {
        self.entries
            .insert(uri.to_string(), Entry::Size(NaturalSize::new(width, height)));
        self
    }

    pub fn with_failure(mut self, uri: &str, reason: &str) -> Self {
        self.entries
            .insert(uri.to_string(), Entry::Fail(reason.to_string()));
        self
    }

    /// Queries for `uri` never complete.
    pub fn with_hang(mut self, uri: &str) -> Self {
        self.entries.insert(uri.to_string(), Entry::Hang);
        self
    }

    /// Delay every answer.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of queries started so far.
    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }
}

impl ImageSizeSource for StaticImageSizeSource {
    fn natural_size<'a>(&'a self, uri: &'a str) -> BoxFuture<'a, Result<NaturalSize>> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        async move {
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            match self.entries.get(uri) {
                Some(Entry::Size(size)) => Ok(*size),
                Some(Entry::Fail(reason)) => Err(Error::image(uri, reason.clone())),
                Some(Entry::Hang) => futures::future::pending().await,
                None => Err(Error::image(uri, "not found")),
            }
        }
        .boxed()
    }
}
