//! Network-backed natural-size lookup: `http(s)` through `reqwest`, `data:`
//! URLs inline, `file://` URLs and bare paths from disk.

use std::time::Duration;

use futures::future::{BoxFuture, FutureExt};
use log::debug;
use reqwest::Client;
use url::Url;

use super::image_source::{decode_data_url, decode_dimensions, ImageSizeSource, NaturalSize};
use crate::{Error, Result};

pub struct NetworkImageSizeSource {
    client: Client,
}

impl NetworkImageSizeSource {
    pub fn new(timeout_ms: u64, user_agent: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .user_agent(user_agent)
            .build()
            .map_err(|e| Error::ConfigError(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }

    async fn fetch_bytes(&self, uri: &str) -> Result<Vec<u8>> {
        if uri.starts_with("data:") {
            return decode_data_url(uri);
        }
        match Url::parse(uri) {
            Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {
                debug!("fetching {}", url);
                let resp = self.client.get(url).send().await?.error_for_status()?;
                Ok(resp.bytes().await?.to_vec())
            }
            Ok(url) if url.scheme() == "file" => {
                let path = url
                    .to_file_path()
                    .map_err(|_| Error::UnsupportedSource(uri.to_string()))?;
                Ok(tokio::fs::read(path).await?)
            }
            Ok(url) => Err(Error::UnsupportedSource(format!(
                "scheme '{}' in {}",
                url.scheme(),
                uri
            ))),
            // not a URL: treat as a local path
            Err(_) => Ok(tokio::fs::read(uri).await?),
        }
    }
}

impl ImageSizeSource for NetworkImageSizeSource {
    fn natural_size<'a>(&'a self, uri: &'a str) -> BoxFuture<'a, Result<NaturalSize>> {
        async move {
            let bytes = self.fetch_bytes(uri).await.map_err(|e| match e {
                e @ Error::ImageError { .. } => e,
                e @ Error::UnsupportedSource(_) => e,
                other => Error::image(uri, other.to_string()),
            })?;
            decode_dimensions(uri, &bytes)
        }
        .boxed()
    }
}
