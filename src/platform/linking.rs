//! The host's URL-open capability

use std::sync::Mutex;

use log::info;

use crate::{Error, Result};

pub trait UrlOpener: Send + Sync {
    fn open_url(&self, url: &str) -> Result<()>;
}

/// Keeps every opened URL in memory; used in tests and by [`super::NoopPlatform`].
#[derive(Debug, Default)]
pub struct RecordingUrlOpener {
    opened: Mutex<Vec<String>>,
}

impl RecordingUrlOpener {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn opened(&self) -> Vec<String> {
        self.opened
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

impl UrlOpener for RecordingUrlOpener {
    fn open_url(&self, url: &str) -> Result<()> {
        if url.trim().is_empty() {
            return Err(Error::LinkError("empty URL".into()));
        }
        self.opened
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(url.to_string());
        Ok(())
    }
}

/// Logs instead of navigating. Used by the CLI.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogUrlOpener;

impl UrlOpener for LogUrlOpener {
    fn open_url(&self, url: &str) -> Result<()> {
        info!("open {}", url);
        Ok(())
    }
}
