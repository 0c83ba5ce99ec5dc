//! Device metrics, read once per process

use std::sync::OnceLock;

use log::warn;

use crate::{Error, Result};

/// Environment variable consulted for the scale factor when no metrics were
/// installed explicitly.
pub const SCALE_FACTOR_ENV: &str = "HTMLVIEW_SCALE_FACTOR";

static DEVICE: OnceLock<DeviceMetrics> = OnceLock::new();

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeviceMetrics {
    pub width: u32,
    pub height: u32,
    /// Physical pixels per logical layout unit.
    pub scale_factor: f32,
}

impl Default for DeviceMetrics {
    fn default() -> Self {
        Self {
            width: 375,
            height: 667,
            scale_factor: 1.0,
        }
    }
}

impl DeviceMetrics {
    pub fn with_scale_factor(scale_factor: f32) -> Self {
        Self {
            scale_factor,
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !self.scale_factor.is_finite() || self.scale_factor <= 0.0 {
            return Err(Error::ConfigError(format!(
                "scale factor must be a positive number, got {}",
                self.scale_factor
            )));
        }
        Ok(())
    }

    /// Defaults, with the scale factor taken from [`SCALE_FACTOR_ENV`] when it
    /// holds a valid value.
    pub fn from_env() -> Self {
        let raw = std::env::var(SCALE_FACTOR_ENV).ok();
        Self::with_scale_factor(parse_scale_factor(raw.as_deref()))
    }

    /// Process-wide metrics. The first call fixes the value for the rest of
    /// the process.
    pub fn current() -> DeviceMetrics {
        *DEVICE.get_or_init(DeviceMetrics::from_env)
    }
}

fn parse_scale_factor(raw: Option<&str>) -> f32 {
    let Some(raw) = raw else {
        return 1.0;
    };
    match raw.trim().parse::<f32>() {
        Ok(v) if v.is_finite() && v > 0.0 => v,
        _ => {
            warn!("ignoring invalid {}={:?}", SCALE_FACTOR_ENV, raw);
            1.0
        }
    }
}

/// Fix the process-wide metrics. Fails if they were already read or installed.
pub fn install_device_metrics(metrics: DeviceMetrics) -> Result<()> {
    metrics.validate()?;
    DEVICE
        .set(metrics)
        .map_err(|_| Error::ConfigError("device metrics already initialised".into()))
}

pub fn device_scale_factor() -> f32 {
    DeviceMetrics::current().scale_factor
}
