//! Application configuration.

use std::{
    net::{Ipv4Addr, SocketAddr},
    path::Path,
    time::Duration,
};

use anyhow::Context;
use ringlight_core::{RingGeometry, StripConfig};
use serde::{Deserialize, Serialize};

use crate::{RenderOptions, DEFAULT_PORT};

/// A global application configuration.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// Command server socket address.
    pub listen: SocketAddr,
    /// Idle rendering task wake up interval.
    pub poll_interval_ms: u64,
    /// Delay between pixels of the black wipe performed on shutdown.
    pub shutdown_wipe_ms: u32,
    /// LED strip configuration.
    pub strip: StripConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen: SocketAddr::from((Ipv4Addr::UNSPECIFIED, DEFAULT_PORT)),
            poll_interval_ms: 100,
            shutdown_wipe_ms: 10,
            strip: StripConfig::default(),
        }
    }
}

impl Config {
    /// Reads a configuration from the TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Unable to read config file {}", path.display()))?;
        Self::from_toml(&text).with_context(|| format!("Malformed config file {}", path.display()))
    }

    /// Parses a configuration from the TOML string.
    pub fn from_toml(text: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Validates the LED rings configuration.
    pub fn geometry(&self) -> anyhow::Result<RingGeometry> {
        self.strip
            .geometry()
            .context("Invalid LED strip configuration")
    }

    /// Returns the rendering task parameters.
    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            poll_interval: Duration::from_millis(self.poll_interval_ms),
            shutdown_wipe_ms: self.shutdown_wipe_ms,
        }
    }
}
