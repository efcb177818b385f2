//! Configuration file (`canvass.toml`).

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::sampler::DEFAULT_PRECISION;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CanvassConfig {
    #[serde(default)]
    pub images: ImageConfig,
    #[serde(default)]
    pub sampler: SamplerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageConfig {
    /// Root directory image storage keys resolve under.
    #[serde(default = "default_image_root")]
    pub root: PathBuf,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            root: default_image_root(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SamplerConfig {
    /// Decimal places of the cumulative probability partition.
    #[serde(default = "default_precision")]
    pub precision: u32,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            precision: default_precision(),
        }
    }
}

fn default_image_root() -> PathBuf {
    PathBuf::from("images")
}

const fn default_precision() -> u32 {
    DEFAULT_PRECISION
}

impl CanvassConfig {
    /// Load from a TOML file; a missing file yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error when the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        toml::from_str(&raw).with_context(|| format!("parse config {}", path.display()))
    }
}
