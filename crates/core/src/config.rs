//! `jmc-flame.toml` config loading.

use std::path::Path;

use jmc_flame_protocol::Viewport;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::colors::ColorRules;
use crate::views::flame::Orientation;
use crate::views::label::LabelPolicy;

pub const DEFAULT_CONFIG_FILE: &str = "jmc-flame.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Toml(#[from] toml::de::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    pub width: f64,
    pub height: f64,
    pub orientation: Orientation,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            width: 1200.0,
            height: 800.0,
            orientation: Orientation::BottomUp,
        }
    }
}

impl ViewConfig {
    pub fn viewport(&self) -> Viewport {
        Viewport::new(self.width, self.height)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub view: ViewConfig,
    pub labels: LabelPolicy,
    pub colors: ColorRules,
}

impl Config {
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&text)
    }

    /// Load `path` if it exists. Unreadable or invalid files are reported
    /// and replaced by the defaults.
    pub fn load_optional(path: &Path) -> Self {
        match Self::load(path) {
            Ok(cfg) => cfg,
            Err(ConfigError::Io { source, .. })
                if source.kind() == std::io::ErrorKind::NotFound =>
            {
                Self::default()
            }
            Err(err) => {
                tracing::warn!("ignoring config {}: {err}", path.display());
                Self::default()
            }
        }
    }
}
