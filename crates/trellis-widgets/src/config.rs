//! Widget Configuration

use serde::Deserialize;

/// Context-wide defaults
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Config {
    /// Carousel period when `automatic-rotation-interval-time` is absent or unparsable
    pub default_rotation_interval_ms: u64,

    /// PageUp/PageDown move a slider by this many steps
    pub slider_page_steps: u32,

    /// Idle time after which a typeahead buffer starts over
    pub typeahead_timeout_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_rotation_interval_ms: 5000,
            slider_page_steps: 10,
            typeahead_timeout_ms: 500,
        }
    }
}

/// Configuration error
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

impl Config {
    /// Parse from JSON; missing keys keep their defaults
    pub fn from_json(source: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(source)?)
    }
}
