//! Engine configuration
//!
//! Every field is optional in serialized form and falls back to the
//! defaults in `blockfall_types`.
//!
//! ```
//! use blockfall_core::EngineConfig;
//!
//! let config = EngineConfig::from_json_str(r#"{ "grid_width": 6 }"#).unwrap();
//! assert_eq!(config.grid_width, 6);
//! assert_eq!(config.grid_height, 20);
//! ```

use serde::{Deserialize, Serialize};

use crate::types::{
    EngineError, DEFAULT_FRAMERATE, DEFAULT_GRID_HEIGHT, DEFAULT_GRID_WIDTH, DEFAULT_MAX_BLOCKS,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    pub grid_width: u16,
    pub grid_height: u16,
    /// Block table capacity
    pub max_blocks: usize,
    /// Game loop frames per second
    pub framerate: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            grid_width: DEFAULT_GRID_WIDTH,
            grid_height: DEFAULT_GRID_HEIGHT,
            max_blocks: DEFAULT_MAX_BLOCKS,
            framerate: DEFAULT_FRAMERATE,
        }
    }
}

/// Failure to load a configuration
#[derive(Debug)]
pub enum ConfigError {
    Parse(serde_json::Error),
    Invalid(EngineError),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Parse(err) => write!(f, "failed to parse config: {err}"),
            ConfigError::Invalid(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Parse(err) => Some(err),
            ConfigError::Invalid(err) => Some(err),
        }
    }
}

impl EngineConfig {
    /// Parse and validate a JSON document
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json).map_err(ConfigError::Parse)?;
        config.validate().map_err(ConfigError::Invalid)?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        if self.grid_width == 0 {
            return Err(EngineError::InvalidConfig("grid_width"));
        }
        if self.grid_height == 0 {
            return Err(EngineError::InvalidConfig("grid_height"));
        }
        if self.max_blocks == 0 || self.max_blocks > u32::MAX as usize {
            return Err(EngineError::InvalidConfig("max_blocks"));
        }
        if self.framerate == 0 {
            return Err(EngineError::InvalidConfig("framerate"));
        }
        Ok(())
    }
}
