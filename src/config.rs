use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    arena::{Arena, DEFAULT_CHUNK_SIZE},
    ir::Expression,
};

/// Module construction settings, usually read from a TOML file:
///
/// ```toml
/// [arena]
/// chunk_size = 65536
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub arena: ArenaConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArenaConfig {
    /// Bytes per arena chunk.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

fn default_chunk_size() -> usize {
    DEFAULT_CHUNK_SIZE
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("arena chunk size {chunk_size} is smaller than one expression slot ({required} bytes)")]
    ChunkTooSmall { chunk_size: usize, required: usize },
}

impl Config {
    pub fn from_toml(source: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml(&source)
    }

    /// Rejects a chunk size that could not hold a single expression.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let required = Arena::<Expression>::slot_size();
        if self.arena.chunk_size < required {
            return Err(ConfigError::ChunkTooSmall {
                chunk_size: self.arena.chunk_size,
                required,
            });
        }
        Ok(())
    }
}
