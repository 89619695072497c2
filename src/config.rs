//! Deku - Agent configuration
//!
//! Loaded from TOML. Every field is optional in the file and falls back to
//! the defaults below.
//!
//! ```toml
//! search_time_ms = 1500
//! max_depth = 6
//! parallel = true
//! reserved_thread_fraction = 0.5
//! threefold_repetition = true
//! ```

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;

/// Hard cap on iterative deepening
pub const MAX_DEPTH: u32 = 64;

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AgentConfig {
    /// Wall-clock budget for one move
    pub search_time_ms: u64,
    /// Deepest iteration to run; `None` searches until the deadline
    pub max_depth: Option<u32>,
    /// Search root candidates on a worker pool
    pub parallel: bool,
    /// Share of hardware threads left to other processes
    pub reserved_thread_fraction: f32,
    /// Draw the game when a position occurs for the third time
    pub threefold_repetition: bool,
}

impl Default for AgentConfig {
    fn default() -> Self {
        AgentConfig {
            search_time_ms: 1000,
            max_depth: None,
            parallel: false,
            reserved_thread_fraction: 0.25,
            threefold_repetition: true,
        }
    }
}

impl AgentConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: AgentConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..1.0).contains(&self.reserved_thread_fraction) {
            return Err(ConfigError::Invalid(format!(
                "reserved_thread_fraction must be in [0, 1), got {}",
                self.reserved_thread_fraction
            )));
        }
        if let Some(depth) = self.max_depth {
            if depth == 0 || depth > MAX_DEPTH {
                return Err(ConfigError::Invalid(format!(
                    "max_depth must be between 1 and {}, got {}",
                    MAX_DEPTH, depth
                )));
            }
        }
        Ok(())
    }

    pub fn search_time(&self) -> Duration {
        Duration::from_millis(self.search_time_ms)
    }

    /// Deepest iteration the search may start
    pub fn depth_limit(&self) -> u32 {
        self.max_depth.unwrap_or(MAX_DEPTH)
    }

    /// Worker pool size for the parallel search
    pub fn worker_threads(&self) -> usize {
        worker_threads(num_cpus::get(), self.reserved_thread_fraction)
    }
}

/// Threads left after reserving `reserved` of `available`, at least one
fn worker_threads(available: usize, reserved: f32) -> usize {
    let usable = (available as f32 * (1.0 - reserved)).floor() as usize;
    usable.max(1)
}
