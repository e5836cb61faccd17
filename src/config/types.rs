//! Configuration type definitions
//!
//! Sections owned by a pipeline module (`[control]`, `[region]`,
//! `[smoothing]`, `[pinch]`, `[display]`) are defined next to that module;
//! the remaining runtime sections live here.

use serde::{Deserialize, Serialize};

use crate::cursor::ScreenGeometry;
use crate::input::DEFAULT_QUEUE_DEPTH;
use crate::relay::DEFAULT_RELAY_CAPACITY;

/// Frame relay configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RelayConfig {
    /// Frames buffered between detector and display (1–2 recommended)
    #[serde(default = "default_relay_capacity")]
    pub capacity: usize,
}

fn default_relay_capacity() -> usize {
    DEFAULT_RELAY_CAPACITY
}

impl RelayConfig {
    /// Capacity to build the relay with; zero becomes one
    pub fn effective_capacity(&self) -> usize {
        self.capacity.max(1)
    }
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            capacity: default_relay_capacity(),
        }
    }
}

/// Screen size override
///
/// When both dimensions are set, the screen is not queried.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScreenConfig {
    /// Screen width in pixels
    #[serde(default)]
    pub width: Option<u32>,

    /// Screen height in pixels
    #[serde(default)]
    pub height: Option<u32>,
}

impl ScreenConfig {
    /// Configured geometry, if both dimensions are present and non-zero
    pub fn geometry(&self) -> Option<ScreenGeometry> {
        match (self.width, self.height) {
            (Some(w), Some(h)) => ScreenGeometry::new(w, h).ok(),
            _ => None,
        }
    }

    /// Exactly one dimension set; such an override is ignored
    pub fn is_partial(&self) -> bool {
        self.width.is_some() != self.height.is_some()
    }
}

/// Mouse sink backend
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SinkBackend {
    /// Inject through `xdotool`
    #[default]
    Xdotool,
    /// Only log pointer actions
    Log,
}

/// Mouse sink configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SinkConfig {
    /// Backend
    #[serde(default)]
    pub backend: SinkBackend,

    /// Commands buffered for the sink worker thread (0 = call inline)
    #[serde(default = "default_queue_depth")]
    pub queue_depth: usize,
}

fn default_queue_depth() -> usize {
    DEFAULT_QUEUE_DEPTH
}

impl Default for SinkConfig {
    fn default() -> Self {
        Self {
            backend: SinkBackend::default(),
            queue_depth: default_queue_depth(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Level when neither `-v` nor `RUST_LOG` is given
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}
