//! Configuration management
//!
//! Handles loading, validation, and merging of configuration from:
//! - TOML files
//! - CLI arguments
//!
//! Every key is optional; a missing file section falls back to the
//! built-in defaults.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::warn;

pub mod types;

pub use types::{LoggingConfig, RelayConfig, ScreenConfig, SinkBackend, SinkConfig};

use crate::control::{ControlConfig, ControlLoopConfig};
use crate::cursor::{ActiveRegion, ScreenGeometry, SmoothingConfig, SmoothingMode};
use crate::gesture::PinchConfig;
use crate::runtime::DisplayConfig;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// Cursor control switches
    #[serde(default)]
    pub control: ControlConfig,
    /// Camera active region
    #[serde(default)]
    pub region: ActiveRegion,
    /// Smoothing filter
    #[serde(default)]
    pub smoothing: SmoothingConfig,
    /// Pinch-to-click gesture
    #[serde(default)]
    pub pinch: PinchConfig,
    /// Frame relay
    #[serde(default)]
    pub relay: RelayConfig,
    /// Display loop
    #[serde(default)]
    pub display: DisplayConfig,
    /// Screen size override
    #[serde(default)]
    pub screen: ScreenConfig,
    /// Mouse sink
    #[serde(default)]
    pub sink: SinkConfig,
    /// Logging
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let config = Self::parse_file(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a file without validating it
    pub fn parse_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&content).context("Failed to parse config file")
    }

    /// Create default configuration
    pub fn default_config() -> Self {
        Config {
            control: ControlConfig::default(),
            region: ActiveRegion::default(),
            smoothing: SmoothingConfig::default(),
            pinch: PinchConfig::default(),
            relay: RelayConfig::default(),
            display: DisplayConfig::default(),
            screen: ScreenConfig::default(),
            sink: SinkConfig::default(),
            logging: LoggingConfig::default(),
        }
    }

    /// Validate configuration
    ///
    /// Values that cannot mean anything are rejected. A region with no area
    /// and inverted velocity thresholds are accepted with a warning; the
    /// pipeline copes with both at run time.
    pub fn validate(&self) -> Result<()> {
        // Smoothing factors
        let factors = [
            ("fixed_factor", self.smoothing.fixed_factor),
            ("adaptive_min_factor", self.smoothing.adaptive_min_factor),
            ("adaptive_max_factor", self.smoothing.adaptive_max_factor),
        ];
        for (name, value) in factors {
            if !(0.0..=1.0).contains(&value) {
                anyhow::bail!("smoothing.{} must be within [0, 1], got {}", name, value);
            }
        }

        let thresholds = [
            (
                "adaptive_low_velocity_threshold",
                self.smoothing.adaptive_low_velocity_threshold,
            ),
            (
                "adaptive_high_velocity_threshold",
                self.smoothing.adaptive_high_velocity_threshold,
            ),
        ];
        for (name, value) in thresholds {
            if !(value >= 0.0 && value.is_finite()) {
                anyhow::bail!("smoothing.{} must be non-negative, got {}", name, value);
            }
        }

        // Region margins
        let margins = [
            ("margin_left", self.region.margin_left),
            ("margin_right", self.region.margin_right),
            ("margin_top", self.region.margin_top),
            ("margin_bottom", self.region.margin_bottom),
        ];
        for (name, value) in margins {
            if !(0.0..1.0).contains(&value) {
                anyhow::bail!("region.{} must be within [0, 1), got {}", name, value);
            }
        }

        // Pinch
        if !(self.pinch.distance_threshold > 0.0 && self.pinch.distance_threshold.is_finite()) {
            anyhow::bail!(
                "pinch.distance_threshold must be positive, got {}",
                self.pinch.distance_threshold
            );
        }
        if self.pinch.landmarks.0 == self.pinch.landmarks.1 {
            anyhow::bail!(
                "pinch.landmarks must name two different landmarks, got {} twice",
                self.pinch.landmarks.0
            );
        }

        if self.display.poll_fps == 0 {
            anyhow::bail!("display.poll_fps must be at least 1");
        }

        if matches!(self.screen.width, Some(0)) || matches!(self.screen.height, Some(0)) {
            anyhow::bail!("screen.width and screen.height must be non-zero when set");
        }

        if !LOG_LEVELS.contains(&self.logging.level.to_lowercase().as_str()) {
            anyhow::bail!(
                "Invalid log level: {} (expected one of {})",
                self.logging.level,
                LOG_LEVELS.join(", ")
            );
        }

        // Tolerated, but almost certainly a mistake
        if self.relay.capacity == 0 {
            warn!("relay.capacity is 0, using 1");
        }
        if self.screen.is_partial() {
            warn!(
                "Only one of screen.width/screen.height is set ({:?}x{:?}); \
                 the override is ignored and the screen will be queried",
                self.screen.width,
                self.screen.height
            );
        }
        if let Err(e) = self.region.check() {
            warn!("{}; cursor control will ignore hand frames", e);
        }
        if self.smoothing.mode == SmoothingMode::Adaptive && self.smoothing.thresholds_inverted() {
            warn!(
                "smoothing.adaptive_high_velocity_threshold ({}) is not above the low threshold ({}); \
                 the maximum factor will always be used",
                self.smoothing.adaptive_high_velocity_threshold,
                self.smoothing.adaptive_low_velocity_threshold
            );
        }

        Ok(())
    }

    /// Override config with CLI arguments
    pub fn with_overrides(mut self, dry_run: bool, screen: Option<ScreenGeometry>) -> Self {
        if dry_run {
            self.sink.backend = SinkBackend::Log;
        }

        if let Some(geometry) = screen {
            self.screen.width = Some(geometry.width());
            self.screen.height = Some(geometry.height());
        }

        self
    }

    /// Sections consumed by the control loop
    pub fn control_loop_config(&self) -> ControlLoopConfig {
        ControlLoopConfig {
            control: self.control,
            region: self.region,
            smoothing: self.smoothing,
            pinch: self.pinch,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::default_config()
    }
}
