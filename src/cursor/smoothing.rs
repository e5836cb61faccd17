//! Adaptive Cursor Smoothing
//!
//! Exponential moving average over the mapped cursor position:
//!
//! ```text
//! target = α * raw + (1 - α) * last_target
//! ```
//!
//! Higher α means more responsive, less smoothing. In adaptive mode α is
//! chosen per frame from the landmark's velocity, measured in normalized
//! camera coordinates so the behaviour does not depend on screen resolution:
//!
//! ```text
//!   α
//!   max ┤            ┌──────────
//!       │           /
//!       │          /
//!   min ┤─────────┘
//!       └─────────┬──┬──────────> velocity
//!                low  high
//! ```
//!
//! Slow movement (jitter) gets heavy smoothing, deliberate movement stays
//! responsive.

use serde::{Deserialize, Serialize};
use tracing::trace;

use super::mapper::ScreenGeometry;
use crate::landmarks::NormalizedPoint;

/// How the smoothing factor is chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SmoothingMode {
    /// Constant `fixed_factor`
    Fixed,
    /// Velocity-dependent factor between the adaptive bounds
    #[default]
    Adaptive,
}

/// Smoothing filter configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SmoothingConfig {
    /// Factor selection mode
    #[serde(default)]
    pub mode: SmoothingMode,

    /// Factor in fixed mode, and in adaptive mode before a velocity exists
    #[serde(default = "default_fixed_factor")]
    pub fixed_factor: f64,

    /// Factor applied at or below the low velocity threshold
    #[serde(default = "default_min_factor")]
    pub adaptive_min_factor: f64,

    /// Factor applied at or above the high velocity threshold
    #[serde(default = "default_max_factor")]
    pub adaptive_max_factor: f64,

    /// Per-frame normalized displacement treated as jitter
    #[serde(default = "default_low_threshold")]
    pub adaptive_low_velocity_threshold: f64,

    /// Per-frame normalized displacement treated as intentional movement
    #[serde(default = "default_high_threshold")]
    pub adaptive_high_velocity_threshold: f64,
}

fn default_fixed_factor() -> f64 {
    0.7
}
fn default_min_factor() -> f64 {
    0.2
}
fn default_max_factor() -> f64 {
    0.85
}
fn default_low_threshold() -> f64 {
    0.003
}
fn default_high_threshold() -> f64 {
    0.025
}

impl Default for SmoothingConfig {
    fn default() -> Self {
        Self {
            mode: SmoothingMode::default(),
            fixed_factor: default_fixed_factor(),
            adaptive_min_factor: default_min_factor(),
            adaptive_max_factor: default_max_factor(),
            adaptive_low_velocity_threshold: default_low_threshold(),
            adaptive_high_velocity_threshold: default_high_threshold(),
        }
    }
}

impl SmoothingConfig {
    /// Fixed-factor configuration
    pub fn fixed(factor: f64) -> Self {
        Self {
            mode: SmoothingMode::Fixed,
            fixed_factor: factor,
            ..Self::default()
        }
    }

    /// True when the velocity thresholds cannot be interpolated between
    pub fn thresholds_inverted(&self) -> bool {
        self.adaptive_high_velocity_threshold <= self.adaptive_low_velocity_threshold
    }
}

/// Last emitted (filtered) cursor position
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CursorState {
    last: Option<(f64, f64)>,
    is_first_sample: bool,
}

impl Default for CursorState {
    fn default() -> Self {
        Self::new()
    }
}

impl CursorState {
    /// No history; the next sample is taken as-is
    pub fn new() -> Self {
        Self {
            last: None,
            is_first_sample: true,
        }
    }

    /// Seeded at screen center; the next sample still snaps
    pub fn centered(geometry: &ScreenGeometry) -> Self {
        Self {
            last: Some(geometry.center()),
            is_first_sample: true,
        }
    }

    /// History at `(x, y)`; the next sample is smoothed against it
    pub fn continuing_from(x: f64, y: f64) -> Self {
        Self {
            last: Some((x, y)),
            is_first_sample: false,
        }
    }

    /// Last filtered target, if any
    pub fn last(&self) -> Option<(f64, f64)> {
        self.last
    }

    /// True when the next sample will snap without smoothing
    pub fn is_first_sample(&self) -> bool {
        self.is_first_sample || self.last.is_none()
    }

    /// Force the next sample to snap
    pub fn reset(&mut self) {
        self.last = None;
        self.is_first_sample = true;
    }
}

/// Previous normalized landmark position for velocity estimation
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct VelocityState {
    prev: Option<(f64, f64)>,
}

impl VelocityState {
    /// Empty state
    pub fn new() -> Self {
        Self::default()
    }

    /// Previous sample, if any
    pub fn previous(&self) -> Option<(f64, f64)> {
        self.prev
    }

    /// Forget the previous sample (tracking lost)
    pub fn clear(&mut self) {
        self.prev = None;
    }

    /// Record a sample and return the displacement from the previous one
    fn advance(&mut self, point: &NormalizedPoint) -> Option<f64> {
        let velocity = self.prev.map(|(px, py)| {
            let dx = point.x - px;
            let dy = point.y - py;
            (dx * dx + dy * dy).sqrt()
        });
        self.prev = Some((point.x, point.y));
        velocity
    }
}

/// Final integer cursor position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScreenPosition {
    /// Horizontal pixel
    pub x: i32,
    /// Vertical pixel
    pub y: i32,
}

/// Exponential smoothing filter with optional velocity-adaptive gain.
///
/// The filter itself is stateless; per-stream state lives in
/// [`CursorState`] and [`VelocityState`] owned by the caller.
#[derive(Debug, Clone, Copy)]
pub struct SmoothingFilter {
    config: SmoothingConfig,
}

impl SmoothingFilter {
    /// Create a filter
    pub fn new(config: SmoothingConfig) -> Self {
        Self { config }
    }

    /// Filter configuration
    pub fn config(&self) -> &SmoothingConfig {
        &self.config
    }

    /// Smoothing factor for a given per-frame velocity.
    ///
    /// `None` means no previous sample exists, which selects the fixed factor.
    pub fn effective_factor(&self, velocity: Option<f64>) -> f64 {
        let cfg = &self.config;

        let velocity = match (cfg.mode, velocity) {
            (SmoothingMode::Adaptive, Some(v)) => v,
            _ => return cfg.fixed_factor,
        };

        let (min, max) = (cfg.adaptive_min_factor, cfg.adaptive_max_factor);
        let (low, high) = (
            cfg.adaptive_low_velocity_threshold,
            cfg.adaptive_high_velocity_threshold,
        );

        if cfg.thresholds_inverted() {
            return max;
        }
        if velocity <= low {
            return min;
        }
        if velocity >= high {
            return max;
        }

        let t = (velocity - low) / (high - low);
        // f64::clamp panics on NaN bounds; max/min chains do not
        (min + t * (max - min)).max(min.min(max)).min(max.max(min))
    }

    /// Filter one raw screen position.
    ///
    /// `raw` is the mapped (unsmoothed) screen position, `landmark` the
    /// normalized control landmark it came from. Updates `state` with the
    /// filtered target and `velocity` with the landmark.
    pub fn update(
        &self,
        raw: (f64, f64),
        landmark: &NormalizedPoint,
        state: &mut CursorState,
        velocity: &mut VelocityState,
        geometry: &ScreenGeometry,
    ) -> ScreenPosition {
        let speed = velocity.advance(landmark);

        let target = match state.last {
            Some(last) if !state.is_first_sample => {
                let alpha = self.effective_factor(speed);
                trace!(
                    "Smoothing: velocity={:?}, alpha={:.3}",
                    speed.map(|v| (v * 1000.0).round() / 1000.0),
                    alpha
                );
                (
                    alpha * raw.0 + (1.0 - alpha) * last.0,
                    alpha * raw.1 + (1.0 - alpha) * last.1,
                )
            }
            _ => {
                state.is_first_sample = false;
                raw
            }
        };

        state.last = Some(target);

        ScreenPosition {
            x: clamp_to_pixel(target.0, geometry.width()),
            y: clamp_to_pixel(target.1, geometry.height()),
        }
    }
}

fn clamp_to_pixel(value: f64, extent: u32) -> i32 {
    let max = extent.saturating_sub(1) as f64;
    value.clamp(0.0, max) as i32
}
