//! Active-region cursor mapping
//!
//! Crops the camera frame to a margin-defined active region and rescales it
//! onto the full screen. Points outside the region saturate at the screen
//! edges instead of extrapolating.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::landmarks::NormalizedPoint;

/// Mapping errors
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum MappingError {
    /// Margins leave no area to map
    #[error("Degenerate active region: {active_width:.3} x {active_height:.3} (margins too large)")]
    DegenerateRegion {
        /// 1 - margin_left - margin_right
        active_width: f64,
        /// 1 - margin_top - margin_bottom
        active_height: f64,
    },

    /// Landmark coordinates are NaN or infinite
    #[error("Non-finite landmark position ({0}, {1})")]
    NonFinitePoint(f64, f64),

    /// Screen size with a zero dimension
    #[error("Invalid screen geometry: {0}x{1}")]
    InvalidGeometry(u32, u32),
}

/// Screen dimensions in pixels, fixed for the process lifetime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScreenGeometry {
    width: u32,
    height: u32,
}

impl ScreenGeometry {
    /// Both dimensions must be positive
    pub fn new(width: u32, height: u32) -> Result<Self, MappingError> {
        if width == 0 || height == 0 {
            return Err(MappingError::InvalidGeometry(width, height));
        }
        Ok(Self { width, height })
    }

    /// Width in pixels
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Screen center in pixels
    pub fn center(&self) -> (f64, f64) {
        (self.width as f64 / 2.0, self.height as f64 / 2.0)
    }
}

/// Camera-frame margins excluded from cursor control.
///
/// Each margin is a fraction of the frame; e.g. `margin_left = 0.1` ignores
/// the leftmost 10% of the camera view.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActiveRegion {
    /// Ignored fraction on the left
    #[serde(default = "default_margin_left")]
    pub margin_left: f64,
    /// Ignored fraction on the right
    #[serde(default = "default_margin_right")]
    pub margin_right: f64,
    /// Ignored fraction at the top
    #[serde(default = "default_margin_top")]
    pub margin_top: f64,
    /// Ignored fraction at the bottom
    #[serde(default = "default_margin_bottom")]
    pub margin_bottom: f64,
}

fn default_margin_left() -> f64 {
    0.3
}
fn default_margin_right() -> f64 {
    0.1
}
fn default_margin_top() -> f64 {
    0.3
}
fn default_margin_bottom() -> f64 {
    0.15
}

impl Default for ActiveRegion {
    fn default() -> Self {
        Self {
            margin_left: default_margin_left(),
            margin_right: default_margin_right(),
            margin_top: default_margin_top(),
            margin_bottom: default_margin_bottom(),
        }
    }
}

impl ActiveRegion {
    /// Region from explicit margins (left, right, top, bottom)
    pub fn new(margin_left: f64, margin_right: f64, margin_top: f64, margin_bottom: f64) -> Self {
        Self {
            margin_left,
            margin_right,
            margin_top,
            margin_bottom,
        }
    }

    /// Region covering the whole frame
    pub fn full_frame() -> Self {
        Self::new(0.0, 0.0, 0.0, 0.0)
    }

    /// Horizontal fraction of the frame that maps to the screen
    pub fn active_width(&self) -> f64 {
        1.0 - self.margin_left - self.margin_right
    }

    /// Vertical fraction of the frame that maps to the screen
    pub fn active_height(&self) -> f64 {
        1.0 - self.margin_top - self.margin_bottom
    }

    /// Fails if the margins leave no area on either axis
    pub fn check(&self) -> Result<(), MappingError> {
        let active_width = self.active_width();
        let active_height = self.active_height();

        // NaN margins fail here too
        if !(active_width > 0.0 && active_height > 0.0) {
            return Err(MappingError::DegenerateRegion {
                active_width,
                active_height,
            });
        }
        Ok(())
    }
}

/// Maps landmark positions into absolute (unsmoothed) screen pixels
#[derive(Debug, Clone, Copy)]
pub struct CursorMapper {
    region: ActiveRegion,
}

impl CursorMapper {
    /// Create a mapper for the given active region
    pub fn new(region: ActiveRegion) -> Self {
        Self { region }
    }

    /// Active region in use
    pub fn region(&self) -> &ActiveRegion {
        &self.region
    }

    /// Map a normalized landmark to raw screen coordinates.
    ///
    /// Output lies in `[0, width] x [0, height]`; final pixel clamping is
    /// applied after smoothing.
    pub fn map(
        &self,
        point: &NormalizedPoint,
        geometry: &ScreenGeometry,
    ) -> Result<(f64, f64), MappingError> {
        self.region.check()?;

        if !point.x.is_finite() || !point.y.is_finite() {
            return Err(MappingError::NonFinitePoint(point.x, point.y));
        }

        let norm_x =
            ((point.x - self.region.margin_left) / self.region.active_width()).clamp(0.0, 1.0);
        let norm_y =
            ((point.y - self.region.margin_top) / self.region.active_height()).clamp(0.0, 1.0);

        Ok((
            norm_x * geometry.width() as f64,
            norm_y * geometry.height() as f64,
        ))
    }
}
