//! Screen geometry providers
//!
//! Geometry is queried once at startup. Any failure makes cursor control
//! unavailable for the process rather than running with a guessed size.

use std::process::Command;
use tracing::debug;

use crate::cursor::ScreenGeometry;
use crate::input::error::{InputError, Result};

/// Source of the screen resolution
#[cfg_attr(test, mockall::automock)]
pub trait ScreenGeometryProvider {
    /// Current screen size in pixels
    fn screen_resolution(&self) -> Result<ScreenGeometry>;
}

/// Queries the X server through `xdpyinfo`
#[derive(Debug, Default)]
pub struct XdpyinfoProvider;

impl XdpyinfoProvider {
    /// Create the provider
    pub fn new() -> Self {
        Self
    }
}

impl ScreenGeometryProvider for XdpyinfoProvider {
    fn screen_resolution(&self) -> Result<ScreenGeometry> {
        let output = Command::new("xdpyinfo")
            .output()
            .map_err(|e| InputError::CommandUnavailable {
                command: "xdpyinfo".to_string(),
                reason: e.to_string(),
            })?;

        if !output.status.success() {
            return Err(InputError::ScreenUnavailable(format!(
                "xdpyinfo exited with {}",
                output.status
            )));
        }

        let geometry = parse_xdpyinfo_dimensions(&String::from_utf8_lossy(&output.stdout))?;
        debug!(
            "xdpyinfo reports {}x{}",
            geometry.width(),
            geometry.height()
        );
        Ok(geometry)
    }
}

/// Extract the first `dimensions:    WxH pixels (...)` line
pub fn parse_xdpyinfo_dimensions(output: &str) -> Result<ScreenGeometry> {
    let dims = output
        .lines()
        .map(str::trim)
        .find_map(|line| line.strip_prefix("dimensions:"))
        .and_then(|rest| rest.split_whitespace().next())
        .ok_or_else(|| InputError::ParseError("no 'dimensions:' line in xdpyinfo output".into()))?;

    parse_resolution(dims)
}

/// Parse `WIDTHxHEIGHT`
pub fn parse_resolution(text: &str) -> Result<ScreenGeometry> {
    let (w, h) = text
        .trim()
        .split_once(['x', 'X'])
        .ok_or_else(|| InputError::ParseError(format!("expected WxH, got '{}'", text)))?;

    let width: u32 = w
        .trim()
        .parse()
        .map_err(|_| InputError::ParseError(format!("bad width '{}'", w)))?;
    let height: u32 = h
        .trim()
        .parse()
        .map_err(|_| InputError::ParseError(format!("bad height '{}'", h)))?;

    ScreenGeometry::new(width, height).map_err(|e| InputError::ScreenUnavailable(e.to_string()))
}

/// Fixed geometry from configuration or the command line
#[derive(Debug, Clone, Copy)]
pub struct FixedGeometryProvider {
    geometry: ScreenGeometry,
}

impl FixedGeometryProvider {
    /// Always report `geometry`
    pub fn new(geometry: ScreenGeometry) -> Self {
        Self { geometry }
    }
}

impl ScreenGeometryProvider for FixedGeometryProvider {
    fn screen_resolution(&self) -> Result<ScreenGeometry> {
        Ok(self.geometry)
    }
}
