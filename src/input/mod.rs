//! OS Input Capabilities
//!
//! The control core talks to the desktop through two narrow capabilities:
//!
//! - [`MouseSink`]: absolute pointer moves and button press/release
//! - [`ScreenGeometryProvider`]: screen resolution, queried once at startup
//!
//! # Implementations
//!
//! | Type | Purpose |
//! |------|---------|
//! | [`XdotoolMouseSink`] | X11 pointer injection via `xdotool` |
//! | [`QueuedMouseSink`] | Worker-thread wrapper, keeps OS latency off the detector path |
//! | [`LoggingMouseSink`] | Dry runs |
//! | [`RecordingMouseSink`] | Tests and replays |
//! | [`XdpyinfoProvider`] | X11 screen size via `xdpyinfo` |
//! | [`FixedGeometryProvider`] | Configured or command-line screen size |
//!
//! # Error Handling
//!
//! Every capability call returns [`Result`]. [`InputError::kind`] sorts
//! failures into configuration, unavailable-resource, and transient
//! classes. A resource missing at startup disables cursor control for the
//! process; transient sink failures are logged and swallowed.

pub mod error;
mod queued;
mod screen;
mod sink;
mod xdotool;

pub use error::{ErrorKind, InputError, Result};
pub use queued::{QueuedMouseSink, BUTTON_RESERVE, DEFAULT_QUEUE_DEPTH};
pub use screen::{
    parse_resolution, parse_xdpyinfo_dimensions, FixedGeometryProvider, ScreenGeometryProvider,
    XdpyinfoProvider,
};
pub use sink::{LoggingMouseSink, MouseAction, MouseButton, MouseSink, RecordingMouseSink};
pub use xdotool::XdotoolMouseSink;

#[cfg(test)]
pub use screen::MockScreenGeometryProvider;
#[cfg(test)]
pub use sink::MockMouseSink;
