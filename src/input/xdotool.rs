//! X11 pointer injection through `xdotool`

use std::process::Command;
use tracing::{info, trace};

use crate::input::error::{InputError, Result};
use crate::input::sink::{MouseButton, MouseSink};

const XDOTOOL: &str = "xdotool";

/// Mouse sink that shells out to `xdotool`
#[derive(Debug)]
pub struct XdotoolMouseSink {
    binary: String,
}

impl XdotoolMouseSink {
    /// Check that the binary runs, then build the sink.
    ///
    /// A failure here means the sink is unavailable for the whole process.
    pub fn probe() -> Result<Self> {
        Self::probe_binary(XDOTOOL)
    }

    /// Probe a specific binary path
    pub fn probe_binary(binary: &str) -> Result<Self> {
        let output = Command::new(binary)
            .arg("version")
            .output()
            .map_err(|e| InputError::CommandUnavailable {
                command: binary.to_string(),
                reason: e.to_string(),
            })?;

        if !output.status.success() {
            return Err(InputError::CommandUnavailable {
                command: binary.to_string(),
                reason: output.status.to_string(),
            });
        }

        info!(
            "Mouse sink: {}",
            String::from_utf8_lossy(&output.stdout).trim()
        );

        Ok(Self {
            binary: binary.to_string(),
        })
    }

    fn run(&self, args: &[String]) -> Result<()> {
        trace!("{} {}", self.binary, args.join(" "));

        let status = Command::new(&self.binary).args(args).status()?;
        if status.success() {
            Ok(())
        } else {
            Err(InputError::CommandFailed {
                command: format!("{} {}", self.binary, args.join(" ")),
                status: status.to_string(),
            })
        }
    }
}

impl MouseSink for XdotoolMouseSink {
    fn set_position(&mut self, x: i32, y: i32) -> Result<()> {
        self.run(&["mousemove".to_string(), x.to_string(), y.to_string()])
    }

    fn press(&mut self, button: MouseButton) -> Result<()> {
        self.run(&["mousedown".to_string(), button.x11_button().to_string()])
    }

    fn release(&mut self, button: MouseButton) -> Result<()> {
        self.run(&["mouseup".to_string(), button.x11_button().to_string()])
    }
}
