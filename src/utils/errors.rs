//! User-Friendly Error Formatting
//!
//! Turns fatal startup errors into a framed message with troubleshooting
//! hints for the usual suspects: the configuration file, the X11 helper
//! tools, and the detection recording.

use std::fmt::Write;

const RULE: &str = "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━";

/// Format error for user consumption
///
/// Takes technical error and produces user-friendly message with
/// troubleshooting steps and context.
pub fn format_user_error(error: &anyhow::Error) -> String {
    let mut output = String::new();

    writeln!(&mut output).ok();
    writeln!(
        &mut output,
        "╔════════════════════════════════════════════════════════════╗"
    )
    .ok();
    writeln!(
        &mut output,
        "║                     ERROR                                  ║"
    )
    .ok();
    writeln!(
        &mut output,
        "╚════════════════════════════════════════════════════════════╝"
    )
    .ok();
    writeln!(&mut output).ok();

    // Match against the whole context chain, not just the outermost message
    let chain = format!("{:#}", error);

    if chain.contains("config") {
        format_config_error(&mut output);
    } else if chain.contains("xdpyinfo") || chain.contains("screen") {
        format_screen_error(&mut output);
    } else if chain.contains("xdotool") {
        format_xdotool_error(&mut output);
    } else if chain.contains("recording") || chain.contains("replay") {
        format_replay_error(&mut output);
    } else {
        format_generic_error(&mut output, &error.to_string());
    }

    writeln!(&mut output).ok();
    writeln!(&mut output, "{}", RULE).ok();
    writeln!(&mut output, "Technical Details:").ok();
    writeln!(&mut output).ok();
    writeln!(&mut output, "{}", chain).ok();
    writeln!(&mut output).ok();

    writeln!(&mut output, "{}", RULE).ok();
    writeln!(&mut output, "Need Help?").ok();
    writeln!(
        &mut output,
        "  - Run with --verbose for detailed logs: landmark-cursor -vv"
    )
    .ok();
    writeln!(
        &mut output,
        "  - Try a dry run without touching the pointer: landmark-cursor --dry-run"
    )
    .ok();
    writeln!(
        &mut output,
        "╚════════════════════════════════════════════════════════════╝"
    )
    .ok();

    output
}

fn format_config_error(output: &mut String) {
    writeln!(output, "Configuration Error").ok();
    writeln!(output).ok();
    writeln!(output, "Problem with configuration file.").ok();
    writeln!(output).ok();
    writeln!(output, "Common Causes:").ok();
    writeln!(output).ok();
    writeln!(output, "  1. Configuration file not found").ok();
    writeln!(
        output,
        "     → Specify: landmark-cursor --config /path/to/config.toml"
    )
    .ok();
    writeln!(output, "     → Or set LANDMARK_CURSOR_CONFIG").ok();
    writeln!(output, "     → Omit the flag entirely to run on defaults").ok();
    writeln!(output).ok();
    writeln!(output, "  2. Invalid TOML syntax").ok();
    writeln!(output, "     → Check for typos, missing quotes, etc.").ok();
    writeln!(output).ok();
    writeln!(output, "  3. Value out of range").ok();
    writeln!(output, "     → Smoothing factors must be within [0, 1]").ok();
    writeln!(output, "     → Region margins must be within [0, 1)").ok();
    writeln!(
        output,
        "     → Landmarks are a name like \"thumb_tip\" or an index 0-20"
    )
    .ok();
}

fn format_screen_error(output: &mut String) {
    writeln!(output, "Screen Geometry Error").ok();
    writeln!(output).ok();
    writeln!(output, "Could not determine the screen resolution.").ok();
    writeln!(output).ok();
    writeln!(output, "Common Causes:").ok();
    writeln!(output).ok();
    writeln!(output, "  1. xdpyinfo is not installed").ok();
    writeln!(output, "     → Debian/Ubuntu: sudo apt install x11-utils").ok();
    writeln!(output, "     → Fedora: sudo dnf install xdpyinfo").ok();
    writeln!(output).ok();
    writeln!(output, "  2. No X11 display available").ok();
    writeln!(output, "     → Check: echo $DISPLAY (should not be empty)").ok();
    writeln!(output).ok();
    writeln!(output, "  3. Bypass detection").ok();
    writeln!(output, "     → Run with: landmark-cursor --screen 1920x1080").ok();
    writeln!(output, "     → Or set [screen] width/height in config.toml").ok();
}

fn format_xdotool_error(output: &mut String) {
    writeln!(output, "Pointer Control Error").ok();
    writeln!(output).ok();
    writeln!(output, "Could not drive the mouse pointer through xdotool.").ok();
    writeln!(output).ok();
    writeln!(output, "Common Causes:").ok();
    writeln!(output).ok();
    writeln!(output, "  1. xdotool is not installed").ok();
    writeln!(output, "     → Debian/Ubuntu: sudo apt install xdotool").ok();
    writeln!(output).ok();
    writeln!(output, "  2. Running under Wayland without XWayland pointer access").ok();
    writeln!(output, "     → Log in to an X11 session").ok();
    writeln!(output, "     → Or use [sink] backend = \"log\"").ok();
}

fn format_replay_error(output: &mut String) {
    writeln!(output, "Detection Recording Error").ok();
    writeln!(output).ok();
    writeln!(output, "Could not read the detection recording.").ok();
    writeln!(output).ok();
    writeln!(output, "Common Causes:").ok();
    writeln!(output).ok();
    writeln!(output, "  1. Wrong path passed to --replay").ok();
    writeln!(output).ok();
    writeln!(output, "  2. File is not JSON lines").ok();
    writeln!(
        output,
        "     → One object per line: {{\"timestamp_ms\": 0, \"hands\": [...]}}"
    )
    .ok();
    writeln!(output, "     → Each hand is a list of 21 {{x, y, z}} points").ok();
}

fn format_generic_error(output: &mut String, error: &str) {
    writeln!(output, "Cursor Control Error").ok();
    writeln!(output).ok();
    writeln!(output, "An error occurred while running landmark-cursor.").ok();
    writeln!(output).ok();
    writeln!(output, "Error: {}", error).ok();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_user_error() {
        let error = anyhow::anyhow!("something unexpected");
        let formatted = format_user_error(&error);
        assert!(formatted.contains("ERROR"));
        assert!(formatted.contains("Cursor Control Error"));
        assert!(formatted.contains("something unexpected"));
    }

    #[test]
    fn test_config_error_formatting() {
        let error = anyhow::anyhow!("expected a table").context("Failed to parse config file");
        let formatted = format_user_error(&error);
        assert!(formatted.contains("Configuration Error"));
        assert!(formatted.contains("expected a table"));
    }

    #[test]
    fn test_screen_error_matches_on_cause() {
        let error = anyhow::anyhow!("xdpyinfo unavailable: not found")
            .context("Failed to start cursor control");
        let formatted = format_user_error(&error);
        assert!(formatted.contains("Screen Geometry Error"));
        assert!(formatted.contains("--screen"));
    }

    #[test]
    fn test_replay_error_formatting() {
        let error = anyhow::anyhow!("Failed to read detection recording: No such file");
        let formatted = format_user_error(&error);
        assert!(formatted.contains("Detection Recording Error"));
    }
}
