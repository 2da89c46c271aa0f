//! Formatting for operator-facing messages.
//!
//! Everything here writes to stderr: stdout carries the JSON response the
//! pipeline orchestrator reads back.

use console::style;

/// Text of an error line, without printing it.
pub fn format_error(message: &str) -> String {
    format!("{} {}", style("ERROR:").red().bold(), message)
}

/// Format and print an error message in red.
pub fn display_error(message: &str) {
    eprintln!("{}", format_error(message));
}

/// Format and print a success message with green checkmark.
pub fn display_success(message: &str) {
    eprintln!("{} {}", style("✓").green(), message);
}

/// Format and print a status message with yellow arrow.
pub fn display_status(message: &str) {
    eprintln!("{} {}", style("→").yellow(), message);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_error_keeps_message() {
        let text = console::strip_ansi_codes(&format_error("error bumping version: boom")).to_string();
        assert_eq!(text, "ERROR: error bumping version: boom");
    }

    #[test]
    fn test_display_status() {
        // Visual verification test - output is printed to stderr
        display_status("test status");
        display_success("test success");
    }
}
