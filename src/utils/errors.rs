//! User-Friendly Error Formatting
//!
//! Turns load and configuration failures into messages with
//! troubleshooting hints.

use std::fmt::Write;

use crate::error::FlavorMapError;

/// Format error for user consumption
///
/// Takes technical error and produces user-friendly message with
/// troubleshooting steps and context.
pub fn format_user_error(error: &anyhow::Error) -> String {
    let mut output = String::new();

    writeln!(&mut output).ok();
    writeln!(&mut output, "╔════════════════════════════════════════════════════════════╗").ok();
    writeln!(&mut output, "║                     ERROR                                  ║").ok();
    writeln!(&mut output, "╚════════════════════════════════════════════════════════════╝").ok();
    writeln!(&mut output).ok();

    match error.downcast_ref::<FlavorMapError>() {
        Some(FlavorMapError::MalformedEscape { line, .. }) => {
            format_truncated_error(&mut output, *line)
        }
        Some(FlavorMapError::Io(_)) => format_io_error(&mut output),
        Some(FlavorMapError::InvalidMimeType { mime, .. }) => format_mime_error(&mut output, mime),
        _ if error.to_string().contains("config") => format_config_error(&mut output),
        _ => {
            writeln!(&mut output, "Unexpected Error").ok();
        }
    }

    writeln!(&mut output).ok();
    writeln!(&mut output, "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━").ok();
    writeln!(&mut output, "Technical Details:").ok();
    writeln!(&mut output).ok();
    writeln!(&mut output, "{:#}", error).ok();
    writeln!(&mut output).ok();
    writeln!(&mut output, "Run with -vv for detailed logs.").ok();

    output
}

fn format_truncated_error(output: &mut String, line: usize) {
    writeln!(output, "Truncated Mapping File").ok();
    writeln!(output).ok();
    writeln!(output, "A \\uXXXX escape on line {} has fewer than 4 hex digits.", line).ok();
    writeln!(output, "The file may have been cut short while being written.").ok();
    writeln!(output).ok();
    writeln!(output, "  → Check the end of the file for a partial line").ok();
    writeln!(output, "  → Write a literal backslash as \\\\").ok();
}

fn format_io_error(output: &mut String) {
    writeln!(output, "Mapping File Unreadable").ok();
    writeln!(output).ok();
    writeln!(output, "  1. File does not exist").ok();
    writeln!(output, "     → Check the paths under [mappings] files").ok();
    writeln!(output, "  2. No read permission").ok();
    writeln!(output, "     → Run: ls -l <file>").ok();
}

fn format_mime_error(output: &mut String, mime: &str) {
    writeln!(output, "Invalid MIME Type").ok();
    writeln!(output).ok();
    writeln!(output, "'{}' is not of the form primary/sub[; name=value]...", mime).ok();
    writeln!(output, "  → Representation is chosen with class=reader|string|byte-stream|...").ok();
}

fn format_config_error(output: &mut String) {
    writeln!(output, "Configuration Error").ok();
    writeln!(output).ok();
    writeln!(output, "  → Check the TOML syntax of the config file").ok();
    writeln!(output, "  → Valid log levels: trace, debug, info, warn, error").ok();
    writeln!(output, "  → Valid log formats: pretty, compact, json").ok();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncated_escape_hint() {
        let err = anyhow::Error::new(FlavorMapError::MalformedEscape { line: 7, found: 1 });
        let text = format_user_error(&err);
        assert!(text.contains("Truncated Mapping File"));
        assert!(text.contains("line 7"));
    }

    #[test]
    fn test_context_is_preserved() {
        let err = anyhow::Error::new(FlavorMapError::invalid_mime("nope", "missing '/' separator"))
            .context("while parsing argument");
        let text = format_user_error(&err);
        assert!(text.contains("Invalid MIME Type"));
        assert!(text.contains("while parsing argument"));
    }

    #[test]
    fn test_config_hint() {
        let err = anyhow::anyhow!("Failed to parse config file");
        assert!(format_user_error(&err).contains("Configuration Error"));
    }
}
