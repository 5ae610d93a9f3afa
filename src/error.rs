//! Flavor Map Error Types
//!
//! Errors raised while loading mapping sources, parsing MIME types and
//! mutating the registry.

use thiserror::Error;

/// Result type for flavor map operations
pub type Result<T> = std::result::Result<T, FlavorMapError>;

/// Flavor map error types
#[derive(Error, Debug)]
pub enum FlavorMapError {
    /// A single mapping line could not be decoded
    #[error("Malformed mapping line {line}: {reason}")]
    MalformedLine {
        /// 1-based line number where the logical line starts
        line: usize,
        /// What went wrong
        reason: String,
    },

    /// A `\uXXXX` escape was cut short; the stream is truncated
    #[error("Malformed \\uXXXX escape on line {line}: expected 4 hex digits, found {found}")]
    MalformedEscape {
        /// 1-based line number where the logical line starts
        line: usize,
        /// Number of hex digits actually present
        found: usize,
    },

    /// MIME type string could not be parsed into a flavor
    #[error("Invalid MIME type '{mime}': {reason}")]
    InvalidMimeType {
        /// The offending input
        mime: String,
        /// What went wrong
        reason: String,
    },

    /// A required argument was absent
    #[error("Invalid argument: {0}")]
    InvalidArgument(&'static str),

    /// Mapping source could not be read
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl FlavorMapError {
    /// Create an invalid MIME type error
    pub fn invalid_mime(mime: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidMimeType {
            mime: mime.into(),
            reason: reason.into(),
        }
    }

    /// Returns true if this error aborts a whole configuration load
    ///
    /// Malformed lines are reported and skipped; a truncated escape or an
    /// unreadable source discards the load.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::MalformedEscape { .. } | Self::Io(_))
    }

    /// Classify this error
    pub fn error_type(&self) -> ErrorType {
        classify_error(self)
    }
}

/// Error classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorType {
    /// Configuration stream problems
    Configuration,
    /// Flavor construction problems
    MimeType,
    /// Caller contract violations
    Argument,
    /// I/O failures
    Io,
}

/// Classify error by origin
pub fn classify_error(error: &FlavorMapError) -> ErrorType {
    match error {
        FlavorMapError::MalformedLine { .. } | FlavorMapError::MalformedEscape { .. } => {
            ErrorType::Configuration
        }
        FlavorMapError::InvalidMimeType { .. } => ErrorType::MimeType,
        FlavorMapError::InvalidArgument(_) => ErrorType::Argument,
        FlavorMapError::Io(_) => ErrorType::Io,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = FlavorMapError::MalformedEscape { line: 3, found: 2 };
        assert_eq!(
            err.to_string(),
            "Malformed \\uXXXX escape on line 3: expected 4 hex digits, found 2"
        );

        let err = FlavorMapError::invalid_mime("text", "missing subtype");
        assert_eq!(err.to_string(), "Invalid MIME type 'text': missing subtype");
    }

    #[test]
    fn test_is_fatal() {
        assert!(FlavorMapError::MalformedEscape { line: 1, found: 0 }.is_fatal());
        assert!(FlavorMapError::Io(std::io::Error::other("gone")).is_fatal());
        assert!(!FlavorMapError::MalformedLine {
            line: 1,
            reason: "bad".to_string()
        }
        .is_fatal());
        assert!(!FlavorMapError::InvalidArgument("native").is_fatal());
    }

    #[test]
    fn test_classify_error() {
        assert_eq!(
            classify_error(&FlavorMapError::InvalidArgument("flavor")),
            ErrorType::Argument
        );
        assert_eq!(
            FlavorMapError::invalid_mime("x", "y").error_type(),
            ErrorType::MimeType
        );
        assert_eq!(
            FlavorMapError::MalformedLine {
                line: 2,
                reason: "z".to_string()
            }
            .error_type(),
            ErrorType::Configuration
        );
    }
}
