//! Error types for the neardup-rs library.
//!
//! Every failure in this crate is a contract violation (bad configuration,
//! mismatched fingerprint widths, malformed serialized input) rather than a
//! transient condition, so errors are raised per call and never retried.

use std::io;

use thiserror::Error;

/// Main result type for neardup operations.
pub type Result<T> = std::result::Result<T, NeardupError>;

/// Error type for all neardup operations.
#[derive(Error, Debug)]
pub enum NeardupError {
    /// Two fingerprints of different widths were compared, combined, or one
    /// was inserted into an index of a different established width.
    #[error("Size mismatch in {operation}: expected {expected} bits, got {actual} bits")]
    SizeMismatch {
        /// Width the operation was established with
        expected: u32,
        /// Width of the offending fingerprint
        actual: u32,
        /// Operation that detected the mismatch
        operation: &'static str,
    },

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Config {
        /// Error description
        message: String,
        /// Configuration field that caused the error
        field: Option<String>,
    },

    /// Validation errors for input data
    #[error("Validation error: {message}")]
    Validation {
        /// Error description
        message: String,
        /// Field or input that failed validation
        field: Option<String>,
    },

    /// I/O related errors
    #[error("I/O error: {message}")]
    Io {
        /// Human-readable error message
        message: String,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// Serialization/deserialization errors
    #[error("Serialization error: {message}")]
    Serialization {
        /// Error description
        message: String,
        /// Data type being serialized
        data_type: Option<String>,
        /// Underlying serialization error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl NeardupError {
    /// Create a new size mismatch error
    pub fn size_mismatch(expected: u32, actual: u32, operation: &'static str) -> Self {
        Self::SizeMismatch {
            expected,
            actual,
            operation,
        }
    }

    /// Create a new configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            field: None,
        }
    }

    /// Create a new configuration error with field context
    pub fn config_field(message: impl Into<String>, field: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    /// Create a new validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            field: None,
        }
    }

    /// Create a new validation error with field context
    pub fn validation_field(message: impl Into<String>, field: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    /// Create a new I/O error with context
    pub fn io(message: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source,
        }
    }

    /// Returns true for [`NeardupError::SizeMismatch`].
    pub fn is_size_mismatch(&self) -> bool {
        matches!(self, Self::SizeMismatch { .. })
    }

    /// Returns true for [`NeardupError::Config`].
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config { .. })
    }

    /// Prefix the error message with additional context
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        match &mut self {
            Self::Config { message, .. }
            | Self::Validation { message, .. }
            | Self::Io { message, .. }
            | Self::Serialization { message, .. } => {
                *message = format!("{}: {message}", context.into());
            }
            Self::SizeMismatch { .. } => {}
        }
        self
    }
}

impl From<io::Error> for NeardupError {
    fn from(err: io::Error) -> Self {
        Self::io("I/O operation failed", err)
    }
}

impl From<serde_json::Error> for NeardupError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            message: format!("JSON serialization failed: {err}"),
            data_type: Some("JSON".to_string()),
            source: Some(Box::new(err)),
        }
    }
}

impl From<serde_yaml::Error> for NeardupError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Serialization {
            message: format!("YAML serialization failed: {err}"),
            data_type: Some("YAML".to_string()),
            source: Some(Box::new(err)),
        }
    }
}

/// Result extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Add context to an error result
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;

    /// Add static context to an error result
    fn context(self, msg: &'static str) -> Result<T>;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: Into<NeardupError>,
{
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| e.into().with_context(f()))
    }

    fn context(self, msg: &'static str) -> Result<T> {
        self.map_err(|e| e.into().with_context(msg))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = NeardupError::config("Invalid configuration");
        assert!(err.is_config());

        let err = NeardupError::size_mismatch(64, 32, "hamming_distance");
        assert!(err.is_size_mismatch());
        assert_eq!(
            err.to_string(),
            "Size mismatch in hamming_distance: expected 64 bits, got 32 bits"
        );
    }

    #[test]
    fn test_config_field_error() {
        let err = NeardupError::config_field("Invalid value", "block_count");

        if let NeardupError::Config { message, field } = err {
            assert_eq!(message, "Invalid value");
            assert_eq!(field, Some("block_count".to_string()));
        } else {
            panic!("Expected Config error");
        }
    }

    #[test]
    fn test_result_extension() {
        let result: std::result::Result<i32, std::io::Error> = Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "File not found",
        ));

        let err = result
            .context("Failed to read configuration file")
            .unwrap_err();
        assert!(err
            .to_string()
            .contains("Failed to read configuration file"));
    }

    #[test]
    fn test_size_mismatch_ignores_context() {
        let err = NeardupError::size_mismatch(64, 8, "add").with_context("ignored");
        assert_eq!(
            err.to_string(),
            "Size mismatch in add: expected 64 bits, got 8 bits"
        );
    }

    #[test]
    fn test_yaml_error_conversion() {
        let yaml_err = serde_yaml::from_str::<u32>("not: [a number").unwrap_err();
        let err: NeardupError = yaml_err.into();
        assert!(matches!(
            err,
            NeardupError::Serialization {
                data_type: Some(ref kind),
                ..
            } if kind == "YAML"
        ));
    }
}
