//! Layered error definitions
//!
//! Categorized by source: config / frame / queue. Recoverable data
//! anomalies (clock skew, racy size queries) are logged and absorbed at
//! the call site, never surfaced as errors.

use thiserror::Error;

/// Unified error type
#[derive(Debug, Error)]
pub enum PipelineError {
    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ===== Frame Errors =====
    /// Frame payload does not match its declared dimensions
    #[error("invalid frame: {message}")]
    InvalidFrame { message: String },

    // ===== Queue Errors =====
    /// The bounded frame queue was closed while a producer was writing
    #[error("frame queue closed")]
    QueueClosed,

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl PipelineError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create invalid frame error
    pub fn invalid_frame(message: impl Into<String>) -> Self {
        Self::InvalidFrame {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_formats() {
        let err = PipelineError::config_validation("stream.queue_capacity", "must be >= 1");
        assert_eq!(
            err.to_string(),
            "config validation error at 'stream.queue_capacity': must be >= 1"
        );

        let err = PipelineError::QueueClosed;
        assert_eq!(err.to_string(), "frame queue closed");
    }
}
