//! Error types for agent-core

use thiserror::Error;

/// Result type alias for agent-core
pub type Result<T> = std::result::Result<T, Error>;

/// Error type reported by tools to the agent layer
#[derive(Error, Debug)]
pub enum Error {
    /// Generic error message
    #[error("{0}")]
    Generic(String),

    /// The tool input did not match its schema
    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    /// No tool is registered under the requested name
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    /// Tool processing failed
    #[error("Agent processing failed: {0}")]
    ProcessingFailed(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::InvalidParameters(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::UnknownTool("quote".to_string());
        assert_eq!(err.to_string(), "Unknown tool: quote");

        let err = Error::ProcessingFailed("HTTP 500".to_string());
        assert_eq!(err.to_string(), "Agent processing failed: HTTP 500");
    }

    #[test]
    fn test_from_json_error() {
        let json_err = serde_json::from_str::<u32>("\"x\"").unwrap_err();
        let err: Error = json_err.into();
        assert!(matches!(err, Error::InvalidParameters(_)));
    }
}
