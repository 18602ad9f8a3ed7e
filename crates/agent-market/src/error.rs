//! Error types for market-data operations

use thiserror::Error;

/// Market data specific errors
#[derive(Debug, Error)]
pub enum MarketError {
    /// A required setting is missing or invalid. Fatal at startup.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Invalid stock symbol provided
    #[error("Invalid symbol: {0}")]
    InvalidSymbol(String),

    /// A request argument is out of range
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// The remote service answered with a non-success status
    #[error("HTTP {status} from {endpoint}")]
    HttpStatus { status: u16, endpoint: String },

    /// Network or transport error, including timeouts
    ///
    /// The request URL is stripped, it carries the API key.
    #[error("Network error: {0}")]
    NetworkError(#[source] reqwest::Error),

    /// The remote service answered with JSON of an unexpected shape
    #[error("Unexpected response from {endpoint}: {reason}")]
    UnexpectedResponse { endpoint: String, reason: String },

    /// Data needed for a derived computation is missing
    #[error("Data not available for {symbol}: {reason}")]
    DataUnavailable { symbol: String, reason: String },

    /// A cached value could not be encoded or decoded
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// The key-value store failed or is unreachable
    #[error("Cache error: {0}")]
    CacheError(String),
}

impl MarketError {
    /// Whether this error came from the outbound request to the data provider
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            Self::HttpStatus { .. } | Self::NetworkError(_) | Self::UnexpectedResponse { .. }
        )
    }

    /// Whether the request timed out
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::NetworkError(e) if e.is_timeout())
    }
}

/// Result type alias for market-data operations
pub type Result<T> = std::result::Result<T, MarketError>;

impl From<reqwest::Error> for MarketError {
    fn from(err: reqwest::Error) -> Self {
        MarketError::NetworkError(err.without_url())
    }
}

impl From<redis::RedisError> for MarketError {
    fn from(err: redis::RedisError) -> Self {
        MarketError::CacheError(err.to_string())
    }
}

/// Convert MarketError to agent_core::Error
impl From<MarketError> for agent_core::Error {
    fn from(err: MarketError) -> Self {
        match err {
            MarketError::InvalidSymbol(_) | MarketError::InvalidParameter(_) => {
                agent_core::Error::InvalidParameters(err.to_string())
            }
            other => agent_core::Error::ProcessingFailed(other.to_string()),
        }
    }
}

impl From<agent_utils::EnvError> for MarketError {
    fn from(err: agent_utils::EnvError) -> Self {
        MarketError::ConfigError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = MarketError::InvalidSymbol(String::new());
        assert_eq!(err.to_string(), "Invalid symbol: ");

        let err = MarketError::HttpStatus {
            status: 500,
            endpoint: "v3/profile".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP 500 from v3/profile");
        assert!(err.is_remote());
    }

    #[test]
    fn test_cache_errors_are_not_remote() {
        assert!(!MarketError::CacheError("down".to_string()).is_remote());
        assert!(!MarketError::SerializationError("bad".to_string()).is_remote());
        assert!(!MarketError::ConfigError("FMP_API_KEY".to_string()).is_remote());
    }

    #[test]
    fn test_error_conversion() {
        let err: agent_core::Error = MarketError::InvalidParameter("period".to_string()).into();
        assert!(matches!(err, agent_core::Error::InvalidParameters(_)));

        let err: agent_core::Error = MarketError::HttpStatus {
            status: 503,
            endpoint: "v3/profile".to_string(),
        }
        .into();
        match err {
            agent_core::Error::ProcessingFailed(msg) => assert!(msg.contains("HTTP 503")),
            _ => panic!("Expected ProcessingFailed variant"),
        }
    }
}
