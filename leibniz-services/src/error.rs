//! Client Errors
//!
//! `TigerStyle`: One explicit error type shared by every client trait.
//!
//! Simulators never return these. Real adapters do, and the factory swallows
//! construction errors by falling back to the simulator.

use thiserror::Error;

/// Errors from service clients.
#[derive(Debug, Clone, Error)]
pub enum ClientError {
    /// Real backend support is not compiled in or cannot be loaded
    #[error("{service} backend unavailable: {reason}")]
    BackendUnavailable {
        /// Service kind that could not be constructed
        service: String,
        /// Why it is unavailable
        reason: String,
    },

    /// Client options are invalid
    #[error("invalid configuration: {message}")]
    InvalidConfig {
        /// What was invalid
        message: String,
    },

    /// Could not reach the backend
    #[error("connection error: {message}")]
    Connection {
        /// Connection error message
        message: String,
    },

    /// Request timed out
    #[error("request timed out")]
    Timeout,

    /// Backend rejected the credentials
    #[error("authentication failed")]
    AuthenticationFailed,

    /// Backend returned a non-success status
    #[error("HTTP {status}: {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Response body or error message
        message: String,
    },

    /// Backend spoke the protocol incorrectly
    #[error("protocol error: {message}")]
    Protocol {
        /// Description of the violation
        message: String,
    },

    /// JSON serialization/deserialization error
    #[error("JSON error: {message}")]
    Json {
        /// Description of the JSON error
        message: String,
    },
}

impl ClientError {
    /// Create a backend unavailable error.
    #[must_use]
    pub fn backend_unavailable(service: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::BackendUnavailable {
            service: service.into(),
            reason: reason.into(),
        }
    }

    /// Create an invalid configuration error.
    #[must_use]
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Create a connection error.
    #[must_use]
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Create an API error from a status code and body.
    #[must_use]
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// Create a protocol error.
    #[must_use]
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol {
            message: message.into(),
        }
    }

    /// Create a JSON error.
    #[must_use]
    pub fn json(message: impl Into<String>) -> Self {
        Self::Json {
            message: message.into(),
        }
    }

    /// Check if this error is retryable.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Timeout | Self::Connection { .. } => true,
            Self::Api { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        Self::json(err.to_string())
    }
}

impl From<std::io::Error> for ClientError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::TimedOut => Self::Timeout,
            _ => Self::connection(err.to_string()),
        }
    }
}

#[cfg(any(
    feature = "neo4j",
    feature = "qdrant",
    feature = "meilisearch",
    feature = "openai"
))]
impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_connect() {
            Self::connection("connection failed")
        } else if err.is_decode() {
            Self::json(err.to_string())
        } else {
            Self::connection(err.to_string())
        }
    }
}

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;
