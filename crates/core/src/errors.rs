/// Result type alias for studygate operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for studygate operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Configuration errors
    #[error("configuration error: {message}")]
    Configuration { message: String },

    /// Key-value store errors
    #[error("key-value store {operation} failed: {message}")]
    Kv { operation: String, message: String },

    /// Network-level failures talking to an upstream service
    #[error("upstream '{service}' unreachable at '{endpoint}': {message}")]
    Upstream {
        service: String,
        endpoint: String,
        message: String,
    },

    /// Non-success responses from an upstream service
    #[error("upstream '{service}' returned status {status}")]
    UpstreamStatus {
        service: String,
        status: u16,
        body: String,
    },

    /// HTTP server lifecycle errors
    #[error("server error: {message}")]
    Server { message: String },
}

// Helper methods for creating errors with context
impl Error {
    /// Create a configuration error
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Error::Configuration {
            message: message.into(),
        }
    }

    /// Create a key-value store error
    #[must_use]
    pub fn kv(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Kv {
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// Create an upstream network error
    #[must_use]
    pub fn upstream(
        service: impl Into<String>,
        endpoint: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Error::Upstream {
            service: service.into(),
            endpoint: endpoint.into(),
            message: message.into(),
        }
    }

    /// Create an upstream status error carrying the response body
    #[must_use]
    pub fn upstream_status(service: impl Into<String>, status: u16, body: impl Into<String>) -> Self {
        Error::UpstreamStatus {
            service: service.into(),
            status,
            body: body.into(),
        }
    }

    /// Create a server lifecycle error
    #[must_use]
    pub fn server(message: impl Into<String>) -> Self {
        Error::Server {
            message: message.into(),
        }
    }
}
