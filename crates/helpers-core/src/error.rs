use thiserror::Error;

/// Maximum number of characters of an upstream body kept in an error.
pub const MAX_ERROR_BODY_CHARS: usize = 500;

/// Application-wide error types.
///
/// This enum represents every failure an adapter call can surface. It uses the
/// `thiserror` crate for ergonomic error handling and automatic conversion from
/// underlying library errors.
///
/// # Error Kinds
///
/// - Configuration: [`AppError::ConfigError`], [`AppError::InvalidUrl`]
/// - Connection: [`AppError::NetworkError`], [`AppError::Timeout`]
/// - Upstream: [`AppError::UpstreamError`]
/// - Parsing: [`AppError::ParseError`], [`AppError::SerializationError`]
/// - Cache I/O: [`AppError::CacheError`] (never returned by adapters, only logged)
///
/// # Examples
///
/// ```no_run
/// use helpers_core::error::AppError;
///
/// fn example() -> Result<(), AppError> {
///     Err(AppError::ConfigError("missing API key".to_string()))
/// }
/// ```
#[derive(Error, Debug)]
pub enum AppError {
    /// Missing or invalid credential or parameter.
    ///
    /// Raised before any network traffic happens: a blank query, a count of
    /// zero, an unset API key or a malformed dataset URI.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Network or connection error.
    ///
    /// This error occurs when a request fails due to connectivity issues,
    /// DNS resolution failures, or the remote server being unreachable.
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Request timeout.
    ///
    /// This error occurs when a request takes longer than the configured timeout.
    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    /// The remote service answered with a non-2xx status.
    ///
    /// Carries the original status code and the (truncated) response body.
    #[error("Upstream error: HTTP {status}: {body}")]
    UpstreamError { status: u16, body: String },

    /// The response did not match the expected schema.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// JSON serialization or deserialization failed.
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// Reading or writing the response cache failed.
    ///
    /// Adapters log this and carry on with the live network payload.
    #[error("Cache error: {0}")]
    CacheError(String),

    /// URL parsing failed.
    ///
    /// This error occurs when an endpoint or dataset URI cannot be parsed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// The catalog has no record for the requested dataset.
    #[error("Dataset not found: {0}")]
    DatasetNotFound(String),

    /// No distribution of the dataset has a download or access URL.
    #[error("No downloadable distribution for dataset: {0}")]
    NoDistribution(String),

    /// HTTP client failure that is neither a connection error nor a timeout.
    #[error("API Client error: {0}")]
    ClientError(String),

    /// Generic application error for cases not covered by specific variants.
    ///
    /// Use this sparingly - prefer creating specific error variants
    /// for better error handling and debugging.
    #[error("Error: {0}")]
    Generic(String),
}

impl AppError {
    /// Builds an [`AppError::UpstreamError`], truncating long bodies.
    pub fn upstream(status: u16, body: &str) -> Self {
        let body = if body.chars().count() > MAX_ERROR_BODY_CHARS {
            body.chars().take(MAX_ERROR_BODY_CHARS).collect()
        } else {
            body.to_string()
        };
        AppError::UpstreamError { status, body }
    }

    /// Returns the upstream HTTP status, if this is an upstream error.
    pub fn status(&self) -> Option<u16> {
        match self {
            AppError::UpstreamError { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns a user-friendly error message suitable for CLI output.
    pub fn user_message(&self) -> String {
        match self {
            AppError::ConfigError(msg) => {
                if msg.contains("API key") {
                    format!(
                        "{}\n   Set BRAVE_SEARCH_API_KEY or run: helpers configure-search <key>",
                        msg
                    )
                } else {
                    format!("Invalid configuration: {}", msg)
                }
            }
            AppError::UpstreamError { status, body } => match status {
                401 | 403 => "The service rejected the credentials.\n   Check your API key."
                    .to_string(),
                404 => "The requested resource does not exist on the remote service.".to_string(),
                429 => "Rate limit reached.\n   Wait a moment and try again.".to_string(),
                s if *s >= 500 => format!(
                    "The remote service failed (HTTP {}).\n   Try again later.",
                    s
                ),
                _ => format!("Remote service error (HTTP {}): {}", status, body),
            },
            AppError::NetworkError(msg) => {
                if msg.contains("11434") {
                    format!("Cannot reach the model server: {}\n   Is Ollama running?", msg)
                } else {
                    format!("Network error: {}\n   Check your internet connection.", msg)
                }
            }
            AppError::Timeout(secs) => {
                format!(
                    "Request timed out after {} seconds.\n   The server may be overloaded. Try again later.",
                    secs
                )
            }
            AppError::ParseError(msg) => {
                format!("Unexpected response format: {}", msg)
            }
            AppError::InvalidUrl(url) => {
                format!(
                    "Invalid URL: {}\n   Example: http://data.europa.eu/88u/dataset/<uuid>",
                    url
                )
            }
            _ => self.to_string(),
        }
    }

    /// Returns true if this error is retryable.
    ///
    /// The adapters never retry on their own; this is a hint for callers.
    ///
    /// # Examples
    ///
    /// ```
    /// use helpers_core::error::AppError;
    ///
    /// // Network errors are retryable
    /// let err = AppError::NetworkError("connection reset".to_string());
    /// assert!(err.is_retryable());
    ///
    /// // Rate limits are retryable (after a delay)
    /// let err = AppError::upstream(429, "slow down");
    /// assert!(err.is_retryable());
    ///
    /// // Bad parameters are NOT retryable
    /// let err = AppError::ConfigError("count must be positive".to_string());
    /// assert!(!err.is_retryable());
    /// ```
    pub fn is_retryable(&self) -> bool {
        match self {
            AppError::NetworkError(_) | AppError::Timeout(_) => true,
            AppError::UpstreamError { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}
