use thiserror::Error;

#[derive(Debug, Error)]
pub enum RiotError {
    #[error("{message}")]
    Configuration { message: String },

    #[error("transport error: {message}")]
    Transport { message: String },

    /// Error reported by the provider, either as an HTTP response with
    /// status >= 400 or as an `error` parameter on the redirect callback.
    /// `status` is 0 when no HTTP response of ours was involved.
    #[error("{message}")]
    Provider { message: String, status: u16 },

    #[error("invalid json response: {message}")]
    ResponseFormat { message: String },

    #[error("url parse error: {0}")]
    Url(#[from] url::ParseError),

    #[error("missing authorization code in callback url")]
    MissingAuthorizationCode,

    #[cfg(feature = "local-server")]
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(feature = "local-server")]
    #[error("invalid redirect uri: {0}")]
    InvalidRedirectUri(String),

    #[cfg(feature = "local-server")]
    #[error("local server timed out after {timeout:?}")]
    LocalServerTimeout { timeout: std::time::Duration },
}

impl RiotError {
    /// Numeric status carried by provider errors, for callers branching on
    /// the HTTP code. 0 marks a provider error with no HTTP response.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Provider { status, .. } => Some(*status),
            _ => None,
        }
    }
}
