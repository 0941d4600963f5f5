/// Failure of any external model or search call. Never recovered locally:
/// it ends the current turn and is shown to the user.
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderError {
    NetworkError(String),
    ApiError { status: u16, message: String },
    InvalidResponse(String),
    MissingCredentials(String),
    RateLimitExceeded,
    ServiceUnavailable(String),
}

impl ProviderError {
    /// Whether a retry policy may try the call again.
    pub fn is_transient(&self) -> bool {
        match self {
            ProviderError::NetworkError(_)
            | ProviderError::RateLimitExceeded
            | ProviderError::ServiceUnavailable(_) => true,
            ProviderError::ApiError { status, .. } => *status >= 500,
            ProviderError::InvalidResponse(_) | ProviderError::MissingCredentials(_) => false,
        }
    }

    pub fn from_status(status: u16, message: String) -> Self {
        match status {
            429 => ProviderError::RateLimitExceeded,
            503 => ProviderError::ServiceUnavailable(message),
            _ => ProviderError::ApiError { status, message },
        }
    }
}

impl std::fmt::Display for ProviderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderError::NetworkError(msg) => write!(f, "Network error: {}", msg),
            ProviderError::ApiError { status, message } => {
                write!(f, "API error ({}): {}", status, message)
            }
            ProviderError::InvalidResponse(msg) => write!(f, "Invalid response: {}", msg),
            ProviderError::MissingCredentials(name) => {
                write!(f, "Missing credentials: {} is not set", name)
            }
            ProviderError::RateLimitExceeded => write!(f, "Rate limit exceeded"),
            ProviderError::ServiceUnavailable(msg) => write!(f, "Service unavailable: {}", msg),
        }
    }
}

impl std::error::Error for ProviderError {}
