//! Error types for authentication operations

/// Errors that can occur while signing requests or managing listen keys
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Invalid API credentials
    #[error("Invalid credentials: {0}")]
    InvalidCredentials(String),

    /// API returned an error body
    #[error("API error {code}: {msg}")]
    Api {
        /// MEXC error code
        code: i64,
        /// Error message
        msg: String,
    },

    /// Failed to parse or encode a payload
    #[error("Parse error: {0}")]
    Parse(String),

    /// Environment variable not set
    #[error("Environment variable not set: {0}")]
    EnvVarNotSet(String),
}

impl AuthError {
    /// Returns true if retrying the same request may succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Http(e) => e.is_timeout() || e.is_connect(),
            _ => false,
        }
    }
}

/// Result type for authentication operations
pub type AuthResult<T> = Result<T, AuthError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AuthError::EnvVarNotSet("MEXC_API_KEY".to_string());
        assert!(err.to_string().contains("MEXC_API_KEY"));

        let err = AuthError::Api {
            code: 700002,
            msg: "Signature for this request is not valid.".into(),
        };
        assert_eq!(err.to_string(), "API error 700002: Signature for this request is not valid.");
        assert!(!err.is_retryable());
    }
}
