//! Relay errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("Invalid webhook url '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("No tokio runtime available to run the relay")]
    NoRuntime,

    #[error("Webhook endpoint cannot change while the relay is registered")]
    EndpointLocked,

    #[error("HTTP client error: {0}")]
    Client(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_url_error() {
        let err = RelayError::InvalidUrl {
            url: "nope".to_string(),
            reason: "relative URL without a base".to_string(),
        };
        assert!(err.to_string().contains("nope"));
        assert!(err.to_string().contains("relative URL"));
    }

    #[test]
    fn test_endpoint_locked_error() {
        assert!(RelayError::EndpointLocked.to_string().contains("registered"));
    }
}
