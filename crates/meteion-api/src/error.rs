//! Control server errors.

use thiserror::Error;

/// Transport failures reported through the exception callback.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The listener could not be bound.
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// The listener failed to accept a connection. Serving continues.
    #[error("Failed to accept connection: {0}")]
    Accept(#[source] std::io::Error),

    /// The serve loop ended with an I/O error.
    #[error("Server error: {0}")]
    Serve(#[source] std::io::Error),
}

impl ServerError {
    /// Short label used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Bind { .. } => "TransportBindFailure",
            Self::Accept(_) => "TransportAcceptFailure",
            Self::Serve(_) => "TransportServeFailure",
        }
    }
}
