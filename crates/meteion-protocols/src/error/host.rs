//! Host capability errors.

use thiserror::Error;

/// Failure reported by a host capability.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum HostError {
    #[error("Host capability unavailable: {0}")]
    Unavailable(String),

    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    #[error("Host call failed: {0}")]
    Failed(String),
}
