//! Action dispatch errors.
//!
//! The `Display` output of each variant is the exact text returned to HTTP
//! callers, so the prefixes are part of the wire contract.

use thiserror::Error;

use super::HostError;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ActionError {
    /// Dispatch named an action that is not registered.
    #[error("DoActionWrong(NoSuchAction):{0}")]
    NoSuchAction(String),

    /// A text command failed prefix/length validation.
    #[error("DoTextCommandWrong(InvalidCommand):{0}")]
    InvalidCommand(String),

    /// The chat gate could not be acquired in time.
    #[error("DoTextCommandWrong(ChatBusy):{0}")]
    ChatBusy(String),

    /// The handler panicked or otherwise misbehaved.
    #[error("DoActionWrong(HandlerFault):{0}")]
    HandlerFault(String),

    /// The request could not be decoded into an action and payload.
    #[error("DoActionWrong(MalformedRequest):{0}")]
    MalformedRequest(String),

    #[error("DoActionWrong(HostError):{0}")]
    Host(#[from] HostError),
}

impl ActionError {
    /// Short classification used in log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            ActionError::NoSuchAction(_) => "NoSuchAction",
            ActionError::InvalidCommand(_) => "InvalidCommand",
            ActionError::ChatBusy(_) => "ChatBusy",
            ActionError::HandlerFault(_) => "HandlerFault",
            ActionError::MalformedRequest(_) => "MalformedRequest",
            ActionError::Host(_) => "HostError",
        }
    }
}
