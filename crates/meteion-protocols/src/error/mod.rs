//! Error types for the Meteion protocol layer.

mod action;
mod host;

pub use action::*;
pub use host::*;
