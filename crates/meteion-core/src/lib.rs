//! # Meteion Core
//!
//! Command dispatch for the Meteion control plane.
//!
//! - [`ActionRegistry`] maps case-insensitive action names to handlers and
//!   turns every handler failure into a text response.
//! - [`ChatGate`] serializes access to the host's chat sender.
//! - [`BuiltinActions`] binds `command`, `waymark`/`place` and `query`.

pub mod builtin;
pub mod chat;
pub mod registry;

pub use builtin::{validate_text_command, BuiltinActions};
pub use chat::ChatGate;
pub use registry::{log_failure, ActionHandler, ActionRegistry};
